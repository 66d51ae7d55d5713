//! Detection source error types

use thiserror::Error;

/// Why a single fetch attempt produced no data
///
/// Never surfaced to the UI: the orchestrator turns it into an empty result.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("detection source unavailable: {0}")]
    Unavailable(String),
    #[error("malformed detection payload: {0}")]
    Malformed(String),
}
