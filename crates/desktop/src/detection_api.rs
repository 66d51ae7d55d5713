//! HTTP client for the detection companion
//!
//! Endpoint: GET {base}/api/games
//! Returns: { "success": true, "games": [ { "app_id": .., "name": .., .. }, .. ] }

use std::time::Duration;

use pretty_achievements_core::{DetectionResultSet, DetectionSource, FetchError};
use serde_json::Value;

const GAMES_PATH: &str = "/api/games";

/// `DetectionSource` backed by the companion's REST API
pub struct HttpDetectionSource {
    client: reqwest::blocking::Client,
    url: String,
}

impl HttpDetectionSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, String> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| format!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            client,
            url: games_url(base_url),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl DetectionSource for HttpDetectionSource {
    fn fetch(&self) -> Result<DetectionResultSet, FetchError> {
        let response = self
            .client
            .get(&self.url)
            .header("User-Agent", "PrettyAchievements/0.1")
            .send()
            .map_err(|e| FetchError::Unavailable(format!("Network error: {}", e)))?;

        if !response.status().is_success() {
            return Err(FetchError::Unavailable(format!(
                "Detection API returned status: {}",
                response.status()
            )));
        }

        let body: Value = response
            .json()
            .map_err(|e| FetchError::Malformed(format!("Failed to parse response: {}", e)))?;

        parse_games_response(&body)
    }
}

fn games_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), GAMES_PATH)
}

/// Turn a `/api/games` body into a result set
pub fn parse_games_response(body: &Value) -> Result<DetectionResultSet, FetchError> {
    DetectionResultSet::from_api_response(body)
        .ok_or_else(|| FetchError::Malformed("expected { success: true, games: [...] }".to_string()))
}
