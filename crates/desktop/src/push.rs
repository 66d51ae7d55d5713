//! Drop-file push channel
//!
//! The companion can write detection results to a JSON file instead of
//! waiting to be polled. Every create/modify of that file is read and handed
//! to the orchestrator's push channel.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::thread;
use std::time::Duration;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use pretty_achievements_core::{DetectionResultSet, PushSender};
use serde_json::Value;

/// Give the writer a moment to finish before reading
const WRITE_SETTLE: Duration = Duration::from_millis(100);

/// Parse a drop file: a plain detection map or the `/api/games` body
pub fn parse_push_contents(contents: &str) -> Result<DetectionResultSet, String> {
    let value: Value = serde_json::from_str(contents).map_err(|e| format!("Invalid JSON: {}", e))?;

    if value.get("games").map_or(false, Value::is_array) {
        return DetectionResultSet::from_api_response(&value)
            .ok_or_else(|| "API payload without success flag".to_string());
    }

    DetectionResultSet::from_map_value(&value).ok_or_else(|| "Expected a JSON object".to_string())
}

/// Keeps the file watcher alive; dropping it stops the push thread
pub struct PushFileWatcher {
    _watcher: RecommendedWatcher,
    path: PathBuf,
}

impl PushFileWatcher {
    /// Watch `path` and push its contents whenever it changes. `wake` is
    /// called after each delivered push.
    pub fn start<F>(path: PathBuf, pusher: PushSender, wake: F) -> Result<Self, String>
    where
        F: Fn() + Send + 'static,
    {
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let (tx, rx) = channel::<notify::Result<Event>>();
        let mut watcher = RecommendedWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            notify::Config::default(),
        )
        .map_err(|e| format!("Failed to create watcher: {}", e))?;

        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|e| format!("Failed to watch {}: {}", dir.display(), e))?;

        tracing::info!("Watching {} for pushed detection results", path.display());

        let file_path = path.clone();
        thread::spawn(move || {
            let mut last = None;
            if file_path.exists() && !deliver(&file_path, &pusher, &mut last) {
                return;
            }
            wake();

            for res in rx {
                match res {
                    Ok(event) => {
                        if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                            continue;
                        }
                        if !event.paths.iter().any(|p| p.file_name() == file_path.file_name()) {
                            continue;
                        }
                        thread::sleep(WRITE_SETTLE);
                        if !deliver(&file_path, &pusher, &mut last) {
                            break;
                        }
                        wake();
                    }
                    Err(e) => tracing::warn!("Push file watch error: {}", e),
                }
            }
        });

        Ok(Self {
            _watcher: watcher,
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Read, parse and push the drop file. Identical contents are pushed once.
/// Returns false when the orchestrator is gone.
fn deliver(path: &Path, pusher: &PushSender, last: &mut Option<String>) -> bool {
    let contents = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("Could not read {}: {}", path.display(), e);
            return true;
        }
    };
    if last.as_deref() == Some(contents.as_str()) {
        return true;
    }

    match parse_push_contents(&contents) {
        Ok(set) => {
            tracing::debug!("Pushing {} games from {}", set.len(), path.display());
            *last = Some(contents);
            pusher.push(set)
        }
        Err(e) => {
            tracing::warn!("Ignoring {}: {}", path.display(), e);
            true
        }
    }
}
