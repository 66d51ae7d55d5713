//! Configuration management using config.toml

use pretty_achievements_core::SortMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_PATH: &str = "config.toml";

/// Which Steam artwork the grid cards show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageQuality {
    Low,
    #[default]
    Medium,
    High,
}

impl ImageQuality {
    /// Steam CDN file name for this quality
    pub fn file_name(&self) -> &'static str {
        match self {
            ImageQuality::Low => "capsule_616x353.jpg",
            ImageQuality::Medium => "header.jpg",
            ImageQuality::High => "library_hero.jpg",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the detection companion
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Wait before retrying a scan that found nothing
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// How long the loading indicator stays after the first results
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Scan on startup if no push has arrived by then (0 = scan immediately)
    #[serde(default = "default_startup_scan_delay_ms")]
    pub startup_scan_delay_ms: u64,

    /// JSON file the companion drops detection results into
    #[serde(default)]
    pub push_file: Option<PathBuf>,

    #[serde(default)]
    pub sort_mode: SortMode,

    #[serde(default = "default_show_images")]
    pub show_images: bool,

    #[serde(default)]
    pub image_quality: ImageQuality,

    /// Window position X (None = system default)
    #[serde(default)]
    pub window_x: Option<f32>,

    /// Window position Y (None = system default)
    #[serde(default)]
    pub window_y: Option<f32>,

    /// Window width (None = default 1100)
    #[serde(default)]
    pub window_width: Option<f32>,

    /// Window height (None = default 720)
    #[serde(default)]
    pub window_height: Option<f32>,

    #[serde(default)]
    pub window_maximized: bool,
}

fn default_api_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_retry_backoff_ms() -> u64 {
    800
}

fn default_settle_delay_ms() -> u64 {
    150
}

fn default_startup_scan_delay_ms() -> u64 {
    3000
}

fn default_show_images() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            retry_backoff_ms: default_retry_backoff_ms(),
            settle_delay_ms: default_settle_delay_ms(),
            startup_scan_delay_ms: default_startup_scan_delay_ms(),
            push_file: None,
            sort_mode: SortMode::default(),
            show_images: default_show_images(),
            image_quality: ImageQuality::default(),
            window_x: None,
            window_y: None,
            window_width: None,
            window_height: None,
            window_maximized: false,
        }
    }
}

impl Config {
    /// Load config from file, creating default if it doesn't exist
    pub fn load() -> Self {
        Self::load_from(Path::new(CONFIG_PATH))
    }

    fn load_from(path: &Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => tracing::warn!("Error parsing {}: {}", path.display(), e),
                },
                Err(e) => tracing::warn!("Error reading {}: {}", path.display(), e),
            }
        }

        let config = Config::default();
        if let Err(e) = config.save_to(path) {
            tracing::warn!("Could not write default {}: {}", path.display(), e);
        }
        config
    }

    /// Save config to file
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.save_to(Path::new(CONFIG_PATH))
    }

    fn save_to(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn startup_scan_delay(&self) -> Duration {
        Duration::from_millis(self.startup_scan_delay_ms)
    }

    /// Steam CDN artwork URL for an app id at the configured quality
    pub fn image_url(&self, appid: u64) -> String {
        format!(
            "https://cdn.cloudflare.steamstatic.com/steam/apps/{}/{}",
            appid,
            self.image_quality.file_name()
        )
    }
}
