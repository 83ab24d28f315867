use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Recognizer configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RecognizerConfig {
    /// Base URL of the classification service
    pub server_url: String,
    /// Upper bound on a single classification request, in milliseconds
    pub request_timeout_ms: u64,
    /// Minimum time between accepted classifications, in milliseconds
    pub throttle_interval_ms: u64,
    /// Predictions must be strictly above this to be reported (0.0-1.0)
    pub confidence_threshold: f32,
    /// Padding around the hand as a fraction of its larger dimension
    pub padding_ratio: f32,
    /// RGB fill for canvas area outside the camera frame
    pub background_color: [u8; 3],
    /// Length of the frames-per-second window, in milliseconds
    pub fps_window_ms: u64,
    /// Default tracing filter when RUST_LOG is unset
    pub log_filter: String,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:5000".to_string(),
            request_timeout_ms: 5000,
            throttle_interval_ms: 2000,
            confidence_threshold: 0.5,
            padding_ratio: 0.6,
            background_color: [240, 240, 240],
            fps_window_ms: 1000,
            log_filter: "info".to_string(),
        }
    }
}

impl RecognizerConfig {
    /// Load configuration from file, creating with defaults if it doesn't exist
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        Self::load_from(&Self::get_config_path()?)
    }

    /// Load configuration from a specific file, creating it if missing
    pub fn load_from(config_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        if config_path.exists() {
            let contents = std::fs::read_to_string(config_path)?;
            let config: RecognizerConfig = serde_json::from_str(&contents)?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(config_path)?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        self.validate()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, contents)?;

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        if !(self.server_url.starts_with("http://") || self.server_url.starts_with("https://")) {
            return Err(format!(
                "Invalid server URL: {:?}. Must start with http:// or https://",
                self.server_url
            )
            .into());
        }

        if !(100..=60_000).contains(&self.request_timeout_ms) {
            return Err(format!(
                "Invalid request timeout: {}ms. Must be between 100 and 60000",
                self.request_timeout_ms
            )
            .into());
        }

        if !(1..=60_000).contains(&self.throttle_interval_ms) {
            return Err(format!(
                "Invalid throttle interval: {}ms. Must be between 1 and 60000",
                self.throttle_interval_ms
            )
            .into());
        }

        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(format!(
                "Invalid confidence threshold: {}. Must be between 0.0 and 1.0",
                self.confidence_threshold
            )
            .into());
        }

        if !(0.0..=5.0).contains(&self.padding_ratio) {
            return Err(format!(
                "Invalid padding ratio: {}. Must be between 0.0 and 5.0",
                self.padding_ratio
            )
            .into());
        }

        if !(1..=60_000).contains(&self.fps_window_ms) {
            return Err(format!(
                "Invalid FPS window: {}ms. Must be between 1 and 60000",
                self.fps_window_ms
            )
            .into());
        }

        if self.log_filter.trim().is_empty() {
            return Err("Log filter cannot be empty".into());
        }

        Ok(())
    }

    /// Reset to default configuration
    pub fn reset() -> Result<Self, Box<dyn std::error::Error>> {
        let config = Self::default();
        config.save()?;
        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn throttle_interval(&self) -> Duration {
        Duration::from_millis(self.throttle_interval_ms)
    }

    pub fn fps_window(&self) -> Duration {
        Duration::from_millis(self.fps_window_ms)
    }

    /// Get the configuration file path
    pub fn get_config_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .map_err(|_| "Could not determine home directory")?;

        let mut path = PathBuf::from(home);
        path.push(".handsign");
        path.push("config");
        path.push("settings.json");

        Ok(path)
    }
}
