//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory where recordings are stored.
    pub recordings_dir: PathBuf,

    /// Default stream tuning.
    pub stream: StreamTuning,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Tuning parameters applied to every engine open.
///
/// The defaults favor playback smoothness over latency: one second of
/// buffering on each caching window, and no frame dropping or skipping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamTuning {
    /// Network caching window in milliseconds.
    pub network_caching_ms: u32,

    /// Live stream caching window in milliseconds.
    pub live_caching_ms: u32,

    /// File output caching window in milliseconds.
    pub file_caching_ms: u32,

    /// Prefer hardware-accelerated decode (software fallback is always
    /// available).
    pub hw_decode: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "vigil=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            recordings_dir: dirs_default_recordings(),
            stream: StreamTuning::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for StreamTuning {
    fn default() -> Self {
        Self {
            network_caching_ms: 1000,
            live_caching_ms: 1000,
            file_caching_ms: 1000,
            hw_decode: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// Standard config file location.
fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("vigil").join("config.json")
}

/// Default recordings directory.
fn dirs_default_recordings() -> PathBuf {
    let base = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local").join("share")
        });
    base.join("vigil").join("recordings")
}
