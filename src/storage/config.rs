//! Application configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default rider FTP in watts, used when neither the CLI nor the plan
/// provides one.
pub const DEFAULT_FTP: u16 = 258;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Default FTP in watts for power normalization
    pub default_ftp: u16,
    /// Base directory for generated workout files
    pub output_dir: PathBuf,
    /// Path to the plan store database
    pub database_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        let data_dir = get_data_dir();
        Self {
            default_ftp: DEFAULT_FTP,
            output_dir: data_dir.join("workouts"),
            database_path: data_dir.join("plans.db"),
        }
    }
}

/// Get the application data directory.
pub fn get_data_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "zwogen", "Zwogen")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Get the configuration file path.
pub fn get_config_path() -> PathBuf {
    get_data_dir().join("config.toml")
}

/// Load application configuration from file, falling back to defaults
/// when no config file exists yet.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let path = get_config_path();

    if !path.exists() {
        return Ok(AppConfig::default());
    }

    let content =
        std::fs::read_to_string(&path).map_err(|e| ConfigError::IoError(e.to_string()))?;

    let config: AppConfig =
        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Save application configuration to file.
pub fn save_config(config: &AppConfig) -> Result<(), ConfigError> {
    let path = get_config_path();

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
    }

    let content =
        toml::to_string_pretty(config).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

    Ok(())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}
