use crate::error::{AnalysisError, Result};
use crate::models::config::AppConfig;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration manager for app settings
pub struct ConfigManager {
    config_dir: PathBuf,
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a manager rooted at the platform config directory
    /// (`<config_dir>/easylab/config.json`).
    ///
    /// Nothing is created on disk until `save()`.
    pub fn new() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| AnalysisError::config("Failed to determine config directory"))?
            .join("easylab");

        let config_path = config_dir.join("config.json");

        Ok(Self {
            config_dir,
            config_path,
        })
    }

    /// Create a manager for an explicit config file path
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        let config_path = path.into();
        let config_dir = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        Self {
            config_dir,
            config_path,
        }
    }

    /// Save configuration to disk
    pub fn save(&self, config: &AppConfig) -> Result<()> {
        fs::create_dir_all(&self.config_dir)?;

        // Pretty print for human editing
        let json = serde_json::to_string_pretty(config)?;
        fs::write(&self.config_path, json)?;

        tracing::debug!(path = %self.config_path.display(), "Config saved");
        Ok(())
    }

    /// Load configuration from disk
    ///
    /// If config file doesn't exist, returns default configuration
    pub fn load(&self) -> Result<AppConfig> {
        if !self.config_exists() {
            tracing::debug!(path = %self.config_path.display(), "No config file, using defaults");
            return Ok(AppConfig::default());
        }

        let content = fs::read_to_string(&self.config_path)?;
        let config: AppConfig = serde_json::from_str(&content).map_err(|e| {
            AnalysisError::config(format!(
                "Failed to parse {}: {}",
                self.config_path.display(),
                e
            ))
        })?;

        config.validate().map_err(AnalysisError::config)?;
        Ok(config)
    }

    /// Get the config file path
    pub fn config_file_path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Check if config file exists
    pub fn config_exists(&self) -> bool {
        self.config_path.exists()
    }
}
