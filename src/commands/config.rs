use crate::cli::ConfigAction;
use crate::error::Result;
use crate::models::config::AppConfig;
use crate::services::config::ConfigManager;
use std::path::Path;

/// Initialize the config manager, honoring an explicit `--config` path
pub fn init_config_manager(path: Option<&Path>) -> Result<ConfigManager> {
    match path {
        Some(path) => Ok(ConfigManager::with_path(path)),
        None => ConfigManager::new(),
    }
}

/// Load configuration from disk (or defaults)
pub fn load_config(manager: &ConfigManager) -> Result<AppConfig> {
    let config = manager.load()?;
    tracing::debug!(path = %manager.config_file_path().display(), "Configuration loaded");
    Ok(config)
}

/// Run a `config` subcommand and return what should be printed
pub fn run_config_action(manager: &ConfigManager, action: ConfigAction) -> Result<String> {
    match action {
        ConfigAction::Show => {
            let config = manager.load()?;
            Ok(serde_json::to_string_pretty(&config)?)
        }
        ConfigAction::Init => {
            if manager.config_exists() {
                return Ok(format!(
                    "Config already exists at {}",
                    manager.config_file_path().display()
                ));
            }
            manager.save(&AppConfig::default())?;
            tracing::info!(path = %manager.config_file_path().display(), "Wrote default config");
            Ok(format!(
                "Wrote default config to {}",
                manager.config_file_path().display()
            ))
        }
        ConfigAction::Path => Ok(manager.config_file_path().display().to_string()),
    }
}
