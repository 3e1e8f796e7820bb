//! JSON Configuration Management
//!
//! Handles reading and writing the application configuration file, plus the
//! environment overrides applied on top of it.

use std::fs;
use std::path::{Path, PathBuf};

use crate::models::settings::AppConfig;
use crate::utils::error::{AppError, AppResult};
use crate::utils::paths::{config_path, ensure_dir};

/// Overrides the provider API key
pub const API_KEY_ENV: &str = "BREEZER_API_KEY";
/// Overrides the provider base URL
pub const BASE_URL_ENV: &str = "BREEZER_BASE_URL";

/// Configuration service for managing app settings
#[derive(Debug)]
pub struct ConfigService {
    config_path: PathBuf,
    config: AppConfig,
}

impl ConfigService {
    /// Load `~/.breezer/config.json`, creating it with defaults if absent.
    pub fn new() -> AppResult<Self> {
        Self::with_path(config_path()?)
    }

    /// Load the configuration from an explicit path, creating it with
    /// defaults if absent.
    pub fn with_path(config_path: PathBuf) -> AppResult<Self> {
        if let Some(parent) = config_path.parent() {
            ensure_dir(parent)?;
        }

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            let default_config = AppConfig::default();
            Self::save_to_file(&config_path, &default_config)?;
            default_config
        };

        apply_overrides(
            &mut config,
            std::env::var(API_KEY_ENV).ok(),
            std::env::var(BASE_URL_ENV).ok(),
        );

        tracing::debug!(path = %config_path.display(), "Configuration loaded");

        Ok(Self {
            config_path,
            config,
        })
    }

    /// Load configuration from a file
    fn load_from_file(path: &Path) -> AppResult<AppConfig> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        config.validate().map_err(AppError::validation)?;
        Ok(config)
    }

    /// Save configuration to a file with pretty formatting
    fn save_to_file(path: &Path, config: &AppConfig) -> AppResult<()> {
        config.validate().map_err(AppError::validation)?;
        let content = serde_json::to_string_pretty(config)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Get the current configuration
    pub fn get_config(&self) -> &AppConfig {
        &self.config
    }

    /// Get a clone of the current configuration
    pub fn get_config_clone(&self) -> AppConfig {
        self.config.clone()
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

/// Apply environment overrides. Empty values are ignored.
fn apply_overrides(config: &mut AppConfig, api_key: Option<String>, base_url: Option<String>) {
    if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
        config.provider.api_key = Some(key);
    }
    if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
        config.provider.base_url = Some(url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{"max_tool_rounds": 4}"#).unwrap();

        let config = ConfigService::load_from_file(file.path()).unwrap();
        assert_eq!(config.max_tool_rounds, 4);
        assert_eq!(config.tool_state_ttl_secs, 600);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{"models": {"synthesis": ""}}"#).unwrap();

        let err = ConfigService::load_from_file(file.path()).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_creates_default_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("config.json");

        let service = ConfigService::with_path(path.clone()).unwrap();
        assert!(path.exists());
        assert_eq!(service.get_config().max_tool_rounds, 8);

        let loaded = ConfigService::load_from_file(&path).unwrap();
        assert_eq!(loaded.models, AppConfig::default().models);
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = AppConfig::default();
        apply_overrides(
            &mut config,
            Some("sk-env".to_string()),
            Some("http://localhost:8080/v1".to_string()),
        );
        assert_eq!(config.provider.api_key.as_deref(), Some("sk-env"));
        assert_eq!(
            config.provider.base_url.as_deref(),
            Some("http://localhost:8080/v1")
        );

        let mut config = AppConfig::default();
        apply_overrides(&mut config, Some("  ".to_string()), None);
        assert!(config.provider.api_key.is_none());
    }
}
