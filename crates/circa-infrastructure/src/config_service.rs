//! Loads `config.toml` into the application configuration model.

use circa_core::config::AppConfig;
use circa_core::error::{CircaError, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::paths::CircaPaths;

/// Read-only access to the application configuration file.
pub struct ConfigService {
    path: PathBuf,
}

impl ConfigService {
    /// Uses the default path (`~/.config/circa/config.toml`).
    pub fn new() -> Result<Self> {
        let path = CircaPaths::config_file().map_err(|e| CircaError::config(e.to_string()))?;
        Ok(Self { path })
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the configuration.
    ///
    /// A missing or blank file yields [`AppConfig::default`]; a malformed
    /// one is an error.
    pub fn load(&self) -> Result<AppConfig> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "Config file not found, using defaults");
            return Ok(AppConfig::default());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(AppConfig::default());
        }

        let config: AppConfig = toml::from_str(&content)?;
        tracing::info!(
            path = %self.path.display(),
            model = %config.model.name,
            "Loaded configuration"
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::with_path(temp_dir.path().join("config.toml"));
        assert_eq!(service.load().unwrap(), AppConfig::default());
    }

    #[test]
    fn test_loads_overrides() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            "[server]\nbind = \"127.0.0.1:9000\"\n\n[session]\nauto_layout = false\n",
        )
        .unwrap();

        let config = ConfigService::with_path(&path).load().unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:9000");
        assert!(!config.session.auto_layout);
        assert_eq!(config.server.allowed_origins.len(), 2);
    }

    #[test]
    fn test_malformed_file_is_serialization_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[model\nname = ").unwrap();

        let err = ConfigService::with_path(&path).load().unwrap_err();
        assert!(matches!(err, CircaError::Serialization { .. }));
    }
}
