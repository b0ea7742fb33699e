//! Configuration service.
//!
//! Loads [`ClientConfig`] from `~/.config/hearth/config.toml`, applies
//! environment overrides and caches the result.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use hearth_core::config::ClientConfig;
use hearth_core::error::{HearthError, Result};

use crate::paths::HearthPaths;
use crate::storage::AtomicTomlFile;

/// Overrides `backend_url`.
pub const ENV_BACKEND_URL: &str = "HEARTH_BACKEND_URL";
/// Overrides `log_level`.
pub const ENV_LOG: &str = "HEARTH_LOG";

#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    config: Arc<RwLock<Option<ClientConfig>>>,
}

impl ConfigService {
    /// A service reading the default config file.
    pub fn new() -> Result<Self> {
        Ok(Self::with_path(HearthPaths::config_file()?))
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the configuration, loading it on first access.
    ///
    /// A missing file yields the defaults. Environment overrides are applied
    /// on every load.
    pub fn get_config(&self) -> Result<ClientConfig> {
        {
            let cached = self
                .config
                .read()
                .map_err(|_| HearthError::internal("Config cache lock poisoned"))?;
            if let Some(config) = cached.as_ref() {
                return Ok(config.clone());
            }
        }

        let mut config = self.load_file()?;
        apply_env_overrides(&mut config, |key| std::env::var(key).ok());

        let mut cached = self
            .config
            .write()
            .map_err(|_| HearthError::internal("Config cache lock poisoned"))?;
        *cached = Some(config.clone());
        Ok(config)
    }

    /// Forces a reload on next access.
    pub fn invalidate_cache(&self) -> Result<()> {
        let mut cached = self
            .config
            .write()
            .map_err(|_| HearthError::internal("Config cache lock poisoned"))?;
        *cached = None;
        Ok(())
    }

    /// Writes `config` to the config file and drops the cached copy.
    pub fn save(&self, config: &ClientConfig) -> Result<()> {
        AtomicTomlFile::new(self.path.clone()).save(config)?;
        tracing::info!("[ConfigService] Saved configuration to {}", self.path.display());
        self.invalidate_cache()
    }

    /// The ledger directory from `config`, or the platform default.
    pub fn ledger_dir(config: &ClientConfig) -> Result<PathBuf> {
        match &config.ledger_dir {
            Some(dir) => Ok(dir.clone()),
            None => HearthPaths::ledger_dir(),
        }
    }

    fn load_file(&self) -> Result<ClientConfig> {
        match AtomicTomlFile::<ClientConfig>::new(self.path.clone()).load()? {
            Some(config) => {
                tracing::debug!("[ConfigService] Loaded {}", self.path.display());
                Ok(config)
            }
            None => {
                tracing::debug!(
                    "[ConfigService] No config at {}, using defaults",
                    self.path.display()
                );
                Ok(ClientConfig::default())
            }
        }
    }
}

/// Applies `HEARTH_*` overrides looked up through `lookup`.
pub fn apply_env_overrides<F>(config: &mut ClientConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(ENV_BACKEND_URL).filter(|v| !v.trim().is_empty()) {
        config.backend_url = url;
    }
    if let Some(level) = lookup(ENV_LOG).filter(|v| !v.trim().is_empty()) {
        config.log_level = level;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::with_path(temp_dir.path().join("config.toml"));
        let mut config = service.load_file().unwrap();
        apply_env_overrides(&mut config, |_| None);
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_save_then_reload() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::with_path(temp_dir.path().join("config.toml"));
        let config = ClientConfig {
            chat_poll_interval_ms: 3000,
            ledger_dir: Some(temp_dir.path().join("ledger")),
            ..Default::default()
        };

        service.save(&config).unwrap();

        let loaded = service.load_file().unwrap();
        assert_eq!(loaded.chat_poll_interval_ms, 3000);
        assert_eq!(
            ConfigService::ledger_dir(&loaded).unwrap(),
            temp_dir.path().join("ledger")
        );
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_BACKEND_URL, "https://backend.test"),
            (ENV_LOG, "debug"),
        ]
        .into_iter()
        .collect();
        let mut config = ClientConfig::default();

        apply_env_overrides(&mut config, |key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.backend_url, "https://backend.test");
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_blank_env_values_are_ignored() {
        let mut config = ClientConfig::default();
        apply_env_overrides(&mut config, |_| Some("  ".to_string()));
        assert_eq!(config, ClientConfig::default());
    }
}
