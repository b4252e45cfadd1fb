//! Configuration data types.

use anyhow::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::validation;

/// Chain file name used when `chain_path` is not set.
pub const DEFAULT_CHAIN_FILE: &str = "bootstrap.fn";

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the chain file declaring the filters to run
    pub chain_path: PathBuf,

    /// Enable debug logging to file
    pub debug: bool,

    /// Path to log directory
    pub log_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chain_path: default_chain_path_for_config_dir(None),
            debug: false,
            log_path: default_log_path_for_config_dir(None),
        }
    }
}

impl Config {
    /// Validate configuration and return errors if invalid.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }

    /// Point unset paths at `config_dir`; relative paths are resolved
    /// against it.
    pub(crate) fn resolve_paths(&mut self, config_dir: Option<&Path>) {
        let Some(dir) = config_dir else {
            return;
        };

        if self.chain_path == default_chain_path_for_config_dir(None) {
            self.chain_path = default_chain_path_for_config_dir(Some(dir));
        } else if self.chain_path.is_relative() {
            self.chain_path = dir.join(&self.chain_path);
        }

        if self.log_path == default_log_path_for_config_dir(None) {
            self.log_path = default_log_path_for_config_dir(Some(dir));
        } else if self.log_path.is_relative() {
            self.log_path = dir.join(&self.log_path);
        }
    }
}

/// Default application directory: ~/.config/phishnet
pub fn default_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("phishnet")
}

/// Get chain file path based on config directory.
pub fn default_chain_path_for_config_dir(config_dir: Option<&Path>) -> PathBuf {
    config_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(default_config_dir)
        .join(DEFAULT_CHAIN_FILE)
}

/// Get log path based on config directory.
pub fn default_log_path_for_config_dir(config_dir: Option<&Path>) -> PathBuf {
    config_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(default_config_dir)
        .join("logs")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_defaults_to_config_dir() {
        let mut config = Config::default();
        config.resolve_paths(Some(Path::new("/etc/phishnet")));
        assert_eq!(config.chain_path, PathBuf::from("/etc/phishnet/bootstrap.fn"));
        assert_eq!(config.log_path, PathBuf::from("/etc/phishnet/logs"));
    }

    #[test]
    fn test_resolve_relative_and_absolute() {
        let mut config: Config =
            toml::from_str("chain_path = \"chains/strict.fn\"\nlog_path = \"/var/log/phishnet\"")
                .unwrap();
        config.resolve_paths(Some(Path::new("/etc/phishnet")));
        assert_eq!(
            config.chain_path,
            PathBuf::from("/etc/phishnet/chains/strict.fn")
        );
        assert_eq!(config.log_path, PathBuf::from("/var/log/phishnet"));
    }
}
