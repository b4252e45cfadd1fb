//! Configuration service for loading and generating config files.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::types::{default_config_dir, DEFAULT_CHAIN_FILE};
use super::Config;

/// Configuration service.
pub struct ConfigService;

impl ConfigService {
    /// Get the default configuration file path.
    /// Always uses ~/.config/phishnet/config.toml for cross-platform consistency.
    pub fn default_path() -> PathBuf {
        default_config_dir().join("config.toml")
    }

    /// Load configuration from file.
    ///
    /// If `path` is `None`, uses the default path.
    /// If the file doesn't exist, creates the default configuration files.
    /// Unset chain and log paths default to the config file's directory.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let path = path.map(PathBuf::from).unwrap_or_else(Self::default_path);

        if !path.exists() {
            Self::generate_at(&path)?;
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.resolve_paths(path.parent());

        config
            .validate()
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;

        Ok(config)
    }

    /// Generate default configuration files at the default path.
    pub fn generate_default() -> Result<()> {
        Self::generate_at(&Self::default_path())
    }

    /// Generate the config file at `path` and a starter chain file beside it.
    ///
    /// An existing chain file is left untouched.
    pub fn generate_at(path: &Path) -> Result<()> {
        let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
        if let Some(parent) = parent {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        fs::write(path, Self::default_config_content())
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        let chain_path = parent
            .map(|p| p.join(DEFAULT_CHAIN_FILE))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CHAIN_FILE));
        if !chain_path.exists() {
            fs::write(&chain_path, Self::default_chain_content()).with_context(|| {
                format!("Failed to write chain file: {}", chain_path.display())
            })?;
        }

        Ok(())
    }

    /// Generate default configuration content with comments.
    fn default_config_content() -> String {
        r#"# phishnet configuration file

# Chain file declaring the filters to run, in order
# (default: bootstrap.fn in the same directory as config.toml)
# chain_path = "bootstrap.fn"

# Enable debug logging to file (default: false)
debug = false

# Path to log directory (default: same directory as config.toml/logs)
# log_path = "~/.config/phishnet/logs"
"#
        .to_string()
    }

    /// Starter chain file.
    fn default_chain_content() -> String {
        r#"// phishnet filter chain
//
// Filters run top to bottom; the first one that blocks stops the scan.
// Declare a filter with parameters:
//
//   Name:[
//       key = value
//       other: value
//   ]
//
// or without parameters:
//
//   Name:[]
//
// Note: everything after "//" on a line is a comment, so write URLs
// without their scheme (evil.example/login).

// Local block-list
Block:[]

// Known-bad URL patterns
RegexFilter:[
    rickroll = dQw4w9WgXcQ
]

// PhishTank dump (data/verified_online.csv), empty if not present
// PhishTankFilter:[]

// Remote checks; blank keys skip the check unless ON_MISSING_KEY = block
// GoogleSafeBrowsing:[
//     API_KEY = ""
// ]
// GeminiFilter:[
//     API_KEY = ""
//     MODEL = gemini-2.5-flash
// ]
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::parser::parse_str;

    #[test]
    fn test_default_chain_parses() {
        let specs = parse_str(&ConfigService::default_chain_content()).unwrap();
        let names: Vec<_> = specs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Block", "RegexFilter"]);
    }

    #[test]
    fn test_load_creates_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = ConfigService::load(Some(&path)).unwrap();
        assert!(path.exists());
        assert_eq!(config.chain_path, dir.path().join("nested").join(DEFAULT_CHAIN_FILE));
        assert!(config.chain_path.exists());
        assert!(!config.debug);
    }

    #[test]
    fn test_generate_keeps_existing_chain() {
        let dir = tempfile::tempdir().unwrap();
        let chain = dir.path().join(DEFAULT_CHAIN_FILE);
        fs::write(&chain, "Block:[]\n").unwrap();

        ConfigService::generate_at(&dir.path().join("config.toml")).unwrap();
        assert_eq!(fs::read_to_string(&chain).unwrap(), "Block:[]\n");
    }

    #[test]
    fn test_load_rejects_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "debug = maybe").unwrap();
        assert!(ConfigService::load(Some(&path)).is_err());
    }
}
