//! Configuration validation.

use anyhow::{bail, Result};
use std::path::Path;

use super::Config;

/// Validate configuration.
pub fn validate(config: &Config) -> Result<()> {
    if config.chain_path.as_os_str().is_empty() {
        bail!("chain_path cannot be empty");
    }
    check_path("chain_path", &config.chain_path)?;

    if !config.log_path.as_os_str().is_empty() {
        // Path will be created if it doesn't exist, so just check it's valid
        check_path("log_path", &config.log_path)?;
    }

    Ok(())
}

fn check_path(field: &str, path: &Path) -> Result<()> {
    if path.to_string_lossy().contains('\0') {
        bail!("Invalid {}: contains null character", field);
    }
    Ok(())
}
