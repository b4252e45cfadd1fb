//! Hand an allowed URL to the platform's default opener.

use std::process::Command;

use anyhow::{Context, Result};
use tracing::debug;

/// Open `url` in the default browser without waiting for it to exit.
pub fn open_in_browser(url: &str) -> Result<()> {
    let mut cmd = opener_command(url);
    debug!("Opening {} with {:?}", url, cmd);
    cmd.spawn()
        .with_context(|| format!("Failed to open browser for {}", url))?;
    Ok(())
}

fn opener_command(url: &str) -> Command {
    if cfg!(target_os = "macos") {
        let mut cmd = Command::new("open");
        cmd.arg(url);
        cmd
    } else if cfg!(target_os = "windows") {
        let mut cmd = Command::new("rundll32");
        cmd.arg("url.dll,FileProtocolHandler").arg(url);
        cmd
    } else {
        let mut cmd = Command::new("xdg-open");
        cmd.arg(url);
        cmd
    }
}
