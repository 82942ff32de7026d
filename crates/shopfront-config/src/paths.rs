//! Data directory paths
//!
//! Platform-specific cache locations:
//! - Linux: `~/.cache/shopfront/`
//! - macOS: `~/Library/Caches/shopfront/`
//! - Windows: `%LOCALAPPDATA%\shopfront\`

use anyhow::{Context, Result};
use std::path::PathBuf;

const APP_NAME: &str = "shopfront";

/// Get the application cache directory, creating it if needed
pub fn cache_dir() -> Result<PathBuf> {
    let base = dirs::cache_dir().context("Could not determine cache directory")?;
    let dir = base.join(APP_NAME);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create cache directory {}", dir.display()))?;
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_dir_exists() {
        // Sandboxed CI may have no cache directory at all
        if let Ok(dir) = cache_dir() {
            assert!(dir.exists());
            assert!(dir.ends_with(APP_NAME));
        }
    }
}
