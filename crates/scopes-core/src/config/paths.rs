//! Config path resolution.

use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "scopes.toml";

/// `<config_dir>/scopes/scopes.toml`
pub fn default_config_path(config_dir: &Path) -> PathBuf {
    config_dir.join("scopes").join(CONFIG_FILE_NAME)
}

/// Platform config directory, if one can be determined.
pub fn platform_config_path() -> anyhow::Result<PathBuf> {
    let config_dir =
        dirs::config_dir().ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    Ok(default_config_path(&config_dir))
}
