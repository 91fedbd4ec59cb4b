//! Config store for loading and saving scopes.toml.

use std::path::{Path, PathBuf};

use anyhow::Context;

use super::{ScopesConfig, parser, paths};

#[derive(Debug, Clone)]
pub struct ConfigStore {
    config_path: PathBuf,
}

impl ConfigStore {
    /// Store at the platform default location.
    pub fn from_default_location() -> anyhow::Result<Self> {
        Ok(Self::from_path(paths::platform_config_path()?))
    }

    pub fn from_path(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Load the config; a missing file yields the defaults.
    pub fn load(&self) -> anyhow::Result<ScopesConfig> {
        if !self.config_path.exists() {
            return Ok(ScopesConfig::new());
        }
        parser::parse_scopes_toml(&self.config_path)
    }

    pub fn save(&self, config: &ScopesConfig) -> anyhow::Result<()> {
        config.validate()?;
        let content = parser::to_toml(config)?;
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        std::fs::write(&self.config_path, content).with_context(|| {
            format!(
                "Failed to write config file: {}",
                self.config_path.display()
            )
        })?;
        Ok(())
    }
}
