//! Configuration schema for scopes.toml

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::types::{Scope, SelectionMode};

/// Root configuration structure for scopes.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopesConfig {
    /// Feature switch; a disabled subsystem keeps its selection but consumers ignore it
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default)]
    pub selection_mode: SelectionMode,

    /// Scope ids selected at startup
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub initial_selection: Vec<String>,

    /// Remote catalog endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderConfig>,

    /// Inline catalog (`[[scope]]` tables)
    #[serde(default, rename = "scope", skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<Scope>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub url: Url,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_enabled() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ScopesConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            selection_mode: SelectionMode::default(),
            initial_selection: Vec::new(),
            provider: None,
            scopes: Vec::new(),
        }
    }
}

impl ScopesConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let mut seen = HashSet::new();
        for scope in &self.scopes {
            if scope.id.trim().is_empty() {
                anyhow::bail!("Scope '{}' has an empty id", scope.title);
            }
            if !seen.insert(scope.id.as_str()) {
                anyhow::bail!("Duplicate scope id '{}'", scope.id);
            }
        }

        if let Some(provider) = &self.provider {
            provider.validate()?;
        }
        Ok(())
    }
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !matches!(self.url.scheme(), "http" | "https") {
            anyhow::bail!(
                "Provider url must use http or https, got '{}'",
                self.url.scheme()
            );
        }
        if self.timeout_secs == 0 {
            anyhow::bail!("Provider timeout_secs must be greater than zero");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_duplicate_ids() {
        let config = ScopesConfig {
            scopes: vec![Scope::new("a", "A"), Scope::new("a", "Again")],
            ..ScopesConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Duplicate scope id 'a'"));
    }

    #[test]
    fn test_validate_rejects_non_http_provider() {
        let config = ScopesConfig {
            provider: Some(ProviderConfig {
                url: Url::parse("ftp://example.com/scopes").unwrap(),
                timeout_secs: 10,
            }),
            ..ScopesConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
