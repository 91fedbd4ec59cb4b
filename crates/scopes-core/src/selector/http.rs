//! Fetch the scope catalog from an HTTP endpoint.
//!
//! The endpoint returns JSON, either a bare array of scopes or an object with
//! an `items` array.

use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;
use url::Url;

use crate::config::ProviderConfig;
use crate::types::Scope;

use super::ScopesProvider;

#[derive(Debug, Clone)]
pub struct HttpScopesProvider {
    client: reqwest::Client,
    endpoint: Url,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogResponse {
    List(Vec<Scope>),
    Items { items: Vec<Scope> },
}

impl HttpScopesProvider {
    pub fn new(endpoint: Url, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("scopes/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client, endpoint })
    }

    pub fn from_config(config: &ProviderConfig) -> anyhow::Result<Self> {
        Self::new(config.url.clone(), config.timeout())
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Parse a catalog response body.
    pub fn parse_catalog(body: &str) -> anyhow::Result<Vec<Scope>> {
        let response: CatalogResponse =
            serde_json::from_str(body).context("Failed to parse scope catalog response")?;

        Ok(match response {
            CatalogResponse::List(scopes) => scopes,
            CatalogResponse::Items { items } => items,
        })
    }
}

impl ScopesProvider for HttpScopesProvider {
    async fn fetch_scopes(&self) -> anyhow::Result<Vec<Scope>> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .send()
            .await
            .with_context(|| format!("Failed to fetch scopes from {}", self.endpoint))?;

        if !response.status().is_success() {
            anyhow::bail!(
                "Failed to fetch scopes: HTTP {} from {}",
                response.status(),
                self.endpoint
            );
        }

        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to read response body from {}", self.endpoint))?;

        Self::parse_catalog(&body)
    }
}
