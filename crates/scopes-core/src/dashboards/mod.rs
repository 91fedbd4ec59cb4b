//! Dashboard listing filtered by the current scope selection.

pub mod filter;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::facade::ScopesReader;
use crate::types::Scope;

pub use filter::{ScopeMatcher, filter_matches, scope_matches};

/// A dashboard as listed by the host application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dashboard {
    pub uid: String,
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,

    /// Labels scope filters are evaluated against.
    #[serde(default)]
    pub labels: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Dashboard {
    pub fn new(uid: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            title: title.into(),
            folder: None,
            labels: BTreeMap::new(),
            tags: Vec::new(),
        }
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FilterKey {
    scopes: Vec<Scope>,
    query: String,
    revision: u64,
}

/// Filters a dashboard listing by the effective scopes of a reader.
///
/// The last result is reused while the scopes, the query and the listing are
/// unchanged.
#[derive(Debug, Default)]
pub struct ScopesDashboards {
    dashboards: Vec<Dashboard>,
    revision: u64,
    query: String,
    last_key: Option<FilterKey>,
    filtered: Vec<Dashboard>,
    recomputations: u64,
}

impl ScopesDashboards {
    pub fn new(dashboards: Vec<Dashboard>) -> Self {
        Self {
            dashboards,
            ..Self::default()
        }
    }

    pub fn set_dashboards(&mut self, dashboards: Vec<Dashboard>) {
        self.dashboards = dashboards;
        self.revision += 1;
    }

    pub fn dashboards(&self) -> &[Dashboard] {
        &self.dashboards
    }

    /// Case-insensitive title search applied on top of the scope filter.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into().trim().to_lowercase();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Number of filter passes actually run.
    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }

    /// Dashboards matching the query and, while scopes are enabled and
    /// selected, at least one selected scope.
    pub fn filtered<R: ScopesReader + ?Sized>(&mut self, reader: &R) -> &[Dashboard] {
        let key = FilterKey {
            scopes: reader.effective_scopes(),
            query: self.query.clone(),
            revision: self.revision,
        };
        if self.last_key.as_ref() == Some(&key) {
            return &self.filtered;
        }

        self.filtered = {
            let matchers: Vec<ScopeMatcher<'_>> =
                key.scopes.iter().map(ScopeMatcher::new).collect();
            self.dashboards
                .iter()
                .filter(|dashboard| matches_query(dashboard, &key.query))
                .filter(|dashboard| {
                    matchers.is_empty() || matchers.iter().any(|matcher| matcher.matches(dashboard))
                })
                .cloned()
                .collect()
        };
        self.recomputations += 1;
        debug!(
            total = self.dashboards.len(),
            matched = self.filtered.len(),
            scopes = key.scopes.len(),
            "Filtered dashboards by scopes"
        );

        self.last_key = Some(key);
        &self.filtered
    }
}

fn matches_query(dashboard: &Dashboard, query: &str) -> bool {
    query.is_empty() || dashboard.title.to_lowercase().contains(query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ScopesContext;
    use crate::types::ScopeFilter;

    #[test]
    fn test_unchanged_inputs_reuse_last_result() {
        let context = ScopesContext::from_catalog([
            Scope::new("prod", "Production").with_filter(ScopeFilter::equals("env", "prod"))
        ]);
        let mut dashboards = ScopesDashboards::new(vec![
            Dashboard::new("1", "Prod overview").with_label("env", "prod"),
            Dashboard::new("2", "Dev overview").with_label("env", "dev"),
        ]);

        assert_eq!(dashboards.filtered(&context).len(), 2);
        assert_eq!(dashboards.filtered(&context).len(), 2);
        assert_eq!(dashboards.recomputations(), 1);

        context.select(["prod"]);
        assert_eq!(dashboards.filtered(&context)[0].uid, "1");
        assert_eq!(dashboards.recomputations(), 2);

        context.select(["prod"]);
        dashboards.filtered(&context);
        assert_eq!(dashboards.recomputations(), 2);
    }
}
