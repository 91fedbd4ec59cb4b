//! Scope store: catalog, ordered selection, enabled flag and read-only depth.
//!
//! The store is plain state with synchronous mutations. It is owned by a
//! [`ScopesContext`](crate::context::ScopesContext), which shares it between
//! facades, the selector and the utility functions and publishes the outcome
//! of each mutation as a [`ScopeEvent`].

pub mod events;

use indexmap::{IndexMap, IndexSet};

use crate::error::ScopesError;
use crate::types::{Scope, SelectionMode};

pub use events::{ScopeEvent, ScopeEventBus};

/// Result of replacing the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CatalogUpdate {
    pub size: usize,
    /// Selected ids dropped because the new catalog no longer contains them.
    pub pruned: Vec<String>,
}

/// Result of a wholesale selection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionReport {
    /// Effective selection, in request order.
    pub selected: Vec<String>,
    /// Requested ids that were not in the catalog.
    pub dropped: Vec<String>,
    /// Known ids discarded because single-selection mode keeps only the first.
    pub truncated: Vec<String>,
}

impl SelectionReport {
    pub fn has_dropped(&self) -> bool {
        !self.dropped.is_empty()
    }

    /// The dropped ids as a diagnostic, if any.
    pub fn diagnostic(&self) -> Option<ScopesError> {
        self.has_dropped()
            .then(|| ScopesError::UnknownScopeId(self.dropped.clone()))
    }
}

#[derive(Debug, Clone)]
pub struct ScopeStore {
    catalog: IndexMap<String, Scope>,
    selection: IndexSet<String>,
    enabled: bool,
    read_only_depth: usize,
}

impl Default for ScopeStore {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl ScopeStore {
    pub fn new(catalog: impl IntoIterator<Item = Scope>) -> Self {
        Self {
            catalog: index_catalog(catalog),
            selection: IndexSet::new(),
            enabled: true,
            read_only_depth: 0,
        }
    }

    /// Replace the catalog, pruning selected ids that no longer exist.
    pub fn set_catalog(&mut self, scopes: impl IntoIterator<Item = Scope>) -> CatalogUpdate {
        self.catalog = index_catalog(scopes);

        let pruned: Vec<String> = self
            .selection
            .iter()
            .filter(|id| !self.catalog.contains_key(id.as_str()))
            .cloned()
            .collect();
        self.selection
            .retain(|id| self.catalog.contains_key(id.as_str()));

        CatalogUpdate {
            size: self.catalog.len(),
            pruned,
        }
    }

    /// Replace the selection wholesale. Unknown ids are dropped and reported;
    /// a repeated id keeps its first position.
    pub fn select<I, S>(&mut self, ids: I) -> SelectionReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut selection = IndexSet::new();
        let mut dropped = Vec::new();

        for id in ids {
            let id = id.as_ref();
            if self.catalog.contains_key(id) {
                selection.insert(id.to_string());
            } else if !dropped.iter().any(|d| d == id) {
                dropped.push(id.to_string());
            }
        }

        self.selection = selection;
        SelectionReport {
            selected: self.selection.iter().cloned().collect(),
            dropped,
            truncated: Vec::new(),
        }
    }

    /// Like [`select`](Self::select), but in [`SelectionMode::Single`] only
    /// the first known id is kept and the rest are listed as truncated.
    pub fn select_in_mode<I, S>(&mut self, ids: I, mode: SelectionMode) -> SelectionReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut report = self.select(ids);
        if mode == SelectionMode::Single {
            report.truncated = self.keep_first_selected();
            report.selected.truncate(1);
        }
        report
    }

    /// Drop every selected id after the first. Returns the removed ids.
    pub fn keep_first_selected(&mut self) -> Vec<String> {
        if self.selection.len() <= 1 {
            return Vec::new();
        }
        self.selection.split_off(1).into_iter().collect()
    }

    /// Returns whether anything was selected before.
    pub fn clear_selection(&mut self) -> bool {
        let had_selection = !self.selection.is_empty();
        self.selection.clear();
        had_selection
    }

    pub fn selected_scopes(&self) -> Vec<Scope> {
        self.selection
            .iter()
            .filter_map(|id| self.catalog.get(id))
            .cloned()
            .collect()
    }

    pub fn selected_scope_names(&self) -> Vec<String> {
        self.selection.iter().cloned().collect()
    }

    pub fn catalog(&self) -> impl Iterator<Item = &Scope> {
        self.catalog.values()
    }

    pub fn catalog_len(&self) -> usize {
        self.catalog.len()
    }

    pub fn scope(&self, id: &str) -> Option<&Scope> {
        self.catalog.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.catalog.contains_key(id)
    }

    /// Returns whether the flag changed.
    pub fn enable(&mut self) -> bool {
        !std::mem::replace(&mut self.enabled, true)
    }

    /// Returns whether the flag changed. The selection is kept.
    pub fn disable(&mut self) -> bool {
        std::mem::replace(&mut self.enabled, false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn enter_read_only(&mut self) -> usize {
        self.read_only_depth += 1;
        self.read_only_depth
    }

    /// Decrement the read-only depth. At depth 0 the depth stays 0 and the
    /// imbalance is returned for the caller to report.
    pub fn exit_read_only(&mut self) -> Result<usize, ScopesError> {
        match self.read_only_depth.checked_sub(1) {
            Some(depth) => {
                self.read_only_depth = depth;
                Ok(depth)
            }
            None => Err(ScopesError::ImbalancedReadOnlyStack),
        }
    }

    pub fn read_only_depth(&self) -> usize {
        self.read_only_depth
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only_depth > 0
    }
}

fn index_catalog(scopes: impl IntoIterator<Item = Scope>) -> IndexMap<String, Scope> {
    scopes
        .into_iter()
        .map(|scope| (scope.id.clone(), scope))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(ids: &[&str]) -> Vec<Scope> {
        ids.iter()
            .map(|id| Scope::new(*id, id.to_uppercase()))
            .collect()
    }

    #[test]
    fn test_select_keeps_request_order_not_catalog_order() {
        let mut store = ScopeStore::new(catalog(&["a", "b", "c"]));
        let report = store.select(["b", "a"]);

        assert_eq!(report.selected, vec!["b", "a"]);
        assert!(report.dropped.is_empty());
        assert_eq!(store.selected_scope_names(), vec!["b", "a"]);
        let titles: Vec<String> = store.selected_scopes().into_iter().map(|s| s.title).collect();
        assert_eq!(titles, vec!["B", "A"]);
    }

    #[test]
    fn test_select_drops_unknown_and_duplicate_ids() {
        let mut store = ScopeStore::new(catalog(&["a"]));
        let report = store.select(["x", "a", "x", "a"]);

        assert_eq!(report.selected, vec!["a"]);
        assert_eq!(report.dropped, vec!["x"]);
        assert_eq!(
            report.diagnostic(),
            Some(ScopesError::UnknownScopeId(vec!["x".to_string()]))
        );
    }

    #[test]
    fn test_set_catalog_prunes_missing_selection() {
        let mut store = ScopeStore::new(catalog(&["a", "b", "c"]));
        store.select(["c", "a"]);

        let update = store.set_catalog(catalog(&["a"]));

        assert_eq!(update.size, 1);
        assert_eq!(update.pruned, vec!["c"]);
        assert_eq!(store.selected_scope_names(), vec!["a"]);
    }

    #[test]
    fn test_disable_preserves_selection() {
        let mut store = ScopeStore::new(catalog(&["a"]));
        store.select(["a"]);

        assert!(store.disable());
        assert!(!store.disable());
        assert!(!store.is_enabled());
        assert_eq!(store.selected_scope_names(), vec!["a"]);

        assert!(store.enable());
        assert!(!store.enable());
    }

    #[test]
    fn test_exit_read_only_clamps_at_zero() {
        let mut store = ScopeStore::default();
        assert_eq!(store.enter_read_only(), 1);
        assert_eq!(store.exit_read_only(), Ok(0));
        assert_eq!(
            store.exit_read_only(),
            Err(ScopesError::ImbalancedReadOnlyStack)
        );
        assert_eq!(store.read_only_depth(), 0);
        assert!(!store.is_read_only());
    }

    #[test]
    fn test_single_mode_keeps_first_known_id() {
        let mut store = ScopeStore::new(catalog(&["a", "b", "c"]));
        let report = store.select_in_mode(["x", "b", "a", "c"], SelectionMode::Single);

        assert_eq!(report.selected, vec!["b"]);
        assert_eq!(report.dropped, vec!["x"]);
        assert_eq!(report.truncated, vec!["a", "c"]);
        assert_eq!(store.selected_scope_names(), vec!["b"]);

        let report = store.select_in_mode(["a", "c"], SelectionMode::Multi);
        assert!(report.truncated.is_empty());
        assert_eq!(store.keep_first_selected(), vec!["c"]);
        assert_eq!(store.selected_scope_names(), vec!["a"]);
    }
}
