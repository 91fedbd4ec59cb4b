//! Shared scopes context.
//!
//! A [`ScopesContext`] owns the scope store, the facade arena and the event
//! bus. Clones are cheap handles onto the same state. The context is meant
//! for a single UI thread and is intentionally `!Send`.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;
use std::sync::mpsc::Receiver;

use tracing::{debug, warn};

use crate::config::ScopesConfig;
use crate::error::ScopesError;
use crate::facade::ScopesReader;
use crate::facade::tree::FacadeTree;
use crate::store::{CatalogUpdate, ScopeEvent, ScopeEventBus, ScopeStore, SelectionReport};
use crate::types::{Scope, SelectionMode};

#[derive(Clone)]
pub struct ScopesContext {
    inner: Rc<ContextInner>,
}

struct ContextInner {
    store: RefCell<ScopeStore>,
    facades: RefCell<FacadeTree>,
    events: ScopeEventBus,
    selection_mode: SelectionMode,
}

impl ScopesContext {
    /// Build a context from configuration: inline catalog, enabled flag,
    /// selection mode and initial selection.
    pub fn new(config: &ScopesConfig) -> Self {
        let mut store = ScopeStore::new(config.scopes.iter().cloned());
        if !config.enabled {
            store.disable();
        }
        if !config.initial_selection.is_empty() {
            let report = store.select_in_mode(&config.initial_selection, config.selection_mode);
            if report.has_dropped() {
                warn!(
                    dropped = ?report.dropped,
                    "Initial selection references scopes missing from the catalog"
                );
            }
            if !report.truncated.is_empty() {
                warn!(
                    truncated = ?report.truncated,
                    "Initial selection has more than one scope in single-selection mode"
                );
            }
        }

        Self::from_store(store, config.selection_mode)
    }

    /// Context over an explicit catalog with default settings.
    pub fn from_catalog(scopes: impl IntoIterator<Item = Scope>) -> Self {
        Self::from_store(ScopeStore::new(scopes), SelectionMode::default())
    }

    /// Context over a prepared store. In single-selection mode any selection
    /// beyond the first id is discarded.
    pub fn from_store(mut store: ScopeStore, selection_mode: SelectionMode) -> Self {
        if selection_mode == SelectionMode::Single {
            let truncated = store.keep_first_selected();
            if !truncated.is_empty() {
                warn!(?truncated, "Discarding extra scopes in single-selection mode");
            }
        }

        Self {
            inner: Rc::new(ContextInner {
                store: RefCell::new(store),
                facades: RefCell::new(FacadeTree::new()),
                events: ScopeEventBus::new(),
                selection_mode,
            }),
        }
    }

    /// Whether both handles refer to the same context.
    pub fn ptr_eq(&self, other: &ScopesContext) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn selection_mode(&self) -> SelectionMode {
        self.inner.selection_mode
    }

    pub fn subscribe(&self) -> Receiver<ScopeEvent> {
        self.inner.events.subscribe()
    }

    pub(crate) fn emit(&self, event: ScopeEvent) {
        self.inner.events.emit(event);
    }

    /// Log and publish a diagnostic that was handled locally.
    pub(crate) fn report(&self, error: ScopesError) {
        warn!(error = %error, "Scopes diagnostic");
        self.emit(ScopeEvent::Diagnostic(error));
    }

    pub(crate) fn facades(&self) -> Ref<'_, FacadeTree> {
        self.inner.facades.borrow()
    }

    pub(crate) fn facades_mut(&self) -> RefMut<'_, FacadeTree> {
        self.inner.facades.borrow_mut()
    }

    fn store(&self) -> Ref<'_, ScopeStore> {
        self.inner.store.borrow()
    }

    fn store_mut(&self) -> RefMut<'_, ScopeStore> {
        self.inner.store.borrow_mut()
    }

    pub fn set_catalog(&self, scopes: impl IntoIterator<Item = Scope>) -> CatalogUpdate {
        let update = self.store_mut().set_catalog(scopes);
        debug!(size = update.size, pruned = ?update.pruned, "Scope catalog replaced");

        self.emit(ScopeEvent::CatalogReplaced { size: update.size });
        if !update.pruned.is_empty() {
            self.emit(ScopeEvent::SelectionPruned {
                removed: update.pruned.clone(),
            });
            self.emit(ScopeEvent::SelectionChanged {
                names: self.store().selected_scope_names(),
            });
        }
        update
    }

    /// Replace the selection. Unknown ids are dropped and reported as a
    /// diagnostic; in single-selection mode only the first known id is kept.
    pub fn select<I, S>(&self, ids: I) -> SelectionReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let report = self.store_mut().select_in_mode(ids, self.selection_mode());
        debug!(selected = ?report.selected, "Scope selection replaced");

        if let Some(diagnostic) = report.diagnostic() {
            self.report(diagnostic);
        }
        if !report.truncated.is_empty() {
            warn!(
                truncated = ?report.truncated,
                "Single-selection mode keeps only the first scope"
            );
        }
        self.emit(ScopeEvent::SelectionChanged {
            names: report.selected.clone(),
        });
        report
    }

    pub fn clear_selection(&self) {
        if self.store_mut().clear_selection() {
            self.emit(ScopeEvent::SelectionChanged { names: Vec::new() });
        }
    }

    pub fn enable(&self) {
        if self.store_mut().enable() {
            debug!("Scopes enabled");
            self.emit(ScopeEvent::EnabledChanged { enabled: true });
        }
    }

    pub fn disable(&self) {
        if self.store_mut().disable() {
            debug!("Scopes disabled");
            self.emit(ScopeEvent::EnabledChanged { enabled: false });
        }
    }

    pub fn enter_read_only(&self) -> usize {
        let depth = self.store_mut().enter_read_only();
        self.emit(ScopeEvent::ReadOnlyChanged { depth });
        depth
    }

    /// Leave one read-only level. An unmatched exit is reported and leaves
    /// the depth at zero.
    pub fn exit_read_only(&self) -> Result<usize, ScopesError> {
        let result = self.store_mut().exit_read_only();
        match &result {
            Ok(depth) => self.emit(ScopeEvent::ReadOnlyChanged { depth: *depth }),
            Err(error) => self.report(error.clone()),
        }
        result
    }

    pub fn read_only_depth(&self) -> usize {
        self.store().read_only_depth()
    }

    pub fn catalog(&self) -> Vec<Scope> {
        self.store().catalog().cloned().collect()
    }

    pub fn catalog_len(&self) -> usize {
        self.store().catalog_len()
    }

    pub fn scope(&self, id: &str) -> Option<Scope> {
        self.store().scope(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.store().contains(id)
    }
}

impl ScopesReader for ScopesContext {
    fn selected_scopes(&self) -> Vec<Scope> {
        self.store().selected_scopes()
    }

    fn selected_scope_names(&self) -> Vec<String> {
        self.store().selected_scope_names()
    }

    fn is_enabled(&self) -> bool {
        self.store().is_enabled()
    }

    fn is_read_only(&self) -> bool {
        self.store().is_read_only()
    }
}

impl std::fmt::Debug for ScopesContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let store = self.store();
        f.debug_struct("ScopesContext")
            .field("catalog", &store.catalog_len())
            .field("selection", &store.selected_scope_names())
            .field("enabled", &store.is_enabled())
            .field("read_only_depth", &store.read_only_depth())
            .field("facades", &self.facades().len())
            .finish()
    }
}
