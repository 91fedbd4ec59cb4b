//! Scopes selector: loads the catalog, stages a pending selection and
//! commits it to the store.
//!
//! ```text
//! Idle ──open──▶ Loading ──ok──▶ Ready ──open/refresh──▶ Loading
//!                   │
//!                   └──fail──▶ Error ──dismiss/close──▶ Idle
//! ```
//!
//! Every fetch is tagged with a generation number. A response is applied only
//! if its generation is still the latest issued one; anything older is
//! discarded. There is no other cancellation.

pub mod http;
pub mod provider;

use std::cell::RefCell;

use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use tracing::{debug, warn};

use crate::context::ScopesContext;
use crate::error::ScopesError;
use crate::facade::ScopesReader;
use crate::store::SelectionReport;
use crate::types::SelectionMode;

pub use http::HttpScopesProvider;
pub use provider::{ScopesProvider, StaticScopesProvider};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectorState {
    Idle,
    Loading,
    Ready,
    Error,
}

impl std::fmt::Display for SelectorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SelectorState::Idle => "idle",
            SelectorState::Loading => "loading",
            SelectorState::Ready => "ready",
            SelectorState::Error => "error",
        };
        f.write_str(name)
    }
}

/// What happened to a completed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response replaced the catalog.
    Applied { generation: u64, scopes: usize },
    /// A newer fetch was issued (or the selector closed) before this one finished.
    Superseded { generation: u64, latest: u64 },
}

impl FetchOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, FetchOutcome::Applied { .. })
    }
}

#[derive(Debug)]
struct SelectorInner {
    state: SelectorState,
    generation: u64,
    pending: IndexSet<String>,
    /// Pending selection differs from the store through uncommitted edits.
    edited: bool,
    last_error: Option<String>,
    last_fetched_at: Option<DateTime<Utc>>,
}

pub struct ScopesSelector<P> {
    context: ScopesContext,
    provider: P,
    inner: RefCell<SelectorInner>,
}

impl<P: ScopesProvider> ScopesSelector<P> {
    pub fn new(context: ScopesContext, provider: P) -> Self {
        Self {
            context,
            provider,
            inner: RefCell::new(SelectorInner {
                state: SelectorState::Idle,
                generation: 0,
                pending: IndexSet::new(),
                edited: false,
                last_error: None,
                last_fetched_at: None,
            }),
        }
    }

    pub fn context(&self) -> &ScopesContext {
        &self.context
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn state(&self) -> SelectorState {
        self.inner.borrow().state
    }

    /// Latest issued generation; 0 before the first fetch.
    pub fn generation(&self) -> u64 {
        self.inner.borrow().generation
    }

    pub fn pending(&self) -> Vec<String> {
        self.inner.borrow().pending.iter().cloned().collect()
    }

    pub fn last_error(&self) -> Option<String> {
        self.inner.borrow().last_error.clone()
    }

    /// When the catalog was last replaced by a fetch.
    pub fn last_fetched_at(&self) -> Option<DateTime<Utc>> {
        self.inner.borrow().last_fetched_at
    }

    /// Fetch the catalog and move to `Ready`.
    ///
    /// An applied response seeds the pending selection from the store, unless
    /// there are uncommitted edits; those are kept, minus ids the new catalog
    /// no longer has.
    ///
    /// A response that is no longer the latest is dropped and reported as
    /// [`FetchOutcome::Superseded`], whether it succeeded or failed. A failed
    /// latest fetch leaves the catalog as it was and moves to `Error`.
    pub async fn open(&self) -> Result<FetchOutcome, ScopesError> {
        let generation = {
            let mut inner = self.inner.borrow_mut();
            inner.generation += 1;
            inner.state = SelectorState::Loading;
            inner.generation
        };
        debug!(generation, "Fetching scope catalog");

        let result = self.provider.fetch_scopes().await;

        let latest = self.inner.borrow().generation;
        if generation != latest {
            debug!(generation, latest, "Discarding superseded scope catalog response");
            return Ok(FetchOutcome::Superseded { generation, latest });
        }

        match result {
            Ok(scopes) => {
                let update = self.context.set_catalog(scopes);

                let mut inner = self.inner.borrow_mut();
                if inner.edited {
                    let before = inner.pending.len();
                    inner.pending.retain(|id| self.context.contains(id));
                    debug!(
                        kept = inner.pending.len(),
                        removed = before - inner.pending.len(),
                        "Keeping uncommitted scope edits across refresh"
                    );
                } else {
                    inner.pending = self.context.selected_scope_names().into_iter().collect();
                }
                if self.context.selection_mode() == SelectionMode::Single {
                    inner.pending.truncate(1);
                }
                inner.state = SelectorState::Ready;
                inner.last_error = None;
                inner.last_fetched_at = Some(Utc::now());
                Ok(FetchOutcome::Applied {
                    generation,
                    scopes: update.size,
                })
            }
            Err(err) => {
                let message = format!("{err:#}");
                warn!(generation, error = %message, "Scope catalog fetch failed");

                let mut inner = self.inner.borrow_mut();
                inner.state = SelectorState::Error;
                inner.last_error = Some(message.clone());
                Err(ScopesError::CatalogFetchFailed(message))
            }
        }
    }

    /// Re-fetch after a catalog or scope-context change. Uncommitted edits
    /// survive for ids that are still in the catalog.
    pub async fn refresh(&self) -> Result<FetchOutcome, ScopesError> {
        self.open().await
    }

    /// Flip `id` in the pending selection. Returns whether it is now pending.
    pub fn toggle(&self, id: &str) -> Result<bool, ScopesError> {
        let mode = self.context.selection_mode();
        let mut inner = self.inner.borrow_mut();
        ensure_ready(inner.state)?;

        let selected = match mode {
            SelectionMode::Multi => {
                if inner.pending.shift_remove(id) {
                    false
                } else {
                    inner.pending.insert(id.to_string());
                    true
                }
            }
            SelectionMode::Single => {
                let was_only = inner.pending.len() == 1 && inner.pending.contains(id);
                inner.pending.clear();
                if !was_only {
                    inner.pending.insert(id.to_string());
                }
                !was_only
            }
        };
        inner.edited = true;
        Ok(selected)
    }

    /// Replace the pending selection. In single mode only the first id is kept.
    pub fn set_selection<I, S>(&self, ids: I) -> Result<(), ScopesError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mode = self.context.selection_mode();
        let mut inner = self.inner.borrow_mut();
        ensure_ready(inner.state)?;

        let mut pending: IndexSet<String> = ids.into_iter().map(Into::into).collect();
        if mode == SelectionMode::Single {
            pending.truncate(1);
        }
        inner.pending = pending;
        inner.edited = true;
        Ok(())
    }

    /// Write the pending selection to the store. Unknown ids are dropped
    /// from both and listed in the report.
    pub fn commit(&self) -> Result<SelectionReport, ScopesError> {
        let pending = {
            let inner = self.inner.borrow();
            ensure_ready(inner.state)?;
            inner.pending.clone()
        };

        let report = self.context.select(&pending);
        let mut inner = self.inner.borrow_mut();
        inner.pending = report.selected.iter().cloned().collect();
        inner.edited = false;
        Ok(report)
    }

    /// Discard the pending selection and go idle. An in-flight fetch is
    /// superseded so its response will not be applied.
    pub fn close(&self) {
        let mut inner = self.inner.borrow_mut();
        if inner.state == SelectorState::Loading {
            inner.generation += 1;
        }
        inner.pending.clear();
        inner.edited = false;
        inner.state = SelectorState::Idle;
        debug!("Scope selector closed");
    }

    /// Acknowledge a failed fetch. The retained catalog is untouched.
    pub fn dismiss_error(&self) {
        let mut inner = self.inner.borrow_mut();
        if inner.state == SelectorState::Error {
            inner.state = SelectorState::Idle;
        }
    }
}

fn ensure_ready(state: SelectorState) -> Result<(), ScopesError> {
    if state == SelectorState::Ready {
        Ok(())
    } else {
        Err(ScopesError::SelectorNotReady(state))
    }
}

impl<P> std::fmt::Debug for ScopesSelector<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopesSelector")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Scope;

    fn selector(mode: SelectionMode) -> ScopesSelector<StaticScopesProvider> {
        let context = ScopesContext::from_store(crate::store::ScopeStore::default(), mode);
        let provider = StaticScopesProvider::new(vec![
            Scope::new("a", "A"),
            Scope::new("b", "B"),
            Scope::new("c", "C"),
        ]);
        ScopesSelector::new(context, provider)
    }

    #[tokio::test]
    async fn test_edits_require_ready_state() {
        let selector = selector(SelectionMode::Multi);
        assert_eq!(
            selector.toggle("a"),
            Err(ScopesError::SelectorNotReady(SelectorState::Idle))
        );

        selector.open().await.unwrap();
        assert_eq!(selector.toggle("a"), Ok(true));
        assert_eq!(selector.toggle("b"), Ok(true));
        assert_eq!(selector.toggle("a"), Ok(false));
        assert_eq!(selector.pending(), vec!["b"]);
    }

    #[tokio::test]
    async fn test_single_mode_keeps_one_pending_scope() {
        let selector = selector(SelectionMode::Single);
        selector.open().await.unwrap();

        assert_eq!(selector.toggle("a"), Ok(true));
        assert_eq!(selector.toggle("b"), Ok(true));
        assert_eq!(selector.pending(), vec!["b"]);
        assert_eq!(selector.toggle("b"), Ok(false));
        assert!(selector.pending().is_empty());

        selector.set_selection(["c", "a"]).unwrap();
        assert_eq!(selector.pending(), vec!["c"]);
    }

    #[tokio::test]
    async fn test_close_discards_pending_selection() {
        let selector = selector(SelectionMode::Multi);
        selector.open().await.unwrap();
        selector.set_selection(["a"]).unwrap();
        selector.commit().unwrap();

        selector.open().await.unwrap();
        assert_eq!(selector.pending(), vec!["a"]);
        selector.set_selection(["b", "c"]).unwrap();
        selector.close();

        assert_eq!(selector.state(), SelectorState::Idle);
        assert!(selector.pending().is_empty());
        assert_eq!(selector.context().selected_scope_names(), vec!["a"]);
    }

    #[tokio::test]
    async fn test_commit_reports_dropped_ids() {
        let selector = selector(SelectionMode::Multi);
        selector.open().await.unwrap();
        selector.set_selection(["a", "ghost"]).unwrap();

        let report = selector.commit().unwrap();

        assert_eq!(report.selected, vec!["a"]);
        assert_eq!(report.dropped, vec!["ghost"]);
        assert_eq!(selector.pending(), vec!["a"]);
        assert_eq!(selector.state(), SelectorState::Ready);
        assert!(selector.last_fetched_at().is_some());
    }
}
