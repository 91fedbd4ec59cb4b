//! Error taxonomy for the scopes subsystem.

use thiserror::Error;

use crate::facade::FacadeId;
use crate::selector::SelectorState;

/// Errors raised or reported by the scopes subsystem.
///
/// Only `AlreadyInitialized` and `CatalogFetchFailed` are meant to reach the
/// caller as failures; the others are reported as diagnostics after the state
/// has been clamped or the offending input dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopesError {
    #[error("Scopes are already initialized; tear down the existing instance first")]
    AlreadyInitialized,

    #[error("Scopes are not initialized")]
    NotInitialized,

    #[error("exit_read_only called with no matching enter_read_only")]
    ImbalancedReadOnlyStack,

    #[error("Unknown scope id(s): {}", .0.join(", "))]
    UnknownScopeId(Vec<String>),

    #[error("Failed to fetch scope catalog: {0}")]
    CatalogFetchFailed(String),

    #[error("Selector is not ready (state: {0})")]
    SelectorNotReady(SelectorState),

    #[error("Scene node already owns a live facade: {0}")]
    FacadeAlreadyAttached(FacadeId),

    #[error("Facade does not resolve: {0}")]
    UnknownFacade(FacadeId),
}

impl ScopesError {
    /// Whether the error is reported after local recovery rather than propagated.
    pub fn is_diagnostic(&self) -> bool {
        matches!(
            self,
            ScopesError::ImbalancedReadOnlyStack | ScopesError::UnknownScopeId(_)
        )
    }
}
