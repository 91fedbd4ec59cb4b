//! Free functions over the process-wide instance.
//!
//! Each call is a no-op (with a warning) when scopes are not initialized.
//! Selection queries return the raw selection; consumers that must honour
//! the enabled flag use [`ScopesReader::effective_scopes`].

use tracing::warn;

use crate::context::ScopesContext;
use crate::error::ScopesError;
use crate::facade::{SceneHost, SceneNodeId, ScopesFacade, ScopesReader};
use crate::instance::current_scopes;
use crate::types::Scope;

fn with_scopes<T>(operation: &str, f: impl FnOnce(&ScopesContext) -> T) -> Option<T> {
    match current_scopes() {
        Some(context) => Some(f(&context)),
        None => {
            warn!(operation, "Scopes are not initialized");
            None
        }
    }
}

pub fn enable_scopes() {
    with_scopes("enable_scopes", |scopes| scopes.enable());
}

pub fn disable_scopes() {
    with_scopes("disable_scopes", |scopes| scopes.disable());
}

pub fn enter_scopes_read_only() {
    with_scopes("enter_scopes_read_only", |scopes| scopes.enter_read_only());
}

/// Leave one read-only level. An unmatched exit reports
/// [`ScopesError::ImbalancedReadOnlyStack`] and leaves the depth at zero.
pub fn exit_scopes_read_only() -> Result<(), ScopesError> {
    with_scopes("exit_scopes_read_only", |scopes| scopes.exit_read_only())
        .ok_or(ScopesError::NotInitialized)?
        .map(|_| ())
}

pub fn get_closest_scopes_facade<H: SceneHost + ?Sized>(
    host: &H,
    node: SceneNodeId,
) -> Option<ScopesFacade> {
    with_scopes("get_closest_scopes_facade", |scopes| {
        crate::facade::get_closest_scopes_facade(scopes, host, node)
    })
    .flatten()
}

pub fn get_selected_scopes() -> Vec<Scope> {
    with_scopes("get_selected_scopes", |scopes| scopes.selected_scopes()).unwrap_or_default()
}

pub fn get_selected_scopes_names() -> Vec<String> {
    with_scopes("get_selected_scopes_names", |scopes| {
        scopes.selected_scope_names()
    })
    .unwrap_or_default()
}
