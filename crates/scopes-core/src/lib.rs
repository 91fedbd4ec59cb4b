//! Scopes Core Library
//!
//! Selection and context management for dashboard scopes: a shared store of
//! known and selected scopes, facades that expose it along a host scene tree,
//! a selector that fetches catalogs and commits selections, and a dashboard
//! listing filtered by the selection.

pub mod config;
pub mod context;
pub mod dashboards;
pub mod error;
pub mod facade;
pub mod instance;
pub mod runtime;
pub mod selector;
pub mod store;
pub mod types;
pub mod utils;

pub use dashboards::ScopesDashboards;
pub use facade::ScopesFacade;
pub use instance::initialize_scopes;
pub use selector::ScopesSelector;
pub use utils::{
    disable_scopes, enable_scopes, enter_scopes_read_only, exit_scopes_read_only,
    get_closest_scopes_facade, get_selected_scopes, get_selected_scopes_names,
};

/// Re-exports of commonly used types
pub mod prelude {
    // Configuration
    pub use crate::config::{ConfigStore, ProviderConfig, ScopesConfig};

    // Core state
    pub use crate::context::ScopesContext;
    pub use crate::error::ScopesError;
    pub use crate::instance::{ScopesTeardown, current_scopes, initialize_scopes};
    pub use crate::store::{CatalogUpdate, ScopeEvent, ScopeStore, SelectionReport};
    pub use crate::types::{FilterOperator, Scope, ScopeFilter, SelectionMode};

    // Facades
    pub use crate::facade::{
        FacadeId, SceneGraph, SceneHost, SceneNodeId, ScopesFacade, ScopesReader,
    };

    // Selector
    pub use crate::selector::{
        FetchOutcome, HttpScopesProvider, ScopesProvider, ScopesSelector, SelectorState,
        StaticScopesProvider,
    };

    // Dashboards
    pub use crate::dashboards::{Dashboard, ScopesDashboards};
}
