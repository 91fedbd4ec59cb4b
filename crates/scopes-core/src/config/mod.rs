//! Configuration for the scopes subsystem (`scopes.toml`).
//!
//! The default location is `<config dir>/scopes/scopes.toml`; an explicit
//! path can always be given instead.

pub mod parser;
pub mod paths;
pub mod schema;
pub mod store;

pub use parser::{parse_scopes_toml, parse_scopes_toml_str, to_toml};
pub use paths::default_config_path;
pub use schema::{ProviderConfig, ScopesConfig};
pub use store::ConfigStore;
