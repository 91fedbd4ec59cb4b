//! Scope catalog providers.

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use crate::types::Scope;

/// Backend that supplies the scope catalog.
///
/// Implementations are ordinary fallible async calls; the selector decides
/// what to do with superseded or failed responses.
pub trait ScopesProvider {
    fn fetch_scopes(&self) -> impl Future<Output = anyhow::Result<Vec<Scope>>>;
}

impl<P: ScopesProvider + ?Sized> ScopesProvider for &P {
    fn fetch_scopes(&self) -> impl Future<Output = anyhow::Result<Vec<Scope>>> {
        (**self).fetch_scopes()
    }
}

impl<P: ScopesProvider + ?Sized> ScopesProvider for Rc<P> {
    fn fetch_scopes(&self) -> impl Future<Output = anyhow::Result<Vec<Scope>>> {
        (**self).fetch_scopes()
    }
}

/// In-memory catalog, e.g. the `[[scope]]` entries of `scopes.toml`.
#[derive(Debug, Default)]
pub struct StaticScopesProvider {
    scopes: RefCell<Vec<Scope>>,
}

impl StaticScopesProvider {
    pub fn new(scopes: Vec<Scope>) -> Self {
        Self {
            scopes: RefCell::new(scopes),
        }
    }

    /// Replace what later fetches return.
    pub fn set_scopes(&self, scopes: Vec<Scope>) {
        *self.scopes.borrow_mut() = scopes;
    }
}

impl ScopesProvider for StaticScopesProvider {
    async fn fetch_scopes(&self) -> anyhow::Result<Vec<Scope>> {
        Ok(self.scopes.borrow().clone())
    }
}
