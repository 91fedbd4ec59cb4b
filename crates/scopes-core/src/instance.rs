//! Process-wide scopes instance.
//!
//! The UI thread installs one [`ScopesContext`] with [`initialize_scopes`] and
//! releases it through the returned [`ScopesTeardown`]. The slot is
//! thread-local: the context is `!Send` and lives on the thread that drives
//! the UI event loop.

use std::cell::RefCell;

use tracing::{debug, info};

use crate::config::ScopesConfig;
use crate::context::ScopesContext;
use crate::error::ScopesError;

thread_local! {
    static INSTANCE: RefCell<Option<ScopesContext>> = const { RefCell::new(None) };
}

/// Create and install the process-wide context from `config`.
///
/// Fails with [`ScopesError::AlreadyInitialized`] while a previous instance
/// has not been torn down.
pub fn initialize_scopes(config: &ScopesConfig) -> Result<ScopesTeardown, ScopesError> {
    install(ScopesContext::new(config))
}

/// Install an already built context as the process-wide instance.
pub fn install(context: ScopesContext) -> Result<ScopesTeardown, ScopesError> {
    INSTANCE.with(|slot| {
        let mut slot = slot.borrow_mut();
        if slot.is_some() {
            return Err(ScopesError::AlreadyInitialized);
        }
        *slot = Some(context.clone());
        Ok(())
    })?;

    info!(catalog = context.catalog_len(), "Scopes initialized");
    Ok(ScopesTeardown {
        context,
        released: false,
    })
}

/// The installed context, if any.
pub fn current_scopes() -> Option<ScopesContext> {
    INSTANCE.with(|slot| slot.borrow().clone())
}

pub fn is_initialized() -> bool {
    INSTANCE.with(|slot| slot.borrow().is_some())
}

/// Release guard for the process-wide instance.
///
/// [`teardown`](Self::teardown) consumes the guard, so it runs at most once;
/// dropping the guard tears down as well.
#[must_use = "dropping the guard tears the scopes instance down"]
pub struct ScopesTeardown {
    context: ScopesContext,
    released: bool,
}

impl ScopesTeardown {
    pub fn context(&self) -> &ScopesContext {
        &self.context
    }

    pub fn teardown(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        INSTANCE.with(|slot| {
            let mut slot = slot.borrow_mut();
            if slot
                .as_ref()
                .is_some_and(|installed| installed.ptr_eq(&self.context))
            {
                *slot = None;
            }
        });
        debug!("Scopes torn down");
    }
}

impl Drop for ScopesTeardown {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for ScopesTeardown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopesTeardown")
            .field("released", &self.released)
            .finish()
    }
}
