//! In-process event bus for store notifications.
//!
//! Store mutations are applied silently; callers that want to log or react to
//! them subscribe here.

use std::cell::RefCell;
use std::sync::mpsc::{Receiver, Sender, channel};

use crate::error::ScopesError;
use crate::facade::FacadeId;

/// Observable change or diagnostic emitted by a scopes context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeEvent {
    CatalogReplaced { size: usize },
    SelectionChanged { names: Vec<String> },
    /// Selected ids removed because they vanished from the catalog.
    SelectionPruned { removed: Vec<String> },
    EnabledChanged { enabled: bool },
    ReadOnlyChanged { depth: usize },
    FacadeAttached { id: FacadeId, parent: Option<FacadeId> },
    FacadeDestroyed { id: FacadeId },
    Diagnostic(ScopesError),
}

#[derive(Default)]
pub struct ScopeEventBus {
    subscribers: RefCell<Vec<Sender<ScopeEvent>>>,
}

impl ScopeEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> Receiver<ScopeEvent> {
        let (sender, receiver) = channel();
        self.subscribers.borrow_mut().push(sender);
        receiver
    }

    /// Deliver to every live subscriber; dropped receivers are forgotten.
    pub fn emit(&self, event: ScopeEvent) {
        self.subscribers
            .borrow_mut()
            .retain(|sender| sender.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }
}

impl std::fmt::Debug for ScopeEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopeEventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
