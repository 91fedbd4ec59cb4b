//! Scopes facades: tree-positioned read-views onto a scopes context.
//!
//! Each host scene node that acts as a scope boundary attaches one facade.
//! Facades link to their parent by id so nested regions can ask for the
//! nearest enclosing scope context. Reads always delegate to the context;
//! a facade stores no selection of its own.
//!
//! Destroying a facade does not reparent its children. Their parent id stops
//! resolving and they behave as roots from then on.

pub mod scene;
pub(crate) mod tree;

use tracing::debug;

use crate::context::ScopesContext;
use crate::error::ScopesError;
use crate::store::ScopeEvent;
use crate::types::Scope;

pub use scene::{SceneGraph, SceneHost, SceneNodeId};

/// Stable identifier of a facade within its context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FacadeId(pub(crate) u64);

impl FacadeId {
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for FacadeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "facade#{}", self.0)
    }
}

/// Read operations shared by the context and every facade.
pub trait ScopesReader {
    /// Selected scopes in selection order.
    fn selected_scopes(&self) -> Vec<Scope>;

    /// Selected scope ids in selection order.
    fn selected_scope_names(&self) -> Vec<String>;

    fn is_enabled(&self) -> bool;

    fn is_read_only(&self) -> bool;

    /// Scopes consumers should filter by: the selection while enabled,
    /// nothing while disabled.
    fn effective_scopes(&self) -> Vec<Scope> {
        if self.is_enabled() {
            self.selected_scopes()
        } else {
            Vec::new()
        }
    }
}

#[derive(Clone)]
pub struct ScopesFacade {
    id: FacadeId,
    owner: SceneNodeId,
    context: ScopesContext,
}

impl ScopesFacade {
    /// Attach a facade to scene node `node`.
    ///
    /// With an explicit `parent` the new facade becomes its child. Without one,
    /// the closest live facade above `node` in the host tree is used, if any.
    pub fn attach<H: SceneHost + ?Sized>(
        context: &ScopesContext,
        host: &H,
        node: SceneNodeId,
        parent: Option<&ScopesFacade>,
    ) -> Result<Self, ScopesError> {
        let parent_id = match parent {
            Some(parent) if !parent.context.ptr_eq(context) => {
                return Err(ScopesError::UnknownFacade(parent.id));
            }
            Some(parent) => Some(parent.id),
            None => host
                .parent_of(node)
                .and_then(|above| closest_facade(context, host, above))
                .map(|(id, _)| id),
        };

        let id = context.facades_mut().insert(node, parent_id)?;
        debug!(facade = %id, node = %node, parent = ?parent_id, "Facade attached");
        context.emit(ScopeEvent::FacadeAttached {
            id,
            parent: parent_id,
        });

        Ok(Self {
            id,
            owner: node,
            context: context.clone(),
        })
    }

    pub fn id(&self) -> FacadeId {
        self.id
    }

    /// Scene node this facade was attached to.
    pub fn owner(&self) -> SceneNodeId {
        self.owner
    }

    pub fn context(&self) -> &ScopesContext {
        &self.context
    }

    pub fn is_alive(&self) -> bool {
        self.context.facades().contains(self.id)
    }

    /// Parent facade, if the link still resolves.
    pub fn parent(&self) -> Option<ScopesFacade> {
        let facades = self.context.facades();
        let parent = facades.get(self.id)?.parent?;
        let node = facades.get(parent)?;
        Some(Self {
            id: parent,
            owner: node.owner,
            context: self.context.clone(),
        })
    }

    pub fn children(&self) -> Vec<FacadeId> {
        self.context
            .facades()
            .get(self.id)
            .map(|node| node.children.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Remove this facade from the tree. Children are left without a parent.
    /// Returns false if it was already destroyed.
    pub fn destroy(&self) -> bool {
        let removed = self.context.facades_mut().remove(self.id);
        if removed {
            debug!(facade = %self.id, "Facade destroyed");
            self.context.emit(ScopeEvent::FacadeDestroyed { id: self.id });
        }
        removed
    }
}

impl ScopesReader for ScopesFacade {
    fn selected_scopes(&self) -> Vec<Scope> {
        self.context.selected_scopes()
    }

    fn selected_scope_names(&self) -> Vec<String> {
        self.context.selected_scope_names()
    }

    fn is_enabled(&self) -> bool {
        self.context.is_enabled()
    }

    fn is_read_only(&self) -> bool {
        self.context.is_read_only()
    }
}

impl PartialEq for ScopesFacade {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.context.ptr_eq(&other.context)
    }
}

impl std::fmt::Debug for ScopesFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopesFacade")
            .field("id", &self.id)
            .field("owner", &self.owner)
            .finish()
    }
}

/// Nearest live facade enclosing `node`, including a facade on `node` itself.
///
/// Walks the host tree up to the first node that owns a facade, then follows
/// facade parent links until one whose owning node is still mounted. Returns
/// `None` when the walk runs out, including through a destroyed parent.
pub fn get_closest_scopes_facade<H: SceneHost + ?Sized>(
    context: &ScopesContext,
    host: &H,
    node: SceneNodeId,
) -> Option<ScopesFacade> {
    closest_facade(context, host, node).map(|(id, owner)| ScopesFacade {
        id,
        owner,
        context: context.clone(),
    })
}

fn closest_facade<H: SceneHost + ?Sized>(
    context: &ScopesContext,
    host: &H,
    node: SceneNodeId,
) -> Option<(FacadeId, SceneNodeId)> {
    let facades = context.facades();

    let mut cursor = Some(node);
    let start = loop {
        let current = cursor?;
        if let Some(id) = facades.facade_of(current) {
            break id;
        }
        cursor = host.parent_of(current);
    };

    let mut candidate = Some(start);
    while let Some(id) = candidate {
        let entry = facades.get(id)?;
        if host.is_mounted(entry.owner) {
            return Some((id, entry.owner));
        }
        candidate = entry.parent;
    }
    None
}
