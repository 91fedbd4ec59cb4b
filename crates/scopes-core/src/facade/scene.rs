//! Host scene tree protocol.
//!
//! The host UI owns its node tree. Facade lookups only need to walk from a
//! node to its parent and to know whether a node is still mounted.

use std::collections::HashMap;

/// Identifier of a node in the host scene tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SceneNodeId(pub u64);

impl std::fmt::Display for SceneNodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// What a host scene tree must expose for facade resolution.
pub trait SceneHost {
    /// Enclosing node, or `None` at a root.
    fn parent_of(&self, node: SceneNodeId) -> Option<SceneNodeId>;

    /// Whether the node is still part of the live tree.
    fn is_mounted(&self, node: SceneNodeId) -> bool;
}

impl<H: SceneHost + ?Sized> SceneHost for &H {
    fn parent_of(&self, node: SceneNodeId) -> Option<SceneNodeId> {
        (**self).parent_of(node)
    }

    fn is_mounted(&self, node: SceneNodeId) -> bool {
        (**self).is_mounted(node)
    }
}

#[derive(Debug, Clone)]
struct SceneEntry {
    label: String,
    parent: Option<SceneNodeId>,
    mounted: bool,
}

/// Minimal in-memory scene tree for hosts without their own.
#[derive(Debug, Default)]
pub struct SceneGraph {
    next_id: u64,
    nodes: HashMap<SceneNodeId, SceneEntry>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_root(&mut self, label: impl Into<String>) -> SceneNodeId {
        self.push(label.into(), None)
    }

    /// Add a node under `parent`. An unknown parent yields a detached root.
    pub fn add_child(&mut self, parent: SceneNodeId, label: impl Into<String>) -> SceneNodeId {
        let parent = self.nodes.contains_key(&parent).then_some(parent);
        self.push(label.into(), parent)
    }

    /// Unmount `node` and everything below it.
    pub fn unmount(&mut self, node: SceneNodeId) {
        let doomed: Vec<SceneNodeId> = self
            .nodes
            .keys()
            .copied()
            .filter(|candidate| self.is_descendant_or_self(*candidate, node))
            .collect();
        for id in doomed {
            if let Some(entry) = self.nodes.get_mut(&id) {
                entry.mounted = false;
            }
        }
    }

    pub fn label(&self, node: SceneNodeId) -> Option<&str> {
        self.nodes.get(&node).map(|entry| entry.label.as_str())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn push(&mut self, label: String, parent: Option<SceneNodeId>) -> SceneNodeId {
        self.next_id += 1;
        let id = SceneNodeId(self.next_id);
        self.nodes.insert(
            id,
            SceneEntry {
                label,
                parent,
                mounted: true,
            },
        );
        id
    }

    fn is_descendant_or_self(&self, candidate: SceneNodeId, ancestor: SceneNodeId) -> bool {
        let mut cursor = Some(candidate);
        while let Some(node) = cursor {
            if node == ancestor {
                return true;
            }
            cursor = self.parent_of(node);
        }
        false
    }
}

impl SceneHost for SceneGraph {
    fn parent_of(&self, node: SceneNodeId) -> Option<SceneNodeId> {
        self.nodes.get(&node).and_then(|entry| entry.parent)
    }

    fn is_mounted(&self, node: SceneNodeId) -> bool {
        self.nodes.get(&node).is_some_and(|entry| entry.mounted)
    }
}
