//! Arena of facade nodes addressed by stable ids.
//!
//! Parent and child links are ids, never ownership. Ids are never reused, so a
//! destroyed node is detected by its id no longer resolving.

use std::collections::{BTreeSet, HashMap};

use crate::error::ScopesError;

use super::FacadeId;
use super::scene::SceneNodeId;

#[derive(Debug, Clone)]
pub(crate) struct FacadeNode {
    pub owner: SceneNodeId,
    pub parent: Option<FacadeId>,
    pub children: BTreeSet<FacadeId>,
}

#[derive(Debug, Default)]
pub(crate) struct FacadeTree {
    next_id: u64,
    nodes: HashMap<FacadeId, FacadeNode>,
    by_owner: HashMap<SceneNodeId, FacadeId>,
}

impl FacadeTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        owner: SceneNodeId,
        parent: Option<FacadeId>,
    ) -> Result<FacadeId, ScopesError> {
        if let Some(existing) = self.by_owner.get(&owner) {
            return Err(ScopesError::FacadeAlreadyAttached(*existing));
        }
        if let Some(parent) = parent
            && !self.nodes.contains_key(&parent)
        {
            return Err(ScopesError::UnknownFacade(parent));
        }

        self.next_id += 1;
        let id = FacadeId(self.next_id);
        self.nodes.insert(
            id,
            FacadeNode {
                owner,
                parent,
                children: BTreeSet::new(),
            },
        );
        self.by_owner.insert(owner, id);
        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.insert(id);
        }
        Ok(id)
    }

    /// Detach `id` from its parent and drop it. Children keep their (now
    /// dangling) parent id. Returns false if `id` was already gone.
    pub fn remove(&mut self, id: FacadeId) -> bool {
        let Some(node) = self.nodes.remove(&id) else {
            return false;
        };
        if let Some(parent) = node.parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.remove(&id);
        }
        if self.by_owner.get(&node.owner) == Some(&id) {
            self.by_owner.remove(&node.owner);
        }
        true
    }

    pub fn get(&self, id: FacadeId) -> Option<&FacadeNode> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: FacadeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn facade_of(&self, owner: SceneNodeId) -> Option<FacadeId> {
        self.by_owner.get(&owner).copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_detaches_from_parent_but_leaves_children_dangling() {
        let mut tree = FacadeTree::new();
        let root = tree.insert(SceneNodeId(1), None).unwrap();
        let mid = tree.insert(SceneNodeId(2), Some(root)).unwrap();
        let leaf = tree.insert(SceneNodeId(3), Some(mid)).unwrap();

        assert!(tree.remove(mid));
        assert!(!tree.remove(mid));

        assert!(tree.get(root).unwrap().children.is_empty());
        assert_eq!(tree.get(leaf).unwrap().parent, Some(mid));
        assert!(!tree.contains(mid));
        assert_eq!(tree.facade_of(SceneNodeId(2)), None);
    }

    #[test]
    fn test_insert_rejects_second_facade_on_same_owner() {
        let mut tree = FacadeTree::new();
        let first = tree.insert(SceneNodeId(1), None).unwrap();
        assert_eq!(
            tree.insert(SceneNodeId(1), None),
            Err(ScopesError::FacadeAlreadyAttached(first))
        );
    }

    #[test]
    fn test_insert_rejects_dead_parent() {
        let mut tree = FacadeTree::new();
        let parent = tree.insert(SceneNodeId(1), None).unwrap();
        tree.remove(parent);
        assert_eq!(
            tree.insert(SceneNodeId(2), Some(parent)),
            Err(ScopesError::UnknownFacade(parent))
        );
    }

    #[test]
    fn test_ids_are_never_reused() {
        let mut tree = FacadeTree::new();
        let first = tree.insert(SceneNodeId(1), None).unwrap();
        tree.remove(first);
        let second = tree.insert(SceneNodeId(1), None).unwrap();
        assert_ne!(first, second);
    }
}
