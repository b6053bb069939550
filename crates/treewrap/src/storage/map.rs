//! [`MapStorage`] — path-keyed map storage.
//!
//! Slots live in a shared map keyed by the flattened path, so arbitrary
//! branching is supported and forks share the address space: a fork's
//! writes land in the backing map under `root + relative_path` and are
//! visible to every other handle. Locking is not supported; `lock` is a
//! no-op and `remove` never fails `PathIsLocked`. Use
//! [`LockingMapStorage`](super::LockingMapStorage) when delegate sessions
//! and container mutation compete for one path.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use treewrap_node::{Node, NodePath};

use crate::error::StorageError;
use crate::storage::Storage;

enum Slot {
    Empty,
    Placeholder,
    Filled,
}

#[derive(Debug, Clone, Default)]
pub struct MapStorage {
    nodes: Rc<RefCell<HashMap<String, Node>>>,
    root: NodePath,
}

impl MapStorage {
    pub fn new() -> Self {
        MapStorage::default()
    }

    fn key(&self, path: &NodePath) -> String {
        self.root.join(path).flatten()
    }

    /// Parent-filled check. The fork root's own parent chain lives outside
    /// this store's scope and is exempt.
    fn parent_filled(&self, path: &NodePath) -> bool {
        match path.parent() {
            None => true,
            Some(parent) => self.nodes.borrow().contains_key(&self.key(&parent)),
        }
    }
}

impl Storage for MapStorage {
    fn get(&self, path: &NodePath) -> Result<Node, StorageError> {
        self.nodes
            .borrow()
            .get(&self.key(path))
            .cloned()
            .ok_or_else(|| StorageError::NoNodeStored(path.clone()))
    }

    fn set(&mut self, path: &NodePath, node: Node) -> Result<(), StorageError> {
        if !self.parent_filled(path) {
            return Err(StorageError::PathNotFilled(path.clone()));
        }
        self.nodes.borrow_mut().insert(self.key(path), node);
        Ok(())
    }

    fn has_node(&self, path: &NodePath) -> bool {
        matches!(
            self.nodes.borrow().get(&self.key(path)),
            Some(node) if !node.is_placeholder()
        )
    }

    fn store(&mut self, node: Node, path: &NodePath) -> Result<(), StorageError> {
        let key = self.key(path);
        let slot = {
            let nodes = self.nodes.borrow();
            match nodes.get(&key) {
                None => Slot::Empty,
                Some(Node::Placeholder) => Slot::Placeholder,
                Some(_) => Slot::Filled,
            }
        };
        match slot {
            Slot::Placeholder => {
                self.nodes.borrow_mut().insert(key, node);
                Ok(())
            }
            Slot::Filled => Err(StorageError::AlreadyStoringValue(path.clone())),
            Slot::Empty => {
                if !self.parent_filled(path) {
                    return Err(StorageError::PathNotFilled(path.clone()));
                }
                self.nodes.borrow_mut().insert(key, node);
                Ok(())
            }
        }
    }

    fn remove(&mut self, path: &NodePath) -> Result<Option<Node>, StorageError> {
        match self.nodes.borrow_mut().remove(&self.key(path)) {
            None => Err(StorageError::NoNodeStored(path.clone())),
            Some(Node::Placeholder) => Ok(None),
            Some(node) => Ok(Some(node)),
        }
    }

    fn lock(&mut self, _path: &NodePath) {}

    fn unlock(&mut self, _path: &NodePath) {}

    fn fork(&self, path: &NodePath) -> Self {
        MapStorage {
            nodes: Rc::clone(&self.nodes),
            root: self.root.join(path),
        }
    }

    fn pending(&self) -> usize {
        let prefix = self.root.flatten();
        self.nodes
            .borrow()
            .keys()
            .filter(|key| in_scope(key, &prefix))
            .count()
    }
}

/// Whether a flattened key lies at or below the scope whose flattened root
/// is `prefix`.
fn in_scope(key: &str, prefix: &str) -> bool {
    key == prefix || (key.starts_with(prefix) && key[prefix.len()..].starts_with('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use treewrap_node::Label;

    #[test]
    fn test_in_scope_requires_component_boundary() {
        assert!(in_scope("/a", ""));
        assert!(in_scope("/a/b", "/a"));
        assert!(in_scope("/a", "/a"));
        assert!(!in_scope("/ab", "/a"));
        assert!(!in_scope("/b", "/a"));
    }

    #[test]
    fn test_clones_share_the_address_space() {
        let mut storage = MapStorage::new();
        let mut handle = storage.clone();
        storage
            .store(Node::empty_unkeyed(), &NodePath::root())
            .unwrap();
        handle
            .set(&NodePath::root().child(Label::index(0)), Node::Nil)
            .unwrap();
        assert!(storage.has_node(&NodePath::root().child(Label::index(0))));
    }
}
