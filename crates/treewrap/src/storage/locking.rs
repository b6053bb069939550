//! [`LockingMapStorage`] — path-keyed map storage with a lock set.
//!
//! Same address-space semantics as [`MapStorage`], plus logical removal
//! protection: while a path is locked, `remove` fails `PathIsLocked` but
//! `store`/`set` stay legal. This is the variant the engines default to;
//! it is the only one needed when delegate sessions and container mutation
//! compete for the same path within one overall operation.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use treewrap_node::{Node, NodePath};

use crate::error::StorageError;
use crate::storage::{MapStorage, Storage};

#[derive(Debug, Clone, Default)]
pub struct LockingMapStorage {
    inner: MapStorage,
    locks: Rc<RefCell<HashSet<String>>>,
    root: NodePath,
}

impl LockingMapStorage {
    pub fn new() -> Self {
        LockingMapStorage::default()
    }

    fn lock_key(&self, path: &NodePath) -> String {
        self.root.join(path).flatten()
    }
}

impl Storage for LockingMapStorage {
    fn get(&self, path: &NodePath) -> Result<Node, StorageError> {
        self.inner.get(path)
    }

    fn set(&mut self, path: &NodePath, node: Node) -> Result<(), StorageError> {
        self.inner.set(path, node)
    }

    fn has_node(&self, path: &NodePath) -> bool {
        self.inner.has_node(path)
    }

    fn store(&mut self, node: Node, path: &NodePath) -> Result<(), StorageError> {
        self.inner.store(node, path)
    }

    fn remove(&mut self, path: &NodePath) -> Result<Option<Node>, StorageError> {
        if self.locks.borrow().contains(&self.lock_key(path)) {
            return Err(StorageError::PathIsLocked(path.clone()));
        }
        self.inner.remove(path)
    }

    fn lock(&mut self, path: &NodePath) {
        self.locks.borrow_mut().insert(self.lock_key(path));
    }

    fn unlock(&mut self, path: &NodePath) {
        self.locks.borrow_mut().remove(&self.lock_key(path));
    }

    fn fork(&self, path: &NodePath) -> Self {
        LockingMapStorage {
            inner: self.inner.fork(path),
            locks: Rc::clone(&self.locks),
            root: self.root.join(path),
        }
    }

    fn pending(&self) -> usize {
        self.inner.pending()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use treewrap_node::{Label, Scalar};

    #[test]
    fn test_lock_is_shared_with_forks() {
        let mut storage = LockingMapStorage::new();
        storage
            .store(Node::empty_keyed(), &NodePath::root())
            .unwrap();
        let sub = NodePath::root().child(Label::key("sub"));
        storage
            .set(&sub, Node::Scalar(Scalar::Bool(true)))
            .unwrap();
        storage.lock(&sub);

        // The fork addresses the same slot as its root; the lock applies.
        let mut fork = storage.fork(&sub);
        assert_eq!(
            fork.remove(&NodePath::root()),
            Err(StorageError::PathIsLocked(NodePath::root()))
        );
        fork.unlock(&NodePath::root());
        assert!(storage.remove(&sub).is_ok());
    }
}
