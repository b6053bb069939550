//! Path-addressed node stores with the placeholder/lock/fork contract.
//!
//! The engines park partially-built nodes here while they walk the value
//! graph. The discipline is strict single-assignment: a slot is claimed
//! once with a placeholder, filled once, and removed once. Three
//! interchangeable implementations trade generality for speed:
//!
//! - [`StackStorage`] — slot index is the path length; O(1) push/pop, valid
//!   only for strictly linear depth-first traversal, non-delegating fork.
//! - [`MapStorage`] — path-keyed map with a shared-address-space fork;
//!   arbitrary branching, no lock support.
//! - [`LockingMapStorage`] — [`MapStorage`] plus a lock set; the variant the
//!   engines default to, and the only one needed when delegate sessions and
//!   container mutation compete for one path in a single operation.

mod locking;
mod map;
mod stack;

pub use locking::LockingMapStorage;
pub use map::MapStorage;
pub use stack::StackStorage;

use treewrap_node::{Node, NodePath};

use crate::error::StorageError;

/// A path-addressed node store.
///
/// Clones share the address space (handles over one backing store), and a
/// single store must never be touched from more than one thread; the
/// engines are strictly synchronous. Paths handed to a [`fork`](Storage::fork)ed
/// store are relative to the fork root: the empty path addresses the fork
/// root itself, and the root's ancestors are exempt from the parent-filled
/// check.
pub trait Storage: Clone {
    /// Read the node at `path` (placeholders included).
    fn get(&self, path: &NodePath) -> Result<Node, StorageError>;

    /// Overwrite the node at `path`. The parent slot must already be
    /// filled.
    fn set(&mut self, path: &NodePath, node: Node) -> Result<(), StorageError>;

    /// Whether a real (non-placeholder) node is stored at `path`.
    fn has_node(&self, path: &NodePath) -> bool;

    /// Store `node` at `path`: replaces a placeholder if one is present;
    /// otherwise the parent slot must be filled (`PathNotFilled`) and the
    /// slot itself empty (`AlreadyStoringValue`).
    fn store(&mut self, node: Node, path: &NodePath) -> Result<(), StorageError>;

    /// Claim `path` with a placeholder.
    fn store_placeholder(&mut self, path: &NodePath) -> Result<(), StorageError> {
        self.store(Node::Placeholder, path)
    }

    /// Remove and return the node at `path`. `None` if the removed node was
    /// a placeholder. Fails `NoNodeStored` if the slot is empty and
    /// `PathIsLocked` while the path is locked.
    fn remove(&mut self, path: &NodePath) -> Result<Option<Node>, StorageError>;

    /// Protect `path` from removal. `store`/`set` stay legal; this guards
    /// against structural misuse, it is not a concurrency primitive.
    fn lock(&mut self, path: &NodePath);

    /// Lift the protection again.
    fn unlock(&mut self, path: &NodePath);

    /// A store for a nested session rooted at `path` (relative to this
    /// store's own root).
    fn fork(&self, path: &NodePath) -> Self;

    /// Number of slots currently filled in this store's scope, placeholders
    /// included. Delegate disposal uses this to enforce the
    /// exactly-one-pending rule.
    fn pending(&self) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;
    use treewrap_node::{Label, Scalar};

    fn int(i: i64) -> Node {
        Node::Scalar(Scalar::Int(i))
    }

    // Contract checks shared by every implementation.
    fn check_store_contract<S: Storage>(mut storage: S) {
        let root = NodePath::root();
        let child = root.child(Label::key("a"));

        // Storing below an unfilled parent is rejected.
        assert_eq!(
            storage.store(int(1), &child),
            Err(StorageError::PathNotFilled(child.clone()))
        );

        storage.store_placeholder(&root).unwrap();
        assert!(!storage.has_node(&root), "placeholder is not a node");

        // A placeholder is replaced in place.
        storage.store(Node::empty_keyed(), &root).unwrap();
        assert!(storage.has_node(&root));

        // Double store is rejected.
        assert_eq!(
            storage.store(int(2), &root),
            Err(StorageError::AlreadyStoringValue(root.clone()))
        );

        // With the parent filled, children work.
        storage.store(int(3), &child).unwrap();
        assert_eq!(storage.get(&child), Ok(int(3)));
        assert_eq!(storage.remove(&child), Ok(Some(int(3))));
        assert_eq!(
            storage.remove(&child),
            Err(StorageError::NoNodeStored(child.clone()))
        );

        // Removing a placeholder yields None.
        storage.set(&root, Node::Placeholder).unwrap();
        assert_eq!(storage.remove(&root), Ok(None));
    }

    #[test]
    fn test_stack_storage_contract() {
        check_store_contract(StackStorage::new());
    }

    #[test]
    fn test_map_storage_contract() {
        check_store_contract(MapStorage::new());
    }

    #[test]
    fn test_locking_map_storage_contract() {
        check_store_contract(LockingMapStorage::new());
    }

    #[test]
    fn test_lock_discipline() {
        let mut storage = LockingMapStorage::new();
        let root = NodePath::root();
        storage.store(int(7), &root).unwrap();

        storage.lock(&root);
        assert_eq!(
            storage.remove(&root),
            Err(StorageError::PathIsLocked(root.clone()))
        );
        // store/set on a locked path stay legal
        storage.set(&root, int(8)).unwrap();

        storage.unlock(&root);
        assert_eq!(storage.remove(&root), Ok(Some(int(8))));
    }

    #[test]
    fn test_stack_lock_discipline() {
        let mut storage = StackStorage::new();
        let root = NodePath::root();
        storage.store(int(7), &root).unwrap();
        storage.lock(&root);
        assert_eq!(
            storage.remove(&root),
            Err(StorageError::PathIsLocked(root.clone()))
        );
        storage.unlock(&root);
        assert_eq!(storage.remove(&root), Ok(Some(int(7))));
    }

    #[test]
    fn test_fork_isolation() {
        let mut storage = LockingMapStorage::new();
        let root = NodePath::root();
        storage.store(Node::empty_keyed(), &root).unwrap();

        // Fork at /sub: paths are relative, ancestors of the fork root are
        // exempt from the parent-filled check.
        let fork_root = root.child(Label::key("sub"));
        let mut fork = storage.fork(&fork_root);
        fork.store(Node::empty_keyed(), &NodePath::root()).unwrap();
        fork.store(int(1), &NodePath::root().child(Label::key("x")))
            .unwrap();

        // Writes are visible through the original handle at absolute paths.
        assert!(storage.has_node(&fork_root));
        assert_eq!(
            storage.get(&fork_root.child(Label::key("x"))),
            Ok(int(1))
        );
    }

    #[test]
    fn test_fork_pending_counts_own_scope_only() {
        let mut storage = MapStorage::new();
        let root = NodePath::root();
        storage.store(Node::empty_keyed(), &root).unwrap();
        let mut fork = storage.fork(&root.child(Label::key("sub")));
        assert_eq!(fork.pending(), 0);
        fork.store(int(1), &NodePath::root()).unwrap();
        assert_eq!(fork.pending(), 1);
        assert_eq!(storage.pending(), 2);
    }

    #[test]
    fn test_stack_fork_is_independent() {
        let mut storage = StackStorage::new();
        storage.store(int(1), &NodePath::root()).unwrap();
        let mut fork = storage.fork(&NodePath::root().child(Label::key("sub")));
        assert_eq!(fork.pending(), 0);
        fork.store(int(2), &NodePath::root()).unwrap();
        assert_eq!(storage.pending(), 1);
        assert_eq!(storage.get(&NodePath::root()), Ok(int(1)));
    }
}
