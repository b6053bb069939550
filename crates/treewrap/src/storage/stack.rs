//! [`StackStorage`] — depth-first stack storage.
//!
//! The slot index is the path length, so the store is a plain vector with
//! O(1) push/pop. Valid only for strictly linear depth-first traversal:
//! labels are not recorded, removal is top-only, and `fork` yields an
//! independent stack (non-delegating). Kept as a documented optimization;
//! the engines default to the path-keyed map.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use treewrap_node::{Node, NodePath};

use crate::error::StorageError;
use crate::storage::Storage;

#[derive(Debug, Clone, Default)]
pub struct StackStorage {
    stack: Rc<RefCell<Vec<Node>>>,
    locks: Rc<RefCell<HashSet<usize>>>,
}

impl StackStorage {
    pub fn new() -> Self {
        StackStorage::default()
    }
}

impl Storage for StackStorage {
    fn get(&self, path: &NodePath) -> Result<Node, StorageError> {
        self.stack
            .borrow()
            .get(path.len())
            .cloned()
            .ok_or_else(|| StorageError::NoNodeStored(path.clone()))
    }

    fn set(&mut self, path: &NodePath, node: Node) -> Result<(), StorageError> {
        let mut stack = self.stack.borrow_mut();
        let index = path.len();
        if index < stack.len() {
            stack[index] = node;
            Ok(())
        } else if index == stack.len() {
            stack.push(node);
            Ok(())
        } else {
            Err(StorageError::PathNotFilled(path.clone()))
        }
    }

    fn has_node(&self, path: &NodePath) -> bool {
        matches!(
            self.stack.borrow().get(path.len()),
            Some(node) if !node.is_placeholder()
        )
    }

    fn store(&mut self, node: Node, path: &NodePath) -> Result<(), StorageError> {
        let mut stack = self.stack.borrow_mut();
        let index = path.len();
        if matches!(stack.get(index), Some(Node::Placeholder)) {
            stack[index] = node;
            Ok(())
        } else if index < stack.len() {
            Err(StorageError::AlreadyStoringValue(path.clone()))
        } else if index == stack.len() {
            stack.push(node);
            Ok(())
        } else {
            Err(StorageError::PathNotFilled(path.clone()))
        }
    }

    fn remove(&mut self, path: &NodePath) -> Result<Option<Node>, StorageError> {
        let index = path.len();
        if self.locks.borrow().contains(&index) {
            return Err(StorageError::PathIsLocked(path.clone()));
        }
        let mut stack = self.stack.borrow_mut();
        if index >= stack.len() {
            return Err(StorageError::NoNodeStored(path.clone()));
        }
        if index != stack.len() - 1 {
            panic!(
                "treewrap: StackStorage removal below the top (index {index}, depth {}); \
                 traversal is not strictly linear, use a map-backed storage",
                stack.len()
            );
        }
        match stack.pop() {
            Some(Node::Placeholder) => Ok(None),
            Some(node) => Ok(Some(node)),
            None => Err(StorageError::NoNodeStored(path.clone())),
        }
    }

    fn lock(&mut self, path: &NodePath) {
        self.locks.borrow_mut().insert(path.len());
    }

    fn unlock(&mut self, path: &NodePath) {
        self.locks.borrow_mut().remove(&path.len());
    }

    fn fork(&self, _path: &NodePath) -> Self {
        StackStorage::new()
    }

    fn pending(&self) -> usize {
        self.stack.borrow().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use treewrap_node::{Label, Scalar};

    #[test]
    fn test_linear_push_pop() {
        let mut storage = StackStorage::new();
        let root = NodePath::root();
        let child = root.child(Label::key("a"));
        let grandchild = child.child(Label::index(0));

        storage.store_placeholder(&root).unwrap();
        storage.store(Node::empty_keyed(), &root).unwrap();
        storage.store_placeholder(&child).unwrap();
        storage
            .store(Node::Scalar(Scalar::Int(1)), &grandchild)
            .unwrap();
        assert_eq!(storage.pending(), 3);

        assert_eq!(
            storage.remove(&grandchild),
            Ok(Some(Node::Scalar(Scalar::Int(1))))
        );
        assert_eq!(storage.remove(&child), Ok(None));
        assert_eq!(storage.remove(&root), Ok(Some(Node::empty_keyed())));
        assert_eq!(storage.pending(), 0);
    }

    #[test]
    #[should_panic(expected = "not strictly linear")]
    fn test_removal_below_the_top_is_misuse() {
        let mut storage = StackStorage::new();
        let root = NodePath::root();
        storage.store(Node::empty_keyed(), &root).unwrap();
        storage
            .store(Node::Nil, &root.child(Label::key("a")))
            .unwrap();
        let _ = storage.remove(&root);
    }
}
