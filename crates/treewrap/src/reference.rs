//! [`Reference`] — deferred write-back indirection into a live node.
//!
//! A container handle cannot always mutate its node where it lies: the node
//! may sit directly in storage, or nested inside another container that is
//! itself nested, and so on. A reference chain records how to reach it.
//! `get` walks the chain outside-in; `set` replaces the element and writes
//! the whole modified container back through the outer reference, which
//! recurses until a direct storage write resolves the chain.
//!
//! References are transient: each is scoped to one container handle's
//! lifetime.

use treewrap_node::{Node, NodePath};

use crate::error::StorageError;
use crate::storage::Storage;

/// Read/write indirection for a node in a live tree.
#[derive(Debug, Clone)]
pub enum Reference<S: Storage> {
    /// The node lives directly in storage.
    Direct { storage: S, path: NodePath },
    /// The node is an entry of the keyed container behind `outer`.
    KeyedElement { outer: Box<Reference<S>>, key: String },
    /// The node is an element of the unkeyed container behind `outer`.
    UnkeyedElement {
        outer: Box<Reference<S>>,
        index: usize,
    },
}

impl<S: Storage> Reference<S> {
    pub fn direct(storage: S, path: NodePath) -> Self {
        Reference::Direct { storage, path }
    }

    /// Chain onto an entry of the keyed container this reference targets.
    pub fn keyed_element(self, key: impl Into<String>) -> Self {
        Reference::KeyedElement {
            outer: Box::new(self),
            key: key.into(),
        }
    }

    /// Chain onto an element of the unkeyed container this reference
    /// targets.
    pub fn unkeyed_element(self, index: usize) -> Self {
        Reference::UnkeyedElement {
            outer: Box::new(self),
            index,
        }
    }

    /// The storage path of the chain's direct anchor, extended by the
    /// element labels.
    pub fn path(&self) -> NodePath {
        match self {
            Reference::Direct { path, .. } => path.clone(),
            Reference::KeyedElement { outer, key } => {
                outer.path().child(treewrap_node::Label::key(key.clone()))
            }
            Reference::UnkeyedElement { outer, index } => {
                outer.path().child(treewrap_node::Label::index(*index))
            }
        }
    }

    /// The storage handle at the chain's direct anchor.
    fn anchor_storage(&self) -> &S {
        match self {
            Reference::Direct { storage, .. } => storage,
            Reference::KeyedElement { outer, .. } | Reference::UnkeyedElement { outer, .. } => {
                outer.anchor_storage()
            }
        }
    }

    /// Mirror the chain's element nodes into storage, outermost first, so
    /// paths under the chain satisfy the parent-filled check. Returns the
    /// paths actually parked; the caller removes them again in reverse
    /// order once the child operation resolves.
    pub(crate) fn park_chain(&self) -> Result<Vec<NodePath>, StorageError> {
        match self {
            Reference::Direct { .. } => Ok(Vec::new()),
            Reference::KeyedElement { outer, .. } | Reference::UnkeyedElement { outer, .. } => {
                let mut parked = outer.park_chain()?;
                let path = self.path();
                let mut storage = self.anchor_storage().clone();
                if !storage.has_node(&path) {
                    let node = self.get()?;
                    storage.store(node, &path)?;
                    parked.push(path);
                }
                Ok(parked)
            }
        }
    }

    /// Read the referenced node. Element reads require the entry to exist.
    pub fn get(&self) -> Result<Node, StorageError> {
        match self {
            Reference::Direct { storage, path } => storage.get(path),
            Reference::KeyedElement { outer, key } => {
                let container = outer.get()?;
                match container {
                    Node::Keyed(map) => map
                        .get(key.as_str())
                        .cloned()
                        .ok_or_else(|| StorageError::NoNodeStored(self.path())),
                    other => panic!(
                        "treewrap: keyed element reference over a {} node",
                        other.kind()
                    ),
                }
            }
            Reference::UnkeyedElement { outer, index } => {
                let container = outer.get()?;
                match container {
                    Node::Unkeyed(seq) => seq
                        .get(*index)
                        .cloned()
                        .ok_or_else(|| StorageError::NoNodeStored(self.path())),
                    other => panic!(
                        "treewrap: unkeyed element reference over a {} node",
                        other.kind()
                    ),
                }
            }
        }
    }

    /// Write the referenced node, rebuilding and writing back every
    /// enclosing container in the chain.
    pub fn set(&mut self, node: Node) -> Result<(), StorageError> {
        match self {
            Reference::Direct { storage, path } => storage.set(path, node),
            Reference::KeyedElement { outer, key } => {
                let mut container = outer.get()?;
                match &mut container {
                    Node::Keyed(map) => {
                        map.insert(key.clone(), node);
                    }
                    other => panic!(
                        "treewrap: keyed element reference over a {} node",
                        other.kind()
                    ),
                }
                outer.set(container)
            }
            Reference::UnkeyedElement { outer, index } => {
                let mut container = outer.get()?;
                match &mut container {
                    Node::Unkeyed(seq) => {
                        if *index >= seq.len() {
                            panic!(
                                "treewrap: unkeyed element reference index {index} out of \
                                 bounds (len {})",
                                seq.len()
                            );
                        }
                        seq[*index] = node;
                    }
                    other => panic!(
                        "treewrap: unkeyed element reference over a {} node",
                        other.kind()
                    ),
                }
                outer.set(container)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MapStorage;
    use treewrap_node::{Label, Scalar};

    fn int(i: i64) -> Node {
        Node::Scalar(Scalar::Int(i))
    }

    #[test]
    fn test_chained_write_back() {
        let mut storage = MapStorage::new();
        let root = NodePath::root();
        // { "outer": [ { } ] }
        let tree = Node::Keyed(
            [(
                "outer".to_string(),
                Node::Unkeyed(vec![Node::empty_keyed()]),
            )]
            .into_iter()
            .collect(),
        );
        storage.store(tree, &root).unwrap();

        let mut reference = Reference::direct(storage.clone(), root.clone())
            .keyed_element("outer")
            .unkeyed_element(0)
            .keyed_element("inner");
        assert_eq!(reference.path().to_string(), "/outer/0/inner");

        reference.set(int(42)).unwrap();
        assert_eq!(reference.get(), Ok(int(42)));

        // The write propagated all the way into storage.
        let stored = storage.get(&root).unwrap();
        let seq = stored.as_keyed().unwrap()["outer"].as_unkeyed().unwrap();
        assert_eq!(seq[0].as_keyed().unwrap()["inner"], int(42));
    }

    #[test]
    fn test_element_read_requires_entry() {
        let mut storage = MapStorage::new();
        storage
            .store(Node::empty_keyed(), &NodePath::root())
            .unwrap();
        let reference =
            Reference::direct(storage, NodePath::root()).keyed_element("missing");
        assert_eq!(
            reference.get(),
            Err(StorageError::NoNodeStored(
                NodePath::root().child(Label::key("missing"))
            ))
        );
    }
}
