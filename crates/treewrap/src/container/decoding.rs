//! Decoding-side container handles.

use treewrap_node::{Label, Node, NodePath};

use crate::adapter::Adapter;
use crate::decode::{Decodable, Decoder, DelegateDecoder};
use crate::error::DecodeError;
use crate::reference::Reference;
use crate::storage::Storage;

impl<'a, S: Storage, A: Adapter> Decoder<'a, S, A> {
    /// Keyed container handle over the node at the current path.
    ///
    /// A node of any other variant is a `TypeMismatch`: that is malformed
    /// data, not a broken callback.
    pub fn container_keyed(&mut self) -> Result<KeyedDecoding<'_, 'a, S, A>, DecodeError> {
        let path = self.path.clone();
        match self.storage.get(&path)? {
            Node::Keyed(_) => {}
            _ => {
                return Err(DecodeError::TypeMismatch {
                    expected: "keyed container",
                    path,
                });
            }
        }
        Ok(KeyedDecoding {
            reference: Reference::direct(self.storage.clone(), path.clone()),
            path,
            decoder: self,
        })
    }

    /// Unkeyed container handle over the node at the current path.
    pub fn container_unkeyed(&mut self) -> Result<UnkeyedDecoding<'_, 'a, S, A>, DecodeError> {
        let path = self.path.clone();
        let len = match self.storage.get(&path)? {
            Node::Unkeyed(seq) => seq.len(),
            _ => {
                return Err(DecodeError::TypeMismatch {
                    expected: "unkeyed container",
                    path,
                });
            }
        };
        Ok(UnkeyedDecoding {
            reference: Reference::direct(self.storage.clone(), path.clone()),
            path,
            cursor: 0,
            len,
            decoder: self,
        })
    }

    /// Single-value handle over the node at the current path.
    pub fn container_single_value(&mut self) -> SingleValueDecoding<'_, 'a, S, A> {
        let path = self.path.clone();
        SingleValueDecoding {
            reference: Reference::direct(self.storage.clone(), path.clone()),
            path,
            decoder: self,
        }
    }
}

/// Handle over a keyed container node being decoded.
pub struct KeyedDecoding<'h, 'a, S: Storage, A: Adapter> {
    pub(crate) decoder: &'h mut Decoder<'a, S, A>,
    pub(crate) reference: Reference<S>,
    pub(crate) path: NodePath,
}

impl<'h, 'a, S: Storage, A: Adapter> KeyedDecoding<'h, 'a, S, A> {
    fn entry(&self, key: &str) -> Result<Node, DecodeError> {
        let container = self.reference.get()?;
        match container {
            Node::Keyed(map) => map.get(key).cloned().ok_or_else(|| DecodeError::KeyNotFound {
                key: key.to_string(),
                path: self.path.clone(),
            }),
            other => panic!("treewrap: keyed decoding over a {} node", other.kind()),
        }
    }

    /// Decode the entry under `key`; `KeyNotFound` if absent.
    pub fn decode_field<T: Decodable>(&mut self, key: &str) -> Result<T, DecodeError> {
        let node = self.entry(key)?;
        self.decoder
            .unwrap_from(&self.path, Some(node), Some(Label::key(key)))
    }

    /// Decode the entry under `key` if present; `Ok(None)` for an absent
    /// key (an explicit nil still decodes through `T`).
    pub fn decode_field_opt<T: Decodable>(&mut self, key: &str) -> Result<Option<T>, DecodeError> {
        if !self.contains(key)? {
            return Ok(None);
        }
        self.decode_field(key).map(Some)
    }

    pub fn contains(&self, key: &str) -> Result<bool, DecodeError> {
        let container = self.reference.get()?;
        match container {
            Node::Keyed(map) => Ok(map.contains_key(key)),
            other => panic!("treewrap: keyed decoding over a {} node", other.kind()),
        }
    }

    /// The entry keys, in container order.
    pub fn keys(&self) -> Result<Vec<String>, DecodeError> {
        let container = self.reference.get()?;
        match container {
            Node::Keyed(map) => Ok(map.keys().cloned().collect()),
            other => panic!("treewrap: keyed decoding over a {} node", other.kind()),
        }
    }

    pub fn len(&self) -> Result<usize, DecodeError> {
        Ok(self.keys()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, DecodeError> {
        Ok(self.len()? == 0)
    }

    /// Descend into the keyed container under `key`.
    pub fn nested_keyed(&mut self, key: &str) -> Result<KeyedDecoding<'_, 'a, S, A>, DecodeError> {
        let node = self.entry(key)?;
        let child_path = self.path.child(Label::key(key));
        if !node.is_keyed() {
            return Err(DecodeError::TypeMismatch {
                expected: "keyed container",
                path: child_path,
            });
        }
        self.park(&child_path, node)?;
        Ok(KeyedDecoding {
            reference: self.reference.clone().keyed_element(key),
            path: child_path,
            decoder: &mut *self.decoder,
        })
    }

    /// Descend into the unkeyed container under `key`.
    pub fn nested_unkeyed(
        &mut self,
        key: &str,
    ) -> Result<UnkeyedDecoding<'_, 'a, S, A>, DecodeError> {
        let node = self.entry(key)?;
        let child_path = self.path.child(Label::key(key));
        let len = match &node {
            Node::Unkeyed(seq) => seq.len(),
            _ => {
                return Err(DecodeError::TypeMismatch {
                    expected: "unkeyed container",
                    path: child_path,
                });
            }
        };
        self.park(&child_path, node)?;
        Ok(UnkeyedDecoding {
            reference: self.reference.clone().keyed_element(key),
            path: child_path,
            cursor: 0,
            len,
            decoder: &mut *self.decoder,
        })
    }

    /// Open a delegate session over the entry under `key`.
    pub fn delegate_decoder(&mut self, key: &str) -> Result<DelegateDecoder<'a, S, A>, DecodeError> {
        let node = self.entry(key)?;
        DelegateDecoder::new(
            self.decoder.adapter,
            &self.decoder.storage,
            self.path.child(Label::key(key)),
            node,
        )
    }

    /// Park a sub-node so deeper decode callbacks can request containers
    /// over it.
    fn park(&mut self, path: &NodePath, node: Node) -> Result<(), DecodeError> {
        if !self.decoder.storage.has_node(path) {
            self.decoder.storage.store(node, path)?;
        }
        Ok(())
    }
}

/// Handle over an unkeyed container node being decoded.
///
/// Driven by a sequential cursor that advances only after a successful
/// decode: a failed attempt leaves the cursor on the same element, so a
/// second attempt with another target type can succeed.
pub struct UnkeyedDecoding<'h, 'a, S: Storage, A: Adapter> {
    pub(crate) decoder: &'h mut Decoder<'a, S, A>,
    pub(crate) reference: Reference<S>,
    pub(crate) path: NodePath,
    pub(crate) cursor: usize,
    pub(crate) len: usize,
}

impl<'h, 'a, S: Storage, A: Adapter> UnkeyedDecoding<'h, 'a, S, A> {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.len - self.cursor
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.len
    }

    fn element(&self) -> Result<Node, DecodeError> {
        if self.is_exhausted() {
            return Err(DecodeError::ValueNotFound {
                path: self.path.child(Label::index(self.cursor)),
            });
        }
        let container = self.reference.get()?;
        match container {
            Node::Unkeyed(seq) => Ok(seq[self.cursor].clone()),
            other => panic!("treewrap: unkeyed decoding over a {} node", other.kind()),
        }
    }

    /// Decode the element at the cursor, advancing it on success only.
    pub fn decode_element<T: Decodable>(&mut self) -> Result<T, DecodeError> {
        let node = self.element()?;
        let value =
            self.decoder
                .unwrap_from(&self.path, Some(node), Some(Label::index(self.cursor)))?;
        self.cursor += 1;
        Ok(value)
    }

    /// Descend into the keyed container at the cursor, advancing it.
    pub fn nested_keyed(&mut self) -> Result<KeyedDecoding<'_, 'a, S, A>, DecodeError> {
        let node = self.element()?;
        let index = self.cursor;
        let child_path = self.path.child(Label::index(index));
        if !node.is_keyed() {
            return Err(DecodeError::TypeMismatch {
                expected: "keyed container",
                path: child_path,
            });
        }
        self.park(&child_path, node)?;
        self.cursor += 1;
        Ok(KeyedDecoding {
            reference: self.reference.clone().unkeyed_element(index),
            path: child_path,
            decoder: &mut *self.decoder,
        })
    }

    /// Descend into the unkeyed container at the cursor, advancing it.
    pub fn nested_unkeyed(&mut self) -> Result<UnkeyedDecoding<'_, 'a, S, A>, DecodeError> {
        let node = self.element()?;
        let index = self.cursor;
        let child_path = self.path.child(Label::index(index));
        let len = match &node {
            Node::Unkeyed(seq) => seq.len(),
            _ => {
                return Err(DecodeError::TypeMismatch {
                    expected: "unkeyed container",
                    path: child_path,
                });
            }
        };
        self.park(&child_path, node)?;
        self.cursor += 1;
        Ok(UnkeyedDecoding {
            reference: self.reference.clone().unkeyed_element(index),
            path: child_path,
            cursor: 0,
            len,
            decoder: &mut *self.decoder,
        })
    }

    /// Open a delegate session over the element at the cursor, advancing
    /// it.
    pub fn delegate_decoder(&mut self) -> Result<DelegateDecoder<'a, S, A>, DecodeError> {
        let node = self.element()?;
        let delegate = DelegateDecoder::new(
            self.decoder.adapter,
            &self.decoder.storage,
            self.path.child(Label::index(self.cursor)),
            node,
        )?;
        self.cursor += 1;
        Ok(delegate)
    }

    fn park(&mut self, path: &NodePath, node: Node) -> Result<(), DecodeError> {
        if !self.decoder.storage.has_node(path) {
            self.decoder.storage.store(node, path)?;
        }
        Ok(())
    }
}

/// Handle over the single value at the current path.
pub struct SingleValueDecoding<'h, 'a, S: Storage, A: Adapter> {
    pub(crate) decoder: &'h mut Decoder<'a, S, A>,
    pub(crate) reference: Reference<S>,
    pub(crate) path: NodePath,
}

impl<'h, 'a, S: Storage, A: Adapter> SingleValueDecoding<'h, 'a, S, A> {
    /// Whether the node here is nil.
    pub fn is_nil(&self) -> Result<bool, DecodeError> {
        Ok(self.reference.get()?.is_nil())
    }

    /// Decode the node at this path.
    pub fn decode<T: Decodable>(&mut self) -> Result<T, DecodeError> {
        let node = self.reference.get()?;
        self.decoder.unwrap_from(&self.path, Some(node), None)
    }
}
