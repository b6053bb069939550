//! Encoding-side container handles.

use treewrap_node::{Label, Node, NodePath};

use crate::adapter::Adapter;
use crate::encode::{DelegateEncoder, Encodable, Encoder};
use crate::error::EncodeError;
use crate::reference::Reference;
use crate::storage::Storage;

impl<'a, S: Storage, A: Adapter> Encoder<'a, S, A> {
    /// Keyed container handle at the current path.
    ///
    /// Replaces the placeholder claiming the path with an empty keyed
    /// container on first request. Requesting a container kind the path
    /// already holds another kind for is a fatal misuse.
    pub fn container_keyed(&mut self) -> Result<KeyedEncoding<'_, 'a, S, A>, EncodeError> {
        let path = self.path.clone();
        match self.storage.get(&path)? {
            Node::Placeholder => {
                let empty = self.adapter.empty_keyed();
                self.storage.store(empty, &path)?;
            }
            Node::Keyed(_) => {}
            other => panic!(
                "treewrap: keyed container requested at {path} which already holds a {} node",
                other.kind()
            ),
        }
        Ok(KeyedEncoding {
            reference: Reference::direct(self.storage.clone(), path.clone()),
            path,
            encoder: self,
        })
    }

    /// Unkeyed container handle at the current path.
    pub fn container_unkeyed(&mut self) -> Result<UnkeyedEncoding<'_, 'a, S, A>, EncodeError> {
        let path = self.path.clone();
        match self.storage.get(&path)? {
            Node::Placeholder => {
                let empty = self.adapter.empty_unkeyed();
                self.storage.store(empty, &path)?;
            }
            Node::Unkeyed(_) => {}
            other => panic!(
                "treewrap: unkeyed container requested at {path} which already holds a {} node",
                other.kind()
            ),
        }
        Ok(UnkeyedEncoding {
            reference: Reference::direct(self.storage.clone(), path.clone()),
            path,
            encoder: self,
        })
    }

    /// Single-value handle at the current path. The placeholder keeps
    /// claiming the slot until the one permitted encode resolves it.
    pub fn container_single_value(&mut self) -> SingleValueEncoding<'_, 'a, S, A> {
        let path = self.path.clone();
        SingleValueEncoding {
            reference: Reference::direct(self.storage.clone(), path.clone()),
            path,
            encoder: self,
        }
    }
}

/// Handle over a keyed container node being encoded.
pub struct KeyedEncoding<'h, 'a, S: Storage, A: Adapter> {
    pub(crate) encoder: &'h mut Encoder<'a, S, A>,
    pub(crate) reference: Reference<S>,
    pub(crate) path: NodePath,
}

impl<'h, 'a, S: Storage, A: Adapter> KeyedEncoding<'h, 'a, S, A> {
    /// Encode `value` under `key` (last write wins).
    pub fn encode_field<V>(&mut self, key: &str, value: &V) -> Result<(), EncodeError>
    where
        V: Encodable + ?Sized,
    {
        let node = self
            .encoder
            .wrap_under(&self.reference, &self.path, value, Some(Label::key(key)))?;
        self.put(key, node)
    }

    fn put(&mut self, key: &str, node: Node) -> Result<(), EncodeError> {
        let mut container = self.reference.get()?;
        match &mut container {
            Node::Keyed(map) => {
                map.insert(key.to_string(), node);
            }
            other => panic!("treewrap: keyed encoding over a {} node", other.kind()),
        }
        self.reference.set(container)?;
        Ok(())
    }

    /// Open a fresh keyed container under `key`.
    pub fn nested_keyed(&mut self, key: &str) -> Result<KeyedEncoding<'_, 'a, S, A>, EncodeError> {
        let empty = self.encoder.adapter.empty_keyed();
        self.put(key, empty)?;
        Ok(KeyedEncoding {
            reference: self.reference.clone().keyed_element(key),
            path: self.path.child(Label::key(key)),
            encoder: &mut *self.encoder,
        })
    }

    /// Open a fresh unkeyed container under `key`.
    pub fn nested_unkeyed(
        &mut self,
        key: &str,
    ) -> Result<UnkeyedEncoding<'_, 'a, S, A>, EncodeError> {
        let empty = self.encoder.adapter.empty_unkeyed();
        self.put(key, empty)?;
        Ok(UnkeyedEncoding {
            reference: self.reference.clone().keyed_element(key),
            path: self.path.child(Label::key(key)),
            encoder: &mut *self.encoder,
        })
    }

    /// Open a delegate session whose result lands under `key`.
    pub fn delegate_encoder(&mut self, key: &str) -> Result<DelegateEncoder<'a, S, A>, EncodeError> {
        DelegateEncoder::new(
            self.encoder.adapter,
            &self.encoder.storage,
            self.path.child(Label::key(key)),
            self.reference.clone().keyed_element(key),
        )
    }
}

/// Handle over an unkeyed container node being encoded.
pub struct UnkeyedEncoding<'h, 'a, S: Storage, A: Adapter> {
    pub(crate) encoder: &'h mut Encoder<'a, S, A>,
    pub(crate) reference: Reference<S>,
    pub(crate) path: NodePath,
}

impl<'h, 'a, S: Storage, A: Adapter> UnkeyedEncoding<'h, 'a, S, A> {
    /// Number of elements appended so far.
    pub fn len(&self) -> Result<usize, EncodeError> {
        let container = self.reference.get()?;
        match container {
            Node::Unkeyed(seq) => Ok(seq.len()),
            other => panic!("treewrap: unkeyed encoding over a {} node", other.kind()),
        }
    }

    pub fn is_empty(&self) -> Result<bool, EncodeError> {
        Ok(self.len()? == 0)
    }

    /// Encode `value` as the next element. Appends only on success, so a
    /// failed child leaves the container untouched.
    pub fn encode_element<V>(&mut self, value: &V) -> Result<(), EncodeError>
    where
        V: Encodable + ?Sized,
    {
        let index = self.len()?;
        let node = self
            .encoder
            .wrap_under(&self.reference, &self.path, value, Some(Label::index(index)))?;
        self.append(node)
    }

    fn append(&mut self, node: Node) -> Result<(), EncodeError> {
        let mut container = self.reference.get()?;
        match &mut container {
            Node::Unkeyed(seq) => seq.push(node),
            other => panic!("treewrap: unkeyed encoding over a {} node", other.kind()),
        }
        self.reference.set(container)?;
        Ok(())
    }

    /// Open a fresh keyed container as the next element.
    pub fn nested_keyed(&mut self) -> Result<KeyedEncoding<'_, 'a, S, A>, EncodeError> {
        let index = self.len()?;
        let empty = self.encoder.adapter.empty_keyed();
        self.append(empty)?;
        Ok(KeyedEncoding {
            reference: self.reference.clone().unkeyed_element(index),
            path: self.path.child(Label::index(index)),
            encoder: &mut *self.encoder,
        })
    }

    /// Open a fresh unkeyed container as the next element.
    pub fn nested_unkeyed(&mut self) -> Result<UnkeyedEncoding<'_, 'a, S, A>, EncodeError> {
        let index = self.len()?;
        let empty = self.encoder.adapter.empty_unkeyed();
        self.append(empty)?;
        Ok(UnkeyedEncoding {
            reference: self.reference.clone().unkeyed_element(index),
            path: self.path.child(Label::index(index)),
            encoder: &mut *self.encoder,
        })
    }

    /// Open a delegate session whose result becomes the next element.
    ///
    /// The slot is reserved with a placeholder so the write-back lands at a
    /// stable index; a delegate that is never finished leaves it behind,
    /// which the entry point surfaces as a failed encode.
    pub fn delegate_encoder(&mut self) -> Result<DelegateEncoder<'a, S, A>, EncodeError> {
        let index = self.len()?;
        self.append(Node::Placeholder)?;
        DelegateEncoder::new(
            self.encoder.adapter,
            &self.encoder.storage,
            self.path.child(Label::index(index)),
            self.reference.clone().unkeyed_element(index),
        )
    }
}

/// Handle enforcing the at-most-one-value-per-path contract.
pub struct SingleValueEncoding<'h, 'a, S: Storage, A: Adapter> {
    pub(crate) encoder: &'h mut Encoder<'a, S, A>,
    pub(crate) reference: Reference<S>,
    pub(crate) path: NodePath,
}

impl<'h, 'a, S: Storage, A: Adapter> SingleValueEncoding<'h, 'a, S, A> {
    /// Encode the one value this path may hold. A second call is a fatal
    /// misuse: the path was claimed by exactly one placeholder.
    pub fn encode<V>(&mut self, value: &V) -> Result<(), EncodeError>
    where
        V: Encodable + ?Sized,
    {
        if self.encoder.storage.has_node(&self.path) {
            panic!(
                "treewrap: single value container at {} already encoded a value",
                self.path
            );
        }
        let node = self.encoder.wrap_from(&self.path, value, None)?;
        self.reference.set(node)?;
        Ok(())
    }
}
