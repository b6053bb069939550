//! Decoder engine — recursive reconstruction of values from a node tree.
//!
//! Mirror of the encode side. [`Decoder::unwrap_value`] first offers the
//! node to the adapter's recognition table (keyed by the target's scalar
//! tag); if the adapter passes, the node is parked at the current path so
//! the target's own callback can request container handles over it, and
//! storage is restored on every exit.

use treewrap_node::{Label, Node, NodePath, Scalar, ScalarTag};

use crate::adapter::Adapter;
use crate::error::{DecodeError, ExtractError};
use crate::storage::{LockingMapStorage, Storage};
use crate::ByteBuf;

/// Decode a value out of a finished node tree.
///
/// Internal storage faults are collapsed to the opaque
/// [`DecodeError::NotSucceeded`] here; they never escape to the caller.
pub fn decode<A, T>(adapter: &A, node: Node) -> Result<T, DecodeError>
where
    A: Adapter,
    T: Decodable,
{
    Decoder::new(adapter)
        .unwrap_value(Some(node), None)
        .map_err(DecodeError::opaque)
}

/// Decode a value straight from the adapter's raw input.
pub fn decode_from_raw<A, T>(adapter: &A, raw: A::Raw) -> Result<T, DecodeError>
where
    A: Adapter,
    T: Decodable,
{
    let node = adapter.internalize(raw)?;
    decode(adapter, node)
}

/// A value that can reconstruct itself from the node tree.
pub trait Decodable: Sized {
    /// Marks a type the adapter must handle directly; when the adapter's
    /// table yields nothing for it, the decode fails `TypeMismatch`
    /// instead of self-decomposing.
    const NATIVE_ONLY: bool = false;

    /// The scalar tag this type decodes from natively, if any.
    fn tag() -> Option<ScalarTag> {
        None
    }

    /// Convert an adapter-extracted scalar into the value. `None` is a
    /// type mismatch.
    fn from_scalar(scalar: Scalar) -> Option<Self> {
        let _ = scalar;
        None
    }

    /// Reconstruct this value through container handles.
    fn decode<S: Storage, A: Adapter>(
        decoder: &mut Decoder<'_, S, A>,
    ) -> Result<Self, DecodeError>;
}

/// The live decoding session: current path, storage, adapter.
pub struct Decoder<'a, S: Storage, A: Adapter> {
    pub(crate) path: NodePath,
    pub(crate) storage: S,
    pub(crate) adapter: &'a A,
}

impl<'a, A: Adapter> Decoder<'a, LockingMapStorage, A> {
    /// Session over the default path-keyed locking storage.
    pub fn new(adapter: &'a A) -> Self {
        Decoder::with_storage(adapter, LockingMapStorage::new())
    }
}

impl<'a, S: Storage, A: Adapter> Decoder<'a, S, A> {
    pub fn with_storage(adapter: &'a A, storage: S) -> Self {
        Decoder {
            path: NodePath::root(),
            storage,
            adapter,
        }
    }

    /// The accumulated path of the node currently being decoded.
    pub fn path(&self) -> &NodePath {
        &self.path
    }

    pub fn adapter(&self) -> &'a A {
        self.adapter
    }

    /// Decode one value, at the current path extended by `at_label` if
    /// given. When `node` is `None` it is read from storage at the current
    /// path. The path is restored on every exit.
    pub fn unwrap_value<T: Decodable>(
        &mut self,
        node: Option<Node>,
        at_label: Option<Label>,
    ) -> Result<T, DecodeError> {
        let depth = self.path.len();
        if let Some(label) = at_label {
            self.path.push(label);
        }
        let result = self.unwrap_node(node);
        self.path.truncate(depth);
        result
    }

    fn unwrap_node<T: Decodable>(&mut self, node: Option<Node>) -> Result<T, DecodeError> {
        let node = match node {
            Some(node) => node,
            None => self.storage.get(&self.path)?,
        };

        // Fast path: offer the node to the adapter's recognition table.
        if let Some(tag) = T::tag() {
            match self.adapter.extract(&node, tag) {
                Ok(Some(scalar)) => {
                    return T::from_scalar(scalar).ok_or_else(|| DecodeError::TypeMismatch {
                        expected: tag.as_str(),
                        path: self.path.clone(),
                    });
                }
                Ok(None) => {}
                Err(ExtractError::TypeMismatch { expected }) => {
                    return Err(DecodeError::TypeMismatch {
                        expected,
                        path: self.path.clone(),
                    });
                }
            }
        }
        if T::NATIVE_ONLY {
            return Err(DecodeError::TypeMismatch {
                expected: T::tag().map(|tag| tag.as_str()).unwrap_or("adapter-handled value"),
                path: self.path.clone(),
            });
        }

        // Self-decomposition: park the node so container requests at this
        // path can retrieve it. A slot already occupied (single-value
        // indirection at the same path) is left to its owner.
        let parked = !self.storage.has_node(&self.path);
        if parked {
            self.storage.store(node, &self.path)?;
            self.storage.lock(&self.path);
        }
        let outcome = T::decode(self);
        if parked {
            self.storage.unlock(&self.path);
            let removed = self.storage.remove(&self.path);
            let value = outcome?;
            removed?;
            return Ok(value);
        }
        outcome
    }

    /// `unwrap_value` anchored at a container handle's own path rather than
    /// the session's current one.
    pub(crate) fn unwrap_from<T: Decodable>(
        &mut self,
        base: &NodePath,
        node: Option<Node>,
        at_label: Option<Label>,
    ) -> Result<T, DecodeError> {
        let saved = std::mem::replace(&mut self.path, base.clone());
        let result = self.unwrap_value(node, at_label);
        self.path = saved;
        result
    }
}

/// A nested decoding session over the same live tree.
///
/// The decode-side delegate: the storage fork is seeded with the
/// already-known sub-node (no placeholder discipline is needed), and any
/// fault crossing back out is re-based onto the outer session's path.
pub struct DelegateDecoder<'a, S: Storage, A: Adapter> {
    inner: Decoder<'a, S, A>,
    outer_path: NodePath,
}

impl<'a, S: Storage, A: Adapter> DelegateDecoder<'a, S, A> {
    pub(crate) fn new(
        adapter: &'a A,
        storage: &S,
        outer_path: NodePath,
        node: Node,
    ) -> Result<Self, DecodeError> {
        let mut fork = storage.fork(&outer_path);
        if !fork.has_node(&NodePath::root()) {
            fork.store(node, &NodePath::root())
                .map_err(|e| DecodeError::from(e).rebase(&outer_path))?;
        }
        Ok(DelegateDecoder {
            inner: Decoder {
                path: NodePath::root(),
                storage: fork,
                adapter,
            },
            outer_path,
        })
    }

    /// Decode the session's node as one value.
    pub fn decode_value<T: Decodable>(&mut self) -> Result<T, DecodeError> {
        self.inner
            .unwrap_value(None, None)
            .map_err(|e| e.rebase(&self.outer_path))
    }

    /// Run a callback against the inner session, re-basing any fault onto
    /// the outer session's path accounting.
    pub fn decode_with<T, F>(&mut self, f: F) -> Result<T, DecodeError>
    where
        F: FnOnce(&mut Decoder<'a, S, A>) -> Result<T, DecodeError>,
    {
        f(&mut self.inner).map_err(|e| e.rebase(&self.outer_path))
    }

    /// The inner decoder. Faults escaping it directly carry fork-relative
    /// paths; prefer [`decode_with`](DelegateDecoder::decode_with).
    pub fn decoder(&mut self) -> &mut Decoder<'a, S, A> {
        &mut self.inner
    }
}

// ── Decodable implementations for primitives ──────────────────────────────

macro_rules! native_scalar_decodable {
    ($ty:ty, $tag:expr, $from:expr) => {
        impl Decodable for $ty {
            const NATIVE_ONLY: bool = true;

            fn tag() -> Option<ScalarTag> {
                Some($tag)
            }

            fn from_scalar(scalar: Scalar) -> Option<Self> {
                $from(scalar)
            }

            fn decode<S: Storage, A: Adapter>(
                decoder: &mut Decoder<'_, S, A>,
            ) -> Result<Self, DecodeError> {
                // Not reached: unwrap fails TypeMismatch first for
                // native-only types the adapter rejected.
                Err(DecodeError::TypeMismatch {
                    expected: $tag.as_str(),
                    path: decoder.path().clone(),
                })
            }
        }
    };
}

native_scalar_decodable!(bool, ScalarTag::Bool, |s| match s {
    Scalar::Bool(b) => Some(b),
    _ => None,
});
native_scalar_decodable!(i8, ScalarTag::Int, |s| match s {
    Scalar::Int(i) => i8::try_from(i).ok(),
    _ => None,
});
native_scalar_decodable!(i16, ScalarTag::Int, |s| match s {
    Scalar::Int(i) => i16::try_from(i).ok(),
    _ => None,
});
native_scalar_decodable!(i32, ScalarTag::Int, |s| match s {
    Scalar::Int(i) => i32::try_from(i).ok(),
    _ => None,
});
native_scalar_decodable!(i64, ScalarTag::Int, |s| match s {
    Scalar::Int(i) => Some(i),
    _ => None,
});
native_scalar_decodable!(u8, ScalarTag::UInt, |s| match s {
    Scalar::UInt(u) => u8::try_from(u).ok(),
    _ => None,
});
native_scalar_decodable!(u16, ScalarTag::UInt, |s| match s {
    Scalar::UInt(u) => u16::try_from(u).ok(),
    _ => None,
});
native_scalar_decodable!(u32, ScalarTag::UInt, |s| match s {
    Scalar::UInt(u) => u32::try_from(u).ok(),
    _ => None,
});
native_scalar_decodable!(u64, ScalarTag::UInt, |s| match s {
    Scalar::UInt(u) => Some(u),
    _ => None,
});
native_scalar_decodable!(f32, ScalarTag::Float, |s| match s {
    Scalar::Float(f) => Some(f as f32),
    _ => None,
});
native_scalar_decodable!(f64, ScalarTag::Float, |s| match s {
    Scalar::Float(f) => Some(f),
    _ => None,
});
native_scalar_decodable!((), ScalarTag::Null, |s| match s {
    Scalar::Null => Some(()),
    _ => None,
});
native_scalar_decodable!(String, ScalarTag::Str, |s| match s {
    Scalar::Str(string) => Some(string),
    _ => None,
});
native_scalar_decodable!(ByteBuf, ScalarTag::Bytes, |s| match s {
    Scalar::Bytes(bytes) => Some(ByteBuf(bytes)),
    _ => None,
});

impl<T: Decodable> Decodable for Option<T> {
    fn decode<S: Storage, A: Adapter>(
        decoder: &mut Decoder<'_, S, A>,
    ) -> Result<Self, DecodeError> {
        let mut single = decoder.container_single_value();
        if single.is_nil()? {
            Ok(None)
        } else {
            Ok(Some(single.decode()?))
        }
    }
}

impl<T: Decodable> Decodable for Vec<T> {
    fn decode<S: Storage, A: Adapter>(
        decoder: &mut Decoder<'_, S, A>,
    ) -> Result<Self, DecodeError> {
        let mut seq = decoder.container_unkeyed()?;
        let mut out = Vec::with_capacity(seq.remaining());
        while !seq.is_exhausted() {
            out.push(seq.decode_element()?);
        }
        Ok(out)
    }
}

impl<T: Decodable> Decodable for indexmap::IndexMap<String, T> {
    fn decode<S: Storage, A: Adapter>(
        decoder: &mut Decoder<'_, S, A>,
    ) -> Result<Self, DecodeError> {
        let mut map = decoder.container_keyed()?;
        let keys = map.keys()?;
        let mut out = indexmap::IndexMap::with_capacity(keys.len());
        for key in keys {
            let value = map.decode_field(&key)?;
            out.insert(key, value);
        }
        Ok(out)
    }
}
