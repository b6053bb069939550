//! Encoder engine — recursive decomposition of values into a node tree.
//!
//! The central operation is [`Encoder::wrap`]: ask the adapter whether the
//! value is natively representable; if not, claim the current path with a
//! placeholder, let the value's own callback decompose itself through
//! container handles, then collect the finished node back out of storage.
//! The placeholder/partial node is always torn down before an error
//! propagates, so a failed child encode never corrupts its siblings.

use treewrap_node::{Label, Node, NodePath, Scalar};

use crate::adapter::Adapter;
use crate::error::EncodeError;
use crate::reference::Reference;
use crate::storage::{LockingMapStorage, Storage};
use crate::ByteBuf;

/// Encode a value to a finished node tree.
///
/// Internal storage faults are collapsed to the opaque
/// [`EncodeError::NotSucceeded`] here; they never escape to the caller.
pub fn encode<A, V>(adapter: &A, value: &V) -> Result<Node, EncodeError>
where
    A: Adapter,
    V: Encodable + ?Sized,
{
    Encoder::new(adapter)
        .wrap(value, None)
        .map_err(EncodeError::opaque)
}

/// Encode a value all the way to the adapter's raw output.
pub fn encode_to_raw<A, V>(adapter: &A, value: &V) -> Result<A::Raw, EncodeError>
where
    A: Adapter,
    V: Encodable + ?Sized,
{
    let node = encode(adapter, value)?;
    Ok(adapter.externalize(node)?)
}

/// A value that can decompose itself into the node tree.
///
/// This is the value-side plugin boundary: the engine invokes
/// [`encode`](Encodable::encode), which requests container handles from the
/// live [`Encoder`] and recursively encodes children through them.
pub trait Encodable {
    /// Marks a type the adapter must handle directly. When the adapter has
    /// no representation for it, the encode fails `InvalidValue` instead of
    /// recursing into [`encode`](Encodable::encode) forever.
    const NATIVE_ONLY: bool = false;

    /// Lower this value to a scalar payload for the adapter's recognition
    /// table, if it has one.
    fn as_scalar(&self) -> Option<Scalar> {
        None
    }

    /// Decompose this value through container handles.
    fn encode<S: Storage, A: Adapter>(
        &self,
        encoder: &mut Encoder<'_, S, A>,
    ) -> Result<(), EncodeError>;
}

/// The live encoding session: current path, storage, adapter.
pub struct Encoder<'a, S: Storage, A: Adapter> {
    pub(crate) path: NodePath,
    pub(crate) storage: S,
    pub(crate) adapter: &'a A,
}

impl<'a, A: Adapter> Encoder<'a, LockingMapStorage, A> {
    /// Session over the default path-keyed locking storage.
    pub fn new(adapter: &'a A) -> Self {
        Encoder::with_storage(adapter, LockingMapStorage::new())
    }
}

impl<'a, S: Storage, A: Adapter> Encoder<'a, S, A> {
    pub fn with_storage(adapter: &'a A, storage: S) -> Self {
        Encoder {
            path: NodePath::root(),
            storage,
            adapter,
        }
    }

    /// The accumulated path of the node currently being encoded.
    pub fn path(&self) -> &NodePath {
        &self.path
    }

    pub fn adapter(&self) -> &'a A {
        self.adapter
    }

    /// Encode one value into a node, at the current path extended by
    /// `at_label` if given. The path is restored on every exit.
    pub fn wrap<V>(&mut self, value: &V, at_label: Option<Label>) -> Result<Node, EncodeError>
    where
        V: Encodable + ?Sized,
    {
        let depth = self.path.len();
        if let Some(label) = at_label {
            self.path.push(label);
        }
        let result = self.wrap_value(value);
        self.path.truncate(depth);
        result
    }

    fn wrap_value<V>(&mut self, value: &V) -> Result<Node, EncodeError>
    where
        V: Encodable + ?Sized,
    {
        // Fast path: natively representable values never touch storage.
        if let Some(scalar) = value.as_scalar() {
            if let Some(node) = self.adapter.representation_for(&scalar) {
                return Ok(node);
            }
        }
        if V::NATIVE_ONLY {
            return Err(EncodeError::InvalidValue {
                path: self.path.clone(),
            });
        }

        // Claim the slot, protect it while the callback runs. A value that
        // indirects through a single-value handle re-enters here at the
        // same path: the inner session replaces the placeholder and takes
        // over the slot, lock included, so it can tear the slot down below.
        self.storage.store_placeholder(&self.path)?;
        self.storage.lock(&self.path);
        let outcome = value.encode(self);
        self.storage.unlock(&self.path);

        // Tear the slot down before propagating anything, so sibling paths
        // are never corrupted by a failed attempt.
        let removed = self.storage.remove(&self.path);
        outcome?;
        // A callback that requested nothing leaves only the placeholder;
        // the contractual fallback is an empty keyed container.
        Ok(removed?.unwrap_or_else(|| self.adapter.empty_keyed()))
    }

    /// `wrap_from` with the handle's reference chain temporarily mirrored
    /// into storage, so composite children of a nested handle satisfy the
    /// parent-filled check. The scaffolding is torn down before anything
    /// propagates.
    pub(crate) fn wrap_under<V>(
        &mut self,
        reference: &Reference<S>,
        base: &NodePath,
        value: &V,
        at_label: Option<Label>,
    ) -> Result<Node, EncodeError>
    where
        V: Encodable + ?Sized,
    {
        let parked = reference.park_chain()?;
        let result = self.wrap_from(base, value, at_label);
        let mut teardown = Ok(());
        for path in parked.iter().rev() {
            if let Err(e) = self.storage.remove(path) {
                teardown = Err(e);
            }
        }
        let node = result?;
        teardown?;
        Ok(node)
    }

    /// `wrap` anchored at a container handle's own path rather than the
    /// session's current one.
    pub(crate) fn wrap_from<V>(
        &mut self,
        base: &NodePath,
        value: &V,
        at_label: Option<Label>,
    ) -> Result<Node, EncodeError>
    where
        V: Encodable + ?Sized,
    {
        let saved = std::mem::replace(&mut self.path, base.clone());
        let result = self.wrap(value, at_label);
        self.path = saved;
        result
    }
}

/// A nested encoding session writing through the same live tree.
///
/// Models "delegate to a base implementation": a value's callback obtains
/// one from a container handle and explicitly invokes the base
/// implementation's serialization against it. The session owns a storage
/// fork rooted at the delegated path; on [`finish`](DelegateEncoder::finish)
/// the single node pending in its scope is flushed through the write-back
/// reference into the parent structure.
pub struct DelegateEncoder<'a, S: Storage, A: Adapter> {
    inner: Encoder<'a, S, A>,
    reference: Reference<S>,
    outer_path: NodePath,
}

impl<'a, S: Storage, A: Adapter> DelegateEncoder<'a, S, A> {
    pub(crate) fn new(
        adapter: &'a A,
        storage: &S,
        outer_path: NodePath,
        reference: Reference<S>,
    ) -> Result<Self, EncodeError> {
        let mut fork = storage.fork(&outer_path);
        fork.store_placeholder(&NodePath::root())
            .map_err(|e| EncodeError::from(e).rebase(&outer_path))?;
        Ok(DelegateEncoder {
            inner: Encoder {
                path: NodePath::root(),
                storage: fork,
                adapter,
            },
            reference,
            outer_path,
        })
    }

    /// Encode one value as the session's single pending node.
    pub fn encode_value<V>(&mut self, value: &V) -> Result<(), EncodeError>
    where
        V: Encodable + ?Sized,
    {
        let node = self
            .inner
            .wrap(value, None)
            .map_err(|e| e.rebase(&self.outer_path))?;
        self.inner
            .storage
            .set(&NodePath::root(), node)
            .map_err(|e| EncodeError::from(e).rebase(&self.outer_path))?;
        Ok(())
    }

    /// Run a callback against the inner session, re-basing any fault onto
    /// the outer session's path accounting.
    pub fn encode_with<F>(&mut self, f: F) -> Result<(), EncodeError>
    where
        F: FnOnce(&mut Encoder<'a, S, A>) -> Result<(), EncodeError>,
    {
        f(&mut self.inner).map_err(|e| e.rebase(&self.outer_path))
    }

    /// The inner encoder. Faults escaping it directly carry fork-relative
    /// paths; prefer [`encode_with`](DelegateEncoder::encode_with).
    pub fn encoder(&mut self) -> &mut Encoder<'a, S, A> {
        &mut self.inner
    }

    /// Dispose the session, flushing its pending node into the reference.
    ///
    /// Exactly one node may be pending: the produced one, or the untouched
    /// placeholder (flushed as the empty-container fallback). More than one
    /// pending node means a broken callback and is a fatal misuse.
    pub fn finish(mut self) -> Result<(), EncodeError> {
        let pending = self.inner.storage.pending();
        let node = match pending {
            0 => self.inner.adapter.empty_keyed(),
            1 => self
                .inner
                .storage
                .remove(&NodePath::root())
                .map_err(|e| EncodeError::from(e).rebase(&self.outer_path))?
                .unwrap_or_else(|| self.inner.adapter.empty_keyed()),
            n => panic!("treewrap: delegate encoder disposed with {n} pending nodes"),
        };
        self.reference
            .set(node)
            .map_err(|e| EncodeError::from(e).rebase(&self.outer_path))?;
        Ok(())
    }
}

// ── Encodable implementations for primitives ──────────────────────────────

macro_rules! native_scalar_encodable {
    ($ty:ty, $to:expr) => {
        impl Encodable for $ty {
            const NATIVE_ONLY: bool = true;

            fn as_scalar(&self) -> Option<Scalar> {
                Some($to(self))
            }

            fn encode<S: Storage, A: Adapter>(
                &self,
                encoder: &mut Encoder<'_, S, A>,
            ) -> Result<(), EncodeError> {
                // Not reached: wrap fails InvalidValue first for
                // native-only types the adapter rejected.
                Err(EncodeError::InvalidValue {
                    path: encoder.path().clone(),
                })
            }
        }
    };
}

native_scalar_encodable!(bool, |v: &bool| Scalar::Bool(*v));
native_scalar_encodable!(i8, |v: &i8| Scalar::Int(i64::from(*v)));
native_scalar_encodable!(i16, |v: &i16| Scalar::Int(i64::from(*v)));
native_scalar_encodable!(i32, |v: &i32| Scalar::Int(i64::from(*v)));
native_scalar_encodable!(i64, |v: &i64| Scalar::Int(*v));
native_scalar_encodable!(u8, |v: &u8| Scalar::UInt(u64::from(*v)));
native_scalar_encodable!(u16, |v: &u16| Scalar::UInt(u64::from(*v)));
native_scalar_encodable!(u32, |v: &u32| Scalar::UInt(u64::from(*v)));
native_scalar_encodable!(u64, |v: &u64| Scalar::UInt(*v));
native_scalar_encodable!(f32, |v: &f32| Scalar::Float(f64::from(*v)));
native_scalar_encodable!(f64, |v: &f64| Scalar::Float(*v));
native_scalar_encodable!((), |_: &()| Scalar::Null);
native_scalar_encodable!(str, |v: &str| Scalar::Str(v.to_string()));
native_scalar_encodable!(String, |v: &String| Scalar::Str(v.clone()));
native_scalar_encodable!(ByteBuf, |v: &ByteBuf| Scalar::Bytes(v.0.clone()));

impl<T: Encodable> Encodable for Option<T> {
    fn as_scalar(&self) -> Option<Scalar> {
        match self {
            None => Some(Scalar::Null),
            Some(value) => value.as_scalar(),
        }
    }

    fn encode<S: Storage, A: Adapter>(
        &self,
        encoder: &mut Encoder<'_, S, A>,
    ) -> Result<(), EncodeError> {
        // Only reached when the adapter declined the scalar form.
        let mut single = encoder.container_single_value();
        match self {
            Some(value) => single.encode(value),
            None => single.encode(&()),
        }
    }
}

impl<T: Encodable> Encodable for Vec<T> {
    fn encode<S: Storage, A: Adapter>(
        &self,
        encoder: &mut Encoder<'_, S, A>,
    ) -> Result<(), EncodeError> {
        let mut seq = encoder.container_unkeyed()?;
        for element in self {
            seq.encode_element(element)?;
        }
        Ok(())
    }
}

impl<T: Encodable> Encodable for indexmap::IndexMap<String, T> {
    fn encode<S: Storage, A: Adapter>(
        &self,
        encoder: &mut Encoder<'_, S, A>,
    ) -> Result<(), EncodeError> {
        let mut map = encoder.container_keyed()?;
        for (key, value) in self {
            map.encode_field(key, value)?;
        }
        Ok(())
    }
}

impl<T: Encodable + ?Sized> Encodable for &T {
    const NATIVE_ONLY: bool = T::NATIVE_ONLY;

    fn as_scalar(&self) -> Option<Scalar> {
        (**self).as_scalar()
    }

    fn encode<S: Storage, A: Adapter>(
        &self,
        encoder: &mut Encoder<'_, S, A>,
    ) -> Result<(), EncodeError> {
        (**self).encode(encoder)
    }
}
