//! Format-agnostic structured serialization engine.
//!
//! treewrap converts arbitrary composite values (records, sequences,
//! scalars, optional markers) into an intermediate
//! [`Node`](treewrap_node::Node) tree and back, without knowing the final
//! wire format. A pluggable [`Adapter`] supplies format-specific
//! recognition of native scalar types and the conversion to and from raw
//! output; values plug in through the [`Encodable`]/[`Decodable`] callback
//! pair, which drives container handles over a path-addressed [`Storage`]
//! with strict single-assignment discipline.
//!
//! # Example
//!
//! ```
//! use treewrap::{decode, encode, BasicAdapter, Decodable, DecodeError, Decoder,
//!     Encodable, EncodeError, Encoder, Storage, Adapter};
//!
//! #[derive(Debug, PartialEq)]
//! struct Point {
//!     x: i64,
//!     y: i64,
//! }
//!
//! impl Encodable for Point {
//!     fn encode<S: Storage, A: Adapter>(
//!         &self,
//!         encoder: &mut Encoder<'_, S, A>,
//!     ) -> Result<(), EncodeError> {
//!         let mut map = encoder.container_keyed()?;
//!         map.encode_field("x", &self.x)?;
//!         map.encode_field("y", &self.y)?;
//!         Ok(())
//!     }
//! }
//!
//! impl Decodable for Point {
//!     fn decode<S: Storage, A: Adapter>(
//!         decoder: &mut Decoder<'_, S, A>,
//!     ) -> Result<Self, DecodeError> {
//!         let mut map = decoder.container_keyed()?;
//!         Ok(Point {
//!             x: map.decode_field("x")?,
//!             y: map.decode_field("y")?,
//!         })
//!     }
//! }
//!
//! let adapter = BasicAdapter::new();
//! let point = Point { x: 3, y: -4 };
//! let node = encode(&adapter, &point).unwrap();
//! let back: Point = decode(&adapter, node).unwrap();
//! assert_eq!(back, point);
//! ```

pub mod adapter;
pub mod container;
pub mod decode;
pub mod encode;
pub mod error;
pub mod reference;
pub mod storage;

pub use adapter::{Adapter, BasicAdapter};
pub use container::{
    KeyedDecoding, KeyedEncoding, SingleValueDecoding, SingleValueEncoding, UnkeyedDecoding,
    UnkeyedEncoding,
};
pub use decode::{decode, decode_from_raw, Decodable, Decoder, DelegateDecoder};
pub use encode::{encode, encode_to_raw, DelegateEncoder, Encodable, Encoder};
pub use error::{AdapterError, DecodeError, EncodeError, ExtractError, StorageError};
pub use reference::Reference;
pub use storage::{LockingMapStorage, MapStorage, StackStorage, Storage};
pub use treewrap_node::{Label, Node, NodePath, Scalar, ScalarTag};

/// Byte-string wrapper taking the bytes scalar fast path.
///
/// A plain `Vec<u8>` goes through the blanket sequence implementation and
/// encodes as an unkeyed container of integers; wrap it in `ByteBuf` to
/// reach the adapter as a single [`Scalar::Bytes`] payload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ByteBuf(pub Vec<u8>);

impl From<Vec<u8>> for ByteBuf {
    fn from(bytes: Vec<u8>) -> Self {
        ByteBuf(bytes)
    }
}
