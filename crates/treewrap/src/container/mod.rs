//! Container handles — the caller-facing objects a value callback uses to
//! read and write container nodes.
//!
//! Each handle is bound to a [`Reference`](crate::reference::Reference)
//! whose current node is already of the matching variant, plus the live
//! engine. Encoding handles write children in (`put` for keyed, append for
//! unkeyed, direct set for single-value); decoding handles mirror them,
//! with the unkeyed side driven by a sequential cursor that advances only
//! after a successful decode, so "try type A, else type B" at one index
//! works.

mod decoding;
mod encoding;

pub use decoding::{KeyedDecoding, SingleValueDecoding, UnkeyedDecoding};
pub use encoding::{KeyedEncoding, SingleValueEncoding, UnkeyedEncoding};
