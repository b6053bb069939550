//! The [`Adapter`] contract — the only interface a format implementer must
//! satisfy.
//!
//! An adapter supplies native scalar recognition for both directions (a
//! conversion table over the closed [`Scalar`]/[`ScalarTag`] set, resolved
//! once at construction rather than by runtime type inspection) and the
//! externalize/internalize boundary where wire-format concerns enter. The
//! engines never look inside `Raw`.

use indexmap::IndexMap;
use treewrap_node::{Node, Scalar, ScalarTag};

use crate::error::{AdapterError, ExtractError};

/// Format-specific collaborator plugged into the engines.
pub trait Adapter {
    /// The raw output/input representation of a finished tree.
    type Raw;

    /// Native recognition during encode. `Some(node)` takes the fast path
    /// and skips self-decomposition; `None` lets the value decompose
    /// itself.
    fn representation_for(&self, scalar: &Scalar) -> Option<Node>;

    /// Native recognition during decode, keyed by the target's type
    /// identity.
    ///
    /// Must return `Err(TypeMismatch)` when the node's shape positively
    /// contradicts the requested tag; a silent `None` there would fall
    /// through to self-decomposition and mask the malformed data. `None`
    /// means "not natively handled, let the type decompose itself".
    fn extract(&self, node: &Node, tag: ScalarTag) -> Result<Option<Scalar>, ExtractError>;

    /// Factory for the generic empty keyed container.
    fn empty_keyed(&self) -> Node {
        Node::Keyed(IndexMap::new())
    }

    /// Factory for the generic empty unkeyed container.
    fn empty_unkeyed(&self) -> Node {
        Node::Unkeyed(Vec::new())
    }

    /// Convert a finished tree to raw output. The tree contains no
    /// placeholders by the time it gets here.
    fn externalize(&self, node: Node) -> Result<Self::Raw, AdapterError>;

    /// Convert raw input back into a tree.
    fn internalize(&self, raw: Self::Raw) -> Result<Node, AdapterError>;
}

/// Reference adapter with JSON-shaped raw output.
///
/// Recognizes every scalar, coerces between the integer tags where the
/// value fits, and externalizes through the `serde_json::Value`
/// conversions of the node crate. Not a wire format; it exists so the
/// engines can be used (and tested) without writing an adapter first.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicAdapter;

impl BasicAdapter {
    pub fn new() -> Self {
        BasicAdapter
    }
}

impl Adapter for BasicAdapter {
    type Raw = serde_json::Value;

    fn representation_for(&self, scalar: &Scalar) -> Option<Node> {
        Some(match scalar {
            Scalar::Null => Node::Nil,
            other => Node::Scalar(other.clone()),
        })
    }

    fn extract(&self, node: &Node, tag: ScalarTag) -> Result<Option<Scalar>, ExtractError> {
        let mismatch = || {
            Err(ExtractError::TypeMismatch {
                expected: tag.as_str(),
            })
        };
        let scalar = match node {
            Node::Nil => {
                return if tag == ScalarTag::Null {
                    Ok(Some(Scalar::Null))
                } else {
                    mismatch()
                };
            }
            Node::Scalar(scalar) => scalar,
            // Containers never satisfy a scalar tag.
            Node::Keyed(_) | Node::Unkeyed(_) => return mismatch(),
            Node::Placeholder => {
                panic!("treewrap: placeholder node reached the adapter")
            }
        };
        match (scalar, tag) {
            (Scalar::Null, ScalarTag::Null) => Ok(Some(Scalar::Null)),
            (Scalar::Bool(b), ScalarTag::Bool) => Ok(Some(Scalar::Bool(*b))),
            (Scalar::Int(i), ScalarTag::Int) => Ok(Some(Scalar::Int(*i))),
            (Scalar::Int(i), ScalarTag::UInt) => match u64::try_from(*i) {
                Ok(u) => Ok(Some(Scalar::UInt(u))),
                Err(_) => mismatch(),
            },
            (Scalar::UInt(u), ScalarTag::UInt) => Ok(Some(Scalar::UInt(*u))),
            (Scalar::UInt(u), ScalarTag::Int) => match i64::try_from(*u) {
                Ok(i) => Ok(Some(Scalar::Int(i))),
                Err(_) => mismatch(),
            },
            (Scalar::Float(f), ScalarTag::Float) => Ok(Some(Scalar::Float(*f))),
            (Scalar::Int(i), ScalarTag::Float) => Ok(Some(Scalar::Float(*i as f64))),
            (Scalar::UInt(u), ScalarTag::Float) => Ok(Some(Scalar::Float(*u as f64))),
            (Scalar::Str(s), ScalarTag::Str) => Ok(Some(Scalar::Str(s.clone()))),
            (Scalar::Bytes(b), ScalarTag::Bytes) => Ok(Some(Scalar::Bytes(b.clone()))),
            _ => mismatch(),
        }
    }

    fn externalize(&self, node: Node) -> Result<Self::Raw, AdapterError> {
        Ok(serde_json::Value::try_from(node)?)
    }

    fn internalize(&self, raw: Self::Raw) -> Result<Node, AdapterError> {
        Ok(Node::from(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_shape_contradiction_is_an_error() {
        let adapter = BasicAdapter::new();
        let node = Node::Scalar(Scalar::Str("nope".to_string()));
        assert_eq!(
            adapter.extract(&node, ScalarTag::Int),
            Err(ExtractError::TypeMismatch { expected: "int" })
        );
        assert_eq!(
            adapter.extract(&Node::empty_keyed(), ScalarTag::Bool),
            Err(ExtractError::TypeMismatch { expected: "bool" })
        );
    }

    #[test]
    fn test_extract_integer_coercion() {
        let adapter = BasicAdapter::new();
        assert_eq!(
            adapter.extract(&Node::Scalar(Scalar::Int(5)), ScalarTag::UInt),
            Ok(Some(Scalar::UInt(5)))
        );
        assert_eq!(
            adapter.extract(&Node::Scalar(Scalar::Int(-5)), ScalarTag::UInt),
            Err(ExtractError::TypeMismatch { expected: "uint" })
        );
        assert_eq!(
            adapter.extract(&Node::Scalar(Scalar::UInt(u64::MAX)), ScalarTag::Int),
            Err(ExtractError::TypeMismatch { expected: "int" })
        );
    }

    #[test]
    fn test_null_representation_is_nil() {
        let adapter = BasicAdapter::new();
        assert_eq!(adapter.representation_for(&Scalar::Null), Some(Node::Nil));
    }
}
