//! [`Node`] — the intermediate tree value.
//!
//! Every value an engine encodes becomes a tree of these before the adapter
//! externalizes it; every decode starts from one the adapter internalized.
//! `Placeholder` is strictly internal: it claims a storage slot while the
//! real node is still being built and must never reach an adapter, nor
//! appear inside a container an adapter can see.

use indexmap::IndexMap;
use thiserror::Error;

use crate::Scalar;

/// An intermediate tree value.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Explicit absence (distinct from a missing entry).
    Nil,
    /// An adapter-recognizable primitive payload.
    Scalar(Scalar),
    /// Order-preserving, last-write-wins map of string label to node.
    Keyed(IndexMap<String, Node>),
    /// Ordered sequence with contiguous indices `0..n`.
    Unkeyed(Vec<Node>),
    /// Internal sentinel claiming a slot whose real node is pending.
    Placeholder,
}

impl Node {
    pub fn empty_keyed() -> Node {
        Node::Keyed(IndexMap::new())
    }

    pub fn empty_unkeyed() -> Node {
        Node::Unkeyed(Vec::new())
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Node::Nil)
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Node::Placeholder)
    }

    pub fn is_keyed(&self) -> bool {
        matches!(self, Node::Keyed(_))
    }

    pub fn is_unkeyed(&self) -> bool {
        matches!(self, Node::Unkeyed(_))
    }

    /// Short name of the variant, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Nil => "nil",
            Node::Scalar(_) => "scalar",
            Node::Keyed(_) => "keyed container",
            Node::Unkeyed(_) => "unkeyed container",
            Node::Placeholder => "placeholder",
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Node::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    pub fn as_keyed(&self) -> Option<&IndexMap<String, Node>> {
        match self {
            Node::Keyed(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_keyed_mut(&mut self) -> Option<&mut IndexMap<String, Node>> {
        match self {
            Node::Keyed(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_unkeyed(&self) -> Option<&Vec<Node>> {
        match self {
            Node::Unkeyed(seq) => Some(seq),
            _ => None,
        }
    }

    pub fn as_unkeyed_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Unkeyed(seq) => Some(seq),
            _ => None,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NodeConvertError {
    #[error("placeholder node cannot be converted")]
    PlaceholderPresent,
}

impl TryFrom<Node> for serde_json::Value {
    type Error = NodeConvertError;

    fn try_from(node: Node) -> Result<Self, NodeConvertError> {
        Ok(match node {
            Node::Nil => serde_json::Value::Null,
            Node::Scalar(scalar) => match scalar {
                Scalar::Null => serde_json::Value::Null,
                Scalar::Bool(b) => serde_json::Value::Bool(b),
                Scalar::Int(i) => serde_json::json!(i),
                Scalar::UInt(u) => serde_json::json!(u),
                Scalar::Float(f) => serde_json::json!(f),
                Scalar::Str(s) => serde_json::Value::String(s),
                Scalar::Bytes(b) => serde_json::Value::Array(
                    b.into_iter().map(|byte| serde_json::json!(byte)).collect(),
                ),
            },
            Node::Keyed(map) => serde_json::Value::Object(
                map.into_iter()
                    .map(|(k, v)| Ok((k, serde_json::Value::try_from(v)?)))
                    .collect::<Result<_, NodeConvertError>>()?,
            ),
            Node::Unkeyed(seq) => serde_json::Value::Array(
                seq.into_iter()
                    .map(serde_json::Value::try_from)
                    .collect::<Result<_, NodeConvertError>>()?,
            ),
            Node::Placeholder => return Err(NodeConvertError::PlaceholderPresent),
        })
    }
}

impl From<serde_json::Value> for Node {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Node::Nil,
            serde_json::Value::Bool(b) => Node::Scalar(Scalar::Bool(b)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Node::Scalar(Scalar::Int(i))
                } else if let Some(u) = n.as_u64() {
                    Node::Scalar(Scalar::UInt(u))
                } else {
                    Node::Scalar(Scalar::Float(n.as_f64().unwrap_or(0.0)))
                }
            }
            serde_json::Value::String(s) => Node::Scalar(Scalar::Str(s)),
            serde_json::Value::Array(arr) => {
                Node::Unkeyed(arr.into_iter().map(Node::from).collect())
            }
            serde_json::Value::Object(obj) => Node::Keyed(
                obj.into_iter().map(|(k, v)| (k, Node::from(v))).collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_round_trip() {
        let value = json!({
            "name": "ada",
            "age": 36,
            "tags": ["math", "engines"],
            "deleted": null,
            "score": 1.25,
        });
        let node = Node::from(value.clone());
        let back: serde_json::Value = node.try_into().unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_keyed_is_last_write_wins() {
        let mut map = IndexMap::new();
        map.insert("a".to_string(), Node::Scalar(Scalar::Int(1)));
        map.insert("a".to_string(), Node::Scalar(Scalar::Int(2)));
        assert_eq!(map.len(), 1);
        assert_eq!(map["a"], Node::Scalar(Scalar::Int(2)));
    }

    #[test]
    fn test_placeholder_does_not_convert() {
        let node = Node::Unkeyed(vec![Node::Placeholder]);
        let result: Result<serde_json::Value, _> = node.try_into();
        assert_eq!(result, Err(NodeConvertError::PlaceholderPresent));
    }

    #[test]
    fn test_bytes_convert_to_number_array() {
        let node = Node::Scalar(Scalar::Bytes(vec![1, 2, 255]));
        let value: serde_json::Value = node.try_into().unwrap();
        assert_eq!(value, json!([1, 2, 255]));
    }
}
