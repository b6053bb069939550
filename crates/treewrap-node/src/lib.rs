//! Node tree data model for the treewrap serialization engine.
//!
//! A [`Node`] is the intermediate representation every value passes through
//! on its way to (or from) a wire format: nil, a [`Scalar`] payload, a keyed
//! container (order-preserving string map), an unkeyed container (sequence),
//! or the internal `Placeholder` sentinel the engines use to claim a slot
//! before its final node exists.
//!
//! Nodes are addressed by a [`NodePath`], an ordered sequence of [`Label`]s
//! accumulated by nesting depth.
//!
//! # Example
//!
//! ```
//! use treewrap_node::{Node, NodePath, Label, Scalar};
//!
//! let mut path = NodePath::root();
//! path.push(Label::key("user"));
//! path.push(Label::index(0));
//! assert_eq!(path.to_string(), "/user/0");
//!
//! let node = Node::Scalar(Scalar::Int(42));
//! let json: serde_json::Value = node.try_into().unwrap();
//! assert_eq!(json, serde_json::json!(42));
//! ```

pub mod label;
pub mod node;
pub mod path;
pub mod scalar;

pub use label::Label;
pub use node::{Node, NodeConvertError};
pub use path::NodePath;
pub use scalar::{Scalar, ScalarTag};
