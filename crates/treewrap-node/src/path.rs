//! [`NodePath`] — ordered sequence of labels addressing a node in the tree.
//!
//! Paths accumulate by nesting depth: the root path is empty, each container
//! level appends one [`Label`]. The flattened form is a JSON-Pointer-like
//! string (`/a/0/b`, `""` for the root) with `~0`/`~1` escaping, and doubles
//! as the key for map-backed storage.

use std::fmt;

use crate::Label;

/// An ordered sequence of [`Label`]s addressing one node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct NodePath(Vec<Label>);

impl NodePath {
    /// The empty path, addressing the root of a tree (or of a forked
    /// storage's scope).
    pub fn root() -> Self {
        NodePath(Vec::new())
    }

    pub fn push(&mut self, label: Label) {
        self.0.push(label);
    }

    pub fn pop(&mut self) -> Option<Label> {
        self.0.pop()
    }

    pub fn truncate(&mut self, len: usize) {
        self.0.truncate(len);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn labels(&self) -> &[Label] {
        &self.0
    }

    /// This path extended by one label.
    pub fn child(&self, label: Label) -> NodePath {
        let mut out = self.clone();
        out.push(label);
        out
    }

    /// The path one level up; `None` for the root.
    pub fn parent(&self) -> Option<NodePath> {
        if self.0.is_empty() {
            None
        } else {
            Some(NodePath(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// `self` followed by all labels of `other`.
    pub fn join(&self, other: &NodePath) -> NodePath {
        let mut out = self.clone();
        out.0.extend(other.0.iter().cloned());
        out
    }

    /// Flattened string form, usable as a storage map key.
    ///
    /// Per RFC 6901 escaping, `~` becomes `~0` and `/` becomes `~1`, so
    /// distinct paths never collide as keys.
    pub fn flatten(&self) -> String {
        let mut out = String::new();
        for label in &self.0 {
            out.push('/');
            out.push_str(&escape_component(label.as_str()));
        }
        out
    }
}

fn escape_component(component: &str) -> String {
    if !component.contains('~') && !component.contains('/') {
        return component.to_string();
    }
    // Order matters: ~ must be escaped before /
    component.replace('~', "~0").replace('/', "~1")
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.flatten())
    }
}

impl From<Vec<Label>> for NodePath {
    fn from(labels: Vec<Label>) -> Self {
        NodePath(labels)
    }
}

impl FromIterator<Label> for NodePath {
    fn from_iter<I: IntoIterator<Item = Label>>(iter: I) -> Self {
        NodePath(iter.into_iter().collect())
    }
}
