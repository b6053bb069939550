//! [`Label`] — one step in a [`NodePath`](crate::NodePath).
//!
//! A label is either an object key or a sequence index. Both carry a string
//! form; equality and hashing use the string form only, so `Label::key("3")`
//! and `Label::index(3)` address the same slot.

use std::fmt;
use std::hash::{Hash, Hasher};

/// A step in a node path: a string key, optionally backed by an index.
#[derive(Debug, Clone, Eq)]
pub struct Label {
    string_form: String,
    index: Option<usize>,
}

impl Label {
    /// Label for a keyed container entry.
    pub fn key(key: impl Into<String>) -> Self {
        Label {
            string_form: key.into(),
            index: None,
        }
    }

    /// Label for an unkeyed container element; string form is the decimal
    /// rendering of the index.
    pub fn index(index: usize) -> Self {
        Label {
            string_form: index.to_string(),
            index: Some(index),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.string_form
    }

    /// The backing index, if this label was built from one.
    pub fn index_value(&self) -> Option<usize> {
        self.index
    }
}

impl PartialEq for Label {
    fn eq(&self, other: &Self) -> bool {
        self.string_form == other.string_form
    }
}

impl Hash for Label {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.string_form.hash(state);
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.string_form)
    }
}

impl From<&str> for Label {
    fn from(key: &str) -> Self {
        Label::key(key)
    }
}

impl From<String> for Label {
    fn from(key: String) -> Self {
        Label::key(key)
    }
}

impl From<usize> for Label {
    fn from(index: usize) -> Self {
        Label::index(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_by_string_form() {
        assert_eq!(Label::key("3"), Label::index(3));
        assert_ne!(Label::key("a"), Label::key("b"));
    }

    #[test]
    fn test_index_value() {
        assert_eq!(Label::index(7).index_value(), Some(7));
        assert_eq!(Label::key("7").index_value(), None);
    }
}
