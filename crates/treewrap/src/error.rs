//! Fault tiers for the engines.
//!
//! Storage faults are internal invariant checks: correct engine logic never
//! triggers them unless an adapter or callback misbehaves, and the top-level
//! entry points collapse them into the opaque `NotSucceeded` variants so
//! they never escape to an external caller. User-facing faults carry the
//! accumulated path for diagnostics; [`EncodeError::rebase`] /
//! [`DecodeError::rebase`] re-base that path when a fault crosses a
//! delegate-session boundary, since forked sessions account paths from
//! their own root.
//!
//! Misuse faults (incompatible container requests at one path, a second
//! single-value encode, a delegate disposed with more than one pending
//! node) are panics, not errors: they indicate a broken callback, not
//! malformed data.

use thiserror::Error;
use treewrap_node::{NodeConvertError, NodePath};

/// Internal storage invariant violations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StorageError {
    #[error("no node stored at the parent of {0}")]
    PathNotFilled(NodePath),
    #[error("already storing a value at {0}")]
    AlreadyStoringValue(NodePath),
    #[error("no node stored at {0}")]
    NoNodeStored(NodePath),
    #[error("path {0} is locked")]
    PathIsLocked(NodePath),
}

impl StorageError {
    /// Prefix the carried path with an outer session's path.
    pub fn rebase(self, prefix: &NodePath) -> Self {
        match self {
            StorageError::PathNotFilled(p) => StorageError::PathNotFilled(prefix.join(&p)),
            StorageError::AlreadyStoringValue(p) => {
                StorageError::AlreadyStoringValue(prefix.join(&p))
            }
            StorageError::NoNodeStored(p) => StorageError::NoNodeStored(prefix.join(&p)),
            StorageError::PathIsLocked(p) => StorageError::PathIsLocked(prefix.join(&p)),
        }
    }
}

/// Faults raised by an adapter's externalize/internalize boundary.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AdapterError {
    #[error("adapter cannot externalize node: {0}")]
    Externalize(String),
    #[error("adapter cannot internalize raw input: {0}")]
    Internalize(String),
}

impl From<NodeConvertError> for AdapterError {
    fn from(err: NodeConvertError) -> Self {
        AdapterError::Externalize(err.to_string())
    }
}

/// Outcome of an adapter's decode-side recognition table.
///
/// Distinct from [`DecodeError`] because the adapter does not know the
/// session path; the engine attaches it when surfacing the fault.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("node shape contradicts {expected}")]
    TypeMismatch { expected: &'static str },
}

/// Faults raised while encoding.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EncodeError {
    /// The value's type must be handled by the adapter directly, but the
    /// adapter had no representation for it.
    #[error("adapter has no representation for the value at {path}")]
    InvalidValue { path: NodePath },
    /// Opaque cover for internal storage faults at the entry point.
    #[error("encoding did not succeed")]
    NotSucceeded,
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Adapter(#[from] AdapterError),
}

impl EncodeError {
    /// Re-base the carried path onto an outer session's path.
    pub fn rebase(self, prefix: &NodePath) -> Self {
        match self {
            EncodeError::InvalidValue { path } => EncodeError::InvalidValue {
                path: prefix.join(&path),
            },
            EncodeError::Storage(e) => EncodeError::Storage(e.rebase(prefix)),
            other => other,
        }
    }

    /// Collapse internal faults for the external caller.
    pub(crate) fn opaque(self) -> Self {
        match self {
            EncodeError::Storage(_) => EncodeError::NotSucceeded,
            other => other,
        }
    }
}

/// Faults raised while decoding.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DecodeError {
    #[error("key {key:?} not found at {path}")]
    KeyNotFound { key: String, path: NodePath },
    #[error("type mismatch at {path}: expected {expected}")]
    TypeMismatch {
        expected: &'static str,
        path: NodePath,
    },
    /// The unkeyed cursor is exhausted.
    #[error("no value left at {path}")]
    ValueNotFound { path: NodePath },
    /// Opaque cover for internal storage faults at the entry point.
    #[error("decoding did not succeed")]
    NotSucceeded,
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Adapter(#[from] AdapterError),
}

impl DecodeError {
    /// Re-base the carried path onto an outer session's path.
    pub fn rebase(self, prefix: &NodePath) -> Self {
        match self {
            DecodeError::KeyNotFound { key, path } => DecodeError::KeyNotFound {
                key,
                path: prefix.join(&path),
            },
            DecodeError::TypeMismatch { expected, path } => DecodeError::TypeMismatch {
                expected,
                path: prefix.join(&path),
            },
            DecodeError::ValueNotFound { path } => DecodeError::ValueNotFound {
                path: prefix.join(&path),
            },
            DecodeError::Storage(e) => DecodeError::Storage(e.rebase(prefix)),
            other => other,
        }
    }

    /// Collapse internal faults for the external caller.
    pub(crate) fn opaque(self) -> Self {
        match self {
            DecodeError::Storage(_) => DecodeError::NotSucceeded,
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use treewrap_node::Label;

    #[test]
    fn test_rebase_prefixes_path() {
        let prefix: NodePath = vec![Label::key("outer"), Label::index(2)].into();
        let err = DecodeError::KeyNotFound {
            key: "name".to_string(),
            path: vec![Label::key("inner")].into(),
        };
        match err.rebase(&prefix) {
            DecodeError::KeyNotFound { path, .. } => {
                assert_eq!(path.to_string(), "/outer/2/inner")
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_opaque_covers_storage_faults_only() {
        let storage = EncodeError::Storage(StorageError::NoNodeStored(NodePath::root()));
        assert_eq!(storage.opaque(), EncodeError::NotSucceeded);

        let user = EncodeError::InvalidValue {
            path: NodePath::root(),
        };
        assert_eq!(user.clone().opaque(), user);
    }
}
