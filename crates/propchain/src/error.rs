#![forbid(unsafe_code)]

//! Error types for path parsing and resolution.
//!
//! Neither error ever escapes a stream: the chain observer turns a
//! [`ResolveError`] into a withheld emission and a [`PathError`] into a
//! stream that never emits. They are public so callers of [`resolve`]
//! and [`PropertyPath::parse`] can see *why* something failed.
//!
//! [`resolve`]: crate::resolve::resolve
//! [`PropertyPath::parse`]: crate::path::PropertyPath::parse

use std::fmt;

use propchain_core::{AccessError, UpdatableError};

/// A path string that is not a valid property path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// The path has no segments.
    Empty,
    /// A segment between dots is empty (`"a..b"`, `".a"`, `"a."`).
    EmptySegment { path: String, index: usize },
    /// A segment passed on its own contains a dot.
    DottedSegment { segment: String, index: usize },
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("property path is empty"),
            Self::EmptySegment { path, index } => {
                write!(f, "property path '{path}' has an empty segment at index {index}")
            }
            Self::DottedSegment { segment, index } => {
                write!(f, "path segment '{segment}' at index {index} contains a dot")
            }
        }
    }
}

impl std::error::Error for PathError {}

/// Why a path could not be walked to the end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The path itself is malformed.
    InvalidPath(PathError),
    /// A segment was read off something that is not an object.
    NotAnObject {
        segment: String,
        depth: usize,
        found: &'static str,
    },
    /// The object at this depth has no such property.
    MissingProperty {
        segment: String,
        depth: usize,
        type_name: String,
    },
    /// Reading the property failed.
    Accessor {
        depth: usize,
        source: AccessError,
    },
    /// A lazy container on the path has no value.
    Container {
        depth: usize,
        source: UpdatableError,
    },
}

impl ResolveError {
    /// Depth (segment index) at which resolution stopped.
    #[must_use]
    pub fn depth(&self) -> Option<usize> {
        match self {
            Self::InvalidPath(_) => None,
            Self::NotAnObject { depth, .. }
            | Self::MissingProperty { depth, .. }
            | Self::Accessor { depth, .. }
            | Self::Container { depth, .. } => Some(*depth),
        }
    }
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPath(err) => write!(f, "invalid path: {err}"),
            Self::NotAnObject {
                segment,
                depth,
                found,
            } => write!(f, "cannot read '{segment}' (depth {depth}) from {found}"),
            Self::MissingProperty {
                segment,
                depth,
                type_name,
            } => write!(f, "{type_name} has no property '{segment}' (depth {depth})"),
            Self::Accessor { depth, source } => write!(f, "at depth {depth}: {source}"),
            Self::Container { depth, source } => {
                write!(f, "lazy container at depth {depth}: {source}")
            }
        }
    }
}

impl std::error::Error for ResolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidPath(err) => Some(err),
            Self::Accessor { source, .. } => Some(source),
            Self::Container { source, .. } => Some(source),
            Self::NotAnObject { .. } | Self::MissingProperty { .. } => None,
        }
    }
}

impl From<PathError> for ResolveError {
    fn from(err: PathError) -> Self {
        Self::InvalidPath(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn display_messages() {
        assert_eq!(PathError::Empty.to_string(), "property path is empty");
        assert_eq!(
            PathError::DottedSegment {
                segment: "a.b".into(),
                index: 2
            }
            .to_string(),
            "path segment 'a.b' at index 2 contains a dot"
        );
        let err = ResolveError::MissingProperty {
            segment: "foo".into(),
            depth: 1,
            type_name: "Widget".into(),
        };
        assert_eq!(err.to_string(), "Widget has no property 'foo' (depth 1)");
        assert_eq!(err.depth(), Some(1));
    }

    #[test]
    fn source_chains_to_access_error() {
        let err = ResolveError::Accessor {
            depth: 0,
            source: AccessError::Accessor {
                property: "total".into(),
                message: "overflow".into(),
            },
        };
        let source = err.source().map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("accessor for 'total' failed: overflow"));
    }

    #[test]
    fn path_error_converts() {
        let err: ResolveError = PathError::Empty.into();
        assert_eq!(err.depth(), None);
        assert!(err.to_string().starts_with("invalid path"));
    }
}
