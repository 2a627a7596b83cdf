#![forbid(unsafe_code)]

//! Synchronous path resolution.
//!
//! [`resolve`] walks a property path from a root value and returns the value
//! at the end, or a [`ResolveError`] describing where the walk stopped. It
//! never panics and never subscribes to anything.
//!
//! # Lazy containers
//!
//! Before each segment is read, a lazy container in the current position is
//! replaced by its resolved value; a pending or failed container stops the
//! walk. The *terminal* value is returned as-is, container or not. Callers
//! that want the terminal container's value use [`unwrap_container`].
//!
//! # Failure Modes
//!
//! | Situation | Error |
//! |-----------|-------|
//! | segment read off a scalar, `Null` or `Undefined` | `NotAnObject` |
//! | object has no such property | `MissingProperty` |
//! | computed property fails | `Accessor` |
//! | container pending/failed before a segment | `Container` |
//! | malformed path string | `InvalidPath` |

use propchain_core::{AccessError, Value};

use crate::error::ResolveError;
use crate::path::{AsPath, PropertyPath};

/// Resolve `path` starting at `root`.
pub fn resolve(root: &Value, path: impl AsPath) -> Result<Value, ResolveError> {
    let path = path.as_path()?;
    resolve_path(root, &path)
}

/// Resolve an already-parsed path.
pub fn resolve_path(root: &Value, path: &PropertyPath) -> Result<Value, ResolveError> {
    resolve_prefix(root, path, path.depth())
}

/// Resolve only the first `depth` segments of `path`.
///
/// `depth == 0` returns `root` unchanged. `depth` larger than the path is
/// clamped to the full path.
pub fn resolve_prefix(
    root: &Value,
    path: &PropertyPath,
    depth: usize,
) -> Result<Value, ResolveError> {
    let mut current = root.clone();
    for (index, segment) in path.segments().iter().take(depth).enumerate() {
        current = unwrap_container(current, index)?;
        current = read_segment(&current, segment, index)?;
    }
    Ok(current)
}

/// Replace a lazy container with its resolved value. Other values pass
/// through unchanged.
pub fn unwrap_container(value: Value, depth: usize) -> Result<Value, ResolveError> {
    match value.as_lazy().map(|lazy| lazy.resolved()) {
        None => Ok(value),
        Some(Ok(inner)) => Ok(inner),
        Some(Err(source)) => Err(ResolveError::Container { depth, source }),
    }
}

/// Read one segment off `current`.
pub(crate) fn read_segment(
    current: &Value,
    segment: &str,
    depth: usize,
) -> Result<Value, ResolveError> {
    let Value::Object(object) = current else {
        return Err(ResolveError::NotAnObject {
            segment: segment.to_owned(),
            depth,
            found: current.kind(),
        });
    };
    object.get(segment).map_err(|err| match err {
        AccessError::Missing { .. } => ResolveError::MissingProperty {
            segment: segment.to_owned(),
            depth,
            type_name: object.type_name().to_owned(),
        },
        source => ResolveError::Accessor { depth, source },
    })
}
