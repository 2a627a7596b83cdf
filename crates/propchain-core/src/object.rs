#![forbid(unsafe_code)]

//! Object capabilities.
//!
//! Every object in a graph implements [`Object`]. Two optional capabilities
//! are discovered through safe trait-object queries rather than by probing
//! for well-known property names:
//!
//! - [`Notifiable`]: the object publishes reassignments of some of its
//!   properties.
//! - [`LazyContainer`]: the object stands in for a value that is resolved
//!   over time (see [`Updatable`](crate::updatable::Updatable)).
//!
//! An object with neither capability is *constant*: it can be read, never
//! observed.

use std::fmt;

use crate::reactive::Stream;
use crate::updatable::Resolution;
use crate::value::Value;

/// A node in a dynamic object graph.
pub trait Object {
    /// Human-readable type name, used in diagnostics.
    fn type_name(&self) -> &str;

    /// Read a property.
    ///
    /// Returns [`AccessError::Missing`] when the object has no such property
    /// and [`AccessError::Accessor`] when a computed property fails.
    fn get(&self, name: &str) -> Result<Value, AccessError>;

    /// Assign a property. Objects are read-only unless they override this.
    fn set(&self, name: &str, value: Value) -> Result<(), AccessError> {
        let _ = value;
        Err(AccessError::ReadOnly {
            property: name.to_owned(),
        })
    }

    /// Notification capability, if any.
    fn as_notifiable(&self) -> Option<&dyn Notifiable> {
        None
    }

    /// Lazy-container capability, if any.
    fn as_lazy(&self) -> Option<&dyn LazyContainer> {
        None
    }
}

/// Publishes property reassignments.
pub trait Notifiable {
    /// Stream of new values assigned to `name`, or `None` when `name` is not
    /// an observable property of this object.
    fn property_changes(&self, name: &str) -> Option<Stream<Value>>;
}

/// A value that resolves over time.
pub trait LazyContainer {
    /// Current resolution: the value, or why there is none.
    fn resolved(&self) -> Resolution;

    /// Every future resolution, in order. Does not replay the current one.
    fn updates(&self) -> Stream<Resolution>;
}

/// Failure to read or write a property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// The object has no property with this name.
    Missing { property: String },
    /// The property exists but cannot be assigned.
    ReadOnly { property: String },
    /// A computed property failed while producing its value.
    Accessor { property: String, message: String },
}

impl AccessError {
    /// Name of the property involved.
    #[must_use]
    pub fn property(&self) -> &str {
        match self {
            Self::Missing { property }
            | Self::ReadOnly { property }
            | Self::Accessor { property, .. } => property,
        }
    }
}

impl fmt::Display for AccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { property } => write!(f, "no property '{property}'"),
            Self::ReadOnly { property } => write!(f, "property '{property}' is read-only"),
            Self::Accessor { property, message } => {
                write!(f, "accessor for '{property}' failed: {message}")
            }
        }
    }
}

impl std::error::Error for AccessError {}
