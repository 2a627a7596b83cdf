#![forbid(unsafe_code)]

//! Change events.

use std::fmt;
use std::rc::Rc;

use propchain_core::value::same_object;
use propchain_core::{ObjectRef, Value};

use crate::path::PropertyPath;

/// A property change, as delivered by [`notify`](crate::notify::notify) and
/// [`observe_chain`](crate::chain::observe_chain).
///
/// For chain events `sender` is the root the chain was started from and
/// `property` is the full path, whichever link actually changed.
#[derive(Clone)]
pub struct PropertyChange {
    pub sender: ObjectRef,
    pub property: PropertyPath,
    pub value: Value,
}

impl PropertyChange {
    /// Whether `sender` is `object` (identity).
    #[must_use]
    pub fn is_from(&self, object: &Value) -> bool {
        object.as_object().is_some_and(|o| same_object(o, &self.sender))
    }
}

impl PartialEq for PropertyChange {
    fn eq(&self, other: &Self) -> bool {
        same_object(&self.sender, &other.sender)
            && self.property == other.property
            && self.value == other.value
    }
}

impl fmt::Debug for PropertyChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyChange")
            .field(
                "sender",
                &format_args!("{}@{:p}", self.sender.type_name(), Rc::as_ptr(&self.sender)),
            )
            .field("property", &self.property.as_str())
            .field("value", &self.value)
            .finish()
    }
}
