#![forbid(unsafe_code)]

//! Per-property change notification.
//!
//! [`notify`] turns one `(object, property)` pair into a stream of
//! [`PropertyChange`] events. It is the only place that talks to the
//! [`Notifiable`](propchain_core::Notifiable) capability.
//!
//! # Lazy containers
//!
//! When the property holds a lazy container at subscribe time, the stream
//! also carries the container's values, starting with its current value
//! when it has one. Reassigning the property to another container switches
//! to that container's updates; reassigning it to anything else stops
//! container events. Container failures produce no event.
//!
//! # Invariants
//!
//! 1. Never panics; unsupported inputs give [`Stream::empty`].
//! 2. `sender` is the object passed in, `property` the name passed in.
//! 3. Reassignment events precede the container events they cause.

use std::rc::Rc;

use propchain_core::{ObjectRef, Stream, Value};

use crate::change::PropertyChange;
use crate::path::PropertyPath;

/// Stream of changes to `property` on `object`.
pub fn notify(object: &Value, property: &str) -> Stream<PropertyChange> {
    let Value::Object(sender) = object else {
        return Stream::empty();
    };
    let Some(changes) = sender
        .as_notifiable()
        .and_then(|notifiable| notifiable.property_changes(property))
    else {
        return Stream::empty();
    };

    let sender = Rc::clone(sender);
    let property = PropertyPath::property(property);
    Stream::new(move |sink| {
        let shape = event_shaper(&sender, &property);
        let reassignments = {
            let shape = Rc::clone(&shape);
            changes.map(move |value| shape(value))
        };
        if holds_container(&sender, property.leaf()) {
            let current = sender.get(property.leaf()).unwrap_or_default();
            let from_containers = changes
                .start_with(current)
                .switch_map(container_values)
                .map(move |value| shape(value));
            Stream::merge(vec![reassignments, from_containers]).subscribe_sink(sink)
        } else {
            reassignments.subscribe_sink(sink)
        }
    })
}

/// Whether `object.property` currently holds a lazy container.
pub(crate) fn holds_container(object: &ObjectRef, property: &str) -> bool {
    object.get(property).is_ok_and(|value| value.is_lazy())
}

/// Current value (if resolved) followed by every later value of a lazy
/// container; nothing for any other value.
fn container_values(value: Value) -> Stream<Value> {
    let Some(lazy) = value.as_lazy() else {
        return Stream::empty();
    };
    let updates = lazy.updates().filter_map(Result::ok);
    match lazy.resolved() {
        Ok(current) => updates.start_with(current),
        Err(_) => updates,
    }
}

fn event_shaper(sender: &ObjectRef, property: &PropertyPath) -> Rc<dyn Fn(Value) -> PropertyChange> {
    let sender = Rc::clone(sender);
    let property = property.clone();
    Rc::new(move |value| PropertyChange {
        sender: Rc::clone(&sender),
        property: property.clone(),
        value,
    })
}
