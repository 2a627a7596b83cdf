#![forbid(unsafe_code)]

//! Live observation of property chains over object graphs.
//!
//! Given a root object and a dotted path such as `"order.customer.name"`,
//! `propchain` produces a stream that emits the value at the end of the path
//! now and again whenever it changes, no matter which link in the chain was
//! reassigned.
//!
//! # Layers
//!
//! - [`resolve`]: synchronous, total path walking.
//! - [`notify`]: change stream for one property of one object.
//! - [`chain`]: the chain observer, re-wiring links as they change.
//! - [`when_any`]: the combinators most callers use.
//!
//! Object graphs are built from [`propchain_core`] types; the most common
//! ones are re-exported here.
//!
//! # Example
//!
//! ```
//! use propchain::prelude::*;
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let schema = ObjectSchema::new("Node").observable("child").observable("label").build();
//! let root = NotifyObject::new(&schema);
//! let a = NotifyObject::new(&schema);
//! let b = NotifyObject::new(&schema);
//! a.put("label", "first").unwrap();
//! b.put("label", "second").unwrap();
//! root.put("child", a.to_value()).unwrap();
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&seen);
//! let _sub: Subscription = observe(&root.to_value(), path!(child.label))
//!     .subscribe(move |value| sink.borrow_mut().push(value));
//!
//! root.put("child", b.to_value()).unwrap();
//! assert_eq!(*seen.borrow(), vec![Value::from("first"), Value::from("second")]);
//! ```

pub mod chain;
pub mod change;
pub mod error;
pub mod notify;
pub mod options;
pub mod path;
pub mod resolve;
pub mod when_any;

pub use chain::{observe_chain, observe_chain_with};
pub use change::PropertyChange;
pub use error::{PathError, ResolveError};
pub use notify::notify;
pub use options::ObserveOptions;
pub use path::{AsPath, PropertyPath};
pub use propchain_core::{
    NotifyObject, ObjectRef, ObjectSchema, Stream, Subscription, Updatable, Value,
};
pub use resolve::{resolve, resolve_path, resolve_prefix};
pub use when_any::{
    observe, observe_all, observe_all_into, observe_property, observe_property2,
    observe_property_all, observe_with_options, observe2, observe2_into, to_property,
    try_observe_all,
};

/// Everything needed to build a graph and observe it.
pub mod prelude {
    pub use crate::path;
    pub use crate::{
        AsPath, NotifyObject, ObjectSchema, ObserveOptions, PropertyChange, PropertyPath,
        Stream, Subscription, Updatable, Value, observe, observe_all, observe_all_into,
        observe_chain, observe_property, observe_property2, observe_property_all,
        observe_with_options, observe2, observe2_into, to_property, try_observe_all,
    };
}
