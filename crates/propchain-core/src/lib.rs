#![forbid(unsafe_code)]

//! Object graph collaborators for `propchain`.
//!
//! This crate provides the pieces a property-chain observer consumes:
//!
//! - [`value::Value`]: dynamically-typed values, objects by identity.
//! - [`object`]: the [`Object`](object::Object) trait and its two optional
//!   capabilities, [`Notifiable`](object::Notifiable) and
//!   [`LazyContainer`](object::LazyContainer).
//! - [`notify_object`]: schema-driven objects that publish reassignments.
//! - [`updatable`]: a lazily-resolved single-value container.
//! - [`reactive`]: the push-based stream toolkit everything is built on.
//!
//! All types are single-threaded (`Rc`-based, `!Send`).

pub mod notify_object;
pub mod object;
pub mod reactive;
pub mod updatable;
pub mod value;

pub use notify_object::{NotifyObject, ObjectSchema, PropertyKind};
pub use object::{AccessError, LazyContainer, Notifiable, Object};
pub use reactive::{Stream, Subject, Subscription, SubscriptionScope};
pub use updatable::{Resolution, Updatable, UpdatableError};
pub use value::{ObjectRef, Value};
