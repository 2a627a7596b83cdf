#![forbid(unsafe_code)]

//! Push-based reactive primitives.
//!
//! - [`Stream`]: a cold, cloneable recipe for a sequence of values.
//! - [`Subscription`]: RAII guard that tears a subscription down on drop.
//! - [`Subject`]: a hot multicast source backing object notifications.
//! - [`SubscriptionScope`]: groups subscriptions for a logical owner.
//!
//! # Architecture
//!
//! Everything is single-threaded (`Rc<RefCell<..>>`). Delivery is
//! synchronous: a call to [`Subject::next`] returns only after every
//! downstream operator and sink has run.
//!
//! # Invariants
//!
//! 1. Subscribers of one subject are notified in registration order.
//! 2. Dropping a [`Subscription`] releases every nested subscription it
//!    created before returning.
//! 3. Operators never hold a borrow across a downstream call.

pub mod operators;
#[cfg(any(test, feature = "test-helpers"))]
pub mod recorder;
pub mod scope;
pub mod stream;
pub mod subject;

#[cfg(any(test, feature = "test-helpers"))]
pub use recorder::Recorder;
pub use scope::SubscriptionScope;
pub use stream::{Sink, Stream, Subscription};
pub use subject::Subject;
