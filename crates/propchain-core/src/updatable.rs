#![forbid(unsafe_code)]

//! Lazily-resolved single-value container.
//!
//! An [`Updatable`] is an object that stands in for a value arriving over
//! time. It is either pending, resolved to a [`Value`], or failed. Every
//! change of resolution is stored first and then published, so a subscriber
//! that reads [`LazyContainer::resolved`] from inside its callback sees the
//! value it is being notified about.
//!
//! # Failure Modes
//!
//! | Event | Stored state | Published |
//! |-------|--------------|-----------|
//! | `set_value(v)` | `Ok(v)` | `Ok(v)` |
//! | `fail(msg)` | `Err(Failed(msg))` | `Err(Failed(msg))` |
//! | upstream emits `v` (`from_stream`) | `Ok(v)` | `Ok(v)` |
//!
//! A failure never ends the update stream; a later `set_value` recovers.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::object::{AccessError, LazyContainer, Object};
use crate::reactive::{Stream, Subject, Subscription};
use crate::value::Value;

/// Outcome of resolving a lazy container.
pub type Resolution = Result<Value, UpdatableError>;

/// Why a lazy container has no value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdatableError {
    /// Nothing has been produced yet.
    Pending,
    /// The producer reported a failure.
    Failed(String),
}

impl fmt::Display for UpdatableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("value not yet available"),
            Self::Failed(msg) => write!(f, "value failed to resolve: {msg}"),
        }
    }
}

impl std::error::Error for UpdatableError {}

/// A lazily-resolved value with a stream of updates.
pub struct Updatable {
    state: RefCell<Resolution>,
    updates: Subject<Resolution>,
    upstream: RefCell<Option<Subscription>>,
}

impl Updatable {
    /// A container with nothing resolved yet.
    #[must_use]
    pub fn pending() -> Rc<Self> {
        Rc::new(Self::with_state(Err(UpdatableError::Pending)))
    }

    /// A container already resolved to `value`.
    #[must_use]
    pub fn ready(value: impl Into<Value>) -> Rc<Self> {
        Rc::new(Self::with_state(Ok(value.into())))
    }

    /// A container fed by `source`. Each value `source` produces becomes the
    /// new resolution. The upstream subscription lives as long as the
    /// container.
    #[must_use]
    pub fn from_stream(source: &Stream<Value>) -> Rc<Self> {
        let this = Self::pending();
        let weak = Rc::downgrade(&this);
        let sub = source.subscribe(move |value| {
            if let Some(this) = weak.upgrade() {
                this.set_value(value);
            }
        });
        *this.upstream.borrow_mut() = Some(sub);
        this
    }

    fn with_state(state: Resolution) -> Self {
        Self {
            state: RefCell::new(state),
            updates: Subject::new(),
            upstream: RefCell::new(None),
        }
    }

    /// Resolve to `value` and publish it.
    pub fn set_value(&self, value: impl Into<Value>) {
        self.publish(Ok(value.into()));
    }

    /// Mark the container failed and publish the failure.
    pub fn fail(&self, message: impl Into<String>) {
        self.publish(Err(UpdatableError::Failed(message.into())));
    }

    /// The resolved value, if any.
    #[must_use]
    pub fn value(&self) -> Option<Value> {
        self.state.borrow().as_ref().ok().cloned()
    }

    /// Wrap this container as a [`Value`].
    #[must_use]
    pub fn to_value(self: &Rc<Self>) -> Value {
        Value::Object(Rc::clone(self) as Rc<dyn Object>)
    }

    /// Number of live update subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.updates.subscriber_count()
    }

    fn publish(&self, resolution: Resolution) {
        *self.state.borrow_mut() = resolution.clone();
        tracing::trace!(ok = resolution.is_ok(), "updatable resolution changed");
        self.updates.next(resolution);
    }
}

impl Object for Updatable {
    fn type_name(&self) -> &str {
        "Updatable"
    }

    fn get(&self, name: &str) -> Result<Value, AccessError> {
        Err(AccessError::Missing {
            property: name.to_owned(),
        })
    }

    fn as_lazy(&self) -> Option<&dyn LazyContainer> {
        Some(self)
    }
}

impl LazyContainer for Updatable {
    fn resolved(&self) -> Resolution {
        self.state.borrow().clone()
    }

    fn updates(&self) -> Stream<Resolution> {
        self.updates.as_stream()
    }
}

impl fmt::Debug for Updatable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Updatable")
            .field("state", &*self.state.borrow())
            .field("subscribers", &self.updates.subscriber_count())
            .finish()
    }
}
