#![forbid(unsafe_code)]

//! Cold, push-based streams and their RAII subscriptions.
//!
//! A [`Stream<T>`] is a recipe: nothing happens until [`Stream::subscribe`]
//! is called, and every subscription is an independent session. Values are
//! delivered synchronously on the caller's thread.
//!
//! # Invariants
//!
//! 1. A [`Subscription`] runs its teardown exactly once, either on
//!    [`Subscription::unsubscribe`] or on drop.
//! 2. After teardown returns, no further values reach the subscriber.
//! 3. Cloning a `Stream` shares the recipe, not any subscription state.

use std::fmt;
use std::rc::Rc;

use super::scope::SubscriptionScope;

/// Downstream receiver of stream values.
pub type Sink<T> = Rc<dyn Fn(T)>;

// ---------------------------------------------------------------------------
// Subscription
// ---------------------------------------------------------------------------

/// RAII guard for a live stream subscription.
///
/// Dropping the guard tears the subscription down.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    teardown: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Create a subscription that runs `teardown` when released.
    pub fn new(teardown: impl FnOnce() + 'static) -> Self {
        Self {
            teardown: Some(Box::new(teardown)),
        }
    }

    /// A subscription with nothing to release.
    pub fn empty() -> Self {
        Self { teardown: None }
    }

    /// Keep `held` alive until this subscription is released.
    pub fn hold<H: 'static>(held: H) -> Self {
        Self::new(move || drop(held))
    }

    /// Combine several subscriptions into one. They are released in reverse
    /// order.
    pub fn merge(subscriptions: impl IntoIterator<Item = Subscription>) -> Self {
        let mut scope = SubscriptionScope::new();
        for sub in subscriptions {
            scope.hold(sub);
        }
        Self::hold(scope)
    }

    /// Release the subscription now.
    pub fn unsubscribe(mut self) {
        self.release();
    }

    /// Whether the teardown has already run (or there never was one).
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.teardown.is_none()
    }

    fn release(&mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("closed", &self.is_closed())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Stream<T>
// ---------------------------------------------------------------------------

/// A cold, cloneable, push-based stream of `T`.
pub struct Stream<T> {
    subscribe_fn: Rc<dyn Fn(Sink<T>) -> Subscription>,
}

impl<T> Clone for Stream<T> {
    fn clone(&self) -> Self {
        Self {
            subscribe_fn: Rc::clone(&self.subscribe_fn),
        }
    }
}

impl<T> fmt::Debug for Stream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stream").finish_non_exhaustive()
    }
}

impl<T: 'static> Stream<T> {
    /// Build a stream from its subscribe function.
    ///
    /// `subscribe` is invoked once per subscriber. It may deliver values
    /// synchronously before returning.
    pub fn new(subscribe: impl Fn(Sink<T>) -> Subscription + 'static) -> Self {
        Self {
            subscribe_fn: Rc::new(subscribe),
        }
    }

    /// A stream that never emits.
    pub fn empty() -> Self {
        Self::new(|_| Subscription::empty())
    }

    /// Subscribe with a callback.
    pub fn subscribe(&self, on_next: impl Fn(T) + 'static) -> Subscription {
        self.subscribe_sink(Rc::new(on_next))
    }

    /// Subscribe with a shared sink.
    pub fn subscribe_sink(&self, sink: Sink<T>) -> Subscription {
        (self.subscribe_fn)(sink)
    }
}

impl<T: Clone + 'static> Stream<T> {
    /// A stream that synchronously replays `items` to every subscriber.
    pub fn of(items: impl IntoIterator<Item = T>) -> Self {
        let items: Rc<[T]> = items.into_iter().collect();
        Self::new(move |sink| {
            for item in items.iter() {
                sink(item.clone());
            }
            Subscription::empty()
        })
    }
}
