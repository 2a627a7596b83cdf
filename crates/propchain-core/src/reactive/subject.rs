#![forbid(unsafe_code)]

//! Hot multicast source.
//!
//! Subscribers are stored as `Weak` callbacks; the strong handle lives in the
//! returned [`Subscription`]. Dead entries are pruned lazily, on dispatch and
//! on unsubscribe.
//!
//! Dispatch walks a snapshot of the subscriber list and upgrades each entry
//! just before calling it, so a subscriber may subscribe, unsubscribe, or
//! publish again from inside its own callback:
//!
//! - subscribers added during dispatch first see the *next* value;
//! - subscribers removed during dispatch are not called again, even if they
//!   were still ahead in the snapshot.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use super::stream::{Sink, Stream, Subscription};

type Subscribers<T> = Rc<RefCell<Vec<Weak<dyn Fn(T)>>>>;

/// A hot, multicast source of `T`. Cloning shares the subscriber list.
pub struct Subject<T> {
    subscribers: Subscribers<T>,
}

impl<T> Clone for Subject<T> {
    fn clone(&self) -> Self {
        Self {
            subscribers: Rc::clone(&self.subscribers),
        }
    }
}

impl<T: Clone + 'static> Subject<T> {
    /// Create a subject with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscribers: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Deliver `value` to every live subscriber, in registration order.
    pub fn next(&self, value: T) {
        let snapshot: Vec<Weak<dyn Fn(T)>> = self.subscribers.borrow().clone();
        let mut saw_dead = false;
        for weak in &snapshot {
            match weak.upgrade() {
                Some(callback) => callback(value.clone()),
                None => saw_dead = true,
            }
        }
        if saw_dead {
            self.prune();
        }
    }

    /// Register `sink`; the returned guard removes it.
    pub fn subscribe_sink(&self, sink: Sink<T>) -> Subscription {
        // Own a fresh handle: `sink` may be shared with other sources.
        let callback: Rc<dyn Fn(T)> = Rc::new(move |value| sink(value));
        self.subscribers.borrow_mut().push(Rc::downgrade(&callback));
        let subscribers = Rc::downgrade(&self.subscribers);
        Subscription::new(move || {
            drop(callback);
            if let Some(subscribers) = subscribers.upgrade() {
                subscribers
                    .borrow_mut()
                    .retain(|weak| weak.strong_count() > 0);
            }
        })
    }

    /// Register a callback.
    pub fn subscribe(&self, on_next: impl Fn(T) + 'static) -> Subscription {
        self.subscribe_sink(Rc::new(on_next))
    }

    /// View this subject as a [`Stream`].
    #[must_use]
    pub fn as_stream(&self) -> Stream<T> {
        let subject = self.clone();
        Stream::new(move |sink| subject.subscribe_sink(sink))
    }

    /// Number of subscribers that are still alive.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .borrow()
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }

    fn prune(&self) {
        self.subscribers
            .borrow_mut()
            .retain(|weak| weak.strong_count() > 0);
    }
}

impl<T: Clone + 'static> Default for Subject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + 'static> fmt::Debug for Subject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subject")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
