#![forbid(unsafe_code)]

//! Emission capture for tests.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::stream::{Stream, Subscription};

/// Subscribes to a stream and records every emission.
///
/// Dropping the recorder unsubscribes.
pub struct Recorder<T> {
    seen: Rc<RefCell<Vec<T>>>,
    subscription: Subscription,
}

impl<T: Clone + 'static> Recorder<T> {
    /// Subscribe to `stream` and start recording.
    pub fn attach(stream: &Stream<T>) -> Self {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let subscription = stream.subscribe(move |value| sink.borrow_mut().push(value));
        Self { seen, subscription }
    }

    /// Everything recorded so far.
    #[must_use]
    pub fn values(&self) -> Vec<T> {
        self.seen.borrow().clone()
    }

    /// The most recent emission.
    #[must_use]
    pub fn last(&self) -> Option<T> {
        self.seen.borrow().last().cloned()
    }

    /// Number of emissions recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.borrow().len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.borrow().is_empty()
    }

    /// Return and forget everything recorded so far.
    pub fn take(&self) -> Vec<T> {
        std::mem::take(&mut *self.seen.borrow_mut())
    }

    /// Stop recording, keeping what was captured.
    pub fn detach(self) -> Vec<T> {
        let Self { seen, subscription } = self;
        drop(subscription);
        let values = seen.borrow().clone();
        values
    }
}

impl<T> fmt::Debug for Recorder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recorder")
            .field("len", &self.seen.borrow().len())
            .field("subscription", &self.subscription)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::Subject;

    #[test]
    fn records_and_detaches() {
        let subject = Subject::new();
        let recorder = Recorder::attach(&subject.as_stream());
        subject.next(1);
        subject.next(2);
        assert_eq!(recorder.take(), vec![1, 2]);
        subject.next(3);
        assert_eq!(recorder.last(), Some(3));
        let values = recorder.detach();
        assert_eq!(values, vec![3]);
        assert_eq!(subject.subscriber_count(), 0);
    }
}
