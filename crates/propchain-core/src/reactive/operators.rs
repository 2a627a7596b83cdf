#![forbid(unsafe_code)]

//! Stream combinators.
//!
//! All operators are cold: per-subscription state (the last value for
//! [`Stream::distinct_until_changed`], the active inner stream for
//! [`Stream::switch_map`], the latest row for [`Stream::combine_latest`])
//! is created inside the subscribe function and dropped with the
//! subscription.
//!
//! No operator holds a `RefCell` borrow while calling downstream, so sinks
//! may re-enter the pipeline.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::stream::{Sink, Stream, Subscription};

impl<T: 'static> Stream<T> {
    /// Transform every value.
    pub fn map<U: 'static>(&self, f: impl Fn(T) -> U + 'static) -> Stream<U> {
        let source = self.clone();
        let f = Rc::new(f);
        Stream::new(move |sink: Sink<U>| {
            let f = Rc::clone(&f);
            source.subscribe(move |value| sink(f(value)))
        })
    }

    /// Drop values for which `keep` returns `false`.
    pub fn filter(&self, keep: impl Fn(&T) -> bool + 'static) -> Stream<T> {
        let source = self.clone();
        let keep = Rc::new(keep);
        Stream::new(move |sink: Sink<T>| {
            let keep = Rc::clone(&keep);
            source.subscribe(move |value| {
                if keep(&value) {
                    sink(value);
                }
            })
        })
    }

    /// Transform and drop in one step.
    pub fn filter_map<U: 'static>(&self, f: impl Fn(T) -> Option<U> + 'static) -> Stream<U> {
        let source = self.clone();
        let f = Rc::new(f);
        Stream::new(move |sink: Sink<U>| {
            let f = Rc::clone(&f);
            source.subscribe(move |value| {
                if let Some(mapped) = f(value) {
                    sink(mapped);
                }
            })
        })
    }

    /// Run a side effect on every value before passing it on.
    pub fn tap(&self, effect: impl Fn(&T) + 'static) -> Stream<T> {
        let source = self.clone();
        let effect = Rc::new(effect);
        Stream::new(move |sink: Sink<T>| {
            let effect = Rc::clone(&effect);
            source.subscribe(move |value| {
                effect(&value);
                sink(value);
            })
        })
    }

    /// Emit values from `self` and `other` as they arrive.
    pub fn merge_with(&self, other: &Stream<T>) -> Stream<T> {
        Stream::merge(vec![self.clone(), other.clone()])
    }

    /// Emit values from every stream as they arrive. Subscribes in order.
    pub fn merge(streams: Vec<Stream<T>>) -> Stream<T> {
        let streams: Rc<[Stream<T>]> = streams.into();
        Stream::new(move |sink: Sink<T>| {
            let subs: Vec<Subscription> = streams
                .iter()
                .map(|stream| stream.subscribe_sink(Rc::clone(&sink)))
                .collect();
            Subscription::merge(subs)
        })
    }

    /// Map each value to a stream and follow only the most recent one.
    ///
    /// The previous inner subscription is released before the next one is
    /// installed. Values from a superseded inner stream are discarded even
    /// if it emits during its own teardown.
    pub fn switch_map<U: 'static>(&self, f: impl Fn(T) -> Stream<U> + 'static) -> Stream<U> {
        let source = self.clone();
        let f = Rc::new(f);
        Stream::new(move |sink: Sink<U>| {
            let state = Rc::new(SwitchState {
                inner: RefCell::new(None),
                generation: Cell::new(0),
            });
            let f = Rc::clone(&f);
            let outer_state = Rc::clone(&state);
            let outer = source.subscribe(move |value| {
                let generation = outer_state.generation.get().wrapping_add(1);
                outer_state.generation.set(generation);
                let previous = outer_state.inner.borrow_mut().take();
                drop(previous);

                let inner_sink = Rc::clone(&sink);
                let weak_state = Rc::downgrade(&outer_state);
                let inner = f(value).subscribe(move |item| {
                    let current = weak_state
                        .upgrade()
                        .is_some_and(|state| state.generation.get() == generation);
                    if current {
                        inner_sink(item);
                    }
                });
                if outer_state.generation.get() == generation {
                    *outer_state.inner.borrow_mut() = Some(inner);
                }
            });
            Subscription::new(move || {
                drop(outer);
                state.generation.set(state.generation.get().wrapping_add(1));
                let inner = state.inner.borrow_mut().take();
                drop(inner);
            })
        })
    }
}

struct SwitchState {
    inner: RefCell<Option<Subscription>>,
    generation: Cell<u64>,
}

impl<T: Clone + 'static> Stream<T> {
    /// Emit `first` synchronously on subscribe, then everything from `self`.
    pub fn start_with(&self, first: T) -> Stream<T> {
        let source = self.clone();
        Stream::new(move |sink: Sink<T>| {
            sink(first.clone());
            source.subscribe_sink(sink)
        })
    }

    /// Combine the latest value of every stream.
    ///
    /// Nothing is emitted until every stream has produced at least one
    /// value; afterwards each arrival emits a full row, pairing the new value
    /// with the most recent value of every other stream. An empty input never
    /// emits.
    pub fn combine_latest(streams: Vec<Stream<T>>) -> Stream<Vec<T>> {
        let streams: Rc<[Stream<T>]> = streams.into();
        Stream::new(move |sink: Sink<Vec<T>>| {
            let latest: Rc<RefCell<Vec<Option<T>>>> =
                Rc::new(RefCell::new(vec![None; streams.len()]));
            let subs: Vec<Subscription> = streams
                .iter()
                .enumerate()
                .map(|(index, stream)| {
                    let latest = Rc::clone(&latest);
                    let sink = Rc::clone(&sink);
                    stream.subscribe(move |value| {
                        let row = {
                            let mut latest = latest.borrow_mut();
                            latest[index] = Some(value);
                            latest.iter().cloned().collect::<Option<Vec<T>>>()
                        };
                        if let Some(row) = row {
                            sink(row);
                        }
                    })
                })
                .collect();
            Subscription::merge(subs)
        })
    }
}

impl<T: Clone + PartialEq + 'static> Stream<T> {
    /// Suppress values equal to the immediately preceding emission.
    pub fn distinct_until_changed(&self) -> Stream<T> {
        let source = self.clone();
        Stream::new(move |sink: Sink<T>| {
            let last: RefCell<Option<T>> = RefCell::new(None);
            source.subscribe(move |value| {
                {
                    let mut last = last.borrow_mut();
                    if last.as_ref() == Some(&value) {
                        return;
                    }
                    *last = Some(value.clone());
                }
                sink(value);
            })
        })
    }
}
