#![forbid(unsafe_code)]

//! Live observation of a dotted property chain.
//!
//! [`observe_chain`] follows `root.a.b.c` and emits a [`PropertyChange`]
//! whenever the value at the end of the chain changes, whichever link in the
//! chain was reassigned.
//!
//! # Architecture
//!
//! Each subscription owns a `ChainObserver`: an arena of links indexed by
//! depth. Link `k` holds the [`notify`] subscription for segment `k` on the
//! object currently reachable at prefix `[0..k]`. When link `k` fires:
//!
//! 1. links `k..n` are re-resolved; a link whose owner (and container mode)
//!    is unchanged keeps its subscription, any other link releases its old
//!    subscription before the new one is installed;
//! 2. links below a prefix that no longer resolves are released, deepest
//!    first, and stay empty until a higher link re-establishes the prefix;
//! 3. the full path is resolved from `root` and emitted unless it equals the
//!    previous emission.
//!
//! When the root itself is a lazy container, its updates re-wire every
//! link, since each prefix is resolved through it.
//!
//! Link callbacks hold the observer weakly; the returned [`Subscription`]
//! is the only strong owner, so dropping it releases the whole arena.
//!
//! # Invariants
//!
//! 1. An event is emitted only when the full path resolves.
//! 2. `sender` is always the root, `property` always the full path.
//! 3. Consecutive equal values are emitted once (unless
//!    [`ObserveOptions::distinct`] is off).
//! 4. Notifications raised while links are being rebuilt are coalesced into
//!    the single emission that follows the rebuild.
//! 5. A terminal lazy container is presented through its resolved value;
//!    a pending or failed container withholds emission.
//!
//! # Failure Modes
//!
//! | Input | Behaviour |
//! |-------|-----------|
//! | malformed path | never emits (logged at debug) |
//! | non-object root | never emits (logged at debug) |
//! | link unreachable | deeper links idle until re-established |
//! | sink writes to an observed property | handled re-entrantly |

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use propchain_core::reactive::Sink;
use propchain_core::{ObjectRef, Stream, Subscription, Value};
use smallvec::SmallVec;

use crate::change::PropertyChange;
use crate::notify::{holds_container, notify};
use crate::options::ObserveOptions;
use crate::path::{AsPath, PropertyPath};
use crate::resolve::{resolve_path, resolve_prefix, unwrap_container};

/// Observe `path` on `root` with default options.
pub fn observe_chain(root: &Value, path: impl AsPath) -> Stream<PropertyChange> {
    observe_chain_with(root, path, ObserveOptions::default())
}

/// Observe `path` on `root`.
pub fn observe_chain_with(
    root: &Value,
    path: impl AsPath,
    options: ObserveOptions,
) -> Stream<PropertyChange> {
    let path = match path.as_path() {
        Ok(path) => path,
        Err(err) => {
            tracing::debug!(%err, "malformed property path; chain will never emit");
            return Stream::empty();
        }
    };
    let Value::Object(root) = root else {
        tracing::debug!(
            %path,
            root = root.kind(),
            "chain root is not an object; chain will never emit"
        );
        return Stream::empty();
    };
    let root = Rc::clone(root);
    Stream::new(move |sink| ChainObserver::start(Rc::clone(&root), path.clone(), options, sink))
}

struct Link {
    owner: Value,
    container_aware: bool,
    _subscription: Subscription,
}

struct ChainObserver {
    root: ObjectRef,
    root_value: Value,
    path: PropertyPath,
    options: ObserveOptions,
    sink: Sink<PropertyChange>,
    links: RefCell<SmallVec<[Option<Link>; 4]>>,
    root_watch: RefCell<Option<Subscription>>,
    last: RefCell<Option<Value>>,
    rewiring: Cell<bool>,
    closed: Cell<bool>,
}

impl ChainObserver {
    fn start(
        root: ObjectRef,
        path: PropertyPath,
        options: ObserveOptions,
        sink: Sink<PropertyChange>,
    ) -> Subscription {
        let _span = tracing::debug_span!("observe_chain", %path).entered();
        let observer = Rc::new(Self {
            root_value: Value::Object(Rc::clone(&root)),
            root,
            links: RefCell::new((0..path.depth()).map(|_| None).collect()),
            root_watch: RefCell::new(None),
            path,
            options,
            sink,
            last: RefCell::new(None),
            rewiring: Cell::new(false),
            closed: Cell::new(false),
        });
        observer.watch_root_container();
        observer.rewire_from(0);
        observer.emit_current(true);
        Subscription::new(move || observer.shutdown())
    }

    /// A lazy container at the root is looked through by every link, so its
    /// updates re-wire the whole chain.
    fn watch_root_container(self: &Rc<Self>) {
        let Some(lazy) = self.root_value.as_lazy() else {
            return;
        };
        let weak = Rc::downgrade(self);
        let subscription = lazy.updates().subscribe(move |_| {
            if let Some(observer) = weak.upgrade() {
                observer.on_link_changed(0);
            }
        });
        *self.root_watch.borrow_mut() = Some(subscription);
    }

    fn on_link_changed(self: &Rc<Self>, depth: usize) {
        if self.closed.get() {
            return;
        }
        if self.rewiring.get() {
            tracing::trace!(path = %self.path, depth, "notification coalesced into rewiring");
            return;
        }
        self.rewire_from(depth);
        self.emit_current(false);
    }

    fn rewire_from(self: &Rc<Self>, start: usize) {
        let was_rewiring = self.rewiring.replace(true);
        for depth in start..self.path.depth() {
            let Some(segment) = self.path.segment(depth) else {
                break;
            };
            let owner = match resolve_prefix(&self.root_value, &self.path, depth)
                .and_then(|value| unwrap_container(value, depth))
            {
                Ok(owner @ Value::Object(_)) => owner,
                Ok(other) => {
                    tracing::trace!(path = %self.path, depth, found = other.kind(), "chain link idle");
                    self.release_from(depth);
                    break;
                }
                Err(err) => {
                    tracing::trace!(path = %self.path, depth, %err, "chain link idle");
                    self.release_from(depth);
                    break;
                }
            };
            let container_aware = owner
                .as_object()
                .is_some_and(|object| holds_container(object, segment));

            let unchanged = self.links.borrow()[depth].as_ref().is_some_and(|link| {
                link.owner == owner && link.container_aware == container_aware
            });
            if unchanged {
                continue;
            }

            let stale = self.links.borrow_mut()[depth].take();
            drop(stale);

            tracing::trace!(path = %self.path, depth, segment, "wiring chain link");
            let weak = Rc::downgrade(self);
            let subscription = notify(&owner, segment).subscribe(move |_| {
                if let Some(observer) = weak.upgrade() {
                    observer.on_link_changed(depth);
                }
            });
            self.links.borrow_mut()[depth] = Some(Link {
                owner,
                container_aware,
                _subscription: subscription,
            });
        }
        self.rewiring.set(was_rewiring);
    }

    /// Release links `from..n`, deepest first.
    fn release_from(&self, from: usize) {
        let stale: Vec<Link> = {
            let mut links = self.links.borrow_mut();
            links
                .iter_mut()
                .skip(from)
                .rev()
                .filter_map(Option::take)
                .collect()
        };
        drop(stale);
    }

    fn emit_current(&self, initial: bool) {
        let resolved = resolve_path(&self.root_value, &self.path)
            .and_then(|value| unwrap_container(value, self.path.depth()));
        let value = match resolved {
            Ok(value) => value,
            Err(err) => {
                tracing::trace!(path = %self.path, %err, "chain resolution withheld");
                return;
            }
        };

        if self.options.distinct {
            let mut last = self.last.borrow_mut();
            if last.as_ref() == Some(&value) {
                tracing::trace!(path = %self.path, "duplicate value suppressed");
                return;
            }
            *last = Some(value.clone());
        }
        if initial && self.options.skip_initial {
            return;
        }

        (self.sink)(PropertyChange {
            sender: Rc::clone(&self.root),
            property: self.path.clone(),
            value,
        });
    }

    fn shutdown(&self) {
        self.closed.set(true);
        let root_watch = self.root_watch.borrow_mut().take();
        drop(root_watch);
        self.release_from(0);
        self.last.borrow_mut().take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use propchain_core::reactive::Recorder;
    use propchain_core::{NotifyObject, ObjectSchema, Updatable};
    use tracing_test::traced_test;

    fn schema() -> Rc<ObjectSchema> {
        ObjectSchema::new("Node")
            .observable("foo")
            .observable("bar")
            .plain("fixed")
            .build()
    }

    fn node() -> Rc<NotifyObject> {
        NotifyObject::new(&schema())
    }

    fn values(rec: &Recorder<PropertyChange>) -> Vec<Value> {
        rec.values().into_iter().map(|c| c.value).collect()
    }

    #[test]
    fn unchanged_owner_keeps_its_subscription() {
        let root = node();
        let a = node();
        root.put("bar", a.to_value()).unwrap();

        let rec = Recorder::attach(&observe_chain(&root.to_value(), "bar.foo"));
        assert_eq!(a.subscriber_count("foo"), 1);

        root.put("bar", a.to_value()).unwrap();
        assert_eq!(a.subscriber_count("foo"), 1);
        assert_eq!(values(&rec), vec![Value::Undefined]);
    }

    #[test]
    fn replaced_owner_moves_the_subscription() {
        let root = node();
        let a = node();
        let b = node();
        root.put("bar", a.to_value()).unwrap();

        let _rec = Recorder::attach(&observe_chain(&root.to_value(), "bar.foo"));
        root.put("bar", b.to_value()).unwrap();
        assert_eq!(a.subscriber_count("foo"), 0);
        assert_eq!(b.subscriber_count("foo"), 1);
    }

    #[test]
    fn unreachable_suffix_releases_deeper_links() {
        let root = node();
        let a = node();
        let b = node();
        a.put("bar", b.to_value()).unwrap();
        root.put("bar", a.to_value()).unwrap();

        let rec = Recorder::attach(&observe_chain(&root.to_value(), "bar.bar.foo"));
        assert_eq!(b.subscriber_count("foo"), 1);

        root.put("bar", Value::Null).unwrap();
        assert_eq!(a.subscriber_count("bar"), 0);
        assert_eq!(b.subscriber_count("foo"), 0);
        assert_eq!(root.subscriber_count("bar"), 1);
        assert_eq!(rec.len(), 1);
    }

    #[test]
    fn intermediate_container_is_followed() {
        let root = node();
        let first = node();
        let second = node();
        first.put("foo", 1).unwrap();
        second.put("foo", 2).unwrap();
        let container = Updatable::ready(first.to_value());
        root.put("bar", container.to_value()).unwrap();

        let rec = Recorder::attach(&observe_chain(&root.to_value(), "bar.foo"));
        container.set_value(second.to_value());
        first.put("foo", 100).unwrap();
        second.put("foo", 3).unwrap();
        assert_eq!(values(&rec), vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        assert_eq!(first.subscriber_count("foo"), 0);
    }

    #[test]
    fn property_becoming_a_container_is_tracked() {
        let root = node();
        let rec = Recorder::attach(&observe_chain(&root.to_value(), "foo"));
        let container = Updatable::ready(5);
        root.put("foo", container.to_value()).unwrap();
        container.set_value(6);
        assert_eq!(
            values(&rec),
            vec![Value::Undefined, Value::Int(5), Value::Int(6)]
        );
    }

    #[test]
    fn root_container_updates_rewire_the_chain() {
        let a = node();
        let b = node();
        a.put("foo", 1).unwrap();
        b.put("foo", 2).unwrap();
        let container = Updatable::ready(a.to_value());

        let rec = Recorder::attach(&observe_chain(&container.to_value(), "foo"));
        assert_eq!(container.subscriber_count(), 1);

        container.set_value(b.to_value());
        assert_eq!(a.subscriber_count("foo"), 0);
        a.put("foo", 10).unwrap();
        b.put("foo", 3).unwrap();
        container.fail("gone");
        b.put("foo", 4).unwrap();
        assert_eq!(values(&rec), vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        assert_eq!(b.subscriber_count("foo"), 0);

        drop(rec);
        assert_eq!(container.subscriber_count(), 0);
    }

    #[test]
    fn sink_may_write_back_into_the_graph() {
        let root = node();
        let stream = observe_chain(&root.to_value(), "foo");
        let writer = Rc::clone(&root);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        let _sub = stream.subscribe(move |change| {
            s.borrow_mut().push(change.value.clone());
            if change.value == Value::Int(1) {
                writer.put("foo", 2).unwrap();
            }
        });
        root.put("foo", 1).unwrap();
        assert_eq!(
            *seen.borrow(),
            vec![Value::Undefined, Value::Int(1), Value::Int(2)]
        );
    }

    #[test]
    fn sink_may_unsubscribe_itself() {
        let root = node();
        let holder: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let count = Rc::new(Cell::new(0));
        let h = Rc::clone(&holder);
        let c = Rc::clone(&count);
        let sub = observe_chain(&root.to_value(), "foo").subscribe(move |_| {
            c.set(c.get() + 1);
            if c.get() == 2 {
                let sub = h.borrow_mut().take();
                drop(sub);
            }
        });
        *holder.borrow_mut() = Some(sub);

        root.put("foo", 1).unwrap();
        root.put("foo", 2).unwrap();
        assert_eq!(count.get(), 2);
        assert_eq!(root.subscriber_count("foo"), 0);
    }

    #[test]
    fn distinct_off_emits_every_resolution() {
        let root = node();
        let rec = Recorder::attach(&observe_chain_with(
            &root.to_value(),
            "foo",
            ObserveOptions::new().with_distinct(false),
        ));
        root.put("foo", 1).unwrap();
        root.put("foo", 1).unwrap();
        assert_eq!(
            values(&rec),
            vec![Value::Undefined, Value::Int(1), Value::Int(1)]
        );
    }

    #[test]
    fn skip_initial_still_seeds_dedup() {
        let root = node();
        root.put("foo", 1).unwrap();
        let rec = Recorder::attach(&observe_chain_with(
            &root.to_value(),
            "foo",
            ObserveOptions::new().with_skip_initial(true),
        ));
        assert!(rec.is_empty());
        root.put("foo", 1).unwrap();
        assert!(rec.is_empty());
        root.put("foo", 2).unwrap();
        assert_eq!(values(&rec), vec![Value::Int(2)]);
    }

    #[test]
    fn each_subscription_is_independent() {
        let root = node();
        root.put("foo", 1).unwrap();
        let stream = observe_chain(&root.to_value(), "foo");
        let first = Recorder::attach(&stream);
        drop(first);
        let second = Recorder::attach(&stream);
        assert_eq!(values(&second), vec![Value::Int(1)]);
    }

    #[traced_test]
    #[test]
    fn malformed_path_is_logged_and_silent() {
        let root = node();
        let rec = Recorder::attach(&observe_chain(&root.to_value(), "foo..bar"));
        root.put("foo", 1).unwrap();
        assert!(rec.is_empty());
        assert!(logs_contain("malformed property path"));
    }

    #[traced_test]
    #[test]
    fn non_object_root_is_logged_and_silent() {
        let rec = Recorder::attach(&observe_chain(&Value::Int(4), "foo"));
        assert!(rec.is_empty());
        assert!(logs_contain("chain root is not an object"));
    }
}
