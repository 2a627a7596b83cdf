#![forbid(unsafe_code)]

//! Observation combinators.
//!
//! The public face of the crate. Every function here is a thin composition
//! of [`observe_chain`] with the stream operators in
//! [`propchain_core::reactive`].
//!
//! # Usage
//!
//! ```
//! use propchain::prelude::*;
//! use propchain_core::{NotifyObject, ObjectSchema, Value};
//!
//! let schema = ObjectSchema::new("Person")
//!     .observable("first")
//!     .observable("last")
//!     .observable("full")
//!     .build();
//! let person = NotifyObject::new(&schema);
//! let root = person.to_value();
//!
//! let _sub = observe2_into(
//!     &root,
//!     "first",
//!     "last",
//!     |first, last| match (first.as_str(), last.as_str()) {
//!         (Some(f), Some(l)) => Value::from(format!("{f} {l}")),
//!         _ => Value::Null,
//!     },
//!     "full",
//! )
//! .subscribe(|_| {});
//!
//! person.put("first", "Ada").unwrap();
//! person.put("last", "Lovelace").unwrap();
//! assert_eq!(person.read("full").unwrap(), Value::from("Ada Lovelace"));
//! ```
//!
//! # Invariants
//!
//! 1. Multi-path combinators emit nothing until every path has emitted.
//! 2. After that, each new emission on any path produces one combined
//!    result paired with the latest value of every other path.
//! 3. Write-back happens before the combined value is passed downstream.
//!
//! # Failure Modes
//!
//! - A fallible combiner (`try_observe_all`) returning `Err`: that
//!   emission is withheld and logged at debug; the stream continues.
//! - Write-back target is not an object or rejects the write: logged at
//!   debug; the value is still emitted.
//! - A path that never resolves holds back every combined result.

use std::fmt::Display;

use propchain_core::{Stream, Value};

use crate::change::PropertyChange;
use crate::chain::{observe_chain, observe_chain_with};
use crate::options::ObserveOptions;
use crate::path::AsPath;

/// Values at the end of `path`.
pub fn observe(root: &Value, path: impl AsPath) -> Stream<Value> {
    observe_property(root, path).map(|change| change.value)
}

/// Values at the end of `path`, with explicit options.
pub fn observe_with_options(
    root: &Value,
    path: impl AsPath,
    options: ObserveOptions,
) -> Stream<Value> {
    observe_chain_with(root, path, options).map(|change| change.value)
}

/// Full change events for `path`.
pub fn observe_property(root: &Value, path: impl AsPath) -> Stream<PropertyChange> {
    observe_chain(root, path)
}

/// Combine the latest values of two paths.
pub fn observe2<R: 'static>(
    root: &Value,
    a: impl AsPath,
    b: impl AsPath,
    combine: impl Fn(Value, Value) -> R + 'static,
) -> Stream<R> {
    combine_pair(observe(root, a), observe(root, b), combine)
}

/// Combine the latest change events of two paths.
pub fn observe_property2<R: 'static>(
    root: &Value,
    a: impl AsPath,
    b: impl AsPath,
    combine: impl Fn(PropertyChange, PropertyChange) -> R + 'static,
) -> Stream<R> {
    combine_pair(observe_property(root, a), observe_property(root, b), combine)
}

/// Combine the latest values of any number of paths.
///
/// `combine` receives one value per path, in the order given. With no
/// paths the stream never emits.
pub fn observe_all<P, R>(
    root: &Value,
    paths: impl IntoIterator<Item = P>,
    combine: impl Fn(&[Value]) -> R + 'static,
) -> Stream<R>
where
    P: AsPath,
    R: 'static,
{
    let streams = paths.into_iter().map(|path| observe(root, path)).collect();
    Stream::combine_latest(streams).map(move |row| combine(&row))
}

/// Combine the latest change events of any number of paths.
pub fn observe_property_all<P, R>(
    root: &Value,
    paths: impl IntoIterator<Item = P>,
    combine: impl Fn(&[PropertyChange]) -> R + 'static,
) -> Stream<R>
where
    P: AsPath,
    R: 'static,
{
    let streams = paths
        .into_iter()
        .map(|path| observe_property(root, path))
        .collect();
    Stream::combine_latest(streams).map(move |row| combine(&row))
}

/// [`observe_all`] with a fallible combiner. `Err` results are dropped.
pub fn try_observe_all<P, R, E>(
    root: &Value,
    paths: impl IntoIterator<Item = P>,
    combine: impl Fn(&[Value]) -> Result<R, E> + 'static,
) -> Stream<R>
where
    P: AsPath,
    R: 'static,
    E: Display + 'static,
{
    observe_all(root, paths, combine).filter_map(|result| match result {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::debug!(%err, "combined value withheld");
            None
        }
    })
}

/// Assign every value of `stream` to `object.property`, then pass it on.
pub fn to_property(stream: &Stream<Value>, object: &Value, property: &str) -> Stream<Value> {
    let Some(target) = object.as_object().cloned() else {
        tracing::debug!(property, found = object.kind(), "write-back target is not an object");
        return stream.clone();
    };
    let property: Box<str> = property.into();
    stream.tap(move |value| {
        if let Err(err) = target.set(&property, value.clone()) {
            tracing::debug!(
                object = target.type_name(),
                %err,
                "write-back failed"
            );
        }
    })
}

/// [`observe_all`], writing each combined value to `root.target`.
pub fn observe_all_into<P: AsPath>(
    root: &Value,
    paths: impl IntoIterator<Item = P>,
    combine: impl Fn(&[Value]) -> Value + 'static,
    target: &str,
) -> Stream<Value> {
    to_property(&observe_all(root, paths, combine), root, target)
}

/// [`observe2`], writing each combined value to `root.target`.
pub fn observe2_into(
    root: &Value,
    a: impl AsPath,
    b: impl AsPath,
    combine: impl Fn(Value, Value) -> Value + 'static,
    target: &str,
) -> Stream<Value> {
    to_property(&observe2(root, a, b, combine), root, target)
}

fn combine_pair<T, R>(
    a: Stream<T>,
    b: Stream<T>,
    combine: impl Fn(T, T) -> R + 'static,
) -> Stream<R>
where
    T: Clone + 'static,
    R: 'static,
{
    Stream::combine_latest(vec![a, b]).filter_map(move |row| {
        let mut row = row.into_iter();
        match (row.next(), row.next()) {
            (Some(a), Some(b)) => Some(combine(a, b)),
            _ => None,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path;
    use propchain_core::reactive::Recorder;
    use propchain_core::{NotifyObject, ObjectSchema};
    use std::rc::Rc;
    use tracing_test::traced_test;

    fn pair() -> Rc<NotifyObject> {
        let schema = ObjectSchema::new("Pair")
            .observable("a")
            .observable("b")
            .observable("sum")
            .computed("frozen", |_| Ok(Value::Int(0)))
            .build();
        NotifyObject::new(&schema)
    }

    fn add(values: &[Value]) -> Value {
        values
            .iter()
            .map(|v| v.as_int())
            .sum::<Option<i64>>()
            .map_or(Value::Null, Value::Int)
    }

    #[test]
    fn observe_maps_to_values() {
        let p = pair();
        let rec = Recorder::attach(&observe(&p.to_value(), "a"));
        p.put("a", 1).unwrap();
        assert_eq!(rec.values(), vec![Value::Undefined, Value::Int(1)]);
    }

    #[test]
    fn typed_and_untyped_paths_agree() {
        let p = pair();
        p.put("a", 3).unwrap();
        let untyped = Recorder::attach(&observe(&p.to_value(), "a"));
        let typed = Recorder::attach(&observe(&p.to_value(), path!(a)));
        assert_eq!(untyped.values(), typed.values());
    }

    #[test]
    fn observe_with_options_can_skip_initial() {
        let p = pair();
        let rec = Recorder::attach(&observe_with_options(
            &p.to_value(),
            "a",
            ObserveOptions::new().with_skip_initial(true),
        ));
        assert!(rec.is_empty());
        p.put("a", 2).unwrap();
        assert_eq!(rec.values(), vec![Value::Int(2)]);
    }

    #[test]
    fn observe2_waits_for_both_sides() {
        let p = pair();
        let inner = pair();
        inner.put("a", 5).unwrap();
        let rec = Recorder::attach(&observe2(&p.to_value(), "a", "b.a", |a, b| (a, b)));
        assert!(rec.is_empty(), "b.a does not resolve yet");

        p.put("b", inner.to_value()).unwrap();
        p.put("a", 1).unwrap();
        inner.put("a", 6).unwrap();
        assert_eq!(
            rec.values(),
            vec![
                (Value::Undefined, Value::Int(5)),
                (Value::Int(1), Value::Int(5)),
                (Value::Int(1), Value::Int(6)),
            ]
        );
    }

    #[test]
    fn observe_property2_sees_full_events() {
        let p = pair();
        let root = p.to_value();
        let rec = Recorder::attach(&observe_property2(&root, "a", "b", |a, b| {
            (a.property.to_string(), b.property.to_string())
        }));
        assert_eq!(rec.values(), vec![("a".to_owned(), "b".to_owned())]);
    }

    #[test]
    fn observe_all_combines_in_path_order() {
        let p = pair();
        p.put("a", 1).unwrap();
        p.put("b", 2).unwrap();
        let rec = Recorder::attach(&observe_all(&p.to_value(), ["b", "a"], |row| {
            row.iter().filter_map(Value::as_int).collect::<Vec<_>>()
        }));
        p.put("a", 10).unwrap();
        assert_eq!(rec.values(), vec![vec![2, 1], vec![2, 10]]);
    }

    #[test]
    fn observe_all_without_paths_is_silent() {
        let p = pair();
        let rec = Recorder::attach(&observe_all(
            &p.to_value(),
            Vec::<&str>::new(),
            |row| row.len(),
        ));
        p.put("a", 1).unwrap();
        assert!(rec.is_empty());
    }

    #[test]
    fn observe_property_all_reports_root_as_sender() {
        let p = pair();
        let root = p.to_value();
        let sender = root.clone();
        let rec = Recorder::attach(&observe_property_all(&root, ["a", "b"], move |row| {
            row.iter().all(|change| change.is_from(&sender))
        }));
        assert_eq!(rec.values(), vec![true]);
    }

    #[traced_test]
    #[test]
    fn try_observe_all_drops_errors() {
        let p = pair();
        let rec = Recorder::attach(&try_observe_all(&p.to_value(), ["a", "b"], |row| {
            match add(row) {
                Value::Null => Err("operands missing"),
                total => Ok(total),
            }
        }));
        assert!(rec.is_empty());
        p.put("a", 1).unwrap();
        p.put("b", 2).unwrap();
        assert_eq!(rec.values(), vec![Value::Int(3)]);
        assert!(logs_contain("combined value withheld"));
    }

    #[test]
    fn observe_all_into_writes_back() {
        let p = pair();
        let root = p.to_value();
        let _sub = observe_all_into(&root, ["a", "b"], add, "sum").subscribe(|_| {});
        let sums = Recorder::attach(&observe(&root, "sum"));

        p.put("a", 2).unwrap();
        p.put("b", 3).unwrap();
        assert_eq!(p.read("sum").unwrap(), Value::Int(5));
        assert_eq!(sums.last(), Some(Value::Int(5)));
    }

    #[test]
    fn observe2_into_emits_and_writes() {
        let p = pair();
        let root = p.to_value();
        let rec = Recorder::attach(&observe2_into(
            &root,
            "a",
            "b",
            |a, b| add(&[a, b]),
            "sum",
        ));
        p.put("a", 4).unwrap();
        p.put("b", 4).unwrap();
        assert_eq!(rec.last(), Some(Value::Int(8)));
        assert_eq!(p.read("sum").unwrap(), Value::Int(8));
    }

    #[traced_test]
    #[test]
    fn rejected_write_back_still_emits() {
        let p = pair();
        let rec = Recorder::attach(&to_property(
            &Stream::of([Value::Int(1)]),
            &p.to_value(),
            "frozen",
        ));
        assert_eq!(rec.values(), vec![Value::Int(1)]);
        assert!(logs_contain("write-back failed"));
    }

    #[test]
    fn write_back_to_non_object_passes_through() {
        let rec = Recorder::attach(&to_property(
            &Stream::of([Value::Int(1), Value::Int(2)]),
            &Value::Null,
            "anything",
        ));
        assert_eq!(rec.values(), vec![Value::Int(1), Value::Int(2)]);
    }
}
