//! Property tests for chain observation.
//!
//! Random assignment sequences are applied to a small graph and the observed
//! emissions are compared against a model: the deduplicated sequence of
//! successful full-path resolutions.

use std::rc::Rc;

use proptest::prelude::*;
use propchain::prelude::*;
use propchain::resolve;
use propchain_core::reactive::Recorder;

const NODES: usize = 3;

#[derive(Debug, Clone)]
enum GraphOp {
    /// `nodes[node].foo = value`
    SetLeaf { node: usize, value: i64 },
    /// `root.bar = nodes[node]`, or `root.bar = null` for `None`.
    Relink { node: Option<usize> },
}

fn arb_graph_op() -> impl Strategy<Value = GraphOp> {
    prop_oneof![
        3 => (0..NODES, 0i64..4).prop_map(|(node, value)| GraphOp::SetLeaf { node, value }),
        1 => prop::option::of(0..NODES).prop_map(|node| GraphOp::Relink { node }),
    ]
}

fn schema() -> Rc<ObjectSchema> {
    ObjectSchema::new("Node")
        .observable("foo")
        .observable("bar")
        .build()
}

/// Append `value` to `model` unless it repeats the last entry.
fn push_distinct(model: &mut Vec<Value>, value: Value) {
    if model.last() != Some(&value) {
        model.push(value);
    }
}

proptest! {
    #[test]
    fn single_segment_emits_distinct_assignments(values in prop::collection::vec(0i64..4, 0..40)) {
        let r = NotifyObject::new(&schema());
        let rec = Recorder::attach(&observe(&r.to_value(), "foo"));

        let mut model = vec![Value::Undefined];
        for v in &values {
            r.put("foo", *v).unwrap();
            push_distinct(&mut model, Value::Int(*v));
        }
        prop_assert_eq!(rec.values(), model);
    }

    #[test]
    fn two_level_chain_tracks_resolution(ops in prop::collection::vec(arb_graph_op(), 0..60)) {
        let nodes: Vec<_> = (0..NODES).map(|_| NotifyObject::new(&schema())).collect();
        let r = NotifyObject::new(&schema());
        let root = r.to_value();
        r.put("bar", nodes[0].to_value()).unwrap();

        let rec = Recorder::attach(&observe(&root, "bar.foo"));
        let mut model = Vec::new();
        if let Ok(v) = resolve(&root, "bar.foo") {
            model.push(v);
        }

        for op in &ops {
            match op {
                GraphOp::SetLeaf { node, value } => nodes[*node].put("foo", *value).unwrap(),
                GraphOp::Relink { node: Some(node) } => r.put("bar", nodes[*node].to_value()).unwrap(),
                GraphOp::Relink { node: None } => r.put("bar", Value::Null).unwrap(),
            }
            if let Ok(v) = resolve(&root, "bar.foo") {
                push_distinct(&mut model, v);
            }
        }
        prop_assert_eq!(rec.values(), model);

        // Only the linked node (if any) is observed.
        let linked = nodes
            .iter()
            .filter(|n| n.subscriber_count("foo") > 0)
            .count();
        prop_assert!(linked <= 1);
        drop(rec);
        for n in &nodes {
            prop_assert_eq!(n.subscriber_count("foo"), 0);
        }
    }

    #[test]
    fn combine_latest_pairs_each_emission_with_the_other_latest(
        ops in prop::collection::vec((any::<bool>(), 0i64..3), 0..40)
    ) {
        let r = NotifyObject::new(&schema());
        let rec = Recorder::attach(&observe2(&r.to_value(), "foo", "bar", |a, b| (a, b)));

        let mut latest = (Value::Undefined, Value::Undefined);
        let mut model = vec![latest.clone()];
        for (left, v) in &ops {
            let value = Value::Int(*v);
            let (name, slot) = if *left { ("foo", &mut latest.0) } else { ("bar", &mut latest.1) };
            r.put(name, value.clone()).unwrap();
            if *slot != value {
                *slot = value;
                model.push(latest.clone());
            }
        }
        prop_assert_eq!(rec.values(), model);
    }
}
