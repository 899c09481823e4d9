//! Property-based tests for depth, shape and equality laws.

use json_shape_guard::depth::measure_depth;
use json_shape_guard::document::Document;
use json_shape_guard::equality::{deep_equal, Datum};
use json_shape_guard::shape::map_shape;
use proptest::prelude::*;
use serde_json::Value;

fn json_value_strategy(max_depth: u32) -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|v| Value::Number(v.into())),
        any::<f64>()
            .prop_filter("finite", |v| v.is_finite())
            .prop_map(|v| serde_json::Number::from_f64(v).map_or(Value::Null, Value::Number)),
        ".*".prop_map(Value::String),
    ];

    leaf.prop_recursive(max_depth, 64, 8, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,4}", inner, 0..4)
                .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    })
}

/// 1 + deepest composite child, 1 for leaves and leaf-only composites.
fn reference_depth(value: &Value) -> usize {
    let children: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => map.values().collect(),
        _ => Vec::new(),
    };
    1 + children
        .into_iter()
        .filter(|child| child.is_array() || child.is_object())
        .map(reference_depth)
        .max()
        .unwrap_or(0)
}

/// Replace every primitive with null, keeping composites and keys.
fn blank_leaves(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(blank_leaves).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), blank_leaves(v)))
                .collect(),
        ),
        _ => Value::Null,
    }
}

proptest! {
    #[test]
    fn depth_matches_reference(value in json_value_strategy(5)) {
        let doc = Document::from_json(&value);
        prop_assert_eq!(measure_depth(doc.root(), None).unwrap(), reference_depth(&value));
    }

    #[test]
    fn deep_equal_is_reflexive(value in json_value_strategy(4)) {
        let datum = Datum::from(&value);
        prop_assert!(deep_equal(&datum, &datum));
        prop_assert!(deep_equal(&datum, &datum.clone()));
    }

    #[test]
    fn deep_equal_is_symmetric(a in json_value_strategy(3), b in json_value_strategy(3)) {
        let (x, y) = (Datum::from(&a), Datum::from(&b));
        prop_assert_eq!(deep_equal(&x, &y), deep_equal(&y, &x));
    }

    #[test]
    fn shape_is_reflexive(value in json_value_strategy(4)) {
        let doc = Document::from_json(&value);
        let shape = map_shape(doc.root(), None).unwrap();
        prop_assert!(deep_equal(&Datum::from(&shape), &Datum::from(&shape)));
    }

    #[test]
    fn leaf_values_do_not_change_shape_or_depth(value in json_value_strategy(4)) {
        let original = Document::from_json(&value);
        let blanked = Document::from_json(&blank_leaves(&value));

        let a = map_shape(original.root(), None).unwrap();
        let b = map_shape(blanked.root(), None).unwrap();
        prop_assert!(deep_equal(&Datum::from(&a), &Datum::from(&b)));
        prop_assert_eq!(
            measure_depth(original.root(), None).unwrap(),
            measure_depth(blanked.root(), None).unwrap()
        );
    }
}
