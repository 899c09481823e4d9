//! Depth analyzer: nesting depth, visit hook, cycle detection and the
//! depth limit.

use json_shape_guard::depth::{measure_depth, measure_depth_visiting, Walk};
use json_shape_guard::document::{Document, NodeId};
use json_shape_guard::error::ShapeError;
use json_shape_guard::schema::Schema;
use serde_json::json;

fn depth_of(value: serde_json::Value) -> usize {
    let doc = Document::from_json(&value);
    measure_depth(doc.root(), None).unwrap()
}

/// Build `{ n: { n: { ... } } }` with `levels` nested objects below the root.
fn chain(levels: usize) -> Document {
    let mut doc = Document::new();
    let mut parent = doc.root_id();
    for _ in 0..levels {
        let child = doc.add_object();
        doc.set(parent, "n", child).unwrap();
        parent = child;
    }
    doc
}

#[test]
fn flat_object_has_depth_one() {
    assert_eq!(depth_of(json!({"a": 1, "b": "x", "c": null})), 1);
    assert_eq!(depth_of(json!({})), 1);
}

#[test]
fn nested_objects_add_one_level_each() {
    assert_eq!(depth_of(json!({"a": {"b": {"c": 1}}})), 3);
    assert_eq!(depth_of(json!({"a": {"b": 1}, "c": {"d": {"e": {}}}})), 4);
}

#[test]
fn arrays_are_traversed() {
    assert_eq!(depth_of(json!({"a": []})), 2);
    assert_eq!(depth_of(json!({"a": [{"b": 1}]})), 3);
    assert_eq!(depth_of(json!({"a": [1, 2, 3]})), 2);
}

#[test]
fn primitive_root_has_depth_one() {
    assert_eq!(depth_of(json!(5)), 1);
    assert_eq!(depth_of(json!(null)), 1);
}

#[test]
fn schema_leaves_do_not_add_depth() {
    let schema = Schema::object([
        ("email", Schema::pattern(r"^\S+@\S+$").unwrap()),
        ("age", Schema::predicate(|v| v.is_some())),
        ("address", Schema::object([("street", Schema::string())])),
    ]);
    assert_eq!(measure_depth(&schema, None).unwrap(), 2);
}

#[test]
fn visit_hook_sees_every_composite_with_its_depth() {
    let doc = Document::from_json(&json!({"a": {"b": {}}, "c": 1, "d": [true]}));
    let mut visited = Vec::new();
    let depth = measure_depth_visiting(doc.root(), None, |node, depth| {
        visited.push((node.kind().name(), depth));
    })
    .unwrap();

    assert_eq!(depth, 3);
    assert_eq!(
        visited,
        vec![("object", 1), ("object", 2), ("object", 3), ("array", 2)]
    );
}

#[test]
fn self_reference_is_a_cycle() {
    let mut doc = Document::new();
    let root = doc.root_id();
    doc.set(root, "me", root).unwrap();

    let err = measure_depth(doc.root(), None).unwrap_err();
    assert!(matches!(err, ShapeError::CycleDetected { depth: 2 }), "got {err:?}");
}

#[test]
fn indirect_cycle_through_array_is_detected() {
    let mut doc = Document::new();
    let root = doc.root_id();
    let list = doc.add_array();
    let item = doc.add_object();
    doc.set(root, "list", list).unwrap();
    doc.push(list, item).unwrap();
    doc.set(item, "owner", root).unwrap();

    let err = measure_depth(doc.root(), None).unwrap_err();
    assert!(matches!(err, ShapeError::CycleDetected { depth: 4 }), "got {err:?}");
}

#[test]
fn shared_subtree_is_not_a_cycle() {
    let mut doc = Document::new();
    let root = doc.root_id();
    let shared = doc.add_value(&json!({"x": 1}));
    doc.set(root, "left", shared).unwrap();
    doc.set(root, "right", shared).unwrap();

    assert_eq!(measure_depth(doc.root(), None).unwrap(), 2);
}

#[test]
fn depth_limit_is_enforced() {
    let doc = chain(9);
    let mut walk = Walk::new(5);
    let err = measure_depth(doc.root(), Some(&mut walk)).unwrap_err();
    assert!(matches!(err, ShapeError::DepthLimitExceeded { limit: 5 }), "got {err:?}");

    let mut walk = Walk::new(10);
    assert_eq!(measure_depth(doc.root(), Some(&mut walk)).unwrap(), 10);
}

#[test]
fn very_deep_documents_do_not_overflow_the_stack() {
    let doc = chain(50_000);
    let mut walk = Walk::new(100_000);
    assert_eq!(measure_depth(doc.root(), Some(&mut walk)).unwrap(), 50_001);
}

#[test]
fn walk_is_clean_after_success_and_failure() {
    let doc = Document::from_json(&json!({"a": {"b": {}}}));
    let mut walk = Walk::default();
    measure_depth(doc.root(), Some(&mut walk)).unwrap();
    assert!(walk.tracker().is_empty());

    let mut cyclic = Document::new();
    let root = cyclic.root_id();
    let child = cyclic.add_object();
    cyclic.set(root, "child", child).unwrap();
    cyclic.set(child, "back", root).unwrap();
    assert!(measure_depth(cyclic.root(), Some(&mut walk)).is_err());
    assert!(walk.tracker().is_empty(), "failed walk must release its ancestors");
}

#[test]
fn walk_can_start_below_the_root() {
    let doc = Document::from_json(&json!({"a": {"b": 1}}));
    let mut walk = Walk::default().starting_at(3);
    assert_eq!(measure_depth(doc.root(), Some(&mut walk)).unwrap(), 4);
}

#[test]
fn builder_rejects_misuse() {
    let mut doc = Document::new();
    let leaf = doc.add_value(&json!(1));
    let root = doc.root_id();

    assert!(matches!(
        doc.set(leaf, "x", root),
        Err(ShapeError::InvalidArgument(_))
    ));
    assert!(matches!(doc.push(root, leaf), Err(ShapeError::InvalidArgument(_))));

    let mut other = Document::new();
    for _ in 0..5 {
        other.add_object();
    }
    let foreign: NodeId = other.add_object();
    assert!(matches!(
        doc.set(root, "x", foreign),
        Err(ShapeError::InvalidArgument(_))
    ));
}

#[test]
fn tracker_uses_identity_not_content() {
    use json_shape_guard::tracker::IdentityTracker;
    use json_shape_guard::tree::TreeNode;

    let doc = Document::from_json(&json!({"a": {"x": 1}, "b": {"x": 1}}));
    let a = doc.root().get("a").unwrap().identity().unwrap();
    let b = doc.root().get("b").unwrap().identity().unwrap();
    assert!(doc.root().get("a").unwrap().get("x").unwrap().identity().is_none());

    let mut tracker = IdentityTracker::new();
    tracker.add(a);
    assert!(tracker.has(a));
    assert!(!tracker.has(b), "equal content must not count as a revisit");
    tracker.remove(a);
    assert!(tracker.is_empty());
}
