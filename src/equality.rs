//! General deep equality.
//!
//! Number policy: two numbers are equal when their bit patterns match or
//! when both are NaN. `0.0` and `-0.0` are therefore different.
//!
//! [`deep_equal`] recurses without cycle detection. [`Datum`] is an owned
//! tree and cannot be cyclic, so callers converting from a
//! [`Document`](crate::document::Document) go through
//! [`Datum::from_node`], which rejects cycles first.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde_json::Value;

use crate::document::NodeRef;
use crate::error::ShapeError;
use crate::shape::{DepthShape, ShapeFingerprint};

/// Key of a [`Datum::Record`] field. Symbols are compared by description.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RecordKey {
    Name(String),
    Symbol(String),
}

impl From<&str> for RecordKey {
    fn from(name: &str) -> Self {
        Self::Name(name.to_owned())
    }
}

impl From<String> for RecordKey {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

/// Any value the comparator understands.
#[derive(Debug, Clone)]
pub enum Datum {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Instant(DateTime<Utc>),
    Pattern(Regex),
    /// Ordered sequence; compared index by index.
    Sequence(Vec<Datum>),
    /// Unordered collection; repeated elements collapse.
    Set(Vec<Datum>),
    /// Associative collection with arbitrary keys, in any order.
    Map(Vec<(Datum, Datum)>),
    /// Plain record with named (or symbolic) fields.
    Record(BTreeMap<RecordKey, Datum>),
}

impl Datum {
    pub fn record<K, I>(fields: I) -> Self
    where
        K: Into<RecordKey>,
        I: IntoIterator<Item = (K, Datum)>,
    {
        Self::Record(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Convert a document node, failing on cyclic input.
    pub fn from_node(node: NodeRef<'_>) -> Result<Self, ShapeError> {
        Ok(Self::from(&node.to_json()?))
    }
}

pub fn deep_equal(a: &Datum, b: &Datum) -> bool {
    match (a, b) {
        (Datum::Null, Datum::Null) => true,
        (Datum::Bool(x), Datum::Bool(y)) => x == y,
        (Datum::Number(x), Datum::Number(y)) => same_number(*x, *y),
        (Datum::String(x), Datum::String(y)) => x == y,
        (Datum::Instant(x), Datum::Instant(y)) => x == y,
        (Datum::Pattern(x), Datum::Pattern(y)) => x.as_str() == y.as_str(),
        (Datum::Sequence(xs), Datum::Sequence(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| deep_equal(x, y))
        }
        (Datum::Set(xs), Datum::Set(ys)) => contains_all(xs, ys) && contains_all(ys, xs),
        (Datum::Map(xs), Datum::Map(ys)) => entries_within(xs, ys) && entries_within(ys, xs),
        (Datum::Record(xs), Datum::Record(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(key, value)| ys.get(key).is_some_and(|other| deep_equal(value, other)))
        }
        _ => false,
    }
}

fn contains_all(outer: &[Datum], inner: &[Datum]) -> bool {
    inner.iter().all(|x| outer.iter().any(|y| deep_equal(x, y)))
}

/// Every entry of `inner` has a structurally equal key in `outer` whose
/// first match carries an equal value.
fn entries_within(inner: &[(Datum, Datum)], outer: &[(Datum, Datum)]) -> bool {
    inner.iter().all(|(key, value)| {
        outer
            .iter()
            .find(|(other, _)| deep_equal(key, other))
            .is_some_and(|(_, other)| deep_equal(value, other))
    })
}

fn same_number(x: f64, y: f64) -> bool {
    x.to_bits() == y.to_bits() || (x.is_nan() && y.is_nan())
}

impl From<&Value> for Datum {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => Self::Number(n.as_f64().unwrap_or(f64::NAN)),
            Value::String(s) => Self::String(s.clone()),
            Value::Array(items) => Self::Sequence(items.iter().map(Self::from).collect()),
            Value::Object(map) => Self::Record(
                map.iter()
                    .map(|(k, v)| (RecordKey::Name(k.clone()), Self::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&DepthShape> for Datum {
    fn from(shape: &DepthShape) -> Self {
        Datum::record([
            ("keyNames", names(&shape.key_names)),
            ("keysWithSubObjects", names(&shape.keys_with_sub_objects)),
        ])
    }
}

fn names(keys: &[String]) -> Datum {
    Datum::Sequence(keys.iter().cloned().map(Datum::String).collect())
}

impl From<&ShapeFingerprint> for Datum {
    fn from(fingerprint: &ShapeFingerprint) -> Self {
        let map = fingerprint
            .map
            .iter()
            .map(|(depth, shape)| (format!("depth{depth}"), Datum::from(shape)));
        let parents = fingerprint.parent_map.iter().map(|(depth, links)| {
            let links = links.iter().map(|(child, parent)| {
                let parent = parent.clone().map_or(Datum::Null, Datum::String);
                (child.clone(), parent)
            });
            (format!("depth{depth}"), Datum::record(links))
        });
        Datum::record([
            ("map", Datum::record(map)),
            ("parentMap", Datum::record(parents)),
        ])
    }
}
