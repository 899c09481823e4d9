//! Structural fingerprints: which field names appear at each depth, which of
//! them hold nested objects, and which parent key introduced each nested
//! object.
//!
//! ```text
//! { a: 1, b: { c: 2 } }
//!
//! map:        1 -> keyNames [a, b], keysWithSubObjects [b]
//!             2 -> keyNames [c],    keysWithSubObjects []
//! parentMap:  1 -> { b: null }
//! ```

use std::collections::BTreeMap;

use serde::Serialize;

use crate::depth::Walk;
use crate::error::ShapeError;
use crate::tree::{NodeIdentity, TreeNode};

/// Keys seen at one depth, across every node at that depth.
///
/// Both lists are inventories, not sets: a name repeated in sibling
/// branches is recorded once per occurrence, in visiting order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepthShape {
    pub key_names: Vec<String>,
    pub keys_with_sub_objects: Vec<String>,
}

/// Depth (1-based) to the keys seen at that depth.
pub type ShapeMap = BTreeMap<usize, DepthShape>;

/// Depth to `nested key -> key of the object that contains it`
/// (`None` when the containing object is the walk's starting node).
pub type ParentMap = BTreeMap<usize, BTreeMap<String, Option<String>>>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeFingerprint {
    pub map: ShapeMap,
    pub parent_map: ParentMap,
}

impl ShapeFingerprint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compact JSON rendering, used in mismatch diagnostics.
    pub fn to_json_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{self:?}"))
    }
}

struct Frame<N> {
    identity: Option<NodeIdentity>,
    depth: usize,
    key: Option<String>,
    entries: std::vec::IntoIter<(String, N)>,
}

/// Fingerprint `node` from scratch.
pub fn map_shape<N: TreeNode>(
    node: N,
    walk: Option<&mut Walk>,
) -> Result<ShapeFingerprint, ShapeError> {
    let mut fingerprint = ShapeFingerprint::new();
    map_shape_into(node, &mut fingerprint, None, walk)?;
    Ok(fingerprint)
}

/// Add the fingerprint of `node` to an existing one. `parent_key` is
/// recorded as the parent of the nested objects found directly in `node`.
pub fn map_shape_into<N: TreeNode>(
    node: N,
    fingerprint: &mut ShapeFingerprint,
    parent_key: Option<&str>,
    walk: Option<&mut Walk>,
) -> Result<(), ShapeError> {
    let mut fresh = None;
    let walk = match walk {
        Some(walk) => walk,
        None => fresh.insert(Walk::default()),
    };

    let mut stack = Vec::new();
    let outcome = descend(node, parent_key, fingerprint, walk, &mut stack);
    if outcome.is_err() {
        while let Some(frame) = stack.pop() {
            walk.leave(frame.identity);
        }
    }
    outcome
}

fn descend<N: TreeNode>(
    node: N,
    parent_key: Option<&str>,
    fingerprint: &mut ShapeFingerprint,
    walk: &mut Walk,
    stack: &mut Vec<Frame<N>>,
) -> Result<(), ShapeError> {
    let origin = walk.origin();
    stack.push(open(node, origin, parent_key.map(str::to_owned), fingerprint, walk)?);

    while let Some(frame) = stack.last_mut() {
        let depth = frame.depth;
        let Some((key, child)) = frame.entries.next() else {
            if let Some(done) = stack.pop() {
                walk.leave(done.identity);
            }
            continue;
        };
        let parent = frame.key.clone();

        let level = fingerprint.map.entry(depth).or_default();
        level.key_names.push(key.clone());
        if child.is_mapping() {
            level.keys_with_sub_objects.push(key.clone());
            fingerprint
                .parent_map
                .entry(depth)
                .or_default()
                .insert(key.clone(), parent);
            stack.push(open(child, depth + 1, Some(key), fingerprint, walk)?);
        }
    }

    Ok(())
}

fn open<N: TreeNode>(
    node: N,
    depth: usize,
    key: Option<String>,
    fingerprint: &mut ShapeFingerprint,
    walk: &mut Walk,
) -> Result<Frame<N>, ShapeError> {
    let identity = walk.enter(node, depth)?;
    fingerprint.map.entry(depth).or_default();
    Ok(Frame {
        identity,
        depth,
        key,
        entries: node.entries().into_iter(),
    })
}
