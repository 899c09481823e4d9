use std::collections::HashSet;

use crate::tree::NodeIdentity;

/// Visited set keyed by node identity, never by content.
///
/// Owned by a single traversal. The walkers add a node when they enter it
/// and remove it once its subtree is finished, so membership means "is an
/// ancestor of the node being visited".
#[derive(Debug, Default, Clone)]
pub struct IdentityTracker {
    active: HashSet<NodeIdentity>,
}

impl IdentityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, node: NodeIdentity) -> bool {
        self.active.contains(&node)
    }

    pub fn add(&mut self, node: NodeIdentity) {
        self.active.insert(node);
    }

    pub fn remove(&mut self, node: NodeIdentity) {
        self.active.remove(&node);
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}
