use crate::error::ShapeError;
use crate::tracker::IdentityTracker;
use crate::tree::{NodeIdentity, TreeNode};

/// Default maximum nesting depth accepted by a walk.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Traversal context shared by the depth analyzer and the shape mapper.
///
/// A walk owns the identity tracker of one traversal, the depth assigned to
/// the node it starts from, and the nesting limit. Passing the same walk to
/// several calls continues one traversal; passing `None` to a walker starts
/// a fresh one.
#[derive(Debug, Clone)]
pub struct Walk {
    tracker: IdentityTracker,
    origin: usize,
    max_depth: usize,
}

impl Default for Walk {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl Walk {
    pub fn new(max_depth: usize) -> Self {
        Self {
            tracker: IdentityTracker::new(),
            origin: 1,
            max_depth,
        }
    }

    /// Depth assigned to the node a walker starts from (1 by default).
    pub fn starting_at(mut self, depth: usize) -> Self {
        self.origin = depth;
        self
    }

    pub fn origin(&self) -> usize {
        self.origin
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn tracker(&self) -> &IdentityTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut IdentityTracker {
        &mut self.tracker
    }

    /// Register entry into `node` at `depth`.
    pub(crate) fn enter<N: TreeNode>(
        &mut self,
        node: N,
        depth: usize,
    ) -> Result<Option<NodeIdentity>, ShapeError> {
        let identity = node.identity();
        if let Some(id) = identity {
            if self.tracker.has(id) {
                return Err(ShapeError::CycleDetected { depth });
            }
        }
        if depth > self.max_depth {
            return Err(ShapeError::DepthLimitExceeded {
                limit: self.max_depth,
            });
        }
        if let Some(id) = identity {
            self.tracker.add(id);
        }
        Ok(identity)
    }

    pub(crate) fn leave(&mut self, identity: Option<NodeIdentity>) {
        if let Some(id) = identity {
            self.tracker.remove(id);
        }
    }
}

struct Frame<N> {
    identity: Option<NodeIdentity>,
    depth: usize,
    children: std::vec::IntoIter<N>,
}

/// Maximum nesting depth of `node`: its own depth when no field is a
/// composite, otherwise the deepest composite descendant.
pub fn measure_depth<N: TreeNode>(node: N, walk: Option<&mut Walk>) -> Result<usize, ShapeError> {
    measure_depth_visiting(node, walk, |_, _| {})
}

/// [`measure_depth`], calling `on_visit(node, depth)` on every node entered.
pub fn measure_depth_visiting<N, F>(
    node: N,
    walk: Option<&mut Walk>,
    mut on_visit: F,
) -> Result<usize, ShapeError>
where
    N: TreeNode,
    F: FnMut(N, usize),
{
    let mut fresh = None;
    let walk = match walk {
        Some(walk) => walk,
        None => fresh.insert(Walk::default()),
    };

    let mut stack = Vec::new();
    let outcome = descend(node, walk, &mut stack, &mut on_visit);
    if outcome.is_err() {
        while let Some(frame) = stack.pop() {
            walk.leave(frame.identity);
        }
    }
    outcome
}

fn descend<N, F>(
    node: N,
    walk: &mut Walk,
    stack: &mut Vec<Frame<N>>,
    on_visit: &mut F,
) -> Result<usize, ShapeError>
where
    N: TreeNode,
    F: FnMut(N, usize),
{
    let origin = walk.origin;
    let mut deepest = origin;
    stack.push(open(node, origin, walk, on_visit)?);

    while let Some(frame) = stack.last_mut() {
        let depth = frame.depth + 1;
        match frame.children.next() {
            Some(child) => {
                stack.push(open(child, depth, walk, on_visit)?);
                deepest = deepest.max(depth);
            }
            None => {
                if let Some(done) = stack.pop() {
                    walk.leave(done.identity);
                }
            }
        }
    }

    Ok(deepest)
}

fn open<N, F>(node: N, depth: usize, walk: &mut Walk, on_visit: &mut F) -> Result<Frame<N>, ShapeError>
where
    N: TreeNode,
    F: FnMut(N, usize),
{
    let identity = walk.enter(node, depth)?;
    on_visit(node, depth);
    let children: Vec<N> = node
        .entries()
        .into_iter()
        .map(|(_, child)| child)
        .filter(|child| child.is_composite())
        .collect();
    Ok(Frame {
        identity,
        depth,
        children: children.into_iter(),
    })
}
