//! Uniform view of the trees walked by the depth analyzer and the shape
//! mapper. Implemented by document nodes and by schema nodes.

use crate::document::NodeRef;

/// Identity of a composite node within one traversal.
///
/// Two distinct composites with equal content have distinct identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeIdentity(usize);

impl NodeIdentity {
    pub fn new(raw: usize) -> Self {
        Self(raw)
    }
}

pub trait TreeNode: Copy {
    /// Identity of a composite node, `None` for leaves. Leaves are never
    /// tracked and never descended into.
    fn identity(self) -> Option<NodeIdentity>;

    /// True for associative composites (objects, nested schemas), false
    /// for ordered sequences and leaves.
    fn is_mapping(self) -> bool;

    /// Enumerable fields in a stable order.
    fn entries(self) -> Vec<(String, Self)>;

    /// Runtime type name used in diagnostics.
    fn type_name(self) -> &'static str;

    fn is_composite(self) -> bool {
        self.identity().is_some()
    }
}

impl<'a> TreeNode for NodeRef<'a> {
    fn identity(self) -> Option<NodeIdentity> {
        self.kind()
            .is_composite()
            .then(|| NodeIdentity::new(self.id().index()))
    }

    fn is_mapping(self) -> bool {
        self.is_object()
    }

    fn entries(self) -> Vec<(String, Self)> {
        NodeRef::entries(self)
    }

    fn type_name(self) -> &'static str {
        self.kind().name()
    }
}
