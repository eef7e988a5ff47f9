use std::fmt::{self, Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TREE: AtomicU64 = AtomicU64::new(1);
static NEXT_NODE: AtomicU64 = AtomicU64::new(1);

/// Identity of one running instance of a tree definition.
///
/// Many instances (e.g. one per agent) can drive the same [`crate::BehaviorTree`];
/// everything they remember is kept apart in the blackboard by this id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TreeId(u64);

impl TreeId {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self(NEXT_TREE.fetch_add(1, Ordering::Relaxed))
    }
}

impl Display for TreeId {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "tree#{}", self.0)
    }
}

/// Identity of a node inside a tree definition, shared by all tree instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u64);

impl NodeId {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self(NEXT_NODE.fetch_add(1, Ordering::Relaxed))
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}
