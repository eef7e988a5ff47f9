//! # behavior-tree-tick
//!
//! A behavior tree driven one tick at a time, whose nodes keep no run state of
//! their own.
//!
//!
//! ## Overview
//!
//! A tree definition ([`BehaviorTree`]) is built once and can then be ticked on
//! behalf of any number of tree instances, e.g. one per enemy in a game.
//! Everything that has to survive from one tick to the next (which node is
//! still running, how many times a child was called, ...) is stored in a
//! [`Blackboard`], keyed by the tree instance ([`TreeId`]) and the node
//! ([`NodeId`]). Two agents sharing one definition never see each other's state.
//!
//! Each node goes through the same lifecycle on every execution:
//!
//! * `enter` - always
//! * `open` - only if the node is not already open for this tree instance
//! * `tick` - the node's own logic, returning a [`BehaviorResult`]
//! * `close` - only if the result is not `Running`
//! * `exit` - always
//!
//! [`BehaviorNodeContainer::execute`] applies this state machine uniformly, and
//! a node only ever drives its children through it.
//!
//!
//! ## How it looks like
//!
//! ```rust
//! # use behavior_tree_tick::*;
//! let mut guard = BehaviorNodeContainer::new_node(LimiterNode::new(2).unwrap());
//! guard.add_child(BehaviorNodeContainer::new_node(SucceederNode)).unwrap();
//! let tree = BehaviorTree::new(guard);
//!
//! let mut blackboard = Blackboard::new();
//! let agent = TreeId::new();
//!
//! // The limiter closes after every completed call, so each tick starts a new
//! // activation with a fresh quota.
//! assert_eq!(tree.tick(agent, &mut blackboard), BehaviorResult::Success);
//! assert_eq!(tree.tick(agent, &mut blackboard), BehaviorResult::Success);
//! ```
//!
//!
//! ## How to define your own node
//!
//! Implement [`BehaviorNode`]. Nodes take `&self`: per-run state goes to the
//! blackboard through the [`Tick`], which knows which node is running.
//!
//! ```rust
//! # use behavior_tree_tick::*;
//! struct CountDown;
//!
//! impl BehaviorNode for CountDown {
//!     fn open(&self, tick: &mut Tick) {
//!         tick.set("left", 3u32);
//!     }
//!
//!     fn tick(&self, _children: &[BehaviorNodeContainer], tick: &mut Tick) -> BehaviorResult {
//!         let left = tick.get::<u32>("left").copied().unwrap_or(0);
//!         if left == 0 {
//!             return BehaviorResult::Success;
//!         }
//!         tick.set("left", left - 1);
//!         BehaviorResult::Running
//!     }
//! }
//! ```
//!
//! Leaves can talk to the host application with [`Tick::notify`], which
//! forwards a `&dyn Any` to the callback given to
//! [`BehaviorTree::tick_with_callback`].
//!
//!
//! ## Loading a tree from YAML
//!
//! ```rust
//! # use behavior_tree_tick::*;
//! let source = r#"
//! title: guard
//! root:
//!   type: Limiter
//!   properties:
//!     max_loop: 3
//!   children:
//!     - type: Succeeder
//! "#;
//! let tree = load_yaml(source, &Registry::default()).unwrap();
//! assert_eq!(tree.title(), "guard");
//! ```

mod blackboard;
mod container;
pub mod error;
mod id;
mod loader;
mod nodes;
mod registry;
mod symbol;
mod tick;
mod tree;

use std::any::Any;

pub use crate::blackboard::{Blackboard, Scope};
pub use crate::container::BehaviorNodeContainer;
pub use crate::id::{NodeId, TreeId};
pub use crate::loader::load_yaml;
pub use crate::nodes::{
    ErrorNode, FailerNode, FallbackNode, ForceFailureNode, ForceSuccessNode, InverterNode,
    LimiterNode, ReactiveFallbackNode, ReactiveSequenceNode, RepeatNode, RetryNode, RunnerNode,
    SequenceNode, SucceederNode,
};
pub use crate::registry::{boxify, Constructor, Registry};
pub use crate::symbol::Symbol;
pub use crate::tick::Tick;
pub use crate::tree::BehaviorTree;
pub use ::once_cell::sync::*;

#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash)]
pub enum BehaviorResult {
    Success,
    Fail,
    /// The node should keep running in the next tick
    Running,
    /// The node could not run at all, e.g. a decorator without a child
    Error,
}

impl BehaviorResult {
    /// Everything but `Running` ends an activation.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Running)
    }
}

/// Parameters of a node as written in a tree description.
pub type NodeSettings = serde_yaml::Mapping;

pub type BehaviorCallback<'a> = &'a mut dyn FnMut(&dyn Any) -> Option<Box<dyn Any>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeCategory {
    Leaf,
    Composite,
    Decorator,
}

impl NodeCategory {
    pub fn max_children(self) -> NumChildren {
        match self {
            Self::Leaf => NumChildren::Finite(0),
            Self::Composite => NumChildren::Infinite,
            Self::Decorator => NumChildren::Finite(1),
        }
    }
}

#[derive(PartialEq, Eq, Debug)]
pub enum NumChildren {
    Finite(usize),
    Infinite,
}

impl PartialOrd for NumChildren {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(match (self, other) {
            (NumChildren::Finite(_), NumChildren::Infinite) => std::cmp::Ordering::Less,
            (NumChildren::Infinite, NumChildren::Finite(_)) => std::cmp::Ordering::Greater,
            (NumChildren::Finite(lhs), NumChildren::Finite(rhs)) => lhs.cmp(rhs),
            (NumChildren::Infinite, NumChildren::Infinite) => return None,
        })
    }
}

/// The behavior of one kind of node.
///
/// Implementations must not keep run state in `self`; use the memory exposed by
/// [`Tick`] so that one definition can serve many tree instances.
pub trait BehaviorNode {
    fn category(&self) -> NodeCategory {
        NodeCategory::Leaf
    }

    /// Called on every execution, before `open`.
    fn enter(&self, _tick: &mut Tick) {}

    /// Called when the node becomes open for the current tree instance.
    fn open(&self, _tick: &mut Tick) {}

    fn tick(&self, children: &[BehaviorNodeContainer], tick: &mut Tick) -> BehaviorResult;

    /// Called once per `open`, either after a terminal result or when the
    /// tree prunes a branch that stopped being visited.
    fn close(&self, _tick: &mut Tick) {}

    /// Called on every execution, after `tick` (and `close`).
    fn exit(&self, _tick: &mut Tick) {}
}
