use crate::{NodeId, Symbol, TreeId};
use std::{any::Any, collections::HashMap, fmt};

/// Which part of the blackboard an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Visible to every node of every tree sharing the blackboard.
    Global,
    /// Private to one tree instance.
    Tree(TreeId),
    /// Private to one node within one tree instance.
    Node(TreeId, NodeId),
}

impl Scope {
    fn tree(&self) -> Option<TreeId> {
        match self {
            Self::Global => None,
            Self::Tree(tree) | Self::Node(tree, _) => Some(*tree),
        }
    }
}

/// Key of a blackboard entry.
///
/// Names written by node code are always `User`; the other variants hold the
/// engine's own bookkeeping and cannot be produced from a [`Symbol`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Key {
    User(Symbol),
    /// Whether a node is open, node scope.
    IsOpen,
    /// Nodes left open by the last pass, tree scope.
    OpenNodes,
    /// Node executions during the last pass, tree scope.
    NodeCount,
}

/// Scoped memory shared by the nodes of one or more trees.
///
/// All state that must survive from one tick to the next lives here, keyed by
/// `(scope, name)`. The engine keeps its own entries next to them under keys
/// that no name can collide with. Values are type-erased; reading with the wrong type gives
/// `None` exactly like reading a name that was never written.
///
/// ```
/// # use behavior_tree_tick::*;
/// let mut bb = Blackboard::new();
/// let (a, b) = (TreeId::new(), TreeId::new());
/// let node = NodeId::new();
/// bb.set_node("i", 3usize, a, node);
/// assert_eq!(bb.get_node::<usize>("i", a, node), Some(&3));
/// assert_eq!(bb.get_node::<usize>("i", b, node), None);
/// ```
#[derive(Default)]
pub struct Blackboard {
    entries: HashMap<(Scope, Key), Box<dyn Any>>,
}

impl Blackboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get<T: 'static>(&self, key: impl Into<Symbol>, scope: Scope) -> Option<&T> {
        self.entries
            .get(&(scope, Key::User(key.into())))
            .and_then(|val| val.downcast_ref())
    }

    pub fn get_mut<T: 'static>(&mut self, key: impl Into<Symbol>, scope: Scope) -> Option<&mut T> {
        self.entries
            .get_mut(&(scope, Key::User(key.into())))
            .and_then(|val| val.downcast_mut())
    }

    /// Writes `val`, replacing whatever was stored under the same key and scope.
    pub fn set<T: 'static>(&mut self, key: impl Into<Symbol>, val: T, scope: Scope) {
        self.entries
            .insert((scope, Key::User(key.into())), Box::new(val));
    }

    pub fn remove(&mut self, key: impl Into<Symbol>, scope: Scope) -> Option<Box<dyn Any>> {
        self.entries.remove(&(scope, Key::User(key.into())))
    }

    pub fn contains(&self, key: impl Into<Symbol>, scope: Scope) -> bool {
        self.entries.contains_key(&(scope, Key::User(key.into())))
    }

    pub fn get_global<T: 'static>(&self, key: impl Into<Symbol>) -> Option<&T> {
        self.get(key, Scope::Global)
    }

    pub fn set_global<T: 'static>(&mut self, key: impl Into<Symbol>, val: T) {
        self.set(key, val, Scope::Global)
    }

    pub fn get_tree<T: 'static>(&self, key: impl Into<Symbol>, tree: TreeId) -> Option<&T> {
        self.get(key, Scope::Tree(tree))
    }

    pub fn set_tree<T: 'static>(&mut self, key: impl Into<Symbol>, val: T, tree: TreeId) {
        self.set(key, val, Scope::Tree(tree))
    }

    pub fn get_node<T: 'static>(
        &self,
        key: impl Into<Symbol>,
        tree: TreeId,
        node: NodeId,
    ) -> Option<&T> {
        self.get(key, Scope::Node(tree, node))
    }

    pub fn set_node<T: 'static>(
        &mut self,
        key: impl Into<Symbol>,
        val: T,
        tree: TreeId,
        node: NodeId,
    ) {
        self.set(key, val, Scope::Node(tree, node))
    }

    /// Drops every tree- and node-scoped entry of `tree`.
    ///
    /// Ticking never removes anything on its own; call this when a tree
    /// instance is torn down.
    pub fn forget_tree(&mut self, tree: TreeId) {
        let before = self.entries.len();
        self.entries
            .retain(|(scope, _), _| scope.tree() != Some(tree));
        tracing::debug!(%tree, dropped = before - self.entries.len(), "forgot tree instance");
    }

    pub(crate) fn get_engine<T: 'static>(&self, key: Key, scope: Scope) -> Option<&T> {
        self.entries
            .get(&(scope, key))
            .and_then(|val| val.downcast_ref())
    }

    pub(crate) fn set_engine<T: 'static>(&mut self, key: Key, val: T, scope: Scope) {
        self.entries.insert((scope, key), Box::new(val));
    }

    pub(crate) fn take_engine<T: 'static>(&mut self, key: Key, scope: Scope) -> Option<T> {
        self.entries
            .remove(&(scope, key))
            .and_then(|val| val.downcast::<T>().ok())
            .map(|val| *val)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Blackboard {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_set()
            .entries(self.entries.keys())
            .finish()
    }
}
