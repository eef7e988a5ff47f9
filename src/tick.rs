use crate::{BehaviorCallback, Blackboard, NodeId, Scope, Symbol, TreeId};
use std::any::Any;

/// Context of one evaluation pass over a tree instance.
///
/// A `Tick` borrows the blackboard for the length of the pass and is dropped
/// afterwards. While a node runs, the tick knows which node it is, so node code
/// can reach its own memory with [`Tick::get`] and [`Tick::set`] without
/// naming its id.
pub struct Tick<'a> {
    blackboard: &'a mut Blackboard,
    tree: TreeId,
    node: Option<NodeId>,
    open_nodes: Vec<NodeId>,
    node_count: usize,
    callback: Option<BehaviorCallback<'a>>,
}

impl<'a> Tick<'a> {
    pub fn new(tree: TreeId, blackboard: &'a mut Blackboard) -> Self {
        Self {
            blackboard,
            tree,
            node: None,
            open_nodes: vec![],
            node_count: 0,
            callback: None,
        }
    }

    /// Attaches a callback that leaves can use to talk to the host.
    pub fn with_callback(mut self, callback: BehaviorCallback<'a>) -> Self {
        self.callback = Some(callback);
        self
    }

    pub fn tree_id(&self) -> TreeId {
        self.tree
    }

    /// The node currently executing, or `None` outside any node.
    pub fn node_id(&self) -> Option<NodeId> {
        self.node
    }

    pub fn blackboard(&self) -> &Blackboard {
        &*self.blackboard
    }

    pub fn blackboard_mut(&mut self) -> &mut Blackboard {
        &mut *self.blackboard
    }

    fn node_scope(&self) -> Option<Scope> {
        self.node.map(|node| Scope::Node(self.tree, node))
    }

    /// Reads from the memory of the current node in the current tree instance.
    ///
    /// Outside any node there is no such memory and this returns `None`.
    pub fn get<T: 'static>(&self, key: impl Into<Symbol>) -> Option<&T> {
        self.blackboard.get(key, self.node_scope()?)
    }

    /// Writes to the memory of the current node in the current tree instance.
    ///
    /// Outside any node the write is dropped; use [`Tick::set_tree`] for
    /// tree-wide values.
    pub fn set<T: 'static>(&mut self, key: impl Into<Symbol>, val: T) {
        let key = key.into();
        match self.node_scope() {
            Some(scope) => self.blackboard.set(key, val, scope),
            None => tracing::warn!(%key, tree = %self.tree, "node memory written outside a node"),
        }
    }

    pub fn get_tree<T: 'static>(&self, key: impl Into<Symbol>) -> Option<&T> {
        self.blackboard.get_tree(key, self.tree)
    }

    pub fn set_tree<T: 'static>(&mut self, key: impl Into<Symbol>, val: T) {
        self.blackboard.set_tree(key, val, self.tree)
    }

    pub fn get_global<T: 'static>(&self, key: impl Into<Symbol>) -> Option<&T> {
        self.blackboard.get_global(key)
    }

    pub fn set_global<T: 'static>(&mut self, key: impl Into<Symbol>, val: T) {
        self.blackboard.set_global(key, val)
    }

    /// Sends `msg` to the host callback, if one is attached.
    pub fn notify(&mut self, msg: &dyn Any) -> Option<Box<dyn Any>> {
        self.callback.as_mut().and_then(|callback| (*callback)(msg))
    }

    /// Nodes entered during this pass that have not been closed yet, outermost first.
    pub fn open_nodes(&self) -> &[NodeId] {
        &self.open_nodes
    }

    /// Number of node executions during this pass.
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Makes `node` the current node and returns the one it replaces.
    pub(crate) fn enter_scope(&mut self, node: NodeId) -> Option<NodeId> {
        self.node.replace(node)
    }

    pub(crate) fn leave_scope(&mut self, previous: Option<NodeId>) {
        self.node = previous;
    }

    pub(crate) fn enter_node(&mut self, node: NodeId) {
        self.node_count += 1;
        self.open_nodes.push(node);
    }

    pub(crate) fn close_node(&mut self, node: NodeId) {
        if let Some(pos) = self.open_nodes.iter().rposition(|open| *open == node) {
            self.open_nodes.remove(pos);
        }
    }

    pub(crate) fn take_open_nodes(&mut self) -> Vec<NodeId> {
        std::mem::take(&mut self.open_nodes)
    }
}
