use crate::{
    blackboard::Key,
    error::{AddChildError, AddChildResult},
    BehaviorNode, BehaviorResult, NodeId, Scope, Tick,
};

/// A node of a tree definition: the behavior, its identity and its children.
///
/// The container is what drives the lifecycle. It switches the [`Tick`] to its
/// own node scope before calling any hook, so node code only ever touches its
/// own memory.
pub struct BehaviorNodeContainer {
    /// Name of the type of the node
    pub(crate) name: String,
    pub(crate) id: NodeId,
    pub(crate) node: Box<dyn BehaviorNode>,
    pub(crate) child_nodes: Vec<BehaviorNodeContainer>,
}

impl BehaviorNodeContainer {
    pub fn new_raw(node: Box<dyn BehaviorNode>) -> Self {
        Self::new_raw_with_name(node, String::new())
    }

    pub fn new_node<N: BehaviorNode + 'static>(node: N) -> Self {
        let name = std::any::type_name::<N>()
            .rsplit("::")
            .next()
            .unwrap_or_default()
            .to_owned();
        Self::new_raw_with_name(Box::new(node), name)
    }

    pub fn new_raw_with_name(node: Box<dyn BehaviorNode>, name: String) -> Self {
        Self {
            name,
            id: NodeId::new(),
            node,
            child_nodes: vec![],
        }
    }

    pub fn with_child(mut self, child: BehaviorNodeContainer) -> Result<Self, AddChildError> {
        self.add_child(child)?;
        Ok(self)
    }

    pub fn add_child(&mut self, child: BehaviorNodeContainer) -> AddChildResult {
        if crate::NumChildren::Finite(self.child_nodes.len()) < self.node.category().max_children()
        {
            self.child_nodes.push(child);
            Ok(())
        } else {
            Err(AddChildError::TooManyNodes)
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn children(&self) -> &[BehaviorNodeContainer] {
        &self.child_nodes
    }

    /// Looks up `id` in this subtree.
    pub fn find(&self, id: NodeId) -> Option<&BehaviorNodeContainer> {
        if self.id == id {
            return Some(self);
        }
        self.child_nodes.iter().find_map(|child| child.find(id))
    }

    fn scoped<R>(&self, tick: &mut Tick, f: impl FnOnce(&mut Tick) -> R) -> R {
        let parent = tick.enter_scope(self.id);
        let res = f(tick);
        tick.leave_scope(parent);
        res
    }

    /// Whether this node is open for the tick's tree instance.
    pub fn is_open(&self, tick: &Tick) -> bool {
        tick.blackboard()
            .get_engine::<bool>(Key::IsOpen, Scope::Node(tick.tree_id(), self.id))
            .copied()
            .unwrap_or(false)
    }

    /// Runs one step of the lifecycle: opens the node if needed, ticks it and
    /// closes it again unless it is still `Running`.
    pub fn execute(&self, tick: &mut Tick) -> BehaviorResult {
        tick.enter_node(self.id);
        self.scoped(tick, |tick| self.node.enter(tick));

        if !self.is_open(tick) {
            self.open(tick);
        }

        let res = self.tick(tick);

        if res.is_terminal() {
            self.close(tick);
        }

        self.scoped(tick, |tick| self.node.exit(tick));
        res
    }

    fn set_open(&self, tick: &mut Tick, open: bool) {
        let scope = Scope::Node(tick.tree_id(), self.id);
        tick.blackboard_mut().set_engine(Key::IsOpen, open, scope);
    }

    pub(crate) fn open(&self, tick: &mut Tick) {
        tracing::trace!(node = %self.name, id = %self.id, tree = %tick.tree_id(), "open");
        self.set_open(tick, true);
        self.scoped(tick, |tick| self.node.open(tick));
    }

    /// Calls the node's own logic without touching its open state.
    pub(crate) fn tick(&self, tick: &mut Tick) -> BehaviorResult {
        self.scoped(tick, |tick| self.node.tick(&self.child_nodes, tick))
    }

    pub(crate) fn close(&self, tick: &mut Tick) {
        tracing::trace!(node = %self.name, id = %self.id, tree = %tick.tree_id(), "close");
        tick.close_node(self.id);
        self.set_open(tick, false);
        self.scoped(tick, |tick| self.node.close(tick));
    }
}
