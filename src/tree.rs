use crate::{
    blackboard::Key, BehaviorCallback, BehaviorNodeContainer, BehaviorResult, Blackboard, NodeId,
    Scope, Tick, TreeId,
};

/// A tree definition.
///
/// It holds no run state, so one `BehaviorTree` can be ticked for any number
/// of tree instances as long as each uses its own [`TreeId`].
pub struct BehaviorTree {
    title: String,
    root: BehaviorNodeContainer,
}

impl BehaviorTree {
    pub fn new(root: BehaviorNodeContainer) -> Self {
        Self {
            title: String::new(),
            root,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn root(&self) -> &BehaviorNodeContainer {
        &self.root
    }

    pub fn find(&self, id: NodeId) -> Option<&BehaviorNodeContainer> {
        self.root.find(id)
    }

    /// Evaluates the tree once on behalf of `instance`.
    pub fn tick(&self, instance: TreeId, blackboard: &mut Blackboard) -> BehaviorResult {
        self.run(Tick::new(instance, blackboard))
    }

    /// Like [`BehaviorTree::tick`], with a callback reachable by the nodes
    /// through [`Tick::notify`].
    pub fn tick_with_callback(
        &self,
        instance: TreeId,
        blackboard: &mut Blackboard,
        callback: BehaviorCallback,
    ) -> BehaviorResult {
        self.run(Tick::new(instance, blackboard).with_callback(callback))
    }

    /// Nodes left open by the last pass of `instance`, outermost first.
    pub fn open_nodes<'b>(&self, instance: TreeId, blackboard: &'b Blackboard) -> &'b [NodeId] {
        blackboard
            .get_engine::<Vec<NodeId>>(Key::OpenNodes, Scope::Tree(instance))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of node executions during the last pass of `instance`.
    pub fn node_count(&self, instance: TreeId, blackboard: &Blackboard) -> usize {
        blackboard
            .get_engine::<usize>(Key::NodeCount, Scope::Tree(instance))
            .copied()
            .unwrap_or(0)
    }

    fn run(&self, mut tick: Tick) -> BehaviorResult {
        let instance = tick.tree_id();
        let res = self.root.execute(&mut tick);

        let current = tick.take_open_nodes();
        let last = tick
            .blackboard_mut()
            .take_engine::<Vec<NodeId>>(Key::OpenNodes, Scope::Tree(instance))
            .unwrap_or_default();

        // Branches that were running on the previous pass but were not revisited
        // now. Deepest nodes come last, so close them first.
        for id in last.iter().rev().filter(|id| !current.contains(*id)) {
            let Some(node) = self.root.find(*id) else {
                continue;
            };
            if node.is_open(&tick) {
                tracing::debug!(node = %node.name(), %id, tree = %instance, "closing stale node");
                node.close(&mut tick);
            }
        }

        let count = tick.node_count();
        let blackboard = tick.blackboard_mut();
        blackboard.set_engine(Key::OpenNodes, current, Scope::Tree(instance));
        blackboard.set_engine(Key::NodeCount, count, Scope::Tree(instance));
        res
    }
}
