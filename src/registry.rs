use crate::{
    error::ConfigError,
    nodes::{
        ErrorNode, FailerNode, FallbackNode, ForceFailureNode, ForceSuccessNode, InverterNode,
        LimiterNode, ReactiveFallbackNode, ReactiveSequenceNode, RepeatNode, RetryNode,
        RunnerNode, SequenceNode, SucceederNode,
    },
    BehaviorNode, NodeSettings,
};
use std::collections::HashMap;

/// Builds a node from its settings, refusing bad configuration up front.
pub type Constructor = Box<dyn Fn(&NodeSettings) -> Result<Box<dyn BehaviorNode>, ConfigError>>;

pub fn boxify<T>(
    cons: impl (Fn(&NodeSettings) -> Result<T, ConfigError>) + 'static,
) -> Constructor
where
    T: BehaviorNode + 'static,
{
    Box::new(
        move |settings: &NodeSettings| -> Result<Box<dyn BehaviorNode>, ConfigError> {
            Ok(Box::new(cons(settings)?))
        },
    )
}

/// Maps node type names to constructors.
///
/// There is no global registry; build one and hand it to whatever loads trees.
pub struct Registry {
    node_types: HashMap<String, Constructor>,
}

impl Default for Registry {
    fn default() -> Self {
        let mut ret = Self::empty();
        ret.register("Succeeder", boxify(|_| Ok(SucceederNode)));
        ret.register("Failer", boxify(|_| Ok(FailerNode)));
        ret.register("Runner", boxify(|_| Ok(RunnerNode)));
        ret.register("Error", boxify(|_| Ok(ErrorNode)));
        ret.register("Sequence", boxify(|_| Ok(SequenceNode)));
        ret.register("ReactiveSequence", boxify(|_| Ok(ReactiveSequenceNode)));
        ret.register("Fallback", boxify(|_| Ok(FallbackNode)));
        ret.register("ReactiveFallback", boxify(|_| Ok(ReactiveFallbackNode)));
        ret.register("Inverter", boxify(|_| Ok(InverterNode)));
        ret.register("ForceSuccess", boxify(|_| Ok(ForceSuccessNode)));
        ret.register("ForceFailure", boxify(|_| Ok(ForceFailureNode)));
        ret.register("Repeat", boxify(RepeatNode::from_settings));
        ret.register("Retry", boxify(RetryNode::from_settings));
        ret.register("Limiter", boxify(LimiterNode::from_settings));
        ret
    }
}

impl Registry {
    /// A registry without even the built-in nodes.
    pub fn empty() -> Self {
        Self {
            node_types: HashMap::new(),
        }
    }

    pub fn register(&mut self, type_name: impl ToString, constructor: Constructor) {
        self.node_types.insert(type_name.to_string(), constructor);
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.node_types.contains_key(type_name)
    }

    /// Returns `None` if `type_name` is unknown.
    pub fn build(
        &self,
        type_name: &str,
        settings: &NodeSettings,
    ) -> Option<Result<Box<dyn BehaviorNode>, ConfigError>> {
        self.node_types
            .get(type_name)
            .map(|constructor| constructor(settings))
    }
}
