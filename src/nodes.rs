use crate::{
    error::ConfigError, BehaviorNode, BehaviorNodeContainer, BehaviorResult, Lazy, NodeCategory,
    NodeSettings, Symbol, Tick,
};
use serde::{de::DeserializeOwned, Deserialize};
use std::num::NonZeroUsize;

static RUNNING_CHILD: Lazy<Symbol> = Lazy::new(|| "running_child".into());
static I: Lazy<Symbol> = Lazy::new(|| "i".into());

fn parse_settings<T: DeserializeOwned>(
    node: &'static str,
    settings: &NodeSettings,
) -> Result<T, ConfigError> {
    serde_yaml::from_value(serde_yaml::Value::Mapping(settings.clone()))
        .map_err(|source| ConfigError::InvalidParameter { node, source })
}

fn non_zero(node: &'static str, n: usize) -> Result<NonZeroUsize, ConfigError> {
    NonZeroUsize::new(n).ok_or(ConfigError::ZeroParameter {
        node,
        parameter: "max_loop",
    })
}

#[derive(Deserialize)]
struct LoopSettings {
    #[serde(alias = "maxLoop")]
    max_loop: Option<usize>,
}

impl LoopSettings {
    fn optional(
        node: &'static str,
        settings: &NodeSettings,
    ) -> Result<Option<NonZeroUsize>, ConfigError> {
        parse_settings::<Self>(node, settings)?
            .max_loop
            .map(|n| non_zero(node, n))
            .transpose()
    }
}

fn first_child<'c>(
    node: &'static str,
    children: &'c [BehaviorNodeContainer],
) -> Option<&'c BehaviorNodeContainer> {
    let child = children.first();
    if child.is_none() {
        tracing::warn!(node, "decorator ticked without a child");
    }
    child
}

pub struct SucceederNode;

impl BehaviorNode for SucceederNode {
    fn tick(&self, _children: &[BehaviorNodeContainer], _tick: &mut Tick) -> BehaviorResult {
        BehaviorResult::Success
    }
}

pub struct FailerNode;

impl BehaviorNode for FailerNode {
    fn tick(&self, _children: &[BehaviorNodeContainer], _tick: &mut Tick) -> BehaviorResult {
        BehaviorResult::Fail
    }
}

pub struct RunnerNode;

impl BehaviorNode for RunnerNode {
    fn tick(&self, _children: &[BehaviorNodeContainer], _tick: &mut Tick) -> BehaviorResult {
        BehaviorResult::Running
    }
}

pub struct ErrorNode;

impl BehaviorNode for ErrorNode {
    fn tick(&self, _children: &[BehaviorNodeContainer], _tick: &mut Tick) -> BehaviorResult {
        BehaviorResult::Error
    }
}

/// Ticks children in order until one does not succeed, resuming from the
/// running child on the next tick.
pub struct SequenceNode;

impl BehaviorNode for SequenceNode {
    fn category(&self) -> NodeCategory {
        NodeCategory::Composite
    }

    fn open(&self, tick: &mut Tick) {
        tick.set(*RUNNING_CHILD, 0usize);
    }

    fn tick(&self, children: &[BehaviorNodeContainer], tick: &mut Tick) -> BehaviorResult {
        let from = tick.get::<usize>(*RUNNING_CHILD).copied().unwrap_or(0);
        for (i, child) in children.iter().enumerate().skip(from) {
            match child.execute(tick) {
                BehaviorResult::Success => (),
                BehaviorResult::Running => {
                    tick.set(*RUNNING_CHILD, i);
                    return BehaviorResult::Running;
                }
                res => return res,
            }
        }
        BehaviorResult::Success
    }
}

/// Like [`SequenceNode`], but starts over from the first child on every tick.
pub struct ReactiveSequenceNode;

impl BehaviorNode for ReactiveSequenceNode {
    fn category(&self) -> NodeCategory {
        NodeCategory::Composite
    }

    fn tick(&self, children: &[BehaviorNodeContainer], tick: &mut Tick) -> BehaviorResult {
        for child in children {
            match child.execute(tick) {
                BehaviorResult::Success => (),
                res => return res,
            }
        }
        BehaviorResult::Success
    }
}

/// Ticks children in order until one does not fail, resuming from the
/// running child on the next tick.
pub struct FallbackNode;

impl BehaviorNode for FallbackNode {
    fn category(&self) -> NodeCategory {
        NodeCategory::Composite
    }

    fn open(&self, tick: &mut Tick) {
        tick.set(*RUNNING_CHILD, 0usize);
    }

    fn tick(&self, children: &[BehaviorNodeContainer], tick: &mut Tick) -> BehaviorResult {
        let from = tick.get::<usize>(*RUNNING_CHILD).copied().unwrap_or(0);
        for (i, child) in children.iter().enumerate().skip(from) {
            match child.execute(tick) {
                BehaviorResult::Fail => (),
                BehaviorResult::Running => {
                    tick.set(*RUNNING_CHILD, i);
                    return BehaviorResult::Running;
                }
                res => return res,
            }
        }
        BehaviorResult::Fail
    }
}

pub struct ReactiveFallbackNode;

impl BehaviorNode for ReactiveFallbackNode {
    fn category(&self) -> NodeCategory {
        NodeCategory::Composite
    }

    fn tick(&self, children: &[BehaviorNodeContainer], tick: &mut Tick) -> BehaviorResult {
        for child in children {
            match child.execute(tick) {
                BehaviorResult::Fail => (),
                res => return res,
            }
        }
        BehaviorResult::Fail
    }
}

pub struct InverterNode;

impl BehaviorNode for InverterNode {
    fn category(&self) -> NodeCategory {
        NodeCategory::Decorator
    }

    fn tick(&self, children: &[BehaviorNodeContainer], tick: &mut Tick) -> BehaviorResult {
        let Some(child) = first_child("Inverter", children) else {
            return BehaviorResult::Error;
        };
        match child.execute(tick) {
            BehaviorResult::Success => BehaviorResult::Fail,
            BehaviorResult::Fail => BehaviorResult::Success,
            res => res,
        }
    }
}

pub struct ForceSuccessNode;

impl BehaviorNode for ForceSuccessNode {
    fn category(&self) -> NodeCategory {
        NodeCategory::Decorator
    }

    fn tick(&self, children: &[BehaviorNodeContainer], tick: &mut Tick) -> BehaviorResult {
        let Some(child) = first_child("ForceSuccess", children) else {
            return BehaviorResult::Error;
        };
        match child.execute(tick) {
            BehaviorResult::Success | BehaviorResult::Fail => BehaviorResult::Success,
            res => res,
        }
    }
}

pub struct ForceFailureNode;

impl BehaviorNode for ForceFailureNode {
    fn category(&self) -> NodeCategory {
        NodeCategory::Decorator
    }

    fn tick(&self, children: &[BehaviorNodeContainer], tick: &mut Tick) -> BehaviorResult {
        let Some(child) = first_child("ForceFailure", children) else {
            return BehaviorResult::Error;
        };
        match child.execute(tick) {
            BehaviorResult::Success | BehaviorResult::Fail => BehaviorResult::Fail,
            res => res,
        }
    }
}

/// Re-runs its child after every success, `Running` in between, and succeeds
/// once the child succeeded `max_loop` times. Without `max_loop` it repeats
/// until the child fails.
pub struct RepeatNode {
    max_loop: Option<NonZeroUsize>,
}

impl RepeatNode {
    pub fn new(max_loop: Option<usize>) -> Result<Self, ConfigError> {
        Ok(Self {
            max_loop: max_loop.map(|n| non_zero("Repeat", n)).transpose()?,
        })
    }

    pub fn from_settings(settings: &NodeSettings) -> Result<Self, ConfigError> {
        Ok(Self {
            max_loop: LoopSettings::optional("Repeat", settings)?,
        })
    }
}

impl BehaviorNode for RepeatNode {
    fn category(&self) -> NodeCategory {
        NodeCategory::Decorator
    }

    fn open(&self, tick: &mut Tick) {
        tick.set(*I, 0usize);
    }

    fn tick(&self, children: &[BehaviorNodeContainer], tick: &mut Tick) -> BehaviorResult {
        let Some(child) = first_child("Repeat", children) else {
            return BehaviorResult::Error;
        };
        match child.execute(tick) {
            BehaviorResult::Success => {
                let i = tick.get::<usize>(*I).copied().unwrap_or(0) + 1;
                tick.set(*I, i);
                match self.max_loop {
                    Some(max_loop) if i >= max_loop.get() => BehaviorResult::Success,
                    _ => BehaviorResult::Running,
                }
            }
            res => res,
        }
    }
}

/// Re-runs its child after every failure, `Running` in between, and fails once
/// the child failed `max_loop` times. Without `max_loop` it retries until the
/// child succeeds.
pub struct RetryNode {
    max_loop: Option<NonZeroUsize>,
}

impl RetryNode {
    pub fn new(max_loop: Option<usize>) -> Result<Self, ConfigError> {
        Ok(Self {
            max_loop: max_loop.map(|n| non_zero("Retry", n)).transpose()?,
        })
    }

    pub fn from_settings(settings: &NodeSettings) -> Result<Self, ConfigError> {
        Ok(Self {
            max_loop: LoopSettings::optional("Retry", settings)?,
        })
    }
}

impl BehaviorNode for RetryNode {
    fn category(&self) -> NodeCategory {
        NodeCategory::Decorator
    }

    fn open(&self, tick: &mut Tick) {
        tick.set(*I, 0usize);
    }

    fn tick(&self, children: &[BehaviorNodeContainer], tick: &mut Tick) -> BehaviorResult {
        let Some(child) = first_child("Retry", children) else {
            return BehaviorResult::Error;
        };
        match child.execute(tick) {
            BehaviorResult::Fail => {
                let i = tick.get::<usize>(*I).copied().unwrap_or(0) + 1;
                tick.set(*I, i);
                match self.max_loop {
                    Some(max_loop) if i >= max_loop.get() => BehaviorResult::Fail,
                    _ => BehaviorResult::Running,
                }
            }
            res => res,
        }
    }
}

/// Caps how many times its child may run to completion within one activation.
///
/// The quota is reset whenever the limiter is opened. A child that stays
/// `Running` across several ticks is charged once, when it finishes. Once the
/// quota is used up the child is not ticked anymore and the limiter fails.
pub struct LimiterNode {
    max_loop: NonZeroUsize,
}

impl LimiterNode {
    pub fn new(max_loop: usize) -> Result<Self, ConfigError> {
        Ok(Self {
            max_loop: non_zero("Limiter", max_loop)?,
        })
    }

    pub fn from_settings(settings: &NodeSettings) -> Result<Self, ConfigError> {
        let max_loop = LoopSettings::optional("Limiter", settings)?.ok_or(
            ConfigError::MissingParameter {
                node: "Limiter",
                parameter: "max_loop",
            },
        )?;
        Ok(Self { max_loop })
    }

    pub fn max_loop(&self) -> usize {
        self.max_loop.get()
    }
}

impl BehaviorNode for LimiterNode {
    fn category(&self) -> NodeCategory {
        NodeCategory::Decorator
    }

    fn open(&self, tick: &mut Tick) {
        tick.set(*I, 0usize);
    }

    fn tick(&self, children: &[BehaviorNodeContainer], tick: &mut Tick) -> BehaviorResult {
        let Some(child) = first_child("Limiter", children) else {
            return BehaviorResult::Error;
        };

        let i = tick.get::<usize>(*I).copied().unwrap_or(0);
        if i < self.max_loop.get() {
            let res = child.execute(tick);
            if matches!(res, BehaviorResult::Success | BehaviorResult::Fail) {
                tick.set(*I, i + 1);
            }
            return res;
        }

        tracing::debug!(
            max_loop = self.max_loop.get(),
            tree = %tick.tree_id(),
            "limiter quota used up"
        );
        BehaviorResult::Fail
    }
}
