use ::behavior_tree_tick::{
    boxify, load_yaml, BehaviorNode, BehaviorNodeContainer, BehaviorResult, Blackboard, Lazy,
    Registry, Symbol, Tick, TreeId,
};
use tracing_subscriber::EnvFilter;

static STEPS: Lazy<Symbol> = Lazy::new(|| "steps".into());
static INTRUDER: Lazy<Symbol> = Lazy::new(|| "intruder".into());

/// Walks three steps, one per tick.
struct PatrolNode;

impl BehaviorNode for PatrolNode {
    fn open(&self, tick: &mut Tick) {
        tick.set(*STEPS, 3u32);
    }

    fn tick(&self, _children: &[BehaviorNodeContainer], tick: &mut Tick) -> BehaviorResult {
        let steps = tick.get::<u32>(*STEPS).copied().unwrap_or(0);
        if steps == 0 {
            return BehaviorResult::Success;
        }
        tick.notify(&format!("{} walks ({steps} steps left)", tick.tree_id()));
        tick.set(*STEPS, steps - 1);
        BehaviorResult::Running
    }
}

struct SpotIntruderNode;

impl BehaviorNode for SpotIntruderNode {
    fn tick(&self, _children: &[BehaviorNodeContainer], tick: &mut Tick) -> BehaviorResult {
        if tick.get_global::<bool>(*INTRUDER).copied().unwrap_or(false) {
            BehaviorResult::Success
        } else {
            BehaviorResult::Fail
        }
    }
}

struct ShoutNode;

impl BehaviorNode for ShoutNode {
    fn tick(&self, _children: &[BehaviorNodeContainer], tick: &mut Tick) -> BehaviorResult {
        tick.notify(&format!("{} shouts: Halt!", tick.tree_id()));
        BehaviorResult::Success
    }
}

const TREE: &str = r#"
title: guard
root:
  type: ReactiveFallback
  children:
  - type: Sequence
    children:
    - type: SpotIntruder
    - type: Limiter
      properties:
        maxLoop: 1
      children:
      - type: Shout
  - type: Patrol
"#;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut registry = Registry::default();
    registry.register("Patrol", boxify(|_| Ok(PatrolNode)));
    registry.register("SpotIntruder", boxify(|_| Ok(SpotIntruderNode)));
    registry.register("Shout", boxify(|_| Ok(ShoutNode)));
    let tree = load_yaml(TREE, &registry)?;

    let mut blackboard = Blackboard::new();
    let guards = [TreeId::new(), TreeId::new()];

    for frame in 0..5 {
        if frame == 3 {
            blackboard.set_global(*INTRUDER, true);
        }
        for guard in guards {
            let result = tree.tick_with_callback(guard, &mut blackboard, &mut |msg| {
                if let Some(msg) = msg.downcast_ref::<String>() {
                    println!("[frame {frame}] {msg}");
                }
                None
            });
            println!("[frame {frame}] {guard}: {result:?}");
        }
    }

    Ok(())
}
