use behavior_tree_tick::{
    error::ConfigErrorKind, BehaviorNode, BehaviorNodeContainer, BehaviorResult, BehaviorTree,
    Blackboard, LimiterNode, NodeSettings, ReactiveFallbackNode, RepeatNode, RunnerNode,
    SequenceNode, SucceederNode, Tick, TreeId,
};
use std::{cell::Cell, rc::Rc};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Clone, Default)]
struct Counts {
    opens: Rc<Cell<usize>>,
    ticks: Rc<Cell<usize>>,
    closes: Rc<Cell<usize>>,
}

fn bump(cell: &Cell<usize>) {
    cell.set(cell.get() + 1);
}

/// Runs for `running_for` ticks, then succeeds, recording every hook call.
struct Tracked {
    counts: Counts,
    running_for: usize,
}

impl BehaviorNode for Tracked {
    fn open(&self, tick: &mut Tick) {
        bump(&self.counts.opens);
        tick.set("left", self.running_for);
    }

    fn tick(&self, _children: &[BehaviorNodeContainer], tick: &mut Tick) -> BehaviorResult {
        bump(&self.counts.ticks);
        match tick.get::<usize>("left").copied() {
            Some(0) | None => BehaviorResult::Success,
            Some(left) => {
                tick.set("left", left - 1);
                BehaviorResult::Running
            }
        }
    }

    fn close(&self, _tick: &mut Tick) {
        bump(&self.counts.closes);
    }
}

fn tracked(running_for: usize) -> (BehaviorNodeContainer, Counts) {
    let counts = Counts::default();
    let node = BehaviorNodeContainer::new_node(Tracked {
        counts: counts.clone(),
        running_for,
    });
    (node, counts)
}

/// Succeeds while the global `alarm` flag is set.
struct Alarm;

impl BehaviorNode for Alarm {
    fn tick(&self, _children: &[BehaviorNodeContainer], tick: &mut Tick) -> BehaviorResult {
        if tick.get_global::<bool>("alarm").copied().unwrap_or(false) {
            BehaviorResult::Success
        } else {
            BehaviorResult::Fail
        }
    }
}

#[test]
fn test_stale_running_branch_is_closed() {
    init_tracing();
    let (patrol, counts) = tracked(10);
    let patrol_id = patrol.id();
    let mut root = BehaviorNodeContainer::new_node(ReactiveFallbackNode);
    root.add_child(BehaviorNodeContainer::new_node(Alarm)).unwrap();
    root.add_child(patrol).unwrap();
    let tree = BehaviorTree::new(root);

    let mut bb = Blackboard::new();
    let agent = TreeId::new();

    assert_eq!(tree.tick(agent, &mut bb), BehaviorResult::Running);
    assert_eq!(tree.open_nodes(agent, &bb), &[tree.root().id(), patrol_id]);

    bb.set_global("alarm", true);
    assert_eq!(tree.tick(agent, &mut bb), BehaviorResult::Success);

    assert_eq!(counts.opens.get(), 1);
    assert_eq!(counts.closes.get(), 1);
    assert!(tree.open_nodes(agent, &bb).is_empty());

    // Coming back to the branch opens it afresh
    bb.set_global("alarm", false);
    assert_eq!(tree.tick(agent, &mut bb), BehaviorResult::Running);
    assert_eq!(counts.opens.get(), 2);
}

/// Keeps a name of its own in node memory that the engine also cares about.
struct Door {
    counts: Counts,
}

impl BehaviorNode for Door {
    fn open(&self, tick: &mut Tick) {
        bump(&self.counts.opens);
        tick.set("swings", 2usize);
    }

    fn tick(&self, _children: &[BehaviorNodeContainer], tick: &mut Tick) -> BehaviorResult {
        bump(&self.counts.ticks);
        tick.set("is_open", String::from("ajar"));
        match tick.get::<usize>("swings").copied() {
            Some(0) | None => BehaviorResult::Success,
            Some(left) => {
                tick.set("swings", left - 1);
                BehaviorResult::Running
            }
        }
    }

    fn close(&self, _tick: &mut Tick) {
        bump(&self.counts.closes);
    }
}

#[test]
fn test_node_names_do_not_shadow_open_state() {
    init_tracing();
    let counts = Counts::default();
    let door = BehaviorNodeContainer::new_node(Door {
        counts: counts.clone(),
    });
    let door_id = door.id();
    let tree = BehaviorTree::new(door);

    let mut bb = Blackboard::new();
    let agent = TreeId::new();
    let results: Vec<_> = (0..3).map(|_| tree.tick(agent, &mut bb)).collect();

    assert_eq!(
        results,
        vec![
            BehaviorResult::Running,
            BehaviorResult::Running,
            BehaviorResult::Success
        ]
    );
    assert_eq!(counts.opens.get(), 1);
    assert_eq!(counts.closes.get(), 1);
    assert_eq!(
        bb.get_node::<String>("is_open", agent, door_id)
            .map(String::as_str),
        Some("ajar")
    );
}

/// Like [`Alarm`], but also scribbles over tree memory.
struct NoisyAlarm;

impl BehaviorNode for NoisyAlarm {
    fn tick(&self, children: &[BehaviorNodeContainer], tick: &mut Tick) -> BehaviorResult {
        tick.set_tree("open_nodes", 7u8);
        tick.set_tree("node_count", "many");
        Alarm.tick(children, tick)
    }
}

#[test]
fn test_tree_names_do_not_disable_pruning() {
    init_tracing();
    let (patrol, counts) = tracked(10);
    let patrol_id = patrol.id();
    let mut root = BehaviorNodeContainer::new_node(ReactiveFallbackNode);
    root.add_child(BehaviorNodeContainer::new_node(NoisyAlarm))
        .unwrap();
    root.add_child(patrol).unwrap();
    let tree = BehaviorTree::new(root);

    let mut bb = Blackboard::new();
    let agent = TreeId::new();
    assert_eq!(tree.tick(agent, &mut bb), BehaviorResult::Running);
    assert_eq!(tree.open_nodes(agent, &bb), &[tree.root().id(), patrol_id]);
    assert_eq!(tree.node_count(agent, &bb), 3);

    bb.set_global("alarm", true);
    assert_eq!(tree.tick(agent, &mut bb), BehaviorResult::Success);

    assert_eq!(counts.closes.get(), 1);
    assert!(tree.open_nodes(agent, &bb).is_empty());
    let patrol = tree.find(patrol_id).unwrap();
    assert!(!patrol.is_open(&Tick::new(agent, &mut bb)));
    assert_eq!(bb.get_tree::<u8>("open_nodes", agent), Some(&7));
}

#[test]
fn test_finished_node_is_not_closed_twice() {
    init_tracing();
    let (first, first_counts) = tracked(1);
    let mut root = BehaviorNodeContainer::new_node(SequenceNode);
    root.add_child(first).unwrap();
    root.add_child(BehaviorNodeContainer::new_node(RunnerNode))
        .unwrap();
    let tree = BehaviorTree::new(root);

    let mut bb = Blackboard::new();
    let agent = TreeId::new();
    assert_eq!(tree.tick(agent, &mut bb), BehaviorResult::Running);
    assert_eq!(tree.tick(agent, &mut bb), BehaviorResult::Running);

    assert_eq!(first_counts.opens.get(), 1);
    assert_eq!(first_counts.ticks.get(), 2);
    assert_eq!(first_counts.closes.get(), 1);
    assert_eq!(tree.node_count(agent, &bb), 3);
}

#[test]
fn test_instances_share_definition_not_state() -> anyhow::Result<()> {
    init_tracing();
    let (child, counts) = tracked(1);
    let limiter = BehaviorNodeContainer::new_node(LimiterNode::new(1)?).with_child(child)?;
    let limiter_id = limiter.id();
    let tree = BehaviorTree::new(limiter);

    let mut bb = Blackboard::new();
    let (a, b) = (TreeId::new(), TreeId::new());

    assert_eq!(tree.tick(a, &mut bb), BehaviorResult::Running);
    assert_eq!(tree.tick(b, &mut bb), BehaviorResult::Running);
    assert_eq!(tree.tick(a, &mut bb), BehaviorResult::Success);

    assert!(tree.open_nodes(a, &bb).is_empty());
    assert_eq!(tree.open_nodes(b, &bb).len(), 2);
    assert_eq!(bb.get_node::<usize>("i", a, limiter_id), Some(&1));
    assert_eq!(bb.get_node::<usize>("i", b, limiter_id), Some(&0));
    assert_eq!(counts.opens.get(), 2);

    assert_eq!(tree.tick(b, &mut bb), BehaviorResult::Success);
    assert_eq!(bb.get_node::<usize>("i", b, limiter_id), Some(&1));
    Ok(())
}

#[test]
fn test_limiter_reopens_every_activation() -> anyhow::Result<()> {
    init_tracing();
    let (child, counts) = tracked(0);
    let limiter = BehaviorNodeContainer::new_node(LimiterNode::new(1)?).with_child(child)?;
    let repeat = BehaviorNodeContainer::new_node(RepeatNode::new(Some(3))?).with_child(limiter)?;
    let tree = BehaviorTree::new(repeat);

    let mut bb = Blackboard::new();
    let agent = TreeId::new();
    let mut results = vec![];
    loop {
        let res = tree.tick(agent, &mut bb);
        results.push(res);
        if res.is_terminal() {
            break;
        }
    }

    assert_eq!(
        results,
        vec![
            BehaviorResult::Running,
            BehaviorResult::Running,
            BehaviorResult::Success
        ]
    );
    assert_eq!(counts.ticks.get(), 3);
    Ok(())
}

#[test]
fn test_limiter_configuration() {
    let err = LimiterNode::from_settings(&NodeSettings::new())
        .err()
        .expect("missing max_loop must be rejected");
    assert_eq!(err.kind(), ConfigErrorKind::MissingParameter);

    assert!(LimiterNode::new(0).is_err());
    assert_eq!(LimiterNode::new(5).map(|l| l.max_loop()).ok(), Some(5));
}

#[test]
fn test_limiter_without_child_through_tree() -> anyhow::Result<()> {
    init_tracing();
    let limiter = BehaviorNodeContainer::new_node(LimiterNode::new(1)?);
    let limiter_id = limiter.id();
    let tree = BehaviorTree::new(limiter);

    let mut bb = Blackboard::new();
    let agent = TreeId::new();
    for _ in 0..3 {
        assert_eq!(tree.tick(agent, &mut bb), BehaviorResult::Error);
    }
    assert_eq!(bb.get_node::<usize>("i", agent, limiter_id), Some(&0));
    Ok(())
}

#[test]
fn test_forget_tree() {
    let tree = BehaviorTree::new(BehaviorNodeContainer::new_node(RunnerNode));
    let mut bb = Blackboard::new();
    let (a, b) = (TreeId::new(), TreeId::new());
    tree.tick(a, &mut bb);
    tree.tick(b, &mut bb);
    bb.set_global("shared", 1u8);

    bb.forget_tree(a);

    assert!(tree.open_nodes(a, &bb).is_empty());
    assert_eq!(tree.open_nodes(b, &bb).len(), 1);
    assert!(!tree.root().is_open(&Tick::new(a, &mut bb)));
    assert_eq!(bb.get_global::<u8>("shared"), Some(&1));
}

#[test]
fn test_single_leaf_tree() {
    let tree = BehaviorTree::new(BehaviorNodeContainer::new_node(SucceederNode)).with_title("leaf");
    let mut bb = Blackboard::new();
    assert_eq!(tree.tick(TreeId::new(), &mut bb), BehaviorResult::Success);
    assert_eq!(tree.title(), "leaf");
}
