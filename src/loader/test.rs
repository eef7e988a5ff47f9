use super::*;
use crate::{
    boxify,
    error::{AddChildError, ConfigErrorKind},
    BehaviorNode, BehaviorResult, Blackboard, Tick, TreeId,
};

struct PrintNode;

impl BehaviorNode for PrintNode {
    fn tick(
        &self,
        _children: &[BehaviorNodeContainer],
        tick: &mut Tick,
    ) -> crate::BehaviorResult {
        tick.notify(&42);
        BehaviorResult::Success
    }
}

#[test]
fn test_load() {
    let source = r#"
title: main
root:
  type: Sequence
  children:
  - type: Fallback
    children:
    - type: Failer
    - type: PrintNode
  - type: Limiter
    properties:
      maxLoop: 2
    children:
    - type: PrintNode
"#;

    let mut registry = Registry::default();
    registry.register("PrintNode", boxify(|_| Ok(PrintNode)));
    let tree = load_yaml(source, &registry).unwrap();
    assert_eq!(tree.title(), "main");
    assert_eq!(tree.root().name(), "Sequence");
    assert_eq!(tree.root().children().len(), 2);

    let mut values = vec![];
    let result = tree.tick_with_callback(
        TreeId::new(),
        &mut Blackboard::new(),
        &mut |val| {
            if let Some(val) = val.downcast_ref::<i32>() {
                values.push(*val);
            }
            None
        },
    );
    assert_eq!(result, BehaviorResult::Success);
    assert_eq!(values, vec![42, 42]);
}

#[test]
fn test_missing_node() {
    let source = r#"
root:
  type: Sequence
  children:
  - type: Nonexistent
"#;
    assert!(matches!(
        load_yaml(source, &Registry::default()),
        Err(LoadError::MissingNode(name)) if name == "Nonexistent"
    ));
}

#[test]
fn test_limiter_without_max_loop() {
    let source = r#"
root:
  type: Limiter
  children:
  - type: Succeeder
"#;
    match load_yaml(source, &Registry::default()) {
        Err(LoadError::Config(e)) => assert_eq!(e.kind(), ConfigErrorKind::MissingParameter),
        _ => panic!("Limiter without max_loop must not load"),
    }
}

#[test]
fn test_too_many_children() {
    let source = r#"
root:
  type: Inverter
  children:
  - type: Succeeder
  - type: Failer
"#;
    assert!(matches!(
        load_yaml(source, &Registry::default()),
        Err(LoadError::AddChild(AddChildError::TooManyNodes, name)) if name == "Inverter"
    ));
}

#[test]
fn test_bad_yaml() {
    assert!(matches!(
        load_yaml("root: [", &Registry::default()),
        Err(LoadError::Yaml(_))
    ));
    assert!(matches!(
        load_yaml("title: no root", &Registry::default()),
        Err(LoadError::Yaml(_))
    ));
}

#[test]
fn test_empty_registry() {
    let source = "root:\n  type: Succeeder\n";
    let registry = Registry::empty();
    assert!(!registry.contains("Succeeder"));
    assert!(load_yaml(source, &registry).is_err());
}
