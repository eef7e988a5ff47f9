use crate::{error::LoadError, BehaviorNodeContainer, BehaviorTree, NodeSettings, Registry};
use serde::Deserialize;

#[derive(Deserialize)]
struct TreeDef {
    #[serde(default)]
    title: String,
    root: NodeDef,
}

#[derive(Deserialize)]
struct NodeDef {
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    properties: NodeSettings,
    #[serde(default)]
    children: Vec<NodeDef>,
}

fn load_recurse(def: &NodeDef, registry: &Registry) -> Result<BehaviorNodeContainer, LoadError> {
    let node = registry
        .build(&def.ty, &def.properties)
        .ok_or_else(|| LoadError::MissingNode(def.ty.clone()))??;

    let mut container = BehaviorNodeContainer::new_raw_with_name(node, def.ty.clone());
    for child in &def.children {
        container
            .add_child(load_recurse(child, registry)?)
            .map_err(|e| LoadError::AddChild(e, def.ty.clone()))?;
    }
    Ok(container)
}

/// Builds a tree definition from a YAML document.
///
/// ```yaml
/// title: patrol
/// root:
///   type: Sequence
///   children:
///   - type: Limiter
///     properties:
///       max_loop: 3
///     children:
///     - type: Succeeder
/// ```
///
/// Every node is constructed through `registry`, so a bad parameter fails the
/// whole load before anything can be ticked.
pub fn load_yaml(yaml: &str, registry: &Registry) -> Result<BehaviorTree, LoadError> {
    let def: TreeDef = serde_yaml::from_str(yaml)?;
    let root = load_recurse(&def.root, registry)?;
    tracing::debug!(title = %def.title, "loaded tree");
    Ok(BehaviorTree::new(root).with_title(def.title))
}

#[cfg(test)]
mod test;
