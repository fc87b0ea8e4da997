//! Reference-aware deletion of the clothing scaffold.
//!
//! Written against [`Topology`] so the planner's simulation on a snapshot and the
//! executor's deletion on the live scene remove exactly the same nodes.

use tracing::{debug, instrument};

use crate::domain::{DomainError, DomainResult, NodeId, Topology};

/// Nodes of `referenced` that are still inside `root`. Stale handles are skipped.
pub fn remaining_within<T: Topology>(
    topo: &T,
    root: NodeId,
    referenced: &[NodeId],
) -> DomainResult<Vec<NodeId>> {
    let mut remaining = Vec::new();
    for &node in referenced {
        if topo.contains(node) && topo.is_within(node, root)? {
            remaining.push(node);
        }
    }
    Ok(remaining)
}

/// `root` may go only if no referenced node is still inside it.
pub fn safe_to_delete<T: Topology>(
    topo: &T,
    root: NodeId,
    referenced: &[NodeId],
) -> DomainResult<bool> {
    Ok(remaining_within(topo, root, referenced)?.is_empty())
}

/// Walk up from `start`, removing ancestors that have no children and carry no
/// data. Stops at `boundary`, at any ancestor of `boundary`, or at the first node
/// that fails a condition. Returns the removed nodes, lowest first.
#[instrument(level = "debug", skip(topo))]
pub fn prune_upward<T: Topology>(
    topo: &mut T,
    start: Option<NodeId>,
    boundary: NodeId,
) -> DomainResult<Vec<NodeId>> {
    let mut removed = Vec::new();
    let mut current = start;
    while let Some(id) = current {
        if id == boundary || topo.is_within(boundary, id)? {
            break;
        }
        if !topo.children_of(id)?.is_empty() || topo.carries_data(id)? {
            break;
        }
        current = topo.parent_of(id)?;
        topo.remove(id)?;
        debug!("pruned empty ancestor {}", id);
        removed.push(id);
    }
    Ok(removed)
}

/// Remove `node` and then prune its now-empty ancestors up to `boundary`.
/// Returns every removed node, `node` first.
pub fn delete_with_ancestors<T: Topology>(
    topo: &mut T,
    node: NodeId,
    boundary: NodeId,
) -> DomainResult<Vec<NodeId>> {
    if topo.is_within(boundary, node)? {
        return Err(DomainError::ProtectedNode(node));
    }
    let parent = topo.parent_of(node)?;
    topo.remove(node)?;

    let mut removed = vec![node];
    removed.extend(prune_upward(topo, parent, boundary)?);
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Scene, Skin, TopologySnapshot};

    struct Fixture {
        scene: Scene,
        avatar: NodeId,
        group: NodeId,
        wrapper: NodeId,
        clothing: NodeId,
    }

    /// `Group -> Wrapper -> Clothing -> Bone`, avatar as a separate root.
    fn fixture() -> Fixture {
        let mut scene = Scene::new();
        let avatar = scene.add_root("Avatar");
        let group = scene.add_root("Group");
        let wrapper = scene.add_child(group, "Wrapper").unwrap();
        let clothing = scene.add_child(wrapper, "Clothing").unwrap();
        scene.add_child(clothing, "Bone").unwrap();
        Fixture {
            scene,
            avatar,
            group,
            wrapper,
            clothing,
        }
    }

    #[test]
    fn given_empty_ancestor_chain_when_deleting_then_prunes_to_top() {
        let Fixture {
            mut scene,
            avatar,
            group,
            wrapper,
            clothing,
        } = fixture();

        let removed = delete_with_ancestors(&mut scene, clothing, avatar).unwrap();

        assert_eq!(removed, vec![clothing, wrapper, group]);
        assert_eq!(scene.roots(), &[avatar]);
    }

    #[test]
    fn given_ancestor_with_data_when_deleting_then_stops_below_it() {
        let Fixture {
            mut scene,
            avatar,
            group,
            wrapper,
            clothing,
        } = fixture();
        scene.add_component(group, "Animator").unwrap();

        let removed = delete_with_ancestors(&mut scene, clothing, avatar).unwrap();

        assert_eq!(removed, vec![clothing, wrapper]);
        assert!(scene.contains(group));
    }

    #[test]
    fn given_ancestor_with_other_children_when_deleting_then_stops_there() {
        let Fixture {
            mut scene,
            avatar,
            wrapper,
            clothing,
            ..
        } = fixture();
        scene.add_child(wrapper, "Sibling").unwrap();

        let removed = delete_with_ancestors(&mut scene, clothing, avatar).unwrap();

        assert_eq!(removed, vec![clothing]);
        assert!(scene.contains(wrapper));
    }

    #[test]
    fn given_clothing_nested_in_avatar_when_deleting_then_never_removes_boundary() {
        let mut scene = Scene::new();
        let avatar = scene.add_root("Avatar");
        let clothing = scene.add_child(avatar, "Clothing").unwrap();

        let removed = delete_with_ancestors(&mut scene, clothing, avatar).unwrap();

        assert_eq!(removed, vec![clothing]);
        assert!(scene.contains(avatar));
        assert!(matches!(
            delete_with_ancestors(&mut scene, avatar, avatar),
            Err(DomainError::ProtectedNode(_))
        ));
    }

    #[test]
    fn given_snapshot_and_scene_when_deleting_then_remove_same_nodes() {
        let Fixture {
            scene,
            avatar,
            clothing,
            ..
        } = fixture();
        let mut live = scene.clone();
        let mut snapshot = TopologySnapshot::capture(&scene);

        let simulated = delete_with_ancestors(&mut snapshot, clothing, avatar).unwrap();
        let realized = delete_with_ancestors(&mut live, clothing, avatar).unwrap();

        assert_eq!(simulated, realized);
    }

    #[test]
    fn given_referenced_bone_inside_root_when_checking_then_unsafe() {
        let mut scene = Scene::new();
        let clothing = scene.add_root("Clothing");
        let bone = scene.add_child(clothing, "Bone").unwrap();
        let mesh = scene.add_child(clothing, "Mesh").unwrap();
        scene.attach_skin(mesh, Skin::new(Some(bone), vec![])).unwrap();
        let outside = scene.add_root("Outside");

        assert!(!safe_to_delete(&scene, clothing, &[bone]).unwrap());
        assert!(safe_to_delete(&scene, clothing, &[outside]).unwrap());
        assert!(safe_to_delete(&scene, clothing, &[]).unwrap());
    }
}
