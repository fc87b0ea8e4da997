//! Arena-backed scene graph.
//!
//! Nodes are stored in a generational arena and addressed by [`NodeId`]. Removing
//! a node invalidates its handle: every accessor checks the handle and reports
//! [`DomainError::NodeNotFound`] instead of handing out a dangling reference.

use std::fmt;

use generational_arena::{Arena, Index};
use tracing::{instrument, trace};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::pose::Pose;
use crate::domain::topology::Topology;

/// Stable handle to a node in a [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(Index);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (idx, generation) = self.0.into_raw_parts();
        write!(f, "#{}v{}", idx, generation)
    }
}

/// A mesh bound to bones. Owned by the node it is attached to; the bone
/// handles are plain back-references and may go stale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Skin {
    pub root_bone: Option<NodeId>,
    /// Bone slots in binding order, `None` for unbound slots
    pub bones: Vec<Option<NodeId>>,
}

impl Skin {
    pub fn new(root_bone: Option<NodeId>, bones: Vec<Option<NodeId>>) -> Self {
        Self { root_bone, bones }
    }

    /// Every bound reference, root bone first, in slot order. May repeat.
    pub fn references(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.root_bone
            .iter()
            .copied()
            .chain(self.bones.iter().flatten().copied())
    }
}

/// Node stored in the scene arena.
#[derive(Debug, Clone)]
pub struct SceneNode {
    name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    local: Pose,
    skin: Option<Skin>,
    components: Vec<String>,
}

impl SceneNode {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn local_pose(&self) -> &Pose {
        &self.local
    }

    pub fn skin(&self) -> Option<&Skin> {
        self.skin.as_ref()
    }

    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// True if the node holds anything besides its name, pose and links.
    pub fn carries_data(&self) -> bool {
        self.skin.is_some() || !self.components.is_empty()
    }
}

/// A forest of named nodes. The avatar and clothing hierarchies are usually two
/// roots of the same scene.
#[derive(Debug, Clone)]
pub struct Scene {
    arena: Arena<SceneNode>,
    roots: Vec<NodeId>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            roots: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn add_root(&mut self, name: impl Into<String>) -> NodeId {
        let id = NodeId(self.arena.insert(SceneNode {
            name: name.into(),
            parent: None,
            children: Vec::new(),
            local: Pose::IDENTITY,
            skin: None,
            components: Vec::new(),
        }));
        self.roots.push(id);
        id
    }

    pub fn add_child(&mut self, parent: NodeId, name: impl Into<String>) -> DomainResult<NodeId> {
        self.insert_node(name, Some(parent), Pose::IDENTITY)
    }

    #[instrument(level = "trace", skip(self, name))]
    pub fn insert_node(
        &mut self,
        name: impl Into<String>,
        parent: Option<NodeId>,
        local: Pose,
    ) -> DomainResult<NodeId> {
        let Some(parent_id) = parent else {
            let id = self.add_root(name);
            self.node_mut(id)?.local = local;
            return Ok(id);
        };
        if !self.contains(parent_id) {
            return Err(DomainError::NodeNotFound(parent_id));
        }

        let id = NodeId(self.arena.insert(SceneNode {
            name: name.into(),
            parent: Some(parent_id),
            children: Vec::new(),
            local,
            skin: None,
            components: Vec::new(),
        }));
        self.node_mut(parent_id)?.children.push(id);
        Ok(id)
    }

    pub fn node(&self, id: NodeId) -> DomainResult<&SceneNode> {
        self.arena.get(id.0).ok_or(DomainError::NodeNotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> DomainResult<&mut SceneNode> {
        self.arena.get_mut(id.0).ok_or(DomainError::NodeNotFound(id))
    }

    pub fn local_pose(&self, id: NodeId) -> DomainResult<Pose> {
        Ok(self.node(id)?.local)
    }

    pub fn set_local_pose(&mut self, id: NodeId, pose: Pose) -> DomainResult<()> {
        self.node_mut(id)?.local = pose;
        Ok(())
    }

    /// Compose local poses from the root down to `id`.
    pub fn world_pose(&self, id: NodeId) -> DomainResult<Pose> {
        let mut chain = vec![self.node(id)?.local];
        let mut current = self.node(id)?.parent;
        while let Some(ancestor) = current {
            let node = self.node(ancestor)?;
            chain.push(node.local);
            current = node.parent;
        }
        Ok(chain
            .iter()
            .rev()
            .fold(Pose::IDENTITY, |world, local| world.then(local)))
    }

    pub fn attach_skin(&mut self, id: NodeId, skin: Skin) -> DomainResult<()> {
        self.node_mut(id)?.skin = Some(skin);
        Ok(())
    }

    pub fn skin(&self, id: NodeId) -> DomainResult<Option<&Skin>> {
        Ok(self.node(id)?.skin.as_ref())
    }

    /// Tag a node with an opaque component, which makes it ineligible for pruning.
    pub fn add_component(&mut self, id: NodeId, component: impl Into<String>) -> DomainResult<()> {
        self.node_mut(id)?.components.push(component.into());
        Ok(())
    }

    /// Depth-first pre-order traversal starting at (and including) `root`.
    pub fn descendants(&self, root: NodeId) -> Descendants<'_> {
        Descendants::new(self, root)
    }

    /// Skin-carrying nodes of a hierarchy in traversal order.
    pub fn skins_within(&self, root: NodeId) -> Vec<NodeId> {
        self.descendants(root)
            .filter(|&id| matches!(self.node(id), Ok(node) if node.skin.is_some()))
            .collect()
    }

    /// Skin-carrying nodes of every hierarchy in the scene.
    pub fn all_skins(&self) -> Vec<NodeId> {
        self.roots
            .iter()
            .flat_map(|&root| self.skins_within(root))
            .collect()
    }

    fn detach(&mut self, id: NodeId) -> DomainResult<()> {
        match self.node(id)?.parent {
            Some(parent) => self.node_mut(parent)?.children.retain(|&c| c != id),
            None => self.roots.retain(|&r| r != id),
        }
        self.node_mut(id)?.parent = None;
        Ok(())
    }
}

impl Topology for Scene {
    fn contains(&self, id: NodeId) -> bool {
        self.arena.contains(id.0)
    }

    fn name_of(&self, id: NodeId) -> DomainResult<&str> {
        Ok(&self.node(id)?.name)
    }

    fn parent_of(&self, id: NodeId) -> DomainResult<Option<NodeId>> {
        Ok(self.node(id)?.parent)
    }

    fn children_of(&self, id: NodeId) -> DomainResult<&[NodeId]> {
        Ok(&self.node(id)?.children)
    }

    fn carries_data(&self, id: NodeId) -> DomainResult<bool> {
        Ok(self.node(id)?.carries_data())
    }

    fn rename(&mut self, id: NodeId, name: String) -> DomainResult<()> {
        self.node_mut(id)?.name = name;
        Ok(())
    }

    /// Move `node` under `parent`, adjusting its local pose so the world pose
    /// stays where it was.
    #[instrument(level = "trace", skip(self))]
    fn reparent(&mut self, node: NodeId, parent: NodeId) -> DomainResult<()> {
        if !self.contains(parent) {
            return Err(DomainError::NodeNotFound(parent));
        }
        if self.is_within(parent, node)? {
            return Err(DomainError::CycleDetected { node, parent });
        }

        let world = self.world_pose(node)?;
        let parent_world = self.world_pose(parent)?;

        self.detach(node)?;
        self.node_mut(parent)?.children.push(node);
        let moved = self.node_mut(node)?;
        moved.parent = Some(parent);
        moved.local = world.relative_to(&parent_world);
        trace!("reparented {} under {}", node, parent);
        Ok(())
    }

    /// Remove `id` together with whatever is still below it.
    #[instrument(level = "trace", skip(self))]
    fn remove(&mut self, id: NodeId) -> DomainResult<()> {
        let subtree: Vec<NodeId> = self.descendants(id).collect();
        if subtree.is_empty() {
            return Err(DomainError::NodeNotFound(id));
        }
        self.detach(id)?;
        for member in subtree {
            self.arena.remove(member.0);
        }
        Ok(())
    }
}

/// Pre-order iterator over a subtree, children in stored order.
pub struct Descendants<'a> {
    scene: &'a Scene,
    stack: Vec<NodeId>,
    skipped: Option<NodeId>,
}

impl<'a> Descendants<'a> {
    fn new(scene: &'a Scene, root: NodeId) -> Self {
        let mut stack = Vec::new();
        if scene.contains(root) {
            stack.push(root);
        }
        Self {
            scene,
            stack,
            skipped: None,
        }
    }

    /// Leave out `subtree` (and everything below it) from the traversal.
    pub fn skipping(mut self, subtree: Option<NodeId>) -> Self {
        self.skipped = subtree;
        self
    }
}

impl<'a> Iterator for Descendants<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current) = self.stack.pop() {
            if Some(current) == self.skipped {
                continue;
            }
            if let Ok(node) = self.scene.node(current) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some(current);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};

    fn names(scene: &Scene, ids: impl IntoIterator<Item = NodeId>) -> Vec<String> {
        ids.into_iter()
            .map(|id| scene.name_of(id).unwrap().to_string())
            .collect()
    }

    #[test]
    fn given_tree_when_iterating_descendants_then_yields_preorder() {
        let mut scene = Scene::new();
        let root = scene.add_root("Root");
        let a = scene.add_child(root, "A").unwrap();
        scene.add_child(a, "A1").unwrap();
        scene.add_child(a, "A2").unwrap();
        scene.add_child(root, "B").unwrap();

        assert_eq!(
            names(&scene, scene.descendants(root)),
            vec!["Root", "A", "A1", "A2", "B"]
        );
        assert_eq!(
            names(&scene, scene.descendants(root).skipping(Some(a))),
            vec!["Root", "B"]
        );
    }

    #[test]
    fn given_removed_node_when_accessing_then_handle_is_invalid() {
        let mut scene = Scene::new();
        let root = scene.add_root("Root");
        let child = scene.add_child(root, "Child").unwrap();
        let grandchild = scene.add_child(child, "Grandchild").unwrap();

        scene.remove(child).unwrap();

        assert!(!scene.contains(child));
        assert!(!scene.contains(grandchild));
        assert_eq!(scene.node(child).unwrap_err(), DomainError::NodeNotFound(child));
        assert!(scene.children_of(root).unwrap().is_empty());
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn given_posed_nodes_when_reparenting_then_world_pose_is_preserved() {
        let mut scene = Scene::new();
        let a = scene.add_root("A");
        scene
            .set_local_pose(a, Pose::new(Vec3::new(1.0, 0.0, 0.0), Quat::from_rotation_y(0.5), Vec3::ONE))
            .unwrap();
        let b = scene.add_root("B");
        scene
            .set_local_pose(b, Pose::new(Vec3::new(0.0, 3.0, 0.0), Quat::from_rotation_x(1.1), Vec3::splat(2.0)))
            .unwrap();
        let moving = scene
            .insert_node("Moving", Some(a), Pose::from_translation(Vec3::new(0.0, 0.0, 2.0)))
            .unwrap();

        let before = scene.world_pose(moving).unwrap();
        scene.reparent(moving, b).unwrap();
        let after = scene.world_pose(moving).unwrap();

        assert!(before.abs_diff_eq(&after, 1e-4));
        assert_eq!(scene.parent_of(moving).unwrap(), Some(b));
        assert!(scene.children_of(a).unwrap().is_empty());
    }

    #[test]
    fn given_descendant_target_when_reparenting_then_cycle_is_rejected() {
        let mut scene = Scene::new();
        let root = scene.add_root("Root");
        let child = scene.add_child(root, "Child").unwrap();

        let err = scene.reparent(root, child).unwrap_err();

        assert_eq!(err, DomainError::CycleDetected { node: root, parent: child });
        assert_eq!(scene.parent_of(child).unwrap(), Some(root));
    }

    #[test]
    fn given_skins_and_components_when_querying_then_reports_data() {
        let mut scene = Scene::new();
        let root = scene.add_root("Root");
        let bone = scene.add_child(root, "Bone").unwrap();
        let mesh = scene.add_child(root, "Mesh").unwrap();
        scene.attach_skin(mesh, Skin::new(Some(bone), vec![Some(bone), None])).unwrap();
        scene.add_component(root, "Animator").unwrap();

        assert!(scene.carries_data(mesh).unwrap());
        assert!(scene.carries_data(root).unwrap());
        assert!(!scene.carries_data(bone).unwrap());
        assert_eq!(scene.skins_within(root), vec![mesh]);
        let skin = scene.skin(mesh).unwrap().unwrap();
        assert_eq!(skin.references().collect::<Vec<_>>(), vec![bone, bone]);
    }
}
