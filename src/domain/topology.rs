//! Structural view of a hierarchy shared by the live scene and planning snapshots.
//!
//! The planner works on a [`TopologySnapshot`] while the executor works on the
//! [`Scene`]; both implement [`Topology`], so structural rules (cycle checks,
//! pruning) are written once and see the same state in both modes.

use std::collections::HashMap;

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::scene::{NodeId, Scene};

/// Names, links and data flags of a hierarchy, plus the structural edits the
/// merge needs.
pub trait Topology {
    fn contains(&self, id: NodeId) -> bool;

    fn name_of(&self, id: NodeId) -> DomainResult<&str>;

    fn parent_of(&self, id: NodeId) -> DomainResult<Option<NodeId>>;

    fn children_of(&self, id: NodeId) -> DomainResult<&[NodeId]>;

    /// True if the node carries non-structural data (a skin, components).
    fn carries_data(&self, id: NodeId) -> DomainResult<bool>;

    fn rename(&mut self, id: NodeId, name: String) -> DomainResult<()>;

    /// Move `node` under `parent`. Fails with `CycleDetected` if `parent` is
    /// `node` or one of its descendants.
    fn reparent(&mut self, node: NodeId, parent: NodeId) -> DomainResult<()>;

    /// Remove `id` and its remaining subtree.
    fn remove(&mut self, id: NodeId) -> DomainResult<()>;

    /// True if `node` is `root` or lies below it.
    fn is_within(&self, node: NodeId, root: NodeId) -> DomainResult<bool> {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == root {
                return Ok(true);
            }
            current = self.parent_of(id)?;
        }
        Ok(false)
    }
}

#[derive(Debug, Clone)]
struct SnapshotNode {
    name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    has_data: bool,
}

/// Detached copy of a scene's structure. Edits never touch the scene.
#[derive(Debug, Clone, Default)]
pub struct TopologySnapshot {
    nodes: HashMap<NodeId, SnapshotNode>,
}

impl TopologySnapshot {
    /// Copy the structure of every hierarchy in `scene`.
    pub fn capture(scene: &Scene) -> Self {
        let mut nodes = HashMap::with_capacity(scene.len());
        for &root in scene.roots() {
            for id in scene.descendants(root) {
                if let Ok(node) = scene.node(id) {
                    nodes.insert(
                        id,
                        SnapshotNode {
                            name: node.name().to_string(),
                            parent: node.parent(),
                            children: node.children().to_vec(),
                            has_data: node.carries_data(),
                        },
                    );
                }
            }
        }
        Self { nodes }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn node(&self, id: NodeId) -> DomainResult<&SnapshotNode> {
        self.nodes.get(&id).ok_or(DomainError::NodeNotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> DomainResult<&mut SnapshotNode> {
        self.nodes.get_mut(&id).ok_or(DomainError::NodeNotFound(id))
    }

    fn detach(&mut self, id: NodeId) -> DomainResult<()> {
        if let Some(parent) = self.node(id)?.parent {
            self.node_mut(parent)?.children.retain(|&c| c != id);
        }
        self.node_mut(id)?.parent = None;
        Ok(())
    }
}

impl Topology for TopologySnapshot {
    fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
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
        Ok(self.node(id)?.has_data)
    }

    fn rename(&mut self, id: NodeId, name: String) -> DomainResult<()> {
        self.node_mut(id)?.name = name;
        Ok(())
    }

    fn reparent(&mut self, node: NodeId, parent: NodeId) -> DomainResult<()> {
        self.node(node)?;
        self.node(parent)?;
        if self.is_within(parent, node)? {
            return Err(DomainError::CycleDetected { node, parent });
        }
        self.detach(node)?;
        self.node_mut(parent)?.children.push(node);
        self.node_mut(node)?.parent = Some(parent);
        Ok(())
    }

    fn remove(&mut self, id: NodeId) -> DomainResult<()> {
        self.node(id)?;
        self.detach(id)?;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(removed) = self.nodes.remove(&current) {
                stack.extend(removed.children);
            }
        }
        Ok(())
    }
}
