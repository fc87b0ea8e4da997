//! First-match-wins name lookup over a hierarchy.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::domain::scene::{NodeId, Scene};
use crate::domain::topology::Topology;

/// Maps each name to the first node carrying it in pre-order traversal.
///
/// Later nodes with the same name are never returned by [`NameIndex::get`];
/// they are only recorded as duplicate names for diagnostics.
#[derive(Debug, Clone, Default)]
pub struct NameIndex {
    first: HashMap<String, NodeId>,
    counts: BTreeMap<String, usize>,
}

impl NameIndex {
    pub fn build(scene: &Scene, root: NodeId) -> Self {
        Self::build_excluding(scene, root, None)
    }

    /// Build the index, leaving out `excluded` and its subtree. Used when the
    /// clothing hierarchy is nested inside the avatar hierarchy.
    pub fn build_excluding(scene: &Scene, root: NodeId, excluded: Option<NodeId>) -> Self {
        let mut index = Self::default();
        for id in scene.descendants(root).skipping(excluded) {
            let Ok(name) = scene.name_of(id) else {
                continue;
            };
            *index.counts.entry(name.to_string()).or_insert(0) += 1;
            index.first.entry(name.to_string()).or_insert(id);
        }
        debug!(
            "name index: {} names, {} duplicated",
            index.first.len(),
            index.duplicate_names().len()
        );
        index
    }

    pub fn get(&self, name: &str) -> Option<NodeId> {
        self.first.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.first.len()
    }

    pub fn is_empty(&self) -> bool {
        self.first.is_empty()
    }

    /// Names occurring more than once, sorted.
    pub fn duplicate_names(&self) -> Vec<String> {
        self.counts
            .iter()
            .filter(|(_, &count)| count > 1)
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn has_duplicates(&self) -> bool {
        self.counts.values().any(|&count| count > 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_duplicate_names_when_looking_up_then_first_in_preorder_wins() {
        let mut scene = Scene::new();
        let root = scene.add_root("Root");
        let arm = scene.add_child(root, "Arm").unwrap();
        let first_hand = scene.add_child(arm, "Hand").unwrap();
        let second_hand = scene.add_child(root, "Hand").unwrap();
        scene.add_child(second_hand, "Arm").unwrap();

        let index = NameIndex::build(&scene, root);

        assert_eq!(index.get("Hand"), Some(first_hand));
        assert_eq!(index.get("Arm"), Some(arm));
        assert_eq!(index.get("Missing"), None);
        assert_eq!(index.duplicate_names(), vec!["Arm", "Hand"]);
        assert!(index.has_duplicates());
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn given_excluded_subtree_when_building_then_its_names_are_ignored() {
        let mut scene = Scene::new();
        let root = scene.add_root("Root");
        scene.add_child(root, "Hips").unwrap();
        let nested = scene.add_child(root, "Outfit").unwrap();
        scene.add_child(nested, "Hips").unwrap();

        let index = NameIndex::build_excluding(&scene, root, Some(nested));

        assert!(!index.has_duplicates());
        assert_eq!(index.get("Outfit"), None);
    }
}
