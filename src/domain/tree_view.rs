/*
Rendering lives in a trait so the CLI can print any hierarchy of the scene
without the scene knowing about termtree.
 */
use termtree::Tree;
use tracing::instrument;

use crate::domain::scene::{NodeId, Scene};

pub trait SceneTreeConvert {
    fn to_tree_string(&self, root: NodeId) -> Tree<String>;
}

impl SceneTreeConvert for Scene {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self, root: NodeId) -> Tree<String> {
        fn label(scene: &Scene, id: NodeId) -> String {
            let Ok(node) = scene.node(id) else {
                return format!("<missing {}>", id);
            };
            let mut label = node.name().to_string();
            if node.skin().is_some() {
                label.push_str(" [skin]");
            }
            if !node.components().is_empty() {
                label.push_str(&format!(" {{{}}}", node.components().join(", ")));
            }
            label
        }

        fn build_tree(scene: &Scene, id: NodeId, parent_tree: &mut Tree<String>) {
            if let Ok(node) = scene.node(id) {
                for &child in node.children() {
                    let mut child_tree = Tree::new(label(scene, child));
                    build_tree(scene, child, &mut child_tree);
                    parent_tree.push(child_tree);
                }
            }
        }

        let mut tree = Tree::new(label(self, root));
        build_tree(self, root, &mut tree);
        tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::scene::Skin;

    #[test]
    fn given_hierarchy_when_rendering_then_lists_nodes_with_markers() {
        let mut scene = Scene::new();
        let root = scene.add_root("Root");
        let hips = scene.add_child(root, "Hips").unwrap();
        let body = scene.add_child(root, "Body").unwrap();
        scene.attach_skin(body, Skin::new(Some(hips), vec![Some(hips)])).unwrap();
        scene.add_component(root, "Animator").unwrap();

        let rendered = scene.to_tree_string(root).to_string();

        assert!(rendered.starts_with("Root {Animator}"));
        assert!(rendered.contains("Hips"));
        assert!(rendered.contains("Body [skin]"));
    }
}
