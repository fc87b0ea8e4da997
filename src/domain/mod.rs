//! Domain layer: scene graph model and the pure matching primitives
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod bones;
pub mod error;
pub mod name_index;
pub mod pose;
pub mod scene;
pub mod suffix;
pub mod topology;
pub mod tree_view;

pub use bones::collect_referenced_bones;
pub use error::{DomainError, DomainResult};
pub use name_index::NameIndex;
pub use pose::Pose;
pub use scene::{Descendants, NodeId, Scene, SceneNode, Skin};
pub use suffix::Suffix;
pub use topology::{Topology, TopologySnapshot};
pub use tree_view::SceneTreeConvert;
