//! Collect the clothing bones that skins actually deform.

use itertools::Itertools;
use tracing::{debug, instrument};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::scene::{NodeId, Scene};
use crate::domain::topology::Topology;

/// Distinct nodes referenced as `root_bone` or bone slot by any of `skins`,
/// restricted to the hierarchy under `clothing_root`.
///
/// References outside the clothing hierarchy belong to another skeleton and are
/// dropped, as are unbound slots and stale handles. The result keeps the order
/// of first reference (skins in order, root bone before bone slots).
#[instrument(level = "debug", skip(scene, skins))]
pub fn collect_referenced_bones(
    scene: &Scene,
    skins: &[NodeId],
    clothing_root: NodeId,
) -> DomainResult<Vec<NodeId>> {
    let mut references = Vec::new();
    for &skin_node in skins {
        let skin = scene.skin(skin_node)?.ok_or_else(|| {
            DomainError::InvalidInput(format!("node {} carries no skin", skin_node))
        })?;
        references.extend(skin.references());
    }

    let mut bones = Vec::new();
    for bone in references.into_iter().unique() {
        if scene.contains(bone) && scene.is_within(bone, clothing_root)? {
            bones.push(bone);
        }
    }
    debug!("{} referenced clothing bones", bones.len());
    Ok(bones)
}
