//! Merge planning: a pure function from a scene snapshot to an ordered list of
//! operations plus the report those operations will produce.
//!
//! Every check runs against a [`TopologySnapshot`] that already has all earlier
//! planned operations applied. That is the state the executor will be in when it
//! reaches the corresponding operation, which keeps planned and realized counts
//! identical.

use std::fmt;

use tracing::{debug, instrument, trace, warn};

use crate::application::prune::{delete_with_ancestors, remaining_within};
use crate::application::report::{MergeCounts, MergeReport, MergeWarning};
use crate::domain::{
    collect_referenced_bones, DomainError, DomainResult, NameIndex, NodeId, Scene, Suffix,
    Topology, TopologySnapshot,
};

/// What a planned node is, for counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Bone,
    Skin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Bone => f.write_str("bone"),
            Role::Skin => f.write_str("skin"),
        }
    }
}

/// A single intended edit of the scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Reparent {
        node: NodeId,
        parent: NodeId,
        role: Role,
    },
    Rename {
        node: NodeId,
        name: String,
        role: Role,
    },
    /// Delete the node, then prune empty ancestors up to the avatar root.
    Delete { node: NodeId },
}

impl Operation {
    pub fn node(&self) -> NodeId {
        match self {
            Operation::Reparent { node, .. }
            | Operation::Rename { node, .. }
            | Operation::Delete { node } => *node,
        }
    }

    /// Human readable form using the names currently found in `topo`.
    pub fn describe<T: Topology>(&self, topo: &T) -> String {
        let name = |id: NodeId| {
            topo.name_of(id)
                .map(str::to_string)
                .unwrap_or_else(|_| id.to_string())
        };
        match self {
            Operation::Reparent { node, parent, role } => {
                format!("move {} '{}' under '{}'", role, name(*node), name(*parent))
            }
            Operation::Rename {
                node,
                name: new_name,
                role,
            } => format!("rename {} '{}' to '{}'", role, name(*node), new_name),
            Operation::Delete { node } => format!("delete '{}'", name(*node)),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Reparent { node, parent, role } => {
                write!(f, "reparent {} {} under {}", role, node, parent)
            }
            Operation::Rename { node, name, role } => {
                write!(f, "rename {} {} to '{}'", role, node, name)
            }
            Operation::Delete { node } => write!(f, "delete {}", node),
        }
    }
}

/// Inputs of one merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeInput {
    pub avatar_root: NodeId,
    pub clothing_root: NodeId,
    /// Skin-carrying nodes of the clothing
    pub skins: Vec<NodeId>,
    /// Raw suffix, normalized by the planner
    pub suffix: String,
}

impl MergeInput {
    /// Use every skin found under the clothing root, as the interactive tool does.
    pub fn from_scene(
        scene: &Scene,
        avatar_root: NodeId,
        clothing_root: NodeId,
        suffix: impl Into<String>,
    ) -> Self {
        Self {
            avatar_root,
            clothing_root,
            skins: scene.skins_within(clothing_root),
            suffix: suffix.into(),
        }
    }
}

/// Immutable, ordered list of intended operations with the expected report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergePlan {
    avatar_root: NodeId,
    clothing_root: NodeId,
    suffix: Suffix,
    operations: Vec<Operation>,
    report: MergeReport,
}

impl MergePlan {
    pub fn avatar_root(&self) -> NodeId {
        self.avatar_root
    }

    pub fn clothing_root(&self) -> NodeId {
        self.clothing_root
    }

    pub fn suffix(&self) -> &Suffix {
        &self.suffix
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn report(&self) -> &MergeReport {
        &self.report
    }

    pub fn counts(&self) -> MergeCounts {
        self.report.counts
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

/// Accumulates operations while applying them to the snapshot.
struct PlanBuilder {
    topo: TopologySnapshot,
    operations: Vec<Operation>,
    counts: MergeCounts,
}

impl PlanBuilder {
    fn reparent(&mut self, node: NodeId, parent: NodeId, role: Role) -> DomainResult<()> {
        self.topo.reparent(node, parent)?;
        match role {
            Role::Bone => self.counts.moved_bones += 1,
            Role::Skin => self.counts.moved_skins += 1,
        }
        self.push(Operation::Reparent { node, parent, role });
        Ok(())
    }

    fn rename(&mut self, node: NodeId, name: String, role: Role) -> DomainResult<()> {
        self.topo.rename(node, name.clone())?;
        match role {
            Role::Bone => self.counts.renamed_bones += 1,
            Role::Skin => self.counts.renamed_skins += 1,
        }
        self.push(Operation::Rename { node, name, role });
        Ok(())
    }

    fn delete(&mut self, node: NodeId, boundary: NodeId) -> DomainResult<()> {
        let removed = delete_with_ancestors(&mut self.topo, node, boundary)?;
        self.counts.deleted_objects += removed.len();
        self.push(Operation::Delete { node });
        Ok(())
    }

    fn push(&mut self, operation: Operation) {
        trace!("planned: {}", operation);
        self.operations.push(operation);
    }
}

fn validate(scene: &Scene, input: &MergeInput) -> DomainResult<()> {
    let MergeInput {
        avatar_root,
        clothing_root,
        skins,
        ..
    } = input;
    if !scene.contains(*avatar_root) {
        return Err(DomainError::InvalidInput(format!(
            "avatar root {} does not exist",
            avatar_root
        )));
    }
    if !scene.contains(*clothing_root) {
        return Err(DomainError::InvalidInput(format!(
            "clothing root {} does not exist",
            clothing_root
        )));
    }
    if avatar_root == clothing_root {
        return Err(DomainError::InvalidInput(
            "avatar root and clothing root are the same node".to_string(),
        ));
    }
    if scene.is_within(*avatar_root, *clothing_root)? {
        return Err(DomainError::InvalidInput(format!(
            "avatar root '{}' lies inside clothing root '{}'",
            scene.name_of(*avatar_root)?,
            scene.name_of(*clothing_root)?
        )));
    }
    for &skin in skins {
        if !scene.contains(skin) {
            return Err(DomainError::InvalidInput(format!(
                "skin node {} does not exist",
                skin
            )));
        }
    }
    Ok(())
}

/// Plan the merge of `input.clothing_root` into `input.avatar_root`.
///
/// Does not mutate `scene`; calling it twice on the same scene yields the same plan.
///
/// # Errors
/// `InvalidInput` if the roots are identical, missing, or the avatar lies inside
/// the clothing, or if a listed skin node has no skin.
#[instrument(level = "debug", skip(scene, input), fields(suffix = %input.suffix))]
pub fn plan_merge(scene: &Scene, input: &MergeInput) -> DomainResult<MergePlan> {
    validate(scene, input)?;
    let avatar_root = input.avatar_root;
    let clothing_root = input.clothing_root;

    // Clothing dropped somewhere under the avatar must not match against itself
    let nested = scene.is_within(clothing_root, avatar_root)?;
    let avatar_index =
        NameIndex::build_excluding(scene, avatar_root, nested.then_some(clothing_root));
    let clothing_index = NameIndex::build(scene, clothing_root);
    let bones = collect_referenced_bones(scene, &input.skins, clothing_root)?;
    // Any skin in the scene keeps its clothing bones alive, merged or not
    let scene_skins = scene.all_skins();
    let guarded = collect_referenced_bones(scene, &scene_skins, clothing_root)?;
    let suffix = Suffix::normalize(&input.suffix);
    debug!(
        "planning merge: {} referenced bones, {} skins, suffix '{}'",
        bones.len(),
        input.skins.len(),
        suffix
    );

    let mut builder = PlanBuilder {
        topo: TopologySnapshot::capture(scene),
        operations: Vec::new(),
        counts: MergeCounts::default(),
    };

    // 1) bones under their same-named avatar counterpart
    for &bone in &bones {
        let Some(target) = avatar_index.get(builder.topo.name_of(bone)?) else {
            continue;
        };
        if target == bone {
            continue;
        }
        if builder.topo.is_within(target, bone)? {
            trace!("skip {}: match lies below it", bone);
            continue;
        }
        if builder.topo.parent_of(bone)? == Some(target) {
            continue;
        }
        builder.reparent(bone, target, Role::Bone)?;
    }

    // 2) suffix on referenced bones
    for &bone in &bones {
        let renamed = suffix.apply(builder.topo.name_of(bone)?);
        if let Some(name) = renamed {
            builder.rename(bone, name, Role::Bone)?;
        }
    }

    // 3) skinned meshes directly under the avatar root, suffixed
    for &skin in &input.skins {
        if builder.topo.parent_of(skin)? != Some(avatar_root) {
            builder.reparent(skin, avatar_root, Role::Skin)?;
        }
        let renamed = suffix.apply(builder.topo.name_of(skin)?);
        if let Some(name) = renamed {
            builder.rename(skin, name, Role::Skin)?;
        }
    }

    // 4) clothing root, unless something still needs it
    let mut deletion_warning = None;
    let remaining = remaining_within(&builder.topo, clothing_root, &guarded)?;
    // Warnings name objects as they were before the renames
    let clothing_name = scene.name_of(clothing_root)?.to_string();
    if !remaining.is_empty() {
        deletion_warning = Some(MergeWarning::ReferencedBonesRemain {
            clothing_root: clothing_name,
            count: remaining.len(),
        });
    } else if let Some(&skin) = remaining_within(&builder.topo, clothing_root, &scene_skins)?.first() {
        deletion_warning = Some(MergeWarning::SkinRemains {
            clothing_root: clothing_name,
            skin: scene.name_of(skin)?.to_string(),
        });
    } else {
        builder.delete(clothing_root, avatar_root)?;
    }

    let duplicate_avatar_bone_names = avatar_index.duplicate_names();
    let duplicate_clothing_bone_names = clothing_index.duplicate_names();
    let mut warnings = Vec::new();
    if !duplicate_avatar_bone_names.is_empty() {
        warnings.push(MergeWarning::DuplicateAvatarNames(
            duplicate_avatar_bone_names.clone(),
        ));
    }
    if !duplicate_clothing_bone_names.is_empty() {
        warnings.push(MergeWarning::DuplicateClothingNames(
            duplicate_clothing_bone_names.clone(),
        ));
    }
    if input.skins.is_empty() {
        warnings.push(MergeWarning::NoClothingSkins);
    }
    warnings.extend(deletion_warning);
    for warning in &warnings {
        warn!("{}", warning);
    }

    let report = MergeReport {
        duplicate_avatar_bone_names,
        duplicate_clothing_bone_names,
        referenced_clothing_bones: bones.len(),
        counts: builder.counts,
        warnings: warnings.iter().map(ToString::to_string).collect(),
    };
    debug!("planned {} operations: {}", builder.operations.len(), report.counts);

    Ok(MergePlan {
        avatar_root,
        clothing_root,
        suffix,
        operations: builder.operations,
        report,
    })
}
