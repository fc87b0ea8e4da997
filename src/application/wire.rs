//! Headless analysis documents.
//!
//! A request lists both hierarchies by name (pre-order, parent by name) plus the
//! clothing skins; the response carries the planner's report under the field
//! names the external analyzer has always used.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::application::error::ApplicationResult;
use crate::application::error_ext::JsonResultExt;
use crate::application::plan::MergeInput;
use crate::application::report::MergeReport;
use crate::domain::{DomainError, DomainResult, NodeId, Pose, Scene, Skin, Topology};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoneInfo {
    pub name: String,
    #[serde(default)]
    pub parent_name: Option<String>,
}

impl BoneInfo {
    pub fn new(name: impl Into<String>, parent_name: Option<&str>) -> Self {
        Self {
            name: name.into(),
            parent_name: parent_name.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkinInfo {
    pub name: String,
    #[serde(default)]
    pub root_bone: Option<String>,
    #[serde(default)]
    pub bones: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    #[serde(default)]
    pub avatar_bones: Vec<BoneInfo>,
    #[serde(default)]
    pub clothing_bones: Vec<BoneInfo>,
    #[serde(default)]
    pub clothing_smrs: Vec<SkinInfo>,
    #[serde(default)]
    pub suffix: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub duplicate_avatar_bone_names: Vec<String>,
    pub duplicate_clothing_bone_names: Vec<String>,
    pub referenced_clothing_bones: usize,
    pub estimated_moved_bones: usize,
    pub estimated_moved_smrs: usize,
    pub estimated_renamed_bones: usize,
    pub estimated_renamed_smrs: usize,
    #[serde(default)]
    pub estimated_deleted_objects: usize,
    pub warnings: Vec<String>,
}

impl From<&MergeReport> for AnalysisResponse {
    fn from(report: &MergeReport) -> Self {
        Self {
            duplicate_avatar_bone_names: report.duplicate_avatar_bone_names.clone(),
            duplicate_clothing_bone_names: report.duplicate_clothing_bone_names.clone(),
            referenced_clothing_bones: report.referenced_clothing_bones,
            estimated_moved_bones: report.counts.moved_bones,
            estimated_moved_smrs: report.counts.moved_skins,
            estimated_renamed_bones: report.counts.renamed_bones,
            estimated_renamed_smrs: report.counts.renamed_skins,
            estimated_deleted_objects: report.counts.deleted_objects,
            warnings: report.warnings.clone(),
        }
    }
}

impl AnalysisResponse {
    pub fn to_json(&self, pretty: bool) -> ApplicationResult<String> {
        if pretty {
            serde_json::to_string_pretty(self).with_document_context("analysis response")
        } else {
            serde_json::to_string(self).with_document_context("analysis response")
        }
    }
}

/// A request turned into a live model.
#[derive(Debug)]
pub struct ImportedScene {
    pub scene: Scene,
    pub avatar_root: NodeId,
    pub clothing_root: NodeId,
    /// Skin-carrying clothing nodes in request order
    pub skins: Vec<NodeId>,
}

impl ImportedScene {
    pub fn merge_input(&self, suffix: impl Into<String>) -> MergeInput {
        MergeInput {
            avatar_root: self.avatar_root,
            clothing_root: self.clothing_root,
            skins: self.skins.clone(),
            suffix: suffix.into(),
        }
    }
}

impl AnalysisRequest {
    pub fn from_json(content: &str) -> ApplicationResult<Self> {
        serde_json::from_str(content).with_document_context("analysis request")
    }

    pub fn to_json_pretty(&self) -> ApplicationResult<String> {
        serde_json::to_string_pretty(self).with_document_context("analysis request")
    }

    /// Build a scene holding both hierarchies and bind the skins.
    ///
    /// The clothing root goes under the last avatar entry named by its
    /// `parent_name`; with no such entry it becomes a root of its own.
    ///
    /// # Errors
    /// `InvalidInput` for an empty bone list, a parent name that does not name an
    /// earlier entry, or a skin whose node cannot be found in the clothing.
    #[instrument(level = "debug", skip(self), fields(
        avatar = self.avatar_bones.len(),
        clothing = self.clothing_bones.len(),
        skins = self.clothing_smrs.len()
    ))]
    pub fn import(&self) -> DomainResult<ImportedScene> {
        let mut scene = Scene::new();
        let avatar = import_hierarchy(&mut scene, &self.avatar_bones, None, "avatar_bones")?;
        let anchor = self
            .clothing_bones
            .first()
            .and_then(|root| root.parent_name.as_deref())
            .and_then(|parent| find_latest_by_name(&scene, &avatar, parent));
        let clothing =
            import_hierarchy(&mut scene, &self.clothing_bones, anchor, "clothing_bones")?;

        let mut skins = Vec::with_capacity(self.clothing_smrs.len());
        for info in &self.clothing_smrs {
            let node = clothing
                .iter()
                .copied()
                .find(|&id| {
                    scene.name_of(id).is_ok_and(|n| n == info.name)
                        && matches!(scene.skin(id), Ok(None))
                })
                .ok_or_else(|| {
                    DomainError::InvalidInput(format!(
                        "clothing_smrs: no unbound clothing node named '{}'",
                        info.name
                    ))
                })?;
            let resolve = |name: &str| {
                find_by_name(&scene, &clothing, name).or_else(|| find_by_name(&scene, &avatar, name))
            };
            let root_bone = info.root_bone.as_deref().and_then(resolve);
            let bones = info.bones.iter().map(|name| resolve(name)).collect();
            scene.attach_skin(node, Skin::new(root_bone, bones))?;
            skins.push(node);
        }
        debug!("imported {} nodes", scene.len());

        Ok(ImportedScene {
            avatar_root: avatar[0],
            clothing_root: clothing[0],
            scene,
            skins,
        })
    }

    /// Describe the two hierarchies of a live scene as a request document.
    ///
    /// When the clothing sits under the avatar, its subtree is left out of the
    /// avatar list.
    pub fn capture(
        scene: &Scene,
        avatar_root: NodeId,
        clothing_root: NodeId,
        skins: &[NodeId],
        suffix: impl Into<String>,
    ) -> DomainResult<Self> {
        let nested = scene.is_within(clothing_root, avatar_root)?;
        let avatar_bones = capture_hierarchy(
            scene,
            scene
                .descendants(avatar_root)
                .skipping(nested.then_some(clothing_root)),
        )?;
        let clothing_bones = capture_hierarchy(scene, scene.descendants(clothing_root))?;

        let name = |id: NodeId| scene.name_of(id).map(str::to_string);
        let mut clothing_smrs = Vec::with_capacity(skins.len());
        for &node in skins {
            let skin = scene.skin(node)?.ok_or_else(|| {
                DomainError::InvalidInput(format!("node {} carries no skin", node))
            })?;
            clothing_smrs.push(SkinInfo {
                name: name(node)?,
                root_bone: skin.root_bone.map(name).transpose()?,
                bones: skin
                    .bones
                    .iter()
                    .flatten()
                    .map(|&id| name(id))
                    .collect::<DomainResult<Vec<String>>>()?,
            });
        }

        Ok(Self {
            avatar_bones,
            clothing_bones,
            clothing_smrs,
            suffix: suffix.into(),
        })
    }
}

/// Insert one pre-order bone list with its first entry under `anchor`; returns
/// the created nodes in list order.
fn import_hierarchy(
    scene: &mut Scene,
    bones: &[BoneInfo],
    anchor: Option<NodeId>,
    list: &str,
) -> DomainResult<Vec<NodeId>> {
    let Some((root, rest)) = bones.split_first() else {
        return Err(DomainError::InvalidInput(format!("{} is empty", list)));
    };
    let mut created = vec![scene.insert_node(root.name.clone(), anchor, Pose::IDENTITY)?];

    for bone in rest {
        let parent_name = bone
            .parent_name
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| {
                DomainError::InvalidInput(format!("{}: '{}' has no parent_name", list, bone.name))
            })?;
        let parent = find_latest_by_name(scene, &created, parent_name).ok_or_else(|| {
            DomainError::InvalidInput(format!(
                "{}: parent '{}' of '{}' is not listed before it",
                list, parent_name, bone.name
            ))
        })?;
        created.push(scene.insert_node(bone.name.clone(), Some(parent), Pose::IDENTITY)?);
    }
    Ok(created)
}

fn find_by_name(scene: &Scene, nodes: &[NodeId], name: &str) -> Option<NodeId> {
    nodes
        .iter()
        .copied()
        .find(|&id| scene.name_of(id).is_ok_and(|n| n == name))
}

fn find_latest_by_name(scene: &Scene, nodes: &[NodeId], name: &str) -> Option<NodeId> {
    nodes
        .iter()
        .rev()
        .copied()
        .find(|&id| scene.name_of(id).is_ok_and(|n| n == name))
}

fn capture_hierarchy(
    scene: &Scene,
    nodes: impl Iterator<Item = NodeId>,
) -> DomainResult<Vec<BoneInfo>> {
    nodes
        .map(|id| -> DomainResult<BoneInfo> {
            let node = scene.node(id)?;
            let parent_name = node.parent().map(|p| scene.name_of(p)).transpose()?;
            Ok(BoneInfo::new(node.name(), parent_name))
        })
        .collect()
}
