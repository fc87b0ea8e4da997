//! Merge result shape shared by dry runs and live execution.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of operations of each kind, planned or realized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeCounts {
    pub moved_bones: usize,
    pub moved_skins: usize,
    pub renamed_bones: usize,
    pub renamed_skins: usize,
    /// Clothing root plus pruned empty ancestors
    pub deleted_objects: usize,
}

impl MergeCounts {
    pub fn total(&self) -> usize {
        self.moved_bones
            + self.moved_skins
            + self.renamed_bones
            + self.renamed_skins
            + self.deleted_objects
    }

    pub fn is_zero(&self) -> bool {
        self.total() == 0
    }
}

impl fmt::Display for MergeCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "moved bones {}, renamed bones {}, moved skins {}, renamed skins {}, deleted {}",
            self.moved_bones,
            self.renamed_bones,
            self.moved_skins,
            self.renamed_skins,
            self.deleted_objects
        )
    }
}

/// Non-fatal conditions collected while planning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeWarning {
    DuplicateAvatarNames(Vec<String>),
    DuplicateClothingNames(Vec<String>),
    NoClothingSkins,
    ReferencedBonesRemain { clothing_root: String, count: usize },
    SkinRemains { clothing_root: String, skin: String },
}

impl fmt::Display for MergeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeWarning::DuplicateAvatarNames(names) => write!(
                f,
                "avatar has duplicate bone names, matching uses the first occurrence: {}",
                names.join(", ")
            ),
            MergeWarning::DuplicateClothingNames(names) => write!(
                f,
                "clothing has duplicate bone names, moves and renames may be ambiguous: {}",
                names.join(", ")
            ),
            MergeWarning::NoClothingSkins => {
                write!(f, "clothing has no skinned meshes, nothing to merge")
            }
            MergeWarning::ReferencedBonesRemain {
                clothing_root,
                count,
            } => write!(
                f,
                "{} referenced bone(s) remain under '{}', deletion skipped",
                count, clothing_root
            ),
            MergeWarning::SkinRemains {
                clothing_root,
                skin,
            } => write!(
                f,
                "skinned mesh '{}' remains under '{}', deletion skipped",
                skin, clothing_root
            ),
        }
    }
}

/// Diagnostics and counts of one merge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeReport {
    pub duplicate_avatar_bone_names: Vec<String>,
    pub duplicate_clothing_bone_names: Vec<String>,
    pub referenced_clothing_bones: usize,
    pub counts: MergeCounts,
    pub warnings: Vec<String>,
}

impl MergeReport {
    /// Same diagnostics with different counts (planned vs realized).
    pub fn with_counts(&self, counts: MergeCounts) -> Self {
        Self {
            counts,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_counts_when_totalling_then_sums_all_kinds() {
        let counts = MergeCounts {
            moved_bones: 2,
            moved_skins: 1,
            renamed_bones: 3,
            renamed_skins: 1,
            deleted_objects: 1,
        };
        assert_eq!(counts.total(), 8);
        assert!(!counts.is_zero());
        assert!(MergeCounts::default().is_zero());
    }

    #[test]
    fn given_skipped_deletion_when_formatting_then_names_root_and_count() {
        let warning = MergeWarning::ReferencedBonesRemain {
            clothing_root: "ClothRoot".to_string(),
            count: 2,
        };
        assert_eq!(
            warning.to_string(),
            "2 referenced bone(s) remain under 'ClothRoot', deletion skipped"
        );
    }
}
