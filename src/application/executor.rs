//! Applies a [`MergePlan`] to the live scene.

use tracing::{debug, info, instrument};

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::application::plan::{MergePlan, Operation, Role};
use crate::application::prune::delete_with_ancestors;
use crate::application::report::{MergeCounts, MergeReport};
use crate::domain::{DomainResult, NodeId, Scene, Topology};

fn apply(
    scene: &mut Scene,
    operation: &Operation,
    avatar_root: NodeId,
    counts: &mut MergeCounts,
) -> DomainResult<()> {
    match operation {
        Operation::Reparent { node, parent, role } => {
            scene.reparent(*node, *parent)?;
            match role {
                Role::Bone => counts.moved_bones += 1,
                Role::Skin => counts.moved_skins += 1,
            }
        }
        Operation::Rename { node, name, role } => {
            scene.rename(*node, name.clone())?;
            match role {
                Role::Bone => counts.renamed_bones += 1,
                Role::Skin => counts.renamed_skins += 1,
            }
        }
        Operation::Delete { node } => {
            let removed = delete_with_ancestors(scene, *node, avatar_root)?;
            counts.deleted_objects += removed.len();
        }
    }
    Ok(())
}

/// Apply `plan` to `scene` in order and return the realized report.
///
/// The caller must hold exclusive access to the scene for the whole batch. There
/// is no rollback: if an operation fails, the operations before it stay applied
/// and the error says how many were applied and which one failed.
///
/// # Errors
/// - `ExecutionFault` if an operation cannot be applied (stale node, cycle)
/// - `CountMismatch` if the realized counts differ from the planned ones
#[instrument(level = "debug", skip(scene, plan), fields(operations = plan.operations().len()))]
pub fn execute(scene: &mut Scene, plan: &MergePlan) -> ApplicationResult<MergeReport> {
    let total = plan.operations().len();
    let mut realized = MergeCounts::default();

    for (applied, operation) in plan.operations().iter().enumerate() {
        debug!("applying {}", operation.describe(&*scene));
        apply(scene, operation, plan.avatar_root(), &mut realized).map_err(|source| {
            ApplicationError::ExecutionFault {
                applied,
                total,
                operation: operation.to_string(),
                source,
            }
        })?;
    }

    if realized != plan.counts() {
        return Err(ApplicationError::CountMismatch {
            planned: plan.counts(),
            realized,
        });
    }
    info!("merge applied: {}", realized);
    Ok(plan.report().with_counts(realized))
}
