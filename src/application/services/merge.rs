//! Merge service
//!
//! Entry point for interactive callers: plan, optionally enforce unique names,
//! then execute against the live scene.

use itertools::Itertools;
use tracing::{debug, info, instrument};

use crate::application::executor::execute;
use crate::application::plan::{plan_merge, MergeInput, MergePlan};
use crate::application::report::MergeReport;
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{NodeId, Scene};

/// Plan and report of an executed merge.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub plan: MergePlan,
    /// Realized report, counts equal to the plan's
    pub report: MergeReport,
}

/// Service running the planner and the executor.
#[derive(Debug, Clone, Default)]
pub struct MergeService {
    strict_names: bool,
}

impl MergeService {
    /// With `strict_names`, duplicate bone names fail the merge instead of
    /// being reported as warnings.
    pub fn new(strict_names: bool) -> Self {
        Self { strict_names }
    }

    /// Dry run: the plan without touching the scene.
    #[instrument(level = "debug", skip_all)]
    pub fn plan(&self, scene: &Scene, input: &MergeInput) -> ApplicationResult<MergePlan> {
        let plan = plan_merge(scene, input)?;
        if self.strict_names {
            let report = plan.report();
            let names: Vec<String> = report
                .duplicate_avatar_bone_names
                .iter()
                .chain(&report.duplicate_clothing_bone_names)
                .cloned()
                .sorted()
                .dedup()
                .collect();
            if !names.is_empty() {
                return Err(ApplicationError::DuplicateNames { names });
            }
        }
        debug!("plan: {} operations", plan.operations().len());
        Ok(plan)
    }

    /// Plan and apply. The scene is not touched if planning fails.
    pub fn merge(&self, scene: &mut Scene, input: &MergeInput) -> ApplicationResult<MergeOutcome> {
        let plan = self.plan(scene, input)?;
        let report = execute(scene, &plan)?;
        info!(
            "merged {} operations, {} warning(s)",
            plan.operations().len(),
            report.warnings.len()
        );
        Ok(MergeOutcome { plan, report })
    }

    /// Merge every skin found under `clothing_root`.
    pub fn merge_hierarchies(
        &self,
        scene: &mut Scene,
        avatar_root: NodeId,
        clothing_root: NodeId,
        suffix: &str,
    ) -> ApplicationResult<MergeOutcome> {
        let input = MergeInput::from_scene(scene, avatar_root, clothing_root, suffix);
        self.merge(scene, &input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Skin, Topology};

    fn duplicated_scene() -> (Scene, NodeId, NodeId) {
        let mut scene = Scene::new();
        let avatar = scene.add_root("Avatar");
        let hips = scene.add_child(avatar, "Hips").unwrap();
        scene.add_child(hips, "Hips").unwrap();
        let clothing = scene.add_root("Clothing");
        let cloth_hips = scene.add_child(clothing, "Hips").unwrap();
        let mesh = scene.add_child(clothing, "Mesh").unwrap();
        scene
            .attach_skin(mesh, Skin::new(Some(cloth_hips), vec![Some(cloth_hips)]))
            .unwrap();
        (scene, avatar, clothing)
    }

    #[test]
    fn given_duplicates_when_strict_then_merge_fails_before_mutation() {
        let (mut scene, avatar, clothing) = duplicated_scene();

        let err = MergeService::new(true)
            .merge_hierarchies(&mut scene, avatar, clothing, "x")
            .unwrap_err();

        assert!(matches!(err, ApplicationError::DuplicateNames { ref names } if names == &["Hips"]));
        assert!(scene.contains(clothing));
    }

    #[test]
    fn given_duplicates_when_lenient_then_merge_warns_and_completes() {
        let (mut scene, avatar, clothing) = duplicated_scene();

        let outcome = MergeService::default()
            .merge_hierarchies(&mut scene, avatar, clothing, "x")
            .unwrap();

        assert_eq!(outcome.report.counts, outcome.plan.counts());
        assert!(outcome.report.warnings[0].contains("duplicate bone names"));
        assert!(!scene.contains(clothing));
    }
}
