//! Dry run, live execution and the headless analyzer must agree on every
//! number they report for the same topology and suffix.

use std::sync::Arc;

use rstest::rstest;

use rigmerge::application::services::{AnalysisService, MergeService};
use rigmerge::application::{execute, plan_merge, AnalysisRequest, AnalysisResponse, MergeInput};
use rigmerge::config::Settings;
use rigmerge::domain::{NodeId, Scene, Skin};
use rigmerge::infrastructure::traits::MemoryFileSystem;
use rigmerge::util::testing;

#[ctor::ctor]
fn init() {
    testing::init_test_setup();
}

struct Case {
    scene: Scene,
    avatar: NodeId,
    clothing: NodeId,
}

impl Case {
    fn input(&self, suffix: &str) -> MergeInput {
        MergeInput::from_scene(&self.scene, self.avatar, self.clothing, suffix)
    }
}

fn shirt() -> Case {
    let mut scene = Scene::new();
    let avatar = scene.add_root("Root");
    let hips = scene.add_child(avatar, "Hips").unwrap();
    let spine = scene.add_child(hips, "Spine").unwrap();
    scene.add_child(spine, "Chest").unwrap();
    let clothing = scene.add_root("ClothRoot");
    let c_hips = scene.add_child(clothing, "Hips").unwrap();
    let c_chest = scene.add_child(c_hips, "Chest").unwrap();
    let sleeve = scene.add_child(c_chest, "Sleeve").unwrap();
    let mesh = scene.add_child(clothing, "Shirt").unwrap();
    scene
        .attach_skin(
            mesh,
            Skin::new(Some(c_hips), vec![Some(c_hips), Some(c_chest), Some(sleeve)]),
        )
        .unwrap();
    Case {
        scene,
        avatar,
        clothing,
    }
}

/// Duplicate names on both sides, an unmatched bone that keeps the root alive,
/// an unbound slot and two meshes sharing bones. Only the first of the two
/// clothing legs is referenced, so names identify every referenced bone.
fn messy() -> Case {
    let mut scene = Scene::new();
    let avatar = scene.add_root("Avatar");
    let hips = scene.add_child(avatar, "Hips").unwrap();
    scene.add_child(hips, "Hips").unwrap();
    scene.add_child(avatar, "Leg").unwrap();
    let clothing = scene.add_root("Pants");
    let armature = scene.add_child(clothing, "Armature").unwrap();
    let c_hips = scene.add_child(armature, "Hips").unwrap();
    let leg_l = scene.add_child(c_hips, "Leg").unwrap();
    scene.add_child(c_hips, "Leg").unwrap();
    let belt = scene.add_child(clothing, "Belt").unwrap();
    let left = scene.add_child(clothing, "PantsL").unwrap();
    let right = scene.add_child(armature, "PantsR").unwrap();
    scene
        .attach_skin(left, Skin::new(Some(c_hips), vec![Some(leg_l), None, Some(belt)]))
        .unwrap();
    scene
        .attach_skin(right, Skin::new(Some(c_hips), vec![Some(leg_l)]))
        .unwrap();
    Case {
        scene,
        avatar,
        clothing,
    }
}

/// Skin on the clothing root itself: the root cannot be deleted.
fn skinned_root() -> Case {
    let mut scene = Scene::new();
    let avatar = scene.add_root("Avatar");
    scene.add_child(avatar, "Bone").unwrap();
    let clothing = scene.add_root("Dress");
    let bone = scene.add_child(clothing, "Bone").unwrap();
    scene
        .attach_skin(clothing, Skin::new(None, vec![Some(bone)]))
        .unwrap();
    Case {
        scene,
        avatar,
        clothing,
    }
}

fn no_skins() -> Case {
    let mut scene = Scene::new();
    let avatar = scene.add_root("Avatar");
    let clothing = scene.add_root("Empty");
    scene.add_child(clothing, "Bone").unwrap();
    Case {
        scene,
        avatar,
        clothing,
    }
}

/// Skinned hat dropped straight under the avatar root, bound to avatar bones.
fn nested_hat() -> Case {
    let mut scene = Scene::new();
    let avatar = scene.add_root("Root");
    let head = scene.add_child(avatar, "Head").unwrap();
    let clothing = scene.add_child(avatar, "Hat").unwrap();
    scene
        .attach_skin(clothing, Skin::new(Some(head), vec![Some(head)]))
        .unwrap();
    Case {
        scene,
        avatar,
        clothing,
    }
}

/// Clothing inside an empty group of the avatar: the group is pruned with it.
fn nested_group() -> Case {
    let mut scene = Scene::new();
    let avatar = scene.add_root("Root");
    scene.add_child(avatar, "Hips").unwrap();
    let outfits = scene.add_child(avatar, "Outfits").unwrap();
    let clothing = scene.add_child(outfits, "ClothRoot").unwrap();
    let c_hips = scene.add_child(clothing, "Hips").unwrap();
    let mesh = scene.add_child(clothing, "Shirt").unwrap();
    scene
        .attach_skin(mesh, Skin::new(Some(c_hips), vec![Some(c_hips)]))
        .unwrap();
    Case {
        scene,
        avatar,
        clothing,
    }
}

#[rstest]
#[case::shirt(shirt(), "shirt")]
#[case::messy(messy(), "_pants_")]
#[case::skinned_root(skinned_root(), "dress")]
#[case::no_skins(no_skins(), "")]
#[case::nested_hat(nested_hat(), "hat")]
#[case::nested_group(nested_group(), "")]
fn given_same_topology_when_planning_and_executing_then_reports_are_identical(
    #[case] case: Case,
    #[case] suffix: &str,
) {
    let mut case = case;
    let input = case.input(suffix);

    let planned = plan_merge(&case.scene, &input).unwrap();
    let realized = execute(&mut case.scene, &planned).unwrap();

    assert_eq!(&realized, planned.report());
}

#[rstest]
#[case::shirt(shirt(), "shirt")]
#[case::messy(messy(), "_pants_")]
#[case::skinned_root(skinned_root(), "dress")]
#[case::no_skins(no_skins(), "")]
#[case::nested_hat(nested_hat(), "hat")]
#[case::nested_group(nested_group(), "")]
fn given_captured_request_when_analyzing_headless_then_response_matches_live_merge(
    #[case] case: Case,
    #[case] suffix: &str,
) {
    let mut case = case;
    let input = case.input(suffix);
    let request =
        AnalysisRequest::capture(&case.scene, case.avatar, case.clothing, &input.skins, suffix)
            .unwrap();
    let json = request.to_json_pretty().unwrap();
    let service = AnalysisService::new(
        Arc::new(MemoryFileSystem::default()),
        Arc::new(Settings::default()),
    );

    let headless = service
        .analyze(&AnalysisRequest::from_json(&json).unwrap(), None)
        .unwrap();
    let live = MergeService::default()
        .merge(&mut case.scene, &input)
        .unwrap();

    assert_eq!(headless, AnalysisResponse::from(&live.report));
}

#[test]
fn given_messy_case_when_planning_then_diagnostics_are_reported() {
    let case = messy();

    let plan = plan_merge(&case.scene, &case.input("pants")).unwrap();
    let report = plan.report();

    assert_eq!(report.duplicate_avatar_bone_names, vec!["Hips".to_string()]);
    assert_eq!(report.duplicate_clothing_bone_names, vec!["Leg".to_string()]);
    // Hips, the first leg and the belt
    assert_eq!(report.referenced_clothing_bones, 3);
    assert_eq!(report.counts.moved_bones, 2);
    assert_eq!(report.counts.deleted_objects, 0);
    assert_eq!(
        report.warnings.last().map(String::as_str),
        Some("1 referenced bone(s) remain under 'Pants', deletion skipped")
    );
}

#[test]
fn given_nested_group_when_analyzing_headless_then_pruned_group_is_counted() {
    let case = nested_group();
    let input = case.input("");
    let request =
        AnalysisRequest::capture(&case.scene, case.avatar, case.clothing, &input.skins, "")
            .unwrap();
    let service = AnalysisService::new(
        Arc::new(MemoryFileSystem::default()),
        Arc::new(Settings::default()),
    );

    let response = service.analyze(&request, None).unwrap();

    assert_eq!(request.clothing_bones[0].parent_name.as_deref(), Some("Outfits"));
    assert_eq!(response.estimated_moved_bones, 1);
    assert_eq!(response.estimated_moved_smrs, 1);
    assert_eq!(response.estimated_deleted_objects, 2);
    assert!(response.duplicate_avatar_bone_names.is_empty());
}
