//! Rigid transforms attached to scene nodes.
//!
//! The merge never interprets poses; it only has to keep the world-space pose
//! of a node fixed while changing its parent.

use glam::{Affine3A, Quat, Vec3};

/// Translation, rotation and scale of a node, relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Pose {
    pub const IDENTITY: Pose = Pose {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn new(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn to_affine(&self) -> Affine3A {
        Affine3A::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    pub fn from_affine(affine: &Affine3A) -> Self {
        let (scale, rotation, translation) = affine.to_scale_rotation_translation();
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Compose `self` (a parent's world pose) with a child's local pose.
    pub fn then(&self, local: &Pose) -> Pose {
        Pose::from_affine(&(self.to_affine() * local.to_affine()))
    }

    /// Express this world pose in the space of `parent_world`.
    pub fn relative_to(&self, parent_world: &Pose) -> Pose {
        Pose::from_affine(&(parent_world.to_affine().inverse() * self.to_affine()))
    }

    /// Compare the transforms rather than the components, so that `q` and `-q`
    /// are treated as the same rotation.
    pub fn abs_diff_eq(&self, other: &Pose, max_abs_diff: f32) -> bool {
        self.to_affine()
            .abs_diff_eq(other.to_affine(), max_abs_diff)
    }
}
