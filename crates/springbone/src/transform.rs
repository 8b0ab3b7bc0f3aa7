//! Rigid bone transforms
//!
//! Bones are posed with a translation and a rotation only. Scale from the host
//! rig is deliberately not modelled: bone lengths are measured in world units
//! when a joint is first initialised, and gravity is a world-space constant.

use glam::{Mat4, Quat, Vec3};
use std::ops::Mul;

/// Position + orientation of a bone in some parent space.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    #[must_use]
    pub const fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            rotation: Quat::IDENTITY,
        }
    }

    #[must_use]
    pub const fn from_rotation(rotation: Quat) -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation,
        }
    }

    #[must_use]
    pub const fn from_rotation_translation(rotation: Quat, translation: Vec3) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    /// Extract the rigid part of a 4x4 matrix, discarding scale and shear.
    #[must_use]
    pub fn from_matrix(matrix: &Mat4) -> Self {
        let (_, rotation, translation) = matrix.to_scale_rotation_translation();
        Self {
            translation,
            rotation: rotation.normalize(),
        }
    }

    /// Convert to a column-major 4x4 matrix for the host transform pipeline.
    #[must_use]
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.translation)
    }

    #[must_use]
    pub fn inverse(&self) -> Self {
        let rotation = self.rotation.inverse();
        Self {
            translation: rotation * -self.translation,
            rotation,
        }
    }

    #[must_use]
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.translation + self.rotation * point
    }

    #[must_use]
    pub fn transform_vector(&self, vector: Vec3) -> Vec3 {
        self.rotation * vector
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// `parent * child` places `child` (expressed in `parent`'s space) into the
/// space `parent` is expressed in.
impl Mul for Transform {
    type Output = Transform;

    fn mul(self, child: Transform) -> Transform {
        Transform {
            translation: self.transform_point(child.translation),
            rotation: (self.rotation * child.rotation).normalize(),
        }
    }
}
