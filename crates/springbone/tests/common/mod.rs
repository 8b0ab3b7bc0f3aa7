//! Shared rig building for the scenario tests.
#![allow(dead_code)]

use glam::{Quat, Vec3};
use springbone::{RigSnapshot, Transform};

pub fn assert_vec3_near(expected: Vec3, actual: Vec3, message: &str) {
    let threshold = 1e-4;
    assert!(
        (expected - actual).abs().max_element() <= threshold,
        "{message}: expected {expected:?}, got {actual:?}"
    );
}

/// A straight armature along +Y: `root` at the origin, then `joint0`,
/// `joint1`, ... one unit apart.
pub struct Armature {
    pub object: Transform,
    /// Rest orientation of each bone (roll about its own Y axis).
    pub rolls: Vec<f32>,
    /// Pose rotation of each bone, in the bone's rest space.
    pub pose: Vec<Quat>,
}

impl Armature {
    pub fn straight(joints: usize) -> Self {
        Self {
            object: Transform::IDENTITY,
            rolls: vec![0.0; joints + 1],
            pose: vec![Quat::IDENTITY; joints + 1],
        }
    }

    pub fn name(index: usize) -> String {
        if index == 0 {
            "root".to_string()
        } else {
            format!("joint{}", index - 1)
        }
    }

    /// Forward kinematics: every bone's world transform, object included.
    pub fn rig(&self) -> RigSnapshot {
        let mut rig = RigSnapshot::new();
        let mut parent: Option<(Transform, Transform)> = None;
        for (i, (&roll, &pose)) in self.rolls.iter().zip(&self.pose).enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let rest = Transform::from_rotation_translation(
                Quat::from_rotation_y(roll),
                Vec3::new(0.0, i as f32, 0.0),
            );
            let posed_rest = match parent {
                Some((parent_rest, parent_posed)) => parent_posed * (parent_rest.inverse() * rest),
                None => rest,
            };
            let posed = Transform::from_rotation_translation(
                posed_rest.rotation * pose,
                posed_rest.translation,
            );
            rig.insert(Self::name(i), self.object * posed);
            parent = Some((rest, posed));
        }
        rig
    }

    /// Armature-space position of a world point.
    pub fn local(&self, world: Vec3) -> Vec3 {
        self.object.inverse().transform_point(world)
    }
}
