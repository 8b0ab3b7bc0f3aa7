//! Chain and joint definitions, plus the per-joint output of a solve.

use glam::{Quat, Vec3};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::SpringError;

/// Stable handle of a chain registered with [`crate::SpringSim`].
///
/// Ids are handed out in increasing order and never reused, so sorting by id
/// is the order chains were added in.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChainId(pub(crate) u32);

impl ChainId {
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identity of one simulated joint: the bone it drives within a chain.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct JointKey {
    pub chain: ChainId,
    pub bone: String,
}

impl JointKey {
    #[must_use]
    pub fn new(chain: ChainId, bone: impl Into<String>) -> Self {
        Self {
            chain,
            bone: bone.into(),
        }
    }
}

/// Physical parameters of one joint.
///
/// Defaults follow the VRM spring-bone convention; gravity points down the
/// host's Z axis.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct JointParams {
    /// Pull back toward the rest direction, per second. Range `[0, 1]`.
    pub stiffness: f32,
    /// Strength of the gravity term, per second. `>= 0`.
    pub gravity_power: f32,
    /// World-space gravity direction. Normalised on validation.
    pub gravity_dir: Vec3,
    /// Share of the previous step's velocity removed each step. Range `[0, 1]`.
    pub drag: f32,
    /// Radius of the tail sphere used against colliders. `>= 0`.
    pub hit_radius: f32,
}

impl Default for JointParams {
    fn default() -> Self {
        Self {
            stiffness: 1.0,
            gravity_power: 0.0,
            gravity_dir: Vec3::NEG_Z,
            drag: 0.5,
            hit_radius: 0.0,
        }
    }
}

impl JointParams {
    #[must_use]
    pub fn with_stiffness(mut self, stiffness: f32) -> Self {
        self.stiffness = stiffness;
        self
    }

    #[must_use]
    pub fn with_gravity(mut self, power: f32, dir: Vec3) -> Self {
        self.gravity_power = power;
        self.gravity_dir = dir;
        self
    }

    #[must_use]
    pub fn with_drag(mut self, drag: f32) -> Self {
        self.drag = drag;
        self
    }

    #[must_use]
    pub fn with_hit_radius(mut self, hit_radius: f32) -> Self {
        self.hit_radius = hit_radius;
        self
    }

    /// Check the documented ranges and normalise `gravity_dir`.
    ///
    /// A zero gravity direction is only accepted when `gravity_power` is zero.
    ///
    /// # Errors
    ///
    /// A short reason naming the first parameter that is out of range or not
    /// finite.
    pub fn validated(mut self) -> Result<Self, &'static str> {
        let finite = self.stiffness.is_finite()
            && self.gravity_power.is_finite()
            && self.drag.is_finite()
            && self.hit_radius.is_finite()
            && self.gravity_dir.is_finite();
        if !finite {
            return Err("parameters must be finite");
        }
        if !(0.0..=1.0).contains(&self.stiffness) {
            return Err("stiffness must be within [0, 1]");
        }
        if !(0.0..=1.0).contains(&self.drag) {
            return Err("drag must be within [0, 1]");
        }
        if self.gravity_power < 0.0 {
            return Err("gravity power must not be negative");
        }
        if self.hit_radius < 0.0 {
            return Err("hit radius must not be negative");
        }
        match crate::math::direction(self.gravity_dir) {
            Some(dir) => self.gravity_dir = dir,
            None if self.gravity_power == 0.0 => self.gravity_dir = Vec3::ZERO,
            None => return Err("gravity direction must not be zero"),
        }
        Ok(self)
    }
}

/// One node of a chain: the bone it drives and that bone's parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct JointDef {
    pub bone: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub params: JointParams,
}

impl JointDef {
    #[must_use]
    pub fn new(bone: impl Into<String>, params: JointParams) -> Self {
        Self {
            bone: bone.into(),
            params,
        }
    }
}

/// An ordered list of bones from root to tip.
///
/// Each consecutive pair of nodes is one simulated joint: node `i` is the head
/// and node `i + 1`'s head is its tail. The last node only marks the tip, so
/// its parameters are never used.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChainDef {
    pub name: String,
    pub joints: Vec<JointDef>,
    /// Names of the collider groups this chain collides with.
    #[cfg_attr(feature = "serde", serde(default))]
    pub collider_groups: Vec<String>,
    /// Bone whose space tail state is kept in. Inertia is then measured
    /// relative to that bone rather than the world.
    #[cfg_attr(feature = "serde", serde(default))]
    pub center: Option<String>,
}

impl ChainDef {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_joint(mut self, bone: impl Into<String>, params: JointParams) -> Self {
        self.joints.push(JointDef::new(bone, params));
        self
    }

    #[must_use]
    pub fn with_collider_group(mut self, group: impl Into<String>) -> Self {
        self.collider_groups.push(group.into());
        self
    }

    #[must_use]
    pub fn with_center(mut self, bone: impl Into<String>) -> Self {
        self.center = Some(bone.into());
        self
    }

    /// Number of simulated joints (node pairs).
    #[must_use]
    pub fn joint_count(&self) -> usize {
        self.joints.len().saturating_sub(1)
    }

    #[must_use]
    pub fn position_of(&self, bone: &str) -> Option<usize> {
        self.joints.iter().position(|j| j.bone == bone)
    }

    /// Validate topology and every joint's parameters, returning the
    /// definition with normalised gravity directions.
    pub(crate) fn validated(mut self) -> Result<Self, SpringError> {
        if self.joints.len() < 2 {
            return Err(SpringError::EmptyChain(self.name));
        }
        for (i, joint) in self.joints.iter().enumerate() {
            if self.joints[..i].iter().any(|j| j.bone == joint.bone) {
                return Err(SpringError::DuplicateBone {
                    chain: self.name.clone(),
                    bone: joint.bone.clone(),
                });
            }
        }
        for joint in &mut self.joints {
            joint.params =
                joint
                    .params
                    .validated()
                    .map_err(|reason| SpringError::InvalidParameter {
                        chain: self.name.clone(),
                        bone: joint.bone.clone(),
                        reason,
                    })?;
        }
        Ok(self)
    }
}

/// Result of solving one joint for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct JointPose {
    pub chain: ChainId,
    pub bone: String,
    /// World-space head of the bone.
    pub head: Vec3,
    /// World-space simulated tail.
    pub tail: Vec3,
    /// Final world orientation of the bone.
    pub world_rotation: Quat,
    /// Rotation to post-multiply onto the bone's animated local rotation.
    pub local_rotation: Quat,
}

/// Flat, GPU-friendly copy of a [`JointPose`].
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PoseRecord {
    /// `x, y, z, w`
    pub local_rotation: [f32; 4],
    pub tail: [f32; 3],
    pub chain: u32,
}

impl From<&JointPose> for PoseRecord {
    fn from(pose: &JointPose) -> Self {
        Self {
            local_rotation: pose.local_rotation.to_array(),
            tail: pose.tail.to_array(),
            chain: pose.chain.0,
        }
    }
}
