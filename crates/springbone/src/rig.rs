//! # Rig seam
//!
//! The solver never owns the skeleton. Each frame it asks the host for the
//! animated world transform of the bones it needs through [`RigPose`].

use std::collections::HashMap;

use crate::transform::Transform;

/// Read-only view of the host skeleton's animated pose.
pub trait RigPose: Send + Sync {
    /// World transform of `bone` before spring rotations are applied, or
    /// `None` when the rig has no such bone.
    fn world_transform(&self, bone: &str) -> Option<Transform>;
}

/// A pose copied out of the host once per frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RigSnapshot {
    bones: HashMap<String, Transform>,
}

impl RigSnapshot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_bone(mut self, bone: impl Into<String>, transform: Transform) -> Self {
        self.insert(bone, transform);
        self
    }

    pub fn insert(&mut self, bone: impl Into<String>, transform: Transform) -> Option<Transform> {
        self.bones.insert(bone.into(), transform)
    }

    pub fn remove(&mut self, bone: &str) -> Option<Transform> {
        self.bones.remove(bone)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// Every bone carried through the owning object's transform.
    #[must_use]
    pub fn placed(&self, object: Transform) -> Self {
        self.bones
            .iter()
            .map(|(name, t)| (name.clone(), object * *t))
            .collect()
    }
}

impl RigPose for RigSnapshot {
    fn world_transform(&self, bone: &str) -> Option<Transform> {
        self.bones.get(bone).copied()
    }
}

impl<S: Into<String>> FromIterator<(S, Transform)> for RigSnapshot {
    fn from_iter<I: IntoIterator<Item = (S, Transform)>>(iter: I) -> Self {
        Self {
            bones: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
