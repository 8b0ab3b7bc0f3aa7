//! # Collider model and push-out response
//!
//! Colliders are static shapes attached to rig bones. Every frame they are
//! carried into world space from the rig's current pose and joints are pushed
//! out of them. All shapes answer the same question, "where is the closest
//! point of your surface", so the response below is written once for every
//! shape.

mod capsule;
mod plane;
mod sphere;

pub use capsule::Capsule;
pub use plane::Plane;
pub use sphere::Sphere;

use glam::Vec3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::SpringError;
use crate::math;
use crate::rig::RigPose;
use crate::transform::Transform;

/// Closest surface point of a shape relative to a query point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    /// Closest point on the surface, in world space.
    pub point: Vec3,
    /// Outward surface normal at `point`.
    pub normal: Vec3,
    /// Signed distance from the surface to the query point; negative inside.
    pub distance: f32,
}

/// Shapes the solver can push joints out of.
pub trait SurfaceQuery {
    /// Closest surface point to `point`, or `None` when the outward direction
    /// is undefined there (e.g. the exact center of a sphere).
    fn closest_surface_point(&self, point: Vec3) -> Option<SurfaceHit>;
}

/// Move `point` out to `hit_radius` above the surface if it is closer than
/// that. Returns `None` when no correction is needed.
#[must_use]
pub fn push_out(shape: &dyn SurfaceQuery, point: Vec3, hit_radius: f32) -> Option<Vec3> {
    let hit = shape.closest_surface_point(point)?;
    let penetration = hit_radius - hit.distance;
    if penetration > 0.0 {
        Some(point + hit.normal * penetration)
    } else {
        None
    }
}

/// Shape of a collider, expressed in the space of the bone it is attached to.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "shape", rename_all = "snake_case"))]
pub enum ColliderShape {
    Sphere { offset: Vec3, radius: f32 },
    Capsule { offset: Vec3, tail: Vec3, radius: f32 },
    /// Half-space whose boundary passes through `offset`.
    Plane { offset: Vec3, normal: Vec3 },
}

impl ColliderShape {
    /// Carry the shape into the space `bone` is expressed in.
    #[must_use]
    pub fn placed(&self, bone: &Transform) -> WorldShape {
        match *self {
            ColliderShape::Sphere { offset, radius } => WorldShape::Sphere(Sphere {
                center: bone.transform_point(offset),
                radius,
            }),
            ColliderShape::Capsule {
                offset,
                tail,
                radius,
            } => WorldShape::Capsule(Capsule {
                start: bone.transform_point(offset),
                end: bone.transform_point(tail),
                radius,
            }),
            ColliderShape::Plane { offset, normal } => WorldShape::Plane(Plane {
                point: bone.transform_point(offset),
                normal: bone.transform_vector(normal).normalize_or_zero(),
            }),
        }
    }

    fn validate(&self) -> Result<(), &'static str> {
        match *self {
            ColliderShape::Sphere { offset, radius } => {
                if !offset.is_finite() || !radius.is_finite() || radius < 0.0 {
                    return Err("sphere needs a finite, non-negative radius");
                }
            }
            ColliderShape::Capsule {
                offset,
                tail,
                radius,
            } => {
                if !offset.is_finite() || !tail.is_finite() || !radius.is_finite() || radius < 0.0 {
                    return Err("capsule needs finite ends and a non-negative radius");
                }
            }
            ColliderShape::Plane { offset, normal } => {
                if !offset.is_finite() || math::direction(normal).is_none() {
                    return Err("plane needs a finite point and a non-zero normal");
                }
            }
        }
        Ok(())
    }
}

/// A collider shape, optionally attached to a rig bone.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Collider {
    /// Bone the shape follows. `None` means the shape is in world space.
    #[cfg_attr(feature = "serde", serde(default))]
    pub bone: Option<String>,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub shape: ColliderShape,
}

impl Collider {
    #[must_use]
    pub fn world(shape: ColliderShape) -> Self {
        Self { bone: None, shape }
    }

    #[must_use]
    pub fn attached(bone: impl Into<String>, shape: ColliderShape) -> Self {
        Self {
            bone: Some(bone.into()),
            shape,
        }
    }

    /// World-space shape for the rig's current pose. `None` when the bone is
    /// not in the rig.
    #[must_use]
    pub fn resolve<R: RigPose + ?Sized>(&self, rig: &R) -> Option<WorldShape> {
        match &self.bone {
            None => Some(self.shape.placed(&Transform::IDENTITY)),
            Some(bone) => rig.world_transform(bone).map(|t| self.shape.placed(&t)),
        }
    }
}

/// Named set of colliders that chains refer to.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ColliderGroup {
    pub name: String,
    pub colliders: Vec<Collider>,
}

impl ColliderGroup {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            colliders: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_collider(mut self, collider: Collider) -> Self {
        self.colliders.push(collider);
        self
    }

    pub(crate) fn validate(&self) -> Result<(), SpringError> {
        for collider in &self.colliders {
            collider
                .shape
                .validate()
                .map_err(|reason| SpringError::InvalidCollider {
                    group: self.name.clone(),
                    reason,
                })?;
        }
        Ok(())
    }

    /// Resolve every collider against the rig, skipping those whose bone is
    /// missing.
    #[must_use]
    pub fn resolve<R: RigPose + ?Sized>(&self, rig: &R) -> Vec<WorldShape> {
        self.colliders
            .iter()
            .filter_map(|collider| {
                let shape = collider.resolve(rig);
                if shape.is_none() {
                    tracing::debug!(
                        group = %self.name,
                        bone = ?collider.bone,
                        "collider bone missing from rig, skipping"
                    );
                }
                shape
            })
            .collect()
    }
}

/// A collider resolved into world space for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WorldShape {
    Sphere(Sphere),
    Capsule(Capsule),
    Plane(Plane),
}

impl WorldShape {
    #[must_use]
    pub fn as_surface(&self) -> &dyn SurfaceQuery {
        match self {
            WorldShape::Sphere(s) => s,
            WorldShape::Capsule(c) => c,
            WorldShape::Plane(p) => p,
        }
    }
}

impl SurfaceQuery for WorldShape {
    fn closest_surface_point(&self, point: Vec3) -> Option<SurfaceHit> {
        self.as_surface().closest_surface_point(point)
    }
}
