//! Capsule collider: a segment swept by a sphere.

use glam::Vec3;

use super::{SurfaceHit, SurfaceQuery};
use crate::math;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capsule {
    pub start: Vec3,
    pub end: Vec3,
    pub radius: f32,
}

impl SurfaceQuery for Capsule {
    fn closest_surface_point(&self, point: Vec3) -> Option<SurfaceHit> {
        let core = math::closest_point_on_segment(self.start, self.end, point);
        let delta = point - core;
        let normal = math::direction(delta)?;
        Some(SurfaceHit {
            point: core + normal * self.radius,
            normal,
            distance: delta.length() - self.radius,
        })
    }
}
