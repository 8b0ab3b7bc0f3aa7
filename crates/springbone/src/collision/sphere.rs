//! Sphere collider

use glam::Vec3;

use super::{SurfaceHit, SurfaceQuery};
use crate::math;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl SurfaceQuery for Sphere {
    fn closest_surface_point(&self, point: Vec3) -> Option<SurfaceHit> {
        let delta = point - self.center;
        let normal = math::direction(delta)?;
        Some(SurfaceHit {
            point: self.center + normal * self.radius,
            normal,
            distance: delta.length() - self.radius,
        })
    }
}
