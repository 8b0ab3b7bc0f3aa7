//! Half-space collider. Everything behind the plane counts as inside.

use glam::Vec3;

use super::{SurfaceHit, SurfaceQuery};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Any point on the boundary.
    pub point: Vec3,
    /// Unit normal pointing out of the solid side.
    pub normal: Vec3,
}

impl SurfaceQuery for Plane {
    fn closest_surface_point(&self, point: Vec3) -> Option<SurfaceHit> {
        if self.normal == Vec3::ZERO {
            return None;
        }
        let distance = (point - self.point).dot(self.normal);
        Some(SurfaceHit {
            point: point - self.normal * distance,
            normal: self.normal,
            distance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::push_out;

    fn floor() -> Plane {
        Plane {
            point: Vec3::ZERO,
            normal: Vec3::Z,
        }
    }

    #[test]
    fn point_below_floor_is_lifted() {
        let pushed = push_out(&floor(), Vec3::new(1.0, 2.0, -0.3), 0.1).unwrap();
        assert!((pushed - Vec3::new(1.0, 2.0, 0.1)).length() < 1e-6);
    }

    #[test]
    fn point_above_floor_is_untouched() {
        assert!(push_out(&floor(), Vec3::new(0.0, 0.0, 0.3), 0.1).is_none());
        let hit = floor().closest_surface_point(Vec3::new(0.0, 0.0, 0.3)).unwrap();
        assert!((hit.distance - 0.3).abs() < 1e-6);
    }
}
