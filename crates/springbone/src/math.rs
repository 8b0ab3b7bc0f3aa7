//! Geometric helpers shared by the integrator and the collider shapes.

use glam::{Quat, Vec3};

/// Lengths at or below this are treated as zero.
pub const EPSILON: f32 = 1e-6;

/// Unit vector along `v`, or `None` when `v` is too short (or not finite) to
/// have a direction.
///
/// `v` is scaled by its largest component before normalizing, so vectors whose
/// length would overflow `f32` still yield a direction.
#[must_use]
pub fn direction(v: Vec3) -> Option<Vec3> {
    let scale = v.abs().max_element();
    if !scale.is_finite() || scale <= 0.0 {
        return None;
    }
    let scaled = v / scale;
    let length = scaled.length();
    if length.is_finite() && length * scale > EPSILON {
        Some(scaled / length)
    } else {
        None
    }
}

/// Smallest rotation taking direction `from` onto direction `to`.
///
/// Identity when either input is degenerate. Opposite directions rotate by
/// half a turn about an arbitrary perpendicular axis.
#[must_use]
pub fn shortest_arc(from: Vec3, to: Vec3) -> Quat {
    match (direction(from), direction(to)) {
        (Some(a), Some(b)) => Quat::from_rotation_arc(a, b),
        _ => Quat::IDENTITY,
    }
}

/// Reproject `point` onto the sphere of radius `length` around `anchor`.
///
/// When `point` coincides with `anchor` the first usable entry of `fallbacks`
/// supplies the direction; with none usable the result lies along +Y.
#[must_use]
pub fn project_to_length(anchor: Vec3, point: Vec3, length: f32, fallbacks: &[Vec3]) -> Vec3 {
    let dir = direction(point - anchor)
        .or_else(|| fallbacks.iter().copied().find_map(direction))
        .unwrap_or(Vec3::Y);
    anchor + dir * length
}

/// Closest point to `point` on the segment `start..end`.
#[must_use]
pub fn closest_point_on_segment(start: Vec3, end: Vec3, point: Vec3) -> Vec3 {
    let segment = end - start;
    let length_sq = segment.length_squared();
    if length_sq <= EPSILON * EPSILON {
        return start;
    }
    let t = ((point - start).dot(segment) / length_sq).clamp(0.0, 1.0);
    start + segment * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_rejects_zero() {
        assert!(direction(Vec3::ZERO).is_none());
        assert!(direction(Vec3::splat(f32::NAN)).is_none());
        assert_eq!(direction(Vec3::new(0.0, 0.0, -3.0)), Some(Vec3::NEG_Z));
    }

    #[test]
    fn direction_survives_overflowing_length() {
        let v = Vec3::new(0.0, 3e38, -3e38);
        assert!(v.length().is_infinite());
        let dir = direction(v).expect("finite components have a direction");
        let expected = Vec3::new(0.0, 1.0, -1.0).normalize();
        assert!((dir - expected).length() < 1e-6, "got {dir}");
        assert!(direction(Vec3::new(1.0, f32::NAN, 0.0)).is_none());
        assert!(direction(Vec3::new(f32::INFINITY, 0.0, 0.0)).is_none());
    }

    #[test]
    fn shortest_arc_maps_from_onto_to() {
        let from = Vec3::Y;
        let to = Vec3::new(0.0, 1.0, -1.0).normalize();
        let q = shortest_arc(from, to);
        assert!((q * from - to).length() < 1e-6);
        // The bone axis itself is the only thing that moves: X stays in the
        // plane perpendicular to the rotation axis.
        assert!((q * Vec3::X - Vec3::X).length() < 1e-6);
    }

    #[test]
    fn shortest_arc_handles_opposite_directions() {
        let q = shortest_arc(Vec3::Y, Vec3::NEG_Y);
        assert!((q * Vec3::Y - Vec3::NEG_Y).length() < 1e-5);
    }

    #[test]
    fn shortest_arc_degenerate_is_identity() {
        assert_eq!(shortest_arc(Vec3::ZERO, Vec3::Y), Quat::IDENTITY);
    }

    #[test]
    fn project_keeps_length() {
        let p = project_to_length(Vec3::Y, Vec3::new(0.0, 2.0, -1.0), 1.0, &[]);
        assert!((p - Vec3::new(0.0, 1.707_107, -0.707_107)).length() < 1e-5);
    }

    #[test]
    fn project_uses_fallback_when_degenerate() {
        let p = project_to_length(Vec3::ZERO, Vec3::ZERO, 2.0, &[Vec3::ZERO, Vec3::X]);
        assert_eq!(p, Vec3::new(2.0, 0.0, 0.0));
        let q = project_to_length(Vec3::ZERO, Vec3::ZERO, 2.0, &[]);
        assert_eq!(q, Vec3::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn segment_clamps_to_endpoints() {
        let a = Vec3::ZERO;
        let b = Vec3::new(0.0, 2.0, 0.0);
        assert_eq!(closest_point_on_segment(a, b, Vec3::new(1.0, 1.0, 0.0)), Vec3::Y);
        assert_eq!(closest_point_on_segment(a, b, Vec3::new(0.0, 5.0, 0.0)), b);
        assert_eq!(closest_point_on_segment(a, b, Vec3::new(0.0, -5.0, 0.0)), a);
        assert_eq!(closest_point_on_segment(a, a, Vec3::X), a);
    }
}
