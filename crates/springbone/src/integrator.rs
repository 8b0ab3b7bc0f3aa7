//! # Single-joint integration step
//!
//! Verlet-style update of one tail particle. Every term is applied in world
//! space; the caller converts state in and out of the chain's storage space.

use glam::{Quat, Vec3};

use crate::collision::{push_out, WorldShape};
use crate::math;
use crate::state::JointRuntime;
use crate::types::JointParams;

/// Everything a joint needs from the rest of the frame.
#[derive(Debug, Clone, Copy)]
pub struct JointStep<'a> {
    /// World position of the bone head, after every ancestor was solved.
    pub head: Vec3,
    /// World orientation of the bone before its own spring rotation.
    pub head_rotation: Quat,
    pub params: &'a JointParams,
    pub colliders: &'a [WorldShape],
    pub gravity_scale: f32,
}

impl JointStep<'_> {
    /// Rest direction carried into world space through the head orientation.
    #[must_use]
    pub fn rest_direction(&self, state: &JointRuntime) -> Vec3 {
        self.head_rotation * state.rest_direction
    }
}

/// Advance `state` (world space) by `dt` seconds and return the world-space
/// rotation that swings the bone from its rest direction onto the new tail.
///
/// Zero-length joints are left untouched and rotate by identity.
pub fn integrate(state: &mut JointRuntime, step: &JointStep<'_>, dt: f32) -> Quat {
    if state.rest_length <= math::EPSILON {
        return Quat::IDENTITY;
    }
    let params = step.params;
    let rest_dir = step.rest_direction(state);

    let inertia = state.velocity() * (1.0 - params.drag);
    let stiffness = rest_dir * params.stiffness * dt;
    let gravity = params.gravity_dir * params.gravity_power * step.gravity_scale * dt;
    let candidate = state.current_tail + inertia + stiffness + gravity;

    let fallbacks = [state.current_tail - step.head, rest_dir];
    let mut next = math::project_to_length(step.head, candidate, state.rest_length, &fallbacks);

    for shape in step.colliders {
        if let Some(pushed) = push_out(shape.as_surface(), next, params.hit_radius) {
            next = math::project_to_length(step.head, pushed, state.rest_length, &fallbacks);
        }
    }

    state.previous_tail = state.current_tail;
    state.current_tail = next;

    math::shortest_arc(rest_dir, next - step.head)
}
