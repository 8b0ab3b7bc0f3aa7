//! # Chain solve
//!
//! Walks one chain root to tip. Node `i`'s pose is rebuilt from node `i - 1`'s
//! spring-rotated transform and the rig's parent-relative offset, so every
//! joint's head sits on its parent's freshly solved tail.

use crate::collision::WorldShape;
use crate::integrator::{integrate, JointStep};
use crate::rig::RigPose;
use crate::state::ChainSlots;
use crate::transform::Transform;
use crate::types::{ChainDef, ChainId, JointPose};

/// Per-frame inputs shared by every joint of a chain.
pub(crate) struct ChainFrame<'a, R: ?Sized> {
    pub rig: &'a R,
    pub colliders: &'a [WorldShape],
    pub gravity_scale: f32,
    pub dt: f32,
}

/// Space the chain's tails are stored in: its center bone, or the world.
fn storage_space<R: RigPose + ?Sized>(
    def: &ChainDef,
    slots: &mut ChainSlots,
    rig: &R,
) -> Transform {
    let Some(center) = def.center.as_deref() else {
        return Transform::IDENTITY;
    };
    match rig.world_transform(center) {
        Some(space) => space,
        None => {
            if slots.first_missing_center() {
                tracing::warn!(
                    chain = %def.name,
                    center,
                    "center bone missing from rig, simulating in world space"
                );
            }
            Transform::IDENTITY
        }
    }
}

/// Solve every joint of `def` for one frame and return their poses in chain
/// order.
///
/// A node missing from the rig breaks propagation: it is not simulated and
/// the next node starts again from its own rig transform.
pub(crate) fn solve_chain<R: RigPose + ?Sized>(
    id: ChainId,
    def: &ChainDef,
    slots: &mut ChainSlots,
    frame: &ChainFrame<'_, R>,
) -> Vec<JointPose> {
    let space = storage_space(def, slots, frame.rig);
    let space_inv = space.inverse();

    let mut poses = Vec::with_capacity(def.joint_count());
    // (rig transform, solved transform) of the previous node.
    let mut parent: Option<(Transform, Transform)> = None;

    for pair in def.joints.windows(2) {
        let (node, next) = (&pair[0], &pair[1]);
        let rig = frame.rig;
        let (Some(rig_head), Some(rig_tail)) =
            (rig.world_transform(&node.bone), rig.world_transform(&next.bone))
        else {
            tracing::debug!(
                chain = %def.name,
                bone = %node.bone,
                "joint bones missing from rig, skipping"
            );
            parent = None;
            continue;
        };

        let head = match parent {
            Some((parent_rig, parent_solved)) => parent_solved * (parent_rig.inverse() * rig_head),
            None => rig_head,
        };

        let state = slots.get_or_init(
            &node.bone,
            &(space_inv * rig_head),
            space_inv.transform_point(rig_tail.translation),
        );

        let mut world = state.transformed(&space);
        let step = JointStep {
            head: head.translation,
            head_rotation: head.rotation,
            params: &node.params,
            colliders: frame.colliders,
            gravity_scale: frame.gravity_scale,
        };
        let delta = integrate(&mut world, &step, frame.dt);
        *state = world.transformed(&space_inv);

        let world_rotation = (delta * head.rotation).normalize();
        poses.push(JointPose {
            chain: id,
            bone: node.bone.clone(),
            head: head.translation,
            tail: world.current_tail,
            world_rotation,
            local_rotation: (head.rotation.inverse() * world_rotation).normalize(),
        });
        parent = Some((
            rig_head,
            Transform::from_rotation_translation(world_rotation, head.translation),
        ));
    }

    tracing::trace!(chain = %def.name, joints = poses.len(), "chain solved");
    poses
}
