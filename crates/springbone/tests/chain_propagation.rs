mod common;

use common::{assert_vec3_near, Armature};
use glam::{Quat, Vec3};
use springbone::{ChainDef, ChainId, JointParams, SpringSim};
use std::f32::consts::FRAC_PI_2;

fn hanging() -> JointParams {
    JointParams::default()
        .with_stiffness(0.0)
        .with_drag(1.0)
        .with_gravity(1.0, Vec3::NEG_Z)
}

fn three_nodes(params: JointParams) -> (SpringSim, ChainId) {
    let mut sim = SpringSim::new();
    let def = ["joint0", "joint1", "joint2"]
        .into_iter()
        .fold(ChainDef::new("spring"), |def, bone| def.with_joint(bone, params));
    let id = sim.add_chain(def).unwrap();
    (sim, id)
}

fn check_two_joint_drop(armature: &Armature) {
    let rig = armature.rig();
    let (mut sim, id) = three_nodes(hanging());

    sim.advance(&rig, 1.0).unwrap();
    assert_vec3_near(Vec3::Y, sim.pose("joint0").unwrap().head, "joint0 after 1s");
    assert_vec3_near(
        Vec3::new(0.0, 1.7071, -0.7071),
        sim.tail(id, "joint0").unwrap(),
        "joint1 after 1s",
    );
    assert_vec3_near(
        Vec3::new(0.0, 2.6824, -0.9280),
        sim.tail(id, "joint1").unwrap(),
        "joint2 after 1s",
    );
    assert_vec3_near(
        sim.tail(id, "joint0").unwrap(),
        sim.pose("joint1").unwrap().head,
        "joint1 head sits on joint0 tail",
    );

    sim.advance(&rig, 100_000.0).unwrap();
    assert_vec3_near(Vec3::Y, sim.pose("joint0").unwrap().head, "joint0 after 100000s");
    assert_vec3_near(
        Vec3::new(0.0, 1.0, -1.0),
        sim.tail(id, "joint0").unwrap(),
        "joint1 after 100000s",
    );
    assert_vec3_near(
        Vec3::new(0.0, 1.0, -2.0),
        sim.tail(id, "joint1").unwrap(),
        "joint2 after 100000s",
    );
}

#[test]
fn two_joints_extending_in_y_direction() {
    check_two_joint_drop(&Armature::straight(3));
}

#[test]
fn two_joints_extending_in_y_direction_roll() {
    let mut armature = Armature::straight(3);
    armature.rolls = vec![FRAC_PI_2, FRAC_PI_2 / 2.0, FRAC_PI_2 / 2.0, 0.0];
    check_two_joint_drop(&armature);
}

#[test]
fn two_joints_extending_in_y_direction_root_down() {
    let mut armature = Armature::straight(3);
    armature.pose[0] = Quat::from_rotation_x(-FRAC_PI_2);
    let rig = armature.rig();
    let (mut sim, id) = three_nodes(hanging());

    sim.advance(&rig, 1.0).unwrap();
    assert_vec3_near(
        Vec3::new(0.0, 0.0, -1.0),
        sim.pose("joint0").unwrap().head,
        "joint0 after 1s",
    );
    assert_vec3_near(Vec3::new(0.0, 0.0, -2.0), sim.tail(id, "joint0").unwrap(), "joint1 after 1s");
    assert_vec3_near(Vec3::new(0.0, 0.0, -3.0), sim.tail(id, "joint1").unwrap(), "joint2 after 1s");
    for pose in sim.poses() {
        assert!(
            pose.local_rotation.angle_between(Quat::IDENTITY) < 1e-4,
            "{} should not rotate",
            pose.bone
        );
    }
}

#[test]
fn bone_lengths_hold_through_swinging() {
    let mut armature = Armature::straight(4);
    let params = JointParams::default()
        .with_stiffness(0.4)
        .with_drag(0.2)
        .with_gravity(2.0, Vec3::NEG_Z);
    let mut sim = SpringSim::new();
    let def = ["joint0", "joint1", "joint2", "joint3"]
        .into_iter()
        .fold(ChainDef::new("tail"), |def, bone| def.with_joint(bone, params));
    let id = sim.add_chain(def).unwrap();

    let steps = [0.016_f32, 0.033, 0.5, 0.0, 0.016, 3.0, 0.016, 120.0];
    for (frame, dt) in steps.into_iter().enumerate() {
        #[allow(clippy::cast_precision_loss)]
        let swing = frame as f32 * 0.7;
        armature.pose[0] = Quat::from_rotation_z(swing.sin());
        sim.advance(&armature.rig(), dt).unwrap();

        for bone in ["joint0", "joint1", "joint2"] {
            let pose = sim.pose(bone).unwrap();
            let length = (sim.tail(id, bone).unwrap() - pose.head).length();
            assert!((length - 1.0).abs() < 1e-4, "frame {frame}: {bone} length {length}");
        }
    }
}

#[test]
fn huge_step_lands_on_equilibrium_at_once() {
    let rig = Armature::straight(3).rig();
    let (mut sim, id) = three_nodes(hanging());
    sim.advance(&rig, 1.0e6).unwrap();
    assert_vec3_near(Vec3::new(0.0, 1.0, -1.0), sim.tail(id, "joint0").unwrap(), "joint1");
    assert_vec3_near(Vec3::new(0.0, 1.0, -2.0), sim.tail(id, "joint1").unwrap(), "joint2");
}

#[test]
fn stiff_chain_returns_to_rest_after_root_moves() {
    let mut armature = Armature::straight(3);
    let springy = JointParams::default().with_stiffness(1.0).with_drag(0.5);
    let (mut sim, id) = three_nodes(springy);
    sim.advance(&armature.rig(), 0.016).unwrap();

    armature.object = springbone::Transform::from_translation(Vec3::new(2.0, 0.0, 0.0));
    sim.advance(&armature.rig(), 0.016).unwrap();
    let lagging = sim.tail(id, "joint1").unwrap();
    assert!(lagging.x < 2.0 - 1e-3, "tip should trail the move, got {lagging:?}");

    sim.advance(&armature.rig(), 1.0e6).unwrap();
    assert_vec3_near(Vec3::new(2.0, 2.0, 0.0), sim.tail(id, "joint0").unwrap(), "joint1 settles");
    assert_vec3_near(Vec3::new(2.0, 3.0, 0.0), sim.tail(id, "joint1").unwrap(), "joint2 settles");
}
