//! # Demo rig
//!
//! A swaying pair of hips with a head on top. Hair strands fan out around the
//! head and collide with it; a tail hangs off the back of the hips and
//! collides with the body. The rig is posed procedurally from the clock.

use anyhow::{anyhow, Result};
use glam::{Quat, Vec3};
use springbone::{
    ChainDef, ChainId, Collider, ColliderGroup, ColliderShape, RigSnapshot, SpringSim, Transform,
};
use std::f32::consts::TAU;

use crate::config::{RuntimeConfig, SceneConfig};

const HIPS: &str = "hips";
const HEAD: &str = "head";
const HEAD_RADIUS: f32 = 0.12;
const HAIR_SPACING: f32 = 0.05;
const TAIL_SPACING: f32 = 0.1;

pub struct DemoScene {
    scene: SceneConfig,
    hair: Vec<ChainId>,
    tail: ChainId,
}

fn hair_bone(strand: usize, node: usize) -> String {
    format!("hair{strand}_{node}")
}

fn tail_bone(node: usize) -> String {
    format!("tail{node}")
}

#[allow(clippy::cast_precision_loss)]
fn strand_angle(strand: usize, strands: usize) -> f32 {
    strand as f32 / strands.max(1) as f32 * TAU
}

impl DemoScene {
    /// Register the demo's collider groups and chains with `sim`.
    pub fn build(sim: &mut SpringSim, config: &RuntimeConfig) -> Result<Self> {
        sim.set_config(config.solver.clone())?;
        sim.insert_collider_group(ColliderGroup::new(HEAD).with_collider(Collider::attached(
            HEAD,
            ColliderShape::Sphere {
                offset: Vec3::ZERO,
                radius: HEAD_RADIUS,
            },
        )))?;
        sim.insert_collider_group(ColliderGroup::new("body").with_collider(Collider::attached(
            HIPS,
            ColliderShape::Capsule {
                offset: Vec3::new(0.0, 0.0, -0.3),
                tail: Vec3::new(0.0, 0.0, 0.4),
                radius: 0.1,
            },
        )))?;

        let scene = config.scene.clone();
        let hair = (0..scene.strands)
            .map(|s| {
                let def = (0..scene.strand_nodes).fold(
                    ChainDef::new(format!("hair{s}")).with_collider_group(HEAD),
                    |def, n| def.with_joint(hair_bone(s, n), config.hair),
                );
                sim.add_chain(def)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let tail_def = (0..scene.tail_nodes).fold(
            ChainDef::new("tail").with_collider_group("body").with_center(HIPS),
            |def, n| def.with_joint(tail_bone(n), config.tail),
        );
        let tail = sim.add_chain(tail_def)?;

        tracing::info!(
            strands = hair.len(),
            tail_nodes = scene.tail_nodes,
            "demo scene built"
        );
        Ok(Self { scene, hair, tail })
    }

    /// Push new solver settings and joint parameters into a running `sim`.
    /// Runtime state is kept. A config that fails validation changes nothing.
    pub fn apply(&self, sim: &mut SpringSim, config: &RuntimeConfig) -> Result<()> {
        config.solver.validate()?;
        let hair = config
            .hair
            .validated()
            .map_err(|reason| anyhow!("invalid hair parameters: {reason}"))?;
        let tail = config
            .tail
            .validated()
            .map_err(|reason| anyhow!("invalid tail parameters: {reason}"))?;
        if config.scene != self.scene {
            tracing::warn!("scene layout changes take effect on restart");
        }

        for (s, &id) in self.hair.iter().enumerate() {
            for n in 0..self.scene.strand_nodes {
                sim.set_joint_params(id, &hair_bone(s, n), hair)?;
            }
        }
        for n in 0..self.scene.tail_nodes {
            sim.set_joint_params(self.tail, &tail_bone(n), tail)?;
        }
        sim.set_config(config.solver.clone())?;
        Ok(())
    }

    /// Animated pose of the whole rig at `time` seconds.
    pub fn rig_at(&self, time: f32) -> RigSnapshot {
        let phase = time * self.scene.sway_frequency * TAU;
        let hips = Transform::from_rotation_translation(
            Quat::from_rotation_z(0.3 * phase.cos()),
            Vec3::new(self.scene.sway_amplitude * phase.sin(), 0.0, 1.0),
        );
        let head = hips * Transform::from_translation(Vec3::new(0.0, 0.0, 0.6));

        let mut rig = RigSnapshot::new().with_bone(HIPS, hips).with_bone(HEAD, head);
        for s in 0..self.scene.strands {
            let turn = Quat::from_rotation_z(strand_angle(s, self.scene.strands));
            for n in 0..self.scene.strand_nodes {
                #[allow(clippy::cast_precision_loss)]
                let along = HEAD_RADIUS + 0.02 + n as f32 * HAIR_SPACING;
                let local =
                    Transform::from_rotation_translation(turn, turn * Vec3::new(0.0, along, 0.04));
                rig.insert(hair_bone(s, n), head * local);
            }
        }
        // Tail bones point along -Y, out of the back of the hips.
        let back = Quat::from_rotation_z(std::f32::consts::PI);
        for n in 0..self.scene.tail_nodes {
            #[allow(clippy::cast_precision_loss)]
            let along = 0.15 + n as f32 * TAIL_SPACING;
            rig.insert(
                tail_bone(n),
                hips * Transform::from_rotation_translation(back, Vec3::new(0.0, -along, -0.2)),
            );
        }
        rig
    }

    pub fn hair_tip(&self, sim: &SpringSim, strand: usize) -> Option<Vec3> {
        let id = *self.hair.get(strand)?;
        let last = self.scene.strand_nodes.checked_sub(2)?;
        sim.tail(id, &hair_bone(strand, last))
    }

    pub fn tail_tip(&self, sim: &SpringSim) -> Option<Vec3> {
        let last = self.scene.tail_nodes.checked_sub(2)?;
        sim.tail(self.tail, &tail_bone(last))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use springbone::RigPose;

    fn small() -> RuntimeConfig {
        RuntimeConfig {
            scene: SceneConfig {
                strands: 4,
                strand_nodes: 4,
                tail_nodes: 3,
                ..SceneConfig::default()
            },
            ..RuntimeConfig::default()
        }
    }

    #[test]
    fn every_joint_gets_a_pose() {
        let config = small();
        let mut sim = SpringSim::new();
        let scene = DemoScene::build(&mut sim, &config).unwrap();
        sim.advance(&scene.rig_at(0.0), 1.0 / 60.0).unwrap();
        assert_eq!(sim.poses().len(), 4 * 3 + 2);
        assert!(scene.hair_tip(&sim, 3).is_some());
        assert!(scene.hair_tip(&sim, 4).is_none());
        assert!(scene.tail_tip(&sim).is_some());
    }

    #[test]
    fn hair_stays_outside_head() {
        let config = small();
        let mut sim = SpringSim::new();
        let scene = DemoScene::build(&mut sim, &config).unwrap();
        let mut rig = scene.rig_at(0.0);
        for frame in 0..240_u16 {
            rig = scene.rig_at(f32::from(frame) / 60.0);
            sim.advance(&rig, 1.0 / 60.0).unwrap();
        }
        let head = rig.world_transform(HEAD).unwrap().translation;
        for pose in sim.poses().iter().filter(|p| p.bone.starts_with("hair")) {
            assert!(pose.tail.is_finite(), "{} diverged", pose.bone);
            assert!(
                (pose.tail - head).length() > HEAD_RADIUS * 0.9,
                "{} sank into the head: {:?}",
                pose.bone,
                pose.tail
            );
        }
    }

    #[test]
    fn applying_config_keeps_state() {
        let mut config = small();
        let mut sim = SpringSim::new();
        let scene = DemoScene::build(&mut sim, &config).unwrap();
        sim.advance(&scene.rig_at(0.0), 1.0 / 60.0).unwrap();

        config.hair = config.hair.with_stiffness(1.0);
        config.solver.gravity_scale = 0.5;
        scene.apply(&mut sim, &config).unwrap();
        assert!((sim.config().gravity_scale - 0.5).abs() < f32::EPSILON);
        assert!(!sim.poses().is_empty());
        let first = sim.chain_ids().next().unwrap();
        assert_eq!(sim.chain_status(first), Ok(springbone::ChainStatus::Settled));
    }

    #[test]
    fn rejected_config_changes_nothing() {
        let mut config = small();
        let mut sim = SpringSim::new();
        let scene = DemoScene::build(&mut sim, &config).unwrap();
        sim.advance(&scene.rig_at(0.0), 1.0 / 60.0).unwrap();
        let hair_stiffness = config.hair.stiffness;

        config.solver.gravity_scale = 0.5;
        config.hair = config.hair.with_stiffness(1.0);
        config.tail = config.tail.with_drag(2.0);
        assert!(scene.apply(&mut sim, &config).is_err());

        assert_eq!(sim.config(), &small().solver);
        let first = sim.chain_ids().next().unwrap();
        let params = sim.chain(first).unwrap().joints[0].params;
        assert!((params.stiffness - hair_stiffness).abs() < f32::EPSILON);
    }
}
