//! Runtime configuration, read from JSON.
//!
//! Every field has a default, so an empty object (or no file at all) runs the
//! stock demo.

use anyhow::{Context, Result};
use glam::Vec3;
use serde::Deserialize;
use springbone::{JointParams, SolverConfig};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub solver: SolverConfig,
    pub scene: SceneConfig,
    pub hair: JointParams,
    pub tail: JointParams,
}

/// Shape of the demo rig. Changing it needs a restart.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub strands: usize,
    pub strand_nodes: usize,
    pub tail_nodes: usize,
    /// Peak sideways travel of the hips, in metres.
    pub sway_amplitude: f32,
    /// Sway cycles per second.
    pub sway_frequency: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            strands: 12,
            strand_nodes: 5,
            tail_nodes: 6,
            sway_amplitude: 0.3,
            sway_frequency: 0.5,
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            solver: SolverConfig::default(),
            scene: SceneConfig::default(),
            hair: JointParams::default()
                .with_stiffness(0.4)
                .with_drag(0.4)
                .with_gravity(0.5, Vec3::NEG_Z)
                .with_hit_radius(0.01),
            tail: JointParams::default()
                .with_stiffness(0.8)
                .with_drag(0.3)
                .with_gravity(0.2, Vec3::NEG_Z)
                .with_hit_radius(0.03),
        }
    }
}

impl RuntimeConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("parsing config {}", path.display()))
    }
}
