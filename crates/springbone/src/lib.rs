#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Spring-bone secondary motion
//!
//! Follow-through motion for chains of skeletal joints such as hair, ears,
//! tails and cloth strips. Each frame every chain is pulled toward its rest
//! pose, weighed down by gravity, damped by drag and pushed out of colliders,
//! and a rotation per bone is handed back to the host.
//!
//! ## Key Components
//!
//! -   **Chains:** [`ChainDef`] lists the bones of a chain root first, with
//!     per-joint [`JointParams`].
//! -   **Colliders:** [`ColliderGroup`]s of spheres, capsules and planes,
//!     optionally attached to rig bones. See the [`collision`] module.
//! -   **Rig:** the host skeleton is read through [`RigPose`]; [`RigSnapshot`]
//!     is a ready-made implementation.
//! -   **Simulation:** [`SpringSim`] owns everything above plus the per-joint
//!     runtime state, and is stepped with [`SpringSim::advance`].
//!
//! ## Usage
//!
//! ```rust
//! use glam::Vec3;
//! use springbone::{ChainDef, JointParams, RigSnapshot, SpringSim, Transform};
//!
//! let rig = RigSnapshot::new()
//!     .with_bone("hair0", Transform::from_translation(Vec3::new(0.0, 1.0, 0.0)))
//!     .with_bone("hair1", Transform::from_translation(Vec3::new(0.0, 2.0, 0.0)));
//!
//! let params = JointParams::default().with_gravity(1.0, Vec3::NEG_Z);
//! let mut sim = SpringSim::new();
//! sim.add_chain(ChainDef::new("hair").with_joint("hair0", params).with_joint("hair1", params))?;
//!
//! sim.advance(&rig, 1.0 / 60.0)?;
//! for pose in sim.poses() {
//!     println!("{} -> {:?}", pose.bone, pose.local_rotation);
//! }
//! # Ok::<(), springbone::SpringError>(())
//! ```

mod chain;
pub mod collision;
pub mod config;
pub mod error;
pub mod integrator;
pub mod math;
pub mod rig;
pub mod simulation;
pub mod state;
pub mod transform;
pub mod types;

pub use collision::{Collider, ColliderGroup, ColliderShape, SurfaceHit, SurfaceQuery, WorldShape};
pub use config::SolverConfig;
pub use error::SpringError;
pub use rig::{RigPose, RigSnapshot};
pub use simulation::{ChainStatus, SpringSim};
pub use state::{JointRuntime, JointStore};
pub use transform::Transform;
pub use types::{ChainDef, ChainId, JointDef, JointKey, JointParams, JointPose, PoseRecord};
