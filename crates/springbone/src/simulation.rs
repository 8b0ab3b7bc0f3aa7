//! # Spring simulation driver
//!
//! [`SpringSim`] owns chain definitions, collider groups and the joint runtime
//! store, and advances every enabled chain once per host frame. Chains are
//! independent of each other, so with the `parallel` feature they are solved
//! on the rayon pool; output order is ascending chain id either way.

use glam::Vec3;
use std::collections::{BTreeMap, HashMap};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::chain::{solve_chain, ChainFrame};
use crate::collision::{ColliderGroup, WorldShape};
use crate::config::SolverConfig;
use crate::error::SpringError;
use crate::rig::RigPose;
use crate::state::{ChainSlots, JointStore};
use crate::types::{ChainDef, ChainId, JointParams, JointPose, PoseRecord};

/// Lifecycle of a chain's runtime state.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChainStatus {
    /// No runtime yet: the next solve initialises it from the rig.
    Uninitialized,
    /// Solved at least once since the last reset.
    Settled,
}

#[derive(Debug, Clone)]
struct ChainEntry {
    def: ChainDef,
    enabled: bool,
}

/// Main spring-bone simulation container
#[derive(Debug, Default)]
pub struct SpringSim {
    config: SolverConfig,
    chains: BTreeMap<ChainId, ChainEntry>,
    collider_groups: HashMap<String, ColliderGroup>,
    store: JointStore,
    poses: Vec<JointPose>,
    next_id: u32,
}

impl SpringSim {
    /// Create an empty simulation with the default config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty simulation with `config`.
    ///
    /// # Errors
    ///
    /// [`SpringError::InvalidConfig`] when `config` is out of range.
    pub fn with_config(config: SolverConfig) -> Result<Self, SpringError> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::default()
        })
    }

    #[must_use]
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Replace the config. Runtime state is kept.
    ///
    /// # Errors
    ///
    /// [`SpringError::InvalidConfig`] when `config` is out of range. The
    /// current config stays in place.
    pub fn set_config(&mut self, config: SolverConfig) -> Result<(), SpringError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Register a chain. It is initialised from the rig on the next
    /// [`advance`](Self::advance).
    ///
    /// # Errors
    ///
    /// The chain needs at least two distinct bones and every joint's
    /// parameters must be in range. Nothing is registered on error.
    pub fn add_chain(&mut self, def: ChainDef) -> Result<ChainId, SpringError> {
        let def = def.validated()?;
        self.warn_unknown_groups(&def);
        let id = ChainId(self.next_id);
        self.next_id += 1;
        tracing::debug!(chain = %def.name, %id, joints = def.joint_count(), "chain added");
        self.chains.insert(id, ChainEntry { def, enabled: true });
        Ok(id)
    }

    /// Unregister a chain and drop its runtime state.
    ///
    /// # Errors
    ///
    /// [`SpringError::UnknownChain`] when `id` is not registered.
    pub fn remove_chain(&mut self, id: ChainId) -> Result<ChainDef, SpringError> {
        let entry = self.chains.remove(&id).ok_or(SpringError::UnknownChain(id))?;
        self.forget(id);
        Ok(entry.def)
    }

    /// Swap in a new definition for `id`. This is a topology change: the
    /// chain's runtime is dropped and rebuilt from the rig.
    ///
    /// # Errors
    ///
    /// [`SpringError::UnknownChain`] for an unregistered `id`, or the same
    /// validation errors as [`add_chain`](Self::add_chain). The old definition
    /// and its state are kept on error.
    pub fn replace_chain(&mut self, id: ChainId, def: ChainDef) -> Result<(), SpringError> {
        let def = def.validated()?;
        if !self.chains.contains_key(&id) {
            return Err(SpringError::UnknownChain(id));
        }
        self.warn_unknown_groups(&def);
        if let Some(entry) = self.chains.get_mut(&id) {
            entry.def = def;
        }
        self.forget(id);
        Ok(())
    }

    /// Change one joint's parameters without touching its runtime state.
    ///
    /// # Errors
    ///
    /// [`SpringError::UnknownChain`], [`SpringError::UnknownBone`] when the
    /// chain has no such joint, or [`SpringError::InvalidParameter`] when
    /// `params` is out of range.
    pub fn set_joint_params(
        &mut self,
        id: ChainId,
        bone: &str,
        params: JointParams,
    ) -> Result<(), SpringError> {
        let entry = self.chains.get_mut(&id).ok_or(SpringError::UnknownChain(id))?;
        let def = &mut entry.def;
        let index = def.position_of(bone).ok_or_else(|| SpringError::UnknownBone {
            chain: def.name.clone(),
            bone: bone.to_owned(),
        })?;
        def.joints[index].params =
            params
                .validated()
                .map_err(|reason| SpringError::InvalidParameter {
                    chain: def.name.clone(),
                    bone: bone.to_owned(),
                    reason,
                })?;
        Ok(())
    }

    #[must_use]
    pub fn chain(&self, id: ChainId) -> Option<&ChainDef> {
        self.chains.get(&id).map(|entry| &entry.def)
    }

    /// Registered chain ids in solve order.
    pub fn chain_ids(&self) -> impl Iterator<Item = ChainId> + '_ {
        self.chains.keys().copied()
    }

    /// Disabled chains are neither solved nor reported. Re-enabling starts
    /// again from the rig's pose.
    ///
    /// # Errors
    ///
    /// [`SpringError::UnknownChain`] when `id` is not registered.
    pub fn set_chain_enabled(&mut self, id: ChainId, enabled: bool) -> Result<(), SpringError> {
        let entry = self.chains.get_mut(&id).ok_or(SpringError::UnknownChain(id))?;
        if entry.enabled == enabled {
            return Ok(());
        }
        entry.enabled = enabled;
        if !enabled {
            self.forget(id);
        }
        Ok(())
    }

    /// Add or replace a collider group, returning the one it replaced.
    ///
    /// # Errors
    ///
    /// [`SpringError::InvalidCollider`] when a shape has a negative radius or
    /// a degenerate plane normal. Nothing is inserted on error.
    pub fn insert_collider_group(
        &mut self,
        group: ColliderGroup,
    ) -> Result<Option<ColliderGroup>, SpringError> {
        group.validate()?;
        Ok(self.collider_groups.insert(group.name.clone(), group))
    }

    pub fn remove_collider_group(&mut self, name: &str) -> Option<ColliderGroup> {
        self.collider_groups.remove(name)
    }

    #[must_use]
    pub fn collider_group(&self, name: &str) -> Option<&ColliderGroup> {
        self.collider_groups.get(name)
    }

    /// Advance every enabled chain by `dt` seconds against the rig's current
    /// pose.
    ///
    /// There is no sub-stepping: a huge `dt` lands each joint on its
    /// equilibrium in one step.
    ///
    /// # Errors
    ///
    /// [`SpringError::InvalidDeltaTime`] when `dt` is negative or not finite.
    /// It is checked before any state is touched.
    pub fn advance<R: RigPose + ?Sized>(&mut self, rig: &R, dt: f32) -> Result<(), SpringError> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(SpringError::InvalidDeltaTime(dt));
        }

        let resolved: HashMap<&str, Vec<WorldShape>> = self
            .collider_groups
            .iter()
            .map(|(name, group)| (name.as_str(), group.resolve(rig)))
            .collect();

        let store = self.store.chains_mut();
        for (id, entry) in &self.chains {
            if entry.enabled {
                store.entry(*id).or_default();
            }
        }

        let mut work: Vec<(ChainId, &ChainDef, &mut ChainSlots)> = store
            .iter_mut()
            .filter_map(|(id, slots)| {
                let entry = self.chains.get(id)?;
                entry.enabled.then_some((*id, &entry.def, slots))
            })
            .collect();

        tracing::trace!(chains = work.len(), dt, "advancing spring chains");

        let gravity_scale = self.config.gravity_scale;
        let solve = |(id, def, slots): &mut (ChainId, &ChainDef, &mut ChainSlots)| {
            let colliders = chain_colliders(def, &resolved);
            let frame = ChainFrame {
                rig,
                colliders: &colliders,
                gravity_scale,
                dt,
            };
            solve_chain(*id, def, slots, &frame)
        };

        #[cfg(feature = "parallel")]
        let solved: Vec<Vec<JointPose>> = if work.len() >= self.config.min_chains_for_parallel {
            work.par_iter_mut().map(solve).collect()
        } else {
            work.iter_mut().map(solve).collect()
        };

        #[cfg(not(feature = "parallel"))]
        let solved: Vec<Vec<JointPose>> = work.iter_mut().map(solve).collect();

        self.poses = solved.into_iter().flatten().collect();
        Ok(())
    }

    /// Drop all runtime state. Every chain restarts from the rig.
    pub fn reset(&mut self) {
        self.store.clear();
        self.poses.clear();
    }

    /// Drop the runtime state of one chain.
    ///
    /// # Errors
    ///
    /// [`SpringError::UnknownChain`] when `id` is not registered.
    pub fn invalidate(&mut self, id: ChainId) -> Result<(), SpringError> {
        if !self.chains.contains_key(&id) {
            return Err(SpringError::UnknownChain(id));
        }
        self.forget(id);
        Ok(())
    }

    /// Whether chain `id` has runtime state yet.
    ///
    /// # Errors
    ///
    /// [`SpringError::UnknownChain`] when `id` is not registered.
    pub fn chain_status(&self, id: ChainId) -> Result<ChainStatus, SpringError> {
        if !self.chains.contains_key(&id) {
            return Err(SpringError::UnknownChain(id));
        }
        Ok(if self.store.is_initialized(id) {
            ChainStatus::Settled
        } else {
            ChainStatus::Uninitialized
        })
    }

    /// Joint runtime state, for inspection.
    #[must_use]
    pub fn store(&self) -> &JointStore {
        &self.store
    }

    /// Output of the last [`advance`](Self::advance), ordered by chain id and
    /// then root to tip.
    #[must_use]
    pub fn poses(&self) -> &[JointPose] {
        &self.poses
    }

    /// Last pose of `bone`, from the first chain that drives it.
    #[must_use]
    pub fn pose(&self, bone: &str) -> Option<&JointPose> {
        self.poses.iter().find(|pose| pose.bone == bone)
    }

    /// Last poses packed for upload into a host transform buffer.
    #[must_use]
    pub fn pose_records(&self) -> Vec<PoseRecord> {
        self.poses.iter().map(PoseRecord::from).collect()
    }

    /// World-space tail of `bone` in chain `id` as of the last advance.
    #[must_use]
    pub fn tail(&self, id: ChainId, bone: &str) -> Option<Vec3> {
        self.poses
            .iter()
            .find(|pose| pose.chain == id && pose.bone == bone)
            .map(|pose| pose.tail)
    }

    fn forget(&mut self, id: ChainId) {
        self.store.invalidate(id);
        self.poses.retain(|pose| pose.chain != id);
    }

    fn warn_unknown_groups(&self, def: &ChainDef) {
        for name in &def.collider_groups {
            if !self.collider_groups.contains_key(name) {
                tracing::warn!(
                    chain = %def.name,
                    group = %name,
                    "collider group not registered, treated as empty"
                );
            }
        }
    }
}

/// Every world shape of the groups `def` refers to. Unknown groups are empty.
fn chain_colliders(def: &ChainDef, resolved: &HashMap<&str, Vec<WorldShape>>) -> Vec<WorldShape> {
    def.collider_groups
        .iter()
        .filter_map(|name| resolved.get(name.as_str()))
        .flatten()
        .copied()
        .collect()
}
