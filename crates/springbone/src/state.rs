//! Joint runtime store
//!
//! The only state the solver carries from one frame to the next. It is kept
//! apart from the rig so the host can edit or re-evaluate its skeleton between
//! frames without invalidating anything here. Entries are grouped per chain:
//! dropping a chain is a single removal, and disjoint chains can be borrowed
//! mutably at the same time.

use glam::Vec3;
use std::collections::{BTreeMap, HashMap};

use crate::math;
use crate::transform::Transform;
use crate::types::{ChainId, JointKey};

/// Persistent state of one joint.
///
/// Tail positions are stored in the chain's storage space: world space, or
/// the chain's center bone when it has one.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct JointRuntime {
    pub current_tail: Vec3,
    pub previous_tail: Vec3,
    /// Head-to-tail distance captured at initialisation.
    pub rest_length: f32,
    /// Unit head-to-tail direction in the bone's own space. Zero when the bone
    /// has no length.
    pub rest_direction: Vec3,
}

impl JointRuntime {
    /// Fresh state at rest with zero velocity.
    #[must_use]
    pub fn at_rest(head: &Transform, tail: Vec3) -> Self {
        let offset = tail - head.translation;
        let rest_direction =
            math::direction(head.rotation.inverse() * offset).unwrap_or(Vec3::ZERO);
        Self {
            current_tail: tail,
            previous_tail: tail,
            rest_length: offset.length(),
            rest_direction,
        }
    }

    #[must_use]
    pub fn velocity(&self) -> Vec3 {
        self.current_tail - self.previous_tail
    }

    /// The same state with both tails carried through `space`.
    #[must_use]
    pub fn transformed(&self, space: &Transform) -> Self {
        Self {
            current_tail: space.transform_point(self.current_tail),
            previous_tail: space.transform_point(self.previous_tail),
            ..*self
        }
    }
}

/// Runtime state for the joints of a single chain, keyed by bone name.
#[derive(Debug, Default, Clone)]
pub struct ChainSlots {
    joints: HashMap<String, JointRuntime>,
    missing_center_reported: bool,
}

impl ChainSlots {
    /// Existing state for `bone`, or a new one at rest.
    pub fn get_or_init(
        &mut self,
        bone: &str,
        rest_head: &Transform,
        rest_tail: Vec3,
    ) -> &mut JointRuntime {
        self.joints.entry(bone.to_owned()).or_insert_with(|| {
            let runtime = JointRuntime::at_rest(rest_head, rest_tail);
            if runtime.rest_length <= math::EPSILON {
                tracing::warn!(bone, "joint has zero length and will not move");
            }
            runtime
        })
    }

    #[must_use]
    pub fn get(&self, bone: &str) -> Option<&JointRuntime> {
        self.joints.get(bone)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.joints.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// True the first time it is called after the slots were created.
    pub(crate) fn first_missing_center(&mut self) -> bool {
        !std::mem::replace(&mut self.missing_center_reported, true)
    }
}

/// All joint runtime state owned by the solver.
#[derive(Debug, Default, Clone)]
pub struct JointStore {
    chains: BTreeMap<ChainId, ChainSlots>,
}

impl JointStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Existing state for `key`, or a new one at rest with zero velocity.
    pub fn get_or_init(
        &mut self,
        key: &JointKey,
        rest_head: &Transform,
        rest_tail: Vec3,
    ) -> &mut JointRuntime {
        self.slots_mut(key.chain)
            .get_or_init(&key.bone, rest_head, rest_tail)
    }

    #[must_use]
    pub fn get(&self, key: &JointKey) -> Option<&JointRuntime> {
        self.chains.get(&key.chain).and_then(|slots| slots.get(&key.bone))
    }

    #[must_use]
    pub fn contains(&self, key: &JointKey) -> bool {
        self.get(key).is_some()
    }

    /// Drop every joint of `chain`. The next solve reinitialises it from the
    /// rig. Returns whether anything was dropped.
    pub fn invalidate(&mut self, chain: ChainId) -> bool {
        self.chains.remove(&chain).is_some()
    }

    pub fn clear(&mut self) {
        self.chains.clear();
    }

    /// Whether `chain` has been solved since it was last invalidated.
    #[must_use]
    pub fn is_initialized(&self, chain: ChainId) -> bool {
        self.chains.contains_key(&chain)
    }

    #[must_use]
    pub fn chain_len(&self, chain: ChainId) -> usize {
        self.chains.get(&chain).map_or(0, ChainSlots::len)
    }

    /// Total number of joints with state.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chains.values().map(ChainSlots::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn slots_mut(&mut self, chain: ChainId) -> &mut ChainSlots {
        self.chains.entry(chain).or_default()
    }

    pub(crate) fn chains_mut(&mut self) -> &mut BTreeMap<ChainId, ChainSlots> {
        &mut self.chains
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    fn key(chain: u32, bone: &str) -> JointKey {
        JointKey::new(ChainId(chain), bone)
    }

    #[test]
    fn init_starts_at_rest() {
        let mut store = JointStore::new();
        let head = Transform::from_translation(Vec3::Y);
        let state = *store.get_or_init(&key(0, "a"), &head, Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(state.current_tail, state.previous_tail);
        assert_eq!(state.velocity(), Vec3::ZERO);
        assert!((state.rest_length - 1.0).abs() < 1e-6);
        assert!((state.rest_direction - Vec3::Y).length() < 1e-6);
    }

    #[test]
    fn rest_direction_is_bone_local() {
        // Bone turned a quarter about Z, so world -X is bone-local +Y.
        let head = Transform::from_rotation(Quat::from_rotation_z(std::f32::consts::FRAC_PI_2));
        let state = JointRuntime::at_rest(&head, Vec3::new(-2.0, 0.0, 0.0));
        assert!((state.rest_direction - Vec3::Y).length() < 1e-6);
        assert!((state.rest_length - 2.0).abs() < 1e-6);
    }

    #[test]
    fn existing_state_is_returned_unchanged() {
        let mut store = JointStore::new();
        let head = Transform::IDENTITY;
        store.get_or_init(&key(0, "a"), &head, Vec3::Y).current_tail = Vec3::X;
        let again = store.get_or_init(&key(0, "a"), &head, Vec3::Z);
        assert_eq!(again.current_tail, Vec3::X);
        assert_eq!(again.previous_tail, Vec3::Y);
    }

    #[test]
    fn invalidate_drops_only_that_chain() {
        let mut store = JointStore::new();
        let head = Transform::IDENTITY;
        store.get_or_init(&key(0, "a"), &head, Vec3::Y);
        store.get_or_init(&key(0, "b"), &head, Vec3::Y);
        store.get_or_init(&key(1, "a"), &head, Vec3::Y);
        assert_eq!(store.len(), 3);

        assert!(store.invalidate(ChainId(0)));
        assert!(!store.invalidate(ChainId(0)));
        assert!(!store.contains(&key(0, "a")));
        assert!(store.contains(&key(1, "a")));
        assert_eq!(store.chain_len(ChainId(1)), 1);
        assert!(!store.is_initialized(ChainId(0)));
    }

    #[test]
    fn zero_length_bone_gets_zero_direction() {
        let state = JointRuntime::at_rest(&Transform::from_translation(Vec3::X), Vec3::X);
        assert_eq!(state.rest_length, 0.0);
        assert_eq!(state.rest_direction, Vec3::ZERO);
    }

    #[test]
    fn clear_empties_store() {
        let mut store = JointStore::new();
        store.get_or_init(&key(3, "a"), &Transform::IDENTITY, Vec3::Y);
        store.clear();
        assert!(store.is_empty());
    }
}
