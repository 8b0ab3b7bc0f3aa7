use thiserror::Error;

use crate::types::ChainId;

/// Errors surfaced at the driver boundary.
///
/// Degenerate geometry and unresolved rig references never show up here: those
/// are recovered inside the solve and only logged.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpringError {
    #[error("delta time must be finite and non-negative, got {0}")]
    InvalidDeltaTime(f32),
    #[error("chain `{chain}`, joint `{bone}`: {reason}")]
    InvalidParameter {
        chain: String,
        bone: String,
        reason: &'static str,
    },
    #[error("collider group `{group}`: {reason}")]
    InvalidCollider { group: String, reason: &'static str },
    #[error("invalid solver config: {0}")]
    InvalidConfig(&'static str),
    #[error("chain `{0}` needs at least two nodes to form a joint")]
    EmptyChain(String),
    #[error("chain `{chain}` lists bone `{bone}` more than once")]
    DuplicateBone { chain: String, bone: String },
    #[error("unknown chain {0}")]
    UnknownChain(ChainId),
    #[error("chain `{chain}` has no joint on bone `{bone}`")]
    UnknownBone { chain: String, bone: String },
}
