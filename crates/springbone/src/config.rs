//! Solver-wide settings.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::SpringError;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SolverConfig {
    /// Multiplier on every joint's gravity term.
    pub gravity_scale: f32,
    /// Below this many active chains the `parallel` feature still solves
    /// on the calling thread.
    pub min_chains_for_parallel: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            gravity_scale: 1.0,
            min_chains_for_parallel: 4,
        }
    }
}

impl SolverConfig {
    /// # Errors
    ///
    /// [`SpringError::InvalidConfig`] when `gravity_scale` is negative or not
    /// finite.
    pub fn validate(&self) -> Result<(), SpringError> {
        if !self.gravity_scale.is_finite() || self.gravity_scale < 0.0 {
            return Err(SpringError::InvalidConfig(
                "gravity_scale must be finite and non-negative",
            ));
        }
        Ok(())
    }
}
