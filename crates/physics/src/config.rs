//! Physics tuning constants.
//!
//! All values are in pixels and pixels per tick, matching the fixed-timestep
//! simulation (velocities are applied once per tick, not scaled by wall time).

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Configuration for body physics.
#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode)]
pub struct PhysicsConfig {
    /// Downward acceleration per tick.
    pub gravity: f32,

    /// Terminal fall speed (pixels/tick).
    pub terminal_velocity: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 0.5,
            terminal_velocity: 10.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_sane() {
        let config = PhysicsConfig::default();
        assert!(config.gravity > 0.0);
        assert!(config.terminal_velocity > config.gravity);
    }
}
