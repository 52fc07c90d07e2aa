//! Simulated bodies.

use bincode::{Decode, Encode};
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::aabb::Aabb;

/// A moving box in the world: the one physical representation shared by
/// players, enemies, projectiles and interactables.
///
/// The size is fixed at creation; only position and velocity change after
/// that. Velocity is in pixels per tick.
#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode)]
pub struct SpatialBody {
    pub rect: Aabb,
    #[bincode(with_serde)]
    pub velocity: Vec2,
    /// Set by the collision resolver when a downward collision was resolved
    /// this tick.
    pub on_ground: bool,
}

impl SpatialBody {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            rect: Aabb::new(pos, size),
            velocity: Vec2::ZERO,
            on_ground: false,
        }
    }

    /// Place the body so its center sits at `center`.
    pub fn centered_at(center: Vec2, size: Vec2) -> Self {
        Self {
            rect: Aabb::from_center(center, size),
            velocity: Vec2::ZERO,
            on_ground: false,
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.rect.center()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_placement() {
        let body = SpatialBody::centered_at(Vec2::new(100.0, 100.0), Vec2::new(30.0, 50.0));
        assert_eq!(body.center(), Vec2::new(100.0, 100.0));
        assert_eq!(body.rect.pos, Vec2::new(85.0, 75.0));
        assert!(!body.on_ground);
    }
}
