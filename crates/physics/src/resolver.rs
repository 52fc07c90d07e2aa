//! Tile collision resolution.
//!
//! Movement is resolved one axis at a time: apply the horizontal
//! displacement, push the body out of any solid it now overlaps, then do
//! the same vertically. A blocked axis has its velocity zeroed. Obstacles
//! are tested in enumeration order; adjacent solids resolve independently,
//! which is fine because solid geometry is contiguous.

use crate::aabb::Aabb;
use crate::body::SpatialBody;
use crate::config::PhysicsConfig;

/// Advance a body by its velocity and resolve collisions against `solids`.
///
/// `apply_gravity` is off for bodies in special movement states (e.g. a
/// rolling player) and for projectiles, which fly straight.
pub fn step_body(
    body: &mut SpatialBody,
    solids: &[Aabb],
    config: &PhysicsConfig,
    apply_gravity: bool,
) {
    if apply_gravity {
        body.velocity.y += config.gravity;
        if body.velocity.y > config.terminal_velocity {
            body.velocity.y = config.terminal_velocity;
        }
    }

    // Horizontal pass.
    body.rect.pos.x += body.velocity.x;
    for solid in solids {
        if body.rect.overlaps(solid) {
            if body.velocity.x > 0.0 {
                body.rect.set_right(solid.left());
            } else if body.velocity.x < 0.0 {
                body.rect.set_left(solid.right());
            }
            body.velocity.x = 0.0;
        }
    }

    // Vertical pass.
    body.rect.pos.y += body.velocity.y;
    body.on_ground = false;
    for solid in solids {
        if body.rect.overlaps(solid) {
            if body.velocity.y > 0.0 {
                body.rect.set_bottom(solid.top());
                body.on_ground = true;
            } else if body.velocity.y < 0.0 {
                body.rect.set_top(solid.bottom());
            }
            body.velocity.y = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;

    fn tile(x: f32, y: f32) -> Aabb {
        Aabb::new(Vec2::new(x, y), Vec2::new(50.0, 50.0))
    }

    #[test]
    fn rightward_movement_clamps_to_tile_edge() {
        // Body moving right at (5, 0) into a solid immediately to its right.
        let mut body = SpatialBody::new(Vec2::new(66.0, 0.0), Vec2::new(32.0, 50.0));
        body.velocity = Vec2::new(5.0, 0.0);
        let solids = [tile(100.0, 0.0)];

        step_body(&mut body, &solids, &PhysicsConfig::default(), false);

        assert_eq!(body.rect.right(), 100.0);
        assert_eq!(body.velocity.x, 0.0);
    }

    #[test]
    fn leftward_movement_clamps_to_tile_edge() {
        let mut body = SpatialBody::new(Vec2::new(52.0, 0.0), Vec2::new(32.0, 50.0));
        body.velocity = Vec2::new(-5.0, 0.0);
        let solids = [tile(0.0, 0.0)];

        step_body(&mut body, &solids, &PhysicsConfig::default(), false);

        assert_eq!(body.rect.left(), 50.0);
        assert_eq!(body.velocity.x, 0.0);
    }

    #[test]
    fn landing_sets_on_ground() {
        let mut body = SpatialBody::new(Vec2::new(0.0, 45.0), Vec2::new(32.0, 50.0));
        body.velocity = Vec2::new(0.0, 8.0);
        let solids = [tile(0.0, 100.0)];

        step_body(&mut body, &solids, &PhysicsConfig::default(), false);

        assert!(body.on_ground);
        assert_eq!(body.rect.bottom(), 100.0);
        assert_eq!(body.velocity.y, 0.0);
    }

    #[test]
    fn ceiling_hit_zeroes_upward_velocity() {
        let mut body = SpatialBody::new(Vec2::new(0.0, 55.0), Vec2::new(32.0, 50.0));
        body.velocity = Vec2::new(0.0, -10.0);
        let solids = [tile(0.0, 0.0)];

        step_body(&mut body, &solids, &PhysicsConfig::default(), false);

        assert!(!body.on_ground);
        assert_eq!(body.rect.top(), 50.0);
        assert_eq!(body.velocity.y, 0.0);
    }

    #[test]
    fn gravity_clamped_to_terminal_velocity() {
        let mut body = SpatialBody::new(Vec2::ZERO, Vec2::new(32.0, 64.0));
        let config = PhysicsConfig::default();

        for _ in 0..100 {
            step_body(&mut body, &[], &config, true);
        }

        assert_eq!(body.velocity.y, config.terminal_velocity);
    }

    #[test]
    fn free_fall_does_not_ground() {
        let mut body = SpatialBody::new(Vec2::ZERO, Vec2::new(32.0, 64.0));
        step_body(&mut body, &[], &PhysicsConfig::default(), true);
        assert!(!body.on_ground);
    }
}
