//! Entity identity and the player entity.
//!
//! Entity handles carry a generation counter next to the slot index so that
//! a handle to a destroyed-and-reused slot can never alias the new occupant.
//! Storage stays array-based for deterministic iteration order.

use bincode::{Decode, Encode};
use duskhollow_physics::SpatialBody;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Simulation clock value in milliseconds.
pub type Millis = u32;

/// Unique identifier for an entity: slot index plus generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode)]
pub struct EntityId {
    pub index: u32,
    pub generation: u32,
}

/// Allocates entity handles and recycles slots.
///
/// Freeing a handle bumps its slot's generation, so stale handles held by
/// other subsystems compare unequal to any later occupant of the slot.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Encode, Decode)]
pub struct EntityIdAllocator {
    generations: Vec<u32>,
    free: Vec<u32>,
}

impl EntityIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self) -> EntityId {
        if let Some(index) = self.free.pop() {
            EntityId {
                index,
                generation: self.generations[index as usize],
            }
        } else {
            let index = self.generations.len() as u32;
            self.generations.push(0);
            EntityId {
                index,
                generation: 0,
            }
        }
    }

    /// Release a handle. Stale handles (already freed) are ignored.
    pub fn free(&mut self, id: EntityId) {
        let Some(generation) = self.generations.get_mut(id.index as usize) else {
            return;
        };
        if *generation == id.generation {
            *generation += 1;
            self.free.push(id.index);
        }
    }

    /// Whether this handle still refers to a live slot.
    pub fn is_live(&self, id: EntityId) -> bool {
        self.generations
            .get(id.index as usize)
            .is_some_and(|g| *g == id.generation)
            && !self.free.contains(&id.index)
    }
}

/// Permanent multiplicative upgrades collected by the player.
#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode)]
pub struct Upgrades {
    pub speed: f32,
    pub damage: f32,
    pub jump: f32,
    /// Critical hit chance per attack.
    pub luck: f32,
}

impl Default for Upgrades {
    fn default() -> Self {
        Self {
            speed: 1.0,
            damage: 1.0,
            jump: 1.0,
            luck: 0.05,
        }
    }
}

/// The player character.
///
/// Hit points live in the [`HealthLedger`](crate::health::HealthLedger);
/// this struct owns movement state, the roll window and progression.
#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode)]
pub struct Player {
    pub id: EntityId,
    pub body: SpatialBody,
    /// Facing used for rolls and default aim: -1 left, 1 right.
    pub facing: i8,
    /// End of the current roll window; 0 when not rolling.
    pub rolling_until: Millis,
    pub upgrades: Upgrades,
    pub scrolls_collected: u32,
    pub alive: bool,
}

impl Player {
    pub const SIZE: Vec2 = Vec2::new(32.0, 64.0);
    pub const SPEED: f32 = 5.0;
    pub const JUMP_IMPULSE: f32 = -12.0;
    pub const ROLL_SPEED: f32 = 10.0;
    pub const ROLL_DURATION_MS: Millis = 300;
    /// Horizontal velocity decay per tick while rolling.
    pub const ROLL_DECAY: f32 = 0.95;
    pub const MAX_HP: i32 = 100;

    pub fn new(id: EntityId, pos: Vec2) -> Self {
        Self {
            id,
            body: SpatialBody::new(pos, Self::SIZE),
            facing: 1,
            rolling_until: 0,
            upgrades: Upgrades::default(),
            scrolls_collected: 0,
            alive: true,
        }
    }

    #[inline]
    pub fn is_rolling(&self, now: Millis) -> bool {
        now < self.rolling_until
    }

    /// Start a roll in the facing direction. No-op while already rolling.
    /// The caller opens the matching invincibility window in the ledger.
    pub fn begin_roll(&mut self, now: Millis) {
        if !self.is_rolling(now) {
            self.rolling_until = now + Self::ROLL_DURATION_MS;
            self.body.velocity.x = self.facing as f32 * Self::ROLL_SPEED;
        }
    }

    /// Apply horizontal movement input. Ignored while rolling.
    pub fn apply_move(&mut self, direction: i8, now: Millis) {
        if self.is_rolling(now) {
            return;
        }
        self.body.velocity.x = direction as f32 * Self::SPEED * self.upgrades.speed;
        if direction != 0 {
            self.facing = direction.signum();
        }
    }

    /// Jump if grounded and not rolling.
    pub fn try_jump(&mut self, now: Millis) {
        if self.body.on_ground && !self.is_rolling(now) {
            self.body.velocity.y = Self::JUMP_IMPULSE * self.upgrades.jump;
        }
    }

    /// Per-tick roll upkeep: decay roll speed, stop at window end.
    pub fn update_roll(&mut self, now: Millis) {
        if self.rolling_until == 0 {
            return;
        }
        if now < self.rolling_until {
            self.body.velocity.x *= Self::ROLL_DECAY;
        } else {
            self.rolling_until = 0;
            self.body.velocity.x = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocator_recycles_with_new_generation() {
        let mut ids = EntityIdAllocator::new();
        let a = ids.alloc();
        ids.free(a);
        let b = ids.alloc();

        assert_eq!(a.index, b.index);
        assert_ne!(a.generation, b.generation);
        assert!(!ids.is_live(a));
        assert!(ids.is_live(b));
    }

    #[test]
    fn double_free_is_ignored() {
        let mut ids = EntityIdAllocator::new();
        let a = ids.alloc();
        ids.free(a);
        ids.free(a);

        let b = ids.alloc();
        let c = ids.alloc();
        assert_ne!(b, c);
        assert!(ids.is_live(b));
        assert!(ids.is_live(c));
    }

    #[test]
    fn roll_blocks_movement_input() {
        let mut ids = EntityIdAllocator::new();
        let mut player = Player::new(ids.alloc(), Vec2::new(100.0, 500.0));
        player.begin_roll(1000);

        assert!(player.is_rolling(1000));
        assert_eq!(player.body.velocity.x, Player::ROLL_SPEED);

        player.apply_move(-1, 1100);
        assert_eq!(player.body.velocity.x, Player::ROLL_SPEED);

        player.update_roll(1000 + Player::ROLL_DURATION_MS);
        assert!(!player.is_rolling(1000 + Player::ROLL_DURATION_MS));
        assert_eq!(player.body.velocity.x, 0.0);
    }

    #[test]
    fn jump_requires_ground() {
        let mut ids = EntityIdAllocator::new();
        let mut player = Player::new(ids.alloc(), Vec2::ZERO);

        player.try_jump(0);
        assert_eq!(player.body.velocity.y, 0.0);

        player.body.on_ground = true;
        player.try_jump(0);
        assert_eq!(player.body.velocity.y, Player::JUMP_IMPULSE);
    }
}
