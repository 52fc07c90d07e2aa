//! Enemy entities and their AI state machine.
//!
//! All variants share one state machine core (patrol / wait / chase /
//! attack plus the aggression override); the variant tag only selects the
//! movement and attack policy. The machine has no terminal state - it
//! cycles until the enemy is destroyed.

use bincode::{Decode, Encode};
use duskhollow_physics::{Aabb, SpatialBody};
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::combat::{AttackIntent, AttackKind};
use crate::entities::{EntityId, Millis};
use crate::random::SeededRandom;

/// Behavior variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub enum EnemyKind {
    /// Closes distance and swings at melee range.
    Melee,
    /// Holds an optimal-distance band and shoots.
    Ranged,
    /// Approaches behind a randomly raised shield; never attacks.
    Shield,
}

/// Current AI state, re-evaluated every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub enum AiState {
    Patrolling,
    Waiting,
    Chasing,
    Attacking,
}

#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode)]
pub struct Enemy {
    pub id: EntityId,
    pub kind: EnemyKind,
    pub body: SpatialBody,
    pub state: AiState,

    /// Fixed center of the patrol area (the spawn point).
    #[bincode(with_serde)]
    pub patrol_center: Vec2,
    /// Patrol walking direction: -1 left, 1 right.
    pub patrol_dir: i8,
    pub patrol_wait_until: Millis,

    /// While the clock is before this deadline the enemy chases even
    /// without line of sight. Refreshed whenever the enemy takes damage.
    pub aggressive_until: Millis,
    pub attack_cooldown_until: Millis,
    /// Non-movement attack animation window.
    pub attack_anim_until: Millis,

    /// Shield variant only: damage is gated while raised.
    pub shield_raised: bool,
}

impl Enemy {
    pub const MAX_HP: i32 = 100;

    pub const DETECTION_RANGE: f32 = 300.0;
    pub const PATROL_RADIUS: f32 = 150.0;
    pub const PATROL_SPEED: f32 = 1.0;
    pub const PATROL_WAIT_MS: Millis = 2000;
    pub const AGGRESSIVE_MS: Millis = 5000;
    pub const ATTACK_COOLDOWN_MS: Millis = 2000;

    pub const MELEE_SPEED: f32 = 2.0;
    pub const MELEE_RANGE: f32 = 50.0;
    pub const MELEE_DAMAGE: i32 = 10;
    pub const MELEE_ANIM_MS: Millis = 300;
    pub const JUMP_IMPULSE: f32 = -10.0;
    const JUMP_CHANCE: f32 = 0.02;

    pub const RANGED_SPEED: f32 = 1.0;
    pub const OPTIMAL_DISTANCE: f32 = 250.0;
    pub const DISTANCE_BAND: f32 = 30.0;
    pub const VISUAL_RANGE: f32 = 500.0;
    pub const RANGED_DAMAGE: i32 = 5;
    pub const ARROW_SPEED: f32 = 8.0;

    const SHIELD_TOGGLE_CHANCE: f32 = 0.01;

    pub fn new(id: EntityId, kind: EnemyKind, pos: Vec2) -> Self {
        let body = SpatialBody::new(pos, Self::size_of(kind));
        let patrol_center = body.center();
        Self {
            id,
            kind,
            body,
            state: AiState::Patrolling,
            patrol_center,
            patrol_dir: 1,
            patrol_wait_until: 0,
            aggressive_until: 0,
            attack_cooldown_until: 0,
            attack_anim_until: 0,
            shield_raised: false,
        }
    }

    fn size_of(kind: EnemyKind) -> Vec2 {
        match kind {
            EnemyKind::Melee | EnemyKind::Ranged => Vec2::new(30.0, 50.0),
            EnemyKind::Shield => Vec2::new(50.0, 50.0),
        }
    }

    fn move_speed(&self) -> f32 {
        match self.kind {
            EnemyKind::Melee | EnemyKind::Shield => Self::MELEE_SPEED,
            EnemyKind::Ranged => Self::RANGED_SPEED,
        }
    }

    #[inline]
    pub fn is_aggressive(&self, now: Millis) -> bool {
        now < self.aggressive_until
    }

    /// Taking damage forces the enemy out of patrol on the next tick.
    pub fn note_damage(&mut self, now: Millis) {
        self.aggressive_until = now + Self::AGGRESSIVE_MS;
    }

    /// Evaluate the state machine for one tick. Sets this tick's movement
    /// velocity and returns an attack intent when the attack preconditions
    /// are met.
    pub fn update_ai(
        &mut self,
        player_rect: Aabb,
        now: Millis,
        rng: &mut SeededRandom,
    ) -> Option<AttackIntent> {
        // The attack animation is a non-movement window; transitions resume
        // once it ends.
        if now < self.attack_anim_until {
            self.state = AiState::Attacking;
            self.body.velocity.x = 0.0;
            return None;
        }

        let center = self.body.center();
        let target = player_rect.center();
        let distance = center.distance(target);
        let detected = distance <= Self::DETECTION_RANGE || self.is_aggressive(now);

        match self.kind {
            EnemyKind::Melee => {
                if detected {
                    self.state = AiState::Chasing;
                    self.chase_horizontally(target, rng);
                    if now >= self.attack_cooldown_until
                        && self
                            .body
                            .rect
                            .overlaps(&player_rect.inflate(Self::MELEE_RANGE, Self::MELEE_RANGE))
                    {
                        return Some(self.start_attack(
                            AttackKind::Melee {
                                damage: Self::MELEE_DAMAGE,
                                range: Self::MELEE_RANGE,
                            },
                            target - center,
                            Self::MELEE_ANIM_MS,
                            now,
                        ));
                    }
                } else {
                    self.patrol(now);
                }
            }
            EnemyKind::Ranged => {
                let visible = distance <= Self::VISUAL_RANGE;
                if visible || self.is_aggressive(now) {
                    self.state = AiState::Chasing;
                    self.hold_distance_band(target);
                    if visible && now >= self.attack_cooldown_until {
                        return Some(self.start_attack(
                            AttackKind::Projectile {
                                damage: Self::RANGED_DAMAGE,
                                speed: Self::ARROW_SPEED,
                            },
                            target - center,
                            0,
                            now,
                        ));
                    }
                } else {
                    self.patrol(now);
                }
            }
            EnemyKind::Shield => {
                if rng.chance(Self::SHIELD_TOGGLE_CHANCE) {
                    self.shield_raised = !self.shield_raised;
                }
                if detected {
                    self.state = AiState::Chasing;
                    self.chase_horizontally(target, rng);
                } else {
                    self.patrol(now);
                }
            }
        }
        None
    }

    fn start_attack(
        &mut self,
        kind: AttackKind,
        direction: Vec2,
        anim_ms: Millis,
        now: Millis,
    ) -> AttackIntent {
        self.state = AiState::Attacking;
        self.attack_cooldown_until = now + Self::ATTACK_COOLDOWN_MS;
        self.attack_anim_until = now + anim_ms;
        self.body.velocity.x = 0.0;
        AttackIntent::new(kind, direction)
    }

    /// Walk toward the target; occasionally jump when the target is above.
    fn chase_horizontally(&mut self, target: Vec2, rng: &mut SeededRandom) {
        let center = self.body.center();
        let dx = target.x - center.x;
        if dx.abs() > f32::EPSILON {
            self.body.velocity.x = dx.signum() * self.move_speed();
        } else {
            self.body.velocity.x = 0.0;
        }
        if target.y < center.y - 20.0 && self.body.on_ground && rng.chance(Self::JUMP_CHANCE) {
            self.body.velocity.y = Self::JUMP_IMPULSE;
        }
    }

    /// Ranged variant: back off when too close, approach when too far,
    /// hold still inside the band.
    fn hold_distance_band(&mut self, target: Vec2) {
        let dx = self.body.center().x - target.x;
        let abs = dx.abs();
        let speed = self.move_speed();
        if abs < Self::OPTIMAL_DISTANCE - Self::DISTANCE_BAND {
            self.body.velocity.x = if dx >= 0.0 { speed } else { -speed };
        } else if abs > Self::OPTIMAL_DISTANCE + Self::DISTANCE_BAND {
            self.body.velocity.x = if dx >= 0.0 { -speed } else { speed };
        } else {
            self.body.velocity.x = 0.0;
        }
    }

    /// Walk back and forth around the patrol center, pausing at the
    /// boundary before reversing.
    fn patrol(&mut self, now: Millis) {
        if self.state == AiState::Waiting {
            if now >= self.patrol_wait_until {
                // Reverse and take a step inward so the boundary check does
                // not immediately re-trigger the wait.
                self.patrol_dir = -self.patrol_dir;
                self.state = AiState::Patrolling;
                self.body.velocity.x = self.patrol_dir as f32 * Self::PATROL_SPEED;
            } else {
                self.body.velocity.x = 0.0;
            }
            return;
        }

        self.state = AiState::Patrolling;
        let offset = (self.body.center().x - self.patrol_center.x).abs();
        if offset >= Self::PATROL_RADIUS {
            self.state = AiState::Waiting;
            self.patrol_wait_until = now + Self::PATROL_WAIT_MS;
            self.body.velocity.x = 0.0;
        } else {
            self.body.velocity.x = self.patrol_dir as f32 * Self::PATROL_SPEED;
        }
    }
}
