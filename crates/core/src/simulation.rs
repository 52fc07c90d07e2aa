//! The fixed-timestep tick pipeline.
//!
//! One [`Simulation::tick`] runs five phases in a fixed order:
//!
//! 1. Player control: movement, jump, roll, interaction, attack resolution.
//! 2. Enemy AI: state machines run and their attacks are resolved.
//! 3. Physics: every body moves and collides against nearby terrain, then
//!    the camera follows the player.
//! 4. Projectiles and area effects advance.
//! 5. Health mutation: queued hits and heals land, hooks fire, dead
//!    entities are removed.
//!
//! Phases 1-4 only queue health changes; phase 5 is the sole writer of the
//! ledger. Identical seed plus identical inputs replay to identical state.

use bincode::{Decode, Encode};
use duskhollow_physics::{step_body, Aabb, PhysicsConfig};
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::combat::{AttackIntent, AttackKind, CombatSystem};
use crate::enemy::{AiState, Enemy, EnemyKind};
use crate::entities::{EntityId, EntityIdAllocator, Millis, Player};
use crate::events::{CombatEvent, CombatHooks, NullHooks, Reward};
use crate::health::{DamageOutcome, HealthLedger};
use crate::input::TickInput;
use crate::map::{Interaction, TileMap};
use crate::persistence::StateError;
use crate::random::SeededRandom;
use crate::weapons::{AttackRequest, Loadout};

#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode)]
pub struct SimulationConfig {
    /// Ticks per second of simulated time.
    pub tick_rate: u32,
    pub view_width: f32,
    pub view_height: f32,
}

impl SimulationConfig {
    /// Milliseconds of simulated time per tick.
    #[inline]
    pub fn tick_ms(&self) -> Millis {
        1000 / self.tick_rate
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60,
            view_width: 1280.0,
            view_height: 720.0,
        }
    }
}

/// The whole simulated world. Everything needed to continue the game is in
/// here, so serializing this struct is a complete save.
#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode)]
pub struct Simulation {
    pub config: SimulationConfig,
    pub physics: PhysicsConfig,

    /// Simulated time in milliseconds, advanced by a fixed step per tick.
    pub clock: Millis,
    pub tick_count: u64,

    pub player: Player,
    pub loadout: Loadout,
    pub enemies: Vec<Enemy>,
    pub combat: CombatSystem,
    pub health: HealthLedger,
    pub ids: EntityIdAllocator,
    pub map: TileMap,
    pub camera_x: f32,
    pub(crate) rng: SeededRandom,

    /// What happened last tick, in occurrence order. Cleared at the start
    /// of every tick.
    events: Vec<CombatEvent>,
}

impl Simulation {
    /// Damage a rolling player deals to doors it slams into. High enough
    /// to break any door outright.
    const ROLL_DOOR_DAMAGE: i32 = 999;
    /// Chance a chest holds a reward rather than an ambush.
    const CHEST_REWARD_CHANCE: f32 = 0.8;
    const CRIT_MULTIPLIER: f32 = 2.0;
    /// Maximum hit point gain from a max-health scroll.
    const SCROLL_MAX_HP_BONUS: i32 = 20;

    pub fn new(config: SimulationConfig, map: TileMap, player_pos: Vec2, seed: u32) -> Self {
        let mut ids = EntityIdAllocator::new();
        let player_id = ids.alloc();
        let mut health = HealthLedger::new();
        health.register(player_id, Player::MAX_HP);

        Self {
            config,
            physics: PhysicsConfig::default(),
            clock: 0,
            tick_count: 0,
            player: Player::new(player_id, player_pos),
            loadout: Loadout::default(),
            enemies: Vec::new(),
            combat: CombatSystem::new(),
            health,
            ids,
            map,
            camera_x: 0.0,
            rng: SeededRandom::new(seed),
            events: Vec::new(),
        }
    }

    /// Spawn an enemy and register its health record.
    pub fn spawn_enemy(&mut self, kind: EnemyKind, pos: Vec2) -> EntityId {
        let id = self.ids.alloc();
        self.health.register(id, Enemy::MAX_HP);
        self.enemies.push(Enemy::new(id, kind, pos));
        log::debug!("spawned {:?} enemy at ({}, {})", kind, pos.x, pos.y);
        id
    }

    /// Advance the world one tick without observers.
    pub fn tick(&mut self, input: &TickInput) {
        self.tick_with_hooks(input, &mut NullHooks);
    }

    /// Advance the world one tick, firing `hooks` from the health phase.
    pub fn tick_with_hooks(&mut self, input: &TickInput, hooks: &mut dyn CombatHooks) {
        self.tick_count = self.tick_count.wrapping_add(1);
        self.clock += self.config.tick_ms();
        let now = self.clock;
        self.events.clear();

        // Phase 1: player control.
        if self.player.alive {
            self.player.apply_move(input.horizontal(), now);
            if input.jump() {
                self.player.try_jump(now);
            }
            if input.roll() && !self.player.is_rolling(now) {
                self.player.begin_roll(now);
                self.health
                    .set_invincible_until(self.player.id, self.player.rolling_until);
            }
            self.player.update_roll(now);
            if input.interact() {
                self.handle_interaction(now);
            }
            if let Some(request) = input.attack_request() {
                self.resolve_player_attack(&request, now);
            }
        }

        // Phase 2: enemy AI.
        let player_rect = self.player.body.rect;
        let tick_ms = self.config.tick_ms();
        let mut intents: Vec<(EntityId, Aabb, AttackIntent)> = Vec::new();
        for enemy in &mut self.enemies {
            let intent = enemy.update_ai(player_rect, now, &mut self.rng);
            // A raised shield is an invincibility window refreshed every
            // tick it stays up.
            if enemy.shield_raised {
                self.health.set_invincible_until(enemy.id, now + tick_ms);
            }
            if let Some(intent) = intent {
                intents.push((enemy.id, enemy.body.rect, intent));
            }
        }
        if self.player.alive {
            let player_target = [(self.player.id, player_rect)];
            for (attacker, rect, intent) in intents {
                self.combat
                    .resolve(&intent, attacker, rect, &player_target, &mut self.ids, now);
            }
        }

        // Phase 3: physics and camera.
        if self.player.alive {
            let rolling = self.player.is_rolling(now);
            if rolling {
                let mut probe = self.player.body.rect;
                probe.pos.x += self.player.body.velocity.x;
                for _ in 0..self.map.damage_doors_overlapping(&probe, Self::ROLL_DOOR_DAMAGE) {
                    self.events.push(CombatEvent::DoorBroken);
                    log::debug!("door smashed by roll");
                }
            }
            let solids = self.map.solid_rects_near(self.player.body.center());
            step_body(&mut self.player.body, &solids, &self.physics, !rolling);
        }
        for enemy in &mut self.enemies {
            let solids = self.map.solid_rects_near(enemy.body.center());
            step_body(&mut enemy.body, &solids, &self.physics, true);
        }
        let max_camera = (self.map.width_px() - self.config.view_width).max(0.0);
        self.camera_x = (self.player.body.center().x - self.config.view_width * 0.5)
            .clamp(0.0, max_camera);

        // Phase 4: projectiles and area effects.
        let viewport = Aabb::new(
            Vec2::new(self.camera_x, 0.0),
            Vec2::new(self.config.view_width, self.config.view_height),
        );
        let mut candidates: Vec<(EntityId, Aabb)> = Vec::with_capacity(self.enemies.len() + 1);
        if self.player.alive {
            candidates.push((self.player.id, self.player.body.rect));
        }
        candidates.extend(self.enemies.iter().map(|e| (e.id, e.body.rect)));
        self.combat.advance(viewport, &candidates, &mut self.ids, now);

        // Phase 5: health mutation and cleanup.
        let (hits, heals) = self.combat.drain_pending();
        for (target, amount) in heals {
            self.health.apply_heal(target, amount);
        }
        let mut killed: Vec<(EntityId, Option<EntityId>)> = Vec::new();
        for hit in hits {
            match self.health.apply_damage(hit.target, hit.amount, now) {
                DamageOutcome::Ignored => {}
                DamageOutcome::Applied { .. } => {
                    hooks.on_damage(hit.target, hit.amount, hit.attacker, hit.critical);
                    self.events.push(CombatEvent::Damage {
                        target: hit.target,
                        amount: hit.amount,
                        attacker: hit.attacker,
                        critical: hit.critical,
                    });
                    if let Some(enemy) = self.enemies.iter_mut().find(|e| e.id == hit.target) {
                        enemy.note_damage(now);
                    }
                }
                DamageOutcome::Killed => {
                    hooks.on_damage(hit.target, hit.amount, hit.attacker, hit.critical);
                    hooks.on_kill(hit.target, hit.attacker);
                    self.events.push(CombatEvent::Damage {
                        target: hit.target,
                        amount: hit.amount,
                        attacker: hit.attacker,
                        critical: hit.critical,
                    });
                    self.events.push(CombatEvent::Kill {
                        target: hit.target,
                        attacker: hit.attacker,
                    });
                    killed.push((hit.target, hit.attacker));
                }
            }
        }
        for (target, _) in killed {
            if target == self.player.id {
                log::debug!("player died at tick {}", self.tick_count);
                self.player.alive = false;
                self.player.body.velocity = Vec2::ZERO;
            } else {
                log::debug!("enemy {:?} destroyed", target);
                self.enemies.retain(|e| e.id != target);
                self.ids.free(target);
            }
        }
    }

    fn resolve_player_attack(&mut self, request: &AttackRequest, now: Millis) {
        let Some(kind) = self.loadout.attack(request, now) else {
            return;
        };
        let critical =
            !matches!(kind, AttackKind::Heal { .. }) && self.rng.chance(self.player.upgrades.luck);
        let factor = self.player.upgrades.damage
            * if critical { Self::CRIT_MULTIPLIER } else { 1.0 };
        let kind = kind.with_damage_scaled(factor);

        let direction = if request.aim.length_squared() > f32::EPSILON {
            request.aim
        } else {
            Vec2::new(self.player.facing as f32, 0.0)
        };
        let mut intent = AttackIntent::new(kind, direction);
        intent.critical = critical;

        let candidates: Vec<(EntityId, Aabb)> =
            self.enemies.iter().map(|e| (e.id, e.body.rect)).collect();
        self.combat.resolve(
            &intent,
            self.player.id,
            self.player.body.rect,
            &candidates,
            &mut self.ids,
            now,
        );
    }

    fn handle_interaction(&mut self, now: Millis) {
        let pos = self.player.body.center();
        match self.map.interact_at(pos, now) {
            Some(Interaction::ChestOpened(at)) => {
                if self.rng.chance(Self::CHEST_REWARD_CHANCE) {
                    log::debug!("chest yielded a weapon");
                    self.events
                        .push(CombatEvent::RewardGranted(Reward::WeaponDrop));
                } else {
                    let count = 1 + self.rng.next_int(2);
                    log::debug!("chest ambush, {} enemies", count);
                    for i in 0..count {
                        let offset = Vec2::new(i as f32 * 40.0, -10.0);
                        self.spawn_enemy(EnemyKind::Melee, at + offset);
                    }
                }
            }
            Some(Interaction::ScrollTaken) => {
                self.player.scrolls_collected += 1;
                let reward = match self.rng.next_int(5) {
                    0 => {
                        self.player.upgrades.speed += 0.1;
                        Reward::SpeedUpgrade
                    }
                    1 => {
                        self.player.upgrades.damage += 0.25;
                        Reward::DamageUpgrade
                    }
                    2 => {
                        self.player.upgrades.jump += 0.1;
                        Reward::JumpUpgrade
                    }
                    3 => {
                        self.health
                            .raise_max_hp(self.player.id, Self::SCROLL_MAX_HP_BONUS);
                        Reward::MaxHealthUpgrade
                    }
                    _ => {
                        self.player.upgrades.luck += 0.05;
                        Reward::LuckUpgrade
                    }
                };
                self.events.push(CombatEvent::RewardGranted(reward));
            }
            Some(Interaction::DoorToggled(open)) => {
                log::debug!("door toggled, open={}", open);
            }
            None => {}
        }
    }

    /// Events recorded during the most recent tick.
    pub fn events(&self) -> &[CombatEvent] {
        &self.events
    }

    pub fn health_of(&self, id: EntityId) -> Option<i32> {
        self.health.get(id).map(|r| r.current_hp)
    }

    pub fn ai_state_of(&self, id: EntityId) -> Option<AiState> {
        self.enemies.iter().find(|e| e.id == id).map(|e| e.state)
    }

    /// Serialize the complete world state.
    pub fn serialize_state(&self) -> Result<Vec<u8>, StateError> {
        Ok(bincode::encode_to_vec(self, bincode::config::standard())?)
    }

    /// Restore a world serialized by [`serialize_state`](Self::serialize_state).
    pub fn deserialize_state(bytes: &[u8]) -> Result<Self, StateError> {
        let (sim, _) = bincode::decode_from_slice(bytes, bincode::config::standard())?;
        Ok(sim)
    }
}
