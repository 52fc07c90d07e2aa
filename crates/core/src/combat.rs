//! Attack resolution and short-lived combat entities.
//!
//! An [`AttackIntent`] is a transient value: produced by the loadout or an
//! enemy, consumed the same tick. Resolution either tests hitboxes
//! immediately (melee, explosion), spawns a [`Projectile`] simulated on
//! later ticks, or queues a self-heal. Damage is never applied directly
//! here; hits are queued and applied by the simulation's health phase, so
//! each record has exactly one writer per tick.

use bincode::{Decode, Encode};
use duskhollow_physics::{Aabb, SpatialBody};
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::entities::{EntityId, EntityIdAllocator, Millis};

/// Melee hitboxes start this far from the attacker's center.
const MELEE_STANDOFF: f32 = 10.0;
/// Fixed height of the melee hitbox.
const MELEE_HITBOX_HEIGHT: f32 = 40.0;
const PROJECTILE_SIZE: Vec2 = Vec2::new(15.0, 5.0);

/// Kind-discriminated attack payload. Each variant carries exactly the
/// fields valid for that kind, so a half-built attack cannot exist.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub enum AttackKind {
    Melee { damage: i32, range: f32 },
    Projectile { damage: i32, speed: f32 },
    Explosion { damage: i32, radius: f32, duration_ms: Millis },
    Heal { amount: i32 },
}

impl AttackKind {
    /// Scale outgoing damage (player damage upgrades, crits). Heals are
    /// unaffected.
    pub fn with_damage_scaled(self, factor: f32) -> AttackKind {
        let scale = |damage: i32| (damage as f32 * factor).round() as i32;
        match self {
            AttackKind::Melee { damage, range } => AttackKind::Melee {
                damage: scale(damage),
                range,
            },
            AttackKind::Projectile { damage, speed } => AttackKind::Projectile {
                damage: scale(damage),
                speed,
            },
            AttackKind::Explosion {
                damage,
                radius,
                duration_ms,
            } => AttackKind::Explosion {
                damage: scale(damage),
                radius,
                duration_ms,
            },
            AttackKind::Heal { amount } => AttackKind::Heal { amount },
        }
    }
}

/// A fully-formed attack for this tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct AttackIntent {
    pub kind: AttackKind,
    /// Raw aim direction; may be zero.
    #[bincode(with_serde)]
    pub direction: Vec2,
    pub critical: bool,
}

impl AttackIntent {
    pub fn new(kind: AttackKind, direction: Vec2) -> Self {
        Self {
            kind,
            direction,
            critical: false,
        }
    }

    /// Normalized direction; a zero input defaults to pointing right.
    pub fn aim(&self) -> Vec2 {
        self.direction.try_normalize().unwrap_or(Vec2::X)
    }
}

/// A flying hazard. Destroyed on its first hit or on leaving the viewport.
#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode)]
pub struct Projectile {
    pub id: EntityId,
    pub body: SpatialBody,
    pub damage: i32,
    /// Excluded from hit tests so an attacker cannot shoot itself.
    pub owner: EntityId,
    pub critical: bool,
}

/// A stationary time-bounded effect. Its damage was applied at spawn;
/// afterwards it only exists for the renderer until it expires.
#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode)]
pub struct AreaEffect {
    pub id: EntityId,
    pub rect: Aabb,
    pub spawned_at: Millis,
    pub duration_ms: Millis,
}

impl AreaEffect {
    pub fn expired(&self, now: Millis) -> bool {
        now.saturating_sub(self.spawned_at) > self.duration_ms
    }
}

/// A damage application waiting for the health phase.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Encode, Decode)]
pub struct PendingHit {
    pub target: EntityId,
    pub amount: i32,
    pub attacker: Option<EntityId>,
    pub critical: bool,
}

/// Attack resolution plus projectile/effect simulation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Encode, Decode)]
pub struct CombatSystem {
    pub projectiles: Vec<Projectile>,
    pub effects: Vec<AreaEffect>,
    pending_hits: Vec<PendingHit>,
    pending_heals: Vec<(EntityId, i32)>,
}

impl CombatSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve one attack intent against the candidate entities.
    ///
    /// `candidates` are the live hit-testable entities; the attacker is
    /// skipped wherever it appears.
    pub fn resolve(
        &mut self,
        intent: &AttackIntent,
        attacker: EntityId,
        attacker_rect: Aabb,
        candidates: &[(EntityId, Aabb)],
        ids: &mut EntityIdAllocator,
        now: Millis,
    ) {
        let aim = intent.aim();
        match intent.kind {
            AttackKind::Melee { damage, range } => {
                let start = attacker_rect.center() + aim * MELEE_STANDOFF;
                let hitbox = Aabb::from_center(
                    start + aim * (range * 0.5),
                    Vec2::new(range, MELEE_HITBOX_HEIGHT),
                );
                for (target, rect) in candidates {
                    if *target != attacker && hitbox.overlaps(rect) {
                        self.queue_hit(*target, damage, Some(attacker), intent.critical);
                    }
                }
            }
            AttackKind::Projectile { damage, speed } => {
                let mut body =
                    SpatialBody::centered_at(attacker_rect.center(), PROJECTILE_SIZE);
                body.velocity = aim * speed;
                self.projectiles.push(Projectile {
                    id: ids.alloc(),
                    body,
                    damage,
                    owner: attacker,
                    critical: intent.critical,
                });
            }
            AttackKind::Explosion {
                damage,
                radius,
                duration_ms,
            } => {
                let rect = Aabb::from_center(
                    attacker_rect.center(),
                    Vec2::splat(radius * 2.0),
                );
                // Damage is a single check at spawn time; the effect is
                // never re-evaluated on later ticks.
                for (target, target_rect) in candidates {
                    if *target != attacker && rect.overlaps(target_rect) {
                        self.queue_hit(*target, damage, Some(attacker), intent.critical);
                    }
                }
                self.effects.push(AreaEffect {
                    id: ids.alloc(),
                    rect,
                    spawned_at: now,
                    duration_ms,
                });
            }
            AttackKind::Heal { amount } => {
                self.pending_heals.push((attacker, amount));
            }
        }
    }

    /// Advance projectiles (straight-line, no gravity), cull those outside
    /// the viewport, and convert first hits into pending damage. Expire
    /// finished effects.
    pub fn advance(
        &mut self,
        viewport: Aabb,
        candidates: &[(EntityId, Aabb)],
        ids: &mut EntityIdAllocator,
        now: Millis,
    ) {
        let mut despawned: Vec<EntityId> = Vec::new();
        let pending = &mut self.pending_hits;

        self.projectiles.retain_mut(|proj| {
            proj.body.rect.pos += proj.body.velocity;

            if !viewport.overlaps(&proj.body.rect) {
                despawned.push(proj.id);
                return false;
            }

            // At most one hit per projectile: the first overlapping
            // candidate consumes it.
            for (target, rect) in candidates {
                if *target != proj.owner && proj.body.rect.overlaps(rect) {
                    pending.push(PendingHit {
                        target: *target,
                        amount: proj.damage,
                        attacker: Some(proj.owner),
                        critical: proj.critical,
                    });
                    despawned.push(proj.id);
                    return false;
                }
            }
            true
        });

        self.effects.retain(|effect| {
            if effect.expired(now) {
                despawned.push(effect.id);
                false
            } else {
                true
            }
        });

        for id in despawned {
            ids.free(id);
        }
    }

    fn queue_hit(&mut self, target: EntityId, amount: i32, attacker: Option<EntityId>, critical: bool) {
        self.pending_hits.push(PendingHit {
            target,
            amount,
            attacker,
            critical,
        });
    }

    /// Queue damage directly, bypassing attack resolution. Test seam for
    /// exercising the health phase in isolation.
    #[cfg(test)]
    pub(crate) fn queue_external_hit(&mut self, target: EntityId, amount: i32) {
        self.queue_hit(target, amount, None, false);
    }

    /// Take everything queued for the health phase, in occurrence order.
    pub fn drain_pending(&mut self) -> (Vec<PendingHit>, Vec<(EntityId, i32)>) {
        (
            std::mem::take(&mut self.pending_hits),
            std::mem::take(&mut self.pending_heals),
        )
    }
}
