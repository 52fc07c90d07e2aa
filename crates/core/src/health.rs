//! Per-entity hit point tracking.
//!
//! The ledger is the only writer of hit points. Records are kept in a slot
//! arena indexed by the entity handle, with the generation checked on every
//! access so handles to destroyed entities read as "not registered".

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::entities::{EntityId, Millis};

/// One entity's health record.
#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode)]
pub struct HealthRecord {
    pub current_hp: i32,
    pub max_hp: i32,
    /// Damage is ignored while the clock is before this deadline. Always
    /// present, 0 (expired) by default.
    pub invincible_until: Millis,
}

/// Result of a damage application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Target unregistered, already dead, or inside an invincibility window.
    Ignored,
    /// Damage landed; the target survived with this much HP.
    Applied { remaining: i32 },
    /// Damage landed and the target died. The record is already removed;
    /// further damage or heals are no-ops.
    Killed,
}

#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode)]
struct Slot {
    generation: u32,
    record: HealthRecord,
}

/// Health records for all registered entities.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Encode, Decode)]
pub struct HealthLedger {
    slots: Vec<Option<Slot>>,
}

impl HealthLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity with full health. Idempotent: a second call for a
    /// live registration leaves the record untouched.
    pub fn register(&mut self, id: EntityId, max_hp: i32) {
        self.register_at(id, max_hp, max_hp);
    }

    /// Register an entity at a specific hit point value; used when restoring
    /// a saved game. Idempotent like [`register`](Self::register).
    pub fn register_at(&mut self, id: EntityId, current_hp: i32, max_hp: i32) {
        let index = id.index as usize;
        if self.slots.len() <= index {
            self.slots.resize_with(index + 1, || None);
        }
        let slot = &mut self.slots[index];
        if slot
            .as_ref()
            .is_some_and(|s| s.generation == id.generation)
        {
            return;
        }
        *slot = Some(Slot {
            generation: id.generation,
            record: HealthRecord {
                current_hp,
                max_hp,
                invincible_until: 0,
            },
        });
    }

    pub fn get(&self, id: EntityId) -> Option<&HealthRecord> {
        self.slots
            .get(id.index as usize)?
            .as_ref()
            .filter(|s| s.generation == id.generation)
            .map(|s| &s.record)
    }

    fn get_mut(&mut self, id: EntityId) -> Option<&mut HealthRecord> {
        self.slots
            .get_mut(id.index as usize)?
            .as_mut()
            .filter(|s| s.generation == id.generation)
            .map(|s| &mut s.record)
    }

    /// Open (or extend) an invincibility window on the entity.
    pub fn set_invincible_until(&mut self, id: EntityId, until: Millis) {
        if let Some(record) = self.get_mut(id) {
            record.invincible_until = record.invincible_until.max(until);
        }
    }

    pub fn is_invincible(&self, id: EntityId, now: Millis) -> bool {
        self.get(id).is_some_and(|r| now < r.invincible_until)
    }

    /// Apply damage. No-op while invincible; on reaching 0 HP the record is
    /// removed immediately and finally.
    pub fn apply_damage(&mut self, id: EntityId, amount: i32, now: Millis) -> DamageOutcome {
        let Some(record) = self.get_mut(id) else {
            return DamageOutcome::Ignored;
        };
        if now < record.invincible_until {
            return DamageOutcome::Ignored;
        }
        record.current_hp = (record.current_hp - amount).max(0);
        if record.current_hp == 0 {
            self.slots[id.index as usize] = None;
            DamageOutcome::Killed
        } else {
            DamageOutcome::Applied {
                remaining: record.current_hp,
            }
        }
    }

    /// Permanently raise an entity's maximum hit points, healing it by the
    /// same amount.
    pub fn raise_max_hp(&mut self, id: EntityId, amount: i32) {
        if let Some(record) = self.get_mut(id) {
            record.max_hp += amount;
            record.current_hp += amount;
        }
    }

    /// Heal up to max HP. No-op for unregistered entities.
    pub fn apply_heal(&mut self, id: EntityId, amount: i32) {
        if let Some(record) = self.get_mut(id) {
            record.current_hp = (record.current_hp + amount).min(record.max_hp);
        }
    }

    /// Dead entities have no record, so an unregistered handle reads as dead.
    pub fn is_dead(&self, id: EntityId) -> bool {
        self.get(id).map_or(true, |r| r.current_hp <= 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::EntityIdAllocator;

    fn id() -> EntityId {
        EntityIdAllocator::new().alloc()
    }

    #[test]
    fn register_is_idempotent() {
        let mut ledger = HealthLedger::new();
        let e = id();

        ledger.register(e, 100);
        ledger.apply_damage(e, 30, 0);
        ledger.register(e, 100);

        assert_eq!(ledger.get(e).unwrap().current_hp, 70);
    }

    #[test]
    fn damage_clamps_at_zero_and_unregisters() {
        let mut ledger = HealthLedger::new();
        let e = id();
        ledger.register(e, 15);

        assert_eq!(
            ledger.apply_damage(e, 10, 0),
            DamageOutcome::Applied { remaining: 5 }
        );
        assert_eq!(ledger.apply_damage(e, 20, 0), DamageOutcome::Killed);
        assert!(ledger.is_dead(e));

        // Dead is final: no resurrection by heal, no second kill.
        ledger.apply_heal(e, 50);
        assert!(ledger.get(e).is_none());
        assert_eq!(ledger.apply_damage(e, 5, 0), DamageOutcome::Ignored);
    }

    #[test]
    fn heal_clamps_at_max() {
        let mut ids = EntityIdAllocator::new();
        let mut ledger = HealthLedger::new();
        let e = ids.alloc();
        ledger.register(e, 100);

        ledger.apply_damage(e, 40, 0);
        ledger.apply_heal(e, 500);
        assert_eq!(ledger.get(e).unwrap().current_hp, 100);

        // Healing an unregistered entity is a no-op.
        let ghost = ids.alloc();
        ledger.apply_heal(ghost, 10);
        assert!(ledger.get(ghost).is_none());
    }

    #[test]
    fn max_hp_raise_heals_and_lifts_the_cap() {
        let mut ledger = HealthLedger::new();
        let e = id();
        ledger.register(e, 100);

        ledger.apply_damage(e, 40, 0);
        ledger.raise_max_hp(e, 20);
        assert_eq!(ledger.get(e).unwrap().current_hp, 80);
        assert_eq!(ledger.get(e).unwrap().max_hp, 120);

        ledger.apply_heal(e, 500);
        assert_eq!(ledger.get(e).unwrap().current_hp, 120);
    }

    #[test]
    fn invincibility_gates_damage() {
        let mut ledger = HealthLedger::new();
        let e = id();
        ledger.register(e, 100);
        ledger.set_invincible_until(e, 1000);

        assert_eq!(ledger.apply_damage(e, 50, 500), DamageOutcome::Ignored);
        assert_eq!(ledger.get(e).unwrap().current_hp, 100);

        assert_eq!(
            ledger.apply_damage(e, 50, 1000),
            DamageOutcome::Applied { remaining: 50 }
        );
    }

    #[test]
    fn stale_generation_reads_as_unregistered() {
        let mut ids = EntityIdAllocator::new();
        let mut ledger = HealthLedger::new();

        let a = ids.alloc();
        ledger.register(a, 100);
        ledger.apply_damage(a, 100, 0);
        ids.free(a);

        // Slot reused by a fresh entity; the stale handle must not alias it.
        let b = ids.alloc();
        ledger.register(b, 80);
        assert!(ledger.get(a).is_none());
        assert_eq!(ledger.apply_damage(a, 10, 0), DamageOutcome::Ignored);
        assert_eq!(ledger.get(b).unwrap().current_hp, 80);
    }
}
