//! Combat notifications for external collaborators.
//!
//! Damage and kill hooks fire synchronously during the health-mutation
//! phase of the tick. The same information is also recorded as plain
//! [`CombatEvent`] values queryable after the tick, for collaborators that
//! prefer polling (UI effects, score display).

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::entities::EntityId;

/// A reward produced by interaction or progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub enum Reward {
    WeaponDrop,
    SpeedUpgrade,
    DamageUpgrade,
    JumpUpgrade,
    MaxHealthUpgrade,
    LuckUpgrade,
}

/// Something that happened during a tick, in occurrence order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub enum CombatEvent {
    Damage {
        target: EntityId,
        amount: i32,
        attacker: Option<EntityId>,
        critical: bool,
    },
    Kill {
        target: EntityId,
        attacker: Option<EntityId>,
    },
    DoorBroken,
    RewardGranted(Reward),
}

/// Synchronous observer of combat outcomes.
///
/// Implemented by score/currency/UI collaborators. Every method has a no-op
/// default so observers implement only what they need.
pub trait CombatHooks {
    fn on_damage(
        &mut self,
        _target: EntityId,
        _amount: i32,
        _attacker: Option<EntityId>,
        _is_critical: bool,
    ) {
    }

    /// Fired exactly once per entity, at the moment its health record is
    /// removed.
    fn on_kill(&mut self, _target: EntityId, _attacker: Option<EntityId>) {}
}

/// Hooks that do nothing; used when no collaborator is listening.
#[derive(Debug, Default)]
pub struct NullHooks;

impl CombatHooks for NullHooks {}
