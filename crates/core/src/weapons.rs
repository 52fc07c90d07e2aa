//! Weapons and the four-slot loadout.
//!
//! Each weapon produces a fully-formed [`AttackKind`] at construction time;
//! there is no way to build a melee attack without a range or a projectile
//! without a speed, so malformed attacks cannot reach the resolver.

use bincode::{Decode, Encode};
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::combat::AttackKind;
use crate::entities::Millis;

/// The four loadout slots: two main weapons on the mouse buttons, two
/// sub-weapons on the number keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
#[repr(u8)]
pub enum WeaponSlot {
    Main1 = 0,
    Main2 = 1,
    Sub1 = 2,
    Sub2 = 3,
}

/// An attack action requested by the input layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackRequest {
    pub slot: WeaponSlot,
    /// Long-press skill variant instead of the normal attack.
    pub skill: bool,
    pub aim: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub enum Weapon {
    Sword,
    Bow,
    Bomb,
    HealPotion,
}

impl Weapon {
    pub fn normal_attack(&self) -> AttackKind {
        match self {
            Weapon::Sword => AttackKind::Melee {
                damage: 10,
                range: 60.0,
            },
            Weapon::Bow => AttackKind::Projectile {
                damage: 8,
                speed: 10.0,
            },
            Weapon::Bomb => AttackKind::Explosion {
                damage: 25,
                radius: 100.0,
                duration_ms: 250,
            },
            Weapon::HealPotion => AttackKind::Heal { amount: 20 },
        }
    }

    /// Skill (charged) variant. Sub-weapons have none.
    pub fn skill_attack(&self) -> Option<AttackKind> {
        match self {
            Weapon::Sword => Some(AttackKind::Melee {
                damage: 50,
                range: 90.0,
            }),
            Weapon::Bow => Some(AttackKind::Projectile {
                damage: 12,
                speed: 15.0,
            }),
            Weapon::Bomb | Weapon::HealPotion => None,
        }
    }

    /// How long a melee swing occupies the loadout. Non-melee attacks do
    /// not block further attacks.
    fn swing_ms(&self, skill: bool) -> Millis {
        match self {
            Weapon::Sword => {
                if skill {
                    400
                } else {
                    200
                }
            }
            _ => 0,
        }
    }
}

/// The player's equipped weapons plus the melee-swing window.
#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode)]
pub struct Loadout {
    slots: [Weapon; 4],
    /// Attack requests are ignored until this deadline passes.
    busy_until: Millis,
}

impl Default for Loadout {
    fn default() -> Self {
        Self {
            slots: [Weapon::Sword, Weapon::Bow, Weapon::Bomb, Weapon::HealPotion],
            busy_until: 0,
        }
    }
}

impl Loadout {
    pub fn weapon(&self, slot: WeaponSlot) -> Weapon {
        self.slots[slot as usize]
    }

    pub fn is_busy(&self, now: Millis) -> bool {
        now < self.busy_until
    }

    /// Resolve an attack request into an attack kind, starting the swing
    /// window for melee. Returns `None` while a swing is in progress or for
    /// skill requests on sub-weapons.
    pub fn attack(&mut self, request: &AttackRequest, now: Millis) -> Option<AttackKind> {
        if self.is_busy(now) {
            return None;
        }

        let weapon = self.weapon(request.slot);
        let kind = if request.skill {
            weapon.skill_attack()?
        } else {
            weapon.normal_attack()
        };

        if matches!(kind, AttackKind::Melee { .. }) {
            self.busy_until = now + weapon.swing_ms(request.skill);
        }
        Some(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn melee_swing_blocks_followup() {
        let mut loadout = Loadout::default();
        let request = AttackRequest {
            slot: WeaponSlot::Main1,
            skill: false,
            aim: Vec2::new(1.0, 0.0),
        };

        assert!(loadout.attack(&request, 1000).is_some());
        assert!(loadout.attack(&request, 1100).is_none());
        assert!(loadout.attack(&request, 1200).is_some());
    }

    #[test]
    fn projectile_attack_does_not_block() {
        let mut loadout = Loadout::default();
        let request = AttackRequest {
            slot: WeaponSlot::Main2,
            skill: false,
            aim: Vec2::new(1.0, 0.0),
        };

        assert!(loadout.attack(&request, 1000).is_some());
        assert!(loadout.attack(&request, 1001).is_some());
    }

    #[test]
    fn sub_weapons_have_no_skill_variant() {
        let mut loadout = Loadout::default();
        let request = AttackRequest {
            slot: WeaponSlot::Sub1,
            skill: true,
            aim: Vec2::ZERO,
        };

        assert!(loadout.attack(&request, 0).is_none());
    }

    #[test]
    fn sword_skill_hits_harder_and_further() {
        let (normal, skill) = match (
            Weapon::Sword.normal_attack(),
            Weapon::Sword.skill_attack().unwrap(),
        ) {
            (
                AttackKind::Melee {
                    damage: d1,
                    range: r1,
                },
                AttackKind::Melee {
                    damage: d2,
                    range: r2,
                },
            ) => ((d1, r1), (d2, r2)),
            other => panic!("unexpected attack kinds: {other:?}"),
        };

        assert!(skill.0 > normal.0);
        assert!(skill.1 > normal.1);
    }
}
