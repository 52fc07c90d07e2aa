//! Per-tick player input.
//!
//! The core never sees raw device state. Whatever the platform layer polls
//! is flattened into one `TickInput` per tick: button bits, a quantized aim
//! direction and at most one attack request.

use bincode::{Decode, Encode};
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::weapons::{AttackRequest, WeaponSlot};

/// Flattened input for one simulation tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct TickInput {
    /// Raw bitfield of held/pressed inputs.
    pub bits: u16,

    /// Aim direction X, quantized (scaled by 1000.0).
    pub aim_x: i16,

    /// Aim direction Y, quantized (scaled by 1000.0).
    pub aim_y: i16,

    /// Attack slot for this tick: 0 = none, 1..=4 map to the loadout slots.
    pub attack_slot: u8,
}

impl TickInput {
    // Movement
    pub const LEFT: u16 = 1 << 0;
    pub const RIGHT: u16 = 1 << 1;
    pub const JUMP: u16 = 1 << 2;

    // Actions
    pub const ROLL: u16 = 1 << 3;
    pub const INTERACT: u16 = 1 << 4;
    /// Attack request is the skill variant (long press) instead of normal.
    pub const SKILL: u16 = 1 << 5;

    pub const fn new() -> Self {
        Self {
            bits: 0,
            aim_x: 0,
            aim_y: 0,
            attack_slot: 0,
        }
    }

    pub const fn from_bits(bits: u16) -> Self {
        Self {
            bits,
            aim_x: 0,
            aim_y: 0,
            attack_slot: 0,
        }
    }

    #[inline]
    pub const fn is_pressed(&self, input: u16) -> bool {
        self.bits & input != 0
    }

    #[inline]
    pub fn set(&mut self, input: u16, pressed: bool) {
        if pressed {
            self.bits |= input;
        } else {
            self.bits &= !input;
        }
    }

    #[inline]
    pub const fn jump(&self) -> bool {
        self.is_pressed(Self::JUMP)
    }

    #[inline]
    pub const fn roll(&self) -> bool {
        self.is_pressed(Self::ROLL)
    }

    #[inline]
    pub const fn interact(&self) -> bool {
        self.is_pressed(Self::INTERACT)
    }

    /// Returns horizontal movement axis as -1, 0, or 1.
    pub const fn horizontal(&self) -> i8 {
        match (self.is_pressed(Self::LEFT), self.is_pressed(Self::RIGHT)) {
            (true, false) => -1,
            (false, true) => 1,
            _ => 0,
        }
    }

    /// Quantize a raw aim component for transport.
    pub fn quantize_aim(raw: f32) -> i16 {
        (raw * 1000.0).clamp(-32768.0, 32767.0) as i16
    }

    pub fn set_aim(&mut self, aim: Vec2) {
        self.aim_x = Self::quantize_aim(aim.x);
        self.aim_y = Self::quantize_aim(aim.y);
    }

    /// Dequantized aim direction. May be zero; attack construction falls
    /// back to the canonical direction for zero vectors.
    pub fn aim(&self) -> Vec2 {
        Vec2::new(self.aim_x as f32 / 1000.0, self.aim_y as f32 / 1000.0)
    }

    pub fn set_attack(&mut self, slot: WeaponSlot, skill: bool) {
        self.attack_slot = slot as u8 + 1;
        self.set(Self::SKILL, skill);
    }

    /// The attack requested this tick, if any.
    pub fn attack_request(&self) -> Option<AttackRequest> {
        let slot = match self.attack_slot {
            1 => WeaponSlot::Main1,
            2 => WeaponSlot::Main2,
            3 => WeaponSlot::Sub1,
            4 => WeaponSlot::Sub2,
            _ => return None,
        };
        Some(AttackRequest {
            slot,
            skill: self.is_pressed(Self::SKILL),
            aim: self.aim(),
        })
    }
}
