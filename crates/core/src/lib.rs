//! Duskhollow Core - Deterministic Side-Scroller Simulation
//!
//! This crate contains the real-time simulation of the game world: entity
//! physics, tile collision, combat resolution, health bookkeeping and enemy
//! AI. Rendering, input devices, audio and file I/O live outside this crate
//! and talk to it only through plain values.
//!
//! # Determinism Rules
//!
//! 1. No `rand::thread_rng()` - Use `SeededRandom` only
//! 2. No system time - Use the simulation clock, advanced a fixed step per tick
//! 3. Ordered iteration - `Vec` not `HashMap` for entities
//! 4. No async - Pure synchronous logic

pub mod combat;
pub mod enemy;
pub mod entities;
pub mod events;
pub mod health;
pub mod input;
pub mod map;
pub mod persistence;
pub mod random;
pub mod simulation;
pub mod weapons;

pub use combat::{AttackIntent, AttackKind, CombatSystem};
pub use enemy::{AiState, Enemy, EnemyKind};
pub use entities::{EntityId, Player};
pub use events::{CombatEvent, CombatHooks};
pub use health::HealthLedger;
pub use input::TickInput;
pub use map::TileMap;
pub use persistence::{SaveState, StateError};
pub use random::SeededRandom;
pub use simulation::{Simulation, SimulationConfig};
pub use weapons::{Loadout, Weapon, WeaponSlot};
