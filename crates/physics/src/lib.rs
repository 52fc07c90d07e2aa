//! Duskhollow Physics - 2D tile physics for the simulation.
//!
//! Simple axis-aligned physics - no external physics engine needed for a
//! side-scroller. Bodies are AABBs moved by per-tick velocities and resolved
//! against solid rectangles one axis at a time.
//!
//! # Determinism Rules
//!
//! 1. No system time - callers pass the simulation clock
//! 2. Ordered iteration - solids are resolved in enumeration order
//! 3. No async - pure synchronous logic

pub mod aabb;
pub mod body;
pub mod config;
pub mod resolver;

pub use aabb::Aabb;
pub use body::SpatialBody;
pub use config::PhysicsConfig;
pub use resolver::step_body;
