//! Shared types and math for the shooting-range workspace.
//!
//! # Invariants
//! - Wrapped angles lie in `[-π, π)`.
//! - Entity ids are never reused within one arena.

mod math;
mod types;

pub use math::{inverse_distance_scale, spin_model, wrap_angle};
pub use types::{EntityId, Skin};
