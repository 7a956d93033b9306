//! Arena Kernel: authoritative game state for the shoot-the-target demo.
//!
//! # Invariants
//! - The arena advances only in fixed ticks; wall-clock time never enters it.
//! - Same config and same launch sequence produce the same state.
//! - All spawns and removals are recorded in the event log.

pub mod arena;
pub mod config;
pub mod error;
pub mod fireball;
pub mod target;

pub use arena::{Arena, ArenaEvent, ArenaStats, ArenaSummary, StepReport};
pub use config::ArenaConfig;
pub use error::{ArenaError, ConfigError};
pub use fireball::Fireball;
pub use target::Target;
