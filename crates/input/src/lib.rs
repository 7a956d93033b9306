//! Input: raw button and pointer state mapped to game actions.
//!
//! # Invariants
//! - The arena consumes actions, never raw window events.
//! - Fire is edge-triggered: holding the button shoots once.

pub mod action;
pub mod trigger;

pub use action::Action;
pub use trigger::EdgeTrigger;
