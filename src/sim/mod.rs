//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (platform creation order)
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod collision;
pub mod state;
pub mod tick;

pub use collision::{lands_on, resting_y};
pub use state::{GameEvent, GamePhase, Platform, PlatformKind, Player, SessionState};
pub use tick::{TickInput, step};
