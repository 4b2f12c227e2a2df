//! Zone system for card locations.
//!
//! Each player owns four zones: deck, hand, field and graveyard. The
//! shared board seen by scripts is every player's field in seat order.
//!
//! ## Key Types
//!
//! - `ZoneId`: A player's zone (from `core::config`)
//! - `ZoneManager`: Card location tracking and movement
//! - `ZonePosition`: Top or bottom of a zone

pub mod manager;

pub use manager::{ZoneManager, ZonePosition};

// Re-export zone types from core for convenience
pub use crate::core::config::{ZoneId, ZoneKind};
