//! Game context trait consumed by the effect executor.
//!
//! Effect actions never touch game storage directly. They go through
//! `GameContext`, which `GameState` implements and tests can implement
//! with something smaller.
//!
//! ## Implementation Notes
//!
//! - Zones are ordered bottom to top; `pop` takes the top
//! - `push` moves a card that is already somewhere else
//! - `ZoneRef::Board` is every player's field in seat order; pushing to
//!   it goes to the trigger player's field, popping takes the top of the
//!   last non-empty field
//! - Card lookups return `None` once a card has left the game

use serde::{Deserialize, Serialize};

use crate::cards::CardInstance;
use crate::core::config::ZoneId;
use crate::core::entity::EntityId;
use crate::core::player::PlayerId;
use crate::zones::ZonePosition;

/// A live collection a script can name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneRef {
    Player(ZoneId),
    Board,
}

impl std::fmt::Display for ZoneRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ZoneRef::Player(zone) => write!(f, "{}", zone),
            ZoneRef::Board => f.write_str("board"),
        }
    }
}

/// Everything an effect action can read or change.
pub trait GameContext {
    /// The player whose card is being activated.
    fn trigger_player(&self) -> PlayerId;

    fn player_count(&self) -> usize;

    /// Cards in a zone, bottom to top.
    fn cards(&self, zone: ZoneRef) -> Vec<EntityId>;

    /// Put `card` into `zone`, moving it from wherever it is.
    fn push(&mut self, zone: ZoneRef, card: EntityId, position: ZonePosition);

    /// Take the top card of `zone`.
    fn pop(&mut self, zone: ZoneRef) -> Option<EntityId>;

    /// Take `card` out of `zone`; returns whether it was there.
    fn remove(&mut self, zone: ZoneRef, card: EntityId) -> bool;

    fn shuffle(&mut self, zone: ZoneRef);

    /// Shuffle a list that is not a zone, with the same randomness source.
    fn shuffle_cards(&mut self, cards: &mut [EntityId]);

    fn card(&self, card: EntityId) -> Option<&CardInstance>;

    /// Set a card's power; returns whether the card exists.
    fn set_power(&mut self, card: EntityId, power: i64) -> bool;
}
