//! Card instances - runtime card state.
//!
//! `CardInstance` is one copy of a card in a game. It copies the printed
//! fields of its definition so scripts can read them without a registry,
//! and tracks the only mutable property scripts may change: power.

use serde::{Deserialize, Serialize};

use super::attributes::{CardType, Faction, Ranges};
use super::definition::{CardDefinition, CardId};
use crate::core::entity::EntityId;
use crate::core::player::PlayerId;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardInstance {
    /// Unique entity ID for this instance.
    pub entity_id: EntityId,

    /// Reference to the card definition.
    pub card_id: CardId,

    /// Who started the game with this card.
    pub owner: PlayerId,

    pub name: String,
    pub card_type: CardType,
    pub faction: Faction,
    pub ranges: Ranges,

    /// Current power, starting at the printed value.
    pub power: i64,
}

impl CardInstance {
    /// Create an instance of `definition` owned by `owner`.
    #[must_use]
    pub fn new(entity_id: EntityId, definition: &CardDefinition, owner: PlayerId) -> Self {
        Self {
            entity_id,
            card_id: definition.id,
            owner,
            name: definition.name.clone(),
            card_type: definition.card_type,
            faction: definition.faction,
            ranges: definition.ranges.clone(),
            power: definition.power,
        }
    }

    /// Ranges joined by commas, as `card.Range` reports them.
    #[must_use]
    pub fn range_text(&self) -> String {
        self.ranges
            .iter()
            .map(|r| r.name())
            .collect::<Vec<_>>()
            .join(",")
    }
}
