//! Card definitions - static card data.
//!
//! `CardDefinition` is what the compiler produces for each `card { ... }`
//! block: the header fields plus the effect invocations run when the card
//! is activated. It never changes once compiled.
//!
//! Instance-specific data (current power, owner) is stored separately in
//! `CardInstance`.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::attributes::{BoardZone, CardType, Faction, Range, Ranges};
use crate::effects::EffectInvocation;

/// Unique identifier for a card definition.
///
/// This identifies the kind of card ("Geralt"), not a copy of it in a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardId(pub u32);

impl CardId {
    /// Create a new card ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}

/// Static card definition.
///
/// ## Example
///
/// ```
/// use card_script::cards::{CardDefinition, CardId, CardType, Faction, Range};
///
/// let card = CardDefinition::new(CardId::new(0), "Ves", CardType::Silver, Faction::NorthernRealms)
///     .with_power(5)
///     .with_ranges([Range::Melee]);
///
/// assert_eq!(card.range_text(), "Melee");
/// assert_eq!(card.placements().len(), 1);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDefinition {
    /// Position of the card in its compiled file.
    pub id: CardId,

    pub name: String,

    pub card_type: CardType,

    pub faction: Faction,

    /// Printed power. Zero when the file leaves it out.
    pub power: i64,

    /// Rows the card may occupy, in declared order.
    pub ranges: Ranges,

    pub description: String,

    /// Effects run in order when the card is activated.
    pub on_activation: Vec<EffectInvocation>,
}

impl CardDefinition {
    /// Create a new card definition.
    #[must_use]
    pub fn new(id: CardId, name: impl Into<String>, card_type: CardType, faction: Faction) -> Self {
        Self {
            id,
            name: name.into(),
            card_type,
            faction,
            power: 0,
            ranges: Ranges::new(),
            description: String::new(),
            on_activation: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_power(mut self, power: i64) -> Self {
        self.power = power;
        self
    }

    #[must_use]
    pub fn with_ranges(mut self, ranges: impl IntoIterator<Item = Range>) -> Self {
        self.ranges = ranges.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_effect(mut self, invocation: EffectInvocation) -> Self {
        self.on_activation.push(invocation);
        self
    }

    /// Slots this card may be played into.
    #[must_use]
    pub fn placements(&self) -> SmallVec<[BoardZone; 3]> {
        BoardZone::placements(self.card_type, &self.ranges)
    }

    /// Ranges as scripts see them through `card.Range`: names joined by
    /// commas in declared order.
    #[must_use]
    pub fn range_text(&self) -> String {
        self.ranges
            .iter()
            .map(|r| r.name())
            .collect::<Vec<_>>()
            .join(",")
    }
}
