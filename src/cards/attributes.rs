//! Closed card attributes: type, faction, range and board slot.
//!
//! Card files spell these as strings (`Type: "Gold"`); the compiler maps
//! them through `from_name` and reports anything it does not recognise.
//!
//! ## Board Slots
//!
//! `BoardZone` is where a card may be put when it is played. Slots are
//! derived from the card type and its ranges:
//!
//! - `Gold`, `Silver`, `Decoy`: `Row(range)` for each range
//! - `Boost`: `Boost(range)` for each range, or every range when none given
//! - `Weather`: `Weather(range)` likewise
//! - `Clear`: every `Weather` slot
//! - `Leader`: `Leader`

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Card category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardType {
    Gold,
    Silver,
    Leader,
    Weather,
    Boost,
    Clear,
    Decoy,
}

impl CardType {
    pub const ALL: [CardType; 7] = [
        CardType::Gold,
        CardType::Silver,
        CardType::Leader,
        CardType::Weather,
        CardType::Boost,
        CardType::Clear,
        CardType::Decoy,
    ];

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Gold => "Gold",
            Self::Silver => "Silver",
            Self::Leader => "Leader",
            Self::Weather => "Weather",
            Self::Boost => "Boost",
            Self::Clear => "Clear",
            Self::Decoy => "Decoy",
        }
    }

    /// Unit cards sit in a row and must name at least one range.
    #[must_use]
    pub const fn is_unit(self) -> bool {
        matches!(self, Self::Gold | Self::Silver | Self::Decoy)
    }
}

impl std::fmt::Display for CardType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
    NorthernRealms,
    Nilfgaard,
    Monsters,
    ScoiaTael,
    Skellige,
    Neutral,
}

impl Faction {
    pub const ALL: [Faction; 6] = [
        Faction::NorthernRealms,
        Faction::Nilfgaard,
        Faction::Monsters,
        Faction::ScoiaTael,
        Faction::Skellige,
        Faction::Neutral,
    ];

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::NorthernRealms => "Northern Realms",
            Self::Nilfgaard => "Nilfgaard",
            Self::Monsters => "Monsters",
            Self::ScoiaTael => "Scoia'tael",
            Self::Skellige => "Skellige",
            Self::Neutral => "Neutral",
        }
    }
}

impl std::fmt::Display for Faction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Board row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Range {
    Melee,
    Ranged,
    Siege,
}

impl Range {
    pub const ALL: [Range; 3] = [Range::Melee, Range::Ranged, Range::Siege];

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.name() == name)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Melee => "Melee",
            Self::Ranged => "Ranged",
            Self::Siege => "Siege",
        }
    }
}

impl std::fmt::Display for Range {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Declared ranges, in file order (at most one of each).
pub type Ranges = SmallVec<[Range; 3]>;

/// A slot on a player's side of the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoardZone {
    /// A unit row.
    Row(Range),
    /// The boost slot in front of a row.
    Boost(Range),
    /// The weather slot affecting a row.
    Weather(Range),
    Leader,
}

impl BoardZone {
    /// Slots a card of `card_type` with `ranges` may be played into.
    #[must_use]
    pub fn placements(card_type: CardType, ranges: &[Range]) -> SmallVec<[BoardZone; 3]> {
        let declared_or_all = if ranges.is_empty() {
            &Range::ALL[..]
        } else {
            ranges
        };
        match card_type {
            CardType::Gold | CardType::Silver | CardType::Decoy => {
                ranges.iter().copied().map(BoardZone::Row).collect()
            }
            CardType::Boost => declared_or_all.iter().copied().map(BoardZone::Boost).collect(),
            CardType::Weather => declared_or_all
                .iter()
                .copied()
                .map(BoardZone::Weather)
                .collect(),
            CardType::Clear => Range::ALL.into_iter().map(BoardZone::Weather).collect(),
            CardType::Leader => SmallVec::from_slice(&[BoardZone::Leader]),
        }
    }
}

impl std::fmt::Display for BoardZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoardZone::Row(range) => write!(f, "{} row", range),
            BoardZone::Boost(range) => write!(f, "{} boost", range),
            BoardZone::Weather(range) => write!(f, "{} weather", range),
            BoardZone::Leader => f.write_str("leader"),
        }
    }
}
