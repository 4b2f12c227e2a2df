//! Effect targeting.
//!
//! A `Selector` says where an invocation looks for targets and which cards
//! it keeps:
//!
//! - `Source`: the collection searched (`board`, `hand`, `otherDeck`, ...)
//! - `single`: keep only the first match
//! - `predicate`: `(card) => Bool` filter
//!
//! "Other" sources belong to the player after the trigger player in seat
//! order. `parent` reuses the targets of the enclosing invocation and is
//! only accepted inside a `PostAction`.

use serde::{Deserialize, Serialize};

use super::context::ZoneRef;
use crate::core::config::{ZoneId, ZoneKind};
use crate::core::player::PlayerId;
use crate::script::ast::{Expr, Lambda};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    Board,
    Hand,
    OtherHand,
    Deck,
    OtherDeck,
    Field,
    OtherField,
    Graveyard,
    OtherGraveyard,
    Parent,
}

impl Source {
    pub const ALL: [Source; 10] = [
        Source::Board,
        Source::Hand,
        Source::OtherHand,
        Source::Deck,
        Source::OtherDeck,
        Source::Field,
        Source::OtherField,
        Source::Graveyard,
        Source::OtherGraveyard,
        Source::Parent,
    ];

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Board => "board",
            Self::Hand => "hand",
            Self::OtherHand => "otherHand",
            Self::Deck => "deck",
            Self::OtherDeck => "otherDeck",
            Self::Field => "field",
            Self::OtherField => "otherField",
            Self::Graveyard => "graveyard",
            Self::OtherGraveyard => "otherGraveyard",
            Self::Parent => "parent",
        }
    }

    /// The live collection this source names, or `None` for `parent`.
    #[must_use]
    pub fn zone(self, trigger: PlayerId, player_count: usize) -> Option<ZoneRef> {
        let other = trigger.next(player_count);
        let zone = |owner, kind| Some(ZoneRef::Player(ZoneId::new(owner, kind)));
        match self {
            Self::Board => Some(ZoneRef::Board),
            Self::Hand => zone(trigger, ZoneKind::Hand),
            Self::OtherHand => zone(other, ZoneKind::Hand),
            Self::Deck => zone(trigger, ZoneKind::Deck),
            Self::OtherDeck => zone(other, ZoneKind::Deck),
            Self::Field => zone(trigger, ZoneKind::Field),
            Self::OtherField => zone(other, ZoneKind::Field),
            Self::Graveyard => zone(trigger, ZoneKind::Graveyard),
            Self::OtherGraveyard => zone(other, ZoneKind::Graveyard),
            Self::Parent => None,
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Compiled `Selector` block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selector {
    pub source: Source,
    /// Bool expression; a literal `false` when the file omits it.
    pub single: Expr,
    pub predicate: Lambda,
}
