//! Engine configuration types.
//!
//! - `ZoneId`: a player's deck, hand, field or graveyard
//! - `EngineConfig`: players, seed and opening hand for a `GameState`
//! - `ExecutorConfig`: limits applied while running effect actions
//!
//! Both configs are plain data with `Default` and builder-style `with_*`
//! methods.

use serde::{Deserialize, Serialize};

use super::PlayerId;

/// The four per-player card zones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneKind {
    Deck,
    Hand,
    Field,
    Graveyard,
}

impl ZoneKind {
    pub const ALL: [ZoneKind; 4] = [
        ZoneKind::Deck,
        ZoneKind::Hand,
        ZoneKind::Field,
        ZoneKind::Graveyard,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Deck => "deck",
            Self::Hand => "hand",
            Self::Field => "field",
            Self::Graveyard => "graveyard",
        }
    }
}

/// One player's zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ZoneId {
    pub owner: PlayerId,
    pub kind: ZoneKind,
}

impl ZoneId {
    #[must_use]
    pub const fn new(owner: PlayerId, kind: ZoneKind) -> Self {
        Self { owner, kind }
    }

    #[must_use]
    pub const fn deck(owner: PlayerId) -> Self {
        Self::new(owner, ZoneKind::Deck)
    }

    #[must_use]
    pub const fn hand(owner: PlayerId) -> Self {
        Self::new(owner, ZoneKind::Hand)
    }

    #[must_use]
    pub const fn field(owner: PlayerId) -> Self {
        Self::new(owner, ZoneKind::Field)
    }

    #[must_use]
    pub const fn graveyard(owner: PlayerId) -> Self {
        Self::new(owner, ZoneKind::Graveyard)
    }
}

impl std::fmt::Display for ZoneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.owner, self.kind.name())
    }
}

/// Game setup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Number of players (1-255).
    pub player_count: usize,

    /// Seed for the deterministic RNG behind every shuffle.
    pub seed: u64,

    /// Cards drawn by each player in `GameState::deal_opening_hands`.
    pub starting_hand_size: usize,
}

impl EngineConfig {
    /// Create a configuration for `player_count` players.
    #[must_use]
    pub fn new(player_count: usize) -> Self {
        assert!(player_count > 0, "Must have at least 1 player");
        assert!(player_count <= 255, "At most 255 players supported");

        Self {
            player_count,
            seed: 0,
            starting_hand_size: 10,
        }
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_starting_hand_size(mut self, size: usize) -> Self {
        self.starting_hand_size = size;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(2)
    }
}

/// Limits for effect execution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Iterations a single `while` loop may run before it is a runtime fault.
    pub max_loop_iterations: usize,
}

impl ExecutorConfig {
    #[must_use]
    pub fn with_max_loop_iterations(mut self, limit: usize) -> Self {
        self.max_loop_iterations = limit;
        self
    }
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_loop_iterations: 10_000,
        }
    }
}
