//! Card registry for definition lookup.
//!
//! The `CardRegistry` stores the compiled definitions a game is built
//! from. It provides lookup by `CardId` and by name, which is how decks
//! are listed.

use rustc_hash::FxHashMap;

use super::attributes::{CardType, Faction};
use super::definition::{CardDefinition, CardId};

/// Registry of card definitions.
///
/// ## Example
///
/// ```
/// use card_script::cards::{CardDefinition, CardId, CardRegistry, CardType, Faction};
///
/// let mut registry = CardRegistry::new();
/// registry.register(CardDefinition::new(CardId::new(0), "Dandelion", CardType::Silver, Faction::Neutral));
///
/// let found = registry.get_by_name("Dandelion").unwrap();
/// assert_eq!(found.id, CardId::new(0));
/// ```
#[derive(Clone, Debug, Default)]
pub struct CardRegistry {
    cards: FxHashMap<CardId, CardDefinition>,
    by_name: FxHashMap<String, CardId>,
}

impl CardRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from compiled cards.
    ///
    /// Compiled cards have distinct ids and names, so this cannot panic on
    /// compiler output.
    #[must_use]
    pub fn from_cards(cards: impl IntoIterator<Item = CardDefinition>) -> Self {
        let mut registry = Self::new();
        for card in cards {
            registry.register(card);
        }
        registry
    }

    /// Register a card definition.
    ///
    /// Panics if a card with the same ID or name already exists.
    pub fn register(&mut self, card: CardDefinition) {
        if self.cards.contains_key(&card.id) {
            panic!("Card with ID {:?} already registered", card.id);
        }
        if self.by_name.contains_key(&card.name) {
            panic!("Card named {:?} already registered", card.name);
        }
        self.by_name.insert(card.name.clone(), card.id);
        self.cards.insert(card.id, card);
    }

    /// Get a card definition by ID.
    #[must_use]
    pub fn get(&self, id: CardId) -> Option<&CardDefinition> {
        self.cards.get(&id)
    }

    /// Get a card definition by its name.
    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<&CardDefinition> {
        self.by_name.get(name).and_then(|id| self.cards.get(id))
    }

    /// Check if a card ID is registered.
    #[must_use]
    pub fn contains(&self, id: CardId) -> bool {
        self.cards.contains_key(&id)
    }

    /// Get the number of registered cards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Iterate over all card definitions in id order.
    pub fn iter(&self) -> impl Iterator<Item = &CardDefinition> {
        let mut cards: Vec<_> = self.cards.values().collect();
        cards.sort_by_key(|c| c.id.raw());
        cards.into_iter()
    }

    /// Find cards by type.
    pub fn find_by_type(&self, card_type: CardType) -> impl Iterator<Item = &CardDefinition> {
        self.iter().filter(move |c| c.card_type == card_type)
    }

    /// Find cards by faction.
    pub fn find_by_faction(&self, faction: Faction) -> impl Iterator<Item = &CardDefinition> {
        self.iter().filter(move |c| c.faction == faction)
    }
}
