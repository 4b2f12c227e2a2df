//! Zone manager for card locations and movement.
//!
//! The `ZoneManager` tracks which zone every card is in and keeps each
//! zone's order. All zones are ordered bottom to top: index 0 is the
//! bottom, the last index is the top. `Pop` and draws take the top.
//!
//! Orders are `im::Vector`s so that cloning a whole game is cheap.

use im::Vector;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::config::{ZoneId, ZoneKind};
use crate::core::entity::EntityId;
use crate::core::player::PlayerId;
use crate::core::rng::GameRng;

/// Where a card enters a zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZonePosition {
    /// On top (the end of the order).
    Top,
    /// Underneath everything else.
    Bottom,
}

/// Tracks card locations across zones.
///
/// ## Usage
///
/// ```
/// use card_script::core::{EntityId, PlayerId, ZoneId};
/// use card_script::zones::{ZoneManager, ZonePosition};
///
/// let mut manager = ZoneManager::new(2);
/// let deck = ZoneId::deck(PlayerId::new(0));
///
/// manager.add_to_zone(EntityId(10), deck, ZonePosition::Top);
/// manager.add_to_zone(EntityId(11), deck, ZonePosition::Bottom);
///
/// assert_eq!(manager.cards_in_zone(deck), vec![EntityId(11), EntityId(10)]);
/// assert_eq!(manager.top_card(deck), Some(EntityId(10)));
/// ```
#[derive(Clone, Debug, Default)]
pub struct ZoneManager {
    /// Card locations: entity_id -> zone_id
    locations: FxHashMap<EntityId, ZoneId>,

    /// Card order per zone, bottom to top.
    zone_order: FxHashMap<ZoneId, Vector<EntityId>>,
}

impl ZoneManager {
    /// Create a manager with the four zones of every player.
    #[must_use]
    pub fn new(player_count: usize) -> Self {
        let mut manager = Self::default();
        for player in PlayerId::all(player_count) {
            for kind in ZoneKind::ALL {
                manager
                    .zone_order
                    .insert(ZoneId::new(player, kind), Vector::new());
            }
        }
        manager
    }

    fn insert(&mut self, entity: EntityId, zone: ZoneId, position: ZonePosition) {
        self.locations.insert(entity, zone);
        let order = self.zone_order.entry(zone).or_default();
        match position {
            ZonePosition::Top => order.push_back(entity),
            ZonePosition::Bottom => order.push_front(entity),
        }
    }

    fn detach(&mut self, entity: EntityId, zone: ZoneId) {
        if let Some(order) = self.zone_order.get_mut(&zone) {
            if let Some(index) = order.index_of(&entity) {
                order.remove(index);
            }
        }
    }

    /// Add a card that is not yet tracked.
    ///
    /// Panics if the entity is already in the manager.
    pub fn add_to_zone(&mut self, entity: EntityId, zone: ZoneId, position: ZonePosition) {
        if self.locations.contains_key(&entity) {
            panic!("Entity {:?} already exists in zone manager", entity);
        }
        self.insert(entity, zone, position);
    }

    /// Move a card to `new_zone`, adding it if it was not tracked.
    ///
    /// Moving a card within its own zone repositions it. Returns the zone
    /// the card came from.
    pub fn move_to_zone(
        &mut self,
        entity: EntityId,
        new_zone: ZoneId,
        position: ZonePosition,
    ) -> Option<ZoneId> {
        let old_zone = self.locations.get(&entity).copied();
        if let Some(old_zone) = old_zone {
            self.detach(entity, old_zone);
        }
        self.insert(entity, new_zone, position);
        old_zone
    }

    /// Stop tracking a card.
    ///
    /// Returns the zone it was in, or `None` if not found.
    pub fn remove(&mut self, entity: EntityId) -> Option<ZoneId> {
        let zone = self.locations.remove(&entity)?;
        self.detach(entity, zone);
        Some(zone)
    }

    /// Get the zone a card is in.
    #[must_use]
    pub fn get_zone(&self, entity: EntityId) -> Option<ZoneId> {
        self.locations.get(&entity).copied()
    }

    /// Check if a card is in a specific zone.
    #[must_use]
    pub fn is_in_zone(&self, entity: EntityId, zone: ZoneId) -> bool {
        self.locations.get(&entity) == Some(&zone)
    }

    /// Cards in a zone, bottom to top.
    #[must_use]
    pub fn cards_in_zone(&self, zone: ZoneId) -> Vec<EntityId> {
        self.zone_order
            .get(&zone)
            .map(|order| order.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Get the number of cards in a zone.
    #[must_use]
    pub fn zone_size(&self, zone: ZoneId) -> usize {
        self.zone_order.get(&zone).map_or(0, Vector::len)
    }

    /// Get the top card of a zone.
    #[must_use]
    pub fn top_card(&self, zone: ZoneId) -> Option<EntityId> {
        self.zone_order.get(&zone)?.last().copied()
    }

    /// Remove and return the top card of a zone.
    pub fn pop_top(&mut self, zone: ZoneId) -> Option<EntityId> {
        let entity = self.zone_order.get_mut(&zone)?.pop_back()?;
        self.locations.remove(&entity);
        Some(entity)
    }

    /// Shuffle a zone.
    pub fn shuffle_zone(&mut self, zone: ZoneId, rng: &mut GameRng) {
        if let Some(order) = self.zone_order.get_mut(&zone) {
            let mut cards: Vec<EntityId> = order.iter().copied().collect();
            rng.shuffle(&mut cards);
            *order = cards.into_iter().collect();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const P0: PlayerId = PlayerId(0);
    const P1: PlayerId = PlayerId(1);

    #[test]
    fn test_add_and_get() {
        let mut manager = ZoneManager::new(2);
        let hand = ZoneId::hand(P0);

        manager.add_to_zone(EntityId(10), hand, ZonePosition::Top);
        manager.add_to_zone(EntityId(11), hand, ZonePosition::Top);

        assert_eq!(manager.get_zone(EntityId(10)), Some(hand));
        assert_eq!(manager.get_zone(EntityId(99)), None);
        assert!(manager.is_in_zone(EntityId(11), hand));
        assert_eq!(manager.zone_size(hand), 2);
    }

    #[test]
    fn test_order_bottom_to_top() {
        let mut manager = ZoneManager::new(2);
        let deck = ZoneId::deck(P0);

        // 10 to top, 11 to bottom, 12 to top
        manager.add_to_zone(EntityId(10), deck, ZonePosition::Top);
        manager.add_to_zone(EntityId(11), deck, ZonePosition::Bottom);
        manager.add_to_zone(EntityId(12), deck, ZonePosition::Top);

        assert_eq!(
            manager.cards_in_zone(deck),
            vec![EntityId(11), EntityId(10), EntityId(12)]
        );
        assert_eq!(manager.top_card(deck), Some(EntityId(12)));
    }

    #[test]
    fn test_move_between_players() {
        let mut manager = ZoneManager::new(2);
        let from = ZoneId::field(P0);
        let to = ZoneId::graveyard(P1);

        manager.add_to_zone(EntityId(10), from, ZonePosition::Top);
        let old = manager.move_to_zone(EntityId(10), to, ZonePosition::Top);

        assert_eq!(old, Some(from));
        assert_eq!(manager.get_zone(EntityId(10)), Some(to));
        assert_eq!(manager.zone_size(from), 0);
        assert_eq!(manager.zone_size(to), 1);
    }

    #[test]
    fn test_move_within_zone_repositions() {
        let mut manager = ZoneManager::new(1);
        let deck = ZoneId::deck(P0);

        manager.add_to_zone(EntityId(1), deck, ZonePosition::Top);
        manager.add_to_zone(EntityId(2), deck, ZonePosition::Top);
        manager.move_to_zone(EntityId(2), deck, ZonePosition::Bottom);

        assert_eq!(manager.cards_in_zone(deck), vec![EntityId(2), EntityId(1)]);
    }

    #[test]
    fn test_move_untracked_adds() {
        let mut manager = ZoneManager::new(1);
        let hand = ZoneId::hand(P0);

        assert_eq!(manager.move_to_zone(EntityId(5), hand, ZonePosition::Top), None);
        assert_eq!(manager.get_zone(EntityId(5)), Some(hand));
    }

    #[test]
    fn test_remove() {
        let mut manager = ZoneManager::new(1);
        let field = ZoneId::field(P0);

        manager.add_to_zone(EntityId(10), field, ZonePosition::Top);

        assert_eq!(manager.remove(EntityId(10)), Some(field));
        assert_eq!(manager.get_zone(EntityId(10)), None);
        assert_eq!(manager.zone_size(field), 0);
        assert_eq!(manager.remove(EntityId(10)), None);
    }

    #[test]
    fn test_pop_top() {
        let mut manager = ZoneManager::new(1);
        let deck = ZoneId::deck(P0);

        manager.add_to_zone(EntityId(10), deck, ZonePosition::Top);
        manager.add_to_zone(EntityId(11), deck, ZonePosition::Top);

        assert_eq!(manager.pop_top(deck), Some(EntityId(11)));
        assert_eq!(manager.get_zone(EntityId(11)), None);
        assert_eq!(manager.pop_top(deck), Some(EntityId(10)));
        assert_eq!(manager.pop_top(deck), None);
    }

    #[test]
    fn test_shuffle() {
        let mut manager = ZoneManager::new(1);
        let deck = ZoneId::deck(P0);

        for i in 0..20 {
            manager.add_to_zone(EntityId(i), deck, ZonePosition::Top);
        }

        let before = manager.cards_in_zone(deck);
        manager.shuffle_zone(deck, &mut GameRng::new(42));
        let mut after = manager.cards_in_zone(deck);

        assert_ne!(before, after);
        after.sort();
        assert_eq!(before, after);
    }

    #[test]
    #[should_panic(expected = "Entity")]
    fn test_duplicate_entity_panics() {
        let mut manager = ZoneManager::new(1);
        let hand = ZoneId::hand(P0);

        manager.add_to_zone(EntityId(10), hand, ZonePosition::Top);
        manager.add_to_zone(EntityId(10), hand, ZonePosition::Top);
    }
}
