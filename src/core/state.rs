//! Reference game state.
//!
//! `GameState` holds every card instance of a game, where each one is, and
//! the RNG behind shuffles. It implements `GameContext`, so compiled card
//! effects run directly against it.
//!
//! ## Board
//!
//! The board is every player's field in seat order. Cards on a field also
//! remember the `BoardZone` slot they were played into; the slot is
//! forgotten as soon as the card leaves the field.

use rustc_hash::FxHashMap;
use thiserror::Error;

use super::config::{EngineConfig, ExecutorConfig, ZoneId, ZoneKind};
use super::entity::EntityId;
use super::player::PlayerId;
use super::rng::GameRng;
use crate::cards::{BoardZone, CardDefinition, CardId, CardInstance, CardRegistry};
use crate::effects::{activate, ActivationReport, GameContext, ZoneRef};
use crate::zones::{ZoneManager, ZonePosition};

/// Why a card could not be played.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PlayError {
    #[error("{0} does not exist")]
    MissingCard(EntityId),

    #[error("{card} is not in {player}'s hand")]
    NotInHand { player: PlayerId, card: EntityId },

    #[error("{0} is not in the card registry")]
    UnknownCard(CardId),

    #[error("`{card}` cannot be played into the {zone}")]
    IllegalZone { card: String, zone: BoardZone },
}

/// Complete state of one game.
#[derive(Clone, Debug)]
pub struct GameState {
    config: EngineConfig,

    /// Card locations.
    pub zones: ZoneManager,

    /// Card instances by entity ID.
    cards: FxHashMap<EntityId, CardInstance>,

    /// Slot of every card played onto a field.
    placements: FxHashMap<EntityId, BoardZone>,

    /// Deterministic RNG for shuffles.
    rng: GameRng,

    /// The player whose card is being played; scripts see it as the
    /// trigger player.
    pub active_player: PlayerId,

    next_entity: EntityId,
}

impl GameState {
    /// Create an empty game.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            zones: ZoneManager::new(config.player_count),
            cards: FxHashMap::default(),
            placements: FxHashMap::default(),
            rng: GameRng::new(config.seed).for_context("shuffle"),
            active_player: PlayerId::new(0),
            next_entity: EntityId::new(0),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.config.player_count
    }

    // === Cards ===

    /// Create an instance of `definition` on top of `zone`.
    pub fn spawn(&mut self, definition: &CardDefinition, owner: PlayerId, zone: ZoneId) -> EntityId {
        let entity = self.next_entity;
        self.next_entity = entity.next();
        self.cards
            .insert(entity, CardInstance::new(entity, definition, owner));
        self.zones.add_to_zone(entity, zone, ZonePosition::Top);
        entity
    }

    /// Spawn a deck for `player` and shuffle it.
    pub fn load_deck<'d>(
        &mut self,
        player: PlayerId,
        definitions: impl IntoIterator<Item = &'d CardDefinition>,
    ) -> Vec<EntityId> {
        let deck = ZoneId::deck(player);
        let spawned: Vec<_> = definitions
            .into_iter()
            .map(|definition| self.spawn(definition, player, deck))
            .collect();
        self.zones.shuffle_zone(deck, &mut self.rng);
        log::debug!("loaded {} cards into {}", spawned.len(), deck);
        spawned
    }

    #[must_use]
    pub fn card(&self, entity: EntityId) -> Option<&CardInstance> {
        self.cards.get(&entity)
    }

    /// Slot a card on a field was played into.
    #[must_use]
    pub fn placement(&self, entity: EntityId) -> Option<BoardZone> {
        self.placements.get(&entity).copied()
    }

    /// Cards in one player's zone, bottom to top.
    #[must_use]
    pub fn cards_in(&self, zone: ZoneId) -> Vec<EntityId> {
        self.zones.cards_in_zone(zone)
    }

    // === Turn flow ===

    /// Move the top card of `player`'s deck into their hand.
    ///
    /// Returns the drawn card, or `None` if the deck is empty.
    pub fn draw(&mut self, player: PlayerId) -> Option<EntityId> {
        let card = self.zones.top_card(ZoneId::deck(player))?;
        self.zones
            .move_to_zone(card, ZoneId::hand(player), ZonePosition::Top);
        Some(card)
    }

    /// Every player draws `starting_hand_size` cards.
    pub fn deal_opening_hands(&mut self) {
        for player in PlayerId::all(self.player_count()) {
            for _ in 0..self.config.starting_hand_size {
                if self.draw(player).is_none() {
                    break;
                }
            }
        }
    }

    /// Play a card from `player`'s hand into `zone` and activate it.
    ///
    /// The card moves to the player's field before its effects run. Effect
    /// failures are reported in the `ActivationReport`, not as an error.
    pub fn play_card(
        &mut self,
        player: PlayerId,
        entity: EntityId,
        zone: BoardZone,
        registry: &CardRegistry,
        config: &ExecutorConfig,
    ) -> Result<ActivationReport, PlayError> {
        let instance = self.cards.get(&entity).ok_or(PlayError::MissingCard(entity))?;
        if !self.zones.is_in_zone(entity, ZoneId::hand(player)) {
            return Err(PlayError::NotInHand {
                player,
                card: entity,
            });
        }
        let definition = registry
            .get(instance.card_id)
            .ok_or(PlayError::UnknownCard(instance.card_id))?;
        if !definition.placements().contains(&zone) {
            return Err(PlayError::IllegalZone {
                card: definition.name.clone(),
                zone,
            });
        }

        self.zones
            .move_to_zone(entity, ZoneId::field(player), ZonePosition::Top);
        self.placements.insert(entity, zone);
        self.active_player = player;
        log::debug!("{} plays `{}` into the {}", player, definition.name, zone);

        Ok(activate(definition, self, config))
    }

    // === Zone helpers ===

    fn resolve(&self, zone: ZoneRef) -> ZoneId {
        match zone {
            ZoneRef::Player(zone) => zone,
            ZoneRef::Board => ZoneId::field(self.active_player),
        }
    }

    fn fields(&self) -> impl DoubleEndedIterator<Item = ZoneId> {
        PlayerId::all(self.player_count())
            .collect::<Vec<_>>()
            .into_iter()
            .map(ZoneId::field)
    }

    fn left_zone(&mut self, card: EntityId, from: Option<ZoneId>, to: Option<ZoneId>) {
        let was_on_field = from.map_or(false, |zone| zone.kind == ZoneKind::Field);
        if was_on_field && from != to {
            self.placements.remove(&card);
        }
    }
}

impl GameContext for GameState {
    fn trigger_player(&self) -> PlayerId {
        self.active_player
    }

    fn player_count(&self) -> usize {
        self.config.player_count
    }

    fn cards(&self, zone: ZoneRef) -> Vec<EntityId> {
        match zone {
            ZoneRef::Player(zone) => self.zones.cards_in_zone(zone),
            ZoneRef::Board => self
                .fields()
                .flat_map(|field| self.zones.cards_in_zone(field))
                .collect(),
        }
    }

    fn push(&mut self, zone: ZoneRef, card: EntityId, position: ZonePosition) {
        let target = self.resolve(zone);
        let from = self.zones.move_to_zone(card, target, position);
        self.left_zone(card, from, Some(target));
    }

    fn pop(&mut self, zone: ZoneRef) -> Option<EntityId> {
        let source = match zone {
            ZoneRef::Player(zone) => zone,
            ZoneRef::Board => self
                .fields()
                .rev()
                .find(|&field| self.zones.zone_size(field) > 0)?,
        };
        let card = self.zones.pop_top(source)?;
        self.left_zone(card, Some(source), None);
        Some(card)
    }

    fn remove(&mut self, zone: ZoneRef, card: EntityId) -> bool {
        let Some(current) = self.zones.get_zone(card) else {
            return false;
        };
        let inside = match zone {
            ZoneRef::Player(zone) => current == zone,
            ZoneRef::Board => current.kind == ZoneKind::Field,
        };
        if inside {
            self.zones.remove(card);
            self.left_zone(card, Some(current), None);
        }
        inside
    }

    fn shuffle(&mut self, zone: ZoneRef) {
        match zone {
            ZoneRef::Player(zone) => self.zones.shuffle_zone(zone, &mut self.rng),
            ZoneRef::Board => {
                for field in self.fields().collect::<Vec<_>>() {
                    self.zones.shuffle_zone(field, &mut self.rng);
                }
            }
        }
    }

    fn shuffle_cards(&mut self, cards: &mut [EntityId]) {
        self.rng.shuffle(cards);
    }

    fn card(&self, card: EntityId) -> Option<&CardInstance> {
        self.cards.get(&card)
    }

    fn set_power(&mut self, card: EntityId, power: i64) -> bool {
        match self.cards.get_mut(&card) {
            Some(instance) => {
                instance.power = power;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardType, Faction, Range};

    const P0: PlayerId = PlayerId(0);
    const P1: PlayerId = PlayerId(1);

    fn soldier(id: u32) -> CardDefinition {
        CardDefinition::new(CardId::new(id), format!("Soldier {}", id), CardType::Silver, Faction::Skellige)
            .with_power(3)
            .with_ranges([Range::Melee])
    }

    fn game() -> GameState {
        GameState::new(EngineConfig::new(2).with_seed(7).with_starting_hand_size(2))
    }

    #[test]
    fn test_spawn_and_draw() {
        let mut state = game();
        let a = state.spawn(&soldier(0), P0, ZoneId::deck(P0));
        let b = state.spawn(&soldier(1), P0, ZoneId::deck(P0));

        assert_eq!(state.draw(P0), Some(b));
        assert_eq!(state.cards_in(ZoneId::hand(P0)), vec![b]);
        assert_eq!(state.cards_in(ZoneId::deck(P0)), vec![a]);
        assert_eq!(state.draw(P1), None);
    }

    #[test]
    fn test_deal_opening_hands() {
        let mut state = game();
        let cards: Vec<_> = (0..3).map(soldier).collect();
        state.load_deck(P0, &cards);
        state.load_deck(P1, &cards[..1]);

        state.deal_opening_hands();

        assert_eq!(state.zones.zone_size(ZoneId::hand(P0)), 2);
        assert_eq!(state.zones.zone_size(ZoneId::deck(P0)), 1);
        assert_eq!(state.zones.zone_size(ZoneId::hand(P1)), 1);
    }

    #[test]
    fn test_load_deck_is_deterministic() {
        let cards: Vec<_> = (0..10).map(soldier).collect();
        let mut a = game();
        let mut b = game();
        a.load_deck(P0, &cards);
        b.load_deck(P0, &cards);

        let names = |state: &GameState| -> Vec<String> {
            state
                .cards_in(ZoneId::deck(P0))
                .into_iter()
                .map(|e| state.card(e).unwrap().name.clone())
                .collect()
        };
        assert_eq!(names(&a), names(&b));
    }

    #[test]
    fn test_play_card_validates() {
        let registry = CardRegistry::from_cards([soldier(0)]);
        let definition = registry.get(CardId::new(0)).unwrap().clone();
        let mut state = game();
        let in_deck = state.spawn(&definition, P0, ZoneId::deck(P0));
        let in_hand = state.spawn(&definition, P0, ZoneId::hand(P0));
        let config = ExecutorConfig::default();

        assert_eq!(
            state
                .play_card(P0, in_deck, BoardZone::Row(Range::Melee), &registry, &config)
                .unwrap_err(),
            PlayError::NotInHand {
                player: P0,
                card: in_deck
            }
        );
        assert!(matches!(
            state.play_card(P0, in_hand, BoardZone::Row(Range::Siege), &registry, &config),
            Err(PlayError::IllegalZone { .. })
        ));

        let report = state
            .play_card(P0, in_hand, BoardZone::Row(Range::Melee), &registry, &config)
            .unwrap();
        assert!(report.is_clean());
        assert_eq!(state.cards_in(ZoneId::field(P0)), vec![in_hand]);
        assert_eq!(state.placement(in_hand), Some(BoardZone::Row(Range::Melee)));
    }

    #[test]
    fn test_board_spans_fields() {
        let mut state = game();
        let a = state.spawn(&soldier(0), P0, ZoneId::field(P0));
        let b = state.spawn(&soldier(1), P1, ZoneId::field(P1));

        assert_eq!(state.cards(ZoneRef::Board), vec![a, b]);
        assert_eq!(state.pop(ZoneRef::Board), Some(b));
        assert!(state.remove(ZoneRef::Board, a));
        assert!(state.cards(ZoneRef::Board).is_empty());
        assert_eq!(state.pop(ZoneRef::Board), None);
    }

    #[test]
    fn test_push_moves_and_clears_placement() {
        let registry = CardRegistry::from_cards([soldier(0)]);
        let mut state = game();
        let card = state.spawn(registry.get(CardId::new(0)).unwrap(), P0, ZoneId::hand(P0));
        state
            .play_card(P0, card, BoardZone::Row(Range::Melee), &registry, &ExecutorConfig::default())
            .unwrap();

        state.push(ZoneRef::Player(ZoneId::graveyard(P0)), card, ZonePosition::Bottom);

        assert_eq!(state.zones.get_zone(card), Some(ZoneId::graveyard(P0)));
        assert_eq!(state.placement(card), None);
    }

    #[test]
    fn test_set_power() {
        let mut state = game();
        let card = state.spawn(&soldier(0), P0, ZoneId::hand(P0));

        assert!(state.set_power(card, 11));
        assert_eq!(state.card(card).unwrap().power, 11);
        assert!(!state.set_power(EntityId(99), 1));
    }
}
