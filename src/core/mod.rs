//! Core engine types: entities, players, zones, configuration, RNG and the
//! reference game state.

pub mod config;
pub mod entity;
pub mod player;
pub mod rng;
pub mod state;

pub use config::{EngineConfig, ExecutorConfig, ZoneId, ZoneKind};
pub use entity::EntityId;
pub use player::PlayerId;
pub use rng::GameRng;
pub use state::{GameState, PlayError};
