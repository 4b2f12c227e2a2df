//! Card system: attributes, definitions, instances, and registry.
//!
//! ## Key Types
//!
//! - `CardType`, `Faction`, `Range`, `BoardZone`: closed card attributes
//! - `CardId`: Identifier for card definitions
//! - `CardDefinition`: Compiled card data and its effect invocations
//! - `CardInstance`: One copy of a card in a game
//! - `CardRegistry`: Card definition lookup

pub mod attributes;
pub mod definition;
pub mod instance;
pub mod registry;

pub use attributes::{BoardZone, CardType, Faction, Range, Ranges};
pub use definition::{CardDefinition, CardId};
pub use instance::CardInstance;
pub use registry::CardRegistry;
