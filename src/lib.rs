//! # card-script
//!
//! Compiler and interpreter for a small card-game scripting language.
//!
//! A card file declares `effect` blocks (named, parameterized scripts) and
//! `card` blocks (name, type, faction, power, ranges and the effects run
//! when the card is played). `script::compile` turns a file into
//! `CardDefinition`s plus every diagnostic found along the way; the
//! `effects` executor runs a card's effects against any `GameContext`.
//!
//! ## Design Principles
//!
//! 1. **Collect, don't abort**: lexical, syntax and type errors are
//!    recorded and compilation continues, so one pass reports everything.
//!
//! 2. **Closed vocabularies**: card types, factions, ranges, selector
//!    sources and members are enums matched exhaustively.
//!
//! 3. **Context behind a trait**: effects reach the game only through
//!    `GameContext`. `GameState` is the reference implementation.
//!
//! ## Modules
//!
//! - `script`: lexer, parser, type checker and compiler
//! - `cards`: card attributes, definitions, instances and registry
//! - `effects`: compiled effects, selectors and the executor
//! - `core`: entity and player ids, configuration, RNG, `GameState`
//! - `zones`: per-player card zones

pub mod cards;
pub mod core;
pub mod effects;
pub mod script;
pub mod zones;

// Re-export commonly used types
pub use crate::core::{
    EngineConfig, EntityId, ExecutorConfig, GameRng, GameState, PlayError, PlayerId, ZoneId,
    ZoneKind,
};

pub use crate::zones::{ZoneManager, ZonePosition};

pub use crate::cards::{
    BoardZone, CardDefinition, CardId, CardInstance, CardRegistry, CardType, Faction, Range,
};

pub use crate::effects::{
    activate, execute, ActivationReport, EffectDefinition, EffectInvocation, ExecutionFailure,
    ExecutionReport, GameContext, RuntimeError, Selector, Source, ZoneRef,
};

pub use crate::script::{
    compile, compile_source, CompileError, Compilation, Diagnostic, Diagnostics, ValueKind,
};
