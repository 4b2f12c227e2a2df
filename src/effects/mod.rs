//! Effect system for card abilities.
//!
//! - `EffectDefinition` / `EffectInvocation`: compiled effects and the way
//!   cards call them
//! - `Selector` / `Source`: how an invocation chooses its targets
//! - `GameContext`: what an action can see and change
//! - `execute` / `activate`: run invocations against a context
//!
//! Effects only reach the game through `GameContext`, so the executor
//! works the same against `GameState` and against test doubles.

mod context;
mod effect;
mod executor;
mod targeting;

pub use context::{GameContext, ZoneRef};
pub use effect::{Argument, EffectDefinition, EffectInvocation, Param};
pub use executor::{
    activate, execute, ActivationReport, ExecutionFailure, ExecutionReport, RuntimeError,
};
pub use targeting::{Selector, Source};
