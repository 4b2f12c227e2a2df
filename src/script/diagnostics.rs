//! Diagnostic collection for one compile session.
//!
//! Every stage of the pipeline (lexer, parser, checker, lowering) reports
//! problems by pushing a `Diagnostic` into a `Diagnostics` sink that the
//! caller owns. Nothing is ever thrown: a stage records the problem, picks a
//! recovery, and keeps going so the author sees every error in one pass.
//!
//! ## Tiers
//!
//! - `Lexical`: unrecognized characters, unterminated literals
//! - `Syntax`: malformed constructs (block-level recovery)
//! - `Semantic`: type mismatches, unknown members, unknown categories
//! - `Runtime`: faults while executing a compiled effect

use serde::{Deserialize, Serialize};

use super::lexer::Position;

/// Text shown when a compile produced no diagnostics.
pub const SUCCESS_MESSAGE: &str = "compilation succeeded";

/// Which stage produced a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    Lexical,
    Syntax,
    Semantic,
    Runtime,
}

/// A single reported problem.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub tier: Tier,
    pub message: String,
    pub position: Option<Position>,
}

impl Diagnostic {
    /// Create a diagnostic at a source position.
    pub fn new(tier: Tier, position: Position, message: impl Into<String>) -> Self {
        Self {
            tier,
            message: message.into(),
            position: Some(position),
        }
    }

    /// Create a runtime diagnostic (no source position).
    pub fn runtime(message: impl Into<String>) -> Self {
        Self {
            tier: Tier::Runtime,
            message: message.into(),
            position: None,
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.position {
            Some(pos) => write!(f, "{}: {}", pos, self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Render diagnostics one per line, or the success message when empty.
#[must_use]
pub fn render_diagnostics(diagnostics: &[Diagnostic]) -> String {
    if diagnostics.is_empty() {
        return SUCCESS_MESSAGE.to_string();
    }
    diagnostics
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Diagnostic sink passed by `&mut` through one compile session.
///
/// Stages use `mark()` / `has_errors_since()` to decide whether the block
/// they just processed produced problems of its own.
#[derive(Clone, Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        log::debug!("diagnostic: {}", diagnostic);
        self.entries.push(diagnostic);
    }

    pub fn lexical(&mut self, position: Position, message: impl Into<String>) {
        self.push(Diagnostic::new(Tier::Lexical, position, message));
    }

    pub fn syntax(&mut self, position: Position, message: impl Into<String>) {
        self.push(Diagnostic::new(Tier::Syntax, position, message));
    }

    pub fn semantic(&mut self, position: Position, message: impl Into<String>) {
        self.push(Diagnostic::new(Tier::Semantic, position, message));
    }

    /// Current length, for use with `has_errors_since`.
    #[must_use]
    pub fn mark(&self) -> usize {
        self.entries.len()
    }

    /// Whether anything was recorded after `mark`.
    #[must_use]
    pub fn has_errors_since(&self, mark: usize) -> bool {
        self.entries.len() > mark
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Consume the sink, yielding everything recorded.
    #[must_use]
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}
