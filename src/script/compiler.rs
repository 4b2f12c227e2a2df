//! Card compiler: source text to compiled cards plus diagnostics.
//!
//! ## Pipeline
//!
//! 1. Tokenize (lexical diagnostics)
//! 2. Parse into `effect`/`card` blocks (syntax diagnostics)
//! 3. Lower the built-in effects, then the file's effects in order
//! 4. Lower every card against the effect table (semantic diagnostics)
//!
//! Each call owns its `Diagnostics` sink and effect table, so compiles are
//! independent and repeatable. A block with any diagnostic of its own is
//! left out of `Compilation::cards`; every other block still compiles.

use std::path::{Path, PathBuf};

use thiserror::Error;

use super::ast::TopLevel;
use super::diagnostics::{render_diagnostics, Diagnostic, Diagnostics};
use super::lexer::{tokenize, Position};
use super::lower::Lowering;
use super::parser::parse;
use crate::cards::{CardDefinition, CardRegistry};

/// Effects every card file can use without declaring them.
///
/// - `Draw`: the trigger player draws the top card of their deck.
/// - `ReturnToDeck`: each target goes back into its owner's deck, which is
///   then shuffled.
pub const PRELUDE: &str = r#"
effect {
    Name: "Draw",
    Action: (targets, context) => {
        context.Hand.Push(context.Deck.Pop());
    }
}

effect {
    Name: "ReturnToDeck",
    Action: (targets, context) => {
        for target in targets {
            deck = context.DeckOfPlayer(target.Owner);
            deck.Push(target);
            deck.Shuffle();
        };
    }
}
"#;

/// Fatal compile failures. Problems in the file itself are diagnostics.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result of compiling one card file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Compilation {
    /// Cards that compiled cleanly, in file order.
    pub cards: Vec<CardDefinition>,

    /// Everything reported, in the order it was found.
    pub diagnostics: Vec<Diagnostic>,
}

impl Compilation {
    /// True when the file produced no diagnostics.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Diagnostics one per line, or the success message.
    #[must_use]
    pub fn report(&self) -> String {
        render_diagnostics(&self.diagnostics)
    }

    /// A registry holding the compiled cards.
    #[must_use]
    pub fn registry(&self) -> CardRegistry {
        CardRegistry::from_cards(self.cards.iter().cloned())
    }
}

/// Compile the card file at `path`.
pub fn compile(path: impl AsRef<Path>) -> Result<Compilation, CompileError> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path).map_err(|source| CompileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    log::trace!("compiling {}", path.display());
    Ok(compile_source(&source))
}

/// Compile card file text.
///
/// ```
/// use card_script::script::compile_source;
///
/// let compilation = compile_source(r#"
///     card {
///         Type: "Leader",
///         Name: "Eredin",
///         Faction: "Monsters",
///         OnActivation: [{ Effect: "Draw" }]
///     }
/// "#);
///
/// assert!(compilation.is_clean());
/// assert_eq!(compilation.cards[0].name, "Eredin");
/// ```
#[must_use]
pub fn compile_source(source: &str) -> Compilation {
    let mut lowering = Lowering::new();
    load_prelude(&mut lowering);

    let mut diagnostics = Diagnostics::new();
    let tokens = tokenize(source, &mut diagnostics);
    log::trace!("lexed {} tokens", tokens.len());
    let lexical: Vec<Position> = diagnostics.iter().filter_map(|d| d.position).collect();

    let blocks = parse(&tokens, &mut diagnostics);
    let faults = lexical_faults(&blocks, &lexical);

    let mut cards = Vec::new();
    let mut pending = Vec::new();
    for (block, faulted) in blocks.into_iter().zip(faults) {
        match block {
            TopLevel::Effect(effect) => lowering.lower_effect(effect, faulted, &mut diagnostics),
            TopLevel::Card(card) => pending.push((card, faulted)),
        }
    }
    log::trace!("{} effects registered", lowering.effects().len());
    for (card, faulted) in pending {
        cards.extend(lowering.lower_card(card, faulted, &mut diagnostics));
    }

    let diagnostics = diagnostics.into_vec();
    log::debug!(
        "compiled {} cards with {} diagnostics",
        cards.len(),
        diagnostics.len()
    );
    Compilation { cards, diagnostics }
}

fn load_prelude(lowering: &mut Lowering) {
    let mut diagnostics = Diagnostics::new();
    let tokens = tokenize(PRELUDE, &mut diagnostics);
    for block in parse(&tokens, &mut diagnostics) {
        if let TopLevel::Effect(effect) = block {
            lowering.lower_effect(effect, false, &mut diagnostics);
        }
    }
    for diagnostic in diagnostics.iter() {
        log::error!("built-in effects: {}", diagnostic);
    }
}

/// For each block, whether a lexical diagnostic falls between its keyword
/// and its closing brace.
///
/// Faults inside abandoned blocks or in skipped top-level text belong to no
/// parsed block and cost nothing beyond their own diagnostic.
fn lexical_faults(blocks: &[TopLevel], lexical: &[Position]) -> Vec<bool> {
    blocks
        .iter()
        .map(|block| lexical.iter().any(|&at| block.spans(at)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prelude_compiles_cleanly() {
        let mut diagnostics = Diagnostics::new();
        let tokens = tokenize(PRELUDE, &mut diagnostics);
        let blocks = parse(&tokens, &mut diagnostics);
        let mut lowering = Lowering::new();
        for block in blocks {
            if let TopLevel::Effect(effect) = block {
                lowering.lower_effect(effect, false, &mut diagnostics);
            }
        }
        assert!(diagnostics.is_empty(), "{:?}", diagnostics.iter().collect::<Vec<_>>());
        assert_eq!(lowering.effects().len(), 2);
    }

    #[test]
    fn test_empty_source() {
        let compilation = compile_source("");
        assert!(compilation.cards.is_empty());
        assert!(compilation.is_clean());
        assert_eq!(compilation.report(), "compilation succeeded");
    }

    #[test]
    fn test_prelude_name_is_reserved() {
        let compilation = compile_source(
            r#"effect { Name: "Draw", Action: (targets, context) => { } }"#,
        );
        assert_eq!(compilation.diagnostics.len(), 1);
        assert_eq!(
            compilation.diagnostics[0].message,
            "effect `Draw` is already defined"
        );
    }

    #[test]
    fn test_lexical_error_drops_only_its_block() {
        let compilation = compile_source(
            r#"
            card { Type: "Leader", Name: "A", Faction: "Neutral", Description: "ok" # }
            card { Type: "Leader", Name: "B", Faction: "Neutral" }
            "#,
        );
        let names: Vec<_> = compilation.cards.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["B"]);
        assert_eq!(compilation.diagnostics.len(), 1);
    }

    fn names(compilation: &Compilation) -> Vec<&str> {
        compilation.cards.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_lexical_error_in_abandoned_block() {
        let compilation = compile_source(
            r#"
            card { Type: "Leader", Name: "A", Faction: "Neutral" }
            card { Name: "B" $, OnActivation: [ { Effect: } ] }
            "#,
        );
        assert_eq!(names(&compilation), ["A"]);
        assert_eq!(compilation.diagnostics[0].tier, crate::script::Tier::Lexical);
    }

    #[test]
    fn test_lexical_error_between_blocks() {
        let compilation = compile_source(
            "card { Type: \"Leader\", Name: \"A\", Faction: \"Neutral\" }\n$\ncard { Type: \"Leader\", Name: \"C\", Faction: \"Neutral\" }",
        );
        assert_eq!(names(&compilation), ["A", "C"]);
        assert_eq!(compilation.report(), "2:1: unexpected character `$`");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = compile("/nonexistent/cards.txt").unwrap_err();
        assert!(err.to_string().starts_with("failed to read /nonexistent/cards.txt"));
    }
}
