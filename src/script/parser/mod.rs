//! Parser: token stream to block ASTs.
//!
//! ## Recovery
//!
//! - A malformed header field (`Power: "ten"`) records a diagnostic,
//!   substitutes a placeholder and continues with the next field.
//! - Any other syntax error aborts the current `card`/`effect` block: one
//!   diagnostic is recorded, tokens are skipped to the end of the block, and
//!   parsing resumes with the next block.
//! - Stray top-level tokens are skipped up to the next `card`/`effect`
//!   keyword with a single diagnostic.
//! - Expressions, statement bodies and post actions may nest at most
//!   `MAX_NESTING` levels; deeper input aborts the block like any other
//!   syntax error, so later passes never recurse without bound.
//!
//! ## Layout
//!
//! - `expr`: precedence climbing and member chains
//! - `stmt`: effect action statements
//! - `blocks`: `effect`, `card`, invocation and selector blocks

mod blocks;
mod expr;
mod stmt;

use super::ast::{Expr, TopLevel};
use super::diagnostics::Diagnostics;
use super::lexer::{Position, Token, TokenKind};

/// Internal failure that unwinds to the enclosing block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct SyntaxError {
    pub position: Position,
    pub message: String,
}

pub(crate) type PResult<T> = Result<T, SyntaxError>;

/// Deepest expression or statement nesting a block may contain.
pub const MAX_NESTING: usize = 128;

pub(crate) struct Parser<'t, 'd> {
    tokens: &'t [Token],
    pos: usize,
    depth: usize,
    diagnostics: &'d mut Diagnostics,
}

impl<'t, 'd> Parser<'t, 'd> {
    /// `tokens` must end with `Eof`, as `tokenize` guarantees.
    pub(crate) fn new(tokens: &'t [Token], diagnostics: &'d mut Diagnostics) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
            diagnostics,
        }
    }

    // === Cursor ===

    fn current(&self) -> &'t Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.pos.min(last)]
    }

    fn peek_kind(&self) -> &'t TokenKind {
        &self.current().kind
    }

    fn peek_kind_at(&self, offset: usize) -> Option<&'t TokenKind> {
        self.tokens.get(self.pos + offset).map(|t| &t.kind)
    }

    fn position(&self) -> Position {
        self.current().position
    }

    /// Position of the last consumed token.
    fn previous_position(&self) -> Position {
        let index = self.pos.saturating_sub(1).min(self.tokens.len().saturating_sub(1));
        self.tokens[index].position
    }

    fn at_eof(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    fn advance(&mut self) -> &'t Token {
        let token = self.current();
        if !self.at_eof() {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn error<T>(&self, message: impl Into<String>) -> PResult<T> {
        Err(SyntaxError {
            position: self.position(),
            message: message.into(),
        })
    }

    fn expect(&mut self, kind: &TokenKind) -> PResult<&'t Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            self.error(format!("expected {} but found {}", kind, self.peek_kind()))
        }
    }

    fn expect_ident(&mut self, what: &str) -> PResult<(String, Position)> {
        match self.peek_kind() {
            TokenKind::Ident(name) => {
                let position = self.advance().position;
                Ok((name.clone(), position))
            }
            other => self.error(format!("expected {} but found {}", what, other)),
        }
    }

    fn expect_string(&mut self, what: &str) -> PResult<(String, Position)> {
        match self.peek_kind() {
            TokenKind::Str(text) => {
                let position = self.advance().position;
                Ok((text.clone(), position))
            }
            other => self.error(format!("expected {} but found {}", what, other)),
        }
    }

    // === Nesting ===

    /// Go one level deeper, failing once `MAX_NESTING` is reached.
    fn descend(&mut self) -> PResult<()> {
        if self.depth >= MAX_NESTING {
            return self.error(format!("nesting deeper than {} levels", MAX_NESTING));
        }
        self.depth += 1;
        Ok(())
    }

    /// Run `parse` one level deeper, restoring the depth afterwards.
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        let depth = self.depth;
        let result = self.descend().and_then(|()| parse(self));
        self.depth = depth;
        result
    }

    // === Recovery ===

    /// Skip a field value up to (not including) the `,` or closing bracket
    /// that ends it at the current nesting depth.
    fn skip_value(&mut self) {
        let mut depth = 0usize;
        loop {
            match self.peek_kind() {
                TokenKind::Eof | TokenKind::Card | TokenKind::Effect => return,
                TokenKind::Comma if depth == 0 => return,
                TokenKind::RBrace | TokenKind::RBracket | TokenKind::RParen if depth == 0 => {
                    return
                }
                TokenKind::LBrace | TokenKind::LBracket | TokenKind::LParen => depth += 1,
                TokenKind::RBrace | TokenKind::RBracket | TokenKind::RParen => depth -= 1,
                _ => {}
            }
            self.advance();
        }
    }

    /// Skip the rest of a block that started at token index `start`.
    ///
    /// Rewinds to the block's opening brace and skips balanced braces, but
    /// never past the next `card`/`effect` keyword so an unclosed block
    /// cannot swallow its successors.
    fn skip_block(&mut self, start: usize) {
        self.pos = start + 1;
        let mut depth = 0usize;
        loop {
            match self.peek_kind() {
                TokenKind::Eof | TokenKind::Card | TokenKind::Effect => return,
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        self.advance();
                        return;
                    }
                }
                _ => {}
            }
            self.advance();
        }
    }

    // === Entry ===

    /// Parse every block in the file.
    pub(crate) fn parse_file(&mut self) -> Vec<TopLevel> {
        let mut blocks = Vec::new();
        while !self.at_eof() {
            let start = self.pos;
            self.depth = 0;
            let parsed = match self.peek_kind() {
                TokenKind::Effect => self.parse_effect_block().map(TopLevel::Effect),
                TokenKind::Card => self.parse_card_block().map(TopLevel::Card),
                other => {
                    let position = self.position();
                    self.diagnostics.syntax(
                        position,
                        format!("expected `card` or `effect` but found {}", other),
                    );
                    self.advance();
                    while !matches!(
                        self.peek_kind(),
                        TokenKind::Eof | TokenKind::Card | TokenKind::Effect
                    ) {
                        self.advance();
                    }
                    continue;
                }
            };

            match parsed {
                Ok(block) => blocks.push(block),
                Err(err) => {
                    log::debug!("abandoning block at {}: {}", err.position, err.message);
                    self.diagnostics.syntax(err.position, err.message);
                    self.skip_block(start);
                }
            }
        }
        blocks
    }
}

/// Parse a token stream into blocks, recording syntax errors.
pub fn parse(tokens: &[Token], diagnostics: &mut Diagnostics) -> Vec<TopLevel> {
    let blocks = Parser::new(tokens, diagnostics).parse_file();
    log::trace!("parsed {} blocks", blocks.len());
    blocks
}

/// Parse one standalone expression, such as `1 + 2 * 3`.
///
/// Returns `None` after recording a diagnostic if the tokens are not
/// exactly one expression.
pub fn parse_expression(tokens: &[Token], diagnostics: &mut Diagnostics) -> Option<Expr> {
    let mut parser = Parser::new(tokens, diagnostics);
    let parsed = parser.parse_expr().and_then(|expr| {
        if parser.at_eof() {
            Ok(expr)
        } else {
            parser.error(format!("expected end of input but found {}", parser.peek_kind()))
        }
    });
    match parsed {
        Ok(expr) => Some(expr),
        Err(err) => {
            parser.diagnostics.syntax(err.position, err.message);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::lexer::tokenize;

    fn parse_source(source: &str) -> (Vec<TopLevel>, Diagnostics) {
        let mut diagnostics = Diagnostics::new();
        let tokens = tokenize(source, &mut diagnostics);
        let blocks = parse(&tokens, &mut diagnostics);
        (blocks, diagnostics)
    }

    #[test]
    fn test_broken_block_does_not_stop_next() {
        let source = r#"
            card { Name: "Broken", OnActivation: [ { Effect: } ] }
            card { Name: "Fine", Type: "Gold" }
        "#;
        let (blocks, diagnostics) = parse_source(source);
        assert_eq!(blocks.len(), 1);
        assert_eq!(diagnostics.len(), 1);
        match &blocks[0] {
            TopLevel::Card(card) => {
                assert_eq!(card.name.given().map(|n| n.node.as_str()), Some("Fine"));
            }
            other => panic!("expected card, got {:?}", other),
        }
    }

    #[test]
    fn test_unclosed_block_stops_at_next_keyword() {
        let source = r#"
            card { Name: "Open", OnActivation: [ { Effect: "Draw" }
            card { Name: "Closed" }
        "#;
        let (blocks, diagnostics) = parse_source(source);
        assert_eq!(blocks.len(), 1);
        assert!(!diagnostics.is_empty());
    }

    #[test]
    fn test_top_level_garbage_reported_once() {
        let (blocks, diagnostics) = parse_source("1 2 3 card { Name: \"A\" }");
        assert_eq!(blocks.len(), 1);
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_parse_expression_rejects_trailing_tokens() {
        let mut diagnostics = Diagnostics::new();
        let tokens = tokenize("1 + 2 3", &mut diagnostics);
        assert!(parse_expression(&tokens, &mut diagnostics).is_none());
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_empty_file() {
        let (blocks, diagnostics) = parse_source("   // nothing here\n");
        assert!(blocks.is_empty());
        assert!(diagnostics.is_empty());
    }
}
