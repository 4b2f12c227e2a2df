//! `effect` and `card` blocks.
//!
//! ```text
//! effect     := "effect" "{" field ("," field)* ","? "}"
//!   Name     : STRING
//!   Params   : "{" (IDENT ":" IDENT),* "}"
//!   Action   : "(" IDENT "," IDENT ")" "=>" block
//! card       := "card" "{" field ("," field)* ","? "}"
//!   Type | Name | Faction | Description : STRING
//!   Power    : "-"? INT
//!   Range    : "[" STRING,* "]"
//!   OnActivation : "[" invocation,* "]"
//! invocation := "{" Effect: (STRING | "{" Name: STRING ("," IDENT: expr)* "}"),
//!                   Selector: "{" Source, Single, Predicate "}",
//!                   PostAction: invocation "}"
//! ```
//!
//! Field order is free. Header fields (everything above except `Params`,
//! `Action` and `OnActivation`) accept a placeholder when malformed; the
//! others abort the block.

use super::{PResult, Parser};
use crate::script::ast::{
    ActionDecl, CardBlock, EffectBlock, Expr, Header, InvocationBlock, ParamDecl,
    SelectorBlock, Spanned,
};
use crate::script::lexer::{Position, TokenKind};

impl<'t, 'd> Parser<'t, 'd> {
    /// Parse `{ Field: value, ... }`, handing each new field to `on_field`.
    ///
    /// Duplicate and unknown fields are reported by the caller's handler or
    /// here, and their values skipped.
    fn parse_fields<F>(&mut self, what: &str, mut on_field: F) -> PResult<()>
    where
        F: FnMut(&mut Self, &str, Position) -> PResult<()>,
    {
        self.expect(&TokenKind::LBrace)?;
        let mut seen: Vec<String> = Vec::new();
        loop {
            if self.eat(&TokenKind::RBrace) {
                return Ok(());
            }
            let (field, position) = self.expect_ident(&format!("a {} field name", what))?;
            self.expect(&TokenKind::Colon)?;
            if seen.contains(&field) {
                self.diagnostics
                    .syntax(position, format!("duplicate field `{}` in {}", field, what));
                self.skip_value();
            } else {
                on_field(self, &field, position)?;
                seen.push(field);
            }
            if !self.eat(&TokenKind::Comma) {
                self.expect(&TokenKind::RBrace)?;
                return Ok(());
            }
        }
    }

    fn unknown_field(&mut self, what: &str, field: &str, position: Position) {
        self.diagnostics
            .syntax(position, format!("unknown field `{}` in {}", field, what));
        self.skip_value();
    }

    // === Header values ===

    fn malformed<T>(&mut self, field: &str, expected: &str) -> Header<T> {
        let position = self.position();
        let found = self.peek_kind().to_string();
        self.diagnostics.syntax(
            position,
            format!("`{}` must be {} but found {}", field, expected, found),
        );
        self.skip_value();
        Header::Malformed(position)
    }

    fn header_string(&mut self, field: &str) -> Header<String> {
        let position = self.position();
        match self.peek_kind() {
            TokenKind::Str(text) => {
                self.advance();
                Header::Given(Spanned::new(text.clone(), position))
            }
            _ => self.malformed(field, "a string"),
        }
    }

    fn header_int(&mut self, field: &str) -> Header<i64> {
        let position = self.position();
        let negative = self.eat(&TokenKind::Minus);
        match self.peek_kind() {
            TokenKind::Int(value) => {
                self.advance();
                let value = if negative { -*value } else { *value };
                Header::Given(Spanned::new(value, position))
            }
            _ => self.malformed(field, "an integer"),
        }
    }

    fn header_string_list(&mut self, field: &str) -> Header<Vec<Spanned<String>>> {
        let position = self.position();
        if !self.eat(&TokenKind::LBracket) {
            return self.malformed(field, "a list of strings");
        }
        let mut items = Vec::new();
        loop {
            match self.peek_kind() {
                TokenKind::RBracket => {
                    self.advance();
                    return Header::Given(Spanned::new(items, position));
                }
                TokenKind::Str(text) => {
                    let item_position = self.advance().position;
                    items.push(Spanned::new(text.clone(), item_position));
                    if !self.eat(&TokenKind::Comma) && !self.check(&TokenKind::RBracket) {
                        break;
                    }
                }
                _ => break,
            }
        }

        let bad_position = self.position();
        let found = self.peek_kind().to_string();
        self.diagnostics.syntax(
            bad_position,
            format!("`{}` must be a list of strings but found {}", field, found),
        );
        // Skip through the closing bracket of this list only.
        loop {
            match self.peek_kind() {
                TokenKind::RBracket => {
                    self.advance();
                    break;
                }
                TokenKind::RBrace | TokenKind::Eof | TokenKind::Card | TokenKind::Effect => break,
                _ => {
                    self.advance();
                }
            }
        }
        Header::Malformed(bad_position)
    }

    // === effect ===

    pub(crate) fn parse_effect_block(&mut self) -> PResult<EffectBlock> {
        let mark = self.diagnostics.mark();
        let position = self.expect(&TokenKind::Effect)?.position;
        let mut block = EffectBlock {
            name: Header::Missing,
            params: Vec::new(),
            action: None,
            position,
            end: position,
            recovered: false,
        };
        self.parse_fields("effect", |parser, field, field_position| {
            match field {
                "Name" => block.name = parser.header_string("Name"),
                "Params" => block.params = parser.parse_params()?,
                "Action" => block.action = Some(parser.parse_action()?),
                _ => parser.unknown_field("effect", field, field_position),
            }
            Ok(())
        })?;
        block.end = self.previous_position();
        block.recovered = self.diagnostics.has_errors_since(mark);
        Ok(block)
    }

    fn parse_params(&mut self) -> PResult<Vec<ParamDecl>> {
        self.expect(&TokenKind::LBrace)?;
        let mut params = Vec::new();
        loop {
            if self.eat(&TokenKind::RBrace) {
                return Ok(params);
            }
            let (name, position) = self.expect_ident("a parameter name")?;
            self.expect(&TokenKind::Colon)?;
            let (type_name, _) = self.expect_ident("a parameter type")?;
            params.push(ParamDecl {
                name,
                type_name,
                position,
            });
            if !self.eat(&TokenKind::Comma) {
                self.expect(&TokenKind::RBrace)?;
                return Ok(params);
            }
        }
    }

    fn parse_action(&mut self) -> PResult<ActionDecl> {
        let position = self.expect(&TokenKind::LParen)?.position;
        let (targets, _) = self.expect_ident("the targets parameter")?;
        self.expect(&TokenKind::Comma)?;
        let (context, _) = self.expect_ident("the context parameter")?;
        self.expect(&TokenKind::RParen)?;
        self.expect(&TokenKind::Arrow)?;
        let body = self.parse_block()?;
        Ok(ActionDecl {
            targets,
            context,
            body,
            position,
        })
    }

    // === card ===

    pub(crate) fn parse_card_block(&mut self) -> PResult<CardBlock> {
        let mark = self.diagnostics.mark();
        let position = self.expect(&TokenKind::Card)?.position;
        let mut card = CardBlock::new(position);
        self.parse_fields("card", |parser, field, field_position| {
            match field {
                "Name" => card.name = parser.header_string(field),
                "Type" => card.card_type = parser.header_string(field),
                "Faction" => card.faction = parser.header_string(field),
                "Description" => card.description = parser.header_string(field),
                "Power" => card.power = parser.header_int(field),
                "Range" => card.range = parser.header_string_list(field),
                "OnActivation" => card.on_activation = parser.parse_invocation_list()?,
                _ => parser.unknown_field("card", field, field_position),
            }
            Ok(())
        })?;
        card.end = self.previous_position();
        card.recovered = self.diagnostics.has_errors_since(mark);
        Ok(card)
    }

    fn parse_invocation_list(&mut self) -> PResult<Vec<InvocationBlock>> {
        self.expect(&TokenKind::LBracket)?;
        let mut invocations = Vec::new();
        loop {
            if self.eat(&TokenKind::RBracket) {
                return Ok(invocations);
            }
            invocations.push(self.parse_invocation()?);
            if !self.eat(&TokenKind::Comma) {
                self.expect(&TokenKind::RBracket)?;
                return Ok(invocations);
            }
        }
    }

    fn parse_invocation(&mut self) -> PResult<InvocationBlock> {
        let mut invocation = InvocationBlock {
            effect: None,
            args: Vec::new(),
            selector: None,
            post_action: None,
            position: self.position(),
        };
        self.parse_fields("effect invocation", |parser, field, field_position| {
            match field {
                "Effect" => {
                    if parser.check(&TokenKind::LBrace) {
                        let (effect, args) = parser.parse_effect_reference()?;
                        invocation.effect = effect;
                        invocation.args = args;
                    } else {
                        let (name, position) = parser.expect_string("an effect name")?;
                        invocation.effect = Some(Spanned::new(name, position));
                    }
                }
                "Selector" => invocation.selector = Some(parser.parse_selector()?),
                "PostAction" => {
                    let post_action = parser.nested(Self::parse_invocation)?;
                    invocation.post_action = Some(Box::new(post_action));
                }
                _ => parser.unknown_field("effect invocation", field, field_position),
            }
            Ok(())
        })?;
        Ok(invocation)
    }

    /// `{ Name: "Effect", Param: expr, ... }`
    #[allow(clippy::type_complexity)]
    fn parse_effect_reference(
        &mut self,
    ) -> PResult<(Option<Spanned<String>>, Vec<(Spanned<String>, Expr)>)> {
        let mut effect = None;
        let mut args = Vec::new();
        self.parse_fields("effect reference", |parser, field, field_position| {
            if field == "Name" {
                let (name, position) = parser.expect_string("an effect name")?;
                effect = Some(Spanned::new(name, position));
            } else {
                let value = parser.parse_expr()?;
                args.push((Spanned::new(field.to_string(), field_position), value));
            }
            Ok(())
        })?;
        Ok((effect, args))
    }

    fn parse_selector(&mut self) -> PResult<SelectorBlock> {
        let mut selector = SelectorBlock {
            source: None,
            single: None,
            predicate: None,
            position: self.position(),
        };
        self.parse_fields("selector", |parser, field, field_position| {
            match field {
                "Source" => {
                    let (source, position) = parser.expect_string("a selector source")?;
                    selector.source = Some(Spanned::new(source, position));
                }
                "Single" => selector.single = Some(parser.parse_expr()?),
                "Predicate" => {
                    let position = parser.position();
                    let lambda = parser.parse_lambda()?;
                    selector.predicate = Some(Spanned::new(lambda, position));
                }
                _ => parser.unknown_field("selector", field, field_position),
            }
            Ok(())
        })?;
        Ok(selector)
    }
}
