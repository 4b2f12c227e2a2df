//! Statement parsing for effect actions.
//!
//! ```text
//! block := "{" stmt* "}"
//! stmt  := "for" IDENT "in" expr body ";"?
//!        | "while" "(" expr ")" body ";"?
//!        | "if" "(" expr ")" body ("else" body)? ";"?
//!        | expr (assign_op expr)? ";"
//! body  := block | stmt
//! ```

use super::{PResult, Parser};
use crate::script::ast::{AssignOp, Body, Expr, Stmt};
use crate::script::lexer::TokenKind;

fn assign_op(kind: &TokenKind) -> Option<AssignOp> {
    match kind {
        TokenKind::Assign => Some(AssignOp::Set),
        TokenKind::PlusAssign => Some(AssignOp::Add),
        TokenKind::MinusAssign => Some(AssignOp::Sub),
        TokenKind::StarAssign => Some(AssignOp::Mul),
        TokenKind::SlashAssign => Some(AssignOp::Div),
        _ => None,
    }
}

impl<'t, 'd> Parser<'t, 'd> {
    pub(crate) fn parse_block(&mut self) -> PResult<Body> {
        self.expect(&TokenKind::LBrace)?;
        let mut body = Body::new();
        while !self.check(&TokenKind::RBrace) && !self.at_eof() {
            body.push(self.parse_stmt()?);
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(body)
    }

    fn parse_body(&mut self) -> PResult<Body> {
        self.nested(|parser| {
            if parser.check(&TokenKind::LBrace) {
                parser.parse_block()
            } else {
                Ok(vec![parser.parse_stmt()?])
            }
        })
    }

    fn parse_condition(&mut self) -> PResult<Expr> {
        self.expect(&TokenKind::LParen)?;
        let condition = self.parse_expr()?;
        self.expect(&TokenKind::RParen)?;
        Ok(condition)
    }

    pub(crate) fn parse_stmt(&mut self) -> PResult<Stmt> {
        let position = self.position();
        let stmt = match self.peek_kind() {
            TokenKind::For => {
                self.advance();
                let (var, _) = self.expect_ident("a loop variable after `for`")?;
                self.expect(&TokenKind::In)?;
                let iterable = self.parse_expr()?;
                let body = self.parse_body()?;
                Stmt::For {
                    var,
                    iterable,
                    body,
                    position,
                }
            }
            TokenKind::While => {
                self.advance();
                let condition = self.parse_condition()?;
                let body = self.parse_body()?;
                Stmt::While {
                    condition,
                    body,
                    position,
                }
            }
            TokenKind::If => {
                self.advance();
                let condition = self.parse_condition()?;
                let then_branch = self.parse_body()?;
                let else_branch = if self.eat(&TokenKind::Else) {
                    Some(self.parse_body()?)
                } else {
                    None
                };
                Stmt::If {
                    condition,
                    then_branch,
                    else_branch,
                    position,
                }
            }
            _ => {
                let target = self.parse_expr()?;
                let stmt = match assign_op(self.peek_kind()) {
                    Some(op) => {
                        let position = self.advance().position;
                        let value = self.parse_expr()?;
                        Stmt::Assign {
                            target,
                            op,
                            value,
                            position,
                        }
                    }
                    None => Stmt::Expr(target),
                };
                self.expect(&TokenKind::Semicolon)?;
                return Ok(stmt);
            }
        };
        // Control-flow statements may be followed by a stray `;`.
        self.eat(&TokenKind::Semicolon);
        Ok(stmt)
    }
}
