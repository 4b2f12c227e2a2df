//! Expression parsing.
//!
//! Binary operators use precedence climbing over `BinaryOp::precedence`:
//! an operator is folded while its precedence is at least the current
//! minimum, and its right-hand side is parsed with `precedence + 1`, so
//! equal precedence keeps looping (left associativity), `^` included:
//! `2 ^ 3 ^ 2` is `(2 ^ 3) ^ 2`.
//!
//! Every fold, unary operator, parenthesis and lambda counts one level
//! against `MAX_NESTING`, since each adds a level to the tree.
//!
//! ```text
//! expr    := unary (binop unary)*
//! unary   := ("not" | "-") unary | postfix
//! postfix := primary ("." IDENT ("(" args ")")? | "++" | "--")*
//! primary := INT | STRING | "true" | "false" | IDENT | lambda | "(" expr ")"
//! lambda  := "(" IDENT ")" "=>" expr
//! ```

use super::{PResult, Parser};
use crate::script::ast::{Args, Expr, ExprKind, Lambda, Literal, StepOp};
use crate::script::lexer::TokenKind;
use crate::script::types::{BinaryOp, Member, UnaryOp};

impl<'t, 'd> Parser<'t, 'd> {
    pub(crate) fn parse_expr(&mut self) -> PResult<Expr> {
        self.parse_binary(1)
    }

    fn parse_binary(&mut self, min_precedence: u8) -> PResult<Expr> {
        let depth = self.depth;
        let result = self.fold_binary(min_precedence);
        self.depth = depth;
        result
    }

    fn fold_binary(&mut self, min_precedence: u8) -> PResult<Expr> {
        let mut lhs = self.parse_unary()?;
        while let Some(op) = BinaryOp::from_token(self.peek_kind()) {
            let precedence = op.precedence();
            if precedence < min_precedence {
                break;
            }
            self.descend()?;
            let position = self.advance().position;
            let rhs = self.parse_binary(precedence + 1)?;
            lhs = Expr::new(
                ExprKind::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                position,
            );
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> PResult<Expr> {
        if let Some(op) = UnaryOp::from_token(self.peek_kind()) {
            let position = self.advance().position;
            let operand = self.nested(Self::parse_unary)?;
            return Ok(Expr::new(
                ExprKind::Unary {
                    op,
                    operand: Box::new(operand),
                },
                position,
            ));
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> PResult<Expr> {
        let depth = self.depth;
        let result = self.fold_postfix();
        self.depth = depth;
        result
    }

    fn fold_postfix(&mut self) -> PResult<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek_kind() {
                TokenKind::Dot => {
                    self.descend()?;
                    self.advance();
                    let (name, position) = self.expect_ident("a member name after `.`")?;
                    let args = if self.eat(&TokenKind::LParen) {
                        Some(self.parse_args()?)
                    } else {
                        None
                    };
                    expr = Expr::new(
                        ExprKind::Member {
                            receiver: Box::new(expr),
                            member: Member::from_name(&name),
                            name,
                            args,
                        },
                        position,
                    );
                }
                TokenKind::PlusPlus | TokenKind::MinusMinus => {
                    self.descend()?;
                    let token = self.advance();
                    let op = if token.kind == TokenKind::PlusPlus {
                        StepOp::Increment
                    } else {
                        StepOp::Decrement
                    };
                    expr = Expr::new(
                        ExprKind::Step {
                            target: Box::new(expr),
                            op,
                        },
                        token.position,
                    );
                }
                _ => return Ok(expr),
            }
        }
    }

    /// Arguments after the opening parenthesis, through the closing one.
    fn parse_args(&mut self) -> PResult<Args> {
        let mut args = Args::new();
        if self.eat(&TokenKind::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr()?);
            if self.eat(&TokenKind::RParen) {
                return Ok(args);
            }
            self.expect(&TokenKind::Comma)?;
        }
    }

    fn is_lambda_start(&self) -> bool {
        matches!(
            (
                self.peek_kind(),
                self.peek_kind_at(1),
                self.peek_kind_at(2),
                self.peek_kind_at(3),
            ),
            (
                TokenKind::LParen,
                Some(TokenKind::Ident(_)),
                Some(TokenKind::RParen),
                Some(TokenKind::Arrow)
            )
        )
    }

    /// `(param) => body`
    pub(crate) fn parse_lambda(&mut self) -> PResult<Lambda> {
        self.expect(&TokenKind::LParen)?;
        let (param, _) = self.expect_ident("a lambda parameter")?;
        self.expect(&TokenKind::RParen)?;
        self.expect(&TokenKind::Arrow)?;
        let body = self.parse_expr()?;
        Ok(Lambda {
            param,
            body: Box::new(body),
        })
    }

    fn parse_primary(&mut self) -> PResult<Expr> {
        let position = self.position();
        if self.is_lambda_start() {
            let lambda = self.nested(Self::parse_lambda)?;
            return Ok(Expr::new(ExprKind::Lambda(lambda), position));
        }

        let expr = match self.peek_kind() {
            TokenKind::Int(n) => Expr::literal(Literal::Int(*n), position),
            TokenKind::Str(s) => Expr::literal(Literal::Str(s.clone()), position),
            TokenKind::True => Expr::literal(Literal::Bool(true), position),
            TokenKind::False => Expr::literal(Literal::Bool(false), position),
            TokenKind::Ident(name) => Expr::new(ExprKind::Variable(name.clone()), position),
            TokenKind::LParen => {
                self.advance();
                let inner = self.nested(Self::parse_expr)?;
                self.expect(&TokenKind::RParen)?;
                return Ok(inner);
            }
            other => return self.error(format!("expected an expression but found {}", other)),
        };
        self.advance();
        Ok(expr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::diagnostics::Diagnostics;
    use crate::script::lexer::tokenize;
    use crate::script::parser::MAX_NESTING;

    fn parse_expr(source: &str) -> Expr {
        let mut diagnostics = Diagnostics::new();
        let tokens = tokenize(source, &mut diagnostics);
        let mut parser = Parser::new(&tokens, &mut diagnostics);
        let expr = parser.parse_expr().expect("expression should parse");
        assert!(parser.at_eof(), "trailing tokens in {:?}", source);
        expr
    }

    /// Render with explicit parentheses to make grouping visible.
    fn shape(expr: &Expr) -> String {
        match &expr.kind {
            ExprKind::Literal(Literal::Int(n)) => n.to_string(),
            ExprKind::Literal(Literal::Bool(b)) => b.to_string(),
            ExprKind::Literal(Literal::Str(s)) => format!("{:?}", s),
            ExprKind::Variable(name) => name.clone(),
            ExprKind::Unary { op, operand } => format!("({} {})", op, shape(operand)),
            ExprKind::Binary { op, lhs, rhs } => {
                format!("({} {} {})", shape(lhs), op, shape(rhs))
            }
            ExprKind::Member {
                receiver,
                name,
                args,
                ..
            } => match args {
                Some(args) => format!(
                    "{}.{}({})",
                    shape(receiver),
                    name,
                    args.iter().map(shape).collect::<Vec<_>>().join(", ")
                ),
                None => format!("{}.{}", shape(receiver), name),
            },
            ExprKind::Lambda(lambda) => format!("|{}| {}", lambda.param, shape(&lambda.body)),
            ExprKind::Step { target, op } => match op {
                StepOp::Increment => format!("{}++", shape(target)),
                StepOp::Decrement => format!("{}--", shape(target)),
            },
        }
    }

    #[test]
    fn test_multiplication_binds_tighter() {
        assert_eq!(shape(&parse_expr("1 + 2 * 3")), "(1 + (2 * 3))");
    }

    #[test]
    fn test_left_associative() {
        assert_eq!(shape(&parse_expr("10 - 3 - 2")), "((10 - 3) - 2)");
        assert_eq!(shape(&parse_expr("a @ b @@ c")), "((a @ b) @@ c)");
    }

    #[test]
    fn test_power_is_left_associative() {
        assert_eq!(shape(&parse_expr("2 ^ 3 ^ 2")), "((2 ^ 3) ^ 2)");
    }

    fn parse_error(source: &str) -> String {
        let mut diagnostics = Diagnostics::new();
        let tokens = tokenize(source, &mut diagnostics);
        let mut parser = Parser::new(&tokens, &mut diagnostics);
        parser.parse_expr().unwrap_err().message
    }

    #[test]
    fn test_nesting_limit() {
        let within = format!("{}1{}", "(".repeat(100), ")".repeat(100));
        assert_eq!(shape(&parse_expr(&within)), "1");

        let message = format!("nesting deeper than {} levels", MAX_NESTING);
        let parens = format!("{}1{}", "(".repeat(500), ")".repeat(500));
        assert_eq!(parse_error(&parens), message);
        assert_eq!(parse_error(&"-".repeat(500)), message);

        let sum = vec!["1"; 1000].join(" + ");
        assert_eq!(parse_error(&sum), message);
        let chain = format!("x{}", ".Owner".repeat(1000));
        assert_eq!(parse_error(&chain), message);
    }

    #[test]
    fn test_depth_restored_after_each_expression() {
        let mut diagnostics = Diagnostics::new();
        let source = format!("{}1{}", "(".repeat(100), ")".repeat(100)).repeat(3);
        let tokens = tokenize(&source, &mut diagnostics);
        let mut parser = Parser::new(&tokens, &mut diagnostics);
        for _ in 0..3 {
            assert!(parser.parse_expr().is_ok());
        }
        assert_eq!(parser.depth, 0);
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        assert_eq!(
            shape(&parse_expr("true and false or true")),
            "((true and false) or true)"
        );
        assert_eq!(
            shape(&parse_expr("true or false and true")),
            "(true or (false and true))"
        );
    }

    #[test]
    fn test_unary_binds_tighter_than_multiplication() {
        assert_eq!(shape(&parse_expr("-2 * 3")), "((- 2) * 3)");
        assert_eq!(shape(&parse_expr("not a and b")), "((not a) and b)");
    }

    #[test]
    fn test_comparison_below_arithmetic() {
        assert_eq!(shape(&parse_expr("i++ < n + 1")), "(i++ < (n + 1))");
    }

    #[test]
    fn test_member_chain() {
        let expr = parse_expr("context.Field.Find((c) => c.Power > 2).Pop().Power");
        assert_eq!(
            shape(&expr),
            "context.Field.Find(|c| (c.Power > 2)).Pop().Power"
        );
        match &expr.kind {
            ExprKind::Member { member, args, .. } => {
                assert_eq!(*member, Some(Member::Power));
                assert!(args.is_none());
            }
            other => panic!("expected member, got {:?}", other),
        }
    }

    #[test]
    fn test_member_binds_tighter_than_unary() {
        assert_eq!(shape(&parse_expr("-unit.Power")), "(- unit.Power)");
    }

    #[test]
    fn test_unknown_member_kept_by_name() {
        let expr = parse_expr("unit.Teleport()");
        match expr.kind {
            ExprKind::Member { name, member, .. } => {
                assert_eq!(name, "Teleport");
                assert_eq!(member, None);
            }
            other => panic!("expected member, got {:?}", other),
        }
    }

    #[test]
    fn test_parenthesized_is_not_lambda() {
        assert_eq!(shape(&parse_expr("(a) + 1")), "(a + 1)");
    }

    #[test]
    fn test_missing_operand_is_error() {
        let mut diagnostics = Diagnostics::new();
        let tokens = tokenize("1 +", &mut diagnostics);
        let mut parser = Parser::new(&tokens, &mut diagnostics);
        assert!(parser.parse_expr().is_err());
    }
}
