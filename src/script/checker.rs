//! Static checking of expressions and statements.
//!
//! The checker walks an AST in place, writes a `ValueKind` into every
//! `Expr`, and records a semantic diagnostic for each rule it finds broken.
//! It never stops early: a node that fails a rule still gets the kind the
//! rule promises, and `Unassigned` operands are accepted silently so one
//! mistake is reported once.
//!
//! ## Scopes
//!
//! Scopes are a stack of maps. Variables are declared by their first plain
//! assignment in the innermost scope and keep that kind afterwards. `for`
//! bodies, `if`/`while` bodies and lambdas each push a scope.

use rustc_hash::FxHashMap;

use super::ast::{AssignOp, Body, Expr, ExprKind, Lambda, StepOp, Stmt};
use super::diagnostics::Diagnostics;
use super::lexer::Position;
use super::types::{lookup_member, BinaryOp, Member, MemberForm, Operands, ValueKind};

pub struct Checker<'d> {
    diagnostics: &'d mut Diagnostics,
    scopes: Vec<FxHashMap<String, ValueKind>>,
}

impl<'d> Checker<'d> {
    /// A checker with a single empty scope.
    pub fn new(diagnostics: &'d mut Diagnostics) -> Self {
        Self {
            diagnostics,
            scopes: vec![FxHashMap::default()],
        }
    }

    /// A checker whose outer scope already holds `bindings`.
    pub fn with_bindings<I>(diagnostics: &'d mut Diagnostics, bindings: I) -> Self
    where
        I: IntoIterator<Item = (String, ValueKind)>,
    {
        let mut checker = Self::new(diagnostics);
        checker.scopes[0].extend(bindings);
        checker
    }

    // === Scopes ===

    fn lookup(&self, name: &str) -> Option<ValueKind> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name).copied())
    }

    fn declare(&mut self, name: &str, kind: ValueKind) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), kind);
        }
    }

    fn scoped<T>(&mut self, bindings: &[(&str, ValueKind)], f: impl FnOnce(&mut Self) -> T) -> T {
        let scope = bindings
            .iter()
            .map(|(name, kind)| (name.to_string(), *kind))
            .collect();
        self.scopes.push(scope);
        let result = f(self);
        self.scopes.pop();
        result
    }

    fn error(&mut self, position: Position, message: String) {
        self.diagnostics.semantic(position, message);
    }

    fn require(&mut self, found: ValueKind, expected: ValueKind, position: Position, what: &str) {
        if found.conflicts_with(expected) {
            self.error(
                position,
                format!("{} must be {}, found {}", what, expected, found),
            );
        }
    }

    // === Expressions ===

    /// Annotate `expr` and everything below it; returns the annotation.
    pub fn check_expr(&mut self, expr: &mut Expr) -> ValueKind {
        let position = expr.position;
        let kind = match &mut expr.kind {
            ExprKind::Literal(literal) => literal.kind(),
            ExprKind::Variable(name) => match self.lookup(name) {
                Some(kind) => kind,
                None => {
                    let message = format!("undefined variable `{}`", name);
                    self.error(position, message);
                    ValueKind::Unassigned
                }
            },
            ExprKind::Unary { op, operand } => {
                let (expected, result) = op.signature();
                let found = self.check_expr(operand);
                if found.conflicts_with(expected) {
                    self.error(
                        position,
                        format!(
                            "operand type mismatch for operator {}: expected {}, found {}",
                            op, expected, found
                        ),
                    );
                }
                result
            }
            ExprKind::Binary { op, lhs, rhs } => {
                let op = *op;
                let left = self.check_expr(lhs);
                let right = self.check_expr(rhs);
                self.check_binary(op, left, right, position)
            }
            ExprKind::Member {
                receiver,
                name,
                member,
                args,
            } => {
                let receiver_kind = self.check_expr(receiver);
                let arg_kinds: Vec<ValueKind> = match args {
                    Some(args) => args.iter_mut().map(|arg| self.check_expr(arg)).collect(),
                    None => Vec::new(),
                };
                match *member {
                    Some(member) => self.check_member(
                        member,
                        receiver_kind,
                        args.is_some().then_some(arg_kinds.as_slice()),
                        position,
                    ),
                    None => {
                        let message =
                            format!("no such member `{}` for type {}", name, receiver_kind);
                        self.error(position, message);
                        ValueKind::Unassigned
                    }
                }
            }
            ExprKind::Lambda(lambda) => {
                self.check_lambda(lambda, position);
                ValueKind::Predicate
            }
            ExprKind::Step { target, op } => {
                let symbol = match op {
                    StepOp::Increment => "++",
                    StepOp::Decrement => "--",
                };
                let found = self.check_place(target);
                self.require(
                    found,
                    ValueKind::Int,
                    position,
                    &format!("operand of `{}`", symbol),
                );
                ValueKind::Int
            }
        };
        expr.value_kind = kind;
        kind
    }

    /// `args` is `None` for property syntax.
    fn check_member(
        &mut self,
        member: Member,
        receiver: ValueKind,
        args: Option<&[ValueKind]>,
        position: Position,
    ) -> ValueKind {
        let declared = member.signature().result;
        if receiver == ValueKind::Unassigned {
            return declared;
        }
        let Some(signature) = lookup_member(receiver, member) else {
            self.error(
                position,
                format!("no such member `{}` for type {}", member, receiver),
            );
            return declared;
        };
        match (signature.form, args) {
            (MemberForm::Property, None) => {}
            (MemberForm::Property, Some(_)) => self.error(
                position,
                format!("`{}` is a property and cannot be called", member),
            ),
            (MemberForm::Call, None) => self.error(
                position,
                format!("`{}` is a method and needs an argument list", member),
            ),
            (MemberForm::Call, Some(args)) if args.len() != signature.params.len() => self.error(
                position,
                format!(
                    "`{}` expects {} argument(s) but got {}",
                    member,
                    signature.params.len(),
                    args.len()
                ),
            ),
            (MemberForm::Call, Some(args)) => {
                for (index, (found, expected)) in args.iter().zip(signature.params).enumerate() {
                    self.require(
                        *found,
                        *expected,
                        position,
                        &format!("argument {} of `{}`", index + 1, member),
                    );
                }
            }
        }
        signature.result
    }

    fn check_binary(
        &mut self,
        op: BinaryOp,
        left: ValueKind,
        right: ValueKind,
        position: Position,
    ) -> ValueKind {
        let signature = op.signature();
        let mismatch = match signature.operands {
            Operands::Exactly(expected) => {
                left.conflicts_with(expected) || right.conflicts_with(expected)
            }
            Operands::SameComparable => {
                let known = left != ValueKind::Unassigned && right != ValueKind::Unassigned;
                known && (left != right || !left.is_comparable())
            }
        };
        if mismatch {
            self.error(
                position,
                format!(
                    "operand type mismatch for operator {}: {} and {}",
                    op, left, right
                ),
            );
        }
        signature.result
    }

    /// Check a predicate lambda: the parameter is a Card, the body a Bool.
    pub fn check_lambda(&mut self, lambda: &mut Lambda, position: Position) {
        let param = lambda.param.clone();
        let found = self.scoped(&[(param.as_str(), ValueKind::Card)], |checker| {
            checker.check_expr(&mut lambda.body)
        });
        self.require(found, ValueKind::Bool, position, "predicate body");
    }

    /// Check an expression used as a place (`x`, `card.Power`).
    fn check_place(&mut self, target: &mut Expr) -> ValueKind {
        let position = target.position;
        let kind = self.check_expr(target);
        match &target.kind {
            ExprKind::Variable(_) => {}
            ExprKind::Member {
                receiver,
                member: Some(member),
                ..
            } => {
                let signature = member.signature();
                let known_receiver = receiver.value_kind == signature.receiver;
                if known_receiver && !signature.assignable {
                    self.error(position, format!("`{}` is read-only", member));
                }
            }
            ExprKind::Member { member: None, .. } => {}
            _ => self.error(position, "cannot assign to this expression".to_string()),
        }
        kind
    }

    // === Statements ===

    pub fn check_body(&mut self, body: &mut Body) {
        for stmt in body.iter_mut() {
            self.check_stmt(stmt);
        }
    }

    fn check_scoped_body(&mut self, body: &mut Body, bindings: &[(&str, ValueKind)]) {
        self.scoped(bindings, |checker| checker.check_body(body));
    }

    fn check_condition(&mut self, condition: &mut Expr, what: &str) {
        let position = condition.position;
        let found = self.check_expr(condition);
        self.require(found, ValueKind::Bool, position, what);
    }

    fn check_stmt(&mut self, stmt: &mut Stmt) {
        match stmt {
            Stmt::Expr(expr) => {
                self.check_expr(expr);
            }
            Stmt::Assign {
                target,
                op,
                value,
                position,
            } => self.check_assign(target, *op, value, *position),
            Stmt::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                self.check_condition(condition, "`if` condition");
                self.check_scoped_body(then_branch, &[]);
                if let Some(else_branch) = else_branch {
                    self.check_scoped_body(else_branch, &[]);
                }
            }
            Stmt::While {
                condition, body, ..
            } => {
                self.check_condition(condition, "`while` condition");
                self.check_scoped_body(body, &[]);
            }
            Stmt::For {
                var,
                iterable,
                body,
                position,
            } => {
                let found = self.check_expr(iterable);
                self.require(
                    found,
                    ValueKind::CardCollection,
                    *position,
                    "`for` iterable",
                );
                let var = var.clone();
                self.check_scoped_body(body, &[(var.as_str(), ValueKind::Card)]);
            }
        }
    }

    fn check_assign(&mut self, target: &mut Expr, op: AssignOp, value: &mut Expr, position: Position) {
        let value_kind = self.check_expr(value);

        if op == AssignOp::Set {
            if value_kind == ValueKind::Void {
                self.error(position, "cannot assign a Void value".to_string());
            }
            if let ExprKind::Variable(name) = &target.kind {
                match self.lookup(name) {
                    None => {
                        let name = name.clone();
                        self.declare(&name, value_kind);
                        target.value_kind = value_kind;
                    }
                    Some(declared) => {
                        if declared != ValueKind::Unassigned && value_kind.conflicts_with(declared)
                        {
                            let message = format!(
                                "variable `{}` is {} and cannot hold {}",
                                name, declared, value_kind
                            );
                            self.error(position, message);
                        }
                        target.value_kind = declared;
                    }
                }
                return;
            }
            let target_kind = self.check_place(target);
            if target_kind != ValueKind::Unassigned {
                self.require(value_kind, target_kind, position, "assigned value");
            }
            return;
        }

        let target_kind = self.check_place(target);
        self.require(target_kind, ValueKind::Int, position, "compound assignment target");
        self.require(value_kind, ValueKind::Int, position, "compound assignment value");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::diagnostics::Diagnostic;
    use crate::script::lexer::tokenize;
    use crate::script::parser::Parser;

    fn context_bindings() -> Vec<(String, ValueKind)> {
        vec![
            ("targets".to_string(), ValueKind::CardCollection),
            ("context".to_string(), ValueKind::Context),
        ]
    }

    fn check_expr(source: &str) -> (ValueKind, Vec<Diagnostic>) {
        let mut diagnostics = Diagnostics::new();
        let tokens = tokenize(source, &mut diagnostics);
        let mut expr = Parser::new(&tokens, &mut diagnostics)
            .parse_expr()
            .expect("expression should parse");
        let kind = Checker::with_bindings(&mut diagnostics, context_bindings()).check_expr(&mut expr);
        assert_eq!(kind, expr.value_kind);
        (kind, diagnostics.into_vec())
    }

    fn check_block(source: &str) -> Vec<Diagnostic> {
        let mut diagnostics = Diagnostics::new();
        let tokens = tokenize(source, &mut diagnostics);
        let mut body = Parser::new(&tokens, &mut diagnostics)
            .parse_block()
            .expect("block should parse");
        Checker::with_bindings(&mut diagnostics, context_bindings()).check_body(&mut body);
        diagnostics.into_vec()
    }

    #[test]
    fn test_precedence_typing() {
        assert_eq!(check_expr("1 + 2 * 3"), (ValueKind::Int, vec![]));
        assert_eq!(check_expr("true and false or true"), (ValueKind::Bool, vec![]));
        assert_eq!(check_expr("\"a\" @@ \"b\" == \"a b\""), (ValueKind::Bool, vec![]));
    }

    #[test]
    fn test_member_chain_typing() {
        let (kind, diagnostics) =
            check_expr("context.Field.Find((c) => c.Power > 2).Pop().Power");
        assert_eq!(kind, ValueKind::Int);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_push_without_argument_rejected() {
        let (kind, diagnostics) = check_expr("context.Hand.Pop().Push()");
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("no such member `Push` for type Card"));
        assert_eq!(kind, ValueKind::Void);
    }

    #[test]
    fn test_operand_mismatch_keeps_result_kind() {
        let (kind, diagnostics) = check_expr("1 + true");
        assert_eq!(kind, ValueKind::Int);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("operator +"));
    }

    #[test]
    fn test_undefined_variable_reported_once() {
        let (kind, diagnostics) = check_expr("ghost + 1 > 2");
        assert_eq!(kind, ValueKind::Bool);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("undefined variable `ghost`"));
    }

    #[test]
    fn test_unknown_member() {
        let (kind, diagnostics) = check_expr("context.Teleport");
        assert_eq!(kind, ValueKind::Unassigned);
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_property_called_and_method_uncalled() {
        assert_eq!(check_expr("context.Hand()").1.len(), 1);
        assert_eq!(check_expr("context.Hand.Pop").1.len(), 1);
    }

    #[test]
    fn test_argument_checks() {
        assert_eq!(check_expr("context.Hand.Push(3)").1.len(), 1);
        assert_eq!(check_expr("context.Hand.Find()").1.len(), 1);
        assert!(check_expr("context.HandOfPlayer(context.TriggerPlayer)").1.is_empty());
    }

    #[test]
    fn test_predicate_must_return_bool() {
        let (kind, diagnostics) = check_expr("context.Deck.Find((c) => c.Power)");
        assert_eq!(kind, ValueKind::CardCollection);
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_equality_needs_same_kind() {
        assert!(check_expr("context.TriggerPlayer == context.Hand.Pop().Owner").1.is_empty());
        assert_eq!(check_expr("1 == \"1\"").1.len(), 1);
        assert_eq!(check_expr("context.Hand == context.Deck").1.len(), 1);
    }

    #[test]
    fn test_variables_keep_their_kind() {
        assert!(check_block("{ x = 1; x += 2; x = x * 3; }").is_empty());
        let diagnostics = check_block("{ x = 1; x = \"one\"; }");
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("variable `x`"));
    }

    #[test]
    fn test_void_assignment_rejected() {
        assert_eq!(check_block("{ x = context.Hand.Shuffle(); }").len(), 1);
    }

    #[test]
    fn test_only_power_is_assignable() {
        assert!(check_block("{ for c in targets { c.Power = 0; c.Power++; }; }").is_empty());
        let diagnostics = check_block("{ for c in targets { c.Name = \"x\"; } }");
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("read-only"));
    }

    #[test]
    fn test_loop_variable_scoped_to_body() {
        let diagnostics = check_block("{ for c in targets { } c.Power = 1; }");
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("undefined variable `c`"));
    }

    #[test]
    fn test_control_flow_kinds() {
        assert_eq!(check_block("{ if (1) { } }").len(), 1);
        assert_eq!(check_block("{ while (\"x\") { } }").len(), 1);
        assert_eq!(check_block("{ for c in context { } }").len(), 1);
        assert!(check_block("{ i = 0; while (i++ < 3) { context.Hand.Shuffle(); } }").is_empty());
    }

    #[test]
    fn test_step_requires_int() {
        assert_eq!(check_block("{ s = \"a\"; s++; }").len(), 1);
    }
}
