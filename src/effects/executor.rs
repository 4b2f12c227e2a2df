//! Effect execution - running compiled invocations against a game.
//!
//! `execute` runs one `EffectInvocation`:
//!
//! 1. Evaluate the argument expressions.
//! 2. Resolve targets: filter the selector's source with its predicate
//!    (first match only when `Single` is true). Without a selector the
//!    targets are the parent's, or empty at the top level.
//! 3. Run the action body with targets, context and parameters bound.
//! 4. Run the `PostAction`, if any, with this invocation's targets as its
//!    parent targets.
//!
//! A runtime fault aborts the invocation and comes back as an
//! `ExecutionFailure`; changes already made to the game stay made.
//! `activate` runs every invocation of a card and keeps going past
//! failures.
//!
//! ## Collections
//!
//! A collection value is either a live zone (changes go to the game) or a
//! detached list owned by this execution (`Find` results and selector
//! targets). Lists live in an arena and are referred to by index.

use rustc_hash::FxHashMap;
use thiserror::Error;

use super::context::{GameContext, ZoneRef};
use super::effect::EffectInvocation;
use super::targeting::Selector;
use crate::cards::CardDefinition;
use crate::core::config::{ExecutorConfig, ZoneId, ZoneKind};
use crate::core::entity::EntityId;
use crate::core::player::PlayerId;
use crate::script::ast::{Expr, ExprKind, Lambda, Literal, StepOp, Stmt};
use crate::script::diagnostics::Diagnostic;
use crate::script::types::{BinaryOp, Member, UnaryOp, ValueKind};
use crate::zones::ZonePosition;

/// Faults that abort an invocation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error("cannot {operation} from an empty collection")]
    EmptyCollection { operation: &'static str },

    #[error("division by zero")]
    DivisionByZero,

    #[error("integer overflow in `{operator}`")]
    Overflow { operator: &'static str },

    #[error("negative exponent {0}")]
    NegativeExponent(i64),

    #[error("{0} is no longer in the game")]
    MissingCard(EntityId),

    #[error("undefined variable `{0}`")]
    UndefinedVariable(String),

    #[error("unknown member `{0}`")]
    UnknownMember(String),

    #[error("`while` loop exceeded {0} iterations")]
    LoopLimit(usize),

    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: ValueKind,
        found: ValueKind,
    },

    #[error("expression cannot be assigned to")]
    NotAssignable,
}

type RResult<T> = Result<T, RuntimeError>;

/// A successful invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutionReport {
    pub effect: String,
    /// Non-fatal notes, such as a selector that matched nothing.
    pub diagnostics: Vec<Diagnostic>,
}

/// A failed invocation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("effect `{effect}` failed: {error}")]
pub struct ExecutionFailure {
    pub effect: String,
    pub error: RuntimeError,
    /// Notes recorded before the fault.
    pub diagnostics: Vec<Diagnostic>,
}

impl ExecutionFailure {
    /// Lines to show the user: a header, the fault, then recorded notes.
    #[must_use]
    pub fn report_lines(&self) -> Vec<String> {
        let mut lines = vec!["error executing effect".to_string(), self.error.to_string()];
        lines.extend(self.diagnostics.iter().map(ToString::to_string));
        lines
    }
}

/// Outcome of activating every effect of one card.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActivationReport {
    pub card: String,
    /// One entry per `OnActivation` invocation, in order.
    pub outcomes: Vec<Result<ExecutionReport, ExecutionFailure>>,
}

impl ActivationReport {
    pub fn failures(&self) -> impl Iterator<Item = &ExecutionFailure> {
        self.outcomes.iter().filter_map(|o| o.as_ref().err())
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures().next().is_none()
    }

    /// One runtime diagnostic per failed invocation.
    #[must_use]
    pub fn runtime_diagnostics(&self) -> Vec<Diagnostic> {
        self.failures()
            .map(|failure| Diagnostic::runtime(failure.to_string()))
            .collect()
    }

    /// `report_lines` of every failure, concatenated.
    #[must_use]
    pub fn report_lines(&self) -> Vec<String> {
        self.failures()
            .flat_map(ExecutionFailure::report_lines)
            .collect()
    }
}

/// Run one invocation against `ctx`.
pub fn execute<C>(
    invocation: &EffectInvocation,
    ctx: &mut C,
    config: &ExecutorConfig,
) -> Result<ExecutionReport, ExecutionFailure>
where
    C: GameContext + ?Sized,
{
    log::trace!("executing effect `{}`", invocation.name());
    let mut executor = Executor::new(ctx, config);
    match executor.run_invocation(invocation, None) {
        Ok(()) => Ok(ExecutionReport {
            effect: invocation.name().to_string(),
            diagnostics: executor.diagnostics,
        }),
        Err(error) => {
            log::warn!("effect `{}` failed: {}", invocation.name(), error);
            Err(ExecutionFailure {
                effect: invocation.name().to_string(),
                error,
                diagnostics: executor.diagnostics,
            })
        }
    }
}

/// Run every `OnActivation` invocation of `card` in order.
pub fn activate<C>(card: &CardDefinition, ctx: &mut C, config: &ExecutorConfig) -> ActivationReport
where
    C: GameContext + ?Sized,
{
    log::debug!(
        "activating `{}` for {}",
        card.name,
        ctx.trigger_player()
    );
    let outcomes = card
        .on_activation
        .iter()
        .map(|invocation| execute(invocation, ctx, config))
        .collect();
    ActivationReport {
        card: card.name.clone(),
        outcomes,
    }
}

// === Values ===

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Collection {
    Zone(ZoneRef),
    /// Index into the executor's list arena.
    List(usize),
}

#[derive(Clone, Debug, PartialEq)]
enum Value<'a> {
    Int(i64),
    Bool(bool),
    Str(String),
    Player(PlayerId),
    Card(EntityId),
    Collection(Collection),
    Predicate(&'a Lambda),
    Context,
    Void,
}

impl Value<'_> {
    fn kind(&self) -> ValueKind {
        match self {
            Value::Int(_) => ValueKind::Int,
            Value::Bool(_) => ValueKind::Bool,
            Value::Str(_) => ValueKind::String,
            Value::Player(_) => ValueKind::Player,
            Value::Card(_) => ValueKind::Card,
            Value::Collection(_) => ValueKind::CardCollection,
            Value::Predicate(_) => ValueKind::Predicate,
            Value::Context => ValueKind::Context,
            Value::Void => ValueKind::Void,
        }
    }

    fn mismatch(&self, expected: ValueKind) -> RuntimeError {
        RuntimeError::TypeMismatch {
            expected,
            found: self.kind(),
        }
    }

    fn into_int(self) -> RResult<i64> {
        match self {
            Value::Int(n) => Ok(n),
            other => Err(other.mismatch(ValueKind::Int)),
        }
    }

    fn into_bool(self) -> RResult<bool> {
        match self {
            Value::Bool(b) => Ok(b),
            other => Err(other.mismatch(ValueKind::Bool)),
        }
    }

    fn into_str(self) -> RResult<String> {
        match self {
            Value::Str(s) => Ok(s),
            other => Err(other.mismatch(ValueKind::String)),
        }
    }

    fn into_card(self) -> RResult<EntityId> {
        match self {
            Value::Card(id) => Ok(id),
            other => Err(other.mismatch(ValueKind::Card)),
        }
    }

    fn into_collection(self) -> RResult<Collection> {
        match self {
            Value::Collection(c) => Ok(c),
            other => Err(other.mismatch(ValueKind::CardCollection)),
        }
    }
}

/// Something an assignment can write to.
enum Place<'a> {
    Variable(&'a str),
    Power(EntityId),
}

type Scope<'a> = FxHashMap<String, Value<'a>>;

struct Executor<'a, 'c, C: GameContext + ?Sized> {
    ctx: &'c mut C,
    max_loop_iterations: usize,
    scopes: Vec<Scope<'a>>,
    lists: Vec<Vec<EntityId>>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a, 'c, C: GameContext + ?Sized> Executor<'a, 'c, C> {
    fn new(ctx: &'c mut C, config: &ExecutorConfig) -> Self {
        Self {
            ctx,
            max_loop_iterations: config.max_loop_iterations,
            scopes: vec![Scope::default()],
            lists: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    fn note(&mut self, message: String) {
        log::debug!("{}", message);
        self.diagnostics.push(Diagnostic::runtime(message));
    }

    // === Invocations ===

    fn run_invocation(
        &mut self,
        invocation: &'a EffectInvocation,
        parent: Option<Collection>,
    ) -> RResult<()> {
        let effect = &invocation.effect;

        // Arguments and selectors see no variables.
        self.scopes = vec![Scope::default()];
        let mut scope = Scope::default();
        for arg in &invocation.args {
            let value = self.eval(&arg.value)?;
            scope.insert(arg.name.clone(), value);
        }
        let targets = self.resolve_targets(invocation.selector.as_ref(), parent)?;

        scope.insert(effect.targets.clone(), Value::Collection(targets));
        scope.insert(effect.context.clone(), Value::Context);
        self.scopes = vec![scope];
        self.exec_body(&effect.body)?;

        if let Some(post_action) = &invocation.post_action {
            let saved = std::mem::take(&mut self.scopes);
            self.run_invocation(post_action, Some(targets))?;
            self.scopes = saved;
        }
        Ok(())
    }

    fn resolve_targets(
        &mut self,
        selector: Option<&'a Selector>,
        parent: Option<Collection>,
    ) -> RResult<Collection> {
        let Some(selector) = selector else {
            return Ok(match parent {
                Some(parent) => parent,
                None => self.new_list(Vec::new()),
            });
        };

        let trigger = self.ctx.trigger_player();
        let source = match selector.source.zone(trigger, self.ctx.player_count()) {
            Some(zone) => Collection::Zone(zone),
            None => match parent {
                Some(parent) => parent,
                None => self.new_list(Vec::new()),
            },
        };
        let single = self.eval(&selector.single)?.into_bool()?;

        let mut matched = Vec::new();
        for card in self.collection_cards(source) {
            if self.call_predicate(&selector.predicate, card)? {
                matched.push(card);
                if single {
                    break;
                }
            }
        }
        if matched.is_empty() {
            self.note(format!("selector on `{}` matched no cards", selector.source));
        }
        Ok(self.new_list(matched))
    }

    fn call_predicate(&mut self, lambda: &'a Lambda, card: EntityId) -> RResult<bool> {
        let mut scope = Scope::default();
        scope.insert(lambda.param.clone(), Value::Card(card));
        self.scopes.push(scope);
        let result = self.eval(&lambda.body);
        self.scopes.pop();
        result?.into_bool()
    }

    // === Collections ===

    fn new_list(&mut self, cards: Vec<EntityId>) -> Collection {
        self.lists.push(cards);
        Collection::List(self.lists.len() - 1)
    }

    fn collection_cards(&self, collection: Collection) -> Vec<EntityId> {
        match collection {
            Collection::Zone(zone) => self.ctx.cards(zone),
            Collection::List(id) => self.lists[id].clone(),
        }
    }

    fn require_card(&self, card: EntityId) -> RResult<()> {
        match self.ctx.card(card) {
            Some(_) => Ok(()),
            None => Err(RuntimeError::MissingCard(card)),
        }
    }

    fn put(&mut self, collection: Collection, card: EntityId, position: ZonePosition) -> RResult<()> {
        self.require_card(card)?;
        match collection {
            Collection::Zone(zone) => self.ctx.push(zone, card, position),
            Collection::List(id) => {
                let list = &mut self.lists[id];
                list.retain(|&c| c != card);
                match position {
                    ZonePosition::Top => list.push(card),
                    ZonePosition::Bottom => list.insert(0, card),
                }
            }
        }
        Ok(())
    }

    fn pop(&mut self, collection: Collection) -> RResult<EntityId> {
        let popped = match collection {
            Collection::Zone(zone) => self.ctx.pop(zone),
            Collection::List(id) => self.lists[id].pop(),
        };
        popped.ok_or(RuntimeError::EmptyCollection { operation: "pop" })
    }

    fn remove(&mut self, collection: Collection, card: EntityId) {
        match collection {
            Collection::Zone(zone) => {
                self.ctx.remove(zone, card);
            }
            Collection::List(id) => self.lists[id].retain(|&c| c != card),
        }
    }

    fn shuffle(&mut self, collection: Collection) {
        match collection {
            Collection::Zone(zone) => self.ctx.shuffle(zone),
            Collection::List(id) => {
                let mut cards = std::mem::take(&mut self.lists[id]);
                self.ctx.shuffle_cards(&mut cards);
                self.lists[id] = cards;
            }
        }
    }

    fn find(&mut self, collection: Collection, predicate: &'a Lambda) -> RResult<Collection> {
        let mut matched = Vec::new();
        for card in self.collection_cards(collection) {
            if self.call_predicate(predicate, card)? {
                matched.push(card);
            }
        }
        Ok(self.new_list(matched))
    }

    // === Variables ===

    fn lookup(&self, name: &str) -> RResult<Value<'a>> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
            .cloned()
            .ok_or_else(|| RuntimeError::UndefinedVariable(name.to_string()))
    }

    /// Update the nearest binding of `name`, or declare it innermost.
    fn set_var(&mut self, name: &str, value: Value<'a>) {
        for scope in self.scopes.iter_mut().rev() {
            if let Some(slot) = scope.get_mut(name) {
                *slot = value;
                return;
            }
        }
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), value);
        }
    }

    fn place(&mut self, target: &'a Expr) -> RResult<Place<'a>> {
        match &target.kind {
            ExprKind::Variable(name) => Ok(Place::Variable(name)),
            ExprKind::Member {
                receiver,
                member: Some(Member::Power),
                args: None,
                ..
            } => {
                let card = self.eval(receiver)?.into_card()?;
                Ok(Place::Power(card))
            }
            _ => Err(RuntimeError::NotAssignable),
        }
    }

    fn read(&self, place: &Place<'a>) -> RResult<Value<'a>> {
        match place {
            Place::Variable(name) => self.lookup(name),
            Place::Power(card) => self
                .ctx
                .card(*card)
                .map(|c| Value::Int(c.power))
                .ok_or(RuntimeError::MissingCard(*card)),
        }
    }

    fn write(&mut self, place: Place<'a>, value: Value<'a>) -> RResult<()> {
        match place {
            Place::Variable(name) => {
                self.set_var(name, value);
                Ok(())
            }
            Place::Power(card) => {
                let power = value.into_int()?;
                if self.ctx.set_power(card, power) {
                    Ok(())
                } else {
                    Err(RuntimeError::MissingCard(card))
                }
            }
        }
    }

    // === Statements ===

    fn exec_body(&mut self, body: &'a [Stmt]) -> RResult<()> {
        for stmt in body {
            self.exec_stmt(stmt)?;
        }
        Ok(())
    }

    fn exec_scoped(&mut self, body: &'a [Stmt], binding: Option<(&str, Value<'a>)>) -> RResult<()> {
        let mut scope = Scope::default();
        if let Some((name, value)) = binding {
            scope.insert(name.to_string(), value);
        }
        self.scopes.push(scope);
        let result = self.exec_body(body);
        self.scopes.pop();
        result
    }

    fn exec_stmt(&mut self, stmt: &'a Stmt) -> RResult<()> {
        match stmt {
            Stmt::Expr(expr) => {
                self.eval(expr)?;
            }
            Stmt::Assign {
                target, op, value, ..
            } => {
                let value = self.eval(value)?;
                let place = self.place(target)?;
                let value = match op.binary() {
                    None => value,
                    Some(arith) => {
                        let current = self.read(&place)?.into_int()?;
                        Value::Int(arithmetic(arith, current, value.into_int()?)?)
                    }
                };
                self.write(place, value)?;
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                if self.eval(condition)?.into_bool()? {
                    self.exec_scoped(then_branch, None)?;
                } else if let Some(else_branch) = else_branch {
                    self.exec_scoped(else_branch, None)?;
                }
            }
            Stmt::While {
                condition, body, ..
            } => {
                let mut iterations = 0usize;
                while self.eval(condition)?.into_bool()? {
                    iterations += 1;
                    if iterations > self.max_loop_iterations {
                        return Err(RuntimeError::LoopLimit(self.max_loop_iterations));
                    }
                    self.exec_scoped(body, None)?;
                }
            }
            Stmt::For {
                var,
                iterable,
                body,
                ..
            } => {
                let collection = self.eval(iterable)?.into_collection()?;
                // Iterate a snapshot so the body may move cards around.
                for card in self.collection_cards(collection) {
                    self.exec_scoped(body, Some((var.as_str(), Value::Card(card))))?;
                }
            }
        }
        Ok(())
    }

    // === Expressions ===

    fn eval(&mut self, expr: &'a Expr) -> RResult<Value<'a>> {
        match &expr.kind {
            ExprKind::Literal(literal) => Ok(match literal {
                Literal::Int(n) => Value::Int(*n),
                Literal::Bool(b) => Value::Bool(*b),
                Literal::Str(s) => Value::Str(s.clone()),
            }),
            ExprKind::Variable(name) => self.lookup(name),
            ExprKind::Unary { op, operand } => {
                let value = self.eval(operand)?;
                match op {
                    UnaryOp::Not => Ok(Value::Bool(!value.into_bool()?)),
                    UnaryOp::Neg => value
                        .into_int()?
                        .checked_neg()
                        .map(Value::Int)
                        .ok_or(RuntimeError::Overflow { operator: "-" }),
                }
            }
            ExprKind::Binary { op, lhs, rhs } => self.eval_binary(*op, lhs, rhs),
            ExprKind::Member {
                receiver,
                name,
                member,
                args,
            } => {
                let receiver = self.eval(receiver)?;
                let member = member.ok_or_else(|| RuntimeError::UnknownMember(name.clone()))?;
                let mut values = Vec::new();
                for arg in args.iter().flatten() {
                    values.push(self.eval(arg)?);
                }
                self.eval_member(receiver, member, values)
            }
            ExprKind::Lambda(lambda) => Ok(Value::Predicate(lambda)),
            ExprKind::Step { target, op } => {
                let place = self.place(target)?;
                let old = self.read(&place)?.into_int()?;
                let (arith, symbol) = match op {
                    StepOp::Increment => (old.checked_add(1), "++"),
                    StepOp::Decrement => (old.checked_sub(1), "--"),
                };
                let new = arith.ok_or(RuntimeError::Overflow { operator: symbol })?;
                self.write(place, Value::Int(new))?;
                Ok(Value::Int(old))
            }
        }
    }

    fn eval_binary(&mut self, op: BinaryOp, lhs: &'a Expr, rhs: &'a Expr) -> RResult<Value<'a>> {
        // Logic short-circuits.
        match op {
            BinaryOp::And => {
                let left = self.eval(lhs)?.into_bool()?;
                return Ok(Value::Bool(left && self.eval(rhs)?.into_bool()?));
            }
            BinaryOp::Or => {
                let left = self.eval(lhs)?.into_bool()?;
                return Ok(Value::Bool(left || self.eval(rhs)?.into_bool()?));
            }
            _ => {}
        }

        let left = self.eval(lhs)?;
        let right = self.eval(rhs)?;
        Ok(match op {
            BinaryOp::Eq => Value::Bool(left == right),
            BinaryOp::Neq => Value::Bool(left != right),
            BinaryOp::Lt => Value::Bool(left.into_int()? < right.into_int()?),
            BinaryOp::Lte => Value::Bool(left.into_int()? <= right.into_int()?),
            BinaryOp::Gt => Value::Bool(left.into_int()? > right.into_int()?),
            BinaryOp::Gte => Value::Bool(left.into_int()? >= right.into_int()?),
            BinaryOp::Concat => Value::Str(left.into_str()? + &right.into_str()?),
            BinaryOp::ConcatSpaced => {
                Value::Str(format!("{} {}", left.into_str()?, right.into_str()?))
            }
            BinaryOp::Add
            | BinaryOp::Sub
            | BinaryOp::Mul
            | BinaryOp::Div
            | BinaryOp::Mod
            | BinaryOp::Pow => Value::Int(arithmetic(op, left.into_int()?, right.into_int()?)?),
            BinaryOp::And | BinaryOp::Or => unreachable!("handled above"),
        })
    }

    fn player_zone(&self, owner: PlayerId, kind: ZoneKind) -> Value<'a> {
        Value::Collection(Collection::Zone(ZoneRef::Player(ZoneId::new(owner, kind))))
    }

    fn eval_member(
        &mut self,
        receiver: Value<'a>,
        member: Member,
        args: Vec<Value<'a>>,
    ) -> RResult<Value<'a>> {
        let mut args = args.into_iter();
        let mut arg = |expected: ValueKind| args.next().ok_or(RuntimeError::TypeMismatch {
            expected,
            found: ValueKind::Void,
        });

        match receiver {
            Value::Context => {
                let trigger = self.ctx.trigger_player();
                Ok(match member {
                    Member::TriggerPlayer => Value::Player(trigger),
                    Member::Board => Value::Collection(Collection::Zone(ZoneRef::Board)),
                    Member::Hand => self.player_zone(trigger, ZoneKind::Hand),
                    Member::Deck => self.player_zone(trigger, ZoneKind::Deck),
                    Member::Field => self.player_zone(trigger, ZoneKind::Field),
                    Member::Graveyard => self.player_zone(trigger, ZoneKind::Graveyard),
                    Member::HandOfPlayer
                    | Member::DeckOfPlayer
                    | Member::FieldOfPlayer
                    | Member::GraveyardOfPlayer => {
                        let player = match arg(ValueKind::Player)? {
                            Value::Player(player) => player,
                            other => return Err(other.mismatch(ValueKind::Player)),
                        };
                        let kind = match member {
                            Member::HandOfPlayer => ZoneKind::Hand,
                            Member::DeckOfPlayer => ZoneKind::Deck,
                            Member::FieldOfPlayer => ZoneKind::Field,
                            _ => ZoneKind::Graveyard,
                        };
                        self.player_zone(player, kind)
                    }
                    _ => return Err(Value::Context.mismatch(member.signature().receiver)),
                })
            }
            Value::Collection(collection) => Ok(match member {
                Member::Find => match arg(ValueKind::Predicate)? {
                    Value::Predicate(lambda) => Value::Collection(self.find(collection, lambda)?),
                    other => return Err(other.mismatch(ValueKind::Predicate)),
                },
                Member::Push | Member::Add => {
                    let card = arg(ValueKind::Card)?.into_card()?;
                    self.put(collection, card, ZonePosition::Top)?;
                    Value::Void
                }
                Member::SendBottom => {
                    let card = arg(ValueKind::Card)?.into_card()?;
                    self.put(collection, card, ZonePosition::Bottom)?;
                    Value::Void
                }
                Member::Remove => {
                    let card = arg(ValueKind::Card)?.into_card()?;
                    self.remove(collection, card);
                    Value::Void
                }
                Member::Pop => Value::Card(self.pop(collection)?),
                Member::Shuffle => {
                    self.shuffle(collection);
                    Value::Void
                }
                Member::Count => Value::Int(self.collection_cards(collection).len() as i64),
                _ => {
                    return Err(Value::Collection(collection).mismatch(member.signature().receiver))
                }
            }),
            Value::Card(id) => {
                let card = self.ctx.card(id).ok_or(RuntimeError::MissingCard(id))?;
                Ok(match member {
                    Member::Name => Value::Str(card.name.clone()),
                    Member::Faction => Value::Str(card.faction.name().to_string()),
                    Member::Type => Value::Str(card.card_type.name().to_string()),
                    Member::Range => Value::Str(card.range_text()),
                    Member::Owner => Value::Player(card.owner),
                    Member::Power => Value::Int(card.power),
                    _ => return Err(Value::Card(id).mismatch(member.signature().receiver)),
                })
            }
            other => Err(other.mismatch(member.signature().receiver)),
        }
    }
}

/// Checked integer arithmetic shared by operators and compound assignment.
fn arithmetic(op: BinaryOp, left: i64, right: i64) -> RResult<i64> {
    let overflow = RuntimeError::Overflow {
        operator: op.symbol(),
    };
    match op {
        BinaryOp::Add => left.checked_add(right).ok_or(overflow),
        BinaryOp::Sub => left.checked_sub(right).ok_or(overflow),
        BinaryOp::Mul => left.checked_mul(right).ok_or(overflow),
        BinaryOp::Div | BinaryOp::Mod if right == 0 => Err(RuntimeError::DivisionByZero),
        BinaryOp::Div => left.checked_div(right).ok_or(overflow),
        BinaryOp::Mod => left.checked_rem(right).ok_or(overflow),
        BinaryOp::Pow => {
            if right < 0 {
                return Err(RuntimeError::NegativeExponent(right));
            }
            let exponent = u32::try_from(right).map_err(|_| overflow.clone())?;
            left.checked_pow(exponent).ok_or(overflow)
        }
        _ => Err(RuntimeError::TypeMismatch {
            expected: ValueKind::Int,
            found: op.signature().result,
        }),
    }
}
