//! Abstract syntax tree for card files.
//!
//! Two layers:
//!
//! - Expression and statement nodes (`Expr`, `Stmt`), shared by effect
//!   actions, selector predicates and effect arguments. Every `Expr` carries
//!   a `ValueKind` that starts as `Unassigned` and is filled in by the
//!   checker.
//! - Block nodes (`EffectBlock`, `CardBlock`, ...) mirroring the file's
//!   `effect { ... }` / `card { ... }` structure before semantic lowering.

use serde::{Deserialize, Serialize};

use super::lexer::Position;
use super::types::{BinaryOp, Member, UnaryOp, ValueKind};

/// A value with the position it came from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spanned<T> {
    pub node: T,
    pub position: Position,
}

impl<T> Spanned<T> {
    pub fn new(node: T, position: Position) -> Self {
        Self { node, position }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Literal {
    Int(i64),
    Bool(bool),
    Str(String),
}

impl Literal {
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Literal::Int(_) => ValueKind::Int,
            Literal::Bool(_) => ValueKind::Bool,
            Literal::Str(_) => ValueKind::String,
        }
    }
}

/// Call arguments.
pub type Args = Vec<Expr>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expr {
    pub kind: ExprKind,
    pub position: Position,
    pub value_kind: ValueKind,
}

impl Expr {
    pub fn new(kind: ExprKind, position: Position) -> Self {
        Self {
            kind,
            position,
            value_kind: ValueKind::Unassigned,
        }
    }

    pub fn literal(literal: Literal, position: Position) -> Self {
        Self::new(ExprKind::Literal(literal), position)
    }
}

/// `(card) => body`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lambda {
    pub param: String,
    pub body: Box<Expr>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepOp {
    Increment,
    Decrement,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExprKind {
    Literal(Literal),
    Variable(String),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// `receiver.name` or `receiver.name(args)`.
    ///
    /// `member` is `None` when `name` is not a known member; `args` is
    /// `None` for property syntax.
    Member {
        receiver: Box<Expr>,
        name: String,
        member: Option<Member>,
        args: Option<Args>,
    },
    Lambda(Lambda),
    /// Postfix `target++` / `target--`; evaluates to the old value.
    Step {
        target: Box<Expr>,
        op: StepOp,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignOp {
    Set,
    Add,
    Sub,
    Mul,
    Div,
}

impl AssignOp {
    /// The arithmetic a compound assignment performs.
    #[must_use]
    pub const fn binary(self) -> Option<BinaryOp> {
        match self {
            AssignOp::Set => None,
            AssignOp::Add => Some(BinaryOp::Add),
            AssignOp::Sub => Some(BinaryOp::Sub),
            AssignOp::Mul => Some(BinaryOp::Mul),
            AssignOp::Div => Some(BinaryOp::Div),
        }
    }
}

pub type Body = Vec<Stmt>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stmt {
    Expr(Expr),
    Assign {
        target: Expr,
        op: AssignOp,
        value: Expr,
        position: Position,
    },
    If {
        condition: Expr,
        then_branch: Body,
        else_branch: Option<Body>,
        position: Position,
    },
    While {
        condition: Expr,
        body: Body,
        position: Position,
    },
    For {
        var: String,
        iterable: Expr,
        body: Body,
        position: Position,
    },
}

// === Blocks ===

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamDecl {
    pub name: String,
    pub type_name: String,
    pub position: Position,
}

/// `Action: (targets, context) => { ... }`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDecl {
    pub targets: String,
    pub context: String,
    pub body: Body,
    pub position: Position,
}

/// A header field as written in a block.
///
/// `Malformed` means the parser already reported the value and the lowering
/// pass substitutes a placeholder for it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Header<T> {
    Missing,
    Malformed(Position),
    Given(Spanned<T>),
}

impl<T> Header<T> {
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, Header::Missing)
    }

    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(self, Header::Malformed(_))
    }

    #[must_use]
    pub fn given(&self) -> Option<&Spanned<T>> {
        match self {
            Header::Given(value) => Some(value),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectBlock {
    pub name: Header<String>,
    pub params: Vec<ParamDecl>,
    pub action: Option<ActionDecl>,
    pub position: Position,
    /// Position of the closing `}`.
    pub end: Position,
    /// Whether the parser reported anything inside this block.
    pub recovered: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorBlock {
    pub source: Option<Spanned<String>>,
    pub single: Option<Expr>,
    pub predicate: Option<Spanned<Lambda>>,
    pub position: Position,
}

/// One entry of `OnActivation`, or a `PostAction`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationBlock {
    pub effect: Option<Spanned<String>>,
    pub args: Vec<(Spanned<String>, Expr)>,
    pub selector: Option<SelectorBlock>,
    pub post_action: Option<Box<InvocationBlock>>,
    pub position: Position,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardBlock {
    pub name: Header<String>,
    pub card_type: Header<String>,
    pub faction: Header<String>,
    pub power: Header<i64>,
    pub range: Header<Vec<Spanned<String>>>,
    pub description: Header<String>,
    pub on_activation: Vec<InvocationBlock>,
    pub position: Position,
    /// Position of the closing `}`.
    pub end: Position,
    /// Whether the parser reported anything inside this block.
    pub recovered: bool,
}

impl CardBlock {
    pub(crate) fn new(position: Position) -> Self {
        Self {
            name: Header::Missing,
            card_type: Header::Missing,
            faction: Header::Missing,
            power: Header::Missing,
            range: Header::Missing,
            description: Header::Missing,
            on_activation: Vec::new(),
            position,
            end: position,
            recovered: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TopLevel {
    Effect(EffectBlock),
    Card(CardBlock),
}

impl TopLevel {
    /// Position of the block's opening keyword.
    #[must_use]
    pub fn position(&self) -> Position {
        match self {
            TopLevel::Effect(block) => block.position,
            TopLevel::Card(block) => block.position,
        }
    }

    /// Position of the block's closing brace.
    #[must_use]
    pub fn end(&self) -> Position {
        match self {
            TopLevel::Effect(block) => block.end,
            TopLevel::Card(block) => block.end,
        }
    }

    /// Whether `at` lies between the keyword and the closing brace.
    #[must_use]
    pub fn spans(&self, at: Position) -> bool {
        self.position() <= at && at <= self.end()
    }
}
