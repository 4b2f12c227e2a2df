//! Type system tables shared by the parser, checker and executor.
//!
//! ## Tables
//!
//! - `ValueKind`: the closed set of value kinds
//! - `BinaryOp::precedence`: binding strength (higher binds tighter)
//! - `BinaryOp::signature` / `UnaryOp::signature`: operand and result kinds
//! - `Member::signature`: which receiver kind owns a member, its parameter
//!   kinds, its result kind and whether it is a property or a call
//!
//! Precedence, lowest to highest:
//!
//! | level | operators |
//! |---|---|
//! | 1 | `or` |
//! | 2 | `and` |
//! | 3 | `==` `!=` |
//! | 4 | `<` `<=` `>` `>=` |
//! | 5 | `@` `@@` |
//! | 6 | `+` `-` |
//! | 7 | `*` `/` `%` |
//! | 8 | `^` |
//! | 9 | unary `not` `-` |
//! | 10 | member access, calls, postfix `++` `--` |

use serde::{Deserialize, Serialize};

use super::lexer::TokenKind;

/// Static kind of every expression.
///
/// `Unassigned` is the annotation before checking and the kind given to
/// expressions whose type could not be determined; it never triggers a
/// second diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    Int,
    Bool,
    String,
    Player,
    Predicate,
    Card,
    CardCollection,
    Void,
    Context,
    Unassigned,
}

impl ValueKind {
    /// Kind named by an effect parameter declaration (`Amount: Number`).
    #[must_use]
    pub fn from_param_type(name: &str) -> Option<Self> {
        match name {
            "Number" | "Int" => Some(Self::Int),
            "String" | "Text" => Some(Self::String),
            "Bool" => Some(Self::Bool),
            _ => None,
        }
    }

    /// Kinds that `==` and `!=` accept.
    #[must_use]
    pub const fn is_comparable(self) -> bool {
        matches!(
            self,
            Self::Int | Self::Bool | Self::String | Self::Player | Self::Card
        )
    }

    /// True when `self` is known and differs from `expected`.
    #[must_use]
    pub fn conflicts_with(self, expected: ValueKind) -> bool {
        self != Self::Unassigned && self != expected
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Int => "Int",
            Self::Bool => "Bool",
            Self::String => "String",
            Self::Player => "Player",
            Self::Predicate => "Predicate",
            Self::Card => "Card",
            Self::CardCollection => "CardCollection",
            Self::Void => "Void",
            Self::Context => "Context",
            Self::Unassigned => "Unassigned",
        }
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Binding strength of prefix operators.
pub const UNARY_PRECEDENCE: u8 = 9;

/// Binding strength of member access, calls and postfix steps.
pub const MEMBER_PRECEDENCE: u8 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    Concat,
    ConcatSpaced,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
}

/// What an operator accepts on each side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operands {
    /// Both operands must be this kind.
    Exactly(ValueKind),
    /// Both operands must share one comparable kind.
    SameComparable,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OperatorSignature {
    pub operands: Operands,
    pub result: ValueKind,
}

impl BinaryOp {
    pub const ALL: [BinaryOp; 16] = [
        BinaryOp::Or,
        BinaryOp::And,
        BinaryOp::Eq,
        BinaryOp::Neq,
        BinaryOp::Lt,
        BinaryOp::Lte,
        BinaryOp::Gt,
        BinaryOp::Gte,
        BinaryOp::Concat,
        BinaryOp::ConcatSpaced,
        BinaryOp::Add,
        BinaryOp::Sub,
        BinaryOp::Mul,
        BinaryOp::Div,
        BinaryOp::Mod,
        BinaryOp::Pow,
    ];

    /// Map an infix token to its operator.
    #[must_use]
    pub fn from_token(kind: &TokenKind) -> Option<Self> {
        Some(match kind {
            TokenKind::Or => Self::Or,
            TokenKind::And => Self::And,
            TokenKind::Eq => Self::Eq,
            TokenKind::Neq => Self::Neq,
            TokenKind::Lt => Self::Lt,
            TokenKind::Lte => Self::Lte,
            TokenKind::Gt => Self::Gt,
            TokenKind::Gte => Self::Gte,
            TokenKind::At => Self::Concat,
            TokenKind::AtAt => Self::ConcatSpaced,
            TokenKind::Plus => Self::Add,
            TokenKind::Minus => Self::Sub,
            TokenKind::Star => Self::Mul,
            TokenKind::Slash => Self::Div,
            TokenKind::Percent => Self::Mod,
            TokenKind::Caret => Self::Pow,
            _ => return None,
        })
    }

    #[must_use]
    pub const fn precedence(self) -> u8 {
        match self {
            Self::Or => 1,
            Self::And => 2,
            Self::Eq | Self::Neq => 3,
            Self::Lt | Self::Lte | Self::Gt | Self::Gte => 4,
            Self::Concat | Self::ConcatSpaced => 5,
            Self::Add | Self::Sub => 6,
            Self::Mul | Self::Div | Self::Mod => 7,
            Self::Pow => 8,
        }
    }

    #[must_use]
    pub const fn signature(self) -> OperatorSignature {
        use ValueKind::{Bool, Int, String};
        let (operands, result) = match self {
            Self::Or | Self::And => (Operands::Exactly(Bool), Bool),
            Self::Eq | Self::Neq => (Operands::SameComparable, Bool),
            Self::Lt | Self::Lte | Self::Gt | Self::Gte => (Operands::Exactly(Int), Bool),
            Self::Concat | Self::ConcatSpaced => (Operands::Exactly(String), String),
            Self::Add | Self::Sub | Self::Mul | Self::Div | Self::Mod | Self::Pow => {
                (Operands::Exactly(Int), Int)
            }
        };
        OperatorSignature { operands, result }
    }

    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Or => "or",
            Self::And => "and",
            Self::Eq => "==",
            Self::Neq => "!=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Concat => "@",
            Self::ConcatSpaced => "@@",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Pow => "^",
        }
    }
}

impl std::fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    Not,
    Neg,
}

impl UnaryOp {
    #[must_use]
    pub fn from_token(kind: &TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Not => Some(Self::Not),
            TokenKind::Minus => Some(Self::Neg),
            _ => None,
        }
    }

    /// (operand kind, result kind)
    #[must_use]
    pub const fn signature(self) -> (ValueKind, ValueKind) {
        match self {
            Self::Not => (ValueKind::Bool, ValueKind::Bool),
            Self::Neg => (ValueKind::Int, ValueKind::Int),
        }
    }

    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Not => "not",
            Self::Neg => "-",
        }
    }
}

impl std::fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Every member name the language knows about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Member {
    // Context
    TriggerPlayer,
    Board,
    Hand,
    Deck,
    Field,
    Graveyard,
    HandOfPlayer,
    DeckOfPlayer,
    FieldOfPlayer,
    GraveyardOfPlayer,
    // CardCollection
    Find,
    Push,
    SendBottom,
    Pop,
    Remove,
    Shuffle,
    Add,
    Count,
    // Card
    Name,
    Owner,
    Power,
    Faction,
    Range,
    Type,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemberForm {
    /// `receiver.Member`
    Property,
    /// `receiver.Member(args)`
    Call,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemberSignature {
    pub receiver: ValueKind,
    pub params: &'static [ValueKind],
    pub result: ValueKind,
    pub form: MemberForm,
    /// Whether the member may appear on the left of an assignment.
    pub assignable: bool,
}

impl MemberSignature {
    const fn property(receiver: ValueKind, result: ValueKind) -> Self {
        Self {
            receiver,
            params: &[],
            result,
            form: MemberForm::Property,
            assignable: false,
        }
    }

    const fn call(receiver: ValueKind, params: &'static [ValueKind], result: ValueKind) -> Self {
        Self {
            receiver,
            params,
            result,
            form: MemberForm::Call,
            assignable: false,
        }
    }
}

impl Member {
    pub const ALL: [Member; 24] = [
        Member::TriggerPlayer,
        Member::Board,
        Member::Hand,
        Member::Deck,
        Member::Field,
        Member::Graveyard,
        Member::HandOfPlayer,
        Member::DeckOfPlayer,
        Member::FieldOfPlayer,
        Member::GraveyardOfPlayer,
        Member::Find,
        Member::Push,
        Member::SendBottom,
        Member::Pop,
        Member::Remove,
        Member::Shuffle,
        Member::Add,
        Member::Count,
        Member::Name,
        Member::Owner,
        Member::Power,
        Member::Faction,
        Member::Range,
        Member::Type,
    ];

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|m| m.name() == name)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::TriggerPlayer => "TriggerPlayer",
            Self::Board => "Board",
            Self::Hand => "Hand",
            Self::Deck => "Deck",
            Self::Field => "Field",
            Self::Graveyard => "Graveyard",
            Self::HandOfPlayer => "HandOfPlayer",
            Self::DeckOfPlayer => "DeckOfPlayer",
            Self::FieldOfPlayer => "FieldOfPlayer",
            Self::GraveyardOfPlayer => "GraveyardOfPlayer",
            Self::Find => "Find",
            Self::Push => "Push",
            Self::SendBottom => "SendBottom",
            Self::Pop => "Pop",
            Self::Remove => "Remove",
            Self::Shuffle => "Shuffle",
            Self::Add => "Add",
            Self::Count => "Count",
            Self::Name => "Name",
            Self::Owner => "Owner",
            Self::Power => "Power",
            Self::Faction => "Faction",
            Self::Range => "Range",
            Self::Type => "Type",
        }
    }

    #[must_use]
    pub const fn signature(self) -> MemberSignature {
        use ValueKind::{Card, CardCollection, Context, Int, Player, Predicate, String, Void};
        match self {
            Self::TriggerPlayer => MemberSignature::property(Context, Player),
            Self::Board | Self::Hand | Self::Deck | Self::Field | Self::Graveyard => {
                MemberSignature::property(Context, CardCollection)
            }
            Self::HandOfPlayer
            | Self::DeckOfPlayer
            | Self::FieldOfPlayer
            | Self::GraveyardOfPlayer => MemberSignature::call(Context, &[Player], CardCollection),
            Self::Find => MemberSignature::call(CardCollection, &[Predicate], CardCollection),
            Self::Push | Self::SendBottom | Self::Remove | Self::Add => {
                MemberSignature::call(CardCollection, &[Card], Void)
            }
            Self::Pop => MemberSignature::call(CardCollection, &[], Card),
            Self::Shuffle => MemberSignature::call(CardCollection, &[], Void),
            Self::Count => MemberSignature::property(CardCollection, Int),
            Self::Name | Self::Faction | Self::Range | Self::Type => {
                MemberSignature::property(Card, String)
            }
            Self::Owner => MemberSignature::property(Card, Player),
            Self::Power => MemberSignature {
                assignable: true,
                ..MemberSignature::property(Card, Int)
            },
        }
    }
}

impl std::fmt::Display for Member {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Members callable on a value of `kind`.
pub fn members_of(kind: ValueKind) -> impl Iterator<Item = Member> {
    Member::ALL
        .into_iter()
        .filter(move |m| m.signature().receiver == kind)
}

/// Look a member up against a receiver kind.
#[must_use]
pub fn lookup_member(receiver: ValueKind, member: Member) -> Option<MemberSignature> {
    let signature = member.signature();
    (signature.receiver == receiver).then_some(signature)
}
