//! The card scripting language.
//!
//! - `lexer`: source text to tokens
//! - `parser`: tokens to `effect`/`card` block ASTs
//! - `types`: value kinds, operator and member tables
//! - `checker`: static typing of expressions and statements
//! - `compiler`: the full pipeline, source to `Compilation`
//!
//! Every stage reports into a `Diagnostics` sink instead of failing.

pub mod ast;
pub mod checker;
pub mod compiler;
pub mod diagnostics;
pub mod lexer;
mod lower;
pub mod parser;
pub mod types;

pub use compiler::{compile, compile_source, CompileError, Compilation, PRELUDE};
pub use diagnostics::{render_diagnostics, Diagnostic, Diagnostics, Tier, SUCCESS_MESSAGE};
pub use lexer::{tokenize, Position, Token, TokenKind};
pub use parser::{parse, parse_expression};
pub use types::{Member, ValueKind};
