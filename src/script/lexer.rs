//! Lexer: source text to positioned tokens.
//!
//! Scanning never stops on bad input. Unrecognized characters, unterminated
//! strings and comments, and out-of-range integers are reported to the
//! `Diagnostics` sink and skipped; the stream always ends with `Eof`.
//!
//! Multi-character operators are matched greedily before their
//! one-character prefixes (`+=` before `+`, `@@` before `@`).

use serde::{Deserialize, Serialize};

use super::diagnostics::Diagnostics;

/// A 1-based line/column location in the source file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    #[must_use]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKind {
    Int(i64),
    Str(String),
    Ident(String),

    // Keywords
    Effect,
    Card,
    For,
    In,
    While,
    If,
    Else,
    True,
    False,
    /// `and` or `&&`
    And,
    /// `or` or `||`
    Or,
    /// `not` or `!`
    Not,

    // Punctuation
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Colon,
    Semicolon,
    Comma,
    Dot,
    /// `=>`
    Arrow,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    /// `@` string concatenation
    At,
    /// `@@` string concatenation with a space
    AtAt,
    PlusPlus,
    MinusMinus,
    Assign,
    PlusAssign,
    MinusAssign,
    StarAssign,
    SlashAssign,
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,

    Eof,
}

impl TokenKind {
    fn keyword(word: &str) -> Option<Self> {
        Some(match word {
            "effect" => Self::Effect,
            "card" => Self::Card,
            "for" => Self::For,
            "in" => Self::In,
            "while" => Self::While,
            "if" => Self::If,
            "else" => Self::Else,
            "true" => Self::True,
            "false" => Self::False,
            "and" => Self::And,
            "or" => Self::Or,
            "not" => Self::Not,
            _ => return None,
        })
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::Int(n) => return write!(f, "integer `{}`", n),
            Self::Str(s) => return write!(f, "string \"{}\"", s),
            Self::Ident(name) => return write!(f, "identifier `{}`", name),
            Self::Effect => "effect",
            Self::Card => "card",
            Self::For => "for",
            Self::In => "in",
            Self::While => "while",
            Self::If => "if",
            Self::Else => "else",
            Self::True => "true",
            Self::False => "false",
            Self::And => "and",
            Self::Or => "or",
            Self::Not => "not",
            Self::LBrace => "{",
            Self::RBrace => "}",
            Self::LBracket => "[",
            Self::RBracket => "]",
            Self::LParen => "(",
            Self::RParen => ")",
            Self::Colon => ":",
            Self::Semicolon => ";",
            Self::Comma => ",",
            Self::Dot => ".",
            Self::Arrow => "=>",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Percent => "%",
            Self::Caret => "^",
            Self::At => "@",
            Self::AtAt => "@@",
            Self::PlusPlus => "++",
            Self::MinusMinus => "--",
            Self::Assign => "=",
            Self::PlusAssign => "+=",
            Self::MinusAssign => "-=",
            Self::StarAssign => "*=",
            Self::SlashAssign => "/=",
            Self::Eq => "==",
            Self::Neq => "!=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Eof => return f.write_str("end of input"),
        };
        write!(f, "`{}`", text)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub position: Position,
}

/// Operator spellings, longest first so greedy matching falls out of the
/// iteration order.
const OPERATORS: &[(&str, TokenKind)] = &[
    ("++", TokenKind::PlusPlus),
    ("--", TokenKind::MinusMinus),
    ("+=", TokenKind::PlusAssign),
    ("-=", TokenKind::MinusAssign),
    ("*=", TokenKind::StarAssign),
    ("/=", TokenKind::SlashAssign),
    ("==", TokenKind::Eq),
    ("!=", TokenKind::Neq),
    ("<=", TokenKind::Lte),
    (">=", TokenKind::Gte),
    ("=>", TokenKind::Arrow),
    ("&&", TokenKind::And),
    ("||", TokenKind::Or),
    ("@@", TokenKind::AtAt),
    ("+", TokenKind::Plus),
    ("-", TokenKind::Minus),
    ("*", TokenKind::Star),
    ("/", TokenKind::Slash),
    ("%", TokenKind::Percent),
    ("^", TokenKind::Caret),
    ("@", TokenKind::At),
    ("=", TokenKind::Assign),
    ("<", TokenKind::Lt),
    (">", TokenKind::Gt),
    ("!", TokenKind::Not),
    ("{", TokenKind::LBrace),
    ("}", TokenKind::RBrace),
    ("[", TokenKind::LBracket),
    ("]", TokenKind::RBracket),
    ("(", TokenKind::LParen),
    (")", TokenKind::RParen),
    (":", TokenKind::Colon),
    (";", TokenKind::Semicolon),
    (",", TokenKind::Comma),
    (".", TokenKind::Dot),
];

struct Scanner<'d> {
    chars: Vec<char>,
    pos: usize,
    line: u32,
    column: u32,
    diagnostics: &'d mut Diagnostics,
}

impl<'d> Scanner<'d> {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn starts_with(&self, text: &str) -> bool {
        text.chars()
            .enumerate()
            .all(|(i, expected)| self.peek_at(i) == Some(expected))
    }

    fn slice(&self, start: usize) -> String {
        self.chars[start..self.pos].iter().collect()
    }

    /// Skip whitespace and comments. Returns false at end of input.
    fn skip_trivia(&mut self) -> bool {
        loop {
            match self.peek() {
                None => return false,
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('/') if self.peek_at(1) == Some('/') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                Some('/') if self.peek_at(1) == Some('*') => {
                    let start = self.position();
                    self.bump();
                    self.bump();
                    loop {
                        if self.starts_with("*/") {
                            self.bump();
                            self.bump();
                            break;
                        }
                        if self.bump().is_none() {
                            self.diagnostics
                                .lexical(start, "unterminated block comment");
                            return false;
                        }
                    }
                }
                Some(_) => return true,
            }
        }
    }

    fn string(&mut self, start: Position) -> TokenKind {
        self.bump(); // opening quote
        let mut value = String::new();
        loop {
            match self.bump() {
                None => {
                    self.diagnostics.lexical(start, "unterminated string literal");
                    break;
                }
                Some('"') => break,
                Some('\\') => match self.bump() {
                    Some('"') => value.push('"'),
                    Some('\\') => value.push('\\'),
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some(other) => {
                        self.diagnostics
                            .lexical(start, format!("unknown escape `\\{}` in string", other));
                        value.push(other);
                    }
                    None => {
                        self.diagnostics.lexical(start, "unterminated string literal");
                        break;
                    }
                },
                Some(c) => value.push(c),
            }
        }
        TokenKind::Str(value)
    }

    fn number(&mut self, start: Position) -> TokenKind {
        let from = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
        }
        let digits = self.slice(from);
        match digits.parse::<i64>() {
            Ok(n) => TokenKind::Int(n),
            Err(_) => {
                self.diagnostics
                    .lexical(start, format!("integer literal `{}` is out of range", digits));
                TokenKind::Int(0)
            }
        }
    }

    fn word(&mut self) -> TokenKind {
        let from = self.pos;
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            self.bump();
        }
        let word = self.slice(from);
        TokenKind::keyword(&word).unwrap_or(TokenKind::Ident(word))
    }

    fn operator(&mut self) -> Option<TokenKind> {
        let (text, kind) = OPERATORS.iter().find(|(text, _)| self.starts_with(text))?;
        for _ in 0..text.chars().count() {
            self.bump();
        }
        Some(kind.clone())
    }
}

/// Tokenize a whole source file.
///
/// Problems are appended to `diagnostics`; the returned stream is always
/// usable and always terminated by `TokenKind::Eof`.
pub fn tokenize(source: &str, diagnostics: &mut Diagnostics) -> Vec<Token> {
    let mut scanner = Scanner {
        chars: source.chars().collect(),
        pos: 0,
        line: 1,
        column: 1,
        diagnostics,
    };
    let mut tokens = Vec::new();

    while scanner.skip_trivia() {
        let start = scanner.position();
        let from = scanner.pos;
        let c = match scanner.peek() {
            Some(c) => c,
            None => break,
        };

        let kind = if c == '"' {
            scanner.string(start)
        } else if c.is_ascii_digit() {
            scanner.number(start)
        } else if c.is_alphabetic() || c == '_' {
            scanner.word()
        } else if let Some(kind) = scanner.operator() {
            kind
        } else {
            scanner.bump();
            scanner
                .diagnostics
                .lexical(start, format!("unexpected character `{}`", c));
            continue;
        };

        tokens.push(Token {
            kind,
            lexeme: scanner.slice(from),
            position: start,
        });
    }

    log::trace!("lexed {} tokens", tokens.len());
    tokens.push(Token {
        kind: TokenKind::Eof,
        lexeme: String::new(),
        position: scanner.position(),
    });
    tokens
}
