//! Lexeme types produced by the lexer.

use crate::combinators::cursor::HasSpan;
use crate::error::Span;

/// A tagged lexeme, per spec.md §3/§4.2. `Word` compares and hashes
/// case-insensitively; every other variant compares structurally.
#[derive(Debug, Clone)]
pub enum LexemeKind {
    /// A run of one or more newlines (possibly separated by other
    /// whitespace); `count` is the number of `\n` characters matched.
    Newline { count: usize },
    /// A bare identifier: mnemonic, register, or label reference.
    Word(String),
    /// A directive keyword with its leading `.` stripped.
    DotWord(String),
    /// A decimal (`#`) or hexadecimal (`x`/`X`) integer literal.
    Integer { value: i32, literal: String },
    /// A quoted string with its surrounding `"` stripped.
    Str(String),
    /// A quoted character literal with its surrounding `'` stripped.
    Char(String),
    /// A `;`-introduced comment with the leading `;` stripped.
    Comment(String),
    /// Input that matched none of the well-formed lexeme patterns.
    Invalid(String),
}

impl PartialEq for LexemeKind {
    fn eq(&self, other: &Self) -> bool {
        use LexemeKind::*;
        match (self, other) {
            (Newline { count: a }, Newline { count: b }) => a == b,
            (Word(a), Word(b)) => a.eq_ignore_ascii_case(b),
            (DotWord(a), DotWord(b)) => a == b,
            (Integer { value: va, literal: la }, Integer { value: vb, literal: lb }) => {
                va == vb && la == lb
            }
            (Str(a), Str(b)) => a == b,
            (Char(a), Char(b)) => a == b,
            (Comment(a), Comment(b)) => a == b,
            (Invalid(a), Invalid(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for LexemeKind {}

impl LexemeKind {
    pub fn is_invalid(&self) -> bool {
        matches!(self, LexemeKind::Invalid(_))
    }

    /// A short, human-readable name for diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            LexemeKind::Newline { .. } => "newline",
            LexemeKind::Word(_) => "word",
            LexemeKind::DotWord(_) => "directive",
            LexemeKind::Integer { .. } => "integer",
            LexemeKind::Str(_) => "string",
            LexemeKind::Char(_) => "character",
            LexemeKind::Comment(_) => "comment",
            LexemeKind::Invalid(_) => "invalid lexeme",
        }
    }
}

/// A lexeme together with the source span it was matched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: LexemeKind,
    pub span: Span,
}

impl HasSpan for Token {
    fn span(&self) -> Span {
        self.span
    }
}
