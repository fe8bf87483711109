//! The LC-3 lexer: source text in, spanned [`Token`]s out.
//!
//! Built entirely from the [`crate::combinators`] vocabulary — no hand
//! written character-by-character scanning. The token table below mirrors
//! spec.md §4.2's pattern table exactly, in the same first-match-wins
//! order, with the catch-all `Invalid` pattern last.

pub mod token;

#[cfg(test)]
mod tests;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::combinators::cursor::{Cursor, StrCursor};
use crate::combinators::{regex_compiled, Combinator};
pub use token::{LexemeKind, Token};

static NEWLINE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([\n\r][\s\n\r]*)").expect("valid regex"));
static INTEGER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([#xX]-?\d+)").expect("valid regex"));
static DOTWORD_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\.[^\s,]+)").expect("valid regex"));
static STRING_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new("^(\"[^\\n\\r]*\")").expect("valid regex"));
static CHAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^('[^\n\r]*')").expect("valid regex"));
static COMMENT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(;[^\n\r]*)").expect("valid regex"));
static WORD_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([^\d\s,][^\s,]*)").expect("valid regex"));
static INVALID_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\S+)").expect("valid regex"));
static SEPARATOR_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[,\t ]+").expect("valid regex"));

/// Every non-blank run of `,`, tab, or space between lexemes; never
/// emitted as a token (spec.md §4.2's skip policy).
fn skip_separators(cursor: StrCursor) -> StrCursor {
    match SEPARATOR_PATTERN.find(cursor.rest()) {
        Some(m) => cursor.advance(m.end()),
        None => cursor,
    }
}

fn kind_combinator() -> Combinator<StrCursor, LexemeKind> {
    let newline = regex_compiled("newline", &NEWLINE_PATTERN)
        .map(|text| LexemeKind::Newline { count: text.matches('\n').count() });

    let integer = regex_compiled("integer", &INTEGER_PATTERN).try_map(|text| {
        let (radix_char, digits) = text.split_at(1);
        let radix = match radix_char {
            "#" => 10,
            "x" | "X" => 16,
            other => return Err(format!("unknown integer prefix '{other}'")),
        };
        let value = i32::from_str_radix(digits, radix)
            .map_err(|_| format!("invalid integer literal '{text}'"))?;
        Ok(LexemeKind::Integer { value, literal: text })
    });

    let dotword = regex_compiled("directive", &DOTWORD_PATTERN)
        .map(|text| LexemeKind::DotWord(text[1..].to_string()));

    let string_lit = regex_compiled("string", &STRING_PATTERN)
        .map(|text| LexemeKind::Str(text[1..text.len() - 1].to_string()));

    let char_lit = regex_compiled("character", &CHAR_PATTERN)
        .map(|text| LexemeKind::Char(text[1..text.len() - 1].to_string()));

    let comment = regex_compiled("comment", &COMMENT_PATTERN)
        .map(|text| LexemeKind::Comment(text[1..].to_string()));

    let word = regex_compiled("word", &WORD_PATTERN).map(LexemeKind::Word);

    let invalid = regex_compiled("invalid lexeme", &INVALID_PATTERN).map(LexemeKind::Invalid);

    newline
        .otherwise(integer)
        .otherwise(dotword)
        .otherwise(string_lit)
        .otherwise(char_lit)
        .otherwise(comment)
        .otherwise(word)
        .otherwise(invalid)
}

fn token_combinator() -> Combinator<StrCursor, Token> {
    kind_combinator()
        .as_token()
        .map(|spanned| Token { kind: spanned.value, span: spanned.span })
}

/// The full lexer output: every emitted token, including any `Invalid`
/// ones. Carrying this as a distinct type (rather than `Result<Vec<Token>,
/// _>`) keeps the invalid tokens' spans available to a caller that wants
/// to report every problem at once rather than just the first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidSequence {
    pub tokens: Vec<Token>,
}

impl InvalidSequence {
    /// The spans and text of every `Invalid` token in the sequence.
    pub fn invalid_tokens(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter().filter(|t| t.kind.is_invalid())
    }
}

impl std::fmt::Display for InvalidSequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "source contains {} invalid lexeme(s)", self.invalid_tokens().count())
    }
}

impl std::error::Error for InvalidSequence {}

/// Tokenize `source` in full. The lexer never stops early: it always
/// consumes to end-of-input, tagging unrecognized runs as `Invalid`
/// tokens rather than aborting, so a caller can report every lexical
/// problem in one pass (spec.md §4.2's failure mode, §7's batch-component
/// posture).
pub fn lex(source: &str) -> Result<Vec<Token>, InvalidSequence> {
    let token = token_combinator();
    let mut cursor = StrCursor::new(source);
    let mut tokens = Vec::new();
    let mut any_invalid = false;

    loop {
        cursor = skip_separators(cursor);
        if cursor.is_empty() {
            break;
        }
        let (rest, tok) = token
            .run(cursor.clone())
            .expect("the catch-all Invalid pattern matches any non-empty, non-separator input");
        any_invalid |= tok.kind.is_invalid();
        tokens.push(tok);
        cursor = rest;
    }

    if any_invalid {
        Err(InvalidSequence { tokens })
    } else {
        Ok(tokens)
    }
}
