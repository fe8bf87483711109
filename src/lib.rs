//! # lc3asm
//!
//! A two-pass assembler for the LC-3 (Little Computer 3) educational
//! architecture, built on a small parser-combinator engine.
//!
//! ## Pipeline
//!
//! 1. **Lexer** (`lexer`) — source text to spanned tokens, via the
//!    combinator engine.
//! 2. **Parser** (`parser`) — tokens to statements (`Line`s).
//! 3. **Assembler** (`assembler`, two-pass) — address assignment, symbol
//!    resolution, and bit-exact encoding.
//!
//! ## Example
//!
//! ```rust
//! let source = ".ORIG x3000\nHALT\n.END\n";
//! let bytes = lc3asm::assemble(source).expect("well-formed program assembles");
//! assert_eq!(bytes, vec![0x30, 0x00, 0xF0, 0x25]);
//! ```

pub mod assembler;
pub mod combinators;
pub mod error;
pub mod lexer;
pub mod numeric;
pub mod parser;

use error::AssemblerError;
use lexer::Token;
use numeric::Address;
use parser::ast::Line;

/// Tokenizes `source`. A lexical error reports every invalid run found,
/// not just the first (spec's batch posture for the lexer).
pub fn lex(source: &str) -> Result<Vec<Token>, Vec<AssemblerError>> {
    lexer::lex(source).map_err(|invalid| {
        invalid
            .invalid_tokens()
            .map(|t| AssemblerError::InvalidLexeme {
                text: match &t.kind {
                    lexer::LexemeKind::Invalid(text) => text.clone(),
                    _ => unreachable!("invalid_tokens only yields Invalid-kind tokens"),
                },
                span: t.span,
            })
            .collect()
    })
}

/// Lexes and parses `source` into statements.
pub fn parse(source: &str) -> Result<Vec<Line>, Vec<AssemblerError>> {
    let tokens = lex(source)?;
    parser::parse(&tokens).map_err(|e| vec![e])
}

/// Assembles `source` into its object byte stream: the big-endian origin
/// word followed by the encoded program body, in source order.
pub fn assemble(source: &str) -> Result<Vec<u8>, Vec<AssemblerError>> {
    let lines = parse(source)?;
    let (origin, body) = assembler::assemble_lines(&lines)?;
    let mut bytes = Vec::with_capacity((body.len() + 1) * 2);
    bytes.extend_from_slice(&origin.value().to_be_bytes());
    for word in body {
        bytes.extend_from_slice(&word.to_be_bytes());
    }
    Ok(bytes)
}

/// Runs pass 1 only and stops there: the address plan (each retained
/// statement paired with its assigned address) plus the symbol table
/// pass 1 built, before label resolution or encoding ever runs. Useful
/// for tooling that wants to inspect or validate addresses/symbols
/// without committing to a full assembly (e.g. a future simulator or a
/// `--symbols` CLI flag).
pub fn pre_assemble(
    source: &str,
) -> Result<(Vec<(Address, Line)>, assembler::SymbolTable), Vec<AssemblerError>> {
    let lines = parse(source)?;
    assembler::pre_assemble_lines(&lines)
}
