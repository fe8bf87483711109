//! Turns a lexed token stream into [`Line`]s.
//!
//! Statement and operand parsing is hand-written recursive-descent over
//! `&[Token]` slices rather than routed through the [`crate::combinators`]
//! engine: every error here needs to carry one of the specific
//! [`AssemblerError`] variants, and the engine's `try_map` only carries a
//! bare `String` message, which would throw that identity away. See
//! `DESIGN.md` for the full rationale.

pub mod ast;

use crate::error::{AssemblerError, Span};
use crate::lexer::{LexemeKind, Token};
use crate::numeric::{word16, Imm5, Imm6, Imm8};

use ast::Label;
pub use ast::{BrFlags, Directive, FillValue, Instruction, Line, LineBody, Register};

/// Parses a complete token stream into statements. Tokens are split into
/// lines at `Newline` boundaries; `Comment` tokens are dropped first, since
/// they carry no grammatical meaning (spec.md §3).
///
/// A line with no label and no body (a blank line) contributes nothing to
/// the result. A label attached to a blank line is still emitted as an
/// `Empty`-bodied [`Line`] so address assignment can bind it to whatever
/// statement follows (spec.md §3: "zero or more labels").
pub fn parse(tokens: &[Token]) -> Result<Vec<Line>, AssemblerError> {
    let mut lines = Vec::new();
    let mut ended = false;
    for raw_line in split_lines(tokens) {
        if let Some(line) = parse_line(&raw_line)? {
            if ended {
                return Err(AssemblerError::ExpectedEndOfFile { span: line.span });
            }
            ended = matches!(line.body, LineBody::Directive(Directive::End));
            lines.push(line);
        }
    }
    Ok(lines)
}

fn split_lines(tokens: &[Token]) -> Vec<Vec<Token>> {
    let mut result = Vec::new();
    let mut current = Vec::new();
    for token in tokens {
        match &token.kind {
            LexemeKind::Newline { .. } => result.push(std::mem::take(&mut current)),
            LexemeKind::Comment(_) => {}
            _ => current.push(token.clone()),
        }
    }
    if !current.is_empty() {
        result.push(current);
    }
    result
}

fn parse_line(tokens: &[Token]) -> Result<Option<Line>, AssemblerError> {
    if tokens.is_empty() {
        return Ok(None);
    }
    let line_span = tokens[0].span.join(tokens[tokens.len() - 1].span);

    let (label, body_tokens): (Option<Label>, &[Token]) = match &tokens[0].kind {
        LexemeKind::Word(w) if !is_mnemonic_start(w) => {
            (Some(Label::new(w, tokens[0].span)?), &tokens[1..])
        }
        _ => (None, tokens),
    };

    if body_tokens.is_empty() {
        return Ok(Some(Line { label, body: LineBody::Empty, span: line_span }));
    }

    let body = parse_statement_body(body_tokens, line_span)?;
    Ok(Some(Line { label, body, span: line_span }))
}

/// A bare `Word` token starts a statement (rather than a label definition)
/// if it names a known mnemonic, or carries the `BR` prefix — spec.md's
/// Open Question on BR flags, resolved to the stricter reading: any
/// `BR`-prefixed word is a committed mnemonic attempt, never reinterpreted
/// as a label, even when its suffix turns out not to be valid flag letters.
fn is_mnemonic_start(word: &str) -> bool {
    br_suffix(word).is_some() || ast::is_reserved_word(word)
}

/// `Some(suffix)` iff `word` starts with `br`/`BR` (any case), where
/// `suffix` is everything after that prefix — not yet validated as flag
/// letters. `None` means `word` doesn't carry the prefix at all, so it's
/// free to be a label.
fn br_suffix(word: &str) -> Option<&str> {
    let bytes = word.as_bytes();
    if bytes.len() < 2 || !bytes[0].eq_ignore_ascii_case(&b'b') || !bytes[1].eq_ignore_ascii_case(&b'r') {
        return None;
    }
    Some(&word[2..])
}

/// Validates that a BR-shaped suffix's flag letters appear in `n`, `z`,
/// `p` order with no duplicates (spec.md's Open Question, resolved to a
/// strict reading rather than "last one wins" or "order doesn't matter").
fn br_flags_from_suffix(suffix: &str) -> Result<BrFlags, String> {
    let mut flags = BrFlags::default();
    let mut stage = 0u8;
    for c in suffix.chars() {
        match c.to_ascii_lowercase() {
            'n' if stage == 0 => {
                flags.n = true;
                stage = 1;
            }
            'z' if stage <= 1 => {
                flags.z = true;
                stage = 2;
            }
            'p' if stage <= 2 => {
                flags.p = true;
                stage = 3;
            }
            other => {
                return Err(format!(
                    "invalid BR flags 'BR{suffix}': '{other}' is out of order or duplicated \
                     (flags must appear in n, z, p order with no repeats)"
                ))
            }
        }
    }
    Ok(flags)
}

fn parse_statement_body(tokens: &[Token], stmt_span: Span) -> Result<LineBody, AssemblerError> {
    let head = &tokens[0];
    match &head.kind {
        LexemeKind::DotWord(dir) => {
            parse_directive(dir, &tokens[1..], stmt_span).map(LineBody::Directive)
        }
        LexemeKind::Word(word) => {
            parse_instruction(word, &tokens[1..], stmt_span, head.span).map(LineBody::Instruction)
        }
        _ => Err(AssemblerError::UnexpectedToken {
            message: "expected an instruction or directive".to_string(),
            span: head.span,
        }),
    }
}

fn parse_instruction(
    word: &str,
    ops: &[Token],
    stmt_span: Span,
    mnemonic_span: Span,
) -> Result<Instruction, AssemblerError> {
    if let Some(suffix) = br_suffix(word) {
        return parse_br(suffix, ops, stmt_span, mnemonic_span);
    }
    match word.to_ascii_lowercase().as_str() {
        "add" => parse_add_and(ops, stmt_span, true),
        "and" => parse_add_and(ops, stmt_span, false),
        "not" => parse_not(ops, stmt_span),
        "jmp" => parse_single_reg(ops, stmt_span).map(|base| Instruction::Jmp { base }),
        "jsrr" => parse_single_reg(ops, stmt_span).map(|base| Instruction::Jsrr { base }),
        "ret" => parse_no_operands(ops, Instruction::Ret),
        "rti" => parse_no_operands(ops, Instruction::Rti),
        "ldr" => parse_reg_reg_imm6(ops, stmt_span, |dr, base, offset| Instruction::Ldr {
            dr,
            base,
            offset,
        }),
        "str" => parse_reg_reg_imm6(ops, stmt_span, |sr, base, offset| Instruction::Str {
            sr,
            base,
            offset,
        }),
        "trap" => parse_trap(ops, stmt_span),
        "getc" => parse_trap_alias(ops, 0x20),
        "out" => parse_trap_alias(ops, 0x21),
        "puts" => parse_trap_alias(ops, 0x22),
        "in" => parse_trap_alias(ops, 0x23),
        "putsp" => parse_trap_alias(ops, 0x24),
        "halt" => parse_trap_alias(ops, 0x25),
        "jsr" => parse_single_label(ops, stmt_span).map(|label| Instruction::Jsr { label }),
        "ld" => parse_reg_label(ops, stmt_span, |dr, label| Instruction::Ld { dr, label }),
        "ldi" => parse_reg_label(ops, stmt_span, |dr, label| Instruction::Ldi { dr, label }),
        "lea" => parse_reg_label(ops, stmt_span, |dr, label| Instruction::Lea { dr, label }),
        "st" => parse_reg_label(ops, stmt_span, |sr, label| Instruction::St { sr, label }),
        "sti" => parse_reg_label(ops, stmt_span, |sr, label| Instruction::Sti { sr, label }),
        other => Err(AssemblerError::UnexpectedToken {
            message: format!("unknown mnemonic '{other}'"),
            span: mnemonic_span,
        }),
    }
}

fn parse_directive(dir: &str, ops: &[Token], stmt_span: Span) -> Result<Directive, AssemblerError> {
    match dir.to_ascii_lowercase().as_str() {
        "orig" => parse_orig(ops, stmt_span),
        "end" => parse_end(ops),
        "fill" => parse_fill(ops, stmt_span),
        "blkw" => parse_blkw(ops, stmt_span),
        "stringz" => parse_stringz(ops, stmt_span),
        other => Err(AssemblerError::UnexpectedToken {
            message: format!("unknown directive '.{other}'"),
            span: stmt_span,
        }),
    }
}

// --- operand-slice helpers ---------------------------------------------

fn require<'a>(
    tokens: &'a [Token],
    idx: usize,
    stmt_span: Span,
    message: &str,
) -> Result<&'a Token, AssemblerError> {
    tokens.get(idx).ok_or_else(|| AssemblerError::UnexpectedToken {
        message: message.to_string(),
        span: Span::point(stmt_span.end),
    })
}

fn token_to_register(token: &Token) -> Option<Register> {
    match &token.kind {
        LexemeKind::Word(w) => {
            let bytes = w.as_bytes();
            if bytes.len() == 2 && matches!(bytes[0], b'r' | b'R') && bytes[1].is_ascii_digit() {
                Register::new(bytes[1] - b'0')
            } else {
                None
            }
        }
        _ => None,
    }
}

fn expect_register(
    tokens: &[Token],
    idx: usize,
    stmt_span: Span,
    message: &str,
) -> Result<Register, AssemblerError> {
    let token = require(tokens, idx, stmt_span, message)?;
    token_to_register(token)
        .ok_or_else(|| AssemblerError::InvalidRegister { message: message.to_string(), span: token.span })
}

fn expect_label(
    tokens: &[Token],
    idx: usize,
    stmt_span: Span,
    message: &str,
) -> Result<Label, AssemblerError> {
    let token = require(tokens, idx, stmt_span, message)?;
    match &token.kind {
        LexemeKind::Word(w) => Label::new(w, token.span),
        _ => Err(AssemblerError::UnexpectedToken { message: message.to_string(), span: token.span }),
    }
}

fn expect_integer(
    tokens: &[Token],
    idx: usize,
    stmt_span: Span,
    message: &str,
) -> Result<i32, AssemblerError> {
    let token = require(tokens, idx, stmt_span, message)?;
    match &token.kind {
        LexemeKind::Integer { value, .. } => Ok(*value),
        _ => Err(AssemblerError::UnexpectedToken { message: message.to_string(), span: token.span }),
    }
}

fn expect_string(
    tokens: &[Token],
    idx: usize,
    stmt_span: Span,
    message: &str,
) -> Result<String, AssemblerError> {
    let token = require(tokens, idx, stmt_span, message)?;
    match &token.kind {
        LexemeKind::Str(s) => Ok(s.clone()),
        _ => Err(AssemblerError::UnexpectedToken { message: message.to_string(), span: token.span }),
    }
}

/// Once a statement's operands are fully consumed, the only thing a line
/// can still hold is its end — anything left over means the statement
/// should have ended here.
fn ensure_no_extra(tokens: &[Token], expected_len: usize) -> Result<(), AssemblerError> {
    match tokens.get(expected_len) {
        Some(token) => Err(AssemblerError::ExpectedNewline {
            message: "unexpected extra operand, expected end of line".to_string(),
            span: token.span,
        }),
        None => Ok(()),
    }
}

enum RegOrImm {
    Reg(Register),
    Imm(Imm5),
}

fn expect_reg_or_imm5(
    tokens: &[Token],
    idx: usize,
    stmt_span: Span,
    message: &str,
) -> Result<RegOrImm, AssemblerError> {
    let token = require(tokens, idx, stmt_span, message)?;
    match &token.kind {
        LexemeKind::Integer { value, .. } => Imm5::new(*value)
            .map(RegOrImm::Imm)
            .map_err(|e| AssemblerError::ImmediateOutOfRange { message: e, span: token.span }),
        LexemeKind::Word(_) => token_to_register(token)
            .map(RegOrImm::Reg)
            .ok_or_else(|| AssemblerError::InvalidRegister { message: message.to_string(), span: token.span }),
        _ => Err(AssemblerError::UnexpectedToken { message: message.to_string(), span: token.span }),
    }
}

// --- instruction operand grammars --------------------------------------

fn parse_add_and(ops: &[Token], stmt_span: Span, is_add: bool) -> Result<Instruction, AssemblerError> {
    let dr = expect_register(ops, 0, stmt_span, "expected a destination register")?;
    let sr1 = expect_register(ops, 1, stmt_span, "expected a first source register")?;
    let third = expect_reg_or_imm5(ops, 2, stmt_span, "expected a register or a 5-bit immediate")?;
    ensure_no_extra(ops, 3)?;
    Ok(match (is_add, third) {
        (true, RegOrImm::Reg(sr2)) => Instruction::Add { dr, sr1, sr2 },
        (true, RegOrImm::Imm(imm)) => Instruction::AddImm { dr, sr1, imm },
        (false, RegOrImm::Reg(sr2)) => Instruction::And { dr, sr1, sr2 },
        (false, RegOrImm::Imm(imm)) => Instruction::AndImm { dr, sr1, imm },
    })
}

fn parse_not(ops: &[Token], stmt_span: Span) -> Result<Instruction, AssemblerError> {
    let dr = expect_register(ops, 0, stmt_span, "expected a destination register")?;
    let sr = expect_register(ops, 1, stmt_span, "expected a source register")?;
    ensure_no_extra(ops, 2)?;
    Ok(Instruction::Not { dr, sr })
}

fn parse_single_reg(ops: &[Token], stmt_span: Span) -> Result<Register, AssemblerError> {
    let reg = expect_register(ops, 0, stmt_span, "expected a register")?;
    ensure_no_extra(ops, 1)?;
    Ok(reg)
}

fn parse_no_operands(ops: &[Token], instruction: Instruction) -> Result<Instruction, AssemblerError> {
    ensure_no_extra(ops, 0)?;
    Ok(instruction)
}

fn parse_reg_reg_imm6(
    ops: &[Token],
    stmt_span: Span,
    build: impl FnOnce(Register, Register, Imm6) -> Instruction,
) -> Result<Instruction, AssemblerError> {
    let r0 = expect_register(ops, 0, stmt_span, "expected a register")?;
    let base = expect_register(ops, 1, stmt_span, "expected a base register")?;
    let offset_token = require(ops, 2, stmt_span, "expected a 6-bit offset")?;
    let offset_value = expect_integer(ops, 2, stmt_span, "expected a 6-bit offset")?;
    let offset = Imm6::new(offset_value)
        .map_err(|e| AssemblerError::ImmediateOutOfRange { message: e, span: offset_token.span })?;
    ensure_no_extra(ops, 3)?;
    Ok(build(r0, base, offset))
}

fn parse_trap(ops: &[Token], stmt_span: Span) -> Result<Instruction, AssemblerError> {
    let token = require(ops, 0, stmt_span, "expected a trap vector")?;
    let value = expect_integer(ops, 0, stmt_span, "expected a trap vector")?;
    let vector = Imm8::new(value)
        .map_err(|e| AssemblerError::ImmediateOutOfRange { message: e, span: token.span })?;
    ensure_no_extra(ops, 1)?;
    Ok(Instruction::Trap { vector })
}

fn parse_trap_alias(ops: &[Token], vector: i32) -> Result<Instruction, AssemblerError> {
    ensure_no_extra(ops, 0)?;
    Ok(Instruction::Trap { vector: Imm8::new(vector).expect("trap alias vectors are always in range") })
}

fn parse_single_label(ops: &[Token], stmt_span: Span) -> Result<Label, AssemblerError> {
    let label = expect_label(ops, 0, stmt_span, "expected a label")?;
    ensure_no_extra(ops, 1)?;
    Ok(label)
}

fn parse_reg_label(
    ops: &[Token],
    stmt_span: Span,
    build: impl FnOnce(Register, Label) -> Instruction,
) -> Result<Instruction, AssemblerError> {
    let reg = expect_register(ops, 0, stmt_span, "expected a register")?;
    let label = expect_label(ops, 1, stmt_span, "expected a label")?;
    ensure_no_extra(ops, 2)?;
    Ok(build(reg, label))
}

fn parse_br(
    suffix: &str,
    ops: &[Token],
    stmt_span: Span,
    mnemonic_span: Span,
) -> Result<Instruction, AssemblerError> {
    let flags = if suffix.is_empty() {
        BrFlags::ALL
    } else {
        br_flags_from_suffix(suffix)
            .map_err(|message| AssemblerError::UnexpectedToken { message, span: mnemonic_span })?
    };
    let label = expect_label(ops, 0, stmt_span, "expected a branch target label")?;
    ensure_no_extra(ops, 1)?;
    Ok(Instruction::Br { flags, label })
}

// --- directive operand grammars -----------------------------------------

fn parse_orig(ops: &[Token], stmt_span: Span) -> Result<Directive, AssemblerError> {
    let token = require(ops, 0, stmt_span, "expected a start address")?;
    let value = expect_integer(ops, 0, stmt_span, "expected a start address")?;
    let word = word16(value)
        .map_err(|e| AssemblerError::AddressOutOfRange { message: e, span: token.span })?;
    ensure_no_extra(ops, 1)?;
    Ok(Directive::Orig(word))
}

fn parse_end(ops: &[Token]) -> Result<Directive, AssemblerError> {
    ensure_no_extra(ops, 0)?;
    Ok(Directive::End)
}

fn parse_fill(ops: &[Token], stmt_span: Span) -> Result<Directive, AssemblerError> {
    let token = require(ops, 0, stmt_span, "expected a literal or a label")?;
    let value = match &token.kind {
        LexemeKind::Integer { value, .. } => {
            let word = word16(*value)
                .map_err(|e| AssemblerError::ImmediateOutOfRange { message: e, span: token.span })?;
            FillValue::Literal(word)
        }
        LexemeKind::Word(w) => FillValue::Label(Label::new(w, token.span)?),
        _ => {
            return Err(AssemblerError::UnexpectedToken {
                message: "expected a literal or a label".to_string(),
                span: token.span,
            })
        }
    };
    ensure_no_extra(ops, 1)?;
    Ok(Directive::Fill(value))
}

fn parse_blkw(ops: &[Token], stmt_span: Span) -> Result<Directive, AssemblerError> {
    let token = require(ops, 0, stmt_span, "expected a word count")?;
    let value = expect_integer(ops, 0, stmt_span, "expected a word count")?;
    if value < 0 || value > 0xFFFF {
        return Err(AssemblerError::ImmediateOutOfRange {
            message: format!(".BLKW count {value} is out of range (must be 0-65535)"),
            span: token.span,
        });
    }
    ensure_no_extra(ops, 1)?;
    Ok(Directive::Blkw(value as u16))
}

fn parse_stringz(ops: &[Token], stmt_span: Span) -> Result<Directive, AssemblerError> {
    let s = expect_string(ops, 0, stmt_span, "expected a string literal")?;
    ensure_no_extra(ops, 1)?;
    Ok(Directive::Stringz(s))
}
