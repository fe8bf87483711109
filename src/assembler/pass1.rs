//! Pass 1: address assignment and symbol table construction.
//!
//! Walks the parsed lines once, tracking a location counter seeded by
//! `.ORIG`. Every label definition — including ones on otherwise-empty
//! lines — binds to the address of whatever statement comes next.
//! Short-circuits on the first error, matching the non-batch components
//! in spec.md §7 (only the lexer and pass 2 accumulate).

use crate::error::{AssemblerError, Span};
use crate::numeric::Address;
use crate::parser::ast::{Directive, Line, LineBody};

use super::symbol_table::SymbolTable;

/// The address plan produced by pass 1: each retained statement paired
/// with the address it will be laid down at. `.ORIG` and `.END` lines
/// themselves are not retained — `.ORIG` seeds `origin`/the location
/// counter and contributes no encoded word; `.END` terminates the walk.
pub struct Pass1Output {
    pub symbols: SymbolTable,
    pub statements: Vec<(Address, Line)>,
    pub origin: Address,
}

pub fn pass1(lines: &[Line]) -> Result<Pass1Output, AssemblerError> {
    let mut symbols = SymbolTable::new();
    let mut statements = Vec::new();
    let mut pending: Vec<(crate::parser::ast::Label, Span)> = Vec::new();
    let mut current: Option<Address> = None;
    let mut origin: Option<Address> = None;

    for line in lines {
        if let Some(label) = &line.label {
            pending.push((label.clone(), line.span));
        }

        match &line.body {
            LineBody::Empty => continue,
            LineBody::Directive(Directive::Orig(addr)) => {
                if current.is_some() {
                    return Err(AssemblerError::UnexpectedToken {
                        message: "multiple .ORIG directives are not supported".to_string(),
                        span: line.span,
                    });
                }
                let address = Address::user(*addr as i32)
                    .map_err(|message| AssemblerError::AddressOutOfRange { message, span: line.span })?;
                origin = Some(address);
                current = Some(address);
                for (label, span) in pending.drain(..) {
                    symbols.insert(label, address, span)?;
                }
                continue;
            }
            _ => {}
        }

        let address = current
            .ok_or_else(|| AssemblerError::MissingOrig { span: line.span })?;

        for (label, span) in pending.drain(..) {
            symbols.insert(label, address, span)?;
        }

        if matches!(line.body, LineBody::Directive(Directive::End)) {
            break;
        }

        let size = statement_size(&line.body)
            .map_err(|message| AssemblerError::AddressOutOfRange { message, span: line.span })?;
        statements.push((address, line.clone()));
        current = Some(
            address
                .advance(size)
                .map_err(|message| AssemblerError::AddressOutOfRange { message, span: line.span })?,
        );
    }

    let origin = origin.ok_or(AssemblerError::MissingOrig { span: Span::point(0) })?;
    Ok(Pass1Output { symbols, statements, origin })
}

fn statement_size(body: &LineBody) -> Result<u16, String> {
    match body {
        LineBody::Empty => Ok(0),
        LineBody::Instruction(_) => Ok(1),
        LineBody::Directive(Directive::Fill(_)) => Ok(1),
        LineBody::Directive(Directive::Blkw(n)) => Ok(*n),
        LineBody::Directive(Directive::Stringz(s)) => {
            let len = s.chars().count() + 1;
            u16::try_from(len).map_err(|_| format!(".STRINGZ operand is too long ({len} words)"))
        }
        LineBody::Directive(Directive::Orig(_)) | LineBody::Directive(Directive::End) => {
            unreachable!(".ORIG/.END are handled before size calculation")
        }
    }
}
