//! Two-pass assembly: address assignment (pass 1) then label resolution
//! and encoding (pass 2).

pub mod pass1;
pub mod pass2;
pub mod symbol_table;

#[cfg(test)]
mod tests;

use crate::error::AssemblerError;
use crate::numeric::Address;
use crate::parser::ast::Line;

pub use symbol_table::SymbolTable;

/// Runs pass 1 only, returning each retained statement paired with the
/// address pass 1 assigned it, plus the symbol table pass 1 built —
/// the pre-encoding snapshot `pre_assemble` in `lib.rs` exposes. Pass 2
/// (label resolution and encoding) never runs.
pub fn pre_assemble_lines(
    lines: &[Line],
) -> Result<(Vec<(Address, Line)>, SymbolTable), Vec<AssemblerError>> {
    let pass1::Pass1Output { symbols, statements, .. } =
        pass1::pass1(lines).map_err(|e| vec![e])?;
    Ok((statements, symbols))
}

/// Runs pass 1 and pass 2 over already-parsed `lines`, returning the
/// origin address and the object body (everything after the origin
/// word).
pub fn assemble_lines(lines: &[Line]) -> Result<(Address, Vec<u16>), Vec<AssemblerError>> {
    let pass1::Pass1Output { symbols, statements, origin } =
        pass1::pass1(lines).map_err(|e| vec![e])?;
    let body = pass2::pass2(&statements, &symbols)?;
    Ok((origin, body))
}
