//! Maps labels to addresses, built during pass 1 and read-only thereafter.

use crate::error::{AssemblerError, Span};
use crate::numeric::Address;
use crate::parser::ast::Label;

/// Insertion-ordered label table. A `Vec` of entries rather than a
/// `HashMap` — LC-3 programs carry at most a few dozen labels, so a
/// linear scan against `Label`'s case-insensitive `Eq` is plenty fast and
/// keeps iteration order matching source order for diagnostics.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    entries: Vec<(Label, Address, Span)>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `label` to `address`. Fails with `DuplicateLabel` (carrying
    /// the first definition's span) if `label` is already bound;
    /// comparison is case-insensitive via `Label`'s `Eq` impl.
    pub fn insert(
        &mut self,
        label: Label,
        address: Address,
        span: Span,
    ) -> Result<(), AssemblerError> {
        if let Some((_, _, first_defined)) = self.entries.iter().find(|(l, _, _)| *l == label) {
            return Err(AssemblerError::DuplicateLabel {
                label: label.text().to_string(),
                span,
                first_defined: *first_defined,
            });
        }
        self.entries.push((label, address, span));
        Ok(())
    }

    /// Resolves `label` to its bound address. `reference_span` is the span
    /// of the *use* (not the definition), so an `UndefinedLabel` error
    /// points at the instruction that referenced it.
    pub fn get(&self, label: &Label, reference_span: Span) -> Result<Address, AssemblerError> {
        self.entries
            .iter()
            .find(|(l, _, _)| l == label)
            .map(|(_, addr, _)| *addr)
            .ok_or_else(|| AssemblerError::UndefinedLabel {
                label: label.text().to_string(),
                span: reference_span,
            })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(text: &str) -> Label {
        Label::new(text, Span::point(0)).unwrap()
    }

    #[test]
    fn insert_then_get_round_trips() {
        let mut table = SymbolTable::new();
        let addr = Address::user(0x3000).unwrap();
        table.insert(label("loop"), addr, Span::point(0)).unwrap();
        assert_eq!(table.get(&label("LOOP"), Span::point(10)).unwrap(), addr);
    }

    #[test]
    fn duplicate_insert_is_case_insensitive() {
        let mut table = SymbolTable::new();
        table.insert(label("foo"), Address::user(0x3000).unwrap(), Span::point(0)).unwrap();
        let err =
            table.insert(label("FOO"), Address::user(0x3001).unwrap(), Span::point(5)).unwrap_err();
        assert!(matches!(err, AssemblerError::DuplicateLabel { .. }));
    }

    #[test]
    fn undefined_label_lookup_fails() {
        let table = SymbolTable::new();
        let err = table.get(&label("missing"), Span::point(3)).unwrap_err();
        assert!(matches!(err, AssemblerError::UndefinedLabel { .. }));
    }
}
