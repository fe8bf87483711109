//! Advancing views over combinator input.
//!
//! Both cursor types share backing storage (`Rc`) across every view derived
//! from them, so `advance` is O(1) and never copies the underlying buffer —
//! this is the "advancing view" spec.md §4.1 and §5 describe. Keeping the
//! backing storage behind `Rc` rather than a borrowed slice also sidesteps
//! threading a source lifetime through every combinator type, which would
//! otherwise infect `Combinator<C, O>` and everything built from it.

use std::rc::Rc;

use crate::error::Span;

/// Anything a `Combinator` can run over: a cheaply-advanceable view with
/// enough position information to anchor an error or a captured span.
pub trait Cursor: Clone {
    /// Byte offset to anchor an error that occurs with the cursor at this
    /// position (i.e. "the next thing we tried and failed to match starts
    /// here").
    fn error_offset(&self) -> usize;

    /// Byte offset marking the end of everything already consumed up to
    /// (not including) this cursor's position. For a cursor with nothing
    /// consumed yet this equals the very first offset of the input.
    fn consumed_end_offset(&self) -> usize;

    fn is_empty(&self) -> bool;
}

/// A view over a string, advancing by byte offset.
///
/// LC-3 source is ASCII-only at every position the grammar actually
/// inspects (comments, hex/hex digits, mnemonics, register names); where
/// the grammar does *not* assume ASCII — quoted strings and `.STRINGZ`
/// payloads — byte and character boundaries still coincide for arbitrary
/// UTF-8 since slicing only ever happens at regex match boundaries, which
/// `regex` guarantees land on char boundaries. No separate UTF-8 offset
/// side table (as the combinator engine this is ported from needed) is
/// required here; see SPEC_FULL.md's Design Notes.
#[derive(Clone)]
pub struct StrCursor {
    source: Rc<str>,
    pos: usize,
}

impl StrCursor {
    pub fn new(source: impl Into<Rc<str>>) -> Self {
        Self { source: source.into(), pos: 0 }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    /// The unconsumed remainder of the source, starting at `pos`.
    pub fn rest(&self) -> &str {
        &self.source[self.pos..]
    }

    pub fn advance(&self, n: usize) -> Self {
        Self { source: self.source.clone(), pos: self.pos + n }
    }

    pub fn len(&self) -> usize {
        self.source.len().saturating_sub(self.pos)
    }
}

impl Cursor for StrCursor {
    fn error_offset(&self) -> usize {
        self.pos
    }

    fn consumed_end_offset(&self) -> usize {
        self.pos
    }

    fn is_empty(&self) -> bool {
        self.pos >= self.source.len()
    }
}

/// An item that knows where it sits in the original source, so a
/// `SliceCursor` over it can still anchor spans in source bytes rather than
/// array indices.
pub trait HasSpan {
    fn span(&self) -> Span;
}

/// A view over a sequence of spanned items (used by the parser, over
/// lexer tokens), advancing by element count but anchoring errors and
/// captured spans in the *source* byte offsets the items themselves carry.
#[derive(Clone)]
pub struct SliceCursor<T> {
    items: Rc<[T]>,
    pos: usize,
}

impl<T> SliceCursor<T> {
    pub fn new(items: impl Into<Rc<[T]>>) -> Self {
        Self { items: items.into(), pos: 0 }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn advance(&self, n: usize) -> Self {
        Self { items: self.items.clone(), pos: self.pos + n }
    }

    pub fn len(&self) -> usize {
        self.items.len().saturating_sub(self.pos)
    }

    pub fn first(&self) -> Option<&T> {
        self.items.get(self.pos)
    }
}

impl<T: HasSpan> Cursor for SliceCursor<T> {
    fn error_offset(&self) -> usize {
        match self.first() {
            Some(item) => item.span().start,
            None => self.items.last().map(|t| t.span().end).unwrap_or(0),
        }
    }

    fn consumed_end_offset(&self) -> usize {
        if self.pos == 0 {
            self.items.first().map(|t| t.span().start).unwrap_or(0)
        } else {
            self.items[self.pos - 1].span().end
        }
    }

    fn is_empty(&self) -> bool {
        self.pos >= self.items.len()
    }
}
