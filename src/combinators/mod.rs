//! A generic parser-combinator engine.
//!
//! `Combinator<C, O>` represents a function from a cursor `C` to either a
//! new cursor advanced past consumed input plus a produced value of type
//! `O`, or a [`CombinatorError`] anchored at a source position. It is the
//! vocabulary the lexer (§4.2) and parser (§4.3) grammars are written in;
//! neither of those grammars touches a `Regex` or a cursor index directly —
//! they only ever compose `Combinator` values.
//!
//! This is PEG-style, ordered-choice parsing: `a.otherwise(b)` always tries
//! `a` first and only falls back to `b` on failure, with no longest-match
//! resolution and no packrat memoization. Ambiguity in a grammar built on
//! this engine is resolved purely by the order combinators are tried.

pub mod cursor;
pub mod recursive;

#[cfg(test)]
mod tests;

use std::rc::Rc;

use regex::Regex;

use cursor::{Cursor, SliceCursor};

/// An error produced by a combinator, anchored at the byte offset where the
/// failing match was attempted. This is a plain value, never thrown: every
/// combinator method propagates it through a `Result`, per spec.md §4.1's
/// error semantics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombinatorError {
    pub message: String,
    pub position: usize,
}

impl CombinatorError {
    pub fn new(message: impl Into<String>, position: usize) -> Self {
        Self { message: message.into(), position }
    }
}

pub type ParseOutcome<C, O> = Result<(C, O), CombinatorError>;

/// A captured span wrapping some parsed value, produced by [`Combinator::as_token`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned<O> {
    pub value: O,
    pub span: crate::error::Span,
}

/// A value representing a parser: a named, cheaply-cloneable function from
/// a cursor to a parse outcome.
///
/// Combinators are pure and hold no mutable state (aside from the
/// interior-mutability cell inside [`recursive::Recursive`], which is
/// written to exactly once before the grammar is used) — the same grammar
/// value can be shared and reused across any number of parses, as spec.md
/// §5 requires.
pub struct Combinator<C, O> {
    name: Rc<str>,
    f: Rc<dyn Fn(C) -> ParseOutcome<C, O>>,
}

impl<C, O> Clone for Combinator<C, O> {
    fn clone(&self) -> Self {
        Self { name: self.name.clone(), f: self.f.clone() }
    }
}

impl<C: Cursor + 'static, O: 'static> Combinator<C, O> {
    pub fn new(name: impl Into<Rc<str>>, f: impl Fn(C) -> ParseOutcome<C, O> + 'static) -> Self {
        Self { name: name.into(), f: Rc::new(f) }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn run(&self, input: C) -> ParseOutcome<C, O> {
        (self.f)(input)
    }

    /// `a.cons(b)` — run `a` then `b`, yielding a 2-tuple of their values.
    pub fn cons<O2: 'static>(self, other: Combinator<C, O2>) -> Combinator<C, (O, O2)> {
        let name: Rc<str> = Rc::from(format!("({}, {})", self.name, other.name));
        Combinator::new(name, move |input: C| {
            let (rest, a) = self.run(input)?;
            let (rest, b) = other.run(rest)?;
            Ok((rest, (a, b)))
        })
    }

    /// `a.append(b)` — run `a` (which must yield a tuple) then `b`, yielding
    /// a tuple extended on the right by one element.
    pub fn append<O2: 'static>(self, other: Combinator<C, O2>) -> Combinator<C, O::Output>
    where
        O: Append<O2>,
    {
        let name: Rc<str> = Rc::from(format!("{}.append({})", self.name, other.name));
        Combinator::new(name, move |input: C| {
            let (rest, a) = self.run(input)?;
            let (rest, b) = other.run(rest)?;
            Ok((rest, a.append(b)))
        })
    }

    /// `a.consume(b)` — parse `b` after `a` and discard `b`'s value.
    pub fn consume<O2: 'static>(self, other: Combinator<C, O2>) -> Combinator<C, O> {
        let name: Rc<str> = Rc::from(format!("{}.consume({})", self.name, other.name));
        Combinator::new(name, move |input: C| {
            let (rest, a) = self.run(input)?;
            let (rest, _) = other.run(rest)?;
            Ok((rest, a))
        })
    }

    /// `a.then(b)` — run `a` then `b`, combining their values via
    /// [`Combine`]. Exposed as `a + b`.
    pub fn then(self, other: Combinator<C, O>) -> Combinator<C, O>
    where
        O: Combine,
    {
        let name: Rc<str> = Rc::from(format!("({} + {})", self.name, other.name));
        Combinator::new(name, move |input: C| {
            let (rest, a) = self.run(input)?;
            let (rest, b) = other.run(rest)?;
            Ok((rest, a.combine(b)))
        })
    }

    /// `a.otherwise(b)` — try `a`; on any failure, re-run `b` from the
    /// *original* cursor. The last-tried branch's error wins: if `a`
    /// succeeds its error (if any) is discarded, and if both fail the
    /// result is exactly `b`'s error, never a merge of the two. Exposed as
    /// `a | b`.
    pub fn otherwise(self, other: Combinator<C, O>) -> Combinator<C, O> {
        let name: Rc<str> = Rc::from(format!("({} | {})", self.name, other.name));
        Combinator::new(name, move |input: C| match self.run(input.clone()) {
            Ok(ok) => Ok(ok),
            Err(_) => other.run(input),
        })
    }

    /// Transform the output with an infallible function.
    pub fn map<R: 'static>(self, f: impl Fn(O) -> R + 'static) -> Combinator<C, R> {
        self.try_map(move |value| Ok(f(value)))
    }

    /// Transform the output with a function that can fail. On failure the
    /// resulting error is anchored at the cursor *after* `self`, per
    /// spec.md §4.1.
    pub fn try_map<R: 'static>(
        self,
        f: impl Fn(O) -> Result<R, String> + 'static,
    ) -> Combinator<C, R> {
        let name: Rc<str> = Rc::from(format!("mapped({})", self.name));
        Combinator::new(name, move |input: C| {
            let (rest, value) = self.run(input)?;
            match f(value) {
                Ok(mapped) => Ok((rest, mapped)),
                Err(message) => Err(CombinatorError::new(message, rest.error_offset())),
            }
        })
    }

    /// `a.preskip(sk)` — repeatedly apply `sk` (discarding its output)
    /// until it fails, then run `a`.
    pub fn preskip<S: 'static>(self, skip: Combinator<C, S>) -> Combinator<C, O> {
        let name: Rc<str> = Rc::from(format!("{}.preskip({})", self.name, skip.name));
        Combinator::new(name, move |mut input: C| {
            while let Ok((rest, _)) = skip.run(input.clone()) {
                input = rest;
            }
            self.run(input)
        })
    }

    /// `a.postskip(sk)` — run `a`, then greedily apply `sk`, discarding its
    /// output. Note that `as_token` called *after* `postskip` includes the
    /// skipped separators in the captured span; called *before*
    /// `postskip`, it does not — see [`Combinator::as_token`].
    pub fn postskip<S: 'static>(self, skip: Combinator<C, S>) -> Combinator<C, O> {
        let name: Rc<str> = Rc::from(format!("{}.postskip({})", self.name, skip.name));
        Combinator::new(name, move |input: C| {
            let (mut rest, value) = self.run(input)?;
            while let Ok((next, _)) = skip.run(rest.clone()) {
                rest = next;
            }
            Ok((rest, value))
        })
    }

    /// Wrap the output in a [`Spanned`] covering exactly the input consumed
    /// by `self`. The span's start is the cursor's `error_offset` *before*
    /// `self` runs; its end is the cursor's `consumed_end_offset` after —
    /// so attaching `.postskip()` before `.as_token()` folds the skipped
    /// trailing separators into the span, while attaching it after does
    /// not, since by then the span has already been captured.
    pub fn as_token(self) -> Combinator<C, Spanned<O>> {
        let name: Rc<str> = Rc::from(format!("as_token({})", self.name));
        Combinator::new(name, move |input: C| {
            let start = input.error_offset();
            let (rest, value) = self.run(input)?;
            let end = rest.consumed_end_offset();
            Ok((rest, Spanned { value, span: crate::error::Span::new(start, end) }))
        })
    }

    /// Run to completion, requiring the cursor to reach end-of-input;
    /// trailing input is an error.
    pub fn parse(&self, input: C) -> Result<O, CombinatorError> {
        let (rest, value) = self.run(input)?;
        if !rest.is_empty() {
            return Err(CombinatorError::new("expected end of file", rest.error_offset()));
        }
        Ok(value)
    }

    /// Repeatedly run to end-of-input, collecting outputs. Unconsumed
    /// residue — i.e. a failure with input still remaining — is an error;
    /// the loop stops cleanly only once the cursor is fully consumed.
    pub fn parse_many(&self, input: C) -> Result<Vec<O>, CombinatorError> {
        let mut out = Vec::new();
        let mut cur = input;
        loop {
            match self.run(cur.clone()) {
                Ok((rest, value)) => {
                    out.push(value);
                    cur = rest;
                }
                Err(err) => {
                    if cur.is_empty() {
                        return Ok(out);
                    }
                    return Err(err);
                }
            }
        }
    }
}

impl<C: Cursor + 'static, O: Combine + 'static> std::ops::Add for Combinator<C, O> {
    type Output = Combinator<C, O>;
    fn add(self, rhs: Combinator<C, O>) -> Combinator<C, O> {
        self.then(rhs)
    }
}

impl<C: Cursor + 'static, O: 'static> std::ops::BitOr for Combinator<C, O> {
    type Output = Combinator<C, O>;
    fn bitor(self, rhs: Combinator<C, O>) -> Combinator<C, O> {
        self.otherwise(rhs)
    }
}

/// The "combinable" bound for [`Combinator::then`] — Rust has no built-in
/// notion of this (std's `Add` is not reflexive for `String`), so the
/// engine defines its own narrow trait rather than overloading `Add`.
pub trait Combine: Sized {
    fn combine(self, other: Self) -> Self;
}

impl Combine for String {
    fn combine(mut self, other: Self) -> Self {
        self.push_str(&other);
        self
    }
}

impl Combine for i32 {
    fn combine(self, other: Self) -> Self {
        self + other
    }
}

impl Combine for f64 {
    fn combine(self, other: Self) -> Self {
        self + other
    }
}

impl<T> Combine for Vec<T> {
    fn combine(mut self, mut other: Self) -> Self {
        self.append(&mut other);
        self
    }
}

/// Extends a tuple by one element on the right, used by
/// [`Combinator::append`]. Implemented up to the arities the grammar in
/// this crate actually needs (three-operand instructions).
pub trait Append<T> {
    type Output;
    fn append(self, value: T) -> Self::Output;
}

impl<A, T> Append<T> for (A,) {
    type Output = (A, T);
    fn append(self, value: T) -> Self::Output {
        (self.0, value)
    }
}

impl<A, B, T> Append<T> for (A, B) {
    type Output = (A, B, T);
    fn append(self, value: T) -> Self::Output {
        (self.0, self.1, value)
    }
}

impl<A, B, C, T> Append<T> for (A, B, C) {
    type Output = (A, B, C, T);
    fn append(self, value: T) -> Self::Output {
        (self.0, self.1, self.2, value)
    }
}

// ---------------------------------------------------------------------
// Text primitives
// ---------------------------------------------------------------------

use cursor::StrCursor;

/// Matches the literal `s` at the cursor, case-sensitively; fails
/// otherwise. An empty `s` is a programmer error — it would never consume
/// input and could loop a `preskip`/`parse_many` forever.
pub fn string(s: &str) -> Combinator<StrCursor, String> {
    assert!(!s.is_empty(), "string(): pattern must not be empty");
    let needle = s.to_string();
    let name: Rc<str> = Rc::from(format!("'{s}'"));
    Combinator::new(name, move |input: StrCursor| {
        let rest = input.rest();
        if rest.len() >= needle.len() && rest.as_bytes()[..needle.len()] == *needle.as_bytes() {
            Ok((input.advance(needle.len()), needle.clone()))
        } else {
            Err(CombinatorError::new(format!("expected '{needle}'"), input.error_offset()))
        }
    })
}

fn run_regex(re: &Regex, input: &StrCursor) -> ParseOutcome<StrCursor, Vec<String>> {
    let rest = input.rest();
    match re.captures(rest) {
        Some(caps) => {
            let whole = caps.get(0).expect("capture group 0 always matches");
            let mut groups: Vec<String> = caps
                .iter()
                .skip(1)
                .map(|g| g.map(|m| m.as_str().to_string()).unwrap_or_default())
                .collect();
            if groups.is_empty() {
                groups.push(whole.as_str().to_string());
            }
            Ok((input.advance(whole.end()), groups))
        }
        None => Err(CombinatorError::new(
            format!("expected match for '{}'", re.as_str()),
            input.error_offset(),
        )),
    }
}

/// Compiles `pattern` once (at combinator-construction time, not per
/// match), anchors it to the start of the remaining input, and on each
/// call attempts a match there. Returns the captured groups; if the
/// pattern has no capture groups, returns the whole match as a single
/// group, matching `regex_groups`' Python ancestor.
pub fn regex_groups(pattern: &str) -> Combinator<StrCursor, Vec<String>> {
    assert!(!pattern.is_empty(), "regex(): pattern must not be empty");
    let anchored = format!("^(?:{pattern})");
    let re = Regex::new(&anchored).unwrap_or_else(|e| panic!("invalid regex '{pattern}': {e}"));
    let name: Rc<str> = Rc::from(format!("r'{pattern}'"));
    Combinator::new(name, move |input: StrCursor| run_regex(&re, &input))
}

/// Like [`regex_groups`], but takes an already-compiled pattern shared via
/// a `'static` reference (typically an `once_cell::sync::Lazy<Regex>`).
/// Used by grammars (the lexer's token table) that are rebuilt on every
/// call but want the regex itself compiled exactly once for the life of
/// the process. Unlike `regex_groups`, the caller is responsible for
/// anchoring the pattern to the start of input (a leading `^`) — this
/// function does not add one.
pub fn regex_groups_compiled(name: &str, re: &'static Regex) -> Combinator<StrCursor, Vec<String>> {
    let name: Rc<str> = Rc::from(name.to_string());
    Combinator::new(name, move |input: StrCursor| run_regex(re, &input))
}

/// `regex_groups(pattern).map(|groups| groups[0].clone())` — the matched
/// text of group 0 (the whole match, if `pattern` has no groups).
pub fn regex(pattern: &str) -> Combinator<StrCursor, String> {
    regex_groups(pattern).map(|groups| groups[0].clone())
}

/// Like [`regex`], backed by an already-compiled pattern; see
/// [`regex_groups_compiled`].
pub fn regex_compiled(name: &str, re: &'static Regex) -> Combinator<StrCursor, String> {
    regex_groups_compiled(name, re).map(|groups| groups[0].clone())
}

// ---------------------------------------------------------------------
// Generic combinators
// ---------------------------------------------------------------------

/// Succeeds with `()` only at end of input; consumes nothing. Lets grammar
/// authors spell out "and nothing else follows" inline rather than relying
/// solely on `parse`'s implicit trailing-input check.
pub fn eof<C: Cursor + 'static>() -> Combinator<C, ()> {
    Combinator::new("eof", |input: C| {
        if input.is_empty() {
            Ok((input, ()))
        } else {
            Err(CombinatorError::new("expected end of file", input.error_offset()))
        }
    })
}

/// Zero-or-one: tries `c`, falling back to `None` at the original cursor on
/// failure. Never itself fails.
pub fn optional<C: Cursor + 'static, O: 'static>(c: Combinator<C, O>) -> Combinator<C, Option<O>> {
    let name: Rc<str> = Rc::from(format!("optional({})", c.name()));
    Combinator::new(name, move |input: C| match c.run(input.clone()) {
        Ok((rest, value)) => Ok((rest, Some(value))),
        Err(_) => Ok((input, None)),
    })
}

/// Zero-or-more: repeatedly runs `c`, collecting outputs, stopping (without
/// failing) at the first position where `c` no longer matches. The same
/// repeat-to-failure loop [`Combinator::parse_many`] uses at the top level,
/// exposed here as an ordinary composable combinator so grammars can
/// express repetition (e.g. `factor ( ('*' | '/') atom )*`) inline.
pub fn many0<C: Cursor + 'static, O: 'static>(c: Combinator<C, O>) -> Combinator<C, Vec<O>> {
    let name: Rc<str> = Rc::from(format!("many0({})", c.name()));
    Combinator::new(name, move |input: C| {
        let mut out = Vec::new();
        let mut cur = input;
        loop {
            match c.run(cur.clone()) {
                Ok((rest, value)) => {
                    out.push(value);
                    cur = rest;
                }
                Err(_) => return Ok((cur, out)),
            }
        }
    })
}

/// Matches and returns any single item satisfying `predicate`, over a
/// sequence of spanned items (used by the parser, over lexer tokens).
pub fn satisfy<T: Clone + 'static>(
    description: &str,
    predicate: impl Fn(&T) -> bool + 'static,
) -> Combinator<SliceCursor<T>, T>
where
    T: cursor::HasSpan,
{
    let name: Rc<str> = Rc::from(description.to_string());
    let description = description.to_string();
    Combinator::new(name, move |input: SliceCursor<T>| match input.first() {
        Some(item) if predicate(item) => {
            let value = item.clone();
            Ok((input.advance(1), value))
        }
        _ => Err(CombinatorError::new(format!("expected {description}"), input.error_offset())),
    })
}
