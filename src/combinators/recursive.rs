//! Forward-declared, self-referential combinators.
//!
//! A grammar with recursive productions (e.g. the arithmetic-expression demo
//! in the test suite, or any grammar with nested structure) needs a
//! combinator that can refer to itself before its body exists. `Recursive`
//! holds a cell that is set exactly once via `define`; calling the
//! combinator before `define` is a programmer error and panics rather than
//! returning a parse failure, matching spec.md §4.1/§7's distinction
//! between programmer errors and input errors.

use std::cell::RefCell;
use std::rc::Rc;

use super::cursor::Cursor;
use super::{Combinator, ParseOutcome};

pub struct Recursive<C, O> {
    name: &'static str,
    slot: Rc<RefCell<Option<Combinator<C, O>>>>,
}

impl<C, O> Clone for Recursive<C, O> {
    fn clone(&self) -> Self {
        Self { name: self.name, slot: self.slot.clone() }
    }
}

impl<C: Cursor + 'static, O: 'static> Recursive<C, O> {
    /// Forward-declare a combinator named `name`. Call `.define(body)`
    /// exactly once before the grammar is used, and `.as_combinator()` to
    /// get a value that can be composed into the rest of the grammar
    /// (including, transitively, its own body).
    pub fn declare(name: &'static str) -> Self {
        Self { name, slot: Rc::new(RefCell::new(None)) }
    }

    pub fn define(&self, body: Combinator<C, O>) {
        let mut slot = self.slot.borrow_mut();
        assert!(
            slot.is_none(),
            "combinator '{}' was already defined; define() may only be called once",
            self.name
        );
        *slot = Some(body);
    }

    pub fn as_combinator(&self) -> Combinator<C, O> {
        let slot = self.slot.clone();
        let name = self.name;
        Combinator::new(name.to_string(), move |input: C| -> ParseOutcome<C, O> {
            let guard = slot.borrow();
            let body = guard.as_ref().unwrap_or_else(|| {
                panic!("combinator '{name}' was used before define() was called")
            });
            body.run(input)
        })
    }
}
