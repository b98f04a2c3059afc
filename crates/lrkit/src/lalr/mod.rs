//! # LALR Engine
//!
//! Deterministic shift/reduce/goto execution over a transactional value
//! stack. One [`post`](LalrParser::post) call processes exactly one token:
//! any number of reductions, then a single shift (or acceptance, or a
//! terminal error). The stack transaction guarantees the externally visible
//! stack only changes at token boundaries; a failed token leaves every
//! pre-existing frame untouched.
//!
//! Failure is terminal at this layer. Grammar-level recovery (productions
//! that consume an explicit error terminal) is ordinary grammar structure
//! exercised through the normal reduce path, not an engine feature.

mod stack;

pub use stack::TxStack;

use crate::error::TableError;
use crate::semantics::{Arguments, Semantics};
use crate::table::{Action, ParseTable, StateId, TermId};
use smallvec::SmallVec;
use std::sync::Arc;

/// Tuning knobs for the deterministic engine.
#[derive(Debug, Clone)]
pub struct LalrConfig {
    /// Maximum stack depth in frames; 0 means unbounded. Exceeding it
    /// reports [`Semantics::stack_overflow`] and puts the parser in the
    /// terminal error state.
    pub max_stack_depth: usize,
}

impl Default for LalrConfig {
    fn default() -> Self {
        Self { max_stack_depth: 0 }
    }
}

/// One stack entry: automaton state plus the semantic value carried by the
/// symbol that entered it.
#[derive(Debug, Clone)]
struct Frame<V> {
    state: StateId,
    value: V,
}

/// Deterministic table-driven parser.
///
/// ```
/// use lrkit::lalr::{LalrConfig, LalrParser};
/// use lrkit::semantics::{Arguments, Semantics};
/// use lrkit::table::{Production, TableBuilder};
///
/// // S -> 'a' ; terminals: 0 = 'a', 1 = end.
/// let mut builder = TableBuilder::new(3);
/// let prod = builder.production(0, 1);
/// builder.shift(0, 0, 1);
/// builder.reduce(1, 1, prod);
/// builder.goto(0, 0, 2);
/// builder.accept(2, 1);
/// let table = builder.build().unwrap();
///
/// struct Count;
/// impl Semantics for Count {
///     type Value = i64;
///     fn reduce(&mut self, _: &Production, args: &Arguments<'_, i64>) -> i64 {
///         args[0]
///     }
/// }
///
/// let mut parser =
///     LalrParser::new(table.into(), LalrConfig::default(), Count).unwrap();
/// assert!(!parser.post(0, 41));
/// assert!(parser.post(1, 0));
/// assert_eq!(parser.accept(), Some(&41));
/// ```
pub struct LalrParser<S: Semantics> {
    table: Arc<ParseTable>,
    semantics: S,
    stack: TxStack<Frame<S::Value>>,
    accepted: bool,
    accepted_value: Option<S::Value>,
    error: bool,
}

impl<S: Semantics> LalrParser<S> {
    /// Create a parser session over a conflict-free table.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::Conflict`] when any cell holds more than one
    /// action; such tables belong to the generalized engine.
    pub fn new(table: Arc<ParseTable>, config: LalrConfig, semantics: S) -> Result<Self, TableError> {
        if let Some((state, terminal)) = table.first_conflict() {
            return Err(TableError::Conflict { state, terminal });
        }
        let mut parser = Self {
            table,
            semantics,
            stack: TxStack::new(config.max_stack_depth),
            accepted: false,
            accepted_value: None,
            error: false,
        };
        parser.reset();
        Ok(parser)
    }

    /// Clear the stack, push the initial state, clear all flags.
    pub fn reset(&mut self) {
        self.accepted = false;
        self.accepted_value = None;
        self.error = false;
        self.stack.clear();
        self.stack.begin_transaction();
        if self.stack.push(Frame {
            state: self.table.start_state(),
            value: S::Value::default(),
        }) {
            self.stack.commit();
        } else {
            self.semantics.stack_overflow();
            self.error = true;
        }
    }

    /// Feed one token. Returns whether acceptance occurred for this call.
    ///
    /// The token is either fully applied (committed) or has no effect
    /// (rolled back on error).
    ///
    /// # Panics
    ///
    /// Panics when called after the parser entered the error state; that is
    /// a caller bug, not a reportable failure. Call
    /// [`reset`](Self::reset) first.
    pub fn post(&mut self, token: TermId, value: S::Value) -> bool {
        assert!(!self.error, "post on a parser in the error state");
        self.stack.begin_transaction();
        let mut carried = Some(value);
        let mut accepted_now = false;
        loop {
            let state = self.top_state();
            match self.table.action(state, token) {
                Action::Shift(dest) => {
                    self.push_frame(dest, carried.take().unwrap_or_default());
                    break;
                }
                Action::Reduce(production) => {
                    let production = *self.table.production(production);
                    let synthesized = {
                        let args = collect_args(&self.stack, production.rhs_len);
                        self.semantics.reduce(&production, &args)
                    };
                    self.stack.pop(production.rhs_len);
                    let base = self.top_state();
                    match self.table.goto(base, production.lhs) {
                        Some(dest) => {
                            if !self.push_frame(dest, synthesized) {
                                break;
                            }
                        }
                        None => {
                            // Unreachable on a well-formed table; degrade to
                            // a syntax error rather than panicking.
                            self.semantics.syntax_error();
                            self.error = true;
                            break;
                        }
                    }
                }
                Action::Accept => {
                    self.accepted = true;
                    self.accepted_value = self.stack.top().map(|f| f.value.clone());
                    accepted_now = true;
                    break;
                }
                Action::Error => {
                    self.semantics.syntax_error();
                    self.error = true;
                    break;
                }
            }
        }
        if self.error {
            self.stack.rollback();
        } else {
            self.stack.commit();
        }
        accepted_now
    }

    /// The accepted value, once a [`post`](Self::post) call returned `true`.
    #[must_use]
    pub fn accept(&self) -> Option<&S::Value> {
        self.accepted_value.as_ref()
    }

    /// Whether acceptance has been recorded.
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        self.accepted
    }

    /// Whether the parser is in the permanent error state.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.error
    }

    /// Current logical stack depth in frames.
    #[must_use]
    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    /// Borrow the semantic-action implementation.
    pub fn semantics(&self) -> &S {
        &self.semantics
    }

    /// Mutably borrow the semantic-action implementation.
    pub fn semantics_mut(&mut self) -> &mut S {
        &mut self.semantics
    }

    fn top_state(&self) -> StateId {
        self.stack
            .top()
            .map_or_else(|| self.table.start_state(), |f| f.state)
    }

    fn push_frame(&mut self, state: StateId, value: S::Value) -> bool {
        if self.stack.push(Frame { state, value }) {
            true
        } else {
            self.semantics.stack_overflow();
            self.error = true;
            false
        }
    }

}

/// The `len` most-recently-pushed values, leftmost RHS symbol first, read
/// through the overlay.
fn collect_args<V>(stack: &TxStack<Frame<V>>, len: usize) -> Arguments<'_, V> {
    let mut values: SmallVec<[&V; 4]> = SmallVec::with_capacity(len);
    for i in 0..len {
        if let Some(frame) = stack.peek_from_top(len - 1 - i) {
            values.push(&frame.value);
        }
    }
    Arguments::new(values)
}
