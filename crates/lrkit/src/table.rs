//! # Parse Tables
//!
//! The static, per-grammar automaton data both engines execute: an action
//! table mapping `(state, terminal)` to one or more [`Action`]s, a goto
//! table mapping `(state, nonterminal)` to a successor state, and the
//! production records reductions refer to.
//!
//! Tables are produced by an external grammar compiler (or built by hand
//! with [`TableBuilder`] for tests and small grammars) and are read-only
//! during parsing. A cell with more than one action is a conflict: the
//! deterministic engine refuses such tables at construction time, while the
//! generalized engine explores every entry.

use crate::error::TableError;
use hashbrown::HashMap;
use smallvec::SmallVec;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Automaton state index.
pub type StateId = usize;
/// Terminal (token kind) index.
pub type TermId = usize;
/// Nonterminal index.
pub type NontermId = usize;
/// Production index.
pub type ProdId = usize;

/// One entry of an action-table cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum Action {
    /// Consume the lookahead token and transition to the given state.
    Shift(StateId),
    /// Pop the production's right-hand side and transition via goto.
    Reduce(ProdId),
    /// Successful parse.
    Accept,
    /// No viable action.
    Error,
}

impl Action {
    /// Create a shift action to the given state.
    #[must_use]
    pub const fn shift(state: StateId) -> Self {
        Self::Shift(state)
    }

    /// Create a reduce action using the given production index.
    #[must_use]
    pub const fn reduce(production: ProdId) -> Self {
        Self::Reduce(production)
    }

    /// Create an accept action.
    #[must_use]
    pub const fn accept() -> Self {
        Self::Accept
    }
}

/// Production record: left nonterminal, right-hand-side length, and the
/// semantic-action selector handed to [`Semantics::reduce`].
///
/// The selector defaults to the production's own index; a grammar compiler
/// may assign a shared selector to productions that synthesize the same
/// value.
///
/// [`Semantics::reduce`]: crate::semantics::Semantics::reduce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Production {
    pub lhs: NontermId,
    pub rhs_len: usize,
    pub selector: usize,
}

impl Production {
    /// Create a production whose selector is its own index.
    #[must_use]
    pub const fn new(lhs: NontermId, rhs_len: usize, selector: usize) -> Self {
        Self {
            lhs,
            rhs_len,
            selector,
        }
    }
}

/// Cell payload: most cells carry a single action; conflicted cells
/// (meaningful only to the generalized engine) carry several.
type ActionCell = SmallVec<[Action; 1]>;

/// Action table: `(state, terminal)` -> actions.
type ActionTable = HashMap<(StateId, TermId), ActionCell, ahash::RandomState>;

/// Goto table: `(state, nonterminal)` -> state.
type GotoTable = HashMap<(StateId, NontermId), StateId, ahash::RandomState>;

/// A compiled automaton: action table, goto table, and productions.
///
/// Immutable after [`TableBuilder::build`]; share it between sessions with
/// `Arc<ParseTable>`.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct ParseTable {
    actions: ActionTable,
    gotos: GotoTable,
    productions: Vec<Production>,
    start_state: StateId,
    num_states: usize,
}

impl ParseTable {
    /// All actions for `(state, terminal)`. An empty slice means no viable
    /// action (the `Error` cell).
    #[must_use]
    pub fn actions(&self, state: StateId, terminal: TermId) -> &[Action] {
        self.actions
            .get(&(state, terminal))
            .map_or(&[], |cell| cell.as_slice())
    }

    /// The single action for `(state, terminal)` in deterministic mode.
    ///
    /// Returns [`Action::Error`] for an empty cell. Conflicted cells cannot
    /// occur here because [`crate::lalr::LalrParser::new`] rejects them.
    #[must_use]
    pub fn action(&self, state: StateId, terminal: TermId) -> Action {
        self.actions(state, terminal)
            .first()
            .copied()
            .unwrap_or(Action::Error)
    }

    /// Goto entry for `(state, nonterminal)`.
    #[must_use]
    pub fn goto(&self, state: StateId, nonterminal: NontermId) -> Option<StateId> {
        self.gotos.get(&(state, nonterminal)).copied()
    }

    /// Production record by index.
    ///
    /// # Panics
    ///
    /// Panics if `production` was not created by the builder; reduce entries
    /// are validated at build time, so indices originating from this table
    /// are always in range.
    #[must_use]
    pub fn production(&self, production: ProdId) -> &Production {
        &self.productions[production]
    }

    /// The automaton's initial state.
    #[must_use]
    pub const fn start_state(&self) -> StateId {
        self.start_state
    }

    /// Number of states in the automaton.
    #[must_use]
    pub const fn num_states(&self) -> usize {
        self.num_states
    }

    /// Number of productions.
    #[must_use]
    pub fn num_productions(&self) -> usize {
        self.productions.len()
    }

    /// Whether any cell carries more than one action.
    #[must_use]
    pub fn has_conflicts(&self) -> bool {
        self.actions.values().any(|cell| cell.len() > 1)
    }

    /// First conflicted cell, if any.
    #[must_use]
    pub fn first_conflict(&self) -> Option<(StateId, TermId)> {
        self.actions
            .iter()
            .find(|(_, cell)| cell.len() > 1)
            .map(|(&key, _)| key)
    }
}

/// Incremental construction of a [`ParseTable`].
///
/// ```
/// use lrkit::table::{Action, TableBuilder};
///
/// // S -> 'a' ; two states, terminal 0 = 'a', terminal 1 = end marker.
/// let mut builder = TableBuilder::new(2);
/// let prod = builder.production(0, 1);
/// builder.shift(0, 0, 1);
/// builder.reduce(1, 1, prod);
/// builder.accept(0, 1);
/// builder.goto(1, 0, 0);
/// let table = builder.build().unwrap();
/// assert_eq!(table.action(0, 0), Action::Shift(1));
/// ```
#[derive(Debug, Default)]
pub struct TableBuilder {
    actions: Vec<(StateId, TermId, Action)>,
    gotos: Vec<(StateId, NontermId, StateId)>,
    productions: Vec<Production>,
    start_state: StateId,
    num_states: usize,
}

impl TableBuilder {
    /// Start a table with the given number of states. State 0 is the
    /// initial state unless [`start_state`](Self::start_state) overrides it.
    #[must_use]
    pub fn new(num_states: usize) -> Self {
        Self {
            num_states,
            ..Self::default()
        }
    }

    /// Override the initial state.
    pub fn start_state(&mut self, state: StateId) -> &mut Self {
        self.start_state = state;
        self
    }

    /// Register a production and return its index. The semantic-action
    /// selector defaults to the index; see
    /// [`production_with_selector`](Self::production_with_selector).
    pub fn production(&mut self, lhs: NontermId, rhs_len: usize) -> ProdId {
        let id = self.productions.len();
        self.productions.push(Production::new(lhs, rhs_len, id));
        id
    }

    /// Register a production with an explicit semantic-action selector.
    pub fn production_with_selector(
        &mut self,
        lhs: NontermId,
        rhs_len: usize,
        selector: usize,
    ) -> ProdId {
        let id = self.productions.len();
        self.productions.push(Production::new(lhs, rhs_len, selector));
        id
    }

    /// Add a shift entry.
    pub fn shift(&mut self, state: StateId, terminal: TermId, dest: StateId) -> &mut Self {
        self.actions.push((state, terminal, Action::Shift(dest)));
        self
    }

    /// Add a reduce entry.
    pub fn reduce(&mut self, state: StateId, terminal: TermId, production: ProdId) -> &mut Self {
        self.actions
            .push((state, terminal, Action::Reduce(production)));
        self
    }

    /// Add an accept entry.
    pub fn accept(&mut self, state: StateId, terminal: TermId) -> &mut Self {
        self.actions.push((state, terminal, Action::Accept));
        self
    }

    /// Add a goto entry.
    pub fn goto(&mut self, state: StateId, nonterminal: NontermId, dest: StateId) -> &mut Self {
        self.gotos.push((state, nonterminal, dest));
        self
    }

    /// Validate and assemble the table.
    ///
    /// Identical duplicate entries in the same cell collapse to one; distinct
    /// entries stack up as a conflict, which only the generalized engine
    /// accepts.
    ///
    /// # Errors
    ///
    /// Returns [`TableError`] when the table is empty, a state index is out
    /// of range, or a reduce entry names an unknown production.
    pub fn build(&mut self) -> Result<ParseTable, TableError> {
        if self.num_states == 0 {
            return Err(TableError::Empty);
        }
        let check_state = |state: StateId, num_states: usize| {
            if state < num_states {
                Ok(())
            } else {
                Err(TableError::StateOutOfRange { state, num_states })
            }
        };
        check_state(self.start_state, self.num_states)?;

        let mut actions: ActionTable = HashMap::with_hasher(ahash::RandomState::new());
        for &(state, terminal, action) in &self.actions {
            check_state(state, self.num_states)?;
            match action {
                Action::Shift(dest) => check_state(dest, self.num_states)?,
                Action::Reduce(production) => {
                    if production >= self.productions.len() {
                        return Err(TableError::UnknownProduction { production });
                    }
                }
                Action::Accept | Action::Error => {}
            }
            let cell = actions.entry((state, terminal)).or_default();
            if !cell.contains(&action) {
                cell.push(action);
            }
        }

        let mut gotos: GotoTable = HashMap::with_hasher(ahash::RandomState::new());
        for &(state, nonterminal, dest) in &self.gotos {
            check_state(state, self.num_states)?;
            check_state(dest, self.num_states)?;
            gotos.insert((state, nonterminal), dest);
        }

        Ok(ParseTable {
            actions,
            gotos,
            productions: self.productions.clone(),
            start_state: self.start_state,
            num_states: self.num_states,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_identical_entries_collapse() {
        let mut builder = TableBuilder::new(2);
        builder.shift(0, 0, 1);
        builder.shift(0, 0, 1);
        let table = builder.build().unwrap();
        assert_eq!(table.actions(0, 0), &[Action::Shift(1)]);
        assert!(!table.has_conflicts());
    }

    #[test]
    fn distinct_entries_form_a_conflict() {
        let mut builder = TableBuilder::new(3);
        let prod = builder.production(0, 1);
        builder.shift(0, 0, 1);
        builder.reduce(0, 0, prod);
        let table = builder.build().unwrap();
        assert_eq!(table.actions(0, 0).len(), 2);
        assert_eq!(table.first_conflict(), Some((0, 0)));
    }

    #[test]
    fn out_of_range_state_is_rejected() {
        let mut builder = TableBuilder::new(1);
        builder.shift(0, 0, 7);
        assert_eq!(
            builder.build().unwrap_err(),
            TableError::StateOutOfRange {
                state: 7,
                num_states: 1
            }
        );
    }

    #[test]
    fn empty_cell_reads_as_error() {
        let table = TableBuilder::new(1).build().unwrap();
        assert_eq!(table.action(0, 42), Action::Error);
        assert!(table.actions(0, 42).is_empty());
    }
}
