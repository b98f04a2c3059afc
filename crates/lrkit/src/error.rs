//! # Error Types
//!
//! Construction-time errors for parse tables and engine setup.
//!
//! Runtime syntax failures are deliberately *not* represented here: per the
//! engine contracts, a deterministic parser reports a syntax error or stack
//! overflow through the [`Semantics`](crate::semantics::Semantics) callbacks
//! and a permanent error flag, and the generalized engine signals rejection
//! by ending up with an empty frontier. The core never logs or prints.
//!
//! When the `diagnostics` feature is enabled, errors derive
//! [`miette::Diagnostic`] for rich reporting.

use thiserror::Error;

#[cfg(feature = "diagnostics")]
use miette::Diagnostic;

/// Errors detected while building or installing a parse table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum TableError {
    #[error("state {state} out of range (table has {num_states} states)")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(lrkit::state_out_of_range)))]
    StateOutOfRange { state: usize, num_states: usize },

    #[error("reduce entry refers to unknown production {production}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(lrkit::unknown_production)))]
    UnknownProduction { production: usize },

    #[error("table has no states")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(lrkit::empty_table)))]
    Empty,

    #[error("conflicting actions in cell (state {state}, terminal {terminal}); deterministic mode requires at most one action per cell")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(lrkit::conflict)))]
    Conflict { state: usize, terminal: usize },
}
