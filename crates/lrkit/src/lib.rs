//! # lrkit
//!
//! Table-driven LR parsing runtime with two interchangeable engines over
//! the same compiled [`ParseTable`]:
//!
//! * the **deterministic engine** ([`lalr`]) runs conflict-free tables with
//!   caller-supplied semantic actions over a transactional value stack;
//!   a token either applies in full or leaves the stack untouched;
//! * the **generalized engine** ([`glr`]) runs any table, conflicts
//!   included, by forking and merging stack tops in a graph-structured
//!   stack and packing every surviving derivation into a shared forest,
//!   enumerated lazily one tree at a time.
//!
//! Tables come from an external grammar compiler or are assembled by hand
//! with [`TableBuilder`]; they are immutable during parsing and shared
//! between sessions behind `Arc`.
//!
//! ## Quick start
//!
//! ```
//! use lrkit::{Arguments, LalrConfig, LalrParser, Production, Semantics, TableBuilder};
//!
//! // S -> 'a' ; terminals: 0 = 'a', 1 = end marker.
//! let mut builder = TableBuilder::new(3);
//! let prod = builder.production(0, 1);
//! builder.shift(0, 0, 1);
//! builder.reduce(1, 1, prod);
//! builder.goto(0, 0, 2);
//! builder.accept(2, 1);
//! let table = builder.build()?;
//!
//! struct Passthrough;
//! impl Semantics for Passthrough {
//!     type Value = i64;
//!     fn reduce(&mut self, _: &Production, args: &Arguments<'_, i64>) -> i64 {
//!         args[0]
//!     }
//! }
//!
//! let mut parser = LalrParser::new(table.into(), LalrConfig::default(), Passthrough)?;
//! parser.post(0, 7);
//! assert!(parser.post(1, 0));
//! assert_eq!(parser.accept(), Some(&7));
//! # Ok::<(), lrkit::TableError>(())
//! ```
//!
//! ## Feature flags
//!
//! * `serialize`: `serde` derives on tables, snapshots, and derivation
//!   trees.
//! * `diagnostics`: `miette` diagnostics on error types.

#![forbid(unsafe_code)]

pub mod error;
pub mod glr;
pub mod lalr;
pub mod semantics;
pub mod table;

pub use error::TableError;
pub use glr::{DerivTree, Forest, GlrConfig, GlrParser, TreeIter};
pub use lalr::{LalrConfig, LalrParser, TxStack};
pub use semantics::{Arguments, Carrier, Semantics};
pub use table::{Action, ParseTable, Production, TableBuilder};
