//! # Semantic Actions
//!
//! The caller-supplied seam between the deterministic engine and the values
//! it synthesizes: one [`reduce`](Semantics::reduce) callback dispatched by
//! production, plus the two failure notifications. The engine owns the
//! control flow; the implementation owns every value.
//!
//! [`Carrier`] is the conventional bridge between a grammar's single carrier
//! type (the `Value` the stack stores) and the typed results individual
//! productions produce: an upcast on the way into the stack, a fallible
//! downcast on the way out.

use crate::table::Production;
use smallvec::SmallVec;

/// Positional view of the argument values popped by one reduction.
///
/// Index 0 is the leftmost right-hand-side symbol. The view always covers
/// exactly the production's `rhs_len` most-recently-pushed frames at the
/// moment of reduction, reading through the transaction overlay, no matter
/// how many reductions already ran for the current token.
pub struct Arguments<'a, V> {
    values: SmallVec<[&'a V; 4]>,
}

impl<'a, V> Arguments<'a, V> {
    pub(crate) fn new(values: SmallVec<[&'a V; 4]>) -> Self {
        Self { values }
    }

    /// Number of arguments (the production's right-hand-side length).
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the reduction popped no frames (an epsilon production).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Argument by position, `None` when out of range.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&'a V> {
        self.values.get(index).copied()
    }
}

impl<'a, V> std::ops::Index<usize> for Arguments<'a, V> {
    type Output = V;

    fn index(&self, index: usize) -> &V {
        self.values[index]
    }
}

/// Caller-supplied semantic actions for the deterministic engine.
///
/// `reduce` is invoked once per reduction with the production record (whose
/// `selector` picks the grammar-specific callback) and the popped argument
/// values in production order. `syntax_error` and `stack_overflow` are
/// notifications; after either, the engine is permanently in the error state
/// until [`reset`](crate::lalr::LalrParser::reset).
pub trait Semantics {
    /// The carrier type stored in the value stack.
    type Value: Clone + Default;

    /// Synthesize the value for a completed production.
    fn reduce(&mut self, production: &Production, args: &Arguments<'_, Self::Value>)
        -> Self::Value;

    /// No viable action existed for the current (state, token) cell.
    fn syntax_error(&mut self) {}

    /// A push exceeded the configured stack capacity.
    fn stack_overflow(&mut self) {}
}

/// Upcast/downcast pair bridging a typed production result and the
/// grammar's carrier value.
///
/// ```
/// use lrkit::semantics::Carrier;
///
/// #[derive(Clone, Default)]
/// enum Value {
///     #[default]
///     None,
///     Int(i64),
/// }
///
/// impl Carrier<i64> for Value {
///     fn upcast(value: i64) -> Self {
///         Value::Int(value)
///     }
///     fn downcast(self) -> Option<i64> {
///         match self {
///             Value::Int(n) => Some(n),
///             Value::None => None,
///         }
///     }
/// }
///
/// assert_eq!(Value::upcast(7).downcast(), Some(7));
/// ```
pub trait Carrier<T>: Sized {
    /// Wrap a typed value in the carrier.
    fn upcast(value: T) -> Self;

    /// Recover the typed value, `None` when the carrier holds something else.
    fn downcast(self) -> Option<T>;
}
