//! Symbolic simplification and substitution utilities.

mod rules;
mod substitute;

pub(crate) use rules::perfect_square;
pub use rules::{
    simplify, simplify_add, simplify_div, simplify_fully, simplify_mul, simplify_neg, simplify_pow,
    simplify_sub, simplify_with_limit,
};
pub use substitute::substitute;
