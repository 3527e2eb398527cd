//! Solve loosely typed algebraic equations such as `2x = 8`, `x^2 - 4` or `|x - 3| = 5`.
//!
//! The [`pipeline`] turns text into a formatted answer; the symbolic work behind it goes
//! through the [`engine::SymbolicEngine`] trait, implemented by [`engine::NativeEngine`] on
//! exact rational arithmetic. [`server`] exposes the pipeline over HTTP.

pub mod engine;
pub mod error;
pub mod expr;
pub mod format;
pub mod parser;
pub mod pipeline;
pub mod polynomial;
pub mod prelude;
pub mod server;
pub mod simplify;
pub mod ui;

pub use engine::{Binding, Domain, Equation, NativeEngine, SymbolicEngine};
pub use error::{CasError, ParseContext, Result};
pub use expr::{Expr, Rational, abs, add, div, mul, neg, one, pow, rational, sqrt, sub, zero};
pub use format::{format_solutions, pretty};
pub use parser::parse_expr;
pub use polynomial::{Poly, Polynomial};
pub use pipeline::{
    Strategy, classify, normalize_input, parse_equation, select_variable, solve_equation,
    solve_equation_with,
};
pub use simplify::{simplify, simplify_fully, simplify_with_limit, substitute};
