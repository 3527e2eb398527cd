//! Formatting helpers for rendering expressions and solver output.

pub mod expr;
pub mod solution;

pub use expr::pretty;
pub use solution::{format_number, format_solutions};
