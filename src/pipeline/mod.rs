//! Text in, formatted solutions out.
//!
//! `normalize_input` → `parse_equation` → `select_variable` → `dispatch::solve` →
//! `format_solutions`, with every symbolic step delegated to a [`SymbolicEngine`].

pub mod dispatch;
pub mod equation;
pub mod input;
pub mod variable;

use tracing::debug;

use crate::engine::{NativeEngine, SymbolicEngine};
use crate::error::Result;
use crate::format::format_solutions;

pub use dispatch::{Strategy, classify};
pub use equation::parse_equation;
pub use input::normalize_input;
pub use variable::select_variable;

/// Solve a loosely formatted equation with the built-in engine.
///
/// ```
/// assert_eq!(eqsolve::solve_equation("2x = 8").unwrap(), "x = \"4.0\"");
/// ```
pub fn solve_equation(input: &str) -> Result<String> {
    solve_equation_with(&NativeEngine::new(), input)
}

pub fn solve_equation_with(engine: &dyn SymbolicEngine, input: &str) -> Result<String> {
    let normalized = normalize_input(input);
    debug!(%normalized, "normalized input");

    let equation = parse_equation(engine, &normalized)?;
    let variable = select_variable(&equation)?;
    debug!(%variable, lhs = %equation.lhs, rhs = %equation.rhs, "parsed equation");

    let solutions = dispatch::solve(engine, &equation, &variable)?;
    Ok(format_solutions(engine, &variable, &solutions))
}
