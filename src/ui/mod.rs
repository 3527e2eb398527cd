//! String-based helpers for quick usage and rendering.

use crate::engine::{NativeEngine, SymbolicEngine};
use crate::error::{CasError, Result};
use crate::expr::Expr;
use crate::format::{format_solutions, pretty};
use crate::pipeline::{dispatch, normalize_input, parse_equation};
use crate::simplify::simplify_fully;

/// Parse loosely typed input (`2x^2`, `|x|`) into an expression.
pub fn parse(input: &str) -> Result<Expr> {
    NativeEngine::new().parse(&normalize_input(input))
}

pub fn norm(input: &str) -> String {
    normalize_input(input).into_owned()
}

pub fn simplify(input: &str) -> Result<Expr> {
    Ok(simplify_fully(parse(input)?))
}

pub fn simp(input: &str) -> Result<String> {
    Ok(pretty(&simplify(input)?))
}

/// Solve for the automatically selected variable.
pub fn solve(input: &str) -> Result<String> {
    crate::pipeline::solve_equation(input)
}

/// Solve for `var` instead of the first symbol by name; the others stay as parameters.
pub fn solve_for(input: &str, var: &str) -> Result<String> {
    let engine = NativeEngine::new();
    let equation = parse_equation(&engine, &normalize_input(input))?;
    if !equation.free_symbols().contains(var) {
        return Err(CasError::NoVariable);
    }
    let solutions = dispatch::solve(&engine, &equation, var)?;
    Ok(format_solutions(&engine, var, &solutions))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solve_for_keeps_other_symbols_as_parameters() {
        assert_eq!(solve_for("x + y = 10", "y").expect("solvable"), "y = \"10 - x\"");
    }

    #[test]
    fn solve_for_rejects_absent_variable() {
        assert_eq!(solve_for("x = 1", "z"), Err(CasError::NoVariable));
    }

    #[test]
    fn simp_renders_collected_terms() {
        assert_eq!(simp("2x + 3x - x^2/x").expect("simplifies"), "4*x");
    }
}
