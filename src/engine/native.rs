use num_complex::Complex64;
use tracing::debug;

use crate::error::{CasError, Result};
use crate::expr::Expr;
use crate::format::pretty;
use crate::parser::parse_expr;
use crate::polynomial::{Poly, Polynomial};
use crate::simplify::{simplify, simplify_fully, substitute};

use super::abs_cases::solve_by_cases;
use super::evalf::evaluate;
use super::fraction::{Fraction, together};
use super::roots::{is_real, order_roots, rational_poly_roots, symbolic_poly_roots};
use super::{Binding, Domain, Equation, SymbolicEngine};

/// A denominator this close to zero at a root counts as a pole.
const POLE_TOLERANCE: f64 = 1e-9;

/// The built-in engine: exact rational arithmetic, polynomial and rational equations in one
/// unknown, and sign-case splitting for absolute values over the reals.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeEngine;

impl NativeEngine {
    pub fn new() -> Self {
        NativeEngine
    }
}

impl SymbolicEngine for NativeEngine {
    fn parse(&self, text: &str) -> Result<Expr> {
        parse_expr(text)
    }

    fn solve(&self, equation: &Equation, variable: &str, domain: Domain) -> Result<Vec<Binding>> {
        let residual = equation.residual();
        let roots = if domain == Domain::Real && has_abs_of(&residual, variable) {
            solve_by_cases(&residual, variable, |case| {
                solve_rational(case, variable, Domain::Real)
            })?
        } else {
            solve_rational(&residual, variable, domain)?
        };
        debug!(variable, ?domain, count = roots.len(), "solved equation");
        Ok(roots
            .into_iter()
            .map(|value| Binding::new(variable, value))
            .collect())
    }

    fn simplify(&self, expr: &Expr) -> Expr {
        simplify_fully(expr.clone())
    }

    fn evalf(&self, expr: &Expr) -> Option<Complex64> {
        evaluate(expr)
    }
}

fn has_abs_of(expr: &Expr, var: &str) -> bool {
    expr.abs_terms().iter().any(|term| term.contains_var(var))
}

/// Roots of a residual that is a ratio of polynomials in `var`.
fn solve_rational(residual: &Expr, var: &str, domain: Domain) -> Result<Vec<Expr>> {
    if has_abs_of(residual, var) {
        return Err(CasError::Unsupported(format!(
            "absolute value of {var} over the complex numbers"
        )));
    }

    let Fraction { numer, denom } = together(residual);
    if denom.is_zero() {
        return Err(CasError::Unsupported("division by zero".to_string()));
    }

    let roots = if let Some(poly) = Poly::from_expr(&numer, var) {
        rational_poly_roots(&poly)
    } else if let Some(poly) = Polynomial::<Expr>::from_expr(&numer, var) {
        symbolic_poly_roots(&poly)?
    } else {
        return Err(CasError::Unsupported(format!(
            "{} is not a polynomial in {var}",
            pretty(&numer)
        )));
    };

    let roots = roots
        .into_iter()
        .filter(|root| !is_pole(&denom, var, root))
        .filter(|root| domain == Domain::Complex || evaluate(root).map_or(true, is_real))
        .collect();
    Ok(order_roots(roots))
}

fn is_pole(denom: &Expr, var: &str, root: &Expr) -> bool {
    if !denom.contains_var(var) {
        return false;
    }
    let at_root = simplify(substitute(denom, var, root));
    at_root.is_zero()
        || evaluate(&at_root).is_some_and(|value| value.norm() <= POLE_TOLERANCE)
}
