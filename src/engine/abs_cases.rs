//! Real-domain solving of equations with absolute values by sign-case splitting.
//!
//! Each `Abs(u)` is replaced by `u` or `-u`; every case is an ordinary rational equation. A
//! candidate root is kept only if it is real and makes the original residual vanish, which
//! also rules out roots that violate their case's sign assumption. A case that reduces to
//! `0 = 0` holds on a whole interval, which a finite root list cannot express.

use num_complex::Complex64;
use tracing::debug;

use crate::error::{CasError, Result};
use crate::expr::{Expr, neg};
use crate::simplify::substitute;

use super::evalf::evaluate;
use super::fraction::together;
use super::roots::{is_real, order_roots};

/// At most this many distinct absolute-value terms are split (2^6 cases).
pub(crate) const MAX_ABS_TERMS: usize = 6;
const RESIDUAL_TOLERANCE: f64 = 1e-9;
const DUPLICATE_TOLERANCE: f64 = 1e-12;

/// Solve `residual = 0` over the reals, delegating each sign case to `solve_case`.
pub(crate) fn solve_by_cases<F>(residual: &Expr, var: &str, mut solve_case: F) -> Result<Vec<Expr>>
where
    F: FnMut(&Expr) -> Result<Vec<Expr>>,
{
    let mut terms: Vec<Expr> = residual
        .abs_terms()
        .into_iter()
        .filter(|term| term.contains_var(var))
        .collect();
    if terms.len() > MAX_ABS_TERMS {
        return Err(CasError::Unsupported(format!(
            "{} absolute-value terms in one equation",
            terms.len()
        )));
    }
    // Outer terms before the ones nested inside them, so whole subtrees still match.
    terms.sort_by_key(|term| std::cmp::Reverse(node_count(term)));

    let mut accepted: Vec<(Complex64, Expr)> = Vec::new();
    for mask in 0..(1u32 << terms.len()) {
        let case = apply_signs(residual, &terms, mask);
        debug!(mask, case = %case, "solving absolute-value case");
        if together(&case).numer.is_zero() {
            return Err(CasError::Unsupported("infinitely many solutions".to_string()));
        }
        let candidates = solve_case(&case)?;
        for candidate in candidates {
            // Sign conditions on a symbolic root cannot be checked.
            let Some(value) = evaluate(&candidate) else {
                return Err(CasError::Unsupported(format!(
                    "sign of {} depends on other symbols",
                    crate::format::pretty(&candidate)
                )));
            };
            if !is_real(value) || !satisfies(residual, var, &candidate) {
                continue;
            }
            let duplicate = accepted.iter().any(|(seen, _)| {
                (seen.re - value.re).abs() <= DUPLICATE_TOLERANCE * (1.0 + value.re.abs())
            });
            if !duplicate {
                accepted.push((value, candidate));
            }
        }
    }

    Ok(order_roots(accepted.into_iter().map(|(_, root)| root).collect()))
}

fn apply_signs(residual: &Expr, terms: &[Expr], mask: u32) -> Expr {
    terms.iter().enumerate().fold(residual.clone(), |expr, (i, term)| {
        let Expr::Abs(inner) = term else {
            return expr;
        };
        let replacement = if mask & (1 << i) == 0 {
            inner.as_ref().clone()
        } else {
            neg(inner.as_ref().clone())
        };
        expr.replace(term, &replacement)
    })
}

fn satisfies(residual: &Expr, var: &str, candidate: &Expr) -> bool {
    evaluate(&substitute(residual, var, candidate))
        .map(|value| value.norm() <= RESIDUAL_TOLERANCE)
        .unwrap_or(false)
}

fn node_count(expr: &Expr) -> usize {
    1 + expr.args().into_iter().map(node_count).sum::<usize>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::sub;
    use crate::parser::parse_expr;

    #[test]
    fn nested_terms_are_replaced_outside_in() {
        let residual = parse_expr("abs(abs(x) - 1)").expect("parse");
        let mut terms: Vec<Expr> = residual.abs_terms().into_iter().collect();
        terms.sort_by_key(|term| std::cmp::Reverse(node_count(term)));
        let case = apply_signs(&residual, &terms, 0b10);
        assert_eq!(
            case,
            sub(neg(Expr::var("x")), Expr::integer(1))
        );
    }

    #[test]
    fn identity_case_is_rejected() {
        let residual = parse_expr("abs(x) - x").expect("parse");
        let result = solve_by_cases(&residual, "x", |_| Ok(Vec::new()));
        assert_eq!(
            result,
            Err(CasError::Unsupported("infinitely many solutions".to_string()))
        );
    }

    #[test]
    fn too_many_terms_are_rejected() {
        let residual = parse_expr(
            "abs(x) + abs(x-1) + abs(x-2) + abs(x-3) + abs(x-4) + abs(x-5) + abs(x-6)",
        )
        .expect("parse");
        let result = solve_by_cases(&residual, "x", |_| Ok(Vec::new()));
        assert!(matches!(result, Err(CasError::Unsupported(_))));
    }
}
