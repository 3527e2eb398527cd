//! Strategy selection and solving.
//!
//! An equation is classified once by its absolute-value terms; each strategy then runs the
//! engine in a fixed way.

use tracing::debug;

use crate::engine::{Binding, Domain, Equation, SymbolicEngine};
use crate::error::{CasError, Result};
use crate::expr::{Expr, neg};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// No absolute values: solve over the complex numbers.
    Plain,
    /// `|inner| = bound` with a numeric bound: solve `inner = bound`, then `inner = -bound`.
    AbsValueWithNumericBound { inner: Expr, bound: Expr },
    /// Several absolute values, or one against a symbolic side: solve over the reals.
    Fallback,
}

/// Choose how to solve `equation`. Pure: the engine is only asked for numeric values.
pub fn classify(equation: &Equation, engine: &dyn SymbolicEngine) -> Strategy {
    let terms: Vec<Expr> = equation.abs_terms().into_iter().collect();
    let [term] = terms.as_slice() else {
        return if terms.is_empty() {
            Strategy::Plain
        } else {
            Strategy::Fallback
        };
    };
    let Expr::Abs(inner) = term else {
        return Strategy::Fallback;
    };

    let other = if equation.lhs.contains(term) {
        &equation.rhs
    } else {
        &equation.lhs
    };
    if other.is_closed() && engine.evalf(other).is_some() {
        Strategy::AbsValueWithNumericBound {
            inner: inner.as_ref().clone(),
            bound: other.clone(),
        }
    } else {
        Strategy::Fallback
    }
}

/// Solve `equation` for `variable` with the strategy [`classify`] picks.
pub fn solve(engine: &dyn SymbolicEngine, equation: &Equation, variable: &str) -> Result<Vec<Binding>> {
    let strategy = classify(equation, engine);
    debug!(?strategy, variable, "dispatching equation");

    let solutions = match strategy {
        Strategy::Plain => engine.solve(equation, variable, Domain::Complex),
        Strategy::AbsValueWithNumericBound { inner, bound } => {
            let positive = Equation::new(inner.clone(), bound.clone());
            let negative = Equation::new(inner, neg(bound));
            engine
                .solve(&positive, variable, Domain::Complex)
                .and_then(|mut first| {
                    first.extend(engine.solve(&negative, variable, Domain::Complex)?);
                    Ok(first)
                })
        }
        Strategy::Fallback => engine.solve(equation, variable, Domain::Real),
    };

    solutions.map_err(|err| match err {
        err @ CasError::Unsolvable(_) => err,
        CasError::Unsupported(reason) => CasError::Unsolvable(reason),
        other => CasError::Unsolvable(other.to_string()),
    })
}
