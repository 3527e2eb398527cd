//! The symbolic capability the solving pipeline runs on.
//!
//! The pipeline only orchestrates: parsing, solving, simplifying and numeric evaluation all go
//! through [`SymbolicEngine`]. [`NativeEngine`] is the built-in implementation.

mod abs_cases;
mod evalf;
mod fraction;
mod native;
mod roots;

use std::collections::BTreeSet;

use num_complex::Complex64;

use crate::error::Result;
use crate::expr::{Expr, sub};

pub use evalf::evaluate;
pub use native::NativeEngine;

/// Where solutions are searched for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    Real,
    Complex,
}

/// `lhs = rhs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Equation {
    pub lhs: Expr,
    pub rhs: Expr,
}

impl Equation {
    pub fn new(lhs: Expr, rhs: Expr) -> Self {
        Equation { lhs, rhs }
    }

    /// `lhs - rhs`, zero exactly at the solutions.
    pub fn residual(&self) -> Expr {
        sub(self.lhs.clone(), self.rhs.clone())
    }

    pub fn free_symbols(&self) -> BTreeSet<String> {
        let mut symbols = self.lhs.free_symbols();
        symbols.extend(self.rhs.free_symbols());
        symbols
    }

    /// Distinct absolute-value terms that mention a symbol, from both sides.
    ///
    /// `Abs` of a closed expression is just a number and is left out.
    pub fn abs_terms(&self) -> BTreeSet<Expr> {
        let mut terms = self.lhs.abs_terms();
        terms.extend(self.rhs.abs_terms());
        terms.retain(|term| !term.is_closed());
        terms
    }
}

/// One element of a solution set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub variable: String,
    pub value: Expr,
}

impl Binding {
    pub fn new(variable: impl Into<String>, value: Expr) -> Self {
        Binding {
            variable: variable.into(),
            value,
        }
    }
}

pub trait SymbolicEngine: Send + Sync {
    /// Parse a single expression, implicit multiplication included.
    fn parse(&self, text: &str) -> Result<Expr>;

    /// Solutions of `equation` for `variable`, in the engine's own order.
    fn solve(&self, equation: &Equation, variable: &str, domain: Domain) -> Result<Vec<Binding>>;

    fn simplify(&self, expr: &Expr) -> Expr;

    /// Numeric value of a closed expression; `None` when a symbol remains or the value is
    /// not finite.
    fn evalf(&self, expr: &Expr) -> Option<Complex64>;
}
