//! Expression tree definitions and helpers.

use std::collections::BTreeSet;
use std::fmt;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Zero};

pub type Rational = BigRational;

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Expr {
    Variable(String),
    Constant(Rational),
    /// The imaginary unit `I`.
    Imaginary,
    /// `pi`.
    Pi,
    /// Euler's number `E`.
    Euler,
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Pow(Box<Expr>, Box<Expr>),
    Neg(Box<Expr>),
    Sin(Box<Expr>),
    Cos(Box<Expr>),
    Tan(Box<Expr>),
    Asin(Box<Expr>),
    Acos(Box<Expr>),
    Atan(Box<Expr>),
    Exp(Box<Expr>),
    Log(Box<Expr>),
    Abs(Box<Expr>),
}

impl Expr {
    pub fn var(name: impl Into<String>) -> Self {
        Expr::Variable(name.into())
    }

    pub fn constant(num: impl Into<BigInt>, den: impl Into<BigInt>) -> Self {
        Expr::Constant(Rational::new(num.into(), den.into()))
    }

    pub fn integer(value: impl Into<BigInt>) -> Self {
        Expr::Constant(Rational::from_integer(value.into()))
    }

    pub fn rational(value: Rational) -> Self {
        Expr::Constant(value)
    }

    /// Exact rational image of a finite float; `None` for NaN or infinities.
    pub fn float(value: f64) -> Option<Self> {
        Rational::from_float(value).map(Expr::Constant)
    }

    pub fn negate(self) -> Self {
        match self {
            Expr::Constant(r) => Expr::Constant(-r),
            Expr::Neg(inner) => *inner,
            other => Expr::Neg(Box::new(other)),
        }
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Constant(r) if r.is_zero())
    }

    pub fn is_one(&self) -> bool {
        matches!(self, Expr::Constant(r) if r.is_one())
    }

    pub fn as_variable(&self) -> Option<&str> {
        if let Expr::Variable(name) = self {
            Some(name)
        } else {
            None
        }
    }

    pub fn as_constant(&self) -> Option<&Rational> {
        if let Expr::Constant(r) = self {
            Some(r)
        } else {
            None
        }
    }

    pub fn boxed(self) -> Box<Self> {
        Box::new(self)
    }

    /// Direct sub-expressions, left to right.
    pub fn args(&self) -> Vec<&Expr> {
        match self {
            Expr::Add(a, b)
            | Expr::Sub(a, b)
            | Expr::Mul(a, b)
            | Expr::Div(a, b)
            | Expr::Pow(a, b) => vec![a.as_ref(), b.as_ref()],
            Expr::Neg(a)
            | Expr::Sin(a)
            | Expr::Cos(a)
            | Expr::Tan(a)
            | Expr::Asin(a)
            | Expr::Acos(a)
            | Expr::Atan(a)
            | Expr::Exp(a)
            | Expr::Log(a)
            | Expr::Abs(a) => vec![a.as_ref()],
            Expr::Variable(_) | Expr::Constant(_) | Expr::Imaginary | Expr::Pi | Expr::Euler => {
                Vec::new()
            }
        }
    }

    /// Rebuild this node with `f` applied to each direct sub-expression.
    pub fn map_args(&self, mut f: impl FnMut(&Expr) -> Expr) -> Expr {
        match self {
            Expr::Add(a, b) => Expr::Add(f(a).boxed(), f(b).boxed()),
            Expr::Sub(a, b) => Expr::Sub(f(a).boxed(), f(b).boxed()),
            Expr::Mul(a, b) => Expr::Mul(f(a).boxed(), f(b).boxed()),
            Expr::Div(a, b) => Expr::Div(f(a).boxed(), f(b).boxed()),
            Expr::Pow(a, b) => Expr::Pow(f(a).boxed(), f(b).boxed()),
            Expr::Neg(a) => Expr::Neg(f(a).boxed()),
            Expr::Sin(a) => Expr::Sin(f(a).boxed()),
            Expr::Cos(a) => Expr::Cos(f(a).boxed()),
            Expr::Tan(a) => Expr::Tan(f(a).boxed()),
            Expr::Asin(a) => Expr::Asin(f(a).boxed()),
            Expr::Acos(a) => Expr::Acos(f(a).boxed()),
            Expr::Atan(a) => Expr::Atan(f(a).boxed()),
            Expr::Exp(a) => Expr::Exp(f(a).boxed()),
            Expr::Log(a) => Expr::Log(f(a).boxed()),
            Expr::Abs(a) => Expr::Abs(f(a).boxed()),
            leaf => leaf.clone(),
        }
    }

    /// Names of all variables appearing in the expression.
    pub fn free_symbols(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_symbols(&mut out);
        out
    }

    fn collect_symbols(&self, out: &mut BTreeSet<String>) {
        if let Expr::Variable(name) = self {
            out.insert(name.clone());
        }
        for arg in self.args() {
            arg.collect_symbols(out);
        }
    }

    /// Distinct absolute-value sub-terms, nested ones included.
    pub fn abs_terms(&self) -> BTreeSet<Expr> {
        let mut out = BTreeSet::new();
        self.collect_abs(&mut out);
        out
    }

    fn collect_abs(&self, out: &mut BTreeSet<Expr>) {
        if let Expr::Abs(_) = self {
            out.insert(self.clone());
        }
        for arg in self.args() {
            arg.collect_abs(out);
        }
    }

    pub fn contains(&self, target: &Expr) -> bool {
        self == target || self.args().into_iter().any(|arg| arg.contains(target))
    }

    pub fn contains_var(&self, var: &str) -> bool {
        match self {
            Expr::Variable(name) => name == var,
            other => other.args().into_iter().any(|arg| arg.contains_var(var)),
        }
    }

    /// True when no variable appears anywhere in the expression.
    pub fn is_closed(&self) -> bool {
        match self {
            Expr::Variable(_) => false,
            other => other.args().into_iter().all(Expr::is_closed),
        }
    }

    /// Replace every occurrence of `target` with `replacement`.
    pub fn replace(&self, target: &Expr, replacement: &Expr) -> Expr {
        if self == target {
            replacement.clone()
        } else {
            self.map_args(|arg| arg.replace(target, replacement))
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", crate::format::pretty(self))
    }
}

pub fn zero() -> Expr {
    Expr::Constant(Rational::zero())
}

pub fn one() -> Expr {
    Expr::Constant(Rational::one())
}

pub fn rational(num: i64, den: i64) -> Rational {
    Rational::new(num.into(), den.into())
}

pub fn pow(base: Expr, exp: Expr) -> Expr {
    Expr::Pow(base.boxed(), exp.boxed())
}

pub fn sqrt(radicand: Expr) -> Expr {
    pow(radicand, Expr::Constant(rational(1, 2)))
}

pub fn add(a: Expr, b: Expr) -> Expr {
    Expr::Add(a.boxed(), b.boxed())
}

pub fn sub(a: Expr, b: Expr) -> Expr {
    Expr::Sub(a.boxed(), b.boxed())
}

pub fn mul(a: Expr, b: Expr) -> Expr {
    Expr::Mul(a.boxed(), b.boxed())
}

pub fn div(a: Expr, b: Expr) -> Expr {
    Expr::Div(a.boxed(), b.boxed())
}

pub fn neg(a: Expr) -> Expr {
    Expr::Neg(a.boxed())
}

pub fn abs(a: Expr) -> Expr {
    Expr::Abs(a.boxed())
}
