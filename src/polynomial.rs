//! Sparse univariate polynomials over exact rationals or symbolic coefficients.
//!
//! The equation solver reads a residual as a polynomial in the unknown: [`Poly`] when every
//! coefficient folds to a rational, `Polynomial<Expr>` when other symbols act as parameters.

use std::collections::BTreeMap;

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, ToPrimitive, Zero};

use crate::expr::{Expr, Rational};
use crate::simplify::simplify;

/// Largest exponent accepted when expanding `p^k`.
pub const MAX_DEGREE: usize = 64;

/// Coefficient arithmetic, plus how a variable-free subexpression becomes a coefficient.
pub trait CoeffOps: Clone {
    fn zero() -> Self;
    fn one() -> Self;
    fn is_zero(&self) -> bool;
    fn add(&self, other: &Self) -> Self;
    fn mul(&self, other: &Self) -> Self;
    fn neg(&self) -> Self;
    /// `1 / self`, or `None` when there is no inverse.
    fn recip(&self) -> Option<Self>;
    /// Coefficient for an expression that does not mention the polynomial variable.
    fn coefficient(expr: &Expr) -> Option<Self>;
}

impl CoeffOps for Rational {
    fn zero() -> Self {
        Zero::zero()
    }

    fn one() -> Self {
        One::one()
    }

    fn is_zero(&self) -> bool {
        Zero::is_zero(self)
    }

    fn add(&self, other: &Self) -> Self {
        self + other
    }

    fn mul(&self, other: &Self) -> Self {
        self * other
    }

    fn neg(&self) -> Self {
        -self
    }

    fn recip(&self) -> Option<Self> {
        (!Zero::is_zero(self)).then(|| Rational::recip(self))
    }

    fn coefficient(expr: &Expr) -> Option<Self> {
        constant_value(expr)
    }
}

impl CoeffOps for Expr {
    fn zero() -> Self {
        crate::expr::zero()
    }

    fn one() -> Self {
        crate::expr::one()
    }

    fn is_zero(&self) -> bool {
        Expr::is_zero(self)
    }

    fn add(&self, other: &Self) -> Self {
        simplify(crate::expr::add(self.clone(), other.clone()))
    }

    fn mul(&self, other: &Self) -> Self {
        simplify(crate::expr::mul(self.clone(), other.clone()))
    }

    fn neg(&self) -> Self {
        simplify(crate::expr::neg(self.clone()))
    }

    fn recip(&self) -> Option<Self> {
        if Expr::is_zero(self) {
            return None;
        }
        Some(simplify(crate::expr::div(crate::expr::one(), self.clone())))
    }

    fn coefficient(expr: &Expr) -> Option<Self> {
        Some(simplify(expr.clone()))
    }
}

/// Nonzero coefficients keyed by exponent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Polynomial<C> {
    pub(crate) coeffs: BTreeMap<usize, C>,
}

pub type Poly = Polynomial<Rational>;

impl<C: CoeffOps> Polynomial<C> {
    pub fn zero() -> Self {
        Polynomial {
            coeffs: BTreeMap::new(),
        }
    }

    /// `c * x^exp`.
    pub fn monomial(exp: usize, c: C) -> Self {
        let mut poly = Polynomial::zero();
        poly.accumulate(exp, c);
        poly
    }

    pub fn from_constant(c: C) -> Self {
        Polynomial::monomial(0, c)
    }

    pub fn degree(&self) -> Option<usize> {
        self.coeffs.keys().next_back().copied()
    }

    pub fn leading_coeff(&self) -> C {
        self.coeffs
            .values()
            .next_back()
            .cloned()
            .unwrap_or_else(C::zero)
    }

    pub fn is_zero(&self) -> bool {
        self.coeffs.is_empty()
    }

    pub fn coeff(&self, power: usize) -> C {
        self.coeffs.get(&power).cloned().unwrap_or_else(C::zero)
    }

    /// Add `c * x^exp` in place, dropping the entry if it cancels.
    fn accumulate(&mut self, exp: usize, c: C) {
        let sum = match self.coeffs.remove(&exp) {
            Some(existing) => existing.add(&c),
            None => c,
        };
        if !sum.is_zero() {
            self.coeffs.insert(exp, sum);
        }
    }

    pub fn add(&self, other: &Self) -> Self {
        let mut sum = self.clone();
        for (exp, c) in &other.coeffs {
            sum.accumulate(*exp, c.clone());
        }
        sum
    }

    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.negate())
    }

    pub fn negate(&self) -> Self {
        self.scale(&C::one().neg())
    }

    pub fn mul(&self, other: &Self) -> Self {
        let mut product = Polynomial::zero();
        for (ea, ca) in &self.coeffs {
            for (eb, cb) in &other.coeffs {
                product.accumulate(ea + eb, ca.mul(cb));
            }
        }
        product
    }

    pub fn scale(&self, k: &C) -> Self {
        let mut scaled = Polynomial::zero();
        for (exp, c) in &self.coeffs {
            scaled.accumulate(*exp, c.mul(k));
        }
        scaled
    }

    /// Square-and-multiply.
    pub fn pow(&self, mut exp: usize) -> Self {
        let mut result = Polynomial::from_constant(C::one());
        let mut base = self.clone();
        while exp > 0 {
            if exp & 1 == 1 {
                result = result.mul(&base);
            }
            exp >>= 1;
            if exp > 0 {
                base = base.mul(&base);
            }
        }
        result
    }

    /// Read `expr` as a polynomial in `var`.
    ///
    /// Returns `None` for a non-integer or oversized power of `var`, division by something
    /// that mentions `var`, a function of `var`, or a subexpression free of `var` that `C`
    /// cannot take as a coefficient.
    pub fn from_expr(expr: &Expr, var: &str) -> Option<Self> {
        if !expr.contains_var(var) {
            return C::coefficient(expr).map(Polynomial::from_constant);
        }
        let poly = match expr {
            Expr::Variable(_) => Polynomial::monomial(1, C::one()),
            Expr::Add(a, b) => Self::from_expr(a, var)?.add(&Self::from_expr(b, var)?),
            Expr::Sub(a, b) => Self::from_expr(a, var)?.sub(&Self::from_expr(b, var)?),
            Expr::Mul(a, b) => Self::from_expr(a, var)?.mul(&Self::from_expr(b, var)?),
            Expr::Neg(a) => Self::from_expr(a, var)?.negate(),
            Expr::Div(a, b) if !b.contains_var(var) => {
                let inverse = C::coefficient(b)?.recip()?;
                Self::from_expr(a, var)?.scale(&inverse)
            }
            Expr::Pow(base, exp) => Self::from_expr(base, var)?.pow(extract_power(exp)?),
            _ => return None,
        };
        Some(poly)
    }
}

impl Poly {
    pub fn derivative(&self) -> Self {
        let mut result = Poly::zero();
        for (exp, c) in self.coeffs.iter().filter(|(exp, _)| **exp > 0) {
            result.accumulate(exp - 1, c * Rational::from_integer(BigInt::from(*exp)));
        }
        result
    }

    pub fn monic(&self) -> Self {
        match CoeffOps::recip(&self.leading_coeff()) {
            Some(inverse) => self.scale(&inverse),
            None => self.clone(),
        }
    }

    /// Horner evaluation at `x`.
    pub fn evaluate(&self, x: &Rational) -> Rational {
        let Some(degree) = self.degree() else {
            return <Rational as Zero>::zero();
        };
        (0..=degree)
            .rev()
            .fold(<Rational as Zero>::zero(), |acc, exp| acc * x + self.coeff(exp))
    }

    /// Long division: `self = quotient * divisor + remainder`. Dividing by zero returns
    /// `(0, self)`.
    pub fn div_rem(&self, divisor: &Self) -> (Self, Self) {
        let (Some(dd), Some(lead_inv)) = (divisor.degree(), CoeffOps::recip(&divisor.leading_coeff()))
        else {
            return (Poly::zero(), self.clone());
        };
        let mut quotient = Poly::zero();
        let mut remainder = self.clone();
        while let Some(rd) = remainder.degree().filter(|rd| *rd >= dd) {
            let step = Poly::monomial(rd - dd, remainder.leading_coeff() * &lead_inv);
            remainder = remainder.sub(&step.mul(divisor));
            quotient = quotient.add(&step);
        }
        (quotient, remainder)
    }

    pub fn div_exact(&self, divisor: &Self) -> Option<Self> {
        let (quotient, remainder) = self.div_rem(divisor);
        remainder.is_zero().then_some(quotient)
    }

    /// The root of `a*x + b`, if this is linear.
    pub fn linear_root(&self) -> Option<Rational> {
        if self.degree()? != 1 {
            return None;
        }
        Some(-self.coeff(0) / self.coeff(1))
    }

    /// `self = content * primitive`, where `primitive` has coprime integer coefficients and a
    /// positive leading coefficient.
    pub fn content_and_primitive_part(&self) -> (Rational, Self) {
        if self.is_zero() {
            return (<Rational as Zero>::zero(), Poly::zero());
        }
        let denom_lcm = self
            .coeffs
            .values()
            .fold(BigInt::one(), |acc, c| acc.lcm(c.denom()));
        let numers: Vec<(usize, BigInt)> = self
            .coeffs
            .iter()
            .map(|(exp, c)| (*exp, (c * Rational::from_integer(denom_lcm.clone())).to_integer()))
            .collect();
        let mut numer_gcd = numers
            .iter()
            .fold(BigInt::zero(), |acc, (_, n)| acc.gcd(n));
        if self.leading_coeff().is_negative() {
            numer_gcd = -numer_gcd;
        }

        let mut primitive = Poly::zero();
        for (exp, n) in numers {
            primitive.accumulate(exp, Rational::from_integer(n / &numer_gcd));
        }
        (Rational::new(numer_gcd, denom_lcm), primitive)
    }

    /// Monic greatest common divisor (Euclid).
    pub fn gcd(a: &Poly, b: &Poly) -> Poly {
        let (mut a, mut b) = (a.clone(), b.clone());
        while !b.is_zero() {
            let remainder = a.div_rem(&b).1;
            a = std::mem::replace(&mut b, remainder);
        }
        a.monic()
    }

    /// Product of the distinct irreducible factors: same roots, each with multiplicity one.
    pub fn square_free_part(&self) -> Poly {
        if self.degree().unwrap_or(0) < 2 {
            return self.clone();
        }
        let repeated = Poly::gcd(self, &self.derivative());
        if repeated.degree().unwrap_or(0) == 0 {
            return self.clone();
        }
        self.div_exact(&repeated).unwrap_or_else(|| self.clone())
    }

    /// Coefficients as floats, highest degree first.
    pub fn float_coeffs_desc(&self) -> Vec<f64> {
        let degree = self.degree().unwrap_or(0);
        (0..=degree)
            .rev()
            .map(|exp| self.coeff(exp).to_f64().unwrap_or(0.0))
            .collect()
    }
}

/// A non-negative integer exponent no larger than [`MAX_DEGREE`].
fn extract_power(exp: &Expr) -> Option<usize> {
    let value = constant_value(exp)?;
    if !value.is_integer() || value.is_negative() {
        return None;
    }
    value.to_integer().to_usize().filter(|k| *k <= MAX_DEGREE)
}

/// Rational value of a closed expression, if simplification folds it to a constant.
fn constant_value(expr: &Expr) -> Option<Rational> {
    match expr {
        Expr::Constant(n) => Some(n.clone()),
        Expr::Neg(inner) => constant_value(inner).map(|n| -n),
        other if other.is_closed() => simplify(other.clone()).as_constant().cloned(),
        _ => None,
    }
}
