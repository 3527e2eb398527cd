//! Root finding for univariate polynomials.
//!
//! Exact rational roots come first (rational-root theorem with deflation), a leftover quadratic
//! is solved by formula, and anything of higher degree is solved numerically.

use std::cmp::Ordering;

use num_bigint::BigInt;
use num_complex::Complex64;
use num_traits::{One, Signed, ToPrimitive, Zero};

use crate::error::{CasError, Result};
use crate::expr::{Expr, Rational, add, div, mul, neg, sqrt, sub};
use crate::polynomial::{Poly, Polynomial};
use crate::simplify::{perfect_square, simplify};

use super::evalf::evaluate;

/// Coefficients larger than this skip the divisor search.
const MAX_DIVISOR_SEARCH: u64 = 1_000_000_000_000;
/// Most `p/q` pairs tried before handing the polynomial to the numeric solver.
const MAX_RATIONAL_CANDIDATES: usize = 10_000;
const MAX_ITERATIONS: usize = 500;
const CONVERGENCE: f64 = 1e-14;
/// Relative size of an imaginary part that still counts as a real root.
const REAL_TOLERANCE: f64 = 1e-9;

/// Distinct roots of a rational polynomial.
pub(crate) fn rational_poly_roots(poly: &Poly) -> Vec<Expr> {
    let Some(degree) = poly.degree() else {
        return Vec::new();
    };
    if degree == 0 {
        return Vec::new();
    }

    let (_, primitive) = poly.content_and_primitive_part();
    let mut remaining = primitive.square_free_part();
    let mut roots = Vec::new();

    if remaining.coeff(0).is_zero() {
        roots.push(Expr::Constant(Rational::zero()));
        remaining = deflate(&remaining, &Rational::zero());
    }
    while let Some(root) = find_rational_root(&remaining) {
        remaining = deflate(&remaining, &root);
        roots.push(Expr::Constant(root));
    }

    match remaining.degree() {
        Some(2) => {
            let [c, b, a] = [remaining.coeff(0), remaining.coeff(1), remaining.coeff(2)];
            roots.extend(quadratic(
                Expr::Constant(a),
                Expr::Constant(b),
                Expr::Constant(c),
            ));
        }
        Some(d) if d > 2 => {
            roots.extend(durand_kerner(&remaining.float_coeffs_desc()).into_iter().map(complex_expr))
        }
        _ => {}
    }
    roots
}

/// Roots of a polynomial whose coefficients mention other symbols.
pub(crate) fn symbolic_poly_roots(poly: &Polynomial<Expr>) -> Result<Vec<Expr>> {
    match poly.degree() {
        None | Some(0) => Ok(Vec::new()),
        Some(1) => {
            let root = div(neg(poly.coeff(0)), poly.coeff(1));
            Ok(vec![simplify(root)])
        }
        Some(2) => Ok(quadratic(poly.coeff(2), poly.coeff(1), poly.coeff(0))),
        Some(d) => Err(CasError::Unsupported(format!(
            "degree {d} polynomial with symbolic coefficients"
        ))),
    }
}

/// Roots of `a*x^2 + b*x + c` from the monic form `x^2 + 2p*x + q`: `-p - sqrt(p^2 - q)` and
/// `-p + sqrt(p^2 - q)`, collapsed to one root when the radicand is zero.
fn quadratic(a: Expr, b: Expr, c: Expr) -> Vec<Expr> {
    let p = simplify(div(b, mul(Expr::integer(2), a.clone())));
    let q = simplify(div(c, a));
    let radicand = simplify(sub(mul(p.clone(), p.clone()), q));
    let vertex = simplify(neg(p));

    if radicand.is_zero() {
        return vec![vertex];
    }

    let root = match radicand.as_constant().and_then(perfect_square) {
        Some(exact) => Expr::Constant(exact),
        None => simplify(sqrt(radicand)),
    };
    vec![
        simplify(sub(vertex.clone(), root.clone())),
        simplify(add(vertex, root)),
    ]
}

fn deflate(poly: &Poly, root: &Rational) -> Poly {
    let linear = Poly::monomial(1, Rational::one()).sub(&Poly::from_constant(root.clone()));
    poly.div_exact(&linear).unwrap_or_else(|| poly.clone())
}

fn find_rational_root(poly: &Poly) -> Option<Rational> {
    let degree = poly.degree()?;
    if degree == 0 {
        return None;
    }
    if degree == 1 {
        return poly.linear_root();
    }

    let (_, primitive) = poly.content_and_primitive_part();
    let leading = primitive.leading_coeff().to_integer();
    let constant = primitive.coeff(0).to_integer();

    let p_candidates = divisors(&constant)?;
    let q_candidates = divisors(&leading)?;
    if p_candidates.len().saturating_mul(q_candidates.len()) > MAX_RATIONAL_CANDIDATES {
        return None;
    }

    let mut candidates = Vec::new();
    for &p in &p_candidates {
        for &q in &q_candidates {
            let candidate = Rational::new(BigInt::from(p), BigInt::from(q));
            candidates.push(candidate.clone());
            candidates.push(-candidate);
        }
    }
    candidates.sort();
    candidates.dedup();

    candidates
        .into_iter()
        .find(|candidate| poly.evaluate(candidate).is_zero())
}

/// Positive divisors of `n`, or `None` if `n` is too large to factor by trial division.
fn divisors(n: &BigInt) -> Option<Vec<u64>> {
    let n = n.abs().to_u64().filter(|v| *v != 0 && *v <= MAX_DIVISOR_SEARCH)?;
    let mut result = Vec::new();
    let mut d = 1u64;
    while d * d <= n {
        if n % d == 0 {
            if n / d != d {
                result.push(n / d);
            }
            result.push(d);
        }
        d += 1;
    }
    result.sort_unstable();
    Some(result)
}

/// All complex roots of a square-free polynomial, coefficients highest degree first.
fn durand_kerner(coeffs: &[f64]) -> Vec<Complex64> {
    let Some((&lead, rest)) = coeffs.split_first() else {
        return Vec::new();
    };
    if lead == 0.0 || rest.is_empty() {
        return Vec::new();
    }
    let monic: Vec<Complex64> = rest.iter().map(|c| Complex64::new(c / lead, 0.0)).collect();
    let degree = monic.len();
    let eval = |z: Complex64| monic.iter().fold(Complex64::new(1.0, 0.0), |acc, c| acc * z + c);

    let seed = Complex64::new(0.4, 0.9);
    let mut roots: Vec<Complex64> = (0..degree).map(|k| seed.powu(k as u32)).collect();

    for _ in 0..MAX_ITERATIONS {
        let mut shift = 0.0_f64;
        for i in 0..degree {
            let zi = roots[i];
            let denom = roots
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .fold(Complex64::new(1.0, 0.0), |acc, (_, zj)| acc * (zi - zj));
            if denom.norm() == 0.0 {
                continue;
            }
            let step = eval(zi) / denom;
            roots[i] = zi - step;
            shift = shift.max(step.norm());
        }
        if shift < CONVERGENCE {
            break;
        }
    }

    roots.into_iter().map(canonicalize_root).collect()
}

fn canonicalize_root(z: Complex64) -> Complex64 {
    let mut real = z.re;
    let mut imag = z.im;
    if imag.abs() <= REAL_TOLERANCE * (1.0 + real.abs()) {
        imag = 0.0;
    }
    if real.abs() <= REAL_TOLERANCE {
        real = 0.0;
    }
    Complex64::new(real, imag)
}

fn complex_expr(z: Complex64) -> Expr {
    let re = Expr::float(z.re).unwrap_or_else(|| Expr::integer(0));
    if z.im == 0.0 {
        return re;
    }
    let im = Expr::float(z.im).unwrap_or_else(|| Expr::integer(0));
    simplify(add(re, mul(im, Expr::Imaginary)))
}

/// Real roots ascending, then complex roots by real then imaginary part. Roots that do not
/// evaluate (symbolic ones) keep their relative order at the end.
///
/// Parts are compared on a grid of `REAL_TOLERANCE`, so a conjugate pair whose real parts
/// differ by rounding noise still orders by imaginary part.
pub(crate) fn order_roots(roots: Vec<Expr>) -> Vec<Expr> {
    let mut keyed: Vec<(Option<Complex64>, Expr)> =
        roots.into_iter().map(|r| (evaluate(&r), r)).collect();
    keyed.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => {
            let a_complex = !is_real(*a);
            let b_complex = !is_real(*b);
            a_complex
                .cmp(&b_complex)
                .then(quantize(a.re).total_cmp(&quantize(b.re)))
                .then(quantize(a.im).total_cmp(&quantize(b.im)))
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    keyed.into_iter().map(|(_, r)| r).collect()
}

fn quantize(v: f64) -> f64 {
    (v / REAL_TOLERANCE).round()
}

pub(crate) fn is_real(z: Complex64) -> bool {
    z.im.abs() <= REAL_TOLERANCE * (1.0 + z.re.abs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::pretty;
    use crate::parser::parse_expr;

    fn poly(text: &str) -> Poly {
        Poly::from_expr(&parse_expr(text).expect("parse"), "x").expect("polynomial")
    }

    fn numeric(roots: &[Expr]) -> Vec<Complex64> {
        roots.iter().map(|r| evaluate(r).expect("numeric root")).collect()
    }

    #[test]
    fn rational_roots_are_exact() {
        let roots = order_roots(rational_poly_roots(&poly("2x^3 - 3x^2 - 3x + 2")));
        assert_eq!(
            roots,
            vec![
                Expr::integer(-1),
                Expr::Constant(Rational::new(1.into(), 2.into())),
                Expr::integer(2),
            ]
        );
    }

    #[test]
    fn repeated_roots_are_reported_once() {
        let roots = rational_poly_roots(&poly("(x - 3)^2"));
        assert_eq!(roots, vec![Expr::integer(3)]);
    }

    #[test]
    fn irrational_quadratic_uses_square_roots() {
        let roots = order_roots(rational_poly_roots(&poly("x^2 - 2")));
        let values = numeric(&roots);
        assert!((values[0].re + 2.0_f64.sqrt()).abs() < 1e-12);
        assert!((values[1].re - 2.0_f64.sqrt()).abs() < 1e-12);
        assert!(roots[1].contains(&sqrt(Expr::integer(2))));
    }

    #[test]
    fn complex_pair_follows_real_roots() {
        let roots = order_roots(rational_poly_roots(&poly("(x - 1)(x^2 + 1)")));
        let values = numeric(&roots);
        assert_eq!(values.len(), 3);
        assert_eq!(values[0], Complex64::new(1.0, 0.0));
        assert!((values[1].im + 1.0).abs() < 1e-12);
        assert!((values[2].im - 1.0).abs() < 1e-12);
    }

    #[test]
    fn higher_degree_falls_back_to_numeric_roots() {
        let roots = order_roots(rational_poly_roots(&poly("x^3 - 2")));
        let values = numeric(&roots);
        assert_eq!(values.len(), 3);
        assert!((values[0].re - 2.0_f64.cbrt()).abs() < 1e-9);
        assert_eq!(values[0].im, 0.0);
        assert!(!is_real(values[1]));
    }

    #[test]
    fn conjugates_with_noisy_real_parts_order_by_imaginary_part() {
        let root = |re: f64, im: f64| complex_expr(Complex64::new(re, im));
        let roots = order_roots(vec![
            root(0.5 - 1e-13, 0.75),
            root(0.5 + 1e-13, -0.75),
            Expr::integer(-1),
        ]);
        let values = numeric(&roots);
        assert_eq!(values[0], Complex64::new(-1.0, 0.0));
        assert!(values[1].im < 0.0);
        assert!(values[2].im > 0.0);
    }

    #[test]
    fn divisor_heavy_coefficients_fall_back_to_numeric_roots() {
        // 963761198400 has 6720 divisors.
        let big = poly("963761198400x^3 + x + 963761198400");
        assert_eq!(find_rational_root(&big), None);
        let values = numeric(&order_roots(rational_poly_roots(&big)));
        assert_eq!(values.len(), 3);
        assert!((values[0].re + 1.0).abs() < 1e-6);
        assert!(values[1].im < 0.0 && values[2].im > 0.0);
    }

    #[test]
    fn divisors_are_sorted_and_bounded() {
        assert_eq!(divisors(&BigInt::from(-12)), Some(vec![1, 2, 3, 4, 6, 12]));
        assert_eq!(divisors(&BigInt::from(0)), None);
        assert_eq!(divisors(&BigInt::from(MAX_DIVISOR_SEARCH + 1)), None);
    }

    #[test]
    fn symbolic_quadratic_roots_are_simplified() {
        let expr = parse_expr("x^2 - y").expect("parse");
        let poly = Polynomial::<Expr>::from_expr(&expr, "x").expect("polynomial");
        let roots = symbolic_poly_roots(&poly).expect("solvable");
        let rendered: Vec<String> = roots.iter().map(pretty).collect();
        assert_eq!(rendered, ["-sqrt(y)", "sqrt(y)"]);
    }

    #[test]
    fn symbolic_linear_root() {
        let expr = parse_expr("a*x - b").expect("parse");
        let poly = Polynomial::<Expr>::from_expr(&expr, "x").expect("polynomial");
        let roots = symbolic_poly_roots(&poly).expect("solvable");
        assert_eq!(roots.len(), 1);
        assert!(roots[0].contains(&Expr::var("a")));
        assert!(roots[0].contains(&Expr::var("b")));
    }

    #[test]
    fn symbolic_cubic_is_unsupported() {
        let expr = parse_expr("a*x^3 - 1").expect("parse");
        let poly = Polynomial::<Expr>::from_expr(&expr, "x").expect("polynomial");
        assert!(matches!(
            symbolic_poly_roots(&poly),
            Err(CasError::Unsupported(_))
        ));
    }
}
