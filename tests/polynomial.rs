use num_traits::Zero;
use eqsolve::{Poly, Rational, parse_expr};

fn poly(input: &str) -> Poly {
    let expr = parse_expr(input).expect("parse polynomial");
    Poly::from_expr(&expr, "x").expect("build polynomial")
}

#[test]
fn polynomial_division_exact() {
    let dividend = poly("x^3 - 1");
    let divisor = poly("x - 1");
    let (quotient, remainder) = dividend.div_rem(&divisor);
    assert!(remainder.is_zero());
    assert_eq!(quotient, poly("x^2 + x + 1"));
}

#[test]
fn polynomial_division_remainder() {
    let dividend = poly("x^3 + x + 1");
    let divisor = poly("x^2 + 1");
    let (quotient, remainder) = dividend.div_rem(&divisor);
    assert_eq!(quotient, poly("x"));
    assert_eq!(remainder, poly("1"));
}

#[test]
fn polynomial_division_non_exact() {
    let dividend = poly("x^2 + 1");
    let divisor = poly("x + 1");
    assert!(dividend.div_exact(&divisor).is_none());
}

#[test]
fn polynomial_gcd_is_monic() {
    let a = poly("x^2 - 1");
    let b = poly("x^2 - x");
    let gcd = Poly::gcd(&a, &b);
    assert_eq!(gcd, poly("x - 1"));
}

#[test]
fn polynomial_gcd_ignores_content() {
    let a = poly("2*x^2 + 2*x");
    let b = poly("4*x");
    let gcd = Poly::gcd(&a, &b);
    assert_eq!(gcd, poly("x"));
}

#[test]
fn polynomial_content_and_primitive_part() {
    let polynomial = poly("2/3*x^2 + 4/3*x + 2/3");
    let (content, primitive) = polynomial.content_and_primitive_part();
    assert_eq!(content, Rational::new(2.into(), 3.into()));
    assert_eq!(primitive, poly("x^2 + 2*x + 1"));
    assert_eq!(primitive.scale(&content), polynomial);
}

#[test]
fn polynomial_content_sign_normalizes_leading_coeff() {
    let polynomial = poly("-2*x^2 - 4*x");
    let (content, primitive) = polynomial.content_and_primitive_part();
    assert_eq!(content, Rational::from_integer((-2).into()));
    assert_eq!(primitive, poly("x^2 + 2*x"));
    assert_eq!(primitive.scale(&content), polynomial);
}

#[test]
fn polynomial_content_zero_is_zero() {
    let polynomial = poly("0");
    let (content, primitive) = polynomial.content_and_primitive_part();
    assert!(content.is_zero());
    assert!(primitive.is_zero());
}

#[test]
fn polynomial_square_free_part_keeps_each_root_once() {
    let polynomial = poly("(x - 2)^3*(x + 1)");
    let square_free = polynomial.square_free_part().monic();
    assert_eq!(square_free, poly("x^2 - x - 2"));
}

#[test]
fn polynomial_evaluate_and_derivative() {
    let polynomial = poly("x^3 - 2*x + 5");
    assert_eq!(
        polynomial.evaluate(&Rational::from_integer(2.into())),
        Rational::from_integer(9.into())
    );
    assert_eq!(polynomial.derivative(), poly("3*x^2 - 2"));
}

#[test]
fn polynomial_rejects_non_polynomial_terms() {
    for input in ["sin(x)", "1/x", "x^(1/2)", "x*y", "abs(x)"] {
        let expr = parse_expr(input).expect("parse");
        assert!(Poly::from_expr(&expr, "x").is_none(), "{input}");
    }
}

#[test]
fn polynomial_folds_closed_coefficients() {
    assert_eq!(poly("x*2^3 + sqrt(9)"), poly("8x + 3"));
}
