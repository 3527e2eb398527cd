use crate::expr::{Expr, one};
use crate::simplify::simplify;
use num_traits::ToPrimitive;

use crate::polynomial::MAX_DEGREE;

/// `numer / denom` over a common denominator.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Fraction {
    pub numer: Expr,
    pub denom: Expr,
}

impl Fraction {
    fn whole(expr: Expr) -> Self {
        Fraction {
            numer: expr,
            denom: one(),
        }
    }
}

/// Bring `expr` over a single denominator, so its zeros are the zeros of `numer` away from
/// the zeros of `denom`.
pub(crate) fn together(expr: &Expr) -> Fraction {
    let raw = combine(expr);
    Fraction {
        numer: simplify(raw.numer),
        denom: simplify(raw.denom),
    }
}

fn combine(expr: &Expr) -> Fraction {
    match expr {
        Expr::Add(a, b) => sum(combine(a), combine(b), false),
        Expr::Sub(a, b) => sum(combine(a), combine(b), true),
        Expr::Mul(a, b) => {
            let (fa, fb) = (combine(a), combine(b));
            Fraction {
                numer: product(fa.numer, fb.numer),
                denom: product(fa.denom, fb.denom),
            }
        }
        Expr::Div(a, b) => {
            let (fa, fb) = (combine(a), combine(b));
            Fraction {
                numer: product(fa.numer, fb.denom),
                denom: product(fa.denom, fb.numer),
            }
        }
        Expr::Neg(a) => {
            let fa = combine(a);
            Fraction {
                numer: Expr::Neg(fa.numer.boxed()),
                denom: fa.denom,
            }
        }
        Expr::Pow(base, exp) => match integer_exponent(exp) {
            Some(k) => {
                let fb = combine(base);
                let (numer, denom) = if k < 0 {
                    (fb.denom, fb.numer)
                } else {
                    (fb.numer, fb.denom)
                };
                let k = Expr::integer(k.unsigned_abs());
                Fraction {
                    numer: power(numer, k.clone()),
                    denom: power(denom, k),
                }
            }
            None => Fraction::whole(expr.clone()),
        },
        other => Fraction::whole(other.clone()),
    }
}

fn sum(a: Fraction, b: Fraction, subtract: bool) -> Fraction {
    let rhs = |numer: Expr| {
        if subtract {
            Expr::Neg(numer.boxed())
        } else {
            numer
        }
    };
    if a.denom == b.denom {
        return Fraction {
            numer: Expr::Add(a.numer.boxed(), rhs(b.numer).boxed()),
            denom: a.denom,
        };
    }
    Fraction {
        numer: Expr::Add(
            product(a.numer, b.denom.clone()).boxed(),
            rhs(product(b.numer, a.denom.clone())).boxed(),
        ),
        denom: product(a.denom, b.denom),
    }
}

fn product(a: Expr, b: Expr) -> Expr {
    if a.is_one() {
        b
    } else if b.is_one() {
        a
    } else {
        Expr::Mul(a.boxed(), b.boxed())
    }
}

fn power(base: Expr, exp: Expr) -> Expr {
    if base.is_one() || exp.is_one() {
        base
    } else {
        Expr::Pow(base.boxed(), exp.boxed())
    }
}

fn integer_exponent(exp: &Expr) -> Option<i64> {
    // `x^-2` parses with a negated exponent, so fold closed exponents first.
    let k = match exp {
        Expr::Constant(k) => k.clone(),
        other if other.is_closed() => simplify(other.clone()).as_constant()?.clone(),
        _ => return None,
    };
    if !k.is_integer() {
        return None;
    }
    k.to_integer()
        .to_i64()
        .filter(|k| k.unsigned_abs() <= MAX_DEGREE as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_expr;

    #[test]
    fn sums_of_fractions_share_a_denominator() {
        let fraction = together(&parse_expr("1/x + 1/(x + 1)").expect("parse"));
        assert_eq!(fraction.numer, simplify(parse_expr("2x + 1").expect("parse")));
        assert_eq!(fraction.denom, simplify(parse_expr("x*(x + 1)").expect("parse")));
    }

    #[test]
    fn negative_powers_move_down() {
        let fraction = together(&parse_expr("x^-2 - 4").expect("parse"));
        assert_eq!(fraction.denom, simplify(parse_expr("x^2").expect("parse")));
        assert_eq!(fraction.numer, simplify(parse_expr("1 - 4x^2").expect("parse")));
    }

    #[test]
    fn polynomials_keep_a_unit_denominator() {
        let fraction = together(&parse_expr("x^2 - 4").expect("parse"));
        assert!(fraction.denom.is_one());
    }
}
