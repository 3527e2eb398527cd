use std::collections::HashMap;

use crate::expr::{Expr, Rational, one, zero};
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, ToPrimitive, Zero};

const DISTRIBUTE_TERM_LIMIT: usize = 64;
const MAX_EXACT_POWER: u32 = 1024;
const SQUARE_FACTOR_LIMIT: u32 = 100_000;

#[derive(Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
struct CanonKey(Vec<Expr>);

pub fn simplify(expr: Expr) -> Expr {
    let mut cache = HashMap::new();
    simplify_cached(expr, &mut cache)
}

fn simplify_cached(expr: Expr, cache: &mut HashMap<Expr, Expr>) -> Expr {
    if let Some(hit) = cache.get(&expr) {
        return hit.clone();
    }

    let key = expr.clone();
    let result = match expr {
        Expr::Add(a, b) => simplify_add(simplify_cached(*a, cache), simplify_cached(*b, cache)),
        Expr::Sub(a, b) => simplify_sub(simplify_cached(*a, cache), simplify_cached(*b, cache)),
        Expr::Mul(a, b) => simplify_mul(simplify_cached(*a, cache), simplify_cached(*b, cache)),
        Expr::Div(a, b) => simplify_div(simplify_cached(*a, cache), simplify_cached(*b, cache)),
        Expr::Pow(a, b) => simplify_pow(simplify_cached(*a, cache), simplify_cached(*b, cache)),
        Expr::Neg(a) => simplify_neg(simplify_cached(*a, cache)),

        Expr::Sin(a) => match simplify_cached(*a, cache) {
            x if is_zero(&x) => zero(),
            Expr::Neg(inner) => simplify_neg(Expr::Sin(inner)),
            x => Expr::Sin(x.boxed()),
        },

        Expr::Cos(a) => match simplify_cached(*a, cache) {
            x if is_zero(&x) => one(),
            Expr::Neg(inner) => Expr::Cos(inner),
            x => Expr::Cos(x.boxed()),
        },

        Expr::Tan(a) => match simplify_cached(*a, cache) {
            x if is_zero(&x) => zero(),
            x => Expr::Tan(x.boxed()),
        },

        Expr::Atan(a) => match simplify_cached(*a, cache) {
            x if is_zero(&x) => zero(),
            Expr::Neg(inner) => simplify_neg(Expr::Atan(inner)),
            x => Expr::Atan(x.boxed()),
        },

        Expr::Asin(a) => match simplify_cached(*a, cache) {
            x if is_zero(&x) => zero(),
            Expr::Neg(inner) => simplify_neg(Expr::Asin(inner)),
            x => Expr::Asin(x.boxed()),
        },

        Expr::Acos(a) => Expr::Acos(simplify_cached(*a, cache).boxed()),

        Expr::Exp(a) => match simplify_cached(*a, cache) {
            x if is_zero(&x) => one(),
            Expr::Log(inner) => *inner,
            x => Expr::Exp(x.boxed()),
        },

        Expr::Log(a) => match simplify_cached(*a, cache) {
            x if is_one(&x) => zero(),
            Expr::Euler => one(),
            Expr::Exp(inner) => *inner,
            x => Expr::Log(x.boxed()),
        },

        Expr::Abs(a) => match simplify_cached(*a, cache) {
            Expr::Constant(c) => Expr::Constant(c.abs()),
            Expr::Neg(inner) => Expr::Abs(inner),
            inner @ Expr::Abs(_) => inner,
            x => Expr::Abs(x.boxed()),
        },

        e => e,
    };

    cache.insert(key, result.clone());
    result
}

/// Apply simplification passes until the expression stops changing or we hit the iteration cap.
pub fn simplify_fully(expr: Expr) -> Expr {
    simplify_with_limit(expr, 64)
}

/// Apply simplification passes up to `max_iters`, returning the last value if convergence is not reached.
pub fn simplify_with_limit(expr: Expr, max_iters: usize) -> Expr {
    let mut cache = HashMap::new();
    let mut current = expr;
    for _ in 0..max_iters {
        let next = simplify_cached(current.clone(), &mut cache);
        if next == current {
            return current;
        }
        current = next;
    }
    current
}

pub fn simplify_add(x: Expr, y: Expr) -> Expr {
    rebuild_sum(collect_sum(flatten_sum(&x).into_iter().chain(flatten_sum(&y))))
}

pub fn simplify_sub(x: Expr, y: Expr) -> Expr {
    simplify_add(x, simplify_neg(y))
}

fn flatten_sum(expr: &Expr) -> Vec<Expr> {
    match expr {
        Expr::Add(a, b) => {
            let mut out = flatten_sum(a);
            out.extend(flatten_sum(b));
            out
        }
        Expr::Sub(a, b) => {
            let mut out = flatten_sum(a);
            out.extend(flatten_sum(b).into_iter().map(simplify_neg));
            out
        }
        Expr::Neg(a) => flatten_sum(a).into_iter().map(simplify_neg).collect(),
        other => vec![other.clone()],
    }
}

fn count_sum_terms(expr: &Expr) -> usize {
    match expr {
        Expr::Add(a, b) | Expr::Sub(a, b) => count_sum_terms(a) + count_sum_terms(b),
        Expr::Neg(inner) => count_sum_terms(inner),
        _ => 1,
    }
}

fn split_coeff(expr: &Expr) -> (Rational, Expr) {
    match expr {
        Expr::Constant(c) => (c.clone(), one()),
        Expr::Neg(e) => {
            let (c, b) = split_coeff(e);
            (-c, b)
        }
        Expr::Mul(a, b) => {
            let (ca, ba) = split_coeff(a);
            let (cb, bb) = split_coeff(b);
            (ca * cb, mul_norm(ba, bb))
        }
        other => (Rational::one(), other.clone()),
    }
}

fn canonical_factors(expr: &Expr) -> Vec<Expr> {
    let mut factors = factors(expr);
    factors.sort();
    factors
}

fn mul_from_sorted_factors(factors: &[Expr]) -> Expr {
    factors
        .iter()
        .cloned()
        .reduce(|acc, item| Expr::Mul(acc.boxed(), item.boxed()))
        .unwrap_or_else(one)
}

fn mul_norm(a: Expr, b: Expr) -> Expr {
    mk_mul_list(factors(&a).into_iter().chain(factors(&b)).collect())
}

fn factors(expr: &Expr) -> Vec<Expr> {
    match expr {
        Expr::Mul(a, b) => {
            let mut out = factors(a);
            out.extend(factors(b));
            out
        }
        t if is_one(t) => vec![],
        t => vec![t.clone()],
    }
}

fn collect_sum<I>(terms: I) -> HashMap<CanonKey, Rational>
where
    I: IntoIterator<Item = Expr>,
{
    let mut map = HashMap::new();
    for term in terms {
        let (c, b) = split_coeff(&term);
        if c.is_zero() {
            continue;
        }
        map.entry(CanonKey(canonical_factors(&b)))
            .and_modify(|acc| *acc += &c)
            .or_insert(c);
    }
    map
}

fn rebuild_sum(mut map: HashMap<CanonKey, Rational>) -> Expr {
    let const_term = map
        .remove(&CanonKey(Vec::new()))
        .unwrap_or_else(Rational::zero);
    let mut items: Vec<(CanonKey, Rational)> = map.into_iter().collect();
    items.sort_by(|(a, _), (b, _)| a.cmp(b));

    let mut terms: Vec<Expr> = items
        .into_iter()
        .filter(|(_, coef)| !coef.is_zero())
        .map(|(CanonKey(factors), coef)| term_from(&coef, mul_from_sorted_factors(&factors)))
        .collect();

    if !const_term.is_zero() {
        terms.push(Expr::Constant(const_term));
    }

    match terms.len() {
        0 => zero(),
        1 => terms.remove(0),
        _ => mk_add_list(terms),
    }
}

fn term_from(coef: &Rational, base: Expr) -> Expr {
    if coef.is_zero() {
        return zero();
    }
    if is_one(&base) {
        return Expr::Constant(coef.clone());
    }
    if coef.is_one() {
        return base;
    }
    if coef == &-Rational::one() {
        return simplify_neg(base);
    }
    Expr::Mul(Expr::Constant(coef.clone()).boxed(), base.boxed())
}

pub fn simplify_mul(x: Expr, y: Expr) -> Expr {
    match (x, y) {
        (x, y) if is_sum(&x) || is_sum(&y) => distribute(x, y),
        (Expr::Constant(xc), Expr::Constant(yc)) => Expr::Constant(xc * yc),
        (x, y) if is_zero(&x) || is_zero(&y) => zero(),
        (x, y) if is_one(&x) => y,
        (x, y) if is_one(&y) => x,
        (x, y) => {
            let (c, b) = split_coeff(&Expr::Mul(x.boxed(), y.boxed()));
            let (c, b) = combine_powers(c, &b);
            term_from(&c, b)
        }
    }
}

fn is_sum(expr: &Expr) -> bool {
    matches!(expr, Expr::Add(_, _) | Expr::Sub(_, _))
}

/// Expand a product of sums term by term, unless the expansion would be too large.
fn distribute(x: Expr, y: Expr) -> Expr {
    if count_sum_terms(&x) * count_sum_terms(&y) > DISTRIBUTE_TERM_LIMIT {
        return Expr::Mul(x.boxed(), y.boxed());
    }
    let right = flatten_sum(&y);
    let products: Vec<Expr> = flatten_sum(&x)
        .iter()
        .flat_map(|a| right.iter().map(move |b| simplify_mul(a.clone(), b.clone())))
        .collect();
    rebuild_sum(collect_sum(products.into_iter().flat_map(|term| flatten_sum(&term))))
}

/// Merge repeated factors into powers (`x*x` to `x^2`) and reduce powers of the imaginary unit.
fn combine_powers(coeff: Rational, core: &Expr) -> (Rational, Expr) {
    let mut exponents: Vec<(Expr, Rational)> = Vec::new();
    for factor in factors(core) {
        let (base, exp) = match factor {
            Expr::Pow(base, exp) => match *exp {
                Expr::Constant(k) => (*base, k),
                other => (Expr::Pow(base, other.boxed()), Rational::one()),
            },
            other => (other, Rational::one()),
        };
        match exponents.iter_mut().find(|(b, _)| *b == base) {
            Some((_, total)) => *total += exp,
            None => exponents.push((base, exp)),
        }
    }

    let mut coeff = coeff;
    let mut out = Vec::new();
    for (base, exp) in exponents {
        if exp.is_zero() {
            continue;
        }
        if base == Expr::Imaginary && exp.is_integer() {
            let (sign, unit) = imaginary_power(&exp.to_integer());
            coeff = coeff * sign;
            if unit {
                out.push(Expr::Imaginary);
            }
            continue;
        }
        if let (Expr::Constant(c), true) = (&base, exp.is_integer()) {
            match constant_pow(c.clone(), exp) {
                Expr::Constant(value) => coeff = coeff * value,
                other => out.push(other),
            }
            continue;
        }
        if exp.is_one() {
            out.push(base);
        } else {
            out.push(Expr::Pow(base.boxed(), Expr::Constant(exp).boxed()));
        }
    }
    (coeff, mk_mul_list(out))
}

/// `I^n` as a sign and whether a single `I` remains.
fn imaginary_power(n: &BigInt) -> (Rational, bool) {
    match n.mod_floor(&BigInt::from(4)).to_u8() {
        Some(0) => (Rational::one(), false),
        Some(1) => (Rational::one(), true),
        Some(2) => (-Rational::one(), false),
        _ => (-Rational::one(), true),
    }
}

pub fn simplify_div(x: Expr, y: Expr) -> Expr {
    match (x, y) {
        (Expr::Constant(n), Expr::Constant(d)) => {
            if d.is_zero() {
                Expr::Div(Expr::Constant(n).boxed(), Expr::Constant(d).boxed())
            } else {
                Expr::Constant(n / d)
            }
        }
        (x, _) if is_zero(&x) => zero(),
        (x, y) if is_one(&y) => x,
        (x, Expr::Constant(d)) if !d.is_zero() => {
            simplify_mul(Expr::Constant(Rational::one() / d), x)
        }
        (x, y) => {
            let (cx, bx) = split_coeff(&x);
            let (cy, by) = split_coeff(&y);
            if cy.is_zero() {
                return Expr::Div(x.boxed(), y.boxed());
            }
            let c = cx / cy;
            if bx == by && !is_one(&bx) {
                return Expr::Constant(c);
            }
            let core = if is_one(&by) {
                bx
            } else if is_sum(&by) {
                Expr::Div(bx.boxed(), by.boxed())
            } else {
                // Monomial denominators become negative powers so shared factors cancel.
                simplify_mul(bx, simplify_pow(by, Expr::Constant(-Rational::one())))
            };
            if c.is_one() {
                core
            } else {
                simplify_mul(Expr::Constant(c), core)
            }
        }
    }
}

pub fn simplify_pow(x: Expr, y: Expr) -> Expr {
    match (x, y) {
        (_, Expr::Constant(e)) if e.is_zero() => one(),
        (base, Expr::Constant(e)) if e.is_one() => base,
        (Expr::Constant(b), Expr::Constant(e)) => constant_pow(b, e),
        (Expr::Imaginary, Expr::Constant(e)) if e.is_integer() => {
            let (sign, unit) = imaginary_power(&e.to_integer());
            term_from(&sign, if unit { Expr::Imaginary } else { one() })
        }
        (Expr::Pow(base, inner), Expr::Constant(e)) if e.is_integer() => match *inner {
            Expr::Constant(k) if k.is_integer() => {
                simplify_pow(*base, Expr::Constant(k * e))
            }
            other => Expr::Pow(Expr::Pow(base, other.boxed()).boxed(), Expr::Constant(e).boxed()),
        },
        (x, y) => Expr::Pow(x.boxed(), y.boxed()),
    }
}

fn constant_pow(b: Rational, e: Rational) -> Expr {
    if e.is_integer() {
        let k: BigInt = e.to_integer();
        if let Some(power) = k.abs().to_u32().filter(|p| *p <= MAX_EXACT_POWER) {
            if k >= BigInt::zero() {
                return Expr::Constant(Rational::new(b.numer().pow(power), b.denom().pow(power)));
            } else if b.is_zero() {
                return Expr::Pow(Expr::Constant(b).boxed(), Expr::Constant(e).boxed());
            } else {
                return Expr::Constant(Rational::new(b.denom().pow(power), b.numer().pow(power)));
            }
        }
        return Expr::Pow(Expr::Constant(b).boxed(), Expr::Constant(e).boxed());
    }

    if e == Rational::new(1.into(), 2.into()) {
        if b.is_negative() {
            let root = constant_pow(-b, e);
            return simplify_mul(root, Expr::Imaginary);
        }
        if let Some(root) = perfect_square(&b) {
            return Expr::Constant(root);
        }
        // sqrt(p/q) = sqrt(p*q)/q, then pull square factors out: sqrt(8) = 2*sqrt(2).
        let radicand = b.numer() * b.denom();
        let (outside, inside) =
            split_square_factor(&radicand).unwrap_or_else(|| (BigInt::one(), radicand));
        if !outside.is_one() || !b.denom().is_one() {
            let coeff = Rational::new(outside, b.denom().clone());
            let root = Expr::Pow(
                Expr::Constant(Rational::from_integer(inside)).boxed(),
                Expr::Constant(e).boxed(),
            );
            return term_from(&coeff, root);
        }
    }
    Expr::Pow(Expr::Constant(b).boxed(), Expr::Constant(e).boxed())
}

pub(crate) fn perfect_square(r: &Rational) -> Option<Rational> {
    if r.is_negative() {
        return None;
    }
    let num_root = integer_sqrt_exact(r.numer())?;
    let den_root = integer_sqrt_exact(r.denom())?;
    Some(Rational::new(num_root, den_root))
}

/// `n = outside^2 * inside` with the largest square found by trial division, or `None` when
/// nothing can be pulled out.
fn split_square_factor(n: &BigInt) -> Option<(BigInt, BigInt)> {
    if !n.is_positive() || n.bits() > 64 {
        return None;
    }
    let mut inside = n.clone();
    let mut outside = BigInt::one();
    let mut d = BigInt::from(2);
    while &d * &d <= inside && d <= BigInt::from(SQUARE_FACTOR_LIMIT) {
        let square = &d * &d;
        while inside.is_multiple_of(&square) {
            inside /= &square;
            outside *= &d;
        }
        d += 1;
    }
    if outside.is_one() { None } else { Some((outside, inside)) }
}

fn integer_sqrt_exact(n: &BigInt) -> Option<BigInt> {
    if n.is_negative() {
        return None;
    }
    let root = n.sqrt();
    if &root * &root == *n { Some(root) } else { None }
}

pub fn simplify_neg(expr: Expr) -> Expr {
    match expr {
        Expr::Constant(x) => Expr::Constant(-x),
        Expr::Neg(x) => *x,
        sum @ (Expr::Add(_, _) | Expr::Sub(_, _)) => {
            rebuild_sum(collect_sum(flatten_sum(&sum).into_iter().map(simplify_neg)))
        }
        Expr::Mul(a, b) => match *a {
            Expr::Constant(c) => term_from(&-c, *b),
            other => Expr::Neg(Expr::Mul(other.boxed(), b).boxed()),
        },
        other => Expr::Neg(other.boxed()),
    }
}

fn is_zero(expr: &Expr) -> bool {
    matches!(expr, Expr::Constant(r) if r.is_zero())
}

fn is_one(expr: &Expr) -> bool {
    matches!(expr, Expr::Constant(r) if r.is_one())
}

fn mk_add_list(items: Vec<Expr>) -> Expr {
    items
        .into_iter()
        .reduce(|acc, item| Expr::Add(acc.boxed(), item.boxed()))
        .unwrap_or_else(zero)
}

fn mk_mul_list(mut items: Vec<Expr>) -> Expr {
    items.retain(|e| !is_one(e));
    items.sort();
    mul_from_sorted_factors(&items)
}
