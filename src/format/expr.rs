use crate::expr::{Expr, Rational};
use num_traits::{One, Signed, Zero};

// Binding strength of the rendered node: 1 sum, 2 product, 3 power, 4 atom.
const SUM: u8 = 1;
const PRODUCT: u8 = 2;
const POWER: u8 = 3;
const ATOM: u8 = 4;

/// Render an expression as `10 - y`, `3*x/2`, `sqrt(2)*I`, `x**3`.
pub fn pretty(expr: &Expr) -> String {
    pp(0, expr)
}

fn pp(ctx: u8, expr: &Expr) -> String {
    match expr {
        Expr::Variable(v) => v.clone(),
        Expr::Constant(r) => show_constant(ctx, r),
        Expr::Imaginary => "I".to_string(),
        Expr::Pi => "pi".to_string(),
        Expr::Euler => "E".to_string(),

        Expr::Add(_, _) | Expr::Sub(_, _) => sum(ctx, expr),
        Expr::Mul(_, _) | Expr::Div(_, _) | Expr::Neg(_) => product(ctx, expr),

        Expr::Pow(base, exp) => match exp.as_constant() {
            Some(e) if *e == Rational::new(1.into(), 2.into()) => {
                format!("sqrt({})", pp(0, base))
            }
            Some(e) if e.is_negative() => product(ctx, expr),
            _ => bracket(ctx, POWER, format!("{}**{}", pp(ATOM, base), pp(ATOM, exp))),
        },

        Expr::Sin(a) => format!("sin({})", pp(0, a)),
        Expr::Cos(a) => format!("cos({})", pp(0, a)),
        Expr::Tan(a) => format!("tan({})", pp(0, a)),
        Expr::Asin(a) => format!("asin({})", pp(0, a)),
        Expr::Acos(a) => format!("acos({})", pp(0, a)),
        Expr::Atan(a) => format!("atan({})", pp(0, a)),
        Expr::Exp(a) => format!("exp({})", pp(0, a)),
        Expr::Log(a) => format!("log({})", pp(0, a)),
        Expr::Abs(a) => format!("Abs({})", pp(0, a)),
    }
}

fn sum(ctx: u8, expr: &Expr) -> String {
    let mut terms = Vec::new();
    flatten_sum(expr, false, &mut terms);

    // Lead with a positive term when there is one: `10 - y`, not `-y + 10`.
    if let Some(pos) = terms.iter().position(|(negative, _)| !negative) {
        let lead = terms.remove(pos);
        terms.insert(0, lead);
    }

    let mut body = String::new();
    for (i, (negative, term)) in terms.iter().enumerate() {
        let rendered = pp(SUM, term);
        match (i, negative) {
            (0, false) => body.push_str(&rendered),
            (0, true) => body.push_str(&format!("-{rendered}")),
            (_, false) => body.push_str(&format!(" + {rendered}")),
            (_, true) => body.push_str(&format!(" - {rendered}")),
        }
    }
    bracket(ctx, SUM, body)
}

fn flatten_sum(expr: &Expr, negative: bool, out: &mut Vec<(bool, Expr)>) {
    match expr {
        Expr::Add(a, b) => {
            flatten_sum(a, negative, out);
            flatten_sum(b, negative, out);
        }
        Expr::Sub(a, b) => {
            flatten_sum(a, negative, out);
            flatten_sum(b, !negative, out);
        }
        Expr::Neg(inner) => flatten_sum(inner, !negative, out),
        other => {
            let (flip, magnitude) = split_neg(other);
            out.push((negative ^ flip, magnitude));
        }
    }
}

/// Pull a leading sign out of a term: `-3*x` becomes `(true, 3*x)`.
fn split_neg(expr: &Expr) -> (bool, Expr) {
    match expr {
        Expr::Neg(inner) => {
            let (flip, magnitude) = split_neg(inner);
            (!flip, magnitude)
        }
        Expr::Constant(r) if r.is_negative() => (true, Expr::Constant(-r)),
        Expr::Mul(a, b) => {
            let (na, a) = split_neg(a);
            let (nb, b) = split_neg(b);
            (na ^ nb, Expr::Mul(a.boxed(), b.boxed()))
        }
        Expr::Div(a, b) => {
            let (na, a) = split_neg(a);
            let (nb, b) = split_neg(b);
            (na ^ nb, Expr::Div(a.boxed(), b.boxed()))
        }
        other => (false, other.clone()),
    }
}

#[derive(Default)]
struct Factors {
    negative: bool,
    coeff_numer: Vec<Rational>,
    coeff_denom: Vec<Rational>,
    numer: Vec<Expr>,
    denom: Vec<Expr>,
}

impl Factors {
    fn collect(&mut self, expr: &Expr, inverted: bool) {
        match expr {
            Expr::Mul(a, b) => {
                self.collect(a, inverted);
                self.collect(b, inverted);
            }
            Expr::Div(a, b) => {
                self.collect(a, inverted);
                self.collect(b, !inverted);
            }
            Expr::Neg(inner) => {
                self.negative = !self.negative;
                self.collect(inner, inverted);
            }
            Expr::Constant(r) if !r.is_zero() => {
                if r.is_negative() {
                    self.negative = !self.negative;
                }
                let r = r.abs();
                if inverted {
                    self.coeff_denom.push(r);
                } else {
                    self.coeff_numer.push(r);
                }
            }
            Expr::Pow(base, exp) => match exp.as_constant() {
                Some(e) if e.is_negative() => {
                    let flipped = if (-e).is_one() {
                        base.as_ref().clone()
                    } else {
                        Expr::Pow(base.clone(), Expr::Constant(-e).boxed())
                    };
                    self.push(flipped, !inverted);
                }
                _ => self.push(expr.clone(), inverted),
            },
            other => self.push(other.clone(), inverted),
        }
    }

    fn push(&mut self, factor: Expr, inverted: bool) {
        if inverted {
            self.denom.push(factor);
        } else {
            self.numer.push(factor);
        }
    }

    fn coefficient(&self) -> Rational {
        let numer: Rational = self.coeff_numer.iter().cloned().product();
        let denom: Rational = self.coeff_denom.iter().cloned().product();
        numer / denom
    }
}

fn product(ctx: u8, expr: &Expr) -> String {
    let mut factors = Factors::default();
    factors.collect(expr, false);
    let coeff = factors.coefficient();

    // Numbers, then I, then symbols: `sqrt(2)*I`, `2*I*y`.
    factors.numer.sort_by_key(|f| match f {
        Expr::Imaginary => 1,
        f if f.is_closed() => 0,
        _ => 2,
    });

    let mut numer: Vec<String> = Vec::new();
    if !coeff.numer().is_one() {
        numer.push(coeff.numer().to_string());
    }
    numer.extend(factors.numer.iter().map(|f| pp(PRODUCT, f)));
    if numer.is_empty() {
        numer.push("1".to_string());
    }

    let mut denom: Vec<String> = Vec::new();
    if !coeff.denom().is_one() {
        denom.push(coeff.denom().to_string());
    }
    let single = denom.len() + factors.denom.len() == 1;
    let denom_ctx = if single { POWER } else { PRODUCT };
    denom.extend(factors.denom.iter().map(|f| pp(denom_ctx, f)));

    let mut body = numer.join("*");
    match denom.len() {
        0 => {}
        1 => body = format!("{body}/{}", denom[0]),
        _ => body = format!("{body}/({})", denom.join("*")),
    }
    if factors.negative {
        body = format!("-{body}");
    }
    bracket(ctx, PRODUCT, body)
}

fn bracket(ctx: u8, prec: u8, body: String) -> String {
    if prec < ctx {
        format!("({body})")
    } else {
        body
    }
}

fn show_constant(ctx: u8, r: &Rational) -> String {
    let body = if r.is_integer() {
        r.numer().to_string()
    } else {
        format!("{}/{}", r.numer(), r.denom())
    };
    let prec = if r.is_negative() {
        SUM
    } else if r.is_integer() {
        ATOM
    } else {
        PRODUCT
    };
    bracket(ctx, prec, body)
}
