use num_complex::Complex64;
use num_traits::ToPrimitive;

use crate::expr::Expr;

/// Evaluate a closed expression numerically.
///
/// Returns `None` if a variable remains or the result is not finite (division by zero,
/// logarithm of zero).
pub fn evaluate(expr: &Expr) -> Option<Complex64> {
    let value = eval(expr)?;
    if value.re.is_finite() && value.im.is_finite() {
        Some(value)
    } else {
        None
    }
}

fn eval(expr: &Expr) -> Option<Complex64> {
    let value = match expr {
        Expr::Variable(_) => return None,
        Expr::Constant(r) => Complex64::new(r.to_f64()?, 0.0),
        Expr::Imaginary => Complex64::i(),
        Expr::Pi => Complex64::new(std::f64::consts::PI, 0.0),
        Expr::Euler => Complex64::new(std::f64::consts::E, 0.0),
        Expr::Add(a, b) => eval(a)? + eval(b)?,
        Expr::Sub(a, b) => eval(a)? - eval(b)?,
        Expr::Mul(a, b) => eval(a)? * eval(b)?,
        Expr::Div(a, b) => {
            let denom = eval(b)?;
            if denom == Complex64::new(0.0, 0.0) {
                return None;
            }
            eval(a)? / denom
        }
        Expr::Pow(base, exp) => power(base, exp)?,
        Expr::Neg(a) => -eval(a)?,
        Expr::Sin(a) => eval(a)?.sin(),
        Expr::Cos(a) => eval(a)?.cos(),
        Expr::Tan(a) => eval(a)?.tan(),
        Expr::Asin(a) => eval(a)?.asin(),
        Expr::Acos(a) => eval(a)?.acos(),
        Expr::Atan(a) => eval(a)?.atan(),
        Expr::Exp(a) => eval(a)?.exp(),
        Expr::Log(a) => eval(a)?.ln(),
        Expr::Abs(a) => Complex64::new(eval(a)?.norm(), 0.0),
    };
    Some(value)
}

fn power(base: &Expr, exp: &Expr) -> Option<Complex64> {
    let b = eval(base)?;
    if let Some(e) = exp.as_constant() {
        if e.is_integer() {
            if let Some(k) = e.to_integer().to_i32() {
                return Some(b.powi(k));
            }
        }
        // Principal square root keeps `sqrt(-4)` on the positive imaginary axis.
        if *e.denom() == 2.into() && *e.numer() == 1.into() {
            return Some(b.sqrt());
        }
    }
    Some(b.powc(eval(exp)?))
}
