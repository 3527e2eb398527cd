use num_complex::Complex64;

use crate::engine::{Binding, SymbolicEngine};

use super::pretty;

/// Imaginary parts below this (relative to the real part) are treated as rounding noise.
const REAL_TOLERANCE: f64 = 1e-12;

/// Render a solution set as `x = "8.0", x = "-2.0"`.
///
/// Numeric values get exactly one fractional digit; anything still holding a free symbol is
/// printed symbolically.
pub fn format_solutions(engine: &dyn SymbolicEngine, variable: &str, solutions: &[Binding]) -> String {
    if solutions.is_empty() {
        return format!("No solution found for {variable}.");
    }

    solutions
        .iter()
        .map(|binding| {
            let value = engine.simplify(&binding.value);
            let rendered = if value.is_closed() {
                engine
                    .evalf(&value)
                    .map(format_number)
                    .unwrap_or_else(|| pretty(&value))
            } else {
                pretty(&value)
            };
            format!("{} = \"{rendered}\"", binding.variable)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// One-decimal rendering of a numeric value; complex values as `re + im*I`.
pub fn format_number(value: Complex64) -> String {
    if value.im.abs() <= REAL_TOLERANCE * (1.0 + value.re.abs()) {
        return one_decimal(value.re);
    }
    let re = one_decimal(value.re);
    let im = one_decimal(value.im.abs());
    if value.im < 0.0 {
        format!("{re} - {im}*I")
    } else {
        format!("{re} + {im}*I")
    }
}

fn one_decimal(value: f64) -> String {
    let text = format!("{value:.1}");
    if text == "-0.0" { "0.0".to_string() } else { text }
}
