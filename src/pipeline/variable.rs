use crate::engine::Equation;
use crate::error::{CasError, Result};

/// The symbol to solve for: the only one, or the first by name when there are several.
pub fn select_variable(equation: &Equation) -> Result<String> {
    // BTreeSet iterates in name order.
    equation
        .free_symbols()
        .into_iter()
        .next()
        .ok_or(CasError::NoVariable)
}
