//! String-based convenience API for quick experimentation.

pub use crate::ui::{norm, parse, simp, simplify, solve, solve_for};
