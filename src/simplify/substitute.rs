use crate::expr::Expr;

/// Substitute variable `var` with `replacement` throughout `expr`.
pub fn substitute(expr: &Expr, var: &str, replacement: &Expr) -> Expr {
    match expr {
        Expr::Variable(name) if name == var => replacement.clone(),
        other => other.map_args(|arg| substitute(arg, var, replacement)),
    }
}
