use eqsolve::{
    CasError, Expr, NativeEngine, ParseContext, add, mul, parse_equation, select_variable,
};

fn parse(text: &str) -> Result<eqsolve::Equation, CasError> {
    parse_equation(&NativeEngine::new(), text)
}

#[test]
fn splits_on_first_equals() {
    let equation = parse("x + 5 = 10").expect("parse");
    assert_eq!(equation.lhs, add(Expr::var("x"), Expr::integer(5)));
    assert_eq!(equation.rhs, Expr::integer(10));
}

#[test]
fn missing_equals_means_equal_to_zero() {
    let equation = parse("x**2 - 4").expect("parse");
    assert!(equation.rhs.is_zero());
}

#[test]
fn implicit_multiplication_on_both_sides() {
    let equation = parse("2x = 3y").expect("parse");
    assert_eq!(equation.lhs, mul(Expr::integer(2), Expr::var("x")));
    assert_eq!(equation.rhs, mul(Expr::integer(3), Expr::var("y")));
}

#[test]
fn empty_side_is_invalid_format() {
    assert_eq!(parse("= 5"), Err(CasError::InvalidFormat));
    assert_eq!(parse("x + 1 =   "), Err(CasError::InvalidFormat));
    assert_eq!(
        parse("x = ").map_err(|e| e.to_string()),
        Err("Invalid equation format".to_string())
    );
}

#[test]
fn second_equals_fails_in_equation_context() {
    let err = parse("x = 1 = 2").expect_err("should fail");
    assert!(matches!(
        err,
        CasError::Unparsable {
            context: ParseContext::Equation,
            ..
        }
    ));
    assert!(err.to_string().starts_with("Could not parse equation: "), "{err}");
}

#[test]
fn bad_expression_fails_in_expression_context() {
    let err = parse("x + * 2").expect_err("should fail");
    assert!(err.to_string().starts_with("Could not parse expression: "), "{err}");
}

#[test]
fn single_symbol_is_selected() {
    let equation = parse("2x = 8").expect("parse");
    assert_eq!(select_variable(&equation).expect("variable"), "x");
}

#[test]
fn first_symbol_by_name_wins_regardless_of_side() {
    for text in ["x + y = 10", "y + x = 10", "y = x", "b*a = c"] {
        let equation = parse(text).expect("parse");
        let expected = if text.contains('x') { "x" } else { "a" };
        assert_eq!(select_variable(&equation).expect("variable"), expected, "{text}");
    }
}

#[test]
fn no_symbol_is_an_error() {
    let equation = parse("5").expect("parse");
    let err = select_variable(&equation).expect_err("no variable");
    assert_eq!(err, CasError::NoVariable);
    assert_eq!(
        err.to_string(),
        "No variable found in the equation. Please include a variable like 'x'."
    );
}
