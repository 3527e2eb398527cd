//! Expression parser with implicit multiplication.
//!
//! Accepts `+ - * / ( )`, `**` and `^` exponentiation, decimal literals, named
//! function calls and juxtaposition (`2x`, `xy`, `2(x + 1)`, `(x - 1)(x + 1)`).
//! Identifiers are a single letter optionally followed by digits, so a run of
//! letters such as `xy` reads as a product of symbols. `pi`, `E` and `I` are the
//! usual constants.
//!
//! The parser and every tree walk after it recurse, so input is bounded in length
//! and nesting before parsing starts.

use crate::error::{CasError, Result};
use crate::expr::{Expr, Rational, sqrt};
use nom::IResult;
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{char, digit0, digit1, multispace0, one_of, satisfy};
use nom::combinator::{all_consuming, map, map_opt, not, opt, peek, recognize};
use nom::error::VerboseError;
use nom::multi::fold_many0;
use nom::sequence::{delimited, pair, preceded, terminated, tuple};
use num_bigint::BigInt;
use num_traits::Num;

type PResult<'a, O> = IResult<&'a str, O, VerboseError<&'a str>>;

/// Longest accepted input, in bytes.
pub const MAX_INPUT_LEN: usize = 1000;
/// Deepest accepted nesting of parentheses and prefix signs, and most powers per input.
pub const MAX_NESTING: usize = 32;
/// Largest decimal exponent accepted in `1e300`-style literals.
const MAX_DECIMAL_EXPONENT: u32 = 300;

pub fn parse_expr(input: &str) -> Result<Expr> {
    check_shape(input)?;
    match all_consuming(ws(parse_add_sub))(input) {
        Ok((_, expr)) => Ok(expr),
        Err(nom::Err::Error(e) | nom::Err::Failure(e)) => Err(CasError::Parse(describe(input, &e))),
        Err(nom::Err::Incomplete(_)) => Err(CasError::Parse("unexpected end of input".into())),
    }
}

fn check_shape(input: &str) -> Result<()> {
    if input.len() > MAX_INPUT_LEN {
        return Err(CasError::Parse(format!(
            "input longer than {MAX_INPUT_LEN} characters"
        )));
    }
    let too_deep = || CasError::Parse(format!("input nested deeper than {MAX_NESTING} levels"));

    let (mut parens, mut signs, mut powers) = (0usize, 0usize, 0usize);
    let mut star = false;
    for c in input.chars() {
        match c {
            '(' => parens += 1,
            ')' => parens = parens.saturating_sub(1),
            _ => {}
        }
        match c {
            '+' | '-' => signs += 1,
            c if c.is_whitespace() => {}
            _ => signs = 0,
        }
        // `^` or the second star of `**`.
        if c == '^' || (c == '*' && star) {
            powers += 1;
        }
        star = c == '*' && !star;

        if parens + signs > MAX_NESTING || powers > MAX_NESTING {
            return Err(too_deep());
        }
    }
    Ok(())
}

fn describe(input: &str, err: &VerboseError<&str>) -> String {
    // The deepest failure is the first entry; that is where the input went wrong.
    let Some((rest, _)) = err.errors.first() else {
        return "invalid syntax".to_string();
    };
    let rest = rest.trim_start();
    if rest.is_empty() {
        return "unexpected end of input".to_string();
    }
    let offset = input.len() - rest.len();
    let snippet: String = rest.chars().take(12).collect();
    format!("unexpected input at position {offset}: '{snippet}'")
}

fn parse_add_sub(input: &str) -> PResult<'_, Expr> {
    let (rest, init) = parse_mul_div(input)?;
    fold_many0(
        pair(ws(one_of("+-")), parse_mul_div),
        move || init.clone(),
        |acc, (op, rhs)| match op {
            '+' => Expr::Add(acc.boxed(), rhs.boxed()),
            _ => Expr::Sub(acc.boxed(), rhs.boxed()),
        },
    )(rest)
}

fn parse_mul_div(input: &str) -> PResult<'_, Expr> {
    let (rest, init) = parse_unary(input)?;
    fold_many0(
        alt((
            pair(ws(mul_or_div), parse_unary),
            // Juxtaposition never starts with a sign, so `x - 2` stays a difference, nor with
            // a bare `.`, so `x.5` is an error rather than `x*0.5`.
            map(preceded(not(ws(one_of("+-."))), parse_pow), |rhs| ('*', rhs)),
        )),
        move || init.clone(),
        |acc, (op, rhs)| match op {
            '*' => Expr::Mul(acc.boxed(), rhs.boxed()),
            _ => Expr::Div(acc.boxed(), rhs.boxed()),
        },
    )(rest)
}

fn mul_or_div(input: &str) -> PResult<'_, char> {
    alt((terminated(char('*'), not(char('*'))), char('/')))(input)
}

fn parse_unary(input: &str) -> PResult<'_, Expr> {
    if let Ok((rest, expr)) = preceded(ws(char('-')), parse_unary)(input) {
        Ok((rest, Expr::Neg(expr.boxed())))
    } else if let Ok((rest, expr)) = preceded(ws(char('+')), parse_unary)(input) {
        Ok((rest, expr))
    } else {
        parse_pow(input)
    }
}

/// Exponentiation binds tighter than unary minus: `-x**2` is `-(x**2)`.
fn parse_pow(input: &str) -> PResult<'_, Expr> {
    let (rest, base) = parse_primary(input)?;
    if let Ok((next, exp)) = preceded(ws(alt((tag("**"), tag("^")))), parse_unary)(rest) {
        Ok((next, Expr::Pow(base.boxed(), exp.boxed())))
    } else {
        Ok((rest, base))
    }
}

fn parse_primary(input: &str) -> PResult<'_, Expr> {
    alt((
        parse_parens,
        parse_number,
        parse_function,
        parse_named_constant,
        parse_identifier,
    ))(input)
}

fn parse_parens(input: &str) -> PResult<'_, Expr> {
    delimited(ws(char('(')), parse_add_sub, ws(char(')')))(input)
}

fn parse_number(input: &str) -> PResult<'_, Expr> {
    map_opt(
        ws(recognize(pair(
            alt((
                recognize(pair(digit1, opt(pair(char('.'), digit0)))),
                recognize(pair(char('.'), digit1)),
            )),
            // Without digits after it, `e` is a symbol: `2e` is `2*e`.
            opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
        ))),
        |s: &str| decimal_to_rational(s).map(Expr::Constant),
    )(input)
}

fn decimal_to_rational(literal: &str) -> Option<Rational> {
    let (mantissa, exponent) = match literal.find(['e', 'E']) {
        Some(at) => (&literal[..at], literal[at + 1..].parse::<i32>().ok()?),
        None => (literal, 0),
    };
    let (whole, frac) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let digits = format!("{whole}{frac}");
    let numer = BigInt::from_str_radix(&digits, 10).ok()?;
    let denom = BigInt::from(10u32).pow(u32::try_from(frac.len()).ok()?);
    let scale = exponent.unsigned_abs();
    if scale > MAX_DECIMAL_EXPONENT {
        return None;
    }
    let shift = Rational::from_integer(BigInt::from(10u32).pow(scale));
    let value = Rational::new(numer, denom);
    Some(if exponent < 0 { value / shift } else { value * shift })
}

fn parse_named_constant(input: &str) -> PResult<'_, Expr> {
    // `pi2` or `pix` is not `pi`; those fall through to symbols.
    ws(terminated(
        alt((
            map(tag("pi"), |_| Expr::Pi),
            map(tag("E"), |_| Expr::Euler),
            map(tag("I"), |_| Expr::Imaginary),
        )),
        peek(not(satisfy(|c| c.is_ascii_alphanumeric()))),
    ))(input)
}

fn parse_identifier(input: &str) -> PResult<'_, Expr> {
    map(
        ws(recognize(pair(satisfy(|c| c.is_ascii_alphabetic()), digit0))),
        |s: &str| Expr::Variable(s.to_string()),
    )(input)
}

fn parse_function(input: &str) -> PResult<'_, Expr> {
    let (rest, (name, arg)) = pair(ws(parse_function_name), parse_primary)(input)?;

    let expr = match name {
        "sin" => Expr::Sin(arg.boxed()),
        "cos" => Expr::Cos(arg.boxed()),
        "tan" => Expr::Tan(arg.boxed()),
        "arcsin" | "asin" => Expr::Asin(arg.boxed()),
        "arccos" | "acos" => Expr::Acos(arg.boxed()),
        "arctan" | "atan" => Expr::Atan(arg.boxed()),
        "exp" => Expr::Exp(arg.boxed()),
        "log" | "ln" => Expr::Log(arg.boxed()),
        "sqrt" => sqrt(arg),
        _ => Expr::Abs(arg.boxed()),
    };

    Ok((rest, expr))
}

fn parse_function_name(input: &str) -> PResult<'_, &str> {
    // A name directly followed by more letters is a product of symbols, not a call.
    terminated(
        alt((
            tag("arcsin"),
            tag("arccos"),
            tag("arctan"),
            tag("asin"),
            tag("acos"),
            tag("atan"),
            tag("sqrt"),
            tag("sin"),
            tag("cos"),
            tag("tan"),
            tag("exp"),
            tag("log"),
            tag("ln"),
            tag("abs"),
            tag("Abs"),
        )),
        peek(not(satisfy(|c| c.is_ascii_alphabetic()))),
    )(input)
}

fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> PResult<'a, O>
where
    F: FnMut(&'a str) -> PResult<'a, O>,
{
    delimited(multispace0, inner, multispace0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{add, mul, neg, pow, rational};

    fn x() -> Expr {
        Expr::var("x")
    }

    #[test]
    fn decimal_literals_are_exact() {
        assert_eq!(
            parse_expr("2.5").expect("parse"),
            Expr::Constant(rational(5, 2))
        );
        assert_eq!(
            parse_expr(".25").expect("parse"),
            Expr::Constant(rational(1, 4))
        );
    }

    #[test]
    fn unary_minus_binds_looser_than_power() {
        assert_eq!(
            parse_expr("-x**2").expect("parse"),
            neg(pow(x(), Expr::integer(2)))
        );
    }

    #[test]
    fn negative_exponent_is_accepted() {
        assert_eq!(
            parse_expr("x^-1").expect("parse"),
            pow(x(), neg(Expr::integer(1)))
        );
    }

    #[test]
    fn juxtaposed_coefficient() {
        assert_eq!(parse_expr("2x").expect("parse"), mul(Expr::integer(2), x()));
    }

    #[test]
    fn trailing_sign_is_a_difference() {
        assert_eq!(
            parse_expr("x -2").expect("parse"),
            Expr::Sub(x().boxed(), Expr::integer(2).boxed())
        );
        assert_eq!(
            parse_expr("x+2").expect("parse"),
            add(x(), Expr::integer(2))
        );
    }

    #[test]
    fn function_name_needs_a_boundary() {
        assert_eq!(
            parse_expr("abs(x)").expect("parse"),
            Expr::Abs(x().boxed())
        );
        // `absx` is three symbols times x, not a call.
        let parsed = parse_expr("absx").expect("parse");
        assert!(!matches!(parsed, Expr::Abs(_)));
        assert_eq!(parsed.free_symbols().len(), 4);
    }

    #[test]
    fn scientific_notation_is_exact() {
        assert_eq!(
            parse_expr("1e3").expect("parse"),
            Expr::Constant(rational(1000, 1))
        );
        assert_eq!(
            parse_expr("2.5E-2").expect("parse"),
            Expr::Constant(rational(1, 40))
        );
        assert!(parse_expr("1e999").is_err());
    }

    #[test]
    fn trailing_e_without_digits_is_a_symbol() {
        assert_eq!(
            parse_expr("2e").expect("parse"),
            mul(Expr::integer(2), Expr::var("e"))
        );
    }

    #[test]
    fn named_constants() {
        assert_eq!(parse_expr("pi").expect("parse"), Expr::Pi);
        assert_eq!(parse_expr("E").expect("parse"), Expr::Euler);
        assert_eq!(parse_expr("I").expect("parse"), Expr::Imaginary);
        assert_eq!(parse_expr("2pi").expect("parse"), mul(Expr::integer(2), Expr::Pi));
        // Followed by a letter or digit these are ordinary symbols.
        assert_eq!(
            parse_expr("pix").expect("parse"),
            mul(mul(Expr::var("p"), Expr::var("i")), x())
        );
        assert_eq!(parse_expr("E1").expect("parse"), Expr::var("E1"));
    }

    #[test]
    fn dot_after_symbol_is_rejected() {
        assert!(matches!(parse_expr("x.5"), Err(CasError::Parse(_))));
        assert!(matches!(parse_expr("2x .5"), Err(CasError::Parse(_))));
    }

    #[test]
    fn oversized_input_is_rejected() {
        let sum = vec!["x"; 10_000].join(" + ");
        assert!(matches!(parse_expr(&sum), Err(CasError::Parse(_))));

        let minus = format!("{}x", "-".repeat(10_000));
        assert!(matches!(parse_expr(&minus), Err(CasError::Parse(_))));
    }

    #[test]
    fn deep_nesting_is_rejected_within_the_length_limit() {
        let minus = format!("{}x", "-".repeat(100));
        assert!(matches!(parse_expr(&minus), Err(CasError::Parse(_))));

        let parens = format!("{}x{}", "(".repeat(100), ")".repeat(100));
        assert!(matches!(parse_expr(&parens), Err(CasError::Parse(_))));

        let tower = vec!["x"; 100].join("^");
        assert!(matches!(parse_expr(&tower), Err(CasError::Parse(_))));
    }

    #[test]
    fn moderate_nesting_still_parses() {
        let parens = format!("{}x{}", "(".repeat(10), ")".repeat(10));
        assert_eq!(parse_expr(&parens).expect("parse"), x());
        assert!(parse_expr("--x").is_ok());
        assert!(parse_expr(&vec!["x"; 100].join(" + ")).is_ok());
    }

    #[test]
    fn error_reports_position() {
        let err = parse_expr("x + * 2").expect_err("should fail");
        assert!(err.to_string().starts_with("parse error:"), "{err}");
    }
}
