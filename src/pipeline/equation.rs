use tracing::debug;

use crate::engine::{Equation, SymbolicEngine};
use crate::error::{CasError, ParseContext, Result};
use crate::expr::zero;

/// Split normalized text into `lhs = rhs`, or `expr = 0` when there is no `=`.
///
/// Only the first `=` separates the sides; any later one stays in the right-hand text and
/// fails to parse there.
pub fn parse_equation(engine: &dyn SymbolicEngine, text: &str) -> Result<Equation> {
    match text.split_once('=') {
        Some((lhs, rhs)) => {
            let (lhs, rhs) = (lhs.trim(), rhs.trim());
            if lhs.is_empty() || rhs.is_empty() {
                return Err(CasError::InvalidFormat);
            }
            let parse = |side: &str| {
                engine
                    .parse(side)
                    .map_err(|err| unparsable(ParseContext::Equation, err))
            };
            Ok(Equation::new(parse(lhs)?, parse(rhs)?))
        }
        None => {
            let expr = engine
                .parse(text.trim())
                .map_err(|err| unparsable(ParseContext::Expression, err))?;
            Ok(Equation::new(expr, zero()))
        }
    }
}

fn unparsable(context: ParseContext, err: CasError) -> CasError {
    debug!(%context, %err, "input did not parse");
    CasError::Unparsable {
        context,
        detail: err.to_string(),
    }
}
