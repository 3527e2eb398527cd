use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CasError>;

/// Which part of the input failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseContext {
    Equation,
    Expression,
}

impl fmt::Display for ParseContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseContext::Equation => f.write_str("equation"),
            ParseContext::Expression => f.write_str("expression"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CasError {
    #[error("Invalid equation format")]
    InvalidFormat,
    #[error("parse error: {0}")]
    Parse(String),
    #[error("Could not parse {context}: {detail}")]
    Unparsable {
        context: ParseContext,
        detail: String,
    },
    #[error("No variable found in the equation. Please include a variable like 'x'.")]
    NoVariable,
    #[error("Could not solve equation: {0}")]
    Unsolvable(String),
    #[error("unsupported operation: {0}")]
    Unsupported(String),
}

impl CasError {
    /// True for failures caused by the caller's input, reported as client errors.
    pub fn is_user_error(&self) -> bool {
        !matches!(self, CasError::Unsupported(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unparsable_message_names_context() {
        let err = CasError::Unparsable {
            context: ParseContext::Expression,
            detail: CasError::Parse("unexpected end of input".into()).to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Could not parse expression: parse error: unexpected end of input"
        );
    }

    #[test]
    fn unsupported_is_not_a_user_error() {
        assert!(CasError::NoVariable.is_user_error());
        assert!(CasError::Unsolvable("boom".into()).is_user_error());
        assert!(!CasError::Unsupported("boom".into()).is_user_error());
    }
}
