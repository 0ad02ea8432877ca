//! Errors raised while parsing or evaluating an inline expression.

use thiserror::Error;

use crate::expression::Span;

/// An inline expression was rejected.
///
/// Every variant carries the byte span of the offending text so hosts can
/// point at it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExpressionError {
    #[error("syntax error: {message}")]
    Syntax { message: String, span: Span },

    #[error("invalid number literal '{text}'")]
    InvalidNumber { text: String, span: Span },

    #[error("expression nesting depth exceeds maximum of {max_depth}")]
    TooDeep { max_depth: usize, span: Span },

    #[error("name '{name}' is not defined")]
    UnknownName { name: String, span: Span },

    #[error("'{package}' has no member '{member}'")]
    UnknownMember {
        package: String,
        member: String,
        span: Span,
    },

    #[error("'{name}' is not callable")]
    NotCallable { name: String, span: Span },

    #[error("{function}() takes {expected} argument(s), got {found}")]
    Arity {
        function: String,
        expected: String,
        found: usize,
        span: Span,
    },

    #[error("{what} is not a number")]
    NotNumeric { what: String, span: Span },

    #[error("division by zero")]
    DivisionByZero { span: Span },

    #[error("math domain error in {function}()")]
    Domain { function: String, span: Span },
}

impl ExpressionError {
    pub fn span(&self) -> &Span {
        match self {
            ExpressionError::Syntax { span, .. }
            | ExpressionError::InvalidNumber { span, .. }
            | ExpressionError::TooDeep { span, .. }
            | ExpressionError::UnknownName { span, .. }
            | ExpressionError::UnknownMember { span, .. }
            | ExpressionError::NotCallable { span, .. }
            | ExpressionError::Arity { span, .. }
            | ExpressionError::NotNumeric { span, .. }
            | ExpressionError::DivisionByZero { span }
            | ExpressionError::Domain { span, .. } => span,
        }
    }

    pub(crate) fn from_pest(error: pest::error::Error<crate::expression::parser::Rule>) -> Self {
        use pest::error::InputLocation;

        let span = match error.location {
            InputLocation::Pos(pos) => Span::new(pos, pos),
            InputLocation::Span((start, end)) => Span::new(start, end),
        };
        ExpressionError::Syntax {
            message: error.variant.message().into_owned(),
            span,
        }
    }
}
