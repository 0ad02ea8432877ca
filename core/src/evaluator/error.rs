//! Command-level evaluation errors.
//!
//! Every handler returns `Result<_, EvalError>`. The evaluator loop is the only
//! place these are caught: the error is reported as a [`Diagnostic`], the rest
//! of the command is skipped, and the next command starts from a clean stack.
//!
//! | Code | Condition                                   | Severity |
//! |------|---------------------------------------------|----------|
//! | E001 | operand stack underflow                     | error    |
//! | E002 | scope closed without being opened           | error    |
//! | E003 | too many nested scopes                      | error    |
//! | W004 | unresolved identifier                       | warning  |
//! | E005 | literal of the wrong shape or arity         | error    |
//! | E006 | inline expression rejected                  | error    |
//! | E007 | model engine rejected a request             | error    |
//! | W008 | stack not empty at end of command           | warning  |
//! | W009 | unrecognized integration method             | warning  |

use thiserror::Error;

use crate::{
    api::{Diagnostic, Severity},
    engine::EngineError,
    expression::ExpressionError,
    session::Category,
    vm::StackError,
};

pub const RESIDUAL_STATE: &str = "W008";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("operand stack underflow in {production}")]
    StackUnderflow { production: &'static str },

    #[error("{production} closed a scope that was never opened")]
    ScopeUnderflow { production: &'static str },

    #[error("scope depth {depth} exceeds maximum of {max_depth}")]
    ScopeOverflow { depth: usize, max_depth: usize },

    #[error("undefined {category} '{id}'")]
    UnresolvedReference { category: Category, id: String },

    #[error("malformed {production}: {message}")]
    MalformedLiteral {
        production: &'static str,
        message: String,
    },

    #[error("expression `{text}`: {error}")]
    Expression {
        text: String,
        #[source]
        error: ExpressionError,
    },

    #[error("{operation} failed: {source}")]
    Adapter {
        operation: &'static str,
        source: EngineError,
    },

    #[error("unrecognized integration method '{method}', continuing as <unknown>")]
    UnknownIntegrationMethod { method: String },
}

impl EvalError {
    pub(crate) fn stack(production: &'static str, error: StackError) -> Self {
        match error {
            StackError::Underflow => EvalError::StackUnderflow { production },
            StackError::ScopeUnderflow => EvalError::ScopeUnderflow { production },
            StackError::ScopeOverflow { depth, max_depth } => {
                EvalError::ScopeOverflow { depth, max_depth }
            }
        }
    }

    pub(crate) fn malformed(production: &'static str, message: impl Into<String>) -> Self {
        EvalError::MalformedLiteral {
            production,
            message: message.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            EvalError::StackUnderflow { .. } => "E001",
            EvalError::ScopeUnderflow { .. } => "E002",
            EvalError::ScopeOverflow { .. } => "E003",
            EvalError::UnresolvedReference { .. } => "W004",
            EvalError::MalformedLiteral { .. } => "E005",
            EvalError::Expression { .. } => "E006",
            EvalError::Adapter { .. } => "E007",
            EvalError::UnknownIntegrationMethod { .. } => "W009",
        }
    }

    /// Warnings are reported but never abandon a command.
    pub fn severity(&self) -> Severity {
        match self {
            EvalError::UnresolvedReference { .. } | EvalError::UnknownIntegrationMethod { .. } => {
                Severity::Warning
            }
            _ => Severity::Error,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let diagnostic =
            Diagnostic::new(self.severity(), self.to_string()).with_code(self.code());
        match self {
            EvalError::Expression { text, error } => {
                diagnostic.with_source(text.clone(), error.span().clone())
            }
            _ => diagnostic,
        }
    }
}
