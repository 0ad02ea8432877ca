//! Diagnostics produced while evaluating a script.
//!
//! The evaluator never aborts a session. Progress descriptions, warnings and
//! recovered command errors are all reported as [`Diagnostic`]s, which map
//! one-to-one onto the log lines emitted through `tracing`.

use core::fmt;

use crate::expression::Span;

/// A diagnostic message (error, warning, or info).
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// Severity level (error, warning, info).
    pub severity: Severity,

    /// Primary diagnostic message.
    pub message: String,

    /// Optional code (e.g., "E001") identifying the condition.
    pub code: Option<&'static str>,

    /// Text of the command being evaluated, when known.
    pub command: Option<String>,

    /// Source text the span refers to (an inline expression).
    pub source: Option<String>,

    /// Location of the problem within `source`.
    pub span: Option<Span>,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            code: None,
            command: None,
            source: None,
            span: None,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_command(mut self, command: Option<&str>) -> Self {
        self.command = command.map(str::to_string);
        self
    }

    pub fn with_source(mut self, source: impl Into<String>, span: Span) -> Self {
        self.source = Some(source.into());
        self.span = Some(span);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.severity)?;
        if let Some(code) = self.code {
            write!(f, "[{}]", code)?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Info - a progress description.
    Info,
    /// Warning - suspicious state that was tolerated.
    Warning,
    /// Error - a command was abandoned.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}
