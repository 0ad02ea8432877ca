//! Configuration options for the script evaluator.

/// Configuration options for inline expression evaluation.
///
/// # Example
///
/// ```
/// use slat_core::api::ExpressionOptions;
///
/// let options = ExpressionOptions { max_depth: 16 };
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionOptions {
    /// Maximum nesting of parentheses, and of the syntax tree, in one
    /// expression. Long operator chains count toward the tree depth.
    ///
    /// Default: 256
    pub max_depth: usize,
}

impl Default for ExpressionOptions {
    fn default() -> Self {
        Self { max_depth: 256 }
    }
}

/// Configuration options for an evaluation session.
///
/// # Example
///
/// ```
/// use slat_core::api::{EvaluatorOptions, ExpressionOptions};
///
/// let options = EvaluatorOptions {
///     max_scope_depth: 16,
///     expression: ExpressionOptions::default(),
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluatorOptions {
    /// Maximum number of simultaneously open operand scopes.
    ///
    /// Each bracketed literal (array, dictionary, pair sequence, column
    /// list) opens one scope for its duration.
    ///
    /// Default: 64
    pub max_scope_depth: usize,

    /// Options for `$(...)` expressions.
    pub expression: ExpressionOptions,
}

impl Default for EvaluatorOptions {
    fn default() -> Self {
        Self {
            max_scope_depth: 64,
            expression: ExpressionOptions::default(),
        }
    }
}
