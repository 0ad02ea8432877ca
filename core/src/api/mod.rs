mod error;
mod options;

pub use error::{Diagnostic, Severity};
pub use options::{EvaluatorOptions, ExpressionOptions};
