//! Inline `$(...)` expressions.
//!
//! Expressions are parsed into an arena-allocated tree and evaluated against an
//! explicit [`Namespace`]. Only numeric literals, arithmetic, and members of
//! registered packages are reachable; there is no access to script variables,
//! the filesystem, or anything else.
//!
//! ## Example
//!
//! ```
//! use slat_core::{Value, api::ExpressionOptions, expression, stdlib::Namespace};
//!
//! let namespace = Namespace::standard();
//! let value = expression::evaluate("2 ** 10", &namespace, &ExpressionOptions::default());
//! assert_eq!(value, Ok(Value::Integer(1024)));
//! ```

mod error;
mod eval;
mod parsed_expr;
pub mod parser;
mod syntax;


pub use error::ExpressionError;
pub use eval::Number;
pub use parsed_expr::{Expr, ExprKind, Literal};
pub use parser::parse;
pub use syntax::{BinaryOp, Span, UnaryOp};

use bumpalo::Bump;
use tracing::debug;

use crate::{Value, api::ExpressionOptions, stdlib::Namespace};

/// Parse and evaluate `source`, producing an `Integer` or `Float` value.
pub fn evaluate(
    source: &str,
    namespace: &Namespace,
    options: &ExpressionOptions,
) -> Result<Value, ExpressionError> {
    let arena = Bump::new();
    let expr = parse(&arena, source, options.max_depth)?;
    let number = eval::Evaluator::new(namespace, source, options.max_depth).eval(expr)?;
    debug!(source, result = ?number, "expression evaluated");
    Ok(number.into())
}
