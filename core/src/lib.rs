//! Evaluator core for SLAT seismic-loss scripts.
//!
//! A host parser walks a script and reports grammar productions as
//! [`evaluator::Event`]s. The [`Evaluator`] turns them into a named model
//! graph held in a [`session::Session`], handing construction requests to a
//! [`engine::ModelEngine`].

pub mod api;
pub mod engine;
pub mod evaluator;
pub mod expression;
pub mod session;
pub mod stdlib;
pub mod values;
pub mod vm;

pub use api::{Diagnostic, EvaluatorOptions, ExpressionOptions, Severity};
pub use evaluator::{EvalError, Evaluator};
pub use values::Value;
