//! SLAT - command evaluation for seismic-loss analysis scripts
//!
//! # Overview
//!
//! A SLAT script builds a model one command at a time: deterministic and
//! probabilistic functions, intensity measures, demand parameters, fragility
//! and loss functions, component groups, and the recorders that report on
//! them. A host parser walks each command and reports its grammar
//! productions as enter/exit events; the [`Evaluator`] reacts to those events
//! with a value stack, binds each named entity in a [`Session`], and hands
//! the actual construction to a [`ModelEngine`](engine::ModelEngine).
//!
//! # Quick Start
//!
//! ```
//! use slat::{Evaluator, Value, engine::RecordingEngine};
//! use slat::evaluator::{Event, NumericToken, Production};
//!
//! let mut evaluator = Evaluator::new(RecordingEngine::new());
//! let command = Production::Command { text: "set x $(2 ** 10)".to_string() };
//! let nested = Production::NumericalScalar(NumericToken::Nested);
//! let expression = Production::Expression { text: "2 ** 10".to_string() };
//! let set = Production::Set { id: "x".to_string() };
//! evaluator.walk([
//!     Event::Enter(command.clone()),
//!     Event::Enter(nested.clone()),
//!     Event::Enter(expression.clone()),
//!     Event::Exit(expression),
//!     Event::Exit(nested),
//!     Event::Enter(set.clone()),
//!     Event::Exit(set),
//!     Event::Exit(command),
//! ]);
//! assert_eq!(evaluator.session().variable("x"), Value::Integer(1024));
//! ```
//!
//! # Diagnostics
//!
//! Evaluation never stops at an error. Each problem becomes a [`Diagnostic`]
//! and the evaluator resumes at the next command; use [`render_diagnostics`]
//! to print them with annotated expression source.

pub use slat_core::api::{Diagnostic, EvaluatorOptions, ExpressionOptions, Severity};
pub use slat_core::evaluator::{self, EvalError, Evaluator, PrintDirective, PrintSubject};
pub use slat_core::session::{self, Session};
pub use slat_core::values::{self, Value};
pub use slat_core::{engine, expression, stdlib};

mod error_renderer;
pub use error_renderer::{
    render_diagnostics, render_diagnostics_to, render_diagnostics_to_string,
    render_diagnostics_to_string_no_color,
};
