//! Stack-based command evaluator.
//!
//! The host parser reports each grammar production as an [`Event`]; the
//! evaluator reacts to exits (and to entries of scope-opening productions),
//! moving [`Value`](crate::Value)s across an [`OperandStack`](crate::vm::OperandStack)
//! and turning complete commands into engine calls, session bindings, and
//! print directives.
//!
//! ## Example
//!
//! ```
//! use slat_core::{
//!     Value,
//!     engine::RecordingEngine,
//!     evaluator::{Event, Evaluator, NumericToken, Production},
//! };
//!
//! let mut evaluator = Evaluator::new(RecordingEngine::new());
//! let command = Production::Command { text: "set x 3.5".to_string() };
//! let scalar = Production::NumericalScalar(NumericToken::Float(3.5));
//! let set = Production::Set { id: "x".to_string() };
//! evaluator.walk([
//!     Event::Enter(command.clone()),
//!     Event::Enter(scalar.clone()),
//!     Event::Exit(scalar),
//!     Event::Enter(set.clone()),
//!     Event::Exit(set),
//!     Event::Exit(command),
//! ]);
//! assert_eq!(evaluator.session().variable("x"), Value::Float(3.5));
//! ```

mod effects;
mod entities;
mod error;
mod eval;
mod production;
mod values;

#[cfg(test)]
mod eval_test;

pub use effects::{PrintDirective, PrintSubject};
pub use error::EvalError;
pub use eval::Evaluator;
pub use production::{
    AtToken, ColumnToken, Event, FragfnForm, Literal, MessageToken, NumericToken, PrintTarget,
    Production,
};
pub use values::DEFAULT_DATABASE;
