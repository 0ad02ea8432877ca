use thiserror::Error;

use crate::engine::{FunctionFamily, MuParam, SdParam};

/// A construction request rejected by a model engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("{family} function takes {expected} parameters, got {found}")]
    Arity {
        family: FunctionFamily,
        expected: usize,
        found: usize,
    },

    #[error("missing {what}")]
    MissingHandle { what: &'static str },

    #[error("{what} needs at least one damage state")]
    NoDamageStates { what: &'static str },

    #[error("cannot build a lognormal distribution from {mu} and {sd}")]
    UnsupportedParameterization { mu: MuParam, sd: SdParam },

    #[error("component count must be positive, got {count}")]
    InvalidCount { count: i64 },

    #[error("no fragility function '{key}' in {database}")]
    UnknownFragilityKey { key: String, database: String },

    #[error("invalid integration settings: {reason}")]
    InvalidIntegration { reason: String },

    #[error("invalid evaluation range: from {from} to {to} by {by}")]
    InvalidRange { from: f64, to: f64, by: f64 },
}
