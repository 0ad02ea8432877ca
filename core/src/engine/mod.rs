//! The model engine seam.
//!
//! The evaluator never builds curves or integrates anything itself. Every
//! validated construction request goes through [`ModelEngine`], which hands
//! back an opaque handle the session stores by name. Missing handles are
//! passed through as `None`; rejecting them is the engine's job.
//!
//! [`RecordingEngine`] is an in-memory implementation that validates requests
//! the way a numerical backend would and records every accepted call.

mod error;
mod handle;
mod lognormal;
mod recording;

pub use error::EngineError;
pub use handle::{
    CompGroupHandle, EdpHandle, FragFnHandle, FunctionHandle, ImHandle, LossFnHandle,
    ProbFnHandle, RecordTarget,
};
pub use lognormal::{LognormalOptions, LognormalState, MuParam, SdParam};
pub use recording::{EngineCall, RecordingEngine};

use core::fmt;

use crate::session::{IntegrationSettings, RecorderDescriptor};

/// Deterministic function families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionFamily {
    PowerLaw,
    Hyperbolic,
}

impl FunctionFamily {
    /// Number of parameters the family takes.
    pub const fn arity(self) -> usize {
        match self {
            // [a, b]
            FunctionFamily::PowerLaw => 2,
            // [v_asy, im_asy, alpha]
            FunctionFamily::Hyperbolic => 3,
        }
    }
}

impl fmt::Display for FunctionFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionFamily::PowerLaw => f.write_str("power law"),
            FunctionFamily::Hyperbolic => f.write_str("hyperbolic"),
        }
    }
}

/// Construction interface of the numerical modeling engine.
///
/// Calls are synchronous. An `Err` is reported by the evaluator and the
/// command that issued it binds nothing.
pub trait ModelEngine {
    fn create_deterministic_function(
        &mut self,
        family: FunctionFamily,
        params: &[f64],
    ) -> Result<FunctionHandle, EngineError>;

    fn create_lognormal_probabilistic_function(
        &mut self,
        mu_function: Option<FunctionHandle>,
        mu: MuParam,
        sd_function: Option<FunctionHandle>,
        sd: SdParam,
    ) -> Result<ProbFnHandle, EngineError>;

    fn create_simple_relationship(
        &mut self,
        function: Option<FunctionHandle>,
    ) -> Result<ImHandle, EngineError>;

    fn create_compound_relationship(
        &mut self,
        im: Option<ImHandle>,
        probfn: Option<ProbFnHandle>,
    ) -> Result<EdpHandle, EngineError>;

    fn create_fragility_function(
        &mut self,
        states: &[LognormalState],
    ) -> Result<FragFnHandle, EngineError>;

    /// Look up a stored fragility function by key.
    fn lookup_fragility_function(
        &mut self,
        key: &str,
        database: &str,
    ) -> Result<FragFnHandle, EngineError>;

    fn create_loss_function(&mut self, states: &[LognormalState])
    -> Result<LossFnHandle, EngineError>;

    fn create_component_group(
        &mut self,
        edp: Option<EdpHandle>,
        fragfn: Option<FragFnHandle>,
        lossfn: Option<LossFnHandle>,
        count: i64,
    ) -> Result<CompGroupHandle, EngineError>;

    fn configure_integration(&mut self, settings: &IntegrationSettings)
    -> Result<(), EngineError>;

    /// Emit one recorder. Called once per recorder on every `analyze`.
    fn run_recorder(
        &mut self,
        recorder: &RecorderDescriptor,
        target: RecordTarget,
    ) -> Result<(), EngineError>;
}
