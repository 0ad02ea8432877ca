use hashbrown::HashMap;
use tracing::debug;

use crate::{
    engine::{
        CompGroupHandle, EdpHandle, EngineError, FragFnHandle, FunctionFamily, FunctionHandle,
        ImHandle, LognormalState, LossFnHandle, ModelEngine, MuParam, ProbFnHandle,
        RecordTarget, SdParam,
    },
    session::{IntegrationSettings, RecorderDescriptor},
};

/// An accepted engine call, in the order it was made.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    DeterministicFunction {
        family: FunctionFamily,
        params: Vec<f64>,
        handle: FunctionHandle,
    },
    ProbabilisticFunction {
        mu_function: FunctionHandle,
        mu: MuParam,
        sd_function: FunctionHandle,
        sd: SdParam,
        handle: ProbFnHandle,
    },
    SimpleRelationship {
        function: FunctionHandle,
        handle: ImHandle,
    },
    CompoundRelationship {
        im: ImHandle,
        probfn: ProbFnHandle,
        handle: EdpHandle,
    },
    FragilityFunction {
        states: Vec<LognormalState>,
        handle: FragFnHandle,
    },
    FragilityLookup {
        key: String,
        database: String,
        handle: FragFnHandle,
    },
    LossFunction {
        states: Vec<LognormalState>,
        handle: LossFnHandle,
    },
    ComponentGroup {
        edp: EdpHandle,
        fragfn: FragFnHandle,
        lossfn: LossFnHandle,
        count: i64,
        handle: CompGroupHandle,
    },
    Integration(IntegrationSettings),
    Recorder {
        recorder: RecorderDescriptor,
        target: RecordTarget,
    },
}

/// Reference engine: validates requests, issues sequential handles, and
/// keeps a log of what was asked of it.
#[derive(Debug, Default)]
pub struct RecordingEngine {
    next_id: u64,
    calls: Vec<EngineCall>,
    /// Fragility functions available to `lookup_fragility_function`, by
    /// `(database, key)`.
    fragility_database: HashMap<(String, String), Vec<LognormalState>>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a stored fragility function available for lookup.
    pub fn with_fragility(
        mut self,
        database: &str,
        key: &str,
        states: Vec<LognormalState>,
    ) -> Self {
        self.fragility_database
            .insert((database.to_string(), key.to_string()), states);
        self
    }

    pub fn calls(&self) -> &[EngineCall] {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<EngineCall> {
        core::mem::take(&mut self.calls)
    }

    /// Recorder runs, in order.
    pub fn recorder_runs(&self) -> impl Iterator<Item = &RecorderDescriptor> {
        self.calls.iter().filter_map(|call| match call {
            EngineCall::Recorder { recorder, .. } => Some(recorder),
            _ => None,
        })
    }

    fn issue(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn record(&mut self, call: EngineCall) {
        debug!(?call, "engine call");
        self.calls.push(call);
    }
}

fn require<H>(handle: Option<H>, what: &'static str) -> Result<H, EngineError> {
    handle.ok_or(EngineError::MissingHandle { what })
}

fn check_states(states: &[LognormalState], what: &'static str) -> Result<(), EngineError> {
    if states.is_empty() {
        return Err(EngineError::NoDamageStates { what });
    }
    for state in states {
        if !state.options().is_supported() {
            return Err(EngineError::UnsupportedParameterization {
                mu: state.mu_kind,
                sd: state.sd_kind,
            });
        }
    }
    Ok(())
}

impl ModelEngine for RecordingEngine {
    fn create_deterministic_function(
        &mut self,
        family: FunctionFamily,
        params: &[f64],
    ) -> Result<FunctionHandle, EngineError> {
        if params.len() != family.arity() {
            return Err(EngineError::Arity {
                family,
                expected: family.arity(),
                found: params.len(),
            });
        }
        let handle = FunctionHandle::new(self.issue());
        self.record(EngineCall::DeterministicFunction {
            family,
            params: params.to_vec(),
            handle,
        });
        Ok(handle)
    }

    fn create_lognormal_probabilistic_function(
        &mut self,
        mu_function: Option<FunctionHandle>,
        mu: MuParam,
        sd_function: Option<FunctionHandle>,
        sd: SdParam,
    ) -> Result<ProbFnHandle, EngineError> {
        let mu_function = require(mu_function, "mu function")?;
        let sd_function = require(sd_function, "sd function")?;
        let handle = ProbFnHandle::new(self.issue());
        self.record(EngineCall::ProbabilisticFunction {
            mu_function,
            mu,
            sd_function,
            sd,
            handle,
        });
        Ok(handle)
    }

    fn create_simple_relationship(
        &mut self,
        function: Option<FunctionHandle>,
    ) -> Result<ImHandle, EngineError> {
        let function = require(function, "deterministic function")?;
        let handle = ImHandle::new(self.issue());
        self.record(EngineCall::SimpleRelationship { function, handle });
        Ok(handle)
    }

    fn create_compound_relationship(
        &mut self,
        im: Option<ImHandle>,
        probfn: Option<ProbFnHandle>,
    ) -> Result<EdpHandle, EngineError> {
        let im = require(im, "IM")?;
        let probfn = require(probfn, "probabilistic function")?;
        let handle = EdpHandle::new(self.issue());
        self.record(EngineCall::CompoundRelationship { im, probfn, handle });
        Ok(handle)
    }

    fn create_fragility_function(
        &mut self,
        states: &[LognormalState],
    ) -> Result<FragFnHandle, EngineError> {
        check_states(states, "fragility function")?;
        let handle = FragFnHandle::new(self.issue());
        self.record(EngineCall::FragilityFunction {
            states: states.to_vec(),
            handle,
        });
        Ok(handle)
    }

    fn lookup_fragility_function(
        &mut self,
        key: &str,
        database: &str,
    ) -> Result<FragFnHandle, EngineError> {
        if !self
            .fragility_database
            .contains_key(&(database.to_string(), key.to_string()))
        {
            return Err(EngineError::UnknownFragilityKey {
                key: key.to_string(),
                database: database.to_string(),
            });
        }
        let handle = FragFnHandle::new(self.issue());
        self.record(EngineCall::FragilityLookup {
            key: key.to_string(),
            database: database.to_string(),
            handle,
        });
        Ok(handle)
    }

    fn create_loss_function(
        &mut self,
        states: &[LognormalState],
    ) -> Result<LossFnHandle, EngineError> {
        check_states(states, "loss function")?;
        let handle = LossFnHandle::new(self.issue());
        self.record(EngineCall::LossFunction {
            states: states.to_vec(),
            handle,
        });
        Ok(handle)
    }

    fn create_component_group(
        &mut self,
        edp: Option<EdpHandle>,
        fragfn: Option<FragFnHandle>,
        lossfn: Option<LossFnHandle>,
        count: i64,
    ) -> Result<CompGroupHandle, EngineError> {
        let edp = require(edp, "EDP")?;
        let fragfn = require(fragfn, "fragility function")?;
        let lossfn = require(lossfn, "loss function")?;
        if count <= 0 {
            return Err(EngineError::InvalidCount { count });
        }
        let handle = CompGroupHandle::new(self.issue());
        self.record(EngineCall::ComponentGroup {
            edp,
            fragfn,
            lossfn,
            count,
            handle,
        });
        Ok(handle)
    }

    fn configure_integration(&mut self, settings: &IntegrationSettings) -> Result<(), EngineError> {
        if !(settings.tolerance > 0.0) {
            return Err(EngineError::InvalidIntegration {
                reason: format!("tolerance must be positive, got {}", settings.tolerance),
            });
        }
        if settings.max_evaluations <= 0 {
            return Err(EngineError::InvalidIntegration {
                reason: format!(
                    "evaluation limit must be positive, got {}",
                    settings.max_evaluations
                ),
            });
        }
        self.record(EngineCall::Integration(settings.clone()));
        Ok(())
    }

    fn run_recorder(
        &mut self,
        recorder: &RecorderDescriptor,
        target: RecordTarget,
    ) -> Result<(), EngineError> {
        if !target.is_resolved() {
            return Err(EngineError::MissingHandle {
                what: target.describe(),
            });
        }
        if let Some(at) = recorder.at {
            if !(at.by > 0.0) || at.to < at.from {
                return Err(EngineError::InvalidRange {
                    from: at.from,
                    to: at.to,
                    by: at.by,
                });
            }
        }
        self.record(EngineCall::Recorder {
            recorder: recorder.clone(),
            target,
        });
        Ok(())
    }
}
