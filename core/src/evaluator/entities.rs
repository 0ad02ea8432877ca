//! Entity-creation commands.
//!
//! Each command reads its operands, resolves cross-references, makes one
//! engine call, and binds the returned handle. When any step fails the
//! identifier is bound as undefined, so later references to it are reported
//! as unresolved instead of silently reaching an older definition.

use core::fmt;

use crate::{
    Value,
    engine::{
        FragFnHandle, FunctionFamily, FunctionHandle, LognormalOptions, LognormalState,
        LossFnHandle, ModelEngine, ProbFnHandle,
    },
    evaluator::{
        EvalError, Evaluator, FragfnForm,
        eval::adapter,
        values::{expand_states, floats},
    },
    session::{Category, Session, SymbolTable},
};

impl<E: ModelEngine> Evaluator<E> {
    pub(super) fn detfn(&mut self, id: &str, family: FunctionFamily) -> Result<(), EvalError> {
        let result = self.build_detfn(id, family);
        self.bind(Category::DetFn, id, result, |session, handle| {
            session.detfns.bind(id, handle)
        })
    }

    fn build_detfn(
        &mut self,
        id: &str,
        family: FunctionFamily,
    ) -> Result<FunctionHandle, EvalError> {
        let params = self.pop("detfn")?;
        let params = floats("detfn", &params)?;
        self.describe(format!(
            "create a {} function named {}, using the parameters {:?}",
            family, id, params
        ));
        self.engine
            .create_deterministic_function(family, &params)
            .map_err(adapter("create_deterministic_function"))
    }

    pub(super) fn probfn(
        &mut self,
        id: &str,
        mu_function: &str,
        sd_function: &str,
    ) -> Result<(), EvalError> {
        let result = self.build_probfn(id, mu_function, sd_function);
        self.bind(Category::ProbFn, id, result, |session, handle| {
            session.probfns.bind(id, handle)
        })
    }

    fn build_probfn(
        &mut self,
        id: &str,
        mu_function: &str,
        sd_function: &str,
    ) -> Result<ProbFnHandle, EvalError> {
        let options = self.pop("probfn")?;
        let options = LognormalOptions::from_value(&options).ok_or_else(|| {
            EvalError::malformed(
                "probfn",
                format!("expected a {{mu, sd}} option record, found {}", options),
            )
        })?;
        let mu_handle = self.lookup(Category::DetFn, mu_function, |s| &s.detfns);
        let sd_handle = self.lookup(Category::DetFn, sd_function, |s| &s.detfns);
        self.describe(format!(
            "create a probabilistic function '{}', using the function '{}' for mu ({}), \
             and the function '{}' for sigma ({})",
            id, mu_function, options.mu, sd_function, options.sd
        ));
        self.engine
            .create_lognormal_probabilistic_function(mu_handle, options.mu, sd_handle, options.sd)
            .map_err(adapter("create_lognormal_probabilistic_function"))
    }

    pub(super) fn im(&mut self, id: &str, function: &str) -> Result<(), EvalError> {
        let handle = self.lookup(Category::DetFn, function, |s| &s.detfns);
        self.describe(format!(
            "create an intensity measure '{}' from the deterministic function '{}'",
            id, function
        ));
        let result = self
            .engine
            .create_simple_relationship(handle)
            .map_err(adapter("create_simple_relationship"));
        self.bind(Category::Im, id, result, |session, handle| {
            session.ims.bind(id, handle)
        })
    }

    pub(super) fn edp(&mut self, id: &str, im: &str, probfn: &str) -> Result<(), EvalError> {
        let im_handle = self.lookup(Category::Im, im, |s| &s.ims);
        let probfn_handle = self.lookup(Category::ProbFn, probfn, |s| &s.probfns);
        self.describe(format!(
            "create an engineering demand parameter '{}' from the intensity measure '{}' \
             and the probabilistic function '{}'",
            id, im, probfn
        ));
        let result = self
            .engine
            .create_compound_relationship(im_handle, probfn_handle)
            .map_err(adapter("create_compound_relationship"));
        self.bind(Category::Edp, id, result, |session, handle| {
            session.edps.bind(id, handle)
        })
    }

    pub(super) fn fragfn(&mut self, id: &str, form: FragfnForm) -> Result<(), EvalError> {
        let result = match form {
            FragfnForm::Database => self.lookup_fragfn(id),
            FragfnForm::UserDefined => self.build_fragfn(id),
        };
        self.bind(Category::FragFn, id, result, |session, handle| {
            session.fragfns.bind(id, handle)
        })
    }

    fn lookup_fragfn(&mut self, id: &str) -> Result<FragFnHandle, EvalError> {
        let record = self.pop("fragfn")?;
        let (Some(key), Some(database)) = (
            record.get("key").and_then(Value::as_str),
            record.get("database").and_then(Value::as_str),
        ) else {
            return Err(EvalError::malformed(
                "fragfn",
                format!("expected a {{key, database}} record, found {}", record),
            ));
        };
        self.describe(format!(
            "define the fragility function named [{}], using the key [{}] in {}",
            id, key, database
        ));
        self.engine
            .lookup_fragility_function(key, database)
            .map_err(adapter("lookup_fragility_function"))
    }

    fn build_fragfn(&mut self, id: &str) -> Result<FragFnHandle, EvalError> {
        let options = self.pop("fragfn")?;
        let pairs = self.pop("fragfn")?;
        let states = expand_states("fragfn", &options, &pairs)?;
        self.describe(format!(
            "define the fragility function named [{}] with {} damage state(s) given as {}",
            id,
            states.len(),
            options
        ));
        self.engine
            .create_fragility_function(&states)
            .map_err(adapter("create_fragility_function"))
    }

    pub(super) fn lossfn(&mut self, id: &str) -> Result<(), EvalError> {
        let result = self.build_lossfn(id);
        self.bind(Category::LossFn, id, result, |session, handle| {
            session.lossfns.bind(id, handle)
        })
    }

    fn build_lossfn(&mut self, id: &str) -> Result<LossFnHandle, EvalError> {
        let records = self.pop("lossfn")?;
        let states = records
            .as_array()
            .ok_or_else(|| {
                EvalError::malformed(
                    "lossfn",
                    format!("expected per-state records, found {}", records),
                )
            })?
            .iter()
            .map(|record| {
                LognormalState::from_value(record).ok_or_else(|| {
                    EvalError::malformed(
                        "lossfn",
                        format!("expected a damage state record, found {}", record),
                    )
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.describe(format!(
            "define the loss function named [{}] with {} damage state(s)",
            id,
            states.len()
        ));
        self.engine
            .create_loss_function(&states)
            .map_err(adapter("create_loss_function"))
    }

    pub(super) fn compgroup(
        &mut self,
        id: &str,
        edp: &str,
        fragfn: &str,
        lossfn: &str,
        count: i64,
    ) -> Result<(), EvalError> {
        let edp_handle = self.lookup(Category::Edp, edp, |s| &s.edps);
        let fragfn_handle = self.lookup(Category::FragFn, fragfn, |s| &s.fragfns);
        let lossfn_handle = self.lookup(Category::LossFn, lossfn, |s| &s.lossfns);
        self.describe(format!(
            "create a group of {} components, called '{}', using the EDP '{}', \
             the fragility function '{}', and the loss function '{}'",
            count, id, edp, fragfn, lossfn
        ));
        let result = self
            .engine
            .create_component_group(edp_handle, fragfn_handle, lossfn_handle, count)
            .map_err(adapter("create_component_group"));
        self.bind(Category::CompGroup, id, result, |session, handle| {
            session.compgroups.bind(id, handle)
        })
    }

    /// Resolve a cross-reference, warning when it is not bound.
    fn lookup<H: Copy>(
        &mut self,
        category: Category,
        id: &str,
        table: fn(&Session) -> &SymbolTable<H>,
    ) -> Option<H> {
        let handle = table(&self.session).get(id);
        if handle.is_none() {
            self.unresolved(category, id);
        }
        handle
    }

    fn bind<H: fmt::Display>(
        &mut self,
        category: Category,
        id: &str,
        result: Result<H, EvalError>,
        store: impl FnOnce(&mut Session, H),
    ) -> Result<(), EvalError> {
        match result {
            Ok(handle) => {
                self.describe(format!("bound {} '{}' to {}", category, id, handle));
                store(&mut self.session, handle);
                Ok(())
            }
            Err(err) => {
                self.session.bind_undefined(category, id);
                Err(err)
            }
        }
    }
}
