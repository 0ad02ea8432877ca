//! Effect commands: title, set, print, integration, recorder, analyze.

use core::fmt;

use crate::{
    Value,
    engine::ModelEngine,
    evaluator::{EvalError, Evaluator, PrintTarget, eval::adapter},
    session::{
        AtSpec, Category, Destination, IntegrationMethod, IntegrationSettings,
        RecorderDescriptor, RelationshipType,
    },
};

/// What a `print` command prints.
#[derive(Debug, Clone, PartialEq)]
pub enum PrintSubject {
    Message(Value),
    Entity {
        category: Category,
        id: String,
        description: String,
    },
    /// The named entity does not exist; printed as a marker.
    Undefined { category: Category, id: String },
}

impl fmt::Display for PrintSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrintSubject::Message(Value::String(s)) => f.write_str(s),
            PrintSubject::Message(value) => write!(f, "{}", value),
            PrintSubject::Entity {
                id, description, ..
            } => write!(f, "the {} known as {}", description, id),
            PrintSubject::Undefined { category, id } => {
                write!(f, "<undefined {} '{}'>", category.keyword().to_uppercase(), id)
            }
        }
    }
}

/// A print request. The core performs no I/O; hosts act on these.
#[derive(Debug, Clone, PartialEq)]
pub struct PrintDirective {
    pub subject: PrintSubject,
    /// `None` means standard output.
    pub destination: Option<Destination>,
}

impl fmt::Display for PrintDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.destination {
            Some(destination) => write!(f, "print {} {}", self.subject, destination),
            None => write!(f, "print {} to standard output", self.subject),
        }
    }
}

impl<E: ModelEngine> Evaluator<E> {
    pub(super) fn title(&mut self, title: &str) -> Result<(), EvalError> {
        self.describe(format!("set the title to [{}]", title));
        self.session.title = Some(title.to_string());
        Ok(())
    }

    pub(super) fn set(&mut self, id: &str) -> Result<(), EvalError> {
        let value = self.pop("set")?;
        self.describe(format!("set the variable '{}' to {}", id, value));
        self.session.set_variable(id, value);
        Ok(())
    }

    pub(super) fn print(&mut self, target: &PrintTarget, has_options: bool) -> Result<(), EvalError> {
        let destination = if has_options {
            let options = self.pop("print")?;
            destination("print", &options)?
        } else {
            None
        };
        let subject = match target {
            PrintTarget::Message => PrintSubject::Message(self.pop("print")?),
            PrintTarget::Entity { category, id } => {
                match self.session.describe(*category, id) {
                    Some(description) => PrintSubject::Entity {
                        category: *category,
                        id: id.clone(),
                        description,
                    },
                    None => {
                        self.unresolved(*category, id);
                        PrintSubject::Undefined {
                            category: *category,
                            id: id.clone(),
                        }
                    }
                }
            }
        };
        let directive = PrintDirective {
            subject,
            destination,
        };
        self.describe(directive.to_string());
        self.outputs.push(directive);
        Ok(())
    }

    /// Operands are the precision and, when written as an expression, the
    /// evaluation limit on top of it.
    pub(super) fn integration(
        &mut self,
        method: &IntegrationMethod,
        iterations: Option<i64>,
    ) -> Result<(), EvalError> {
        let max_evaluations = match iterations {
            Some(n) => n,
            None => {
                let value = self.pop("integration")?;
                integer("integration", &value)?
            }
        };
        let precision = self.pop("integration")?;
        let tolerance = precision.as_float().ok_or_else(|| {
            EvalError::malformed(
                "integration",
                format!("precision must be a number, found {}", precision),
            )
        })?;
        if let IntegrationMethod::Unknown(name) = method {
            self.warn(EvalError::UnknownIntegrationMethod {
                method: name.clone(),
            });
        }
        let settings = IntegrationSettings {
            method: method.clone(),
            tolerance,
            max_evaluations,
        };
        self.describe(format!(
            "integrate using the {} algorithm, with precision of {} and max iterations of {}",
            settings.method, settings.tolerance, settings.max_evaluations
        ));
        self.engine
            .configure_integration(&settings)
            .map_err(adapter("configure_integration"))?;
        self.session.integration = Some(settings);
        Ok(())
    }

    /// Operands, bottom to top: type, at, columns, options, each optional.
    pub(super) fn recorder(
        &mut self,
        id: &str,
        has_type: bool,
        has_at: bool,
        has_cols: bool,
        has_options: bool,
    ) -> Result<(), EvalError> {
        let destination = if has_options {
            let options = self.pop("recorder")?;
            destination("recorder", &options)?
        } else {
            None
        };
        let columns = if has_cols {
            match self.pop("recorder")? {
                Value::Array(columns) => Some(columns),
                other => {
                    return Err(EvalError::malformed(
                        "recorder",
                        format!("expected a column list, found {}", other),
                    ));
                }
            }
        } else {
            None
        };
        let at = if has_at {
            let value = self.pop("recorder")?;
            let at = AtSpec::from_value(&value).ok_or_else(|| {
                EvalError::malformed(
                    "recorder",
                    format!("expected {{from, to, by}}, found {}", value),
                )
            })?;
            Some(at)
        } else {
            None
        };
        let kind = if has_type {
            let value = self.pop("recorder")?;
            value
                .as_str()
                .and_then(RelationshipType::from_label)
                .ok_or_else(|| {
                    EvalError::malformed(
                        "recorder",
                        format!("unknown relationship type {}", value),
                    )
                })?
        } else {
            RelationshipType::default()
        };
        let recorder = RecorderDescriptor {
            kind,
            target: id.to_string(),
            at,
            columns,
            destination,
        };
        self.describe(format!("record {}", recorder));
        self.session.recorders.push(recorder);
        Ok(())
    }

    /// Run every recorder accumulated so far. The list is kept, so a later
    /// `analyze` runs them all again. A failing recorder does not stop the
    /// ones after it.
    pub(super) fn analyze(&mut self) -> Result<(), EvalError> {
        let recorders = self.session.recorders.clone();
        self.describe(format!("perform analysis of {} recorder(s)", recorders.len()));
        for recorder in &recorders {
            let target = self.session.record_target(recorder.kind, &recorder.target);
            if !target.is_resolved() {
                self.unresolved(recorder.kind.target_category(), &recorder.target);
            }
            match self.engine.run_recorder(recorder, target) {
                Ok(()) => self.describe(format!("ran {}", recorder)),
                Err(source) => self.engine_failure("run_recorder", source),
            }
        }
        Ok(())
    }
}

/// Read a `{filename, append}` option record.
fn destination(production: &'static str, options: &Value) -> Result<Option<Destination>, EvalError> {
    let malformed = || {
        EvalError::malformed(
            production,
            format!("expected {{filename, append}} options, found {}", options),
        )
    };
    let append = options
        .get("append")
        .and_then(Value::as_int)
        .ok_or_else(malformed)?
        != 0;
    match options.get("filename") {
        Some(Value::String(filename)) => Ok(Some(Destination {
            filename: filename.clone(),
            append,
        })),
        Some(Value::Undefined) => Ok(None),
        _ => Err(malformed()),
    }
}

/// Accept integers, and floats with no fractional part.
fn integer(production: &'static str, value: &Value) -> Result<i64, EvalError> {
    match value {
        Value::Integer(i) => Ok(*i),
        Value::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(*f as i64),
        other => Err(EvalError::malformed(
            production,
            format!("expected an integer, found {}", other),
        )),
    }
}
