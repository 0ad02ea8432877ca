//! Value-construction productions.
//!
//! Each handler consumes the operands its child productions pushed and pushes
//! exactly one value in their place, except `col_spec` over a scalar, which
//! leaves the scalar where it is.

use tracing::debug;

use crate::{
    Value,
    engine::{LognormalOptions, LognormalState, ModelEngine, MuParam, SdParam},
    evaluator::{
        AtToken, ColumnToken, EvalError, Evaluator, Literal, MessageToken, NumericToken,
    },
    expression,
    session::{AtSpec, Category, RelationshipType},
};

/// Database named by a fragility lookup that does not name one.
pub const DEFAULT_DATABASE: &str = "(default database)";

impl<E: ModelEngine> Evaluator<E> {
    pub(super) fn scalar(&mut self, string: Option<&str>) -> Result<(), EvalError> {
        let value = match string {
            Some(s) => Value::string(s),
            None => self.pop("scalar")?,
        };
        self.stack.push(value);
        Ok(())
    }

    pub(super) fn scalar2(&mut self) -> Result<(), EvalError> {
        let second = self.pop("scalar2")?;
        let first = self.pop("scalar2")?;
        self.stack.push(Value::Array(vec![first, second]));
        Ok(())
    }

    pub(super) fn scalar3(&mut self) -> Result<(), EvalError> {
        let third = self.pop("scalar3")?;
        match self.pop("scalar3")? {
            Value::Array(mut items) if items.len() == 2 => {
                items.push(third);
                self.stack.push(Value::Array(items));
                Ok(())
            }
            other => Err(EvalError::malformed(
                "scalar3",
                format!("expected a pair to extend, found {}", other),
            )),
        }
    }

    pub(super) fn var_ref(&mut self, id: &str) -> Result<(), EvalError> {
        if !self.session.variables.contains_key(id) {
            self.unresolved(Category::Variable, id);
        }
        let value = self.session.variable(id);
        self.stack.push(value);
        Ok(())
    }

    pub(super) fn numerical_scalar(&mut self, token: &NumericToken) -> Result<(), EvalError> {
        let value = match token {
            NumericToken::Integer(i) => Value::Integer(*i),
            NumericToken::Float(f) => Value::Float(*f),
            NumericToken::Nested => match self.pop("numerical_scalar")? {
                value @ (Value::Integer(_) | Value::Float(_) | Value::Undefined) => value,
                other => {
                    return Err(EvalError::malformed(
                        "numerical_scalar",
                        format!("expected a number, found {} {}", other.kind(), other),
                    ));
                }
            },
        };
        self.stack.push(value);
        Ok(())
    }

    pub(super) fn parameter(&mut self, literal: &Literal) -> Result<(), EvalError> {
        let value = match literal {
            Literal::Identifier(s) | Literal::String(s) => Value::string(s.as_str()),
            Literal::Integer(i) => Value::Integer(*i),
            Literal::Float(f) => Value::Float(*f),
        };
        self.stack.push(value);
        Ok(())
    }

    pub(super) fn parameter_array(&mut self) -> Result<(), EvalError> {
        let items = self.close_scope("parameter_array")?;
        self.stack.push(Value::Array(items));
        Ok(())
    }

    /// Fold the `[key, value]` entries of the closed scope. Later keys win.
    pub(super) fn parameter_dictionary(&mut self) -> Result<(), EvalError> {
        let entries = self.close_scope("parameter_dictionary")?;
        let mut pairs = Vec::with_capacity(entries.len());
        for entry in entries {
            match entry {
                Value::Array(mut pair) if pair.len() == 2 => {
                    let value = pair.pop().unwrap_or(Value::Undefined);
                    match pair.pop() {
                        Some(Value::String(key)) => pairs.push((key, value)),
                        key => {
                            return Err(EvalError::malformed(
                                "parameter_dictionary",
                                format!("dictionary key must be a string, found {:?}", key),
                            ));
                        }
                    }
                }
                other => {
                    return Err(EvalError::malformed(
                        "parameter_dictionary",
                        format!("expected a [key, value] entry, found {}", other),
                    ));
                }
            }
        }
        self.stack.push(Value::dictionary(pairs));
        Ok(())
    }

    pub(super) fn dictionary_entry(&mut self, key: &str) -> Result<(), EvalError> {
        let value = self.pop("dictionary_entry")?;
        self.stack
            .push(Value::Array(vec![Value::string(key), value]));
        Ok(())
    }

    pub(super) fn lognormal_options(
        &mut self,
        mu: Option<MuParam>,
        sd: Option<SdParam>,
    ) -> Result<(), EvalError> {
        let options = LognormalOptions {
            mu: mu.unwrap_or_default(),
            sd: sd.unwrap_or_default(),
        };
        self.stack.push(options.to_value());
        Ok(())
    }

    pub(super) fn fragfn_db_params(
        &mut self,
        key: &str,
        database: Option<&str>,
    ) -> Result<(), EvalError> {
        self.stack.push(Value::dictionary([
            ("key", Value::string(key)),
            ("database", Value::string(database.unwrap_or(DEFAULT_DATABASE))),
        ]));
        Ok(())
    }

    pub(super) fn scalar2_sequence(&mut self) -> Result<(), EvalError> {
        let pairs = self.close_scope("scalar2_sequence")?;
        self.stack.push(Value::Array(pairs));
        Ok(())
    }

    /// Replace the pair sequence and option record with per-state records.
    pub(super) fn simple_loss(&mut self) -> Result<(), EvalError> {
        let options = self.pop("simple_loss")?;
        let pairs = self.pop("simple_loss")?;
        let states = expand_states("simple_loss", &options, &pairs)?;
        self.stack
            .push(Value::array(states.iter().map(LognormalState::to_value)));
        Ok(())
    }

    pub(super) fn print_options(
        &mut self,
        filename: Option<&str>,
        append: bool,
    ) -> Result<(), EvalError> {
        let filename = filename.map_or(Value::Undefined, Value::string);
        self.stack.push(Value::dictionary([
            ("filename", filename),
            ("append", Value::Integer(append.into())),
        ]));
        Ok(())
    }

    pub(super) fn print_message(&mut self, token: &MessageToken) -> Result<(), EvalError> {
        let value = match token {
            MessageToken::String(s) => Value::string(s.as_str()),
            MessageToken::Nested => self.pop("print_message")?,
            MessageToken::Blank => Value::string(""),
        };
        self.stack.push(value);
        Ok(())
    }

    pub(super) fn recorder_type(&mut self, kind: RelationshipType) -> Result<(), EvalError> {
        self.stack.push(Value::string(kind.label()));
        Ok(())
    }

    /// An `at` clause must be exactly `from, by, to`.
    pub(super) fn recorder_at(&mut self, token: &AtToken) -> Result<(), EvalError> {
        let values = match token {
            AtToken::Values(values) => values.clone(),
            AtToken::Array => {
                let array = self.pop("recorder_at")?;
                floats("recorder_at", &array)?
            }
        };
        let at = AtSpec::from_clause(&values).ok_or_else(|| {
            EvalError::malformed(
                "recorder_at",
                format!(
                    "need exactly three values (from, by, to), found {}",
                    values.len()
                ),
            )
        })?;
        self.stack.push(at.to_value());
        Ok(())
    }

    pub(super) fn float_array(&mut self, values: &[f64]) -> Result<(), EvalError> {
        self.stack
            .push(Value::array(values.iter().copied().map(Value::Float)));
        Ok(())
    }

    pub(super) fn col_spec(&mut self, token: &ColumnToken) -> Result<(), EvalError> {
        match token {
            ColumnToken::Placement(s) | ColumnToken::Spread(s) => {
                self.stack.push(Value::string(s.as_str()));
            }
            ColumnToken::Scalar => {
                if self.stack.peek().is_none() {
                    return Err(EvalError::StackUnderflow {
                        production: "col_spec",
                    });
                }
            }
        }
        Ok(())
    }

    pub(super) fn recorder_cols(&mut self) -> Result<(), EvalError> {
        let columns = self.close_scope("recorder_cols")?;
        self.stack.push(Value::Array(columns));
        Ok(())
    }

    pub(super) fn expression(&mut self, text: &str) -> Result<(), EvalError> {
        let value = expression::evaluate(text, &self.namespace, &self.options.expression)
            .map_err(|error| EvalError::Expression {
                text: text.to_string(),
                error,
            })?;
        debug!(text, %value, "expression");
        self.describe(format!("evaluate the expression '{}' --> {}", text, value));
        self.stack.push(value);
        Ok(())
    }
}

/// Read an array of numbers.
pub(super) fn floats(production: &'static str, value: &Value) -> Result<Vec<f64>, EvalError> {
    let items = value.as_array().ok_or_else(|| {
        EvalError::malformed(production, format!("expected an array, found {}", value))
    })?;
    items
        .iter()
        .map(|item| {
            item.as_float().ok_or_else(|| {
                EvalError::malformed(production, format!("expected a number, found {}", item))
            })
        })
        .collect()
}

/// Expand `[mu, sd]` pairs with an option record into per-state parameters.
pub(super) fn expand_states(
    production: &'static str,
    options: &Value,
    pairs: &Value,
) -> Result<Vec<LognormalState>, EvalError> {
    let options = LognormalOptions::from_value(options).ok_or_else(|| {
        EvalError::malformed(
            production,
            format!("expected a {{mu, sd}} option record, found {}", options),
        )
    })?;
    let pairs = pairs.as_array().ok_or_else(|| {
        EvalError::malformed(production, format!("expected a pair sequence, found {}", pairs))
    })?;
    pairs
        .iter()
        .map(|pair| match pair.as_array() {
            Some([mu, sd]) => match (mu.as_float(), sd.as_float()) {
                (Some(mu), Some(sd)) => Ok(options.state(mu, sd)),
                _ => Err(EvalError::malformed(
                    production,
                    format!("damage state parameters must be numbers, found {}", pair),
                )),
            },
            _ => Err(EvalError::malformed(
                production,
                format!("expected a [mu, sd] pair, found {}", pair),
            )),
        })
        .collect()
}
