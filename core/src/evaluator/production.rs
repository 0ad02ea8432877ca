//! Parse events consumed by the evaluator.
//!
//! The host parser walks its tree and reports each grammar production twice:
//! once on entry and once on exit. A production carries the terminal tokens
//! it matched; values produced by its child productions are already on the
//! operand stack by the time it exits.

use crate::{
    engine::{FunctionFamily, MuParam, SdParam},
    session::{Category, IntegrationMethod, RelationshipType},
};

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Enter(Production),
    Exit(Production),
}

/// A grammar production and its terminal tokens.
///
/// String tokens are unquoted.
#[derive(Debug, Clone, PartialEq)]
pub enum Production {
    /// One top-level script command. `text` is used in diagnostics.
    Command { text: String },

    Title { title: String },

    /// `detfn <id> <family> [params]`. The parameter array is on the stack.
    Detfn { id: String, family: FunctionFamily },

    /// A string literal, or a numerical scalar already on the stack.
    Scalar { string: Option<String> },
    /// Two scalars combined into a pair.
    Scalar2,
    /// A pair extended with a third scalar.
    Scalar3,
    VarRef { id: String },
    NumericalScalar(NumericToken),

    Parameter(Literal),
    ParameterArray,
    ParameterDictionary,
    DictionaryEntry { key: String },

    /// The lognormal option record stays on the stack; the two function
    /// identifiers are tokens.
    Probfn {
        id: String,
        mu_function: String,
        sd_function: String,
    },
    LognormalOptions {
        mu: Option<MuParam>,
        sd: Option<SdParam>,
    },

    Im { id: String, function: String },
    Edp { id: String, im: String, probfn: String },

    FragfnDbParams { key: String, database: Option<String> },
    Fragfn { id: String, form: FragfnForm },
    Scalar2Sequence,

    /// Expands the pair sequence and option record into per-state records.
    SimpleLoss,
    Lossfn { id: String },

    Compgroup {
        id: String,
        edp: String,
        fragfn: String,
        lossfn: String,
        count: i64,
    },

    PrintOptions { filename: Option<String>, append: bool },
    PrintMessage(MessageToken),
    Print { target: PrintTarget, has_options: bool },

    /// `iterations` is `None` when the limit was written as an expression.
    Integration {
        method: IntegrationMethod,
        iterations: Option<i64>,
    },

    RecorderType(RelationshipType),
    RecorderAt(AtToken),
    FloatArray { values: Vec<f64> },
    ColSpec(ColumnToken),
    RecorderCols,
    Recorder {
        id: String,
        has_type: bool,
        has_at: bool,
        has_cols: bool,
        has_options: bool,
    },

    /// `$( ... )`, with `text` the expression between the parentheses.
    Expression { text: String },

    Analyze,
    Set { id: String },
}

impl Production {
    /// Productions that open an operand scope on entry and close it on exit.
    pub fn is_scoped(&self) -> bool {
        matches!(
            self,
            Production::ParameterArray
                | Production::ParameterDictionary
                | Production::Scalar2Sequence
                | Production::RecorderCols
        )
    }

    /// The table entry an entity command binds, if this is one.
    pub fn entity(&self) -> Option<(Category, &str)> {
        match self {
            Production::Detfn { id, .. } => Some((Category::DetFn, id)),
            Production::Probfn { id, .. } => Some((Category::ProbFn, id)),
            Production::Im { id, .. } => Some((Category::Im, id)),
            Production::Edp { id, .. } => Some((Category::Edp, id)),
            Production::Fragfn { id, .. } => Some((Category::FragFn, id)),
            Production::Lossfn { id } => Some((Category::LossFn, id)),
            Production::Compgroup { id, .. } => Some((Category::CompGroup, id)),
            _ => None,
        }
    }

    /// Short production name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Production::Command { .. } => "command",
            Production::Title { .. } => "title",
            Production::Detfn { .. } => "detfn",
            Production::Scalar { .. } => "scalar",
            Production::Scalar2 => "scalar2",
            Production::Scalar3 => "scalar3",
            Production::VarRef { .. } => "var_ref",
            Production::NumericalScalar(_) => "numerical_scalar",
            Production::Parameter(_) => "parameter",
            Production::ParameterArray => "parameter_array",
            Production::ParameterDictionary => "parameter_dictionary",
            Production::DictionaryEntry { .. } => "dictionary_entry",
            Production::Probfn { .. } => "probfn",
            Production::LognormalOptions { .. } => "lognormal_options",
            Production::Im { .. } => "im",
            Production::Edp { .. } => "edp",
            Production::FragfnDbParams { .. } => "fragfn_db_params",
            Production::Fragfn { .. } => "fragfn",
            Production::Scalar2Sequence => "scalar2_sequence",
            Production::SimpleLoss => "simple_loss",
            Production::Lossfn { .. } => "lossfn",
            Production::Compgroup { .. } => "compgroup",
            Production::PrintOptions { .. } => "print_options",
            Production::PrintMessage(_) => "print_message",
            Production::Print { .. } => "print",
            Production::Integration { .. } => "integration",
            Production::RecorderType(_) => "recorder_type",
            Production::RecorderAt(_) => "recorder_at",
            Production::FloatArray { .. } => "float_array",
            Production::ColSpec(_) => "col_spec",
            Production::RecorderCols => "recorder_cols",
            Production::Recorder { .. } => "recorder",
            Production::Expression { .. } => "expression",
            Production::Analyze => "analyze",
            Production::Set { .. } => "set",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NumericToken {
    Integer(i64),
    Float(f64),
    /// A variable reference or expression child already pushed its value.
    Nested,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Identifier(String),
    String(String),
    Integer(i64),
    Float(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragfnForm {
    /// `{key, database}` record on the stack.
    Database,
    /// Pair sequence, then option record, on the stack.
    UserDefined,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MessageToken {
    String(String),
    /// A variable reference or expression child already pushed its value.
    Nested,
    Blank,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PrintTarget {
    /// The message value is on the stack.
    Message,
    Entity { category: Category, id: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum AtToken {
    /// Float literals written inline.
    Values(Vec<f64>),
    /// A float array child already pushed its value.
    Array,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnToken {
    Placement(String),
    Spread(String),
    /// A scalar child already pushed its value.
    Scalar,
}
