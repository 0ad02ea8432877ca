//! Recorder descriptors and integration settings.

use core::fmt;

use crate::{Value, session::Category};

/// Which relationship a recorder emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RelationshipType {
    DetFn,
    ProbFn,
    ImRate,
    EdpIm,
    EdpRate,
    DsEdp,
    DsIm,
    LossDs,
    LossEdp,
    LossIm,
    /// Used when a recorder names no type.
    #[default]
    DsRate,
}

impl RelationshipType {
    pub const ALL: [RelationshipType; 11] = [
        RelationshipType::DetFn,
        RelationshipType::ProbFn,
        RelationshipType::ImRate,
        RelationshipType::EdpIm,
        RelationshipType::EdpRate,
        RelationshipType::DsEdp,
        RelationshipType::DsIm,
        RelationshipType::LossDs,
        RelationshipType::LossEdp,
        RelationshipType::LossIm,
        RelationshipType::DsRate,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            RelationshipType::DetFn => "deterministic function",
            RelationshipType::ProbFn => "probabilistic function",
            RelationshipType::ImRate => "IM-rate",
            RelationshipType::EdpIm => "EDP-IM",
            RelationshipType::EdpRate => "EDP-rate",
            RelationshipType::DsEdp => "DS-EDP",
            RelationshipType::DsIm => "DS-IM",
            RelationshipType::LossDs => "LOSS-DS",
            RelationshipType::LossEdp => "LOSS-EDP",
            RelationshipType::LossIm => "LOSS-IM",
            RelationshipType::DsRate => "DS-rate",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.label() == label)
    }

    /// The symbol table a recorder of this type resolves its target in.
    pub const fn target_category(self) -> Category {
        match self {
            RelationshipType::DetFn => Category::DetFn,
            RelationshipType::ProbFn => Category::ProbFn,
            RelationshipType::ImRate => Category::Im,
            RelationshipType::EdpIm | RelationshipType::EdpRate => Category::Edp,
            RelationshipType::DsEdp => Category::FragFn,
            RelationshipType::LossDs => Category::LossFn,
            RelationshipType::DsIm
            | RelationshipType::DsRate
            | RelationshipType::LossEdp
            | RelationshipType::LossIm => Category::CompGroup,
        }
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Evaluation points `from..=to` in steps of `by`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtSpec {
    pub from: f64,
    pub to: f64,
    pub by: f64,
}

impl AtSpec {
    /// Build from the three values of an `at` clause, written `from, by, to`.
    pub fn from_clause(values: &[f64]) -> Option<Self> {
        match *values {
            [from, by, to] => Some(Self { from, to, by }),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        Value::dictionary([
            ("from", Value::Float(self.from)),
            ("to", Value::Float(self.to)),
            ("by", Value::Float(self.by)),
        ])
    }

    pub fn from_value(value: &Value) -> Option<Self> {
        Some(Self {
            from: value.get("from")?.as_float()?,
            to: value.get("to")?.as_float()?,
            by: value.get("by")?.as_float()?,
        })
    }
}

/// Where printed or recorded output goes when it is not standard output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub filename: String,
    pub append: bool,
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.append {
            write!(f, "appending to the file [{}]", self.filename)
        } else {
            write!(f, "overwriting the file [{}]", self.filename)
        }
    }
}

/// A request to emit a relationship when the script runs `analyze`.
#[derive(Debug, Clone, PartialEq)]
pub struct RecorderDescriptor {
    pub kind: RelationshipType,
    pub target: String,
    pub at: Option<AtSpec>,
    pub columns: Option<Vec<Value>>,
    /// `None` means standard output.
    pub destination: Option<Destination>,
}

impl fmt::Display for RecorderDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "the {} known as {}", self.kind, self.target)?;
        if let Some(at) = &self.at {
            write!(f, ", at {} to {} by {}", at.from, at.to, at.by)?;
        }
        match &self.destination {
            Some(destination) => write!(f, ", {}", destination)?,
            None => f.write_str(", to standard output")?,
        }
        match &self.columns {
            Some(columns) => {
                f.write_str(", columns:")?;
                for column in columns {
                    write!(f, " {}", column)?;
                }
                Ok(())
            }
            None => f.write_str(", default columns"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrationMethod {
    Maq,
    /// Any method keyword other than MAQ. Kept so it can be reported.
    Unknown(String),
}

impl fmt::Display for IntegrationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrationMethod::Maq => f.write_str("MAQ"),
            IntegrationMethod::Unknown(_) => f.write_str("<unknown>"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntegrationSettings {
    pub method: IntegrationMethod,
    pub tolerance: f64,
    pub max_evaluations: i64,
}
