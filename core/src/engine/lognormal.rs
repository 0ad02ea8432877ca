//! Lognormal parameterization.
//!
//! A lognormal distribution can be given by one of three location measures
//! and one of two spread measures. On the operand stack an option record is a
//! dictionary `{mu: <kind>, sd: <kind>}` of strings, and a damage state is a
//! dictionary keyed by those kinds, e.g. `{median_x: 0.02, sd_ln_x: 0.4}`.

use core::fmt;

use crate::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MuParam {
    #[default]
    MeanLnX,
    MedianX,
    MeanX,
}

impl MuParam {
    pub const ALL: [MuParam; 3] = [MuParam::MeanLnX, MuParam::MedianX, MuParam::MeanX];

    pub const fn as_str(self) -> &'static str {
        match self {
            MuParam::MeanLnX => "mean_ln_x",
            MuParam::MedianX => "median_x",
            MuParam::MeanX => "mean_x",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == s)
    }
}

impl fmt::Display for MuParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SdParam {
    SdX,
    #[default]
    SdLnX,
}

impl SdParam {
    pub const ALL: [SdParam; 2] = [SdParam::SdX, SdParam::SdLnX];

    pub const fn as_str(self) -> &'static str {
        match self {
            SdParam::SdX => "sd_x",
            SdParam::SdLnX => "sd_ln_x",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == s)
    }
}

impl fmt::Display for SdParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `{mu, sd}` option record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LognormalOptions {
    pub mu: MuParam,
    pub sd: SdParam,
}

impl LognormalOptions {
    pub fn to_value(self) -> Value {
        Value::dictionary([
            ("mu", Value::string(self.mu.as_str())),
            ("sd", Value::string(self.sd.as_str())),
        ])
    }

    /// Read an option record. Both keys must be present and name valid kinds.
    pub fn from_value(value: &Value) -> Option<Self> {
        Some(Self {
            mu: MuParam::parse(value.get("mu")?.as_str()?)?,
            sd: SdParam::parse(value.get("sd")?.as_str()?)?,
        })
    }

    /// Expand one `[mu, sd]` pair into a per-state parameter record.
    pub fn state(self, mu: f64, sd: f64) -> LognormalState {
        LognormalState {
            mu_kind: self.mu,
            mu,
            sd_kind: self.sd,
            sd,
        }
    }

    /// Whether a distribution can be built from this combination.
    ///
    /// A location measure in log space cannot be paired with a linear spread.
    pub fn is_supported(self) -> bool {
        !matches!(
            (self.mu, self.sd),
            (MuParam::MeanLnX | MuParam::MedianX, SdParam::SdX)
        )
    }
}

/// One damage state's distribution parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LognormalState {
    pub mu_kind: MuParam,
    pub mu: f64,
    pub sd_kind: SdParam,
    pub sd: f64,
}

impl LognormalState {
    pub fn options(&self) -> LognormalOptions {
        LognormalOptions {
            mu: self.mu_kind,
            sd: self.sd_kind,
        }
    }

    pub fn to_value(&self) -> Value {
        Value::dictionary([
            (self.mu_kind.as_str(), Value::Float(self.mu)),
            (self.sd_kind.as_str(), Value::Float(self.sd)),
        ])
    }

    /// Read a per-state record: exactly one location and one spread entry.
    pub fn from_value(value: &Value) -> Option<Self> {
        let entries = value.as_dictionary()?;
        if entries.len() != 2 {
            return None;
        }
        let (mu_kind, mu) = MuParam::ALL
            .into_iter()
            .find_map(|kind| Some((kind, entries.get(kind.as_str())?.as_float()?)))?;
        let (sd_kind, sd) = SdParam::ALL
            .into_iter()
            .find_map(|kind| Some((kind, entries.get(kind.as_str())?.as_float()?)))?;
        Some(Self {
            mu_kind,
            mu,
            sd_kind,
            sd,
        })
    }
}
