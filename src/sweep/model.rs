use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{SweepError, SweepResult};

// ---------------------------------------------------------------------------
// Prior – weight prior family understood by the trainer
// ---------------------------------------------------------------------------

/// Named family of weight priors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Prior {
    #[serde(rename = "gaussian")]
    Gaussian,
    #[serde(rename = "laplace")]
    Laplace,
    #[serde(rename = "student-t")]
    StudentT,
    #[serde(rename = "cauchy")]
    Cauchy,
    #[serde(rename = "uniform")]
    Uniform,
    #[serde(rename = "horseshoe")]
    Horseshoe,
    #[serde(rename = "convcorrnormal")]
    ConvCorrNormal,
    #[serde(rename = "improper")]
    Improper,
}

impl Prior {
    pub const ALL: [Prior; 8] = [
        Prior::Gaussian,
        Prior::Laplace,
        Prior::StudentT,
        Prior::Cauchy,
        Prior::Uniform,
        Prior::Horseshoe,
        Prior::ConvCorrNormal,
        Prior::Improper,
    ];

    /// Name passed on the training command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Prior::Gaussian => "gaussian",
            Prior::Laplace => "laplace",
            Prior::StudentT => "student-t",
            Prior::Cauchy => "cauchy",
            Prior::Uniform => "uniform",
            Prior::Horseshoe => "horseshoe",
            Prior::ConvCorrNormal => "convcorrnormal",
            Prior::Improper => "improper",
        }
    }
}

impl FromStr for Prior {
    type Err = SweepError;

    fn from_str(s: &str) -> SweepResult<Self> {
        let needle = s.trim();
        Prior::ALL
            .iter()
            .copied()
            .find(|p| p.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| SweepError::UnknownPrior(s.to_string()))
    }
}

impl fmt::Display for Prior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// InferenceMethod – sampler used to draw weight samples
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum InferenceMethod {
    #[serde(rename = "SGLD")]
    Sgld,
    #[serde(rename = "VerletSGLD")]
    VerletSgld,
    #[serde(rename = "HMC")]
    Hmc,
}

impl InferenceMethod {
    pub const ALL: [InferenceMethod; 3] = [
        InferenceMethod::Sgld,
        InferenceMethod::VerletSgld,
        InferenceMethod::Hmc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InferenceMethod::Sgld => "SGLD",
            InferenceMethod::VerletSgld => "VerletSGLD",
            InferenceMethod::Hmc => "HMC",
        }
    }
}

impl FromStr for InferenceMethod {
    type Err = SweepError;

    fn from_str(s: &str) -> SweepResult<Self> {
        let needle = s.trim();
        InferenceMethod::ALL
            .iter()
            .copied()
            .find(|m| m.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| SweepError::UnknownInference(s.to_string()))
    }
}

impl fmt::Display for InferenceMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Dataset – opaque identifier forwarded to the trainer
// ---------------------------------------------------------------------------

/// Dataset identifier. The trainer owns its meaning; we only require a
/// non-empty token that survives a shell command line unquoted and can be
/// used verbatim as one path component, so slugs stay collision-free.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Dataset(String);

impl Dataset {
    pub fn new(name: impl Into<String>) -> SweepResult<Self> {
        let name = name.into();
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
        if valid {
            Ok(Dataset(name))
        } else {
            Err(SweepError::InvalidDataset(name))
        }
    }

    /// Identifier known to be valid at compile time.
    pub(crate) fn builtin(name: &'static str) -> Self {
        Dataset(name.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Dataset {
    type Error = SweepError;

    fn try_from(value: String) -> SweepResult<Self> {
        Dataset::new(value)
    }
}

impl From<Dataset> for String {
    fn from(value: Dataset) -> Self {
        value.0
    }
}

impl FromStr for Dataset {
    type Err = SweepError;

    fn from_str(s: &str) -> SweepResult<Self> {
        Dataset::new(s.trim())
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Axis – the five swept dimensions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Axis {
    Prior,
    Scale,
    Dataset,
    Inference,
    Temperature,
}

impl Axis {
    /// Axes in loop order, outermost first.
    pub const ALL: [Axis; 5] = [
        Axis::Prior,
        Axis::Scale,
        Axis::Dataset,
        Axis::Inference,
        Axis::Temperature,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Axis::Prior => "prior",
            Axis::Scale => "scale",
            Axis::Dataset => "dataset",
            Axis::Inference => "inference",
            Axis::Temperature => "temperature",
        }
    }

    /// Parse a raw value for this axis.
    pub fn parse_value(&self, raw: &str) -> SweepResult<AxisValue> {
        let raw = raw.trim();
        match self {
            Axis::Prior => raw.parse().map(AxisValue::Prior),
            Axis::Dataset => raw.parse().map(AxisValue::Dataset),
            Axis::Inference => raw.parse().map(AxisValue::Inference),
            Axis::Scale | Axis::Temperature => raw
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(AxisValue::Number)
                .ok_or_else(|| SweepError::InvalidAxisValue {
                    axis: self.name().to_string(),
                    value: raw.to_string(),
                }),
        }
    }
}

impl FromStr for Axis {
    type Err = SweepError;

    fn from_str(s: &str) -> SweepResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prior" | "weight_prior" => Ok(Axis::Prior),
            "scale" | "weight_scale" => Ok(Axis::Scale),
            "dataset" | "data" => Ok(Axis::Dataset),
            "inference" => Ok(Axis::Inference),
            "temperature" | "temp" => Ok(Axis::Temperature),
            other => Err(SweepError::UnknownAxis(other.to_string())),
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// AxisValue – one cell of the sweep table
// ---------------------------------------------------------------------------

/// A value on any axis. Lives in `BTreeSet`s, so it must be totally ordered.
/// Equality follows the ordering (`-0.0 != 0.0`).
#[derive(Debug, Clone)]
pub enum AxisValue {
    Prior(Prior),
    Dataset(Dataset),
    Inference(InferenceMethod),
    Number(f64),
}

impl PartialEq for AxisValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for AxisValue {}

impl PartialOrd for AxisValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AxisValue {
    fn cmp(&self, other: &Self) -> Ordering {
        fn discriminant(v: &AxisValue) -> u8 {
            match v {
                AxisValue::Prior(_) => 0,
                AxisValue::Dataset(_) => 1,
                AxisValue::Inference(_) => 2,
                AxisValue::Number(_) => 3,
            }
        }
        match (self, other) {
            (AxisValue::Prior(a), AxisValue::Prior(b)) => a.cmp(b),
            (AxisValue::Dataset(a), AxisValue::Dataset(b)) => a.cmp(b),
            (AxisValue::Inference(a), AxisValue::Inference(b)) => a.cmp(b),
            (AxisValue::Number(a), AxisValue::Number(b)) => a.total_cmp(b),
            _ => discriminant(self).cmp(&discriminant(other)),
        }
    }
}

impl fmt::Display for AxisValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AxisValue::Prior(p) => write!(f, "{p}"),
            AxisValue::Dataset(d) => write!(f, "{d}"),
            AxisValue::Inference(m) => write!(f, "{m}"),
            AxisValue::Number(v) => write!(f, "{v}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Combination – one point of the Cartesian product
// ---------------------------------------------------------------------------

/// One job's worth of hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Combination {
    pub prior: Prior,
    pub scale: f64,
    pub dataset: Dataset,
    pub inference: InferenceMethod,
    pub temperature: f64,
    /// Zero-based replicate index.
    pub replicate: usize,
}

impl Combination {
    pub fn value(&self, axis: Axis) -> AxisValue {
        match axis {
            Axis::Prior => AxisValue::Prior(self.prior),
            Axis::Scale => AxisValue::Number(self.scale),
            Axis::Dataset => AxisValue::Dataset(self.dataset.clone()),
            Axis::Inference => AxisValue::Inference(self.inference),
            Axis::Temperature => AxisValue::Number(self.temperature),
        }
    }

    /// Stable identifier built from the five axis values, used for job
    /// names and directory names. Does not include the replicate.
    ///
    /// Every component is already path-safe, so nothing is rewritten and
    /// distinct combinations keep distinct slugs: the prior never contains
    /// `_`, the inference name never does either, and the two numbers are
    /// anchored by the trailing `_scale…_T…`.
    pub fn slug(&self) -> String {
        format!(
            "{}_{}_{}_scale{}_T{}",
            self.prior, self.dataset, self.inference, self.scale, self.temperature
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prior_names_round_trip_through_from_str() {
        for prior in Prior::ALL {
            assert_eq!(prior.as_str().parse::<Prior>().unwrap(), prior);
        }
        assert_eq!("Gaussian".parse::<Prior>().unwrap(), Prior::Gaussian);
        assert!(matches!(
            "normalish".parse::<Prior>(),
            Err(SweepError::UnknownPrior(_))
        ));
    }

    #[test]
    fn inference_parse_is_case_insensitive() {
        assert_eq!("sgld".parse::<InferenceMethod>().unwrap(), InferenceMethod::Sgld);
        assert_eq!(
            "verletsgld".parse::<InferenceMethod>().unwrap(),
            InferenceMethod::VerletSgld
        );
        assert!("mcmc".parse::<InferenceMethod>().is_err());
    }

    #[test]
    fn dataset_rejects_whitespace_and_empty() {
        assert!(Dataset::new("mnist").is_ok());
        assert!(Dataset::new("fashion_mnist").is_ok());
        assert!(Dataset::new("").is_err());
        assert!(Dataset::new("mnist; rm").is_err());
    }

    #[test]
    fn axis_aliases() {
        assert_eq!("weight_prior".parse::<Axis>().unwrap(), Axis::Prior);
        assert_eq!("data".parse::<Axis>().unwrap(), Axis::Dataset);
        assert_eq!("temp".parse::<Axis>().unwrap(), Axis::Temperature);
        assert!("lr".parse::<Axis>().is_err());
    }

    #[test]
    fn numeric_axis_rejects_nan_and_text() {
        assert_eq!(
            Axis::Scale.parse_value("1.41").unwrap(),
            AxisValue::Number(1.41)
        );
        assert!(Axis::Temperature.parse_value("NaN").is_err());
        assert!(Axis::Temperature.parse_value("warm").is_err());
    }

    #[test]
    fn numbers_order_totally() {
        let mut values = vec![
            AxisValue::Number(1.0),
            AxisValue::Number(0.001),
            AxisValue::Number(0.1),
        ];
        values.sort();
        assert_eq!(
            values,
            vec![
                AxisValue::Number(0.001),
                AxisValue::Number(0.1),
                AxisValue::Number(1.0)
            ]
        );
    }

    #[test]
    fn dataset_rejects_path_separators() {
        assert!(matches!(
            Dataset::new("cifar10/aug"),
            Err(SweepError::InvalidDataset(_))
        ));
        assert!(Dataset::new("cifar10_aug").is_ok());
    }

    #[test]
    fn signed_zero_equality_matches_ordering() {
        let pos = AxisValue::Number(0.0);
        let neg = AxisValue::Number(-0.0);
        assert_ne!(pos, neg);
        assert_eq!(neg.cmp(&pos), Ordering::Less);
        assert_eq!(pos, AxisValue::Number(0.0));
    }

    #[test]
    fn slug_keeps_components_verbatim() {
        let combo = Combination {
            prior: Prior::StudentT,
            scale: 1.41,
            dataset: Dataset::new("cifar10_aug").unwrap(),
            inference: InferenceMethod::VerletSgld,
            temperature: 0.01,
            replicate: 0,
        };
        assert_eq!(combo.slug(), "student-t_cifar10_aug_VerletSGLD_scale1.41_T0.01");
    }
}
