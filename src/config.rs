//! Sweep configuration loaded from a TOML (or JSON) file.
//!
//! Every key is optional; anything left out falls back to the built-in
//! experiment defaults.
//!
//! ## Example
//!
//! ```toml
//! [grid]
//! priors = ["gaussian", "laplace"]
//! scales = [1.41]
//! datasets = ["mnist"]
//! inference = ["SGLD"]
//! temperatures = [0.1, 1.0]
//! replicates = 1
//!
//! [training]
//! warmup = 45
//! log_root = "../results/exp_prior_sweep"
//! extra = ["lr=0.01"]
//!
//! [scheduler]
//! wall_time = "24:00"
//! resource = "rusage[mem=8192,ngpus_excl_p=1]"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::command::scheduler::SchedulerOptions;
use crate::command::training::TrainingArgs;
use crate::error::{SweepError, SweepResult};
use crate::sweep::filter::{build_selection, selected};
use crate::sweep::grid::SweepGrid;
use crate::sweep::model::{Axis, Combination, Dataset, InferenceMethod, Prior};

/// File looked up in the working directory when nothing else is given.
pub const DEFAULT_CONFIG_NAME: &str = "bnn-sweep.toml";

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "BNN_SWEEP_CONFIG";

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// The swept axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridSection {
    pub priors: Vec<Prior>,
    pub scales: Vec<f64>,
    pub datasets: Vec<Dataset>,
    pub inference: Vec<InferenceMethod>,
    pub temperatures: Vec<f64>,
    pub replicates: usize,
}

impl Default for GridSection {
    fn default() -> Self {
        Self {
            priors: vec![Prior::Gaussian, Prior::Laplace, Prior::StudentT, Prior::Cauchy],
            scales: vec![1.0, 1.41],
            datasets: vec![Dataset::builtin("mnist"), Dataset::builtin("fashion_mnist")],
            inference: vec![InferenceMethod::Sgld, InferenceMethod::VerletSgld],
            temperatures: vec![0.001, 0.01, 0.1, 0.3, 1.0],
            replicates: 1,
        }
    }
}

impl GridSection {
    /// Scales and temperatures must be finite numbers.
    pub fn validate(&self) -> SweepResult<()> {
        let numeric = [(Axis::Scale, &self.scales), (Axis::Temperature, &self.temperatures)];
        for (axis, values) in numeric {
            if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
                return Err(SweepError::InvalidAxisValue {
                    axis: axis.to_string(),
                    value: bad.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub replicates: Option<usize>,
    pub log_root: Option<PathBuf>,
}

/// Full sweep configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SweepConfig {
    /// File this config came from (for display).
    #[serde(skip)]
    pub source: Option<PathBuf>,
    pub grid: GridSection,
    pub training: TrainingArgs,
    pub scheduler: SchedulerOptions,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl SweepConfig {
    /// Resolve the configuration.
    ///
    /// Search order:
    /// 1. `explicit` (from `--config`)
    /// 2. `$BNN_SWEEP_CONFIG`
    /// 3. `bnn-sweep.toml` in the working directory
    /// 4. built-in defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_path(path);
        }
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Self::from_path(Path::new(&path))
                .with_context(|| format!("loading config named by ${CONFIG_ENV}"));
        }
        let local = Path::new(DEFAULT_CONFIG_NAME);
        if local.exists() {
            return Self::from_path(local);
        }
        debug!("no config file found, using built-in defaults");
        Ok(Self::default())
    }

    /// Load a config file. Dispatch by extension.
    ///
    /// Supported formats:
    /// * `.toml` (recommended)
    /// * `.json` – same structure as the TOML file
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;

        let mut config: SweepConfig = match ext.as_str() {
            "toml" => toml::from_str(&text)
                .with_context(|| format!("parsing TOML config {}", path.display()))?,
            "json" => serde_json::from_str(&text)
                .with_context(|| format!("parsing JSON config {}", path.display()))?,
            other => bail!("Unsupported config extension: .{other}"),
        };
        config
            .grid
            .validate()
            .with_context(|| format!("invalid grid in {}", path.display()))?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    pub fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(replicates) = overrides.replicates {
            self.grid.replicates = replicates;
        }
        if let Some(log_root) = &overrides.log_root {
            self.training.log_root = log_root.clone();
        }
    }

    /// Combinations left after applying `--only` selectors.
    pub fn selected_combinations(&self, only: &[String]) -> Result<Vec<Combination>> {
        let selection = build_selection(only.iter().map(String::as_str))?;
        Ok(selected(&self.grid(), &selection))
    }

    /// Render as TOML, e.g. for a starter file.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("serializing config as TOML")
    }

    pub fn grid(&self) -> SweepGrid {
        SweepGrid::new(
            self.grid.priors.clone(),
            self.grid.scales.clone(),
            self.grid.datasets.clone(),
            self.grid.inference.clone(),
            self.grid.temperatures.clone(),
            self.grid.replicates,
        )
    }

    /// Format config for verbose display.
    pub fn display_summary(&self) -> String {
        let join = |items: Vec<String>| items.join(", ");
        let mut lines = Vec::new();
        match &self.source {
            Some(source) => lines.push(format!("   Config: {}", source.display())),
            None => lines.push("   Config: (defaults)".to_string()),
        }
        lines.push(format!(
            "   Priors: {}",
            join(self.grid.priors.iter().map(|p| p.to_string()).collect())
        ));
        lines.push(format!(
            "   Scales: {}",
            join(self.grid.scales.iter().map(|v| v.to_string()).collect())
        ));
        lines.push(format!(
            "   Datasets: {}",
            join(self.grid.datasets.iter().map(|d| d.to_string()).collect())
        ));
        lines.push(format!(
            "   Inference: {}",
            join(self.grid.inference.iter().map(|m| m.to_string()).collect())
        ));
        lines.push(format!(
            "   Temperatures: {}",
            join(self.grid.temperatures.iter().map(|v| v.to_string()).collect())
        ));
        if self.grid.replicates > 1 {
            lines.push(format!("   Replicates: {}", self.grid.replicates));
        }
        lines.push(format!("   Log root: {}", self.training.log_root.display()));
        lines.join("\n")
    }
}
