use std::path::{Path, PathBuf};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{SweepError, SweepResult};
use crate::sweep::model::Combination;

// ---------------------------------------------------------------------------
// TrainingArgs – the fixed part of every training invocation
// ---------------------------------------------------------------------------

/// Keys the launcher fills in itself. Extra arguments may not shadow them.
pub const MANAGED_KEYS: &[&str] = &[
    "weight_prior",
    "data",
    "inference",
    "warmup",
    "burnin",
    "weight_scale",
    "cycles",
    "n_samples",
    "skip",
    "temperature",
    "log_dir",
];

/// Settings shared by all jobs of a sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainingArgs {
    /// Interpreter used to launch the training script.
    pub interpreter: String,
    /// Training script path, relative to the submission directory.
    pub script: String,
    /// Warmup epochs per cycle.
    pub warmup: u32,
    /// Burn-in epochs between warmup and sampling.
    pub burnin: u32,
    /// Number of warmup/sampling cycles.
    pub cycles: u32,
    /// Samples to keep.
    pub n_samples: u32,
    /// Epochs skipped between saved samples.
    pub skip: u32,
    /// Root under which each combination gets its own log directory.
    pub log_root: PathBuf,
    /// Additional `key=value` pairs appended verbatim.
    pub extra: Vec<String>,
}

impl Default for TrainingArgs {
    fn default() -> Self {
        Self {
            interpreter: "python".to_string(),
            script: "train_bnn.py".to_string(),
            warmup: 45,
            burnin: 0,
            cycles: 60,
            n_samples: 300,
            skip: 5,
            log_root: PathBuf::from("../results/exp_prior_sweep"),
            extra: Vec::new(),
        }
    }
}

/// Split an extra argument into key and value.
pub fn parse_extra(raw: &str) -> SweepResult<(String, String)> {
    match raw.split_once('=') {
        Some((k, v)) if !k.trim().is_empty() => Ok((k.trim().to_string(), v.to_string())),
        _ => Err(SweepError::InvalidExtraArg(raw.to_string())),
    }
}

// ---------------------------------------------------------------------------
// TrainingCommand – one fully expanded training invocation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingCommand {
    pub interpreter: String,
    pub script: String,
    /// Ordered `key=value` arguments.
    pub args: Vec<(String, String)>,
    pub log_dir: PathBuf,
}

impl TrainingCommand {
    /// Expand the training invocation for one combination.
    ///
    /// `replicates` is the sweep's replicate count; a per-replicate
    /// subdirectory is only added when more than one replicate runs.
    pub fn for_combination(
        args: &TrainingArgs,
        combo: &Combination,
        replicates: usize,
    ) -> SweepResult<Self> {
        let log_dir = log_dir_for(&args.log_root, combo, replicates);

        let mut pairs: Vec<(String, String)> = vec![
            ("weight_prior".into(), combo.prior.to_string()),
            ("data".into(), combo.dataset.to_string()),
            ("inference".into(), combo.inference.to_string()),
            ("warmup".into(), args.warmup.to_string()),
            ("burnin".into(), args.burnin.to_string()),
            ("weight_scale".into(), combo.scale.to_string()),
            ("cycles".into(), args.cycles.to_string()),
            ("n_samples".into(), args.n_samples.to_string()),
            ("skip".into(), args.skip.to_string()),
            ("temperature".into(), combo.temperature.to_string()),
            ("log_dir".into(), log_dir.display().to_string()),
        ];

        for raw in &args.extra {
            let (key, value) = parse_extra(raw)?;
            if MANAGED_KEYS.contains(&key.as_str()) {
                warn!("ignoring extra argument '{raw}': {key} is set per combination");
                continue;
            }
            pairs.push((key, value));
        }

        Ok(Self {
            interpreter: args.interpreter.clone(),
            script: args.script.clone(),
            args: pairs,
            log_dir,
        })
    }

    /// Value of a single argument, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.args
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Render as a single shell command string.
    pub fn to_shell(&self) -> String {
        let mut parts = vec![
            shell_quote(&self.interpreter),
            shell_quote(&self.script),
            "with".to_string(),
        ];
        parts.extend(
            self.args
                .iter()
                .map(|(k, v)| shell_quote(&format!("{k}={v}"))),
        );
        parts.join(" ")
    }
}

fn log_dir_for(root: &Path, combo: &Combination, replicates: usize) -> PathBuf {
    let dir = root.join(combo.slug());
    if replicates > 1 {
        dir.join(combo.replicate.to_string())
    } else {
        dir
    }
}

/// Quote a word for POSIX `sh` when it contains anything beyond a
/// conservative safe set.
pub fn shell_quote(word: &str) -> String {
    let safe = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_-./=:,+@%".contains(c));
    if safe {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}
