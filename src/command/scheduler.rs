use serde::{Deserialize, Serialize};

use super::training::{shell_quote, TrainingCommand};
use crate::error::{SweepError, SweepResult};
use crate::sweep::model::Combination;

// ---------------------------------------------------------------------------
// SchedulerOptions – flags handed to the batch submitter
// ---------------------------------------------------------------------------

/// Batch-queue flags shared by all jobs of a sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulerOptions {
    /// Submission program (LSF `bsub` by default).
    pub program: String,
    /// Cores reserved per job (`-n`).
    pub cores: u32,
    /// Wall-clock limit as `H:MM` (`-W`).
    pub wall_time: String,
    /// Job group (`-g`).
    pub group: String,
    /// Resource requirement string (`-R`).
    pub resource: String,
    /// Prefix joined to each combination's slug to form the job name (`-J`).
    pub job_prefix: String,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            program: "bsub".to_string(),
            cores: 2,
            wall_time: "24:00".to_string(),
            group: "/bnn_priors".to_string(),
            resource: "rusage[mem=8192,ngpus_excl_p=1]".to_string(),
            job_prefix: "bnn".to_string(),
        }
    }
}

impl SchedulerOptions {
    /// Check the wall time looks like `H:MM`.
    pub fn validate(&self) -> SweepResult<()> {
        parse_wall_time(&self.wall_time).map(|_| ())
    }

    /// Job name for a combination, with a replicate suffix when the sweep
    /// runs more than one replicate.
    pub fn job_name(&self, combo: &Combination, replicates: usize) -> String {
        let mut name = if self.job_prefix.is_empty() {
            combo.slug()
        } else {
            format!("{}_{}", self.job_prefix, combo.slug())
        };
        if replicates > 1 {
            name.push_str(&format!("_r{}", combo.replicate));
        }
        name
    }
}

/// Parse `H:MM` into total minutes.
pub fn parse_wall_time(raw: &str) -> SweepResult<u32> {
    let err = || SweepError::InvalidWallTime(raw.to_string());
    let (h, m) = raw.trim().split_once(':').ok_or_else(err)?;
    if h.is_empty() || m.len() != 2 {
        return Err(err());
    }
    let hours: u32 = h.parse().map_err(|_| err())?;
    let minutes: u32 = m.parse().map_err(|_| err())?;
    let total = hours
        .checked_mul(60)
        .and_then(|h| h.checked_add(minutes))
        .ok_or_else(err)?;
    if minutes >= 60 || total == 0 {
        return Err(err());
    }
    Ok(total)
}

// ---------------------------------------------------------------------------
// SubmitCommand – program + argv for one submission
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct SubmitCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl SubmitCommand {
    /// Build the submission call. The training command travels as one
    /// trailing argument.
    pub fn new(opts: &SchedulerOptions, job_name: &str, training: &TrainingCommand) -> Self {
        let args = vec![
            "-n".to_string(),
            opts.cores.to_string(),
            "-W".to_string(),
            opts.wall_time.clone(),
            "-J".to_string(),
            job_name.to_string(),
            "-g".to_string(),
            opts.group.clone(),
            "-R".to_string(),
            opts.resource.clone(),
            training.to_shell(),
        ];
        Self {
            program: opts.program.clone(),
            args,
        }
    }

    /// Render as a copy-pasteable shell line.
    pub fn to_shell(&self) -> String {
        std::iter::once(&self.program)
            .chain(self.args.iter())
            .map(|w| shell_quote(w))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::training::TrainingArgs;
    use crate::sweep::model::{Dataset, InferenceMethod, Prior};

    fn combo() -> Combination {
        Combination {
            prior: Prior::Gaussian,
            scale: 1.0,
            dataset: Dataset::new("cifar10").unwrap(),
            inference: InferenceMethod::Sgld,
            temperature: 1.0,
            replicate: 1,
        }
    }

    #[test]
    fn wall_time_parsing() {
        assert_eq!(parse_wall_time("4:00").unwrap(), 240);
        assert_eq!(parse_wall_time("120:30").unwrap(), 7230);
        assert!(parse_wall_time("4").is_err());
        assert!(parse_wall_time("4:5").is_err());
        assert!(parse_wall_time("4:75").is_err());
        assert!(parse_wall_time("0:00").is_err());
        assert!(parse_wall_time("x:00").is_err());
        assert!(parse_wall_time("99999999:00").is_err());
    }

    #[test]
    fn job_names() {
        let opts = SchedulerOptions::default();
        assert_eq!(
            opts.job_name(&combo(), 1),
            "bnn_gaussian_cifar10_SGLD_scale1_T1"
        );
        assert_eq!(
            opts.job_name(&combo(), 4),
            "bnn_gaussian_cifar10_SGLD_scale1_T1_r1"
        );
    }

    #[test]
    fn training_command_is_the_last_single_argument() {
        let opts = SchedulerOptions::default();
        let training =
            TrainingCommand::for_combination(&TrainingArgs::default(), &combo(), 1).unwrap();
        let submit = SubmitCommand::new(&opts, "job", &training);
        assert_eq!(submit.program, "bsub");
        assert_eq!(&submit.args[..4], &["-n", "2", "-W", "24:00"]);
        assert_eq!(submit.args.last().unwrap(), &training.to_shell());
        assert_eq!(submit.args.len(), 11);
    }

    #[test]
    fn shell_line_quotes_resource_and_command() {
        let opts = SchedulerOptions::default();
        let training =
            TrainingCommand::for_combination(&TrainingArgs::default(), &combo(), 1).unwrap();
        let line = SubmitCommand::new(&opts, "job", &training).to_shell();
        assert!(line.starts_with("bsub -n 2 -W 24:00 -J job -g /bnn_priors -R 'rusage[mem=8192,ngpus_excl_p=1]' 'python train_bnn.py with"));
    }
}
