use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::process::{Command, Output};

use log::{debug, info, warn};

use super::scheduler::{SchedulerOptions, SubmitCommand};
use super::training::{TrainingArgs, TrainingCommand};
use crate::error::{SweepError, SweepResult};
use crate::sweep::model::Combination;

// ---------------------------------------------------------------------------
// Job – everything needed to hand one combination to a backend
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub name: String,
    pub combination: Combination,
    pub training: TrainingCommand,
    pub submit: SubmitCommand,
}

/// Expand combinations into jobs.
///
/// Two jobs sharing a name or a log directory is an error: they would
/// overwrite each other's results.
pub fn prepare_jobs(
    combos: &[Combination],
    training: &TrainingArgs,
    scheduler: &SchedulerOptions,
    replicates: usize,
) -> SweepResult<Vec<Job>> {
    scheduler.validate()?;
    let mut names = BTreeSet::new();
    let mut log_dirs = BTreeSet::new();
    let mut jobs = Vec::with_capacity(combos.len());

    for combo in combos {
        let name = scheduler.job_name(combo, replicates);
        let training = TrainingCommand::for_combination(training, combo, replicates)?;
        if !names.insert(name.clone()) {
            return Err(SweepError::DuplicateJob(name));
        }
        if !log_dirs.insert(training.log_dir.clone()) {
            return Err(SweepError::DuplicateJob(training.log_dir.display().to_string()));
        }
        let submit = SubmitCommand::new(scheduler, &name, &training);
        jobs.push(Job {
            name,
            combination: combo.clone(),
            training,
            submit,
        });
    }
    Ok(jobs)
}

// ---------------------------------------------------------------------------
// Submitter – the outbound seam
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The backend accepted the job.
    Accepted,
    /// The backend ran but reported failure.
    Rejected { code: Option<i32>, message: String },
}

/// Hands one job to whatever executes it.
pub trait Submitter {
    fn submit(&mut self, job: &Job) -> SweepResult<Outcome>;
}

/// Submits through the batch scheduler's command-line client.
#[derive(Debug, Default)]
pub struct LsfSubmitter;

impl Submitter for LsfSubmitter {
    fn submit(&mut self, job: &Job) -> SweepResult<Outcome> {
        debug!("{}", job.submit.to_shell());
        let output = Command::new(&job.submit.program)
            .args(&job.submit.args)
            .output()
            .map_err(|source| SweepError::Launch {
                program: job.submit.program.clone(),
                source,
            })?;
        let reply = String::from_utf8_lossy(&output.stdout);
        if !reply.trim().is_empty() {
            info!("{}: {}", job.name, reply.trim());
        }
        Ok(outcome_from(&output))
    }
}

/// Runs each training command in the foreground, one after another.
#[derive(Debug, Default)]
pub struct LocalRunner;

impl Submitter for LocalRunner {
    fn submit(&mut self, job: &Job) -> SweepResult<Outcome> {
        if let Err(e) = fs::create_dir_all(&job.training.log_dir) {
            return Ok(Outcome::Rejected {
                code: None,
                message: format!("cannot create {}: {e}", job.training.log_dir.display()),
            });
        }
        let line = job.training.to_shell();
        info!("running in {}: {line}", job.training.log_dir.display());
        let status = Command::new("sh")
            .arg("-c")
            .arg(&line)
            .status()
            .map_err(|source| SweepError::Launch {
                program: "sh".to_string(),
                source,
            })?;
        if status.success() {
            Ok(Outcome::Accepted)
        } else {
            Ok(Outcome::Rejected {
                code: status.code(),
                message: String::new(),
            })
        }
    }
}

/// Prints each submission line instead of running it.
pub struct DryRun<W: Write> {
    out: W,
}

impl<W: Write> DryRun<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Submitter for DryRun<W> {
    fn submit(&mut self, job: &Job) -> SweepResult<Outcome> {
        writeln!(self.out, "{}", job.submit.to_shell())?;
        Ok(Outcome::Accepted)
    }
}

fn outcome_from(output: &Output) -> Outcome {
    if output.status.success() {
        Outcome::Accepted
    } else {
        Outcome::Rejected {
            code: output.status.code(),
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// run_sweep – one submit call per job, in order
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub total: usize,
    pub accepted: usize,
    /// Names of jobs the backend rejected.
    pub rejected: Vec<String>,
}

impl SweepReport {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty() && self.accepted == self.total
    }
}

/// Submit every job sequentially.
///
/// A rejected job is logged and recorded; with `keep_going = false` the
/// sweep stops after the first rejection. Failing to launch the backend at
/// all is returned as an error.
pub fn run_sweep(
    jobs: &[Job],
    submitter: &mut dyn Submitter,
    keep_going: bool,
) -> SweepResult<SweepReport> {
    let mut report = SweepReport {
        total: jobs.len(),
        ..Default::default()
    };

    for (i, job) in jobs.iter().enumerate() {
        info!("[{:>4}/{:>4}] {}", i + 1, jobs.len(), job.name);
        match submitter.submit(job)? {
            Outcome::Accepted => report.accepted += 1,
            Outcome::Rejected { code, message } => {
                warn!(
                    "{} rejected (exit {}): {message}",
                    job.name,
                    code.map(|c| c.to_string()).unwrap_or_else(|| "signal".into())
                );
                report.rejected.push(job.name.clone());
                if !keep_going {
                    break;
                }
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sweep::grid::SweepGrid;
    use crate::sweep::model::{Dataset, InferenceMethod, Prior};

    /// Rejects every job whose name contains `reject`.
    struct Scripted {
        reject: &'static str,
        seen: Vec<String>,
    }

    impl Submitter for Scripted {
        fn submit(&mut self, job: &Job) -> SweepResult<Outcome> {
            self.seen.push(job.name.clone());
            if job.name.contains(self.reject) {
                Ok(Outcome::Rejected {
                    code: Some(255),
                    message: "queue closed".into(),
                })
            } else {
                Ok(Outcome::Accepted)
            }
        }
    }

    fn jobs() -> Vec<Job> {
        let grid = SweepGrid::new(
            vec![Prior::Gaussian, Prior::Laplace],
            vec![1.0],
            vec![Dataset::new("mnist").unwrap()],
            vec![InferenceMethod::Sgld],
            vec![0.1, 1.0],
            1,
        );
        prepare_jobs(
            &grid.combinations(),
            &TrainingArgs::default(),
            &SchedulerOptions::default(),
            grid.replicates(),
        )
        .unwrap()
    }

    #[test]
    fn prepare_rejects_bad_wall_time() {
        let scheduler = SchedulerOptions {
            wall_time: "forever".into(),
            ..Default::default()
        };
        let err = prepare_jobs(&[], &TrainingArgs::default(), &scheduler, 1).unwrap_err();
        assert!(matches!(err, SweepError::InvalidWallTime(_)));
    }

    #[test]
    fn prepare_rejects_colliding_jobs() {
        let combo = jobs()[0].combination.clone();
        let twice = vec![combo.clone(), combo];
        let err = prepare_jobs(
            &twice,
            &TrainingArgs::default(),
            &SchedulerOptions::default(),
            1,
        )
        .unwrap_err();
        assert!(matches!(err, SweepError::DuplicateJob(_)));
    }

    #[test]
    fn keep_going_visits_every_job() {
        let jobs = jobs();
        let mut sub = Scripted {
            reject: "gaussian",
            seen: Vec::new(),
        };
        let report = run_sweep(&jobs, &mut sub, true).unwrap();
        assert_eq!(sub.seen.len(), 4);
        assert_eq!(report.accepted, 2);
        assert_eq!(report.rejected.len(), 2);
        assert!(!report.is_clean());
    }

    #[test]
    fn stops_at_first_rejection_without_keep_going() {
        let jobs = jobs();
        let mut sub = Scripted {
            reject: "T1",
            seen: Vec::new(),
        };
        let report = run_sweep(&jobs, &mut sub, false).unwrap();
        assert_eq!(sub.seen.len(), 2);
        assert_eq!(report.accepted, 1);
        assert_eq!(report.rejected, vec![jobs[1].name.clone()]);
    }

    #[test]
    fn dry_run_prints_one_line_per_job() {
        let jobs = jobs();
        let mut dry = DryRun::new(Vec::new());
        let report = run_sweep(&jobs, &mut dry, false).unwrap();
        assert!(report.is_clean());
        let text = String::from_utf8(dry.into_inner()).unwrap();
        assert_eq!(text.lines().count(), 4);
        assert!(text.lines().all(|l| l.starts_with("bsub -n 2")));
    }

    #[cfg(unix)]
    #[test]
    fn local_runner_counts_unwritable_log_dir_as_rejection() {
        let dir = tempfile::tempdir().unwrap();
        let training = TrainingArgs {
            interpreter: "true".into(),
            log_root: dir.path().to_path_buf(),
            ..Default::default()
        };
        let grid = SweepGrid::new(
            vec![Prior::Gaussian, Prior::Laplace],
            vec![1.0],
            vec![Dataset::new("mnist").unwrap()],
            vec![InferenceMethod::Sgld],
            vec![1.0],
            1,
        );
        let jobs = prepare_jobs(
            &grid.combinations(),
            &training,
            &SchedulerOptions::default(),
            1,
        )
        .unwrap();
        // A regular file where the first job's log directory should go.
        fs::write(&jobs[0].training.log_dir, b"").unwrap();

        let report = run_sweep(&jobs, &mut LocalRunner, true).unwrap();
        assert_eq!(report.rejected, vec![jobs[0].name.clone()]);
        assert_eq!(report.accepted, 1);
        assert!(jobs[1].training.log_dir.is_dir());
    }
}
