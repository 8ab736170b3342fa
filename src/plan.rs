use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::command::submit::{run_sweep, DryRun, Job};

/// Output format of `bnn-sweep plan`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum PlanFormat {
    /// One submission command line per job.
    Text,
    Csv,
    Json,
}

/// Flat, serializable view of one planned job.
#[derive(Debug, Serialize)]
struct PlanRow<'a> {
    job: &'a str,
    prior: String,
    scale: f64,
    dataset: &'a str,
    inference: String,
    temperature: f64,
    replicate: usize,
    log_dir: String,
    command: String,
}

impl<'a> From<&'a Job> for PlanRow<'a> {
    fn from(job: &'a Job) -> Self {
        let c = &job.combination;
        PlanRow {
            job: &job.name,
            prior: c.prior.to_string(),
            scale: c.scale,
            dataset: c.dataset.as_str(),
            inference: c.inference.to_string(),
            temperature: c.temperature,
            replicate: c.replicate,
            log_dir: job.training.log_dir.display().to_string(),
            command: job.submit.to_shell(),
        }
    }
}

/// Write the planned jobs without submitting anything.
pub fn write_plan<W: Write>(jobs: &[Job], format: PlanFormat, out: W) -> Result<()> {
    match format {
        PlanFormat::Text => {
            let mut dry = DryRun::new(out);
            run_sweep(jobs, &mut dry, true).context("printing plan")?;
        }
        PlanFormat::Csv => {
            let mut writer = csv::Writer::from_writer(out);
            for job in jobs {
                writer
                    .serialize(PlanRow::from(job))
                    .with_context(|| format!("writing CSV row for {}", job.name))?;
            }
            writer.flush().context("flushing CSV output")?;
        }
        PlanFormat::Json => {
            let rows: Vec<PlanRow> = jobs.iter().map(PlanRow::from).collect();
            let mut out = out;
            serde_json::to_writer_pretty(&mut out, &rows).context("writing JSON plan")?;
            writeln!(out)?;
        }
    }
    Ok(())
}
