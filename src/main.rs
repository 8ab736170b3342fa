use std::io;
use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;

use bnn_sweep::command::submit::{DryRun, LocalRunner, LsfSubmitter};
use bnn_sweep::plan::{write_plan, PlanFormat};
use bnn_sweep::config::Overrides;
use bnn_sweep::{prepare_jobs, run_sweep, Job, Submitter, SweepConfig};

#[derive(Parser)]
#[command(name = "bnn-sweep", version)]
#[command(about = "Submit one batch job per prior/dataset/inference/scale/temperature combination")]
struct Cli {
    /// Sweep config (.toml or .json). Defaults to $BNN_SWEEP_CONFIG, then ./bnn-sweep.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Restrict an axis, e.g. `--only prior=gaussian,laplace`. Repeatable.
    #[arg(long = "only", value_name = "AXIS=V1,V2", global = true)]
    only: Vec<String>,

    /// Override the replicate count.
    #[arg(long, global = true)]
    replicates: Option<usize>,

    /// Override the log root directory.
    #[arg(long, global = true)]
    log_root: Option<PathBuf>,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Print what would be submitted.
    Plan {
        #[arg(long, value_enum, default_value_t = PlanFormat::Text)]
        format: PlanFormat,
    },
    /// Submit every selected combination.
    Submit {
        #[arg(long, value_enum, default_value_t = Backend::Lsf)]
        backend: Backend,

        /// Continue past rejected submissions.
        #[arg(long)]
        keep_going: bool,
    },
    /// Print the number of selected combinations.
    Count,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Backend {
    /// Batch scheduler submission.
    Lsf,
    /// Run each training command locally, one at a time.
    Local,
    /// Print submission lines only.
    DryRun,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = SweepConfig::load(cli.config.as_deref())?;
    config.apply_overrides(&Overrides {
        replicates: cli.replicates,
        log_root: cli.log_root.clone(),
    });
    info!("sweep configuration:\n{}", config.display_summary());

    let grid = config.grid();
    let combos = config.selected_combinations(&cli.only)?;
    info!("{} of {} combinations selected", combos.len(), grid.len());

    if let Cmd::Count = cli.command {
        println!("{}", combos.len());
        return Ok(());
    }

    let jobs = prepare_jobs(&combos, &config.training, &config.scheduler, grid.replicates())?;

    match cli.command {
        Cmd::Plan { format } => write_plan(&jobs, format, io::stdout().lock()),
        Cmd::Submit {
            backend,
            keep_going,
        } => submit(&jobs, backend, keep_going),
        Cmd::Count => Ok(()),
    }
}

fn submit(jobs: &[Job], backend: Backend, keep_going: bool) -> Result<()> {
    let mut submitter: Box<dyn Submitter> = match backend {
        Backend::Lsf => Box::new(LsfSubmitter),
        Backend::Local => Box::new(LocalRunner),
        Backend::DryRun => Box::new(DryRun::new(io::stdout())),
    };

    let report = run_sweep(jobs, submitter.as_mut(), keep_going)?;
    println!(
        "Submitted {} of {} jobs ({} rejected).",
        report.accepted,
        report.total,
        report.rejected.len()
    );
    if !report.is_clean() {
        bail!("{} job(s) were not accepted", report.total - report.accepted);
    }
    Ok(())
}
