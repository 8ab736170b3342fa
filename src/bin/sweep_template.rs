use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use bnn_sweep::config::DEFAULT_CONFIG_NAME;
use bnn_sweep::SweepConfig;

/// Write the built-in sweep configuration as a starter TOML file.
#[derive(Parser)]
#[command(name = "sweep_template", version)]
struct Args {
    /// Destination file. `-` writes to stdout.
    #[arg(default_value = DEFAULT_CONFIG_NAME)]
    output: PathBuf,

    /// Overwrite an existing file.
    #[arg(long)]
    force: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let text = SweepConfig::default().to_toml()?;

    if args.output.as_os_str() == "-" {
        print!("{text}");
        return Ok(());
    }
    if args.output.exists() && !args.force {
        bail!("{} already exists (use --force)", args.output.display());
    }
    std::fs::write(&args.output, &text)
        .with_context(|| format!("writing {}", args.output.display()))?;

    let combos = SweepConfig::default().grid().len();
    println!("Wrote {} ({combos} combinations)", args.output.display());
    Ok(())
}
