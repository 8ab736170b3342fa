//! bnn-sweep: enumerate a grid of Bayesian-NN prior experiments and submit
//! one batch job per combination.
//!
//! ```text
//!  bnn-sweep.toml ──▶ config ──▶ sweep::grid ──▶ sweep::filter
//!                                                     │
//!                                                     ▼
//!                   command::training + command::scheduler ──▶ command::submit
//! ```

pub mod command;
pub mod config;
pub mod error;
pub mod plan;
pub mod sweep;

pub use command::submit::{prepare_jobs, run_sweep, Job, Outcome, Submitter, SweepReport};
pub use config::SweepConfig;
pub use error::{SweepError, SweepResult};
pub use sweep::grid::SweepGrid;
pub use sweep::model::{Axis, AxisValue, Combination, Dataset, InferenceMethod, Prior};
