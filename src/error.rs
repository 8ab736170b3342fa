use std::io;

// ---------------------------------------------------------------------------
// Domain errors
// ---------------------------------------------------------------------------

/// Errors raised while building or submitting a sweep.
#[derive(Debug, thiserror::Error)]
pub enum SweepError {
    #[error("unknown prior '{0}'")]
    UnknownPrior(String),

    #[error("unknown inference method '{0}'")]
    UnknownInference(String),

    #[error("invalid dataset identifier '{0}'")]
    InvalidDataset(String),

    #[error("unknown sweep axis '{0}'")]
    UnknownAxis(String),

    #[error("invalid selector '{0}': expected <axis>=<value>[,<value>...]")]
    InvalidSelector(String),

    #[error("invalid value '{value}' for axis {axis}")]
    InvalidAxisValue { axis: String, value: String },

    #[error("invalid wall time '{0}': expected H:MM")]
    InvalidWallTime(String),

    #[error("invalid extra training argument '{0}': expected key=value")]
    InvalidExtraArg(String),

    #[error("two jobs would share '{0}'")]
    DuplicateJob(String),

    #[error("failed to launch '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Result alias used throughout the crate.
pub type SweepResult<T> = Result<T, SweepError>;
