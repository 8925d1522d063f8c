//! Error types for session discovery and notification delivery.
//!
//! Nothing here is fatal to the dashboard: the scan loop downgrades every
//! one of these into a logged, recoverable condition.

use std::path::PathBuf;
use std::time::Duration;

/// A session source could not produce a listing this scan.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("session source unavailable at {path}: {source}")]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not determine home directory for the Claude data dir")]
    HomeDirUnknown,

    #[error("scan task aborted: {0}")]
    Aborted(String),
}

impl SourceError {
    pub fn unavailable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SourceError::Unavailable {
            path: path.into(),
            source,
        }
    }
}

/// A notifier backend failed to deliver.
#[derive(Debug, thiserror::Error)]
pub enum NotifierError {
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    Rejected {
        program: &'static str,
        status: String,
        stderr: String,
    },

    #[error("{program} did not finish within {after:?}")]
    TimedOut {
        program: &'static str,
        after: Duration,
    },

    #[error("desktop notification backend error: {0}")]
    Backend(String),
}
