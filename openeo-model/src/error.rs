use thiserror::Error;

use crate::job::JobStatus;

/// Errors produced by model constructors and validation routines.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("job status cannot move from '{from}' to '{to}'")]
    InvalidTransition { from: JobStatus, to: JobStatus },

    #[error("unknown job status '{0}'")]
    UnknownStatus(String),

    #[error("invalid process graph: {0}")]
    InvalidProcessGraph(String),

    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
