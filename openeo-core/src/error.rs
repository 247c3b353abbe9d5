use openeo_model::ModelError;
use thiserror::Error;

/// Faults raised by the core. Each variant maps to exactly one HTTP status
/// class; `code` is the openEO error code reported to clients.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("{message}")]
    Validation { code: &'static str, message: String },

    #[error("{message}")]
    Unauthorized { code: &'static str, message: String },

    #[error("{message}")]
    Forbidden { code: &'static str, message: String },

    #[error("{message}")]
    NotFound { code: &'static str, message: String },

    #[error("{message}")]
    Conflict { code: &'static str, message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            code: "BadRequest",
            message: message.into(),
        }
    }

    pub fn process_graph_missing() -> Self {
        Self::Validation {
            code: "ProcessGraphMissing",
            message: "No process graph specified.".into(),
        }
    }

    pub fn authentication_required() -> Self {
        Self::Unauthorized {
            code: "AuthenticationRequired",
            message: "Unauthorized.".into(),
        }
    }

    pub fn token_invalid() -> Self {
        Self::Unauthorized {
            code: "TokenInvalid",
            message: "Authorization token invalid or expired.".into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            code: "PermissionsInsufficient",
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            code: "NotFound",
            message: message.into(),
        }
    }

    pub fn job_not_found(job_id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            code: "JobNotFound",
            message: format!("The batch job '{job_id}' does not exist."),
        }
    }

    pub fn collection_not_found(collection_id: &str) -> Self {
        Self::NotFound {
            code: "CollectionNotFound",
            message: format!("Collection '{collection_id}' does not exist."),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            code: "Conflict",
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// openEO error code for this fault.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { code, .. }
            | Self::Unauthorized { code, .. }
            | Self::Forbidden { code, .. }
            | Self::NotFound { code, .. }
            | Self::Conflict { code, .. } => code,
            Self::Internal(_) => "Internal",
        }
    }
}

impl From<ModelError> for CoreError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::InvalidTransition { .. } => Self::Conflict {
                code: "JobStatusConflict",
                message: err.to_string(),
            },
            ModelError::InvalidProcessGraph(_) => Self::Validation {
                code: "ProcessGraphInvalid",
                message: err.to_string(),
            },
            ModelError::InvalidId(_) => Self::validation(err.to_string()),
            ModelError::UnknownStatus(_) => Self::Internal(err.to_string()),
        }
    }
}

#[cfg(feature = "database")]
impl From<sqlx::migrate::MigrateError> for CoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        Self::Internal(format!("Migration failed: {err}"))
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;
    use openeo_model::JobStatus;

    #[test]
    fn invalid_transition_becomes_conflict() {
        let err: CoreError = ModelError::InvalidTransition {
            from: JobStatus::Created,
            to: JobStatus::Finished,
        }
        .into();
        assert!(matches!(err, CoreError::Conflict { .. }));
        assert_eq!(err.code(), "JobStatusConflict");
    }

    #[test]
    fn invalid_graph_becomes_validation() {
        let err: CoreError =
            ModelError::InvalidProcessGraph("empty".into()).into();
        assert!(matches!(err, CoreError::Validation { .. }));
        assert_eq!(err.code(), "ProcessGraphInvalid");
    }
}
