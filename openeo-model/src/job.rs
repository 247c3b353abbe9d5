use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::{ModelError, Result},
    ids::{JobId, ProcessGraphId, UserId},
};

/// Lifecycle state of a batch job.
///
/// `Created`, `Queued` and `Running` are the only states a job can leave.
/// The allowed edges are listed in [`JobStatus::successors`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(
    feature = "sqlx",
    derive(sqlx::Type),
    sqlx(type_name = "job_status", rename_all = "lowercase")
)]
pub enum JobStatus {
    Created,
    Queued,
    Running,
    Canceled,
    Finished,
    Error,
}

impl JobStatus {
    pub const ALL: [JobStatus; 6] = [
        JobStatus::Created,
        JobStatus::Queued,
        JobStatus::Running,
        JobStatus::Canceled,
        JobStatus::Finished,
        JobStatus::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Created => "created",
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Canceled => "canceled",
            JobStatus::Finished => "finished",
            JobStatus::Error => "error",
        }
    }

    /// States reachable from `self` in a single step.
    pub const fn successors(self) -> &'static [JobStatus] {
        match self {
            JobStatus::Created => &[JobStatus::Queued],
            JobStatus::Queued => &[JobStatus::Running, JobStatus::Canceled],
            JobStatus::Running => &[
                JobStatus::Finished,
                JobStatus::Error,
                JobStatus::Canceled,
            ],
            JobStatus::Canceled | JobStatus::Finished | JobStatus::Error => &[],
        }
    }

    pub fn is_terminal(self) -> bool {
        self.successors().is_empty()
    }

    pub fn can_transition_to(self, next: JobStatus) -> bool {
        self.successors().contains(&next)
    }

    /// Validates a single forward step, returning the new state.
    pub fn transition(self, next: JobStatus) -> Result<JobStatus> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(ModelError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        JobStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ModelError::UnknownStatus(s.to_string()))
    }
}

/// A batch job as stored by the persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub job_id: JobId,
    pub process_graph_id: ProcessGraphId,
    pub status: JobStatus,
    pub user_id: UserId,
    pub created: DateTime<Utc>,
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub synchronous: bool,
}

impl Job {
    /// A freshly submitted job in state `created`.
    pub fn new(
        user_id: UserId,
        process_graph_id: ProcessGraphId,
        title: Option<String>,
        description: Option<String>,
        synchronous: bool,
    ) -> Self {
        Self {
            job_id: JobId::new(),
            process_graph_id,
            status: JobStatus::Created,
            user_id,
            created: Utc::now(),
            title,
            description,
            synchronous,
        }
    }

    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_edges_are_accepted() {
        let path = [
            (JobStatus::Created, JobStatus::Queued),
            (JobStatus::Queued, JobStatus::Running),
            (JobStatus::Running, JobStatus::Finished),
        ];
        for (from, to) in path {
            assert_eq!(from.transition(to), Ok(to));
        }
        assert!(JobStatus::Running.can_transition_to(JobStatus::Error));
        assert!(JobStatus::Queued.can_transition_to(JobStatus::Canceled));
        assert!(JobStatus::Running.can_transition_to(JobStatus::Canceled));
    }

    #[test]
    fn skipping_states_is_rejected() {
        assert_eq!(
            JobStatus::Created.transition(JobStatus::Finished),
            Err(ModelError::InvalidTransition {
                from: JobStatus::Created,
                to: JobStatus::Finished,
            })
        );
        assert!(!JobStatus::Created.can_transition_to(JobStatus::Running));
        assert!(!JobStatus::Queued.can_transition_to(JobStatus::Error));
    }

    #[test]
    fn created_job_cannot_be_canceled_before_queueing() {
        assert_eq!(
            JobStatus::Created.transition(JobStatus::Canceled),
            Err(ModelError::InvalidTransition {
                from: JobStatus::Created,
                to: JobStatus::Canceled,
            })
        );
        assert_eq!(JobStatus::Created.successors(), &[JobStatus::Queued]);
    }

    #[test]
    fn terminal_states_have_no_successors() {
        for status in JobStatus::ALL {
            let terminal = matches!(
                status,
                JobStatus::Canceled | JobStatus::Finished | JobStatus::Error
            );
            assert_eq!(status.is_terminal(), terminal, "{status}");
            if terminal {
                for next in JobStatus::ALL {
                    assert!(status.transition(next).is_err());
                }
            }
        }
    }

    #[test]
    fn backwards_and_self_transitions_are_rejected() {
        for status in JobStatus::ALL {
            assert!(!status.can_transition_to(status));
        }
        assert!(!JobStatus::Running.can_transition_to(JobStatus::Queued));
        assert!(!JobStatus::Queued.can_transition_to(JobStatus::Created));
    }

    #[test]
    fn status_strings_match_wire_format() {
        for status in JobStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
            assert_eq!(status.as_str().parse::<JobStatus>().unwrap(), status);
        }
        assert!("paused".parse::<JobStatus>().is_err());
    }
}
