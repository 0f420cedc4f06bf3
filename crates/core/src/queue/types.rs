use serde::{Deserialize, Serialize};

use crate::transform::TransformKind;

/// Operational state of a queued job.
///
/// Pending and Started are transient; Success and Failure are terminal
/// and are entered exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    Pending,
    Started,
    Success,
    Failure,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Success | JobState::Failure)
    }
}

/// Terminal outcome reported by a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Success,
    Failure,
}

impl From<JobOutcome> for JobState {
    fn from(outcome: JobOutcome) -> Self {
        match outcome {
            JobOutcome::Success => JobState::Success,
            JobOutcome::Failure => JobState::Failure,
        }
    }
}

/// The unit of queued work: one uploaded file plus the requested
/// transformation and its owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobPayload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub transformation: TransformKind,
    pub owner_id: String,
}

/// A job handed to a worker by `claim`.
#[derive(Debug, Clone)]
pub struct ClaimedJob {
    pub job_id: String,
    pub payload: JobPayload,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!JobState::Pending.is_terminal());
        assert!(!JobState::Started.is_terminal());
        assert!(JobState::Success.is_terminal());
        assert!(JobState::Failure.is_terminal());
    }

    #[test]
    fn test_state_serializes_uppercase() {
        assert_eq!(
            serde_json::to_string(&JobState::Pending).unwrap(),
            "\"PENDING\""
        );
        assert_eq!(
            serde_json::to_string(&JobState::Success).unwrap(),
            "\"SUCCESS\""
        );
    }
}
