//! Submission FSM states

use serde::{Deserialize, Serialize};
use std::fmt;

/// Submission status
///
/// Exactly one is active at a time.
/// Resting states: IDLE, SUCCEEDED, FAILED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionStatus {
    /// Initial state, and the state after an explicit reset
    #[default]
    Idle,

    /// First attempt in flight
    Submitting,

    /// Retry attempt in flight (includes its backoff wait)
    Retrying,

    /// Order accepted
    Succeeded,

    /// Last attempt rejected or raised
    Failed,
}

impl SubmissionStatus {
    /// An attempt is outstanding; new submissions must be refused
    #[inline]
    pub fn is_in_flight(&self) -> bool {
        matches!(self, SubmissionStatus::Submitting | SubmissionStatus::Retrying)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Idle => "IDLE",
            SubmissionStatus::Submitting => "SUBMITTING",
            SubmissionStatus::Retrying => "RETRYING",
            SubmissionStatus::Succeeded => "SUCCEEDED",
            SubmissionStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why the machine sits in FAILED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Endpoint returned field-level errors; retry does not apply
    Rejected,
    /// Endpoint raised a network/server failure; retry applies
    Transient,
}
