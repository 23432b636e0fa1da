//! Submission error types

use thiserror::Error;

use super::state::SubmissionStatus;
use crate::api::ApiError;
use crate::form::FieldErrors;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    // === Guard Errors ===
    #[error("A submission is already in progress ({0})")]
    InFlight(SubmissionStatus),

    #[error("Retry requires a failed submission (current: {0})")]
    NotRetryable(SubmissionStatus),

    #[error("Validation errors must be fixed before resubmitting")]
    ValidationNotRetryable,

    #[error("Retry limit reached after {attempts} attempts")]
    RetryExhausted { attempts: u32 },

    #[error("Submission was reset while in flight")]
    Superseded,

    // === Form Errors ===
    #[error("Form has {} invalid field(s)", .0.len())]
    InvalidForm(FieldErrors),

    // === Endpoint Errors ===
    #[error(transparent)]
    Transient(#[from] ApiError),
}

impl SubmissionError {
    pub fn code(&self) -> &'static str {
        match self {
            SubmissionError::InFlight(_) => "IN_FLIGHT",
            SubmissionError::NotRetryable(_) => "NOT_RETRYABLE",
            SubmissionError::ValidationNotRetryable => "VALIDATION_NOT_RETRYABLE",
            SubmissionError::RetryExhausted { .. } => "RETRY_EXHAUSTED",
            SubmissionError::Superseded => "SUPERSEDED",
            SubmissionError::InvalidForm(_) => "INVALID_FORM",
            SubmissionError::Transient(e) => e.code(),
        }
    }

    /// Whether `retry` could follow this error
    #[inline]
    pub fn is_transient(&self) -> bool {
        matches!(self, SubmissionError::Transient(_))
    }
}
