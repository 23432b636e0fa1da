//! Checkout API error types

use thiserror::Error;

pub const MSG_NETWORK_ERROR: &str =
    "Network connection failed. Please check your internet connection.";
pub const MSG_SERVER_ERROR: &str = "Server temporarily unavailable. Please try again later.";

/// Raised (transient) failures of a checkout call.
///
/// Data-shaped rejections are *not* errors; see
/// [`CheckoutResponse::Rejected`](super::types::CheckoutResponse::Rejected).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("{0}")]
    Network(String),

    #[error("{0}")]
    Server(String),
}

impl ApiError {
    pub fn network() -> Self {
        ApiError::Network(MSG_NETWORK_ERROR.to_string())
    }

    pub fn server() -> Self {
        ApiError::Server(MSG_SERVER_ERROR.to_string())
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Network(_) => "NETWORK_ERROR",
            ApiError::Server(_) => "SERVER_ERROR",
        }
    }

    /// Both transient kinds may be retried
    #[inline]
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::Network(_) | ApiError::Server(_))
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::Network(msg) | ApiError::Server(msg) => msg,
        }
    }
}

/// Invalid scenario weight table
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScenarioError {
    #[error("Scenario list is empty")]
    Empty,

    #[error("Scenario weight must be a finite non-negative number: {0}")]
    InvalidWeight(f64),

    #[error("Scenario weights must sum to 1.0 (got {0})")]
    WeightsDoNotSumToOne(f64),
}

impl ScenarioError {
    pub fn code(&self) -> &'static str {
        match self {
            ScenarioError::Empty => "EMPTY_SCENARIOS",
            ScenarioError::InvalidWeight(_) => "INVALID_WEIGHT",
            ScenarioError::WeightsDoNotSumToOne(_) => "WEIGHTS_NOT_NORMALIZED",
        }
    }
}
