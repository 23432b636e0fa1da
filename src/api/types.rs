//! Checkout API request/response types

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::ApiError;
use super::scenario::ScenarioKind;
use crate::form::{FieldErrors, FormField};

pub const MSG_PAYMENT_VALIDATION_FAILED: &str = "Payment validation failed";
pub const MSG_CARD_APPEARS_INVALID: &str = "This card number appears to be invalid";

const ORDER_ID_LEN: usize = 9;
const ORDER_ID_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Opaque order identifier handed out on success (9 upper-case base-36 chars)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let id = (0..ORDER_ID_LEN)
            .map(|_| ORDER_ID_ALPHABET[rng.gen_range(0..ORDER_ID_ALPHABET.len())] as char)
            .collect();
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for OrderId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Every way a checkout attempt can resolve
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiOutcome {
    Success { order_id: OrderId },
    ValidationError { message: String, field_errors: FieldErrors },
    NetworkError { message: String },
    ServerError { message: String },
}

impl ApiOutcome {
    /// Materialize the canned outcome for `kind`
    pub fn from_kind<R: Rng + ?Sized>(kind: ScenarioKind, rng: &mut R) -> Self {
        match kind {
            ScenarioKind::Success => ApiOutcome::Success {
                order_id: OrderId::generate(rng),
            },
            ScenarioKind::ValidationError => {
                let mut field_errors = FieldErrors::new();
                field_errors.insert(FormField::CardNumber, MSG_CARD_APPEARS_INVALID.to_string());
                ApiOutcome::ValidationError {
                    message: MSG_PAYMENT_VALIDATION_FAILED.to_string(),
                    field_errors,
                }
            }
            ScenarioKind::NetworkError => ApiOutcome::NetworkError {
                message: super::error::MSG_NETWORK_ERROR.to_string(),
            },
            ScenarioKind::ServerError => ApiOutcome::ServerError {
                message: super::error::MSG_SERVER_ERROR.to_string(),
            },
        }
    }

    /// Split into returned data vs raised failure
    pub fn into_response(self) -> Result<CheckoutResponse, ApiError> {
        match self {
            ApiOutcome::Success { order_id } => Ok(CheckoutResponse::Accepted { order_id }),
            ApiOutcome::ValidationError {
                message,
                field_errors,
            } => Ok(CheckoutResponse::Rejected {
                message,
                field_errors,
            }),
            ApiOutcome::NetworkError { message } => Err(ApiError::Network(message)),
            ApiOutcome::ServerError { message } => Err(ApiError::Server(message)),
        }
    }
}

/// Data returned by a checkout call that did not raise
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckoutResponse {
    Accepted {
        order_id: OrderId,
    },
    /// Deterministic rejection; fix the named fields and resubmit
    Rejected {
        message: String,
        field_errors: FieldErrors,
    },
}

impl CheckoutResponse {
    #[inline]
    pub fn is_accepted(&self) -> bool {
        matches!(self, CheckoutResponse::Accepted { .. })
    }

    pub fn order_id(&self) -> Option<&OrderId> {
        match self {
            CheckoutResponse::Accepted { order_id } => Some(order_id),
            CheckoutResponse::Rejected { .. } => None,
        }
    }
}

/// Result of the simulated per-field server check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteValidation {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RemoteValidation {
    pub fn ok() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    pub fn rejected(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(error.into()),
        }
    }
}
