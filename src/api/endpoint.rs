//! Checkout endpoint
//!
//! [`CheckoutEndpoint`] is the seam between the submission state machine and
//! whatever answers checkout requests. [`SimulatedEndpoint`] answers them
//! locally: it waits a fixed latency, then draws a weighted scenario.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::error::ApiError;
use super::scenario::{ScenarioKind, ScenarioSet, select_scenario};
use super::types::{ApiOutcome, CheckoutResponse, RemoteValidation};
use crate::clock::Clock;
use crate::form::{FormData, FormField, mask_card_number, unformat_card_number};

pub const DEFAULT_DELAY_MS: u64 = 1500;
pub const DEFAULT_FIELD_VALIDATION_DELAY_MS: u64 = 300;

pub const BLOCKED_EMAIL: &str = "test@blocked.com";
pub const DECLINED_CARD: &str = "4000000000000002";
pub const MSG_EMAIL_NOT_ALLOWED: &str = "This email address is not allowed";
pub const MSG_CARD_DECLINED: &str = "This card has been declined";

/// Anything that can accept a checkout submission
#[async_trait]
pub trait CheckoutEndpoint: Send + Sync {
    fn name(&self) -> &'static str;

    /// Submit the form.
    ///
    /// `Ok(Rejected)` is a deterministic, field-scoped refusal.
    /// `Err(_)` is a transient failure worth retrying.
    async fn submit(&self, form: &FormData) -> Result<CheckoutResponse, ApiError>;
}

/// Tunables for [`SimulatedEndpoint`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationOptions {
    pub delay_ms: u64,
    pub field_validation_delay_ms: u64,
    pub scenarios: ScenarioSet,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            delay_ms: DEFAULT_DELAY_MS,
            field_validation_delay_ms: DEFAULT_FIELD_VALIDATION_DELAY_MS,
            scenarios: ScenarioSet::default(),
        }
    }
}

impl SimulationOptions {
    pub fn forced(kind: ScenarioKind) -> Self {
        Self {
            scenarios: ScenarioSet::forced(kind),
            ..Self::default()
        }
    }
}

/// Local stand-in for the payment backend
pub struct SimulatedEndpoint {
    options: SimulationOptions,
    clock: Arc<dyn Clock>,
    rng: Mutex<StdRng>,
    /// Queued outcomes consumed before any weighted draw
    script: Mutex<VecDeque<ScenarioKind>>,
}

impl SimulatedEndpoint {
    pub fn new(options: SimulationOptions, clock: Arc<dyn Clock>) -> Self {
        Self::with_rng(options, clock, StdRng::from_entropy())
    }

    /// Deterministic draws, for reproducible runs
    pub fn with_seed(options: SimulationOptions, clock: Arc<dyn Clock>, seed: u64) -> Self {
        Self::with_rng(options, clock, StdRng::seed_from_u64(seed))
    }

    /// Every submission resolves to `kind`
    pub fn forced(kind: ScenarioKind, clock: Arc<dyn Clock>) -> Self {
        Self::new(SimulationOptions::forced(kind), clock)
    }

    /// Resolve the next submissions to `kinds` in order, then draw by weight
    pub fn scripted(
        kinds: impl IntoIterator<Item = ScenarioKind>,
        options: SimulationOptions,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let endpoint = Self::new(options, clock);
        endpoint.enqueue(kinds);
        endpoint
    }

    fn with_rng(options: SimulationOptions, clock: Arc<dyn Clock>, rng: StdRng) -> Self {
        Self {
            options,
            clock,
            rng: Mutex::new(rng),
            script: Mutex::new(VecDeque::new()),
        }
    }

    /// Append forced outcomes to the script
    pub fn enqueue(&self, kinds: impl IntoIterator<Item = ScenarioKind>) {
        let mut script = self.script.lock().unwrap_or_else(|e| e.into_inner());
        script.extend(kinds);
    }

    pub fn options(&self) -> &SimulationOptions {
        &self.options
    }

    /// Draw the next outcome without waiting
    pub fn draw(&self) -> ApiOutcome {
        let scripted = self
            .script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();

        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        let kind = match scripted {
            Some(kind) => {
                debug!(scenario = %kind, "Scripted scenario");
                kind
            }
            None => {
                let roll: f64 = rng.gen_range(0.0..1.0);
                let kind = match select_scenario(self.options.scenarios.scenarios(), roll) {
                    Some(kind) => kind,
                    None => {
                        warn!(roll = roll, "No scenario matched roll, defaulting to success");
                        self.options.scenarios.select(roll)
                    }
                };
                debug!(roll = roll, scenario = %kind, "Scenario selected");
                kind
            }
        };
        ApiOutcome::from_kind(kind, &mut *rng)
    }

    /// Simulated server-side check of a single field
    pub async fn validate_remote(&self, field: FormField, value: &str) -> RemoteValidation {
        self.clock
            .sleep(Duration::from_millis(self.options.field_validation_delay_ms))
            .await;

        match field {
            FormField::Email if value == BLOCKED_EMAIL => {
                RemoteValidation::rejected(MSG_EMAIL_NOT_ALLOWED)
            }
            FormField::CardNumber if unformat_card_number(value) == DECLINED_CARD => {
                RemoteValidation::rejected(MSG_CARD_DECLINED)
            }
            _ => RemoteValidation::ok(),
        }
    }
}

#[async_trait]
impl CheckoutEndpoint for SimulatedEndpoint {
    fn name(&self) -> &'static str {
        "Simulated"
    }

    async fn submit(&self, form: &FormData) -> Result<CheckoutResponse, ApiError> {
        debug!(
            email = %form.email,
            card = %mask_card_number(&form.card_number),
            delay_ms = self.options.delay_ms,
            "Simulated checkout request"
        );

        self.clock
            .sleep(Duration::from_millis(self.options.delay_ms))
            .await;

        let result = self.draw().into_response();
        match &result {
            Ok(CheckoutResponse::Accepted { order_id }) => {
                info!(order_id = %order_id, "Simulated checkout accepted")
            }
            Ok(CheckoutResponse::Rejected { message, .. }) => {
                info!(message = %message, "Simulated checkout rejected")
            }
            Err(e) => warn!(code = e.code(), error = %e, "Simulated checkout failed"),
        }
        result
    }
}
