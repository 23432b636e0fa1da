//! Submission state machine
//!
//! Drives one checkout submission at a time against a [`CheckoutEndpoint`].
//! The current [`SubmissionView`] lives inside a `watch` channel: every
//! transition is a single `send_if_modified` on it, so check-and-transition
//! is atomic and observers see each resting state.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::error::SubmissionError;
use super::retry::{RetryPolicy, RetryState};
use super::state::{FailureKind, SubmissionStatus};
use crate::api::{ApiError, CheckoutEndpoint, CheckoutResponse, OrderId};
use crate::clock::Clock;
use crate::form::{FieldErrors, FormData};

/// Read-only status exposed to the presentation layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SubmissionView {
    pub status: SubmissionStatus,
    /// Dismissible global message for the current cycle
    pub error: Option<String>,
    pub field_errors: FieldErrors,
    pub order_id: Option<OrderId>,
    pub failure: Option<FailureKind>,
    pub retry: RetryState,
    /// Raised failures since the machine was created
    pub total_failures: u32,
    /// Most recent error message; survives `dismiss_error`
    pub last_error: Option<String>,
    pub last_success_at: Option<DateTime<Utc>>,
    /// Bumped by every submit/retry/reset; late outcomes from an older
    /// epoch are discarded
    #[serde(skip)]
    epoch: u64,
}

impl SubmissionView {
    #[inline]
    pub fn is_loading(&self) -> bool {
        self.status.is_in_flight()
    }

    #[inline]
    pub fn is_retrying(&self) -> bool {
        self.status == SubmissionStatus::Retrying
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        self.status == SubmissionStatus::Succeeded
    }

    fn clear_cycle(&mut self) {
        self.error = None;
        self.field_errors.clear();
        self.order_id = None;
        self.failure = None;
    }
}

pub struct SubmissionMachine {
    endpoint: Arc<dyn CheckoutEndpoint>,
    clock: Arc<dyn Clock>,
    policy: RetryPolicy,
    state: watch::Sender<SubmissionView>,
}

impl SubmissionMachine {
    pub fn new(endpoint: Arc<dyn CheckoutEndpoint>, clock: Arc<dyn Clock>) -> Self {
        Self::with_policy(endpoint, clock, RetryPolicy::default())
    }

    pub fn with_policy(
        endpoint: Arc<dyn CheckoutEndpoint>,
        clock: Arc<dyn Clock>,
        policy: RetryPolicy,
    ) -> Self {
        let (state, _) = watch::channel(SubmissionView::default());
        Self {
            endpoint,
            clock,
            policy,
            state,
        }
    }

    /// Snapshot of the current view
    pub fn view(&self) -> SubmissionView {
        self.state.borrow().clone()
    }

    pub fn status(&self) -> SubmissionStatus {
        self.state.borrow().status
    }

    pub fn retry_state(&self) -> RetryState {
        self.state.borrow().retry
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Observe every published view
    pub fn subscribe(&self) -> watch::Receiver<SubmissionView> {
        self.state.subscribe()
    }

    /// True when `retry` would be accepted right now
    pub fn can_retry(&self) -> bool {
        let view = self.state.borrow();
        view.status == SubmissionStatus::Failed
            && view.failure == Some(FailureKind::Transient)
            && !self.policy.is_exhausted(&view.retry)
    }

    /// Start a new submission cycle.
    ///
    /// Refused with [`SubmissionError::InFlight`] while another attempt is
    /// outstanding. Resets retry bookkeeping.
    pub async fn submit(&self, form: &FormData) -> Result<CheckoutResponse, SubmissionError> {
        let epoch = self.begin_submit()?;
        info!(endpoint = self.endpoint.name(), "Submission started");
        self.run_attempt(epoch, form).await
    }

    /// Retry after a raised failure, waiting the backoff delay first.
    pub async fn retry(&self, form: &FormData) -> Result<CheckoutResponse, SubmissionError> {
        let (epoch, delay, attempt) = self.begin_retry()?;
        info!(
            attempt = attempt,
            max_attempts = self.policy.max_attempts,
            delay_ms = delay.as_millis() as u64,
            "Retrying submission"
        );

        self.clock.sleep(delay).await;
        if self.state.borrow().epoch != epoch {
            debug!(attempt = attempt, "Retry abandoned during backoff");
            return Err(SubmissionError::Superseded);
        }

        self.run_attempt(epoch, form).await
    }

    /// Submit, then keep retrying raised failures until success, a
    /// rejection, or the retry ceiling.
    ///
    /// On exhaustion the last raised failure is returned; no backoff follows
    /// the final attempt.
    pub async fn auto_retry(&self, form: &FormData) -> Result<CheckoutResponse, SubmissionError> {
        let mut last = match self.submit(form).await {
            Err(SubmissionError::Transient(e)) => e,
            other => return other,
        };

        loop {
            let retry = self.retry_state();
            if self.policy.is_exhausted(&retry) {
                warn!(
                    attempts = retry.attempt_count,
                    error = %last,
                    "Auto-retry exhausted"
                );
                return Err(SubmissionError::Transient(last));
            }

            match self.retry(form).await {
                Err(SubmissionError::Transient(e)) => last = e,
                other => return other,
            }
        }
    }

    /// Back to IDLE from any state. An attempt still in flight is orphaned:
    /// its outcome will not be applied.
    pub fn reset(&self) {
        self.state.send_modify(|view| {
            view.epoch += 1;
            view.status = SubmissionStatus::Idle;
            view.retry = RetryState::default();
            view.clear_cycle();
            view.last_error = None;
        });
        debug!("Submission state reset");
    }

    /// Hide the global error message without changing status
    pub fn dismiss_error(&self) {
        self.state.send_if_modified(|view| view.error.take().is_some());
    }

    fn begin_submit(&self) -> Result<u64, SubmissionError> {
        let mut begun = Err(SubmissionError::InFlight(SubmissionStatus::Submitting));
        self.state.send_if_modified(|view| {
            if view.status.is_in_flight() {
                begun = Err(SubmissionError::InFlight(view.status));
                return false;
            }
            view.epoch += 1;
            view.status = SubmissionStatus::Submitting;
            view.retry = RetryState::default();
            view.clear_cycle();
            begun = Ok(view.epoch);
            true
        });

        if let Err(e) = &begun {
            warn!(error = %e, "Submit refused");
        }
        begun
    }

    fn begin_retry(&self) -> Result<(u64, Duration, u32), SubmissionError> {
        let mut begun = Err(SubmissionError::NotRetryable(SubmissionStatus::Idle));
        let policy = self.policy;
        self.state.send_if_modified(|view| {
            begun = match (view.status, view.failure) {
                (status, _) if status.is_in_flight() => Err(SubmissionError::InFlight(status)),
                (SubmissionStatus::Failed, Some(FailureKind::Rejected)) => {
                    Err(SubmissionError::ValidationNotRetryable)
                }
                (SubmissionStatus::Failed, Some(FailureKind::Transient)) => {
                    if policy.is_exhausted(&view.retry) {
                        Err(SubmissionError::RetryExhausted {
                            attempts: view.retry.attempt_count,
                        })
                    } else {
                        let delay = policy.delay_for(view.retry.attempt_count);
                        view.retry.record_attempt(delay);
                        view.epoch += 1;
                        view.status = SubmissionStatus::Retrying;
                        view.clear_cycle();
                        Ok((view.epoch, delay, view.retry.attempt_count))
                    }
                }
                (status, _) => Err(SubmissionError::NotRetryable(status)),
            };
            begun.is_ok()
        });

        if let Err(e) = &begun {
            warn!(code = e.code(), error = %e, "Retry refused");
        }
        begun
    }

    async fn run_attempt(
        &self,
        epoch: u64,
        form: &FormData,
    ) -> Result<CheckoutResponse, SubmissionError> {
        let result = self.endpoint.submit(form).await;
        let now = self.clock.now();

        let mut applied = false;
        self.state.send_if_modified(|view| {
            if view.epoch != epoch {
                return false;
            }
            apply_outcome(view, &result, now);
            applied = true;
            true
        });

        if !applied {
            debug!("Outcome of superseded attempt discarded");
            return Err(SubmissionError::Superseded);
        }

        match &result {
            Ok(CheckoutResponse::Accepted { order_id }) => {
                info!(order_id = %order_id, "Submission succeeded")
            }
            Ok(CheckoutResponse::Rejected { field_errors, .. }) => {
                info!(fields = field_errors.len(), "Submission rejected with field errors")
            }
            Err(e) => warn!(code = e.code(), error = %e, "Submission failed"),
        }
        result.map_err(SubmissionError::from)
    }
}

fn apply_outcome(
    view: &mut SubmissionView,
    result: &Result<CheckoutResponse, ApiError>,
    now: DateTime<Utc>,
) {
    match result {
        Ok(CheckoutResponse::Accepted { order_id }) => {
            view.status = SubmissionStatus::Succeeded;
            view.clear_cycle();
            view.order_id = Some(order_id.clone());
            view.retry = RetryState::default();
            view.last_success_at = Some(now);
        }
        Ok(CheckoutResponse::Rejected {
            message,
            field_errors,
        }) => {
            // Deterministic rejection: no retry budget involved
            view.status = SubmissionStatus::Failed;
            view.failure = Some(FailureKind::Rejected);
            view.error = Some(message.clone());
            view.field_errors = field_errors.clone();
            view.last_error = Some(message.clone());
        }
        Err(e) => {
            view.status = SubmissionStatus::Failed;
            view.failure = Some(FailureKind::Transient);
            view.error = Some(e.to_string());
            view.field_errors.clear();
            view.last_error = Some(e.to_string());
            view.total_failures += 1;
        }
    }
}
