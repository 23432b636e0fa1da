//! Checkout session
//!
//! Wires one form together: edits flow through the formatters into the
//! persistence adapter; submissions are checked against the local schema
//! before the state machine is allowed to call the endpoint.

use std::sync::Arc;
use tracing::debug;

use crate::api::{CheckoutEndpoint, CheckoutResponse};
use crate::clock::Clock;
use crate::config::AppConfig;
use crate::form::{FieldErrors, FormData, FormField, check_field, validate_form};
use crate::persistence::{FormPersistence, KeyValueStore};
use crate::submission::{SubmissionError, SubmissionMachine, SubmissionView};

pub struct CheckoutSession {
    persistence: FormPersistence,
    machine: Arc<SubmissionMachine>,
    clock: Arc<dyn Clock>,
}

impl CheckoutSession {
    pub fn new(
        persistence: FormPersistence,
        machine: Arc<SubmissionMachine>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            persistence,
            machine,
            clock,
        }
    }

    /// Restore any saved form from `store` and build a machine with the
    /// configured retry policy
    pub fn from_config(
        config: &AppConfig,
        store: Arc<dyn KeyValueStore>,
        endpoint: Arc<dyn CheckoutEndpoint>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let persistence =
            FormPersistence::load(store, clock.clone(), config.persistence.storage_key.clone());
        let machine = Arc::new(SubmissionMachine::with_policy(
            endpoint,
            clock.clone(),
            config.retry,
        ));
        Self::new(persistence, machine, clock)
    }

    pub fn form_data(&self) -> &FormData {
        self.persistence.form_data()
    }

    pub fn persistence(&self) -> &FormPersistence {
        &self.persistence
    }

    pub fn persistence_mut(&mut self) -> &mut FormPersistence {
        &mut self.persistence
    }

    pub fn machine(&self) -> &Arc<SubmissionMachine> {
        &self.machine
    }

    pub fn view(&self) -> SubmissionView {
        self.machine.view()
    }

    /// Apply a keystroke-level change; returns the formatted value now shown.
    ///
    /// Editing dismisses the global submit error.
    pub fn edit(&mut self, field: FormField, raw: &str) -> String {
        let formatted = self.persistence.update_field(field, raw);
        self.machine.dismiss_error();
        formatted
    }

    /// Schema message for one field (on blur)
    pub fn field_error(&self, field: FormField) -> Option<&'static str> {
        check_field(field, self.form_data().get(field), self.clock.now()).err()
    }

    pub fn validate(&self) -> FieldErrors {
        validate_form(self.form_data(), self.clock.now())
    }

    /// Validate locally, then run a single submission
    pub async fn submit(&self) -> Result<CheckoutResponse, SubmissionError> {
        let form = self.checked_form()?;
        self.machine.submit(&form).await
    }

    /// Validate locally, then submit with automatic retries
    pub async fn submit_with_retry(&self) -> Result<CheckoutResponse, SubmissionError> {
        let form = self.checked_form()?;
        self.machine.auto_retry(&form).await
    }

    pub async fn retry(&self) -> Result<CheckoutResponse, SubmissionError> {
        let form = self.form_data().clone();
        self.machine.retry(&form).await
    }

    /// Drop saved data, empty the form, and return the machine to IDLE
    pub fn clear_form(&mut self) {
        self.persistence.clear_persisted_data();
        self.machine.reset();
    }

    fn checked_form(&self) -> Result<FormData, SubmissionError> {
        let errors = self.validate();
        if !errors.is_empty() {
            debug!(fields = errors.len(), "Submit blocked by local validation");
            return Err(SubmissionError::InvalidForm(errors));
        }
        Ok(self.form_data().clone())
    }
}
