use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use checkout_form::api::scenario::ScenarioKind;
use checkout_form::{
    AppConfig, CheckoutSession, Clock, FakeClock, FileStore, FormField, KeyValueStore, MemoryStore,
    SimulatedEndpoint, SimulationOptions, SubmissionError, SubmissionStatus,
};

const ENDPOINT_DELAY: Duration = Duration::from_millis(1500);

fn clock() -> Arc<FakeClock> {
    Arc::new(FakeClock::new(
        Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).unwrap(),
    ))
}

fn session_with(
    clock: Arc<FakeClock>,
    store: Arc<dyn KeyValueStore>,
    script: Vec<ScenarioKind>,
    fallback: ScenarioKind,
) -> CheckoutSession {
    let endpoint = SimulatedEndpoint::scripted(
        script,
        SimulationOptions::forced(fallback),
        clock.clone(),
    );
    CheckoutSession::from_config(&AppConfig::default(), store, Arc::new(endpoint), clock)
}

/// Enter a valid card the way a user types it
fn fill_valid(session: &mut CheckoutSession) {
    session.edit(FormField::Email, "grace@example.com");
    session.edit(FormField::FullName, "Grace Hopper");
    session.edit(FormField::CardNumber, "4111 1111-1111 1111");
    session.edit(FormField::ExpiryDate, "1230");
    session.edit(FormField::Cvv, "987");
}

#[tokio::test]
async fn forced_success_places_order() {
    let clock = clock();
    let mut session = session_with(
        clock.clone(),
        Arc::new(MemoryStore::new()),
        vec![],
        ScenarioKind::Success,
    );
    fill_valid(&mut session);
    assert_eq!(session.form_data().card_number, "4111 1111 1111 1111");

    let response = session.submit().await.unwrap();
    let order_id = response.order_id().expect("accepted response carries an order id");
    assert_eq!(order_id.as_str().len(), 9);

    let view = session.view();
    assert_eq!(view.status, SubmissionStatus::Succeeded);
    assert_eq!(view.order_id.as_ref(), Some(order_id));
    assert_eq!(view.retry.attempt_count, 0);
    assert_eq!(view.last_success_at, Some(clock.now()));
    assert_eq!(clock.sleeps(), vec![ENDPOINT_DELAY]);
}

#[tokio::test]
async fn forced_validation_error_sets_field_errors_without_retry() {
    let mut session = session_with(
        clock(),
        Arc::new(MemoryStore::new()),
        vec![],
        ScenarioKind::ValidationError,
    );
    fill_valid(&mut session);

    let response = session.submit().await.unwrap();
    assert!(!response.is_accepted());

    let view = session.view();
    assert_eq!(view.status, SubmissionStatus::Failed);
    assert!(view.field_errors.contains_key(&FormField::CardNumber));
    assert_eq!(view.retry.attempt_count, 0);
    assert_eq!(view.total_failures, 0);

    let err = session.retry().await.unwrap_err();
    assert!(matches!(err, SubmissionError::ValidationNotRetryable));
    assert_eq!(session.view().retry.attempt_count, 0);
}

#[tokio::test]
async fn network_error_then_two_retries_succeeds() {
    let clock = clock();
    let mut session = session_with(
        clock.clone(),
        Arc::new(MemoryStore::new()),
        vec![ScenarioKind::NetworkError, ScenarioKind::NetworkError],
        ScenarioKind::Success,
    );
    fill_valid(&mut session);

    let err = session.submit().await.unwrap_err();
    assert!(err.is_transient());
    assert_eq!(session.view().status, SubmissionStatus::Failed);

    let err = session.retry().await.unwrap_err();
    assert!(err.is_transient());
    assert_eq!(session.view().retry.attempt_count, 1);

    let response = session.retry().await.unwrap();
    assert!(response.is_accepted());

    let view = session.view();
    assert_eq!(view.status, SubmissionStatus::Succeeded);
    assert_eq!(view.retry.attempt_count, 0);
    assert_eq!(view.total_failures, 2);
    assert_eq!(
        clock.sleeps(),
        vec![
            ENDPOINT_DELAY,
            Duration::from_millis(1000),
            ENDPOINT_DELAY,
            Duration::from_millis(2000),
            ENDPOINT_DELAY,
        ]
    );
}

#[tokio::test]
async fn auto_retry_stops_at_ceiling() {
    let clock = clock();
    let mut session = session_with(
        clock.clone(),
        Arc::new(MemoryStore::new()),
        vec![],
        ScenarioKind::ServerError,
    );
    fill_valid(&mut session);

    let err = session.submit_with_retry().await.unwrap_err();
    assert!(err.is_transient());

    let view = session.view();
    assert_eq!(view.status, SubmissionStatus::Failed);
    assert_eq!(view.retry.attempt_count, 3);
    assert_eq!(view.total_failures, 4);

    let backoff: Vec<Duration> = clock
        .sleeps()
        .into_iter()
        .filter(|d| *d != ENDPOINT_DELAY)
        .collect();
    assert_eq!(
        backoff,
        vec![
            Duration::from_millis(1000),
            Duration::from_millis(2000),
            Duration::from_millis(4000),
        ]
    );

    let err = session.retry().await.unwrap_err();
    assert!(matches!(err, SubmissionError::RetryExhausted { attempts: 3 }));
}

#[tokio::test]
async fn persisted_form_round_trips_and_clears() {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let mut session = session_with(clock(), store.clone(), vec![], ScenarioKind::Success);

    session.edit(FormField::Email, "grace@example.com");
    assert!(session.persistence().has_persisted_data());
    let saved = session.persistence().get_persisted_form_data().unwrap();
    assert_eq!(saved.email, "grace@example.com");
    assert_eq!(&saved, session.form_data());

    session.persistence_mut().clear_persisted_data();
    assert!(!session.persistence().has_persisted_data());
    assert!(session.persistence().get_persisted_form_data().is_none());
    assert_eq!(session.form_data().email, "");
}

#[tokio::test]
async fn file_store_restores_form_across_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let clock = clock();

    {
        let store = Arc::new(FileStore::new(dir.path()));
        let mut session = session_with(clock.clone(), store, vec![], ScenarioKind::Success);
        fill_valid(&mut session);
    }

    let store = Arc::new(FileStore::new(dir.path()));
    let session = session_with(clock, store, vec![], ScenarioKind::Success);
    assert!(session.persistence().is_dirty());
    assert_eq!(session.form_data().full_name, "Grace Hopper");
    assert_eq!(session.form_data().expiry_date, "12/30");
    assert!(session.validate().is_empty());
}
