//! Checkout Form - command-line driver
//!
//! Runs one checkout session against the simulated endpoint:
//!
//! ```text
//! ┌──────────┐    ┌─────────────┐    ┌──────────────┐    ┌───────────┐
//! │  --field │───▶│ Persistence │───▶│ Submission   │───▶│ Simulated │
//! │  edits   │    │ (FileStore) │    │ FSM (retry)  │    │ endpoint  │
//! └──────────┘    └─────────────┘    └──────────────┘    └───────────┘
//! ```
//!
//! Usage:
//! `checkout_form [--env dev] [--field cardNumber=4242424242424242]... [--scenario network_error]
//!  [--seed 7] [--auto-retry] [--retry N] [--clear]`

use std::sync::Arc;

use anyhow::{Context, bail};
use checkout_form::api::scenario::ScenarioKind;
use checkout_form::form::mask_field;
use checkout_form::{
    AppConfig, CheckoutSession, Clock, FileStore, FormField, SimulatedEndpoint, SubmissionError,
    SystemClock,
};

// ============================================================
// ARGUMENTS
// ============================================================

fn arg_value(args: &[String], names: &[&str]) -> Option<String> {
    args.windows(2)
        .find(|pair| names.contains(&pair[0].as_str()))
        .map(|pair| pair[1].clone())
}

fn arg_values(args: &[String], name: &str) -> Vec<String> {
    args.windows(2)
        .filter(|pair| pair[0] == name)
        .map(|pair| pair[1].clone())
        .collect()
}

fn has_flag(args: &[String], name: &str) -> bool {
    args.iter().any(|a| a == name)
}

fn parse_field_edit(raw: &str) -> anyhow::Result<(FormField, String)> {
    let (name, value) = raw
        .split_once('=')
        .with_context(|| format!("expected FIELD=VALUE, got {}", raw))?;
    let field = name.parse::<FormField>().map_err(anyhow::Error::msg)?;
    Ok((field, value.to_string()))
}

// ============================================================
// MAIN
// ============================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let env = arg_value(&args, &["--env", "-e"]).unwrap_or_else(|| "dev".to_string());

    let mut config = match AppConfig::load(&env) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}; falling back to built-in defaults", e);
            AppConfig::default()
        }
    };
    let _log_guard = checkout_form::logging::init_logging(&config)?;
    tracing::info!(env = %env, "Starting checkout session");

    if let Some(name) = arg_value(&args, &["--scenario"]) {
        let Some(kind) = ScenarioKind::from_name(&name) else {
            bail!("unknown scenario: {}", name);
        };
        config.api.scenarios = checkout_form::ScenarioSet::forced(kind);
    }

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store = Arc::new(FileStore::new(&config.persistence.data_dir));
    let endpoint = match arg_value(&args, &["--seed"]) {
        Some(seed) => {
            let seed: u64 = seed.parse().context("--seed must be an integer")?;
            SimulatedEndpoint::with_seed(config.api.clone(), clock.clone(), seed)
        }
        None => SimulatedEndpoint::new(config.api.clone(), clock.clone()),
    };

    let mut session = CheckoutSession::from_config(&config, store, Arc::new(endpoint), clock);

    if has_flag(&args, "--clear") {
        session.clear_form();
        println!("Saved form cleared.");
        return Ok(());
    }

    if session.persistence().is_dirty() {
        println!("Restored saved form data.");
    }
    for raw in arg_values(&args, "--field") {
        let (field, value) = parse_field_edit(&raw)?;
        let shown = session.edit(field, &value);
        println!("  {:<10} = {}", field, mask_field(field, &shown));
    }

    // Print every status change while the submission runs
    let mut updates = session.machine().subscribe();
    let printer = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let view = updates.borrow_and_update().clone();
            println!(
                "[{}] attempt={} error={}",
                view.status,
                view.retry.attempt_count,
                view.error.as_deref().unwrap_or("-")
            );
        }
    });

    let mut result = if has_flag(&args, "--auto-retry") {
        session.submit_with_retry().await
    } else {
        session.submit().await
    };

    let manual_retries: u32 = match arg_value(&args, &["--retry"]) {
        Some(n) => n.parse().context("--retry must be an integer")?,
        None => 0,
    };
    for _ in 0..manual_retries {
        if !matches!(result, Err(SubmissionError::Transient(_))) {
            break;
        }
        result = session.retry().await;
    }

    let view = session.view();
    drop(session);
    let _ = printer.await;

    match result {
        Ok(response) => match response.order_id() {
            Some(order_id) => println!("Order placed: {}", order_id),
            None => {
                println!("Payment rejected:");
                for (field, message) in &view.field_errors {
                    println!("  {}: {}", field, message);
                }
            }
        },
        Err(SubmissionError::InvalidForm(errors)) => {
            println!("Please fix the form:");
            for (field, message) in &errors {
                println!("  {}: {}", field, message);
            }
        }
        Err(e) => println!("Checkout failed [{}]: {}", e.code(), e),
    }
    Ok(())
}
