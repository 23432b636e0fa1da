//! Checkout API
//!
//! # Outcome routing
//!
//! ```text
//! submit(form) ──▶ Ok(Accepted{order_id})        success
//!              ├─▶ Ok(Rejected{field_errors})    validation error (returned as data)
//!              └─▶ Err(Network | Server)         transient failure (raised)
//! ```
//!
//! Callers must keep the two failure shapes apart: rejections go to the
//! individual inputs, raised failures go to a single global banner and are
//! the only ones eligible for retry.

pub mod endpoint;
pub mod error;
pub mod scenario;
pub mod types;

pub use endpoint::{CheckoutEndpoint, SimulatedEndpoint, SimulationOptions};
pub use error::{ApiError, ScenarioError};
pub use scenario::{DEFAULT_SCENARIOS, Scenario, ScenarioKind, ScenarioSet, select_scenario};
pub use types::{ApiOutcome, CheckoutResponse, OrderId, RemoteValidation};
