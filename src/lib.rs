//! Checkout Form Core
//!
//! Client-side checkout logic without the UI: input formatting and
//! validation, a simulated payment endpoint, a retrying submission state
//! machine and local persistence of in-progress form data.
//!
//! # Modules
//!
//! - [`form`] - Field values, formatters, validators, checkout schema
//! - [`api`] - Endpoint contract and the weighted-scenario simulator
//! - [`submission`] - Submission FSM with retry ceiling and backoff
//! - [`persistence`] - Snapshot storage of the live form
//! - [`session`] - One form wired to persistence and the FSM
//! - [`clock`] - Injectable time source
//! - [`config`] - YAML configuration
//! - [`logging`] - Tracing subscriber setup

// Leaf components
pub mod clock;
pub mod form;

// Collaborators
pub mod api;
pub mod persistence;

// Orchestration
pub mod session;
pub mod submission;

// Ambient
pub mod config;
pub mod logging;

// Convenient re-exports at crate root
pub use api::{
    ApiError, ApiOutcome, CheckoutEndpoint, CheckoutResponse, OrderId, ScenarioKind,
    ScenarioSet, SimulatedEndpoint, SimulationOptions,
};
pub use clock::{Clock, FakeClock, SystemClock};
pub use config::AppConfig;
pub use form::{FieldErrors, FormData, FormDataPatch, FormField};
pub use persistence::{FileStore, FormPersistence, KeyValueStore, MemoryStore, PersistedSnapshot};
pub use session::CheckoutSession;
pub use submission::{
    RetryPolicy, RetryState, SubmissionError, SubmissionMachine, SubmissionStatus, SubmissionView,
};
