//! Checkout Submission FSM
//!
//! # State Machine
//!
//! ```text
//! IDLE ──submit──▶ SUBMITTING ──▶ SUCCEEDED
//!                      │
//!                      ▼
//!                   FAILED ──retry (attempts < 3)──▶ RETRYING ──▶ SUCCEEDED | FAILED
//!
//! reset: any state ──▶ IDLE
//! ```
//!
//! # Invariants
//!
//! 1. **Single writer**: `submit`/`retry` are refused while an attempt is in flight
//! 2. **Rejections are final for the cycle**: field-level rejections never consume retry budget
//! 3. **Bounded retries**: `attempt_count <= max_attempts`, backoff `min(1000 * 2^n, 5000)` ms
//! 4. **No stale writes**: outcomes arriving after `reset` are dropped

pub mod error;
pub mod machine;
pub mod retry;
pub mod state;

pub use error::SubmissionError;
pub use machine::{SubmissionMachine, SubmissionView};
pub use retry::{RetryPolicy, RetryState};
pub use state::{FailureKind, SubmissionStatus};
