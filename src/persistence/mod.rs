//! Local persistence of in-progress form data.
//!
//! The snapshot key is owned exclusively by [`FormPersistence`]; the
//! submission state machine never touches it.

pub mod adapter;
pub mod snapshot;
pub mod store;

pub use adapter::{DEFAULT_STORAGE_KEY, FormExport, FormPersistence, PersistenceInfo};
pub use snapshot::{PersistedSnapshot, SNAPSHOT_VERSION};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
