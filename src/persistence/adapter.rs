//! Form persistence adapter
//!
//! Owns the live [`FormData`] and mirrors it into a [`KeyValueStore`] on
//! every edit. Reads fail open: a missing, unreadable or malformed snapshot
//! is simply "no data".

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::snapshot::PersistedSnapshot;
use super::store::KeyValueStore;
use crate::clock::Clock;
use crate::form::{FormData, FormDataPatch, FormField, format_field};

pub const DEFAULT_STORAGE_KEY: &str = "checkout-form-storage";

/// Auto-save status for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistenceInfo {
    pub has_persisted_data: bool,
    pub last_saved_at: Option<DateTime<Utc>>,
    pub is_auto_saving: bool,
    pub formatted_last_saved: Option<String>,
}

/// Export of the live form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormExport {
    pub form_data: FormData,
    pub exported_at: DateTime<Utc>,
    pub is_dirty: bool,
    #[serde(with = "chrono::serde::ts_milliseconds_option")]
    pub last_saved_at: Option<DateTime<Utc>>,
}

pub struct FormPersistence {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    key: String,
    form: FormData,
    is_dirty: bool,
    last_saved_at: Option<DateTime<Utc>>,
}

impl FormPersistence {
    /// Empty form; does not look at the store
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            store,
            clock,
            key: key.into(),
            form: FormData::default(),
            is_dirty: false,
            last_saved_at: None,
        }
    }

    /// Initial load: restore the saved snapshot if there is a usable one.
    ///
    /// The form counts as dirty when any restored field is non-empty.
    pub fn load(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        key: impl Into<String>,
    ) -> Self {
        let mut persistence = Self::new(store, clock, key);
        if let Some(snapshot) = persistence.read_snapshot() {
            persistence.is_dirty = snapshot.form_data.has_any_value();
            persistence.last_saved_at = snapshot.last_saved_at;
            persistence.form = snapshot.form_data;
            info!(
                key = %persistence.key,
                is_dirty = persistence.is_dirty,
                "Restored persisted form"
            );
        }
        persistence
    }

    pub fn form_data(&self) -> &FormData {
        &self.form
    }

    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    pub fn last_saved_at(&self) -> Option<DateTime<Utc>> {
        self.last_saved_at
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Merge `patch` into the form, mark it dirty and persist
    pub fn update(&mut self, patch: &FormDataPatch) {
        if patch.is_empty() {
            return;
        }
        self.form.merge(patch);
        self.is_dirty = true;
        self.persist();
    }

    /// Format raw input for `field`, store it, and return the stored text
    pub fn update_field(&mut self, field: FormField, raw: &str) -> String {
        let formatted = format_field(field, raw);
        self.update(&FormDataPatch::single(field, formatted.clone()));
        formatted
    }

    /// Replace the form with `data` (treated as an edit)
    pub fn restore_form_data(&mut self, data: FormData) {
        self.update(&FormDataPatch::from(data));
    }

    /// Manual save; no-op unless the form is dirty
    pub fn save_form_data(&mut self) -> bool {
        self.persist()
    }

    pub fn has_persisted_data(&self) -> bool {
        self.read_snapshot()
            .is_some_and(|snapshot| snapshot.form_data.has_any_value())
    }

    pub fn get_persisted_form_data(&self) -> Option<FormData> {
        self.read_snapshot().map(|snapshot| snapshot.form_data)
    }

    /// Delete the snapshot and empty the form
    pub fn clear_persisted_data(&mut self) {
        if let Err(e) = self.store.remove(&self.key) {
            warn!(key = %self.key, error = %e, "Failed to remove persisted form");
        }
        self.form = FormData::default();
        self.is_dirty = false;
        self.last_saved_at = None;
        info!(key = %self.key, "Persisted form cleared");
    }

    /// Clear only if there is saved data and `confirm` approves.
    ///
    /// Returns true when the form ends up cleared (or had nothing saved).
    pub fn confirm_clear_data(&mut self, confirm: impl FnOnce() -> bool) -> bool {
        if !self.has_persisted_data() {
            return true;
        }
        if confirm() {
            self.clear_persisted_data();
            true
        } else {
            false
        }
    }

    pub fn persistence_info(&self) -> PersistenceInfo {
        PersistenceInfo {
            has_persisted_data: self.has_persisted_data(),
            last_saved_at: self.last_saved_at,
            is_auto_saving: self.is_dirty,
            formatted_last_saved: self
                .last_saved_at
                .map(|at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string()),
        }
    }

    pub fn export_form_data(&self) -> FormExport {
        FormExport {
            form_data: self.form.clone(),
            exported_at: self.clock.now(),
            is_dirty: self.is_dirty,
            last_saved_at: self.last_saved_at,
        }
    }

    /// Write the current form under the key (last write wins).
    ///
    /// Write failures are logged and reported as `false`; the in-memory form
    /// stays authoritative.
    fn persist(&mut self) -> bool {
        if !self.is_dirty {
            return false;
        }

        let now = self.clock.now();
        let snapshot = PersistedSnapshot {
            form_data: self.form.clone(),
            is_dirty: self.is_dirty,
            last_saved_at: Some(now),
        };

        let written = snapshot
            .encode()
            .map_err(|e| e.to_string())
            .and_then(|raw| self.store.set(&self.key, &raw).map_err(|e| e.to_string()));
        match written {
            Ok(()) => {
                self.last_saved_at = Some(now);
                debug!(key = %self.key, "Form persisted");
                true
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to persist form");
                false
            }
        }
    }

    fn read_snapshot(&self) -> Option<PersistedSnapshot> {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to read persisted form");
                return None;
            }
        };

        let snapshot = PersistedSnapshot::decode(&raw);
        if snapshot.is_none() {
            debug!(key = %self.key, "Ignoring malformed persisted form");
        }
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FakeClock;
    use crate::persistence::store::{MemoryStore, StoreError};
    use chrono::TimeZone;

    fn setup() -> (Arc<MemoryStore>, Arc<FakeClock>) {
        let start = Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).unwrap();
        (Arc::new(MemoryStore::new()), Arc::new(FakeClock::new(start)))
    }

    /// Store whose every operation fails
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Io(std::io::Error::other("disk on fire")))
        }
        fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Io(std::io::Error::other("disk on fire")))
        }
        fn remove(&self, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::Io(std::io::Error::other("disk on fire")))
        }
    }

    #[test]
    fn test_edit_persists_formatted_value() {
        let (store, clock) = setup();
        let mut persistence =
            FormPersistence::new(store.clone(), clock.clone(), DEFAULT_STORAGE_KEY);

        let stored = persistence.update_field(FormField::CardNumber, "4242424242424242");
        assert_eq!(stored, "4242 4242 4242 4242");
        assert!(persistence.is_dirty());
        assert_eq!(persistence.last_saved_at(), Some(clock.now()));

        let saved = persistence.get_persisted_form_data().unwrap();
        assert_eq!(saved.card_number, "4242 4242 4242 4242");
    }

    #[test]
    fn test_load_restores_and_marks_dirty() {
        let (store, clock) = setup();
        {
            let mut first = FormPersistence::new(store.clone(), clock.clone(), DEFAULT_STORAGE_KEY);
            first.update_field(FormField::Email, "ada@example.com");
        }

        let reloaded = FormPersistence::load(store, clock.clone(), DEFAULT_STORAGE_KEY);
        assert_eq!(reloaded.form_data().email, "ada@example.com");
        assert!(reloaded.is_dirty());
        assert_eq!(reloaded.last_saved_at(), Some(clock.now()));
    }

    #[test]
    fn test_load_with_empty_snapshot_is_clean() {
        let (store, clock) = setup();
        let empty = PersistedSnapshot::default().encode().unwrap();
        store.set(DEFAULT_STORAGE_KEY, &empty).unwrap();

        let loaded = FormPersistence::load(store, clock, DEFAULT_STORAGE_KEY);
        assert!(!loaded.is_dirty());
        assert!(!loaded.has_persisted_data());
        assert_eq!(loaded.get_persisted_form_data(), Some(FormData::default()));
    }

    #[test]
    fn test_corrupt_snapshot_fails_open() {
        let (store, clock) = setup();
        store.set(DEFAULT_STORAGE_KEY, "{not json").unwrap();

        let loaded = FormPersistence::load(store, clock, DEFAULT_STORAGE_KEY);
        assert_eq!(loaded.form_data(), &FormData::default());
        assert!(!loaded.has_persisted_data());
        assert_eq!(loaded.get_persisted_form_data(), None);
    }

    #[test]
    fn test_broken_store_never_blocks_editing() {
        let (_, clock) = setup();
        let mut persistence =
            FormPersistence::load(Arc::new(BrokenStore), clock, DEFAULT_STORAGE_KEY);

        persistence.update_field(FormField::FullName, "Ada");
        assert_eq!(persistence.form_data().full_name, "Ada");
        assert_eq!(persistence.last_saved_at(), None);
        assert!(!persistence.has_persisted_data());

        persistence.clear_persisted_data();
        assert_eq!(persistence.form_data(), &FormData::default());
    }

    #[test]
    fn test_clear_removes_snapshot_and_form() {
        let (store, clock) = setup();
        let mut persistence = FormPersistence::new(store.clone(), clock, DEFAULT_STORAGE_KEY);
        persistence.update_field(FormField::Cvv, "123");
        assert!(persistence.has_persisted_data());

        persistence.clear_persisted_data();
        assert!(!persistence.has_persisted_data());
        assert_eq!(persistence.get_persisted_form_data(), None);
        assert_eq!(persistence.form_data(), &FormData::default());
        assert!(!persistence.is_dirty());
        assert!(store.is_empty());
    }

    #[test]
    fn test_confirm_clear_respects_answer() {
        let (store, clock) = setup();
        let mut persistence = FormPersistence::new(store, clock, DEFAULT_STORAGE_KEY);

        // Nothing saved: nothing to confirm
        assert!(persistence.confirm_clear_data(|| panic!("should not ask")));

        persistence.update_field(FormField::Email, "ada@example.com");
        assert!(!persistence.confirm_clear_data(|| false));
        assert!(persistence.has_persisted_data());

        assert!(persistence.confirm_clear_data(|| true));
        assert!(!persistence.has_persisted_data());
    }

    #[test]
    fn test_last_write_wins() {
        let (store, clock) = setup();
        let mut persistence = FormPersistence::new(store, clock.clone(), DEFAULT_STORAGE_KEY);
        persistence.update_field(FormField::Email, "first@example.com");
        clock.advance(std::time::Duration::from_secs(5));
        persistence.update_field(FormField::Email, "second@example.com");

        assert_eq!(
            persistence.get_persisted_form_data().unwrap().email,
            "second@example.com"
        );
        assert_eq!(persistence.last_saved_at(), Some(clock.now()));
    }

    #[test]
    fn test_save_requires_dirty_form() {
        let (store, clock) = setup();
        let mut persistence = FormPersistence::new(store.clone(), clock, DEFAULT_STORAGE_KEY);
        assert!(!persistence.save_form_data());
        assert!(store.is_empty());

        persistence.restore_form_data(FormData {
            full_name: "Ada Lovelace".into(),
            ..Default::default()
        });
        assert!(persistence.save_form_data());
    }

    #[test]
    fn test_info_and_export() {
        let (store, clock) = setup();
        let mut persistence = FormPersistence::new(store, clock.clone(), DEFAULT_STORAGE_KEY);
        persistence.update_field(FormField::Email, "ada@example.com");

        let info = persistence.persistence_info();
        assert!(info.has_persisted_data);
        assert!(info.is_auto_saving);
        assert_eq!(info.formatted_last_saved.as_deref(), Some("2026-10-18 09:30:00 UTC"));

        let export = persistence.export_form_data();
        assert_eq!(export.form_data.email, "ada@example.com");
        assert_eq!(export.exported_at, clock.now());
        assert!(export.is_dirty);
    }
}
