//! Persisted snapshot format
//!
//! Stored value under the form key:
//!
//! ```json
//! { "state": { "formData": {...}, "isDirty": true, "lastSavedAt": 1760000000000 }, "version": 0 }
//! ```
//!
//! `lastSavedAt` is milliseconds since the Unix epoch (or `null`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::form::FormData;

pub const SNAPSHOT_VERSION: u32 = 0;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSnapshot {
    #[serde(default)]
    pub form_data: FormData,
    #[serde(default)]
    pub is_dirty: bool,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub last_saved_at: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    state: &'a PersistedSnapshot,
    version: u32,
}

#[derive(Deserialize)]
struct Envelope {
    state: PersistedSnapshot,
    #[serde(default)]
    version: u32,
}

impl PersistedSnapshot {
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&EnvelopeRef {
            state: self,
            version: SNAPSHOT_VERSION,
        })
    }

    /// `None` for malformed JSON or an unknown version
    pub fn decode(raw: &str) -> Option<Self> {
        let envelope: Envelope = serde_json::from_str(raw).ok()?;
        (envelope.version == SNAPSHOT_VERSION).then_some(envelope.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_wire_format() {
        let snapshot = PersistedSnapshot {
            form_data: FormData {
                email: "ada@example.com".into(),
                ..Default::default()
            },
            is_dirty: true,
            last_saved_at: Some(Utc.timestamp_millis_opt(1_760_000_000_000).unwrap()),
        };

        let json: serde_json::Value = serde_json::from_str(&snapshot.encode().unwrap()).unwrap();
        assert_eq!(json["version"], 0);
        assert_eq!(json["state"]["formData"]["email"], "ada@example.com");
        assert_eq!(json["state"]["isDirty"], true);
        assert_eq!(json["state"]["lastSavedAt"], 1_760_000_000_000i64);

        assert_eq!(PersistedSnapshot::decode(&snapshot.encode().unwrap()), Some(snapshot));
    }

    #[test]
    fn test_decode_tolerates_missing_fields() {
        let decoded =
            PersistedSnapshot::decode(r#"{"state":{"formData":{"cvv":"123"}}}"#).unwrap();
        assert_eq!(decoded.form_data.cvv, "123");
        assert!(!decoded.is_dirty);
        assert_eq!(decoded.last_saved_at, None);
    }

    #[test]
    fn test_decode_rejects_garbage_and_unknown_versions() {
        assert_eq!(PersistedSnapshot::decode("not json"), None);
        assert_eq!(PersistedSnapshot::decode(r#"{"formData":{}}"#), None);
        assert_eq!(
            PersistedSnapshot::decode(r#"{"state":{"formData":{}},"version":7}"#),
            None
        );
    }
}
