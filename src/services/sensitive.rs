use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::db::queries;
use crate::models::SensitivePayload;

/// Sink for the raw billing payload attached to a booking request.
///
/// The implementation is chosen once at startup; a booking never fails
/// because this store is missing or broken. `record` reports whether the
/// payload was actually written so the response can say so.
pub trait SensitiveStore: Send + Sync {
    fn record(&self, booking_id: &str, payload: &SensitivePayload) -> bool;
}

/// Writes payloads verbatim into the `booking_sensitive` table.
pub struct SqliteSensitiveStore {
    db: Arc<Mutex<Connection>>,
}

impl SqliteSensitiveStore {
    pub fn new(db: Arc<Mutex<Connection>>) -> Self {
        Self { db }
    }
}

impl SensitiveStore for SqliteSensitiveStore {
    fn record(&self, booking_id: &str, payload: &SensitivePayload) -> bool {
        let json = match serde_json::to_string(payload) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(booking_id = %booking_id, error = %e, "failed to serialize sensitive payload");
                return false;
            }
        };

        let db = self.db.lock().unwrap();
        match queries::create_sensitive_record(&db, booking_id, &json, payload.notes.as_deref()) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    booking_id = %booking_id,
                    error = %e,
                    "failed to record sensitive payload, booking proceeds without it"
                );
                false
            }
        }
    }
}

/// No-op store used when sensitive recording is not provisioned.
pub struct DisabledSensitiveStore;

impl SensitiveStore for DisabledSensitiveStore {
    fn record(&self, _booking_id: &str, _payload: &SensitivePayload) -> bool {
        false
    }
}
