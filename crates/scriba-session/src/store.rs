//! The persistent session store: one record under a fixed key.
//!
//! The persisted copy is a cache of the in-memory session, consulted only
//! at process start. Every failure here is soft: a read problem means "no
//! saved session", a write problem means "not persisted".

use std::sync::Arc;
use std::time::Duration;

use scriba_protocol::{Clock, UserProfile};
use scriba_storage::KeyValueStore;
use serde::{Deserialize, Serialize};

/// What gets written to storage after every login, register or refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSession {
    pub token: String,
    pub user: UserProfile,
    /// Epoch milliseconds at which the record was written.
    #[serde(rename = "savedAt", alias = "timestamp")]
    pub saved_at: u64,
}

/// Saves and restores the [`PersistedSession`] record.
pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    key: String,
    max_age: Duration,
}

impl SessionStore {
    pub fn new(
        storage: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        key: impl Into<String>,
        max_age: Duration,
    ) -> Self {
        Self {
            storage,
            clock,
            key: key.into(),
            max_age,
        }
    }

    /// Reads the saved record.
    ///
    /// Returns `None` when nothing is saved, when the stored value cannot
    /// be read or parsed, or when it is older than the max age. The last
    /// two cases also clear the key so the bad record is not seen again.
    ///
    /// A record stamped in the future (the clock moved backwards) counts
    /// as age zero.
    pub fn load(&self) -> Option<PersistedSession> {
        let raw = match self.storage.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "session record unreadable");
                return None;
            }
        };

        let record: PersistedSession = match serde_json::from_str(&raw) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "corrupt session record discarded");
                self.clear();
                return None;
            }
        };

        let age = self.clock.now_millis().saturating_sub(record.saved_at);
        if u128::from(age) > self.max_age.as_millis() {
            tracing::info!(
                key = %self.key,
                age_secs = age / 1000,
                "persisted session too old, discarded"
            );
            self.clear();
            return None;
        }

        Some(record)
    }

    /// Writes `{token, user, savedAt: now}`.
    ///
    /// A failed write is logged and otherwise ignored: the in-memory
    /// session stays valid.
    pub fn save(&self, token: &str, user: &UserProfile) {
        let record = PersistedSession {
            token: token.to_owned(),
            user: user.clone(),
            saved_at: self.clock.now_millis(),
        };

        let json = match serde_json::to_string(&record) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(error = %e, "session record could not be encoded");
                return;
            }
        };

        if let Err(e) = self.storage.set(&self.key, &json) {
            tracing::warn!(key = %self.key, error = %e, "session not persisted");
        }
    }

    /// Removes the saved record, if any.
    pub fn clear(&self) {
        if let Err(e) = self.storage.remove(&self.key) {
            tracing::warn!(key = %self.key, error = %e, "session record could not be cleared");
        }
    }
}
