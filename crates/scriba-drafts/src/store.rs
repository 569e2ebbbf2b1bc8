//! Per-user draft persistence.
//!
//! Each user owns one JSON array of drafts stored under
//! `"<namespace>::<owner>"`. Reads never fail: missing and corrupt
//! collections both read as empty. Writes always report failure, since a
//! silently lost draft is lost work.
//!
//! Records are decoded one at a time. A record that does not decode is
//! skipped on read but written back verbatim, and a collection that is not
//! a JSON array at all is copied to `"<key>.corrupt"` before the first
//! write replaces it.

use std::sync::Arc;

use scriba_protocol::{Draft, DraftId};
use scriba_storage::{KeyValueStore, StorageError, scoped_key};
use serde_json::Value;

use crate::DraftError;

/// A stored collection as read back.
#[derive(Default)]
struct Collection {
    drafts: Vec<Draft>,
    /// Records that did not decode as drafts.
    unreadable: Vec<Value>,
    /// Raw text of a collection that was not a JSON array.
    damaged: Option<String>,
}

/// Reads and writes draft collections, one per owner key.
pub struct DraftStore {
    storage: Arc<dyn KeyValueStore>,
    namespace: String,
}

impl DraftStore {
    pub fn new(storage: Arc<dyn KeyValueStore>, namespace: impl Into<String>) -> Self {
        Self {
            storage,
            namespace: namespace.into(),
        }
    }

    fn key(&self, owner: &str) -> String {
        scoped_key(&self.namespace, owner)
    }

    /// All drafts of `owner`, in stored order.
    pub fn list_all(&self, owner: &str) -> Vec<Draft> {
        let key = self.key(owner);
        match self.load(&key) {
            Ok(collection) => collection.drafts,
            Err(e) => {
                tracing::warn!(%key, error = %e, "draft collection unreadable, treating as empty");
                Vec::new()
            }
        }
    }

    /// Looks up one draft of `owner`.
    pub fn find(&self, owner: &str, id: DraftId) -> Option<Draft> {
        self.list_all(owner).into_iter().find(|d| d.id == id)
    }

    /// Replaces the draft with the same id, or appends it.
    pub fn upsert(&self, owner: &str, draft: &Draft) -> Result<(), DraftError> {
        let key = self.key(owner);
        let mut collection = self.load_for_update(&key)?;
        match collection.drafts.iter_mut().find(|d| d.id == draft.id) {
            Some(existing) => *existing = draft.clone(),
            None => collection.drafts.push(draft.clone()),
        }
        self.write(&key, &collection)
    }

    /// Removes the draft with `id`. Absent ids are a no-op.
    pub fn delete(&self, owner: &str, id: DraftId) -> Result<(), DraftError> {
        self.remove_where(owner, |d| d.id == id).map(|_| ())
    }

    /// Removes every draft matching `pred` in a single write and returns
    /// what was removed. Nothing is written when nothing matches.
    pub fn remove_where(
        &self,
        owner: &str,
        mut pred: impl FnMut(&Draft) -> bool,
    ) -> Result<Vec<Draft>, DraftError> {
        let key = self.key(owner);
        let mut collection = self.load_for_update(&key)?;
        let (removed, kept): (Vec<Draft>, Vec<Draft>) =
            collection.drafts.into_iter().partition(|d| pred(d));
        collection.drafts = kept;

        if !removed.is_empty() {
            self.write(&key, &collection)?;
        }
        Ok(removed)
    }

    /// Removes drafts matching `pred` and appends `draft`, in one write.
    pub fn replace_where(
        &self,
        owner: &str,
        mut pred: impl FnMut(&Draft) -> bool,
        draft: &Draft,
    ) -> Result<(), DraftError> {
        let key = self.key(owner);
        let mut collection = self.load_for_update(&key)?;
        collection.drafts.retain(|d| !pred(d));
        collection.drafts.push(draft.clone());
        self.write(&key, &collection)
    }

    fn load(&self, key: &str) -> Result<Collection, StorageError> {
        let Some(raw) = self.storage.get(key)? else {
            return Ok(Collection::default());
        };

        let records: Vec<Value> = match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(%key, error = %e, "corrupt draft collection, treating as empty");
                return Ok(Collection {
                    damaged: Some(raw),
                    ..Collection::default()
                });
            }
        };

        let mut collection = Collection::default();
        for record in records {
            match serde_json::from_value::<Draft>(record.clone()) {
                Ok(draft) => collection.drafts.push(draft),
                Err(e) => {
                    tracing::warn!(%key, error = %e, "undecodable draft record skipped");
                    collection.unreadable.push(record);
                }
            }
        }
        Ok(collection)
    }

    /// Like [`load`](Self::load), but a collection that cannot be read is
    /// an error: writing over it would lose whatever it holds.
    fn load_for_update(&self, key: &str) -> Result<Collection, DraftError> {
        self.load(key).map_err(|e| {
            tracing::error!(%key, error = %e, "draft collection unreadable, update refused");
            DraftError::StoragePersistFailed(e)
        })
    }

    fn write(&self, key: &str, collection: &Collection) -> Result<(), DraftError> {
        let encode = |e: serde_json::Error| {
            DraftError::StoragePersistFailed(StorageError::Encode {
                key: key.to_owned(),
                message: e.to_string(),
            })
        };

        let mut records = collection
            .drafts
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<Value>, _>>()
            .map_err(encode)?;
        records.extend(collection.unreadable.iter().cloned());
        let json = serde_json::to_string(&records).map_err(encode)?;

        if let Some(raw) = &collection.damaged {
            let backup = format!("{key}.corrupt");
            self.storage.set(&backup, raw).map_err(|e| {
                tracing::error!(%key, error = %e, "corrupt draft collection could not be set aside");
                DraftError::StoragePersistFailed(e)
            })?;
            tracing::warn!(%key, %backup, "corrupt draft collection set aside");
        }

        self.storage.set(key, &json).map_err(|e| {
            tracing::error!(%key, error = %e, "draft collection not persisted");
            DraftError::StoragePersistFailed(e)
        })
    }
}
