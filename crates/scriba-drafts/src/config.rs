//! Draft configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for local draft handling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftConfig {
    /// Prefix of every draft collection key: `"<namespace>::<owner>"`.
    pub namespace: String,

    /// Edit-drafts untouched for longer than this are removed by
    /// `cleanup_stale_edit_drafts` and no longer reused when the same
    /// post is edited again. Brand-new drafts never go stale.
    pub stale_edit_after: Duration,
}

impl DraftConfig {
    /// Replaces unusable values with the defaults.
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();
        if self.namespace.is_empty() {
            tracing::warn!("draft namespace is empty, using default");
            self.namespace = defaults.namespace;
        }
        if self.stale_edit_after.is_zero() {
            tracing::warn!("stale_edit_after is zero, using default");
            self.stale_edit_after = defaults.stale_edit_after;
        }
        self
    }
}

impl Default for DraftConfig {
    fn default() -> Self {
        Self {
            namespace: "drafts/v2".to_string(),
            stale_edit_after: Duration::from_secs(7 * 24 * 60 * 60),
        }
    }
}
