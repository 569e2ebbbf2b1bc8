//! Where autosaved content ends up.

use scriba_drafts::{DraftError, PostGateway, ReconciliationEngine};
use scriba_protocol::DraftId;

/// The editable part of a draft.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftContent {
    pub title: String,
    pub body: String,
}

impl DraftContent {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Persists draft content. Synchronous: when `save_content` returns the
/// write has completed, which is what keeps autosaves strictly ordered.
pub trait DraftSink: Send + Sync + 'static {
    fn save_content(&self, id: DraftId, content: &DraftContent) -> Result<(), DraftError>;
}

impl<G: PostGateway> DraftSink for ReconciliationEngine<G> {
    fn save_content(&self, id: DraftId, content: &DraftContent) -> Result<(), DraftError> {
        self.save_draft_content(id, &content.title, &content.body)
            .map(|_| ())
    }
}
