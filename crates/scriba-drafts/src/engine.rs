//! The reconciliation engine: local drafts meet server-owned posts.
//!
//! The engine merges published posts with brand-new local drafts for
//! display, derives edit-drafts from published posts, turns drafts into
//! publish requests, and garbage-collects abandoned edit-drafts.
//!
//! # Identity
//!
//! Drafts are namespaced by the owner key of the user the session reports.
//! The engine remembers the last user it saw, so a session that expires
//! mid-edit still reads and writes the same user's drafts locally. Only
//! [`reset`](ReconciliationEngine::reset) (called on explicit logout)
//! forgets it. Remote operations always require a live session.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use scriba_protocol::{
    Clock, Draft, DraftId, DraftOrigin, Post, PostKey, PublishedPost, SessionAuthority,
    UserProfile,
};
use scriba_storage::KeyValueStore;

use crate::id::DraftIdGenerator;
use crate::{DraftConfig, DraftError, DraftStore, PostGateway};

/// Owns every post-related read and write the UI performs.
pub struct ReconciliationEngine<G> {
    gateway: G,
    store: DraftStore,
    session: Arc<dyn SessionAuthority>,
    clock: Arc<dyn Clock>,
    ids: DraftIdGenerator,
    config: DraftConfig,
    /// The user whose drafts were last read or written.
    bound_owner: Mutex<Option<UserProfile>>,
}

impl<G: PostGateway> ReconciliationEngine<G> {
    pub fn new(
        gateway: G,
        storage: Arc<dyn KeyValueStore>,
        session: Arc<dyn SessionAuthority>,
        clock: Arc<dyn Clock>,
        config: DraftConfig,
    ) -> Self {
        let config = config.validated();
        Self {
            gateway,
            store: DraftStore::new(storage, config.namespace.clone()),
            session,
            ids: DraftIdGenerator::new(clock.clone()),
            clock,
            config,
            bound_owner: Mutex::new(None),
        }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Published posts of the current user followed by their brand-new
    /// drafts.
    ///
    /// Edit-drafts are not listed: they shadow a published post that is
    /// already in the list. If the published posts cannot be fetched (or
    /// the session has expired) only the local drafts are returned.
    pub async fn list_posts(&self) -> Result<Vec<Post>, DraftError> {
        let owner = self.owner()?;
        let drafts = self
            .store
            .list_all(&owner.owner_key())
            .into_iter()
            .filter(|d| d.origin == DraftOrigin::New)
            .map(Post::Draft);

        let published = match self.session.current_user() {
            Some(user) => match self.gateway.list_published(&user).await {
                Ok(posts) => posts,
                Err(e) => {
                    tracing::warn!(%user, error = %e, "published posts unavailable, showing drafts only");
                    Vec::new()
                }
            },
            None => {
                tracing::debug!(%owner, "no live session, showing drafts only");
                Vec::new()
            }
        };

        Ok(published
            .into_iter()
            .map(Post::Published)
            .chain(drafts)
            .collect())
    }

    /// Every local draft of the current user, both origins.
    pub fn list_drafts(&self) -> Result<Vec<Draft>, DraftError> {
        let owner = self.owner()?;
        Ok(self.store.list_all(&owner.owner_key()))
    }

    pub fn get_draft(&self, id: DraftId) -> Result<Draft, DraftError> {
        let owner = self.owner()?;
        self.store
            .find(&owner.owner_key(), id)
            .ok_or(DraftError::DraftNotFound(id))
    }

    // -----------------------------------------------------------------------
    // Draft lifecycle
    // -----------------------------------------------------------------------

    /// Creates and persists an empty brand-new draft.
    pub fn create_draft(&self) -> Result<Draft, DraftError> {
        let owner = self.owner()?;
        let key = owner.owner_key();
        let draft = self.new_draft(&key, &owner, DraftOrigin::New);

        self.store.upsert(&key, &draft)?;
        tracing::info!(draft_id = %draft.id, %owner, "draft created");
        Ok(draft)
    }

    /// Returns the edit-draft for `post`, creating it on first use.
    ///
    /// Repeated calls for the same post return the same draft until it
    /// goes stale. A stale one is replaced, so there is never more than
    /// one edit-draft per published post.
    pub fn create_or_get_edit_draft(&self, post: &PublishedPost) -> Result<Draft, DraftError> {
        let owner = self.owner()?;
        let key = owner.owner_key();
        let now = self.clock.now_millis();

        let linked = |d: &Draft| d.is_edit() && d.linked_published_id == Some(post.id);

        if let Some(existing) = self
            .store
            .list_all(&key)
            .into_iter()
            .find(|d| linked(d) && !self.is_stale(d, now))
        {
            tracing::debug!(draft_id = %existing.id, post_id = %post.id, "reusing edit draft");
            return Ok(existing);
        }

        let mut draft = self.new_draft(&key, &owner, DraftOrigin::Edit);
        draft.title = post.title.clone();
        draft.body = post.body.clone();
        draft.linked_published_id = Some(post.id);

        self.store.replace_where(&key, linked, &draft)?;
        tracing::info!(draft_id = %draft.id, post_id = %post.id, "edit draft created");
        Ok(draft)
    }

    /// Stores new content for an existing draft and bumps its timestamp.
    pub fn save_draft_content(
        &self,
        id: DraftId,
        title: &str,
        body: &str,
    ) -> Result<Draft, DraftError> {
        let owner = self.owner()?;
        let key = owner.owner_key();

        let mut draft = self
            .store
            .find(&key, id)
            .ok_or(DraftError::DraftNotFound(id))?;
        draft.title = title.to_owned();
        draft.body = body.to_owned();
        draft.updated_at = self.clock.now_millis();

        self.store.upsert(&key, &draft)?;
        tracing::debug!(draft_id = %id, "draft saved");
        Ok(draft)
    }

    /// Sends a draft to the server and, once confirmed, drops it locally.
    ///
    /// An edit-draft updates its linked post; any other draft creates a
    /// new one. On failure the draft stays exactly as it was.
    pub async fn publish(&self, id: DraftId) -> Result<PublishedPost, DraftError> {
        let user = self.live_user()?;
        let key = user.owner_key();

        let draft = self
            .store
            .find(&key, id)
            .ok_or(DraftError::DraftNotFound(id))?;

        let mut fields = draft.to_fields();
        if fields.author_id.is_none() {
            fields.author_id = user.id;
        }

        let result = match draft.linked_published_id {
            Some(post_id) => self.gateway.update_post(post_id, &fields).await,
            None => self.gateway.create_post(&fields).await,
        };
        let post = result.map_err(|e| {
            tracing::warn!(draft_id = %id, error = %e, "publish failed, draft kept");
            DraftError::PublishFailed(e)
        })?;

        // The post exists remotely now. Failing here would invite a
        // retry that publishes it twice, so a leftover draft is only logged.
        if let Err(e) = self.store.delete(&key, id) {
            tracing::error!(draft_id = %id, error = %e, "published draft could not be removed");
        }

        tracing::info!(draft_id = %id, post_id = %post.id, "draft published");
        Ok(post)
    }

    /// Deletes a draft locally or a published post remotely.
    ///
    /// A draft key never touches the network, and a draft that is already
    /// gone is not an error. A published key issues exactly one remote
    /// delete; on success any edit-draft of that post is dropped too.
    pub async fn delete_post(&self, key: PostKey) -> Result<(), DraftError> {
        match key {
            PostKey::Draft(id) => {
                let owner = self.owner()?;
                let removed = self
                    .store
                    .remove_where(&owner.owner_key(), |d| d.id == id)?;
                if removed.is_empty() {
                    tracing::debug!(draft_id = %id, "delete of unknown draft ignored");
                } else {
                    tracing::info!(draft_id = %id, "draft deleted");
                }
                Ok(())
            }
            PostKey::Published(post_id) => {
                let user = self.live_user()?;

                self.gateway.delete_post(post_id).await.map_err(|e| {
                    tracing::warn!(%post_id, error = %e, "remote delete failed");
                    DraftError::RemoteDeleteFailed(e)
                })?;
                tracing::info!(%post_id, "published post deleted");

                let orphaned = self.store.remove_where(&user.owner_key(), |d| {
                    d.linked_published_id == Some(post_id)
                });
                match orphaned {
                    Ok(drafts) if !drafts.is_empty() => {
                        tracing::debug!(%post_id, count = drafts.len(), "edit drafts of deleted post removed");
                    }
                    Ok(_) => {}
                    Err(e) => tracing::warn!(%post_id, error = %e, "edit drafts of deleted post kept"),
                }
                Ok(())
            }
        }
    }

    /// Removes edit-drafts untouched for longer than `stale_edit_after`.
    /// Brand-new drafts are never removed here.
    ///
    /// Returns how many drafts were removed.
    pub fn cleanup_stale_edit_drafts(&self) -> Result<usize, DraftError> {
        let owner = self.owner()?;
        let now = self.clock.now_millis();

        let removed = self
            .store
            .remove_where(&owner.owner_key(), |d| d.is_edit() && self.is_stale(d, now))?;

        if !removed.is_empty() {
            tracing::info!(%owner, count = removed.len(), "stale edit drafts removed");
        }
        Ok(removed.len())
    }

    /// Forgets the remembered draft owner. Call on explicit logout so the
    /// next user cannot see the previous user's drafts.
    pub fn reset(&self) {
        if let Some(previous) = self.lock_owner().take() {
            tracing::debug!(owner = %previous, "draft owner released");
        }
    }

    pub fn config(&self) -> &DraftConfig {
        &self.config
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// The user whose drafts to use: the live session's user, or the one
    /// remembered from before it expired.
    fn owner(&self) -> Result<UserProfile, DraftError> {
        let mut owner = self.lock_owner();
        match self.session.current_user() {
            Some(user) => {
                let changed = owner
                    .as_ref()
                    .is_none_or(|o| o.owner_key() != user.owner_key());
                if changed {
                    tracing::debug!(%user, "draft owner bound");
                }
                *owner = Some(user.clone());
                Ok(user)
            }
            None => owner.clone().ok_or(DraftError::NoActiveSession),
        }
    }

    /// The live session's user. Remote calls cannot be made without one.
    fn live_user(&self) -> Result<UserProfile, DraftError> {
        self.session.current_user().ok_or(DraftError::NoActiveSession)
    }

    fn new_draft(&self, key: &str, owner: &UserProfile, origin: DraftOrigin) -> Draft {
        if let Some(max) = self.store.list_all(key).iter().map(|d| d.id).max() {
            self.ids.observe(max);
        }
        let now = self.clock.now_millis();
        Draft {
            id: self.ids.next(),
            title: String::new(),
            body: String::new(),
            author_id: owner.id,
            created_at: now,
            updated_at: now,
            origin,
            linked_published_id: None,
        }
    }

    fn is_stale(&self, draft: &Draft, now: u64) -> bool {
        u128::from(now.saturating_sub(draft.updated_at)) > self.config.stale_edit_after.as_millis()
    }

    fn lock_owner(&self) -> MutexGuard<'_, Option<UserProfile>> {
        self.bound_owner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
