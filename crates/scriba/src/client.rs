//! `BlogClient` builder and the wired-up client.
//!
//! This is the entry point for embedding Scriba. It ties together all
//! the layers: storage → session → drafts → autosave, with the remote
//! gateways plugged in at the session and draft seams.

use std::sync::Arc;

use scriba_autosave::{AutosaveConfig, AutosaveHandle};
use scriba_drafts::{DraftConfig, PostGateway, ReconciliationEngine};
use scriba_protocol::{
    Clock, Credentials, Draft, DraftId, Post, PostKey, PublishedPost, Registration,
    SessionAuthority, SystemClock, UserProfile,
};
use scriba_session::{AuthGateway, ExpiryWatch, RequestAuthorizer, SessionConfig, SessionManager};
use scriba_storage::{KeyValueStore, MemoryStorage};

use crate::ScribaError;

/// Builder for configuring a [`BlogClient`].
///
/// # Example
///
/// ```rust,ignore
/// use scriba::prelude::*;
///
/// let client = BlogClientBuilder::new()
///     .http_config(HttpConfig::default().with_base_url("https://blog.example"))
///     .draft_storage(Arc::new(FileStorage::open("./data")?))
///     .build_http()?;
/// client.login(&Credentials::new("ana", "secret")).await?;
/// ```
pub struct BlogClientBuilder {
    session_config: SessionConfig,
    draft_config: DraftConfig,
    autosave_config: AutosaveConfig,
    #[cfg(feature = "http")]
    http_config: scriba_http::HttpConfig,
    session_storage: Option<Arc<dyn KeyValueStore>>,
    draft_storage: Option<Arc<dyn KeyValueStore>>,
    clock: Option<Arc<dyn Clock>>,
}

impl BlogClientBuilder {
    /// Creates a new builder with default settings and in-memory storage.
    pub fn new() -> Self {
        Self {
            session_config: SessionConfig::default(),
            draft_config: DraftConfig::default(),
            autosave_config: AutosaveConfig::default(),
            #[cfg(feature = "http")]
            http_config: scriba_http::HttpConfig::default(),
            session_storage: None,
            draft_storage: None,
            clock: None,
        }
    }

    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    pub fn draft_config(mut self, config: DraftConfig) -> Self {
        self.draft_config = config;
        self
    }

    pub fn autosave_config(mut self, config: AutosaveConfig) -> Self {
        self.autosave_config = config;
        self
    }

    #[cfg(feature = "http")]
    pub fn http_config(mut self, config: scriba_http::HttpConfig) -> Self {
        self.http_config = config;
        self
    }

    /// Where the session is persisted (the browser's session storage).
    pub fn session_storage(mut self, storage: Arc<dyn KeyValueStore>) -> Self {
        self.session_storage = Some(storage);
        self
    }

    /// Where drafts are persisted (the browser's local storage).
    pub fn draft_storage(mut self, storage: Arc<dyn KeyValueStore>) -> Self {
        self.draft_storage = Some(storage);
        self
    }

    /// Uses `storage` for both the session and the drafts. Keys never
    /// collide: each layer namespaces its own.
    pub fn storage(self, storage: Arc<dyn KeyValueStore>) -> Self {
        self.session_storage(storage.clone()).draft_storage(storage)
    }

    /// Time source for every expiry and staleness rule.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Builds a client around caller-supplied gateways.
    ///
    /// Restores a persisted session, if any, before returning, and binds
    /// its user's drafts so they stay readable after the token expires.
    pub fn build<A: AuthGateway, G: PostGateway>(self, auth: A, posts: G) -> BlogClient<A, G> {
        self.assemble(auth, |_| posts)
    }

    /// Builds a client talking to the blog REST API over HTTP.
    ///
    /// The post gateway authorizes its requests through the session, so
    /// a 401 from any post endpoint ends the session.
    #[cfg(feature = "http")]
    pub fn build_http(
        self,
    ) -> Result<BlogClient<scriba_http::HttpAuthGateway, scriba_http::HttpPostGateway>, ScribaError>
    {
        let api = scriba_http::ApiClient::new(self.http_config.clone())?;
        tracing::debug!(base_url = %api.base_url(), "http gateways configured");

        let auth = scriba_http::HttpAuthGateway::new(api.clone());
        Ok(self.assemble(auth, |authorizer| {
            scriba_http::HttpPostGateway::new(api, authorizer)
        }))
    }

    fn assemble<A: AuthGateway, G: PostGateway>(
        self,
        auth: A,
        posts: impl FnOnce(RequestAuthorizer) -> G,
    ) -> BlogClient<A, G> {
        let clock: Arc<dyn Clock> = match self.clock {
            Some(clock) => clock,
            None => Arc::new(SystemClock),
        };
        let session_storage = self.session_storage.unwrap_or_else(in_memory);
        let draft_storage = self.draft_storage.unwrap_or_else(in_memory);

        let session = Arc::new(SessionManager::new(
            auth,
            session_storage,
            clock.clone(),
            self.session_config,
        ));
        let authority: Arc<dyn SessionAuthority> = session.clone();
        let authorizer = RequestAuthorizer::new(authority.clone());

        let engine = Arc::new(ReconciliationEngine::new(
            posts(authorizer.clone()),
            draft_storage,
            authority,
            clock,
            self.draft_config,
        ));

        let restored = session.is_authenticated();
        let client = BlogClient {
            session,
            engine,
            authorizer,
            autosave_config: self.autosave_config,
        };
        // A restored session gets the same draft housekeeping as a login,
        // which also binds the draft owner before the token can expire.
        if restored {
            client.tidy_drafts();
        }

        tracing::info!(authenticated = restored, "blog client ready");
        client
    }
}

fn in_memory() -> Arc<dyn KeyValueStore> {
    Arc::new(MemoryStorage::new())
}

impl Default for BlogClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The session manager and reconciliation engine, wired together.
///
/// Most calls delegate to one of the two; the client adds the
/// cross-layer rules (logout also releases the draft owner, login tidies
/// up stale edit-drafts, editors get an autosave task).
pub struct BlogClient<A: AuthGateway, G: PostGateway> {
    session: Arc<SessionManager<A>>,
    engine: Arc<ReconciliationEngine<G>>,
    authorizer: RequestAuthorizer,
    autosave_config: AutosaveConfig,
}

impl<A: AuthGateway, G: PostGateway> BlogClient<A, G> {
    pub fn session(&self) -> &Arc<SessionManager<A>> {
        &self.session
    }

    pub fn drafts(&self) -> &Arc<ReconciliationEngine<G>> {
        &self.engine
    }

    pub fn authorizer(&self) -> &RequestAuthorizer {
        &self.authorizer
    }

    // ---- session ----

    /// Logs in and removes edit-drafts the user abandoned.
    pub async fn login(&self, credentials: &Credentials) -> Result<UserProfile, ScribaError> {
        let user = self.session.login(credentials).await?;
        self.tidy_drafts();
        Ok(user)
    }

    pub async fn register(&self, registration: &Registration) -> Result<UserProfile, ScribaError> {
        let user = self.session.register(registration).await?;
        self.tidy_drafts();
        Ok(user)
    }

    /// Ends the session and forgets whose drafts were open.
    pub fn logout(&self) {
        self.session.logout();
        self.engine.reset();
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        self.session.current_user()
    }

    /// Starts the periodic expiry check. Keep the returned guard alive for
    /// as long as the check should run.
    pub fn watch_expiry(&self) -> ExpiryWatch {
        self.session.spawn_expiry_watch()
    }

    // ---- posts and drafts ----

    pub async fn list_posts(&self) -> Result<Vec<Post>, ScribaError> {
        Ok(self.engine.list_posts().await?)
    }

    pub fn create_draft(&self) -> Result<Draft, ScribaError> {
        Ok(self.engine.create_draft()?)
    }

    pub fn edit_published(&self, post: &PublishedPost) -> Result<Draft, ScribaError> {
        Ok(self.engine.create_or_get_edit_draft(post)?)
    }

    pub async fn publish(&self, id: DraftId) -> Result<PublishedPost, ScribaError> {
        Ok(self.engine.publish(id).await?)
    }

    pub async fn delete_post(&self, key: PostKey) -> Result<(), ScribaError> {
        Ok(self.engine.delete_post(key).await?)
    }

    /// Opens an editor on draft `id`: starts its autosave task.
    ///
    /// Must be called from within a Tokio runtime. Flush the handle
    /// before dropping it to keep the last edit.
    pub fn open_editor(&self, id: DraftId) -> Result<AutosaveHandle, ScribaError> {
        let draft = self.engine.get_draft(id)?;
        Ok(AutosaveHandle::spawn(
            self.engine.clone(),
            &draft,
            self.autosave_config.clone(),
        ))
    }

    fn tidy_drafts(&self) {
        if let Err(e) = self.engine.cleanup_stale_edit_drafts() {
            tracing::warn!(error = %e, "stale edit draft cleanup failed");
        }
    }
}
