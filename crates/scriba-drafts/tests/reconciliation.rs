//! Integration tests for the reconciliation engine using a recording
//! post gateway and an in-memory store.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use scriba_drafts::{DraftConfig, DraftError, PostGateway, ReconciliationEngine};
use scriba_protocol::{
    DraftId, DraftOrigin, GatewayError, ManualClock, Post, PostFields, PostId, PostKey,
    PublishedPost, SessionAuthority, UserId, UserProfile,
};
use scriba_storage::{KeyValueStore, MemoryStorage};

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

// =========================================================================
// Fakes
// =========================================================================

/// Records every call and serves posts from a vector.
struct FakePosts {
    published: Mutex<Vec<PublishedPost>>,
    next_id: AtomicI64,
    failure: Mutex<Option<GatewayError>>,
    calls: Mutex<Vec<String>>,
}

impl FakePosts {
    fn new() -> Self {
        Self {
            published: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(100),
            failure: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn fail_with(&self, error: GatewayError) {
        *self.failure.lock().unwrap() = Some(error);
    }

    fn recover(&self) {
        *self.failure.lock().unwrap() = None;
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> Result<(), GatewayError> {
        self.calls.lock().unwrap().push(call);
        match self.failure.lock().unwrap().clone() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn seed(&self, id: i64, title: &str) -> PublishedPost {
        let post = PublishedPost {
            id: PostId(id),
            title: title.into(),
            body: format!("body of {title}"),
            author_id: Some(UserId(7)),
            created_at: None,
        };
        self.published.lock().unwrap().push(post.clone());
        post
    }
}

impl PostGateway for FakePosts {
    async fn list_published(&self, author: &UserProfile) -> Result<Vec<PublishedPost>, GatewayError> {
        self.record(format!("list {}", author.handle))?;
        Ok(self.published.lock().unwrap().clone())
    }

    async fn create_post(&self, fields: &PostFields) -> Result<PublishedPost, GatewayError> {
        self.record("create".into())?;
        let post = PublishedPost {
            id: PostId(self.next_id.fetch_add(1, Ordering::SeqCst)),
            title: fields.title.clone(),
            body: fields.body.clone(),
            author_id: fields.author_id,
            created_at: None,
        };
        self.published.lock().unwrap().push(post.clone());
        Ok(post)
    }

    async fn update_post(&self, id: PostId, fields: &PostFields) -> Result<PublishedPost, GatewayError> {
        self.record(format!("update {id}"))?;
        let mut published = self.published.lock().unwrap();
        let post = published
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(GatewayError::NotFound)?;
        post.title = fields.title.clone();
        post.body = fields.body.clone();
        Ok(post.clone())
    }

    async fn delete_post(&self, id: PostId) -> Result<(), GatewayError> {
        self.record(format!("delete {id}"))?;
        self.published.lock().unwrap().retain(|p| p.id != id);
        Ok(())
    }
}

/// A session that is either logged in as someone or anonymous.
struct StubSession {
    user: Mutex<Option<UserProfile>>,
}

impl StubSession {
    fn as_user(id: i64, handle: &str) -> Arc<Self> {
        Arc::new(Self {
            user: Mutex::new(Some(profile(id, handle))),
        })
    }

    fn switch_to(&self, user: Option<UserProfile>) {
        *self.user.lock().unwrap() = user;
    }
}

impl SessionAuthority for StubSession {
    fn current_user(&self) -> Option<UserProfile> {
        self.user.lock().unwrap().clone()
    }

    fn bearer_token(&self) -> Option<String> {
        self.current_user().map(|_| "token".into())
    }

    fn revoke(&self) {
        self.switch_to(None);
    }
}

fn profile(id: i64, handle: &str) -> UserProfile {
    UserProfile {
        id: Some(UserId(id)),
        display_name: None,
        handle: handle.into(),
        avatar_url: None,
    }
}

// =========================================================================
// Fixture
// =========================================================================

struct Fixture {
    storage: Arc<MemoryStorage>,
    clock: Arc<ManualClock>,
    session: Arc<StubSession>,
    engine: ReconciliationEngine<FakePosts>,
}

fn fixture() -> Fixture {
    let storage = Arc::new(MemoryStorage::new());
    let clock = Arc::new(ManualClock::new(1_700_000_000_000));
    let session = StubSession::as_user(7, "ana");
    let engine = ReconciliationEngine::new(
        FakePosts::new(),
        storage.clone(),
        session.clone(),
        clock.clone(),
        DraftConfig::default(),
    );
    Fixture {
        storage,
        clock,
        session,
        engine,
    }
}

fn draft_ids(posts: &[Post]) -> Vec<DraftId> {
    posts
        .iter()
        .filter_map(|p| match p {
            Post::Draft(d) => Some(d.id),
            Post::Published(_) => None,
        })
        .collect()
}

// =========================================================================
// Tests: new draft → publish
// =========================================================================

#[tokio::test]
async fn test_create_save_publish_removes_draft_and_lists_post() {
    let fx = fixture();

    let d1 = fx.engine.create_draft().unwrap();
    assert_eq!(d1.title, "");
    assert_eq!(d1.body, "");
    assert_eq!(d1.origin, DraftOrigin::New);

    fx.engine.save_draft_content(d1.id, "Hello", "World").unwrap();
    let post = fx.engine.publish(d1.id).await.unwrap();

    assert_eq!(post.title, "Hello");
    assert_eq!(post.author_id, Some(UserId(7)));
    assert!(fx.engine.list_drafts().unwrap().is_empty());

    let listed = fx.engine.list_posts().await.unwrap();
    assert!(listed.contains(&Post::Published(post)));
    assert!(!draft_ids(&listed).contains(&d1.id));
}

#[tokio::test]
async fn test_create_draft_persists_immediately() {
    let fx = fixture();

    let draft = fx.engine.create_draft().unwrap();

    let raw = fx.storage.get("drafts/v2::7").unwrap().expect("collection written");
    assert!(raw.contains(&draft.id.0.to_string()));
}

#[tokio::test]
async fn test_publish_failure_keeps_draft_unchanged() {
    let fx = fixture();
    let draft = fx.engine.create_draft().unwrap();
    let saved = fx.engine.save_draft_content(draft.id, "Keep", "me").unwrap();
    fx.engine.gateway().fail_with(GatewayError::Transport("offline".into()));

    let result = fx.engine.publish(draft.id).await;

    assert!(matches!(result, Err(DraftError::PublishFailed(_))));
    assert_eq!(fx.engine.list_drafts().unwrap(), vec![saved]);

    // Retrying after recovery succeeds.
    fx.engine.gateway().recover();
    assert!(fx.engine.publish(draft.id).await.is_ok());
}

#[tokio::test]
async fn test_publish_unknown_draft_fails_without_remote_call() {
    let fx = fixture();

    let result = fx.engine.publish(DraftId(42)).await;

    assert!(matches!(result, Err(DraftError::DraftNotFound(DraftId(42)))));
    assert!(fx.engine.gateway().calls().is_empty());
}

#[tokio::test]
async fn test_publish_while_anonymous_fails_without_remote_call() {
    let fx = fixture();
    let draft = fx.engine.create_draft().unwrap();
    fx.session.switch_to(None);

    let result = fx.engine.publish(draft.id).await;

    assert!(matches!(result, Err(DraftError::NoActiveSession)));
    assert!(fx.engine.gateway().calls().is_empty());
    assert_eq!(fx.engine.list_drafts().unwrap().len(), 1);
}

#[test]
fn test_save_draft_content_unknown_id_is_not_found() {
    let fx = fixture();

    let result = fx.engine.save_draft_content(DraftId(1), "t", "b");

    assert!(matches!(result, Err(DraftError::DraftNotFound(DraftId(1)))));
}

#[test]
fn test_save_draft_content_bumps_timestamp() {
    let fx = fixture();
    let draft = fx.engine.create_draft().unwrap();

    fx.clock.advance(Duration::from_secs(5));
    let saved = fx.engine.save_draft_content(draft.id, "t", "b").unwrap();

    assert_eq!(saved.updated_at, draft.updated_at + 5_000);
    assert_eq!(saved.created_at, draft.created_at);
    assert_eq!(fx.engine.get_draft(draft.id).unwrap(), saved);
}

#[test]
fn test_draft_write_failure_surfaces() {
    let storage = Arc::new(MemoryStorage::with_quota(8));
    let engine = ReconciliationEngine::new(
        FakePosts::new(),
        storage,
        StubSession::as_user(7, "ana"),
        Arc::new(ManualClock::new(0)),
        DraftConfig::default(),
    );

    assert!(matches!(
        engine.create_draft(),
        Err(DraftError::StoragePersistFailed(_))
    ));
}

// =========================================================================
// Tests: edit drafts
// =========================================================================

#[tokio::test]
async fn test_edit_draft_is_idempotent_until_stale() {
    let fx = fixture();
    let p1 = fx.engine.gateway().seed(3, "First");

    let e1 = fx.engine.create_or_get_edit_draft(&p1).unwrap();
    let again = fx.engine.create_or_get_edit_draft(&p1).unwrap();
    assert_eq!(e1.id, again.id);
    assert_eq!(e1.title, "First");
    assert_eq!(e1.linked_published_id, Some(PostId(3)));

    fx.clock.advance(8 * DAY);
    assert_eq!(fx.engine.cleanup_stale_edit_drafts().unwrap(), 1);

    let e2 = fx.engine.create_or_get_edit_draft(&p1).unwrap();
    assert_ne!(e2.id, e1.id);
}

#[test]
fn test_stale_edit_draft_is_replaced_not_duplicated() {
    let fx = fixture();
    let post = fx.engine.gateway().seed(3, "First");
    let e1 = fx.engine.create_or_get_edit_draft(&post).unwrap();

    fx.clock.advance(8 * DAY);
    let e2 = fx.engine.create_or_get_edit_draft(&post).unwrap();

    let linked: Vec<_> = fx
        .engine
        .list_drafts()
        .unwrap()
        .into_iter()
        .filter(|d| d.linked_published_id == Some(PostId(3)))
        .collect();
    assert_eq!(linked.len(), 1);
    assert_eq!(linked[0].id, e2.id);
    assert_ne!(e1.id, e2.id);
}

#[test]
fn test_recent_activity_keeps_edit_draft_fresh() {
    let fx = fixture();
    let post = fx.engine.gateway().seed(3, "First");
    let e1 = fx.engine.create_or_get_edit_draft(&post).unwrap();

    fx.clock.advance(6 * DAY);
    fx.engine.save_draft_content(e1.id, "First v2", "more").unwrap();
    fx.clock.advance(6 * DAY);

    assert_eq!(fx.engine.cleanup_stale_edit_drafts().unwrap(), 0);
    assert_eq!(fx.engine.create_or_get_edit_draft(&post).unwrap().id, e1.id);
}

#[test]
fn test_cleanup_never_removes_new_drafts() {
    let fx = fixture();
    let draft = fx.engine.create_draft().unwrap();

    fx.clock.advance(365 * DAY);

    assert_eq!(fx.engine.cleanup_stale_edit_drafts().unwrap(), 0);
    assert_eq!(fx.engine.get_draft(draft.id).unwrap().id, draft.id);
}

#[tokio::test]
async fn test_publish_edit_draft_updates_linked_post() {
    let fx = fixture();
    let post = fx.engine.gateway().seed(3, "First");
    let edit = fx.engine.create_or_get_edit_draft(&post).unwrap();
    fx.engine.save_draft_content(edit.id, "First, revised", "new body").unwrap();

    let updated = fx.engine.publish(edit.id).await.unwrap();

    assert_eq!(updated.id, PostId(3));
    assert_eq!(updated.title, "First, revised");
    assert_eq!(fx.engine.gateway().calls(), vec!["update 3".to_string()]);
    assert!(fx.engine.list_drafts().unwrap().is_empty());
}

// =========================================================================
// Tests: listing
// =========================================================================

#[tokio::test]
async fn test_list_posts_merges_published_and_new_drafts_only() {
    let fx = fixture();
    let post = fx.engine.gateway().seed(3, "First");
    let fresh = fx.engine.create_draft().unwrap();
    fx.engine.create_or_get_edit_draft(&post).unwrap();

    let listed = fx.engine.list_posts().await.unwrap();

    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0], Post::Published(post));
    assert_eq!(draft_ids(&listed), vec![fresh.id]);
    assert!(listed[1].is_draft());
}

#[tokio::test]
async fn test_list_posts_remote_failure_degrades_to_drafts() {
    let fx = fixture();
    fx.engine.gateway().seed(3, "First");
    let draft = fx.engine.create_draft().unwrap();
    fx.engine.gateway().fail_with(GatewayError::Rejected {
        status: 500,
        message: "boom".into(),
    });

    let listed = fx.engine.list_posts().await.unwrap();

    assert_eq!(listed, vec![Post::Draft(draft)]);
}

#[tokio::test]
async fn test_list_posts_after_session_expiry_shows_local_drafts_only() {
    let fx = fixture();
    fx.engine.gateway().seed(3, "First");
    let draft = fx.engine.create_draft().unwrap();
    assert_eq!(fx.engine.list_posts().await.unwrap().len(), 2);

    fx.session.switch_to(None);
    let calls_before = fx.engine.gateway().calls().len();
    let listed = fx.engine.list_posts().await.unwrap();

    assert_eq!(listed, vec![Post::Draft(draft)]);
    assert_eq!(fx.engine.gateway().calls().len(), calls_before);
}

#[tokio::test]
async fn test_list_posts_without_any_user_fails() {
    let fx = fixture();
    fx.session.switch_to(None);

    assert!(matches!(
        fx.engine.list_posts().await,
        Err(DraftError::NoActiveSession)
    ));
}

#[test]
fn test_reset_forgets_previous_owner() {
    let fx = fixture();
    fx.engine.create_draft().unwrap();
    fx.session.switch_to(None);
    assert_eq!(fx.engine.list_drafts().unwrap().len(), 1);

    fx.engine.reset();

    assert!(matches!(
        fx.engine.list_drafts(),
        Err(DraftError::NoActiveSession)
    ));
}

#[test]
fn test_drafts_do_not_leak_across_users() {
    let fx = fixture();
    fx.engine.create_draft().unwrap();

    fx.session.switch_to(Some(profile(8, "bruno")));

    assert!(fx.engine.list_drafts().unwrap().is_empty());
    assert!(fx.storage.get("drafts/v2::8").unwrap().is_none());
}

// =========================================================================
// Tests: deletion
// =========================================================================

#[tokio::test]
async fn test_delete_draft_never_calls_remote() {
    let fx = fixture();
    let draft = fx.engine.create_draft().unwrap();

    fx.engine.delete_post(PostKey::Draft(draft.id)).await.unwrap();

    assert!(fx.engine.gateway().calls().is_empty());
    assert!(fx.engine.list_drafts().unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_unknown_draft_is_noop() {
    let fx = fixture();

    fx.engine.delete_post(PostKey::Draft(DraftId(5))).await.unwrap();

    assert!(fx.engine.gateway().calls().is_empty());
}

#[tokio::test]
async fn test_delete_published_issues_exactly_one_remote_call() {
    let fx = fixture();
    let post = fx.engine.gateway().seed(3, "First");
    fx.engine.create_or_get_edit_draft(&post).unwrap();
    let unrelated = fx.engine.create_draft().unwrap();

    fx.engine.delete_post(PostKey::Published(post.id)).await.unwrap();

    assert_eq!(fx.engine.gateway().calls(), vec!["delete 3".to_string()]);
    // The edit draft of the deleted post goes with it.
    let remaining: Vec<_> = fx.engine.list_drafts().unwrap().into_iter().map(|d| d.id).collect();
    assert_eq!(remaining, vec![unrelated.id]);
}

#[tokio::test]
async fn test_delete_published_failure_changes_nothing() {
    let fx = fixture();
    let post = fx.engine.gateway().seed(3, "First");
    let edit = fx.engine.create_or_get_edit_draft(&post).unwrap();
    fx.engine.gateway().fail_with(GatewayError::Forbidden);

    let result = fx.engine.delete_post(PostKey::Published(post.id)).await;

    assert!(matches!(
        result,
        Err(DraftError::RemoteDeleteFailed(GatewayError::Forbidden))
    ));
    assert_eq!(fx.engine.get_draft(edit.id).unwrap(), edit);
}

#[tokio::test]
async fn test_parsed_keys_route_to_the_right_store() {
    let fx = fixture();
    let draft = fx.engine.create_draft().unwrap();
    fx.engine.gateway().seed(3, "First");

    let draft_key: PostKey = draft.id.to_string().parse().unwrap();
    let post_key: PostKey = "3".parse().unwrap();
    fx.engine.delete_post(draft_key).await.unwrap();
    fx.engine.delete_post(post_key).await.unwrap();

    assert_eq!(fx.engine.gateway().calls(), vec!["delete 3".to_string()]);
    assert!(fx.engine.list_drafts().unwrap().is_empty());
}
