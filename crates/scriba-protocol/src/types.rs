//! Core domain types.
//!
//! Field names are English in Rust; the `serde` renames keep the JSON
//! shape the blog API and previously persisted drafts use (`titulo`,
//! `texto`, `usuarioId`, ...).

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Server-assigned user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Server-assigned identifier of a published post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(pub i64);

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Locally generated identifier of a draft.
///
/// A distinct type from [`PostId`]: the two id spaces can never be
/// confused at compile time, and [`PostKey`] keeps them apart on the way
/// in from strings (`"draft-<n>"` vs `"<n>"`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct DraftId(pub u64);

impl DraftId {
    /// Prefix used in the textual form.
    pub const PREFIX: &'static str = "draft-";
}

impl fmt::Display for DraftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Self::PREFIX, self.0)
    }
}

/// Identifies any entry of the merged post list: either a published post
/// or a local draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostKey {
    Published(PostId),
    Draft(DraftId),
}

impl fmt::Display for PostKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Published(id) => id.fmt(f),
            Self::Draft(id) => id.fmt(f),
        }
    }
}

impl FromStr for PostKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(rest) = s.strip_prefix(DraftId::PREFIX) {
            return rest
                .parse::<u64>()
                .map(|n| Self::Draft(DraftId(n)))
                .map_err(|e| format!("invalid draft id {s:?}: {e}"));
        }
        s.parse::<i64>()
            .map(|n| Self::Published(PostId(n)))
            .map_err(|e| format!("invalid post id {s:?}: {e}"))
    }
}

// ---------------------------------------------------------------------------
// Users and credentials
// ---------------------------------------------------------------------------

/// The authenticated user's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Absent only for the placeholder profile used when the profile
    /// fetch failed during login.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
    #[serde(rename = "nome", default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(rename = "usuario")]
    pub handle: String,
    #[serde(rename = "foto", default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl UserProfile {
    /// The minimal profile used when only the handle is known.
    pub fn placeholder(handle: impl Into<String>) -> Self {
        Self {
            id: None,
            display_name: None,
            handle: handle.into(),
            avatar_url: None,
        }
    }

    /// Returns `true` for a profile built by [`placeholder`](Self::placeholder).
    pub fn is_placeholder(&self) -> bool {
        self.id.is_none()
    }

    /// The key under which this user's local data is namespaced.
    ///
    /// The numeric id when known; otherwise `@handle`. Handles may be all
    /// digits, so the `@` keeps the two forms from colliding.
    pub fn owner_key(&self) -> String {
        match self.id {
            Some(id) => id.to_string(),
            None => format!("@{}", self.handle),
        }
    }
}

impl fmt::Display for UserProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.handle)
    }
}

/// Login credentials.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(rename = "usuario")]
    pub handle: String,
    #[serde(rename = "senha")]
    pub password: String,
}

impl Credentials {
    pub fn new(handle: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            password: password.into(),
        }
    }
}

// Hand-written so passwords never end up in logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("handle", &self.handle)
            .field("password", &"***")
            .finish()
    }
}

/// Fields for creating a new account.
#[derive(Clone, Serialize, Deserialize)]
pub struct Registration {
    #[serde(rename = "nome")]
    pub display_name: String,
    #[serde(rename = "usuario")]
    pub handle: String,
    #[serde(rename = "senha")]
    pub password: String,
    #[serde(rename = "foto", default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("display_name", &self.display_name)
            .field("handle", &self.handle)
            .field("password", &"***")
            .field("avatar_url", &self.avatar_url)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Posts
// ---------------------------------------------------------------------------

/// The content sent to the server when creating or updating a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostFields {
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "texto")]
    pub body: String,
    #[serde(rename = "usuarioId", default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<UserId>,
    #[serde(rename = "temaId", default, skip_serializing_if = "Option::is_none")]
    pub theme_id: Option<i64>,
}

/// A post whose canonical copy lives on the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedPost {
    pub id: PostId,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "texto")]
    pub body: String,
    #[serde(rename = "usuarioId", default)]
    pub author_id: Option<UserId>,
    #[serde(rename = "dataCriacao", default)]
    pub created_at: Option<NaiveDateTime>,
}

/// Where a draft came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftOrigin {
    /// A brand-new post that has never been published.
    New,
    /// An in-progress edit of an existing published post.
    Edit,
}

/// A post that exists only in local storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub id: DraftId,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "texto")]
    pub body: String,
    #[serde(rename = "usuarioId", default)]
    pub author_id: Option<UserId>,
    /// Epoch milliseconds.
    #[serde(rename = "dataCriacao")]
    pub created_at: u64,
    /// Epoch milliseconds of the last content change.
    #[serde(rename = "ultimaEdicao")]
    pub updated_at: u64,
    pub origin: DraftOrigin,
    /// Set only for [`DraftOrigin::Edit`] drafts.
    #[serde(
        rename = "linkedPublishedId",
        alias = "publishedId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub linked_published_id: Option<PostId>,
}

impl Draft {
    /// Returns `true` for an edit-draft.
    pub fn is_edit(&self) -> bool {
        self.origin == DraftOrigin::Edit
    }

    /// The content to send when publishing.
    pub fn to_fields(&self) -> PostFields {
        PostFields {
            title: self.title.clone(),
            body: self.body.clone(),
            author_id: self.author_id,
            theme_id: None,
        }
    }
}

/// One entry of the merged list shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Post {
    Published(PublishedPost),
    Draft(Draft),
}

impl Post {
    pub fn key(&self) -> PostKey {
        match self {
            Self::Published(p) => PostKey::Published(p.id),
            Self::Draft(d) => PostKey::Draft(d.id),
        }
    }

    pub fn is_draft(&self) -> bool {
        matches!(self, Self::Draft(_))
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Published(p) => &p.title,
            Self::Draft(d) => &d.title,
        }
    }

    pub fn body(&self) -> &str {
        match self {
            Self::Published(p) => &p.body,
            Self::Draft(d) => &d.body,
        }
    }
}
