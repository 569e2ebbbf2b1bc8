//! Response bodies of the blog API and their mapping to domain types.
//!
//! Request bodies need no wire types: [`Credentials`](scriba_protocol::Credentials),
//! [`Registration`](scriba_protocol::Registration) and
//! [`PostFields`](scriba_protocol::PostFields) already serialize to the
//! field names the server expects.

use chrono::NaiveDateTime;
use scriba_protocol::{PostId, PublishedPost, UserProfile};
use serde::Deserialize;

/// Body of a successful login or registration.
#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    /// Informational only; the token's own `exp` claim is authoritative.
    #[serde(default)]
    pub expiration: Option<serde_json::Value>,
}

/// A post as the server returns it.
#[derive(Debug, Deserialize)]
pub struct PostResponse {
    pub id: i64,
    pub titulo: String,
    #[serde(default)]
    pub texto: String,
    #[serde(default)]
    pub data: Option<NaiveDateTime>,
    #[serde(default)]
    pub usuario: Option<UserProfile>,
    #[serde(default)]
    pub tema: Option<ThemeResponse>,
}

impl PostResponse {
    /// Whether `author` wrote this post.
    ///
    /// Matches on the numeric id when the profile has one, otherwise on
    /// the exact handle. A post without author data belongs to nobody.
    pub fn written_by(&self, author: &UserProfile) -> bool {
        let Some(writer) = &self.usuario else {
            return false;
        };
        match author.id {
            Some(id) => writer.id == Some(id),
            None => writer.handle == author.handle,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ThemeResponse {
    pub id: i64,
    #[serde(default)]
    pub descricao: Option<String>,
}

impl From<PostResponse> for PublishedPost {
    fn from(post: PostResponse) -> Self {
        Self {
            id: PostId(post.id),
            title: post.titulo,
            body: post.texto,
            author_id: post.usuario.and_then(|u| u.id),
            created_at: post.data,
        }
    }
}

/// Error body the API sends with 4xx/5xx responses.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub message: Option<String>,
}

/// Best human-readable message for a failed response body.
pub fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|e| e.message)
        .unwrap_or_else(|| body.chars().take(200).collect())
}
