//! Shared vocabulary for Scriba.
//!
//! This crate defines the types every other layer speaks:
//!
//! - **Types** ([`UserProfile`], [`PublishedPost`], [`Draft`], [`PostKey`], etc.):
//!   the domain records that move between the session, the draft store
//!   and the remote blog API.
//! - **Token codec** ([`token::decode`], [`token::is_expired`]): structural
//!   and expiry validation of the signed access token.
//! - **Clock** ([`Clock`], [`SystemClock`]): the time source every expiry
//!   and staleness rule is evaluated against.
//! - **Errors** ([`TokenError`], [`GatewayError`]): what can go wrong while
//!   decoding a token or talking to the remote gateway.
//!
//! # Architecture
//!
//! ```text
//! Session (identity, token) ─┐
//!                            ├─→ Protocol (types, codec, clock)
//! Drafts (reconciliation) ───┘
//! ```

mod authority;
mod clock;
mod error;
pub mod token;
mod types;

pub use authority::SessionAuthority;
#[cfg(any(test, feature = "testing"))]
pub use clock::ManualClock;
pub use clock::{Clock, SystemClock};
pub use error::{GatewayError, TokenError};
pub use token::TokenClaims;
pub use types::{
    Credentials, Draft, DraftId, DraftOrigin, Post, PostFields, PostId,
    PostKey, PublishedPost, Registration, UserId, UserProfile,
};

/// Helpers for building fixtures in downstream test suites.
#[cfg(any(test, feature = "testing"))]
pub mod testing {
    pub use crate::token::mint_unsigned as mint_token;
}
