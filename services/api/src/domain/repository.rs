#![allow(async_fn_in_trait)]

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use hapa_domain::id::{PostId, UserId, VenueId};

use crate::domain::types::{
    DelegatedIdentity, OtpCode, Post, PostMetrics, User, Venue, VenueSearch,
};
use crate::error::ApiError;

/// Repository for application users.
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, ApiError>;

    /// First user with this (normalized) phone number. Uniqueness is not enforced.
    async fn find_by_phone(&self, phone_number: &str) -> Result<Option<User>, ApiError>;

    /// Insert a user unless one with the same id already exists, and return
    /// the stored row either way. Concurrent first logins for one subject
    /// therefore converge on a single user.
    async fn create(&self, user: &User) -> Result<User, ApiError>;

    async fn touch_last_login(&self, id: &UserId, at: DateTime<Utc>) -> Result<(), ApiError>;
}

/// Repository for one-time codes.
pub trait OtpCodeRepository: Send + Sync {
    async fn create(&self, code: &OtpCode) -> Result<(), ApiError>;

    /// Most recently created row matching the exact (phone, code) pair, expired or not.
    async fn find_latest(
        &self,
        phone_number: &str,
        code: &str,
    ) -> Result<Option<OtpCode>, ApiError>;

    /// Atomically increment the attempts counter; returns the new value.
    async fn record_attempt(&self, id: Uuid) -> Result<i32, ApiError>;
}

/// Repository for venue profiles.
pub trait VenueRepository: Send + Sync {
    async fn create(&self, venue: &Venue) -> Result<Venue, ApiError>;

    async fn find_by_id(&self, id: VenueId) -> Result<Option<Venue>, ApiError>;

    async fn find_by_owner(&self, owner_id: &UserId) -> Result<Option<Venue>, ApiError>;

    async fn update(&self, venue: &Venue) -> Result<Venue, ApiError>;

    /// Invoke the server-side `track_venue_view` procedure.
    async fn track_view(&self, id: VenueId, viewer: Option<&UserId>) -> Result<(), ApiError>;

    /// Every venue, oldest first.
    async fn list_all(&self) -> Result<Vec<Venue>, ApiError>;

    /// Venues matching all given filters, at most `limit`.
    async fn search(&self, filter: &VenueSearch, limit: u64) -> Result<Vec<Venue>, ApiError>;
}

/// Repository for venue posts and their likes.
pub trait PostRepository: Send + Sync {
    async fn create(&self, post: &Post) -> Result<Post, ApiError>;

    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, ApiError>;

    /// Posts of the given venues with `expires_at > now`, newest first.
    async fn list_live(
        &self,
        venue_ids: &[VenueId],
        now: DateTime<Utc>,
        limit: Option<u64>,
    ) -> Result<Vec<Post>, ApiError>;

    /// Every post of a venue, expired ones included.
    async fn list_for_venue(&self, venue_id: VenueId) -> Result<Vec<Post>, ApiError>;

    /// Subset of `post_ids` that `user_id` has liked.
    async fn liked_by(
        &self,
        user_id: &UserId,
        post_ids: &[PostId],
    ) -> Result<HashSet<PostId>, ApiError>;

    async fn delete(&self, id: PostId) -> Result<(), ApiError>;

    /// Invoke the `toggle_post_like` procedure. `None` when the post does not exist.
    async fn toggle_like(
        &self,
        id: PostId,
        user_id: &UserId,
    ) -> Result<Option<PostMetrics>, ApiError>;

    /// Invoke the `track_post_view` procedure.
    async fn track_view(&self, id: PostId, viewer: Option<&UserId>) -> Result<(), ApiError>;
}

/// Out-of-band delivery of one-time codes. Never fails from the caller's view.
pub trait OtpSender: Send + Sync {
    async fn send(&self, phone_number: &str, code: &str);

    /// Whether the issued code may be echoed back to the client (development channel).
    fn reveals_code(&self) -> bool;
}

/// External identity authority that vouches for delegated bearer tokens.
pub trait IdentityAuthority: Send + Sync {
    /// Resolve a bearer token to its subject. Any failure is `ApiError::InvalidToken`.
    async fn verify(&self, bearer_token: &str) -> Result<DelegatedIdentity, ApiError>;
}
