use chrono::{Duration, Utc};
use tracing::{info, warn};

use hapa_domain::id::{PostId, UserId, VenueId};

use crate::domain::repository::{PostRepository, VenueRepository};
use crate::domain::types::{MediaType, Post, PostMetrics, Venue};
use crate::error::ApiError;

/// A post as seen by one caller. `is_liked` is always false for anonymous callers.
#[derive(Debug, Clone)]
pub struct PostView {
    pub post: Post,
    pub is_liked: bool,
}

impl PostView {
    pub fn unliked(post: Post) -> Self {
        Self {
            post,
            is_liked: false,
        }
    }
}

// ── CreatePost ───────────────────────────────────────────────────────────────

pub struct CreatePostInput {
    pub owner_id: UserId,
    pub media_type: Option<String>,
    pub media_url: Option<String>,
    pub caption: Option<String>,
}

/// Publish a story on the caller's own venue.
pub struct CreatePostUseCase<V: VenueRepository, P: PostRepository> {
    pub venues: V,
    pub posts: P,
    pub ttl: Duration,
}

impl<V: VenueRepository, P: PostRepository> CreatePostUseCase<V, P> {
    pub async fn execute(&self, input: CreatePostInput) -> Result<Post, ApiError> {
        let media_type = input
            .media_type
            .as_deref()
            .and_then(|m| m.parse::<MediaType>().ok());
        let media_url = input.media_url.filter(|u| !u.trim().is_empty());
        let (Some(media_type), Some(media_url)) = (media_type, media_url) else {
            return Err(ApiError::validation(
                "media_type ('image' or 'video') and media_url are required",
            ));
        };

        let venue = self
            .venues
            .find_by_owner(&input.owner_id)
            .await?
            .ok_or_else(|| ApiError::validation("No venue found for this owner"))?;

        let post = Post::new(
            venue.id,
            media_type,
            media_url,
            input.caption,
            self.ttl,
            Utc::now(),
        );
        let created = self.posts.create(&post).await?;
        info!(post_id = %created.id, venue_id = %created.venue_id, "post created");
        Ok(created)
    }
}

// ── ListVenuePosts ───────────────────────────────────────────────────────────

/// Live posts of one venue, newest first.
pub struct ListVenuePostsUseCase<P: PostRepository> {
    pub posts: P,
}

impl<P: PostRepository> ListVenuePostsUseCase<P> {
    pub async fn execute(
        &self,
        venue_id: VenueId,
        viewer: Option<&UserId>,
    ) -> Result<Vec<PostView>, ApiError> {
        let posts = self.posts.list_live(&[venue_id], Utc::now(), None).await?;
        let Some(viewer) = viewer else {
            return Ok(posts.into_iter().map(PostView::unliked).collect());
        };

        let ids: Vec<PostId> = posts.iter().map(|p| p.id).collect();
        let liked = self.posts.liked_by(viewer, &ids).await?;
        Ok(posts
            .into_iter()
            .map(|post| PostView {
                is_liked: liked.contains(&post.id),
                post,
            })
            .collect())
    }
}

// ── GetPost ──────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct PostDetail {
    pub post: PostView,
    /// `None` if the venue row has gone.
    pub venue: Option<Venue>,
}

/// A single post with its venue, expired or not.
pub struct GetPostUseCase<V: VenueRepository, P: PostRepository> {
    pub venues: V,
    pub posts: P,
}

impl<V: VenueRepository, P: PostRepository> GetPostUseCase<V, P> {
    pub async fn execute(
        &self,
        post_id: PostId,
        viewer: Option<&UserId>,
    ) -> Result<PostDetail, ApiError> {
        let post = self
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or(ApiError::PostNotFound)?;

        let is_liked = match viewer {
            Some(viewer) => self
                .posts
                .liked_by(viewer, &[post.id])
                .await?
                .contains(&post.id),
            None => false,
        };
        let venue = self.venues.find_by_id(post.venue_id).await?;
        Ok(PostDetail {
            post: PostView { post, is_liked },
            venue,
        })
    }
}

// ── TogglePostLike ───────────────────────────────────────────────────────────

pub struct TogglePostLikeUseCase<P: PostRepository> {
    pub posts: P,
}

impl<P: PostRepository> TogglePostLikeUseCase<P> {
    /// Like if not yet liked by `user_id`, unlike otherwise. Returns the new counters.
    pub async fn execute(&self, post_id: PostId, user_id: &UserId) -> Result<PostMetrics, ApiError> {
        self.posts
            .toggle_like(post_id, user_id)
            .await?
            .ok_or(ApiError::PostNotFound)
    }
}

// ── TrackPostView ────────────────────────────────────────────────────────────

pub struct TrackPostViewUseCase<P: PostRepository> {
    pub posts: P,
}

impl<P: PostRepository> TrackPostViewUseCase<P> {
    /// Best-effort analytics: failures are logged and reported as `false`.
    pub async fn execute(&self, post_id: PostId, viewer: Option<&UserId>) -> bool {
        match self.posts.track_view(post_id, viewer).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, post_id = %post_id, "failed to track post view");
                false
            }
        }
    }
}

// ── DeletePost ───────────────────────────────────────────────────────────────

pub struct DeletePostUseCase<V: VenueRepository, P: PostRepository> {
    pub venues: V,
    pub posts: P,
}

impl<V: VenueRepository, P: PostRepository> DeletePostUseCase<V, P> {
    /// Only the owner of the post's venue may delete it.
    pub async fn execute(&self, owner_id: &UserId, post_id: PostId) -> Result<(), ApiError> {
        let post = self
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or(ApiError::PostNotFound)?;
        let venue = self.venues.find_by_id(post.venue_id).await?;
        if venue.is_none_or(|v| &v.owner_id != owner_id) {
            return Err(ApiError::PostNotOwned);
        }

        self.posts.delete(post_id).await?;
        info!(post_id = %post_id, "post deleted");
        Ok(())
    }
}
