use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use hapa_auth_types::bearer::AccessClaims;
use hapa_domain::id::{PostId, UserId, VenueId};

use crate::error::ApiError;
use crate::handlers::dto::{
    MetricsResponse, PostListResponse, PostResponse, SuccessResponse, VenueSummary,
};
use crate::handlers::json_body;
use crate::handlers::venue::require_venue_owner;
use crate::state::AppState;
use crate::usecase::post::{
    CreatePostInput, CreatePostUseCase, DeletePostUseCase, GetPostUseCase,
    ListVenuePostsUseCase, PostView, TogglePostLikeUseCase, TrackPostViewUseCase,
};

fn viewer(claims: &Option<AccessClaims>) -> Option<&UserId> {
    claims.as_ref().map(|AccessClaims(info)| &info.user_id)
}

// ── POST /api/posts ───────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct CreatePostRequest {
    pub media_type: Option<String>,
    pub media_url: Option<String>,
    pub caption: Option<String>,
}

#[derive(Serialize)]
pub struct PostEnvelope {
    pub post: PostResponse,
}

pub async fn create_post(
    State(state): State<AppState>,
    AccessClaims(claims): AccessClaims,
    body: Result<Json<CreatePostRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PostEnvelope>), ApiError> {
    require_venue_owner(&claims)?;
    let body = json_body(body)?;

    let usecase = CreatePostUseCase {
        venues: state.venue_repo(),
        posts: state.post_repo(),
        ttl: state.post_ttl,
    };
    let post = usecase
        .execute(CreatePostInput {
            owner_id: claims.user_id,
            media_type: body.media_type,
            media_url: body.media_url,
            caption: body.caption,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PostEnvelope {
            post: PostView::unliked(post).into(),
        }),
    ))
}

// ── GET /api/posts/venue/{venue_id} ───────────────────────────────────────────

pub async fn list_venue_posts(
    State(state): State<AppState>,
    claims: Option<AccessClaims>,
    Path(venue_id): Path<String>,
) -> Result<Json<PostListResponse>, ApiError> {
    // Not a venue id, so no venue and no posts.
    let Ok(id) = venue_id.parse::<VenueId>() else {
        return Ok(Json(PostListResponse::of(Vec::new())));
    };
    let usecase = ListVenuePostsUseCase {
        posts: state.post_repo(),
    };
    let posts = usecase.execute(id, viewer(&claims)).await?;
    Ok(Json(PostListResponse::of(posts)))
}

// ── GET /api/posts/{post_id} ──────────────────────────────────────────────────

#[derive(Serialize)]
pub struct PostDetailResponse {
    pub post: PostResponse,
    pub venue: Option<VenueSummary>,
}

pub async fn get_post(
    State(state): State<AppState>,
    claims: Option<AccessClaims>,
    Path(post_id): Path<String>,
) -> Result<Json<PostDetailResponse>, ApiError> {
    let id = post_id
        .parse::<PostId>()
        .map_err(|_| ApiError::PostNotFound)?;
    let usecase = GetPostUseCase {
        venues: state.venue_repo(),
        posts: state.post_repo(),
    };
    let detail = usecase.execute(id, viewer(&claims)).await?;
    Ok(Json(PostDetailResponse {
        post: detail.post.into(),
        venue: detail.venue.map(Into::into),
    }))
}

// ── POST /api/posts/{post_id}/like ────────────────────────────────────────────

#[derive(Serialize)]
pub struct LikeResponse {
    pub metrics: MetricsResponse,
}

pub async fn toggle_post_like(
    State(state): State<AppState>,
    AccessClaims(claims): AccessClaims,
    Path(post_id): Path<String>,
) -> Result<Json<LikeResponse>, ApiError> {
    let id = post_id
        .parse::<PostId>()
        .map_err(|_| ApiError::PostNotFound)?;
    let usecase = TogglePostLikeUseCase {
        posts: state.post_repo(),
    };
    let metrics = usecase.execute(id, &claims.user_id).await?;
    Ok(Json(LikeResponse {
        metrics: metrics.into(),
    }))
}

// ── POST /api/posts/{post_id}/view ────────────────────────────────────────────

pub async fn track_post_view(
    State(state): State<AppState>,
    claims: Option<AccessClaims>,
    Path(post_id): Path<String>,
) -> Json<SuccessResponse> {
    let Ok(id) = post_id.parse::<PostId>() else {
        return Json(SuccessResponse { success: false });
    };
    let usecase = TrackPostViewUseCase {
        posts: state.post_repo(),
    };
    let success = usecase.execute(id, viewer(&claims)).await;
    Json(SuccessResponse { success })
}

// ── DELETE /api/posts/{post_id} ───────────────────────────────────────────────

pub async fn delete_post(
    State(state): State<AppState>,
    AccessClaims(claims): AccessClaims,
    Path(post_id): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    require_venue_owner(&claims)?;
    let id = post_id
        .parse::<PostId>()
        .map_err(|_| ApiError::PostNotFound)?;
    let usecase = DeletePostUseCase {
        venues: state.venue_repo(),
        posts: state.post_repo(),
    };
    usecase.execute(&claims.user_id, id).await?;
    Ok(Json(SuccessResponse { success: true }))
}
