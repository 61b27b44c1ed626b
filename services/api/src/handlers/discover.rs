use axum::{
    Json,
    extract::{Query, State},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::domain::types::VenueSearch;
use crate::error::ApiError;
use crate::handlers::dto::{PostResponse, VenueListResponse, VenueResponse};
use crate::state::AppState;
use crate::usecase::discover::{
    DEFAULT_FEED_RADIUS_KM, DiscoverFeedUseCase, FeedQuery, SearchVenuesUseCase,
};
use crate::usecase::post::PostView;

/// Unparseable numbers are ignored rather than rejected.
fn parse_coordinate(value: Option<&str>) -> Option<f64> {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

// ── GET /api/discover/feed ────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct FeedParams {
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub radius_km: Option<String>,
}

impl From<FeedParams> for FeedQuery {
    fn from(p: FeedParams) -> Self {
        Self {
            lat: parse_coordinate(p.lat.as_deref()),
            lng: parse_coordinate(p.lng.as_deref()),
            radius_km: parse_coordinate(p.radius_km.as_deref())
                .unwrap_or(DEFAULT_FEED_RADIUS_KM),
        }
    }
}

#[derive(Serialize)]
pub struct FeedResponse {
    pub venues: Vec<VenueResponse>,
    pub posts: Vec<PostResponse>,
}

pub async fn feed(
    State(state): State<AppState>,
    Query(params): Query<FeedParams>,
) -> Result<Json<FeedResponse>, ApiError> {
    let usecase = DiscoverFeedUseCase {
        venues: state.venue_repo(),
        posts: state.post_repo(),
    };
    let feed = usecase.execute(params.into(), Utc::now()).await?;
    Ok(Json(FeedResponse {
        venues: feed.venues.into_iter().map(Into::into).collect(),
        posts: feed
            .posts
            .into_iter()
            .map(|p| PostView::unliked(p).into())
            .collect(),
    }))
}

// ── GET /api/discover/search ──────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct SearchParams {
    pub q: Option<String>,
    pub city: Option<String>,
    pub area: Option<String>,
}

pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<VenueListResponse>, ApiError> {
    let usecase = SearchVenuesUseCase {
        venues: state.venue_repo(),
    };
    let venues = usecase
        .execute(VenueSearch {
            q: params.q,
            city: params.city,
            area: params.area,
        })
        .await?;
    Ok(Json(VenueListResponse::of(venues)))
}
