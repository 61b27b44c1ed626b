use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Deserialize;

use hapa_auth_types::bearer::AccessClaims;
use hapa_auth_types::role::authorize;
use hapa_auth_types::token::TokenInfo;
use hapa_domain::id::VenueId;
use hapa_domain::user::UserRole;

use crate::error::ApiError;
use crate::handlers::json_body;
use crate::handlers::dto::{SuccessResponse, VenueEnvelope};
use crate::state::AppState;
use crate::usecase::venue::{
    CreateVenueInput, CreateVenueUseCase, GetOwnVenueUseCase, GetVenueUseCase,
    TrackVenueViewUseCase, UpdateVenueUseCase, VenueUpdate,
};

pub(crate) fn require_venue_owner(claims: &TokenInfo) -> Result<(), ApiError> {
    if authorize(claims, &UserRole::VenueOwner) {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}

// ── POST /api/venues ──────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct CreateVenueRequest {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub venue_type: Option<String>,
    pub city: Option<String>,
    pub area: Option<String>,
    pub address: Option<String>,
    pub categories: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
    pub working_hours: Option<serde_json::Value>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

pub async fn create_venue(
    State(state): State<AppState>,
    AccessClaims(claims): AccessClaims,
    body: Result<Json<CreateVenueRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<VenueEnvelope>), ApiError> {
    require_venue_owner(&claims)?;
    let body = json_body(body)?;

    let usecase = CreateVenueUseCase {
        users: state.user_repo(),
        venues: state.venue_repo(),
    };
    let venue = usecase
        .execute(CreateVenueInput {
            owner_id: claims.user_id,
            name: body.name,
            venue_type: body.venue_type,
            city: body.city,
            area: body.area,
            address: body.address,
            categories: body.categories.unwrap_or_default(),
            images: body.images.unwrap_or_default(),
            working_hours: body.working_hours,
            lat: body.lat,
            lng: body.lng,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(VenueEnvelope::of(Some(venue)))))
}

// ── GET /api/venues/me ────────────────────────────────────────────────────────

pub async fn get_my_venue(
    State(state): State<AppState>,
    AccessClaims(claims): AccessClaims,
) -> Result<Json<VenueEnvelope>, ApiError> {
    require_venue_owner(&claims)?;
    let usecase = GetOwnVenueUseCase {
        venues: state.venue_repo(),
        posts: state.post_repo(),
    };
    let Some(own) = usecase.execute(&claims.user_id).await? else {
        return Ok(Json(VenueEnvelope::of(None)));
    };

    // The dashboard shows totals over the venue's posts in place of venue counters.
    let mut envelope = VenueEnvelope::of(Some(own.venue));
    if let Some(venue) = envelope.venue.as_mut() {
        venue.metrics = own.post_totals.into();
    }
    Ok(Json(envelope))
}

// ── GET /api/venues/{venue_id} ────────────────────────────────────────────────

pub async fn get_venue(
    State(state): State<AppState>,
    Path(venue_id): Path<String>,
) -> Result<Json<VenueEnvelope>, ApiError> {
    let id = venue_id
        .parse::<VenueId>()
        .map_err(|_| ApiError::VenueNotFound)?;
    let usecase = GetVenueUseCase {
        venues: state.venue_repo(),
    };
    let venue = usecase.execute(id).await?;
    Ok(Json(VenueEnvelope::of(Some(venue))))
}

// ── PATCH /api/venues/{venue_id} ──────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct UpdateVenueRequest {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub venue_type: Option<String>,
    pub city: Option<String>,
    pub area: Option<String>,
    pub contact_phone: Option<String>,
    pub categories: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
    pub address: Option<String>,
    pub working_hours: Option<serde_json::Value>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl From<UpdateVenueRequest> for VenueUpdate {
    fn from(r: UpdateVenueRequest) -> Self {
        Self {
            name: r.name,
            venue_type: r.venue_type,
            city: r.city,
            area: r.area,
            contact_phone: r.contact_phone,
            categories: r.categories,
            images: r.images,
            address: r.address,
            working_hours: r.working_hours,
            lat: r.lat,
            lng: r.lng,
        }
    }
}

pub async fn update_venue(
    State(state): State<AppState>,
    AccessClaims(claims): AccessClaims,
    Path(venue_id): Path<String>,
    body: Result<Json<UpdateVenueRequest>, JsonRejection>,
) -> Result<Json<VenueEnvelope>, ApiError> {
    require_venue_owner(&claims)?;
    let id = venue_id
        .parse::<VenueId>()
        .map_err(|_| ApiError::VenueNotOwned)?;
    let update = json_body(body)?;

    let usecase = UpdateVenueUseCase {
        venues: state.venue_repo(),
    };
    let venue = usecase
        .execute(&claims.user_id, id, update.into())
        .await?;
    Ok(Json(VenueEnvelope::of(Some(venue))))
}

// ── POST /api/venues/{venue_id}/view ──────────────────────────────────────────

pub async fn track_venue_view(
    State(state): State<AppState>,
    claims: Option<AccessClaims>,
    Path(venue_id): Path<String>,
) -> Json<SuccessResponse> {
    let Ok(id) = venue_id.parse::<VenueId>() else {
        return Json(SuccessResponse { success: false });
    };
    let usecase = TrackVenueViewUseCase {
        venues: state.venue_repo(),
    };
    let viewer = claims.as_ref().map(|AccessClaims(info)| &info.user_id);
    let success = usecase.execute(id, viewer).await;
    Json(SuccessResponse { success })
}
