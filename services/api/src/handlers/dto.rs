use chrono::{DateTime, Utc};
use serde::Serialize;

use hapa_core::serde::{to_rfc3339_ms, to_rfc3339_ms_opt};
use hapa_domain::id::{PostId, UserId, VenueId};
use hapa_domain::user::UserRole;

use crate::domain::types::{MediaType, PostMetrics, User, Venue};
use crate::usecase::identity::LoginOutput;
use crate::usecase::post::PostView;

#[derive(Serialize)]
pub struct UserResponse {
    pub id: UserId,
    pub role: UserRole,
    pub phone_number: Option<String>,
    pub status: String,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "to_rfc3339_ms_opt")]
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            role: u.role,
            phone_number: u.phone_number,
            status: u.status,
            created_at: u.created_at,
            last_login_at: u.last_login_at,
        }
    }
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserResponse,
}

impl From<LoginOutput> for LoginResponse {
    fn from(out: LoginOutput) -> Self {
        Self {
            access_token: out.tokens.access_token,
            refresh_token: out.tokens.refresh_token,
            user: out.user.into(),
        }
    }
}

#[derive(Serialize)]
pub struct VenueResponse {
    pub id: VenueId,
    pub owner_id: UserId,
    pub name: String,
    #[serde(rename = "type")]
    pub venue_type: String,
    pub city: String,
    pub area: String,
    pub address: Option<String>,
    pub contact_phone: Option<String>,
    pub categories: Vec<String>,
    pub images: Vec<String>,
    pub working_hours: Option<serde_json::Value>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub metrics: MetricsResponse,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "to_rfc3339_ms_opt")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsResponse {
    pub likes: i64,
    pub views: i64,
}

impl From<PostMetrics> for MetricsResponse {
    fn from(m: PostMetrics) -> Self {
        Self {
            likes: m.likes,
            views: m.views,
        }
    }
}

impl From<Venue> for VenueResponse {
    fn from(v: Venue) -> Self {
        Self {
            id: v.id,
            owner_id: v.owner_id,
            name: v.name,
            venue_type: v.venue_type,
            city: v.city,
            area: v.area,
            address: v.address,
            contact_phone: v.contact_phone,
            categories: v.categories,
            images: v.images,
            working_hours: v.working_hours,
            lat: v.lat,
            lng: v.lng,
            // Venues are viewed, not liked.
            metrics: MetricsResponse {
                likes: 0,
                views: v.views,
            },
            created_at: v.created_at,
            updated_at: v.updated_at,
        }
    }
}

#[derive(Serialize)]
pub struct VenueEnvelope {
    pub venue: Option<VenueResponse>,
}

impl VenueEnvelope {
    pub fn of(venue: Option<Venue>) -> Self {
        Self {
            venue: venue.map(Into::into),
        }
    }
}

/// `{"success": bool}` for fire-and-forget and delete routes.
#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Serialize)]
pub struct VenueListResponse {
    pub venues: Vec<VenueResponse>,
}

impl VenueListResponse {
    pub fn of(venues: Vec<Venue>) -> Self {
        Self {
            venues: venues.into_iter().map(Into::into).collect(),
        }
    }
}

/// Venue card shown next to a single post.
#[derive(Serialize)]
pub struct VenueSummary {
    pub id: VenueId,
    pub name: String,
    #[serde(rename = "type")]
    pub venue_type: String,
    pub city: String,
    pub area: String,
    pub images: Vec<String>,
}

impl From<Venue> for VenueSummary {
    fn from(v: Venue) -> Self {
        Self {
            id: v.id,
            name: v.name,
            venue_type: v.venue_type,
            city: v.city,
            area: v.area,
            images: v.images,
        }
    }
}

#[derive(Serialize)]
pub struct PostResponse {
    pub id: PostId,
    pub venue_id: VenueId,
    #[serde(serialize_with = "media_type_str")]
    pub media_type: MediaType,
    pub media_url: String,
    pub caption: Option<String>,
    pub metrics: MetricsResponse,
    pub is_liked: bool,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub expires_at: DateTime<Utc>,
}

fn media_type_str<S: serde::Serializer>(m: &MediaType, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(m.as_str())
}

impl From<PostView> for PostResponse {
    fn from(view: PostView) -> Self {
        let p = view.post;
        Self {
            id: p.id,
            venue_id: p.venue_id,
            media_type: p.media_type,
            media_url: p.media_url,
            caption: p.caption,
            metrics: p.metrics.into(),
            is_liked: view.is_liked,
            created_at: p.created_at,
            expires_at: p.expires_at,
        }
    }
}

#[derive(Serialize)]
pub struct PostListResponse {
    pub posts: Vec<PostResponse>,
}

impl PostListResponse {
    pub fn of(posts: Vec<PostView>) -> Self {
        Self {
            posts: posts.into_iter().map(Into::into).collect(),
        }
    }
}
