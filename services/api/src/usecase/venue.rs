use chrono::Utc;
use tracing::warn;
use uuid::Uuid;

use hapa_domain::id::{UserId, VenueId};

use crate::domain::repository::{PostRepository, UserRepository, VenueRepository};
use crate::domain::types::{PostMetrics, Venue};
use crate::error::ApiError;

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn composed_address(area: &str, city: &str) -> String {
    format!("{area}, {city}")
}

fn check_coordinates(lat: Option<f64>, lng: Option<f64>) -> Result<(), ApiError> {
    let lat_ok = lat.is_none_or(|v| (-90.0..=90.0).contains(&v));
    let lng_ok = lng.is_none_or(|v| (-180.0..=180.0).contains(&v));
    if lat_ok && lng_ok {
        Ok(())
    } else {
        Err(ApiError::validation("lat and lng must be valid coordinates"))
    }
}

// ── CreateVenue ──────────────────────────────────────────────────────────────

pub struct CreateVenueInput {
    pub owner_id: UserId,
    pub name: Option<String>,
    pub venue_type: Option<String>,
    pub city: Option<String>,
    pub area: Option<String>,
    pub address: Option<String>,
    pub categories: Vec<String>,
    pub images: Vec<String>,
    pub working_hours: Option<serde_json::Value>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

pub struct CreateVenueUseCase<U: UserRepository, V: VenueRepository> {
    pub users: U,
    pub venues: V,
}

impl<U: UserRepository, V: VenueRepository> CreateVenueUseCase<U, V> {
    pub async fn execute(&self, input: CreateVenueInput) -> Result<Venue, ApiError> {
        let (Some(name), Some(venue_type), Some(city), Some(area)) = (
            present(input.name),
            present(input.venue_type),
            present(input.city),
            present(input.area),
        ) else {
            return Err(ApiError::validation("name, type, city, area are required"));
        };
        check_coordinates(input.lat, input.lng)?;

        // Contact phone always comes from the owner's verified number.
        let owner = self.users.find_by_id(&input.owner_id).await?;
        let contact_phone = owner
            .and_then(|u| u.phone_number)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| ApiError::validation("User does not have a phone number"))?;

        let address =
            present(input.address).unwrap_or_else(|| composed_address(&area, &city));

        let venue = Venue {
            id: VenueId(Uuid::new_v4()),
            owner_id: input.owner_id,
            name,
            venue_type,
            city,
            area,
            address: Some(address),
            contact_phone: Some(contact_phone),
            categories: input.categories,
            images: input.images,
            working_hours: input.working_hours.filter(|v| !v.is_null()),
            lat: input.lat,
            lng: input.lng,
            views: 0,
            created_at: Utc::now(),
            updated_at: None,
        };
        self.venues.create(&venue).await
    }
}

// ── GetVenue ─────────────────────────────────────────────────────────────────

pub struct GetVenueUseCase<V: VenueRepository> {
    pub venues: V,
}

impl<V: VenueRepository> GetVenueUseCase<V> {
    pub async fn execute(&self, id: VenueId) -> Result<Venue, ApiError> {
        self.venues
            .find_by_id(id)
            .await?
            .ok_or(ApiError::VenueNotFound)
    }
}

// ── GetOwnVenue ──────────────────────────────────────────────────────────────

/// Owner dashboard view: the venue plus likes and views summed over all of
/// its posts, expired ones included.
#[derive(Debug)]
pub struct OwnVenue {
    pub venue: Venue,
    pub post_totals: PostMetrics,
}

pub struct GetOwnVenueUseCase<V: VenueRepository, P: PostRepository> {
    pub venues: V,
    pub posts: P,
}

impl<V: VenueRepository, P: PostRepository> GetOwnVenueUseCase<V, P> {
    pub async fn execute(&self, owner_id: &UserId) -> Result<Option<OwnVenue>, ApiError> {
        let Some(venue) = self.venues.find_by_owner(owner_id).await? else {
            return Ok(None);
        };
        let post_totals = self
            .posts
            .list_for_venue(venue.id)
            .await?
            .iter()
            .fold(PostMetrics::default(), |acc, p| acc + p.metrics);
        Ok(Some(OwnVenue { venue, post_totals }))
    }
}

// ── UpdateVenue ──────────────────────────────────────────────────────────────

/// Partial update. `None` leaves the field untouched.
#[derive(Debug, Default)]
pub struct VenueUpdate {
    pub name: Option<String>,
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

impl VenueUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.venue_type.is_none()
            && self.city.is_none()
            && self.area.is_none()
            && self.contact_phone.is_none()
            && self.categories.is_none()
            && self.images.is_none()
            && self.address.is_none()
            && self.working_hours.is_none()
            && self.lat.is_none()
            && self.lng.is_none()
    }

    fn touches_location(&self) -> bool {
        self.address.is_some() || self.city.is_some() || self.area.is_some()
    }

    /// Merge into `venue`. Location edits without an address keep the
    /// existing address or fall back to "{area}, {city}".
    pub fn apply(self, venue: &mut Venue) {
        let touches_location = self.touches_location();
        if let Some(name) = self.name {
            venue.name = name;
        }
        if let Some(venue_type) = self.venue_type {
            venue.venue_type = venue_type;
        }
        if let Some(city) = self.city {
            venue.city = city;
        }
        if let Some(area) = self.area {
            venue.area = area;
        }
        if let Some(contact_phone) = self.contact_phone {
            venue.contact_phone = Some(contact_phone);
        }
        if let Some(categories) = self.categories {
            venue.categories = categories;
        }
        if let Some(images) = self.images {
            venue.images = images;
        }
        if let Some(working_hours) = self.working_hours {
            venue.working_hours = Some(working_hours);
        }
        if let Some(lat) = self.lat {
            venue.lat = Some(lat);
        }
        if let Some(lng) = self.lng {
            venue.lng = Some(lng);
        }
        if touches_location {
            let address = present(self.address)
                .or_else(|| present(venue.address.take()))
                .unwrap_or_else(|| composed_address(&venue.area, &venue.city));
            venue.address = Some(address);
        }
    }
}

pub struct UpdateVenueUseCase<V: VenueRepository> {
    pub venues: V,
}

impl<V: VenueRepository> UpdateVenueUseCase<V> {
    pub async fn execute(
        &self,
        owner_id: &UserId,
        venue_id: VenueId,
        update: VenueUpdate,
    ) -> Result<Venue, ApiError> {
        check_coordinates(update.lat, update.lng)?;
        let mut venue = self
            .venues
            .find_by_id(venue_id)
            .await?
            .filter(|v| &v.owner_id == owner_id)
            .ok_or(ApiError::VenueNotOwned)?;

        if update.is_empty() {
            return Ok(venue);
        }

        update.apply(&mut venue);
        venue.updated_at = Some(Utc::now());
        self.venues.update(&venue).await
    }
}

// ── TrackView ────────────────────────────────────────────────────────────────

pub struct TrackVenueViewUseCase<V: VenueRepository> {
    pub venues: V,
}

impl<V: VenueRepository> TrackVenueViewUseCase<V> {
    /// Best-effort analytics: failures are logged and reported as `false`.
    pub async fn execute(&self, venue_id: VenueId, viewer: Option<&UserId>) -> bool {
        match self.venues.track_view(venue_id, viewer).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, venue_id = %venue_id, "failed to track venue view");
                false
            }
        }
    }
}
