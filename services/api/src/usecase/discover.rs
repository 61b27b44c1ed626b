use chrono::{DateTime, Utc};

use hapa_domain::id::VenueId;

use crate::domain::repository::{PostRepository, VenueRepository};
use crate::domain::types::{Post, Venue, VenueSearch};
use crate::error::ApiError;

/// Mean Earth radius used to turn a radius in km into radians.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

pub const DEFAULT_FEED_RADIUS_KM: f64 = 10.0;

/// At most this many venues per feed or search response.
pub const VENUE_LIMIT: usize = 50;

/// At most this many posts per feed response.
pub const FEED_POST_LIMIT: u64 = 100;

/// Equirectangular approximation of the angular distance, in radians,
/// between two points given in degrees. Good enough for sorting nearby venues.
pub fn planar_distance(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let x = (lng2.to_radians() - lng1.to_radians()) * ((lat1 + lat2) / 2.0).to_radians().cos();
    let y = lat2.to_radians() - lat1.to_radians();
    (x * x + y * y).sqrt()
}

/// Distance from `origin` to a venue. A venue without coordinates counts as
/// being right here so it still shows up in the feed.
fn venue_distance(origin: (f64, f64), venue: &Venue) -> f64 {
    match (venue.lat, venue.lng) {
        (Some(lat), Some(lng)) => planar_distance(origin.0, origin.1, lat, lng),
        _ => 0.0,
    }
}

/// Feed request. Both `lat` and `lng` are needed to sort by proximity.
#[derive(Debug, Clone, Copy)]
pub struct FeedQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub radius_km: f64,
}

impl Default for FeedQuery {
    fn default() -> Self {
        Self {
            lat: None,
            lng: None,
            radius_km: DEFAULT_FEED_RADIUS_KM,
        }
    }
}

/// Nearest venues (or the first ones when no location is given), sorted
/// nearest first, plus their live posts.
pub fn select_feed_venues(mut venues: Vec<Venue>, query: FeedQuery) -> Vec<Venue> {
    if let (Some(lat), Some(lng)) = (query.lat, query.lng) {
        let origin = (lat, lng);
        let max_rad = query.radius_km / EARTH_RADIUS_KM;
        venues.sort_by(|a, b| venue_distance(origin, a).total_cmp(&venue_distance(origin, b)));
        venues.retain(|v| venue_distance(origin, v) <= max_rad);
    }
    venues.truncate(VENUE_LIMIT);
    venues
}

#[derive(Debug)]
pub struct Feed {
    pub venues: Vec<Venue>,
    pub posts: Vec<Post>,
}

pub struct DiscoverFeedUseCase<V: VenueRepository, P: PostRepository> {
    pub venues: V,
    pub posts: P,
}

impl<V: VenueRepository, P: PostRepository> DiscoverFeedUseCase<V, P> {
    pub async fn execute(&self, query: FeedQuery, now: DateTime<Utc>) -> Result<Feed, ApiError> {
        let venues = select_feed_venues(self.venues.list_all().await?, query);
        let ids: Vec<VenueId> = venues.iter().map(|v| v.id).collect();
        let posts = self
            .posts
            .list_live(&ids, now, Some(FEED_POST_LIMIT))
            .await?;
        Ok(Feed { venues, posts })
    }
}

pub struct SearchVenuesUseCase<V: VenueRepository> {
    pub venues: V,
}

impl<V: VenueRepository> SearchVenuesUseCase<V> {
    /// Blank filters are dropped; with no filters at all this lists venues.
    pub async fn execute(&self, filter: VenueSearch) -> Result<Vec<Venue>, ApiError> {
        fn clean(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
        }
        let filter = VenueSearch {
            q: clean(filter.q),
            city: clean(filter.city),
            area: clean(filter.area),
        };
        self.venues.search(&filter, VENUE_LIMIT as u64).await
    }
}
