use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use hapa_domain::id::{PostId, UserId, VenueId};
use hapa_domain::user::{STATUS_ACTIVE, UserRole};

/// Application user record.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub phone_number: Option<String>,
    pub role: UserRole,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl User {
    /// New active user whose first login is `now`.
    pub fn new(id: UserId, phone_number: Option<String>, role: UserRole, now: DateTime<Utc>) -> Self {
        Self {
            id,
            phone_number,
            role,
            status: STATUS_ACTIVE.to_owned(),
            created_at: now,
            last_login_at: Some(now),
        }
    }
}

/// One-time code row. Expiry is logical; rows are never deleted here.
#[derive(Debug, Clone, PartialEq)]
pub struct OtpCode {
    pub id: Uuid,
    pub phone_number: String,
    pub code: String,
    pub purpose: String,
    pub attempts: i32,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl OtpCode {
    pub fn new(phone_number: String, code: String, ttl: Duration, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            phone_number,
            code,
            purpose: OTP_PURPOSE_LOGIN.to_owned(),
            attempts: 0,
            created_at: now,
            expires_at: Some(now + ttl),
        }
    }

    /// A row without `expires_at` never expires.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| now >= exp)
    }
}

/// Identity asserted by the external authority for a presented bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelegatedIdentity {
    pub subject_id: String,
    pub is_anonymous: bool,
    pub phone: Option<String>,
}

/// Venue profile.
#[derive(Debug, Clone, PartialEq)]
pub struct Venue {
    pub id: VenueId,
    pub owner_id: UserId,
    pub name: String,
    pub venue_type: String,
    pub city: String,
    pub area: String,
    pub address: Option<String>,
    pub contact_phone: Option<String>,
    pub categories: Vec<String>,
    pub images: Vec<String>,
    pub working_hours: Option<serde_json::Value>,
    /// Degrees. Venues without a location sort as nearest in the feed.
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub views: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Aggregate counters kept on each post by the server-side procedures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostMetrics {
    pub likes: i64,
    pub views: i64,
}

impl std::ops::Add for PostMetrics {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            likes: self.likes + rhs.likes,
            views: self.views + rhs.views,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown media type: {0}")]
pub struct UnknownMediaType(pub String);

impl FromStr for MediaType {
    type Err = UnknownMediaType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(Self::Image),
            "video" => Ok(Self::Video),
            other => Err(UnknownMediaType(other.to_owned())),
        }
    }
}

/// Time-limited story published by a venue.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: PostId,
    pub venue_id: VenueId,
    pub media_type: MediaType,
    pub media_url: String,
    pub caption: Option<String>,
    pub metrics: PostMetrics,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Post {
    pub fn new(
        venue_id: VenueId,
        media_type: MediaType,
        media_url: String,
        caption: Option<String>,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: PostId::generate(),
            venue_id,
            media_type,
            media_url,
            caption,
            metrics: PostMetrics::default(),
            created_at: now,
            expires_at: now + ttl,
        }
    }

    /// Listed in feeds only while `now < expires_at`.
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Venue search filters. Empty strings are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VenueSearch {
    /// Case-insensitive substring of name or type.
    pub q: Option<String>,
    pub city: Option<String>,
    pub area: Option<String>,
}

/// OTP policy fixed at startup.
#[derive(Debug, Clone, Copy)]
pub struct OtpSettings {
    pub length: u32,
    pub ttl: Duration,
    pub max_attempts: Option<i32>,
}

impl Default for OtpSettings {
    fn default() -> Self {
        Self {
            length: DEFAULT_OTP_LENGTH,
            ttl: Duration::minutes(DEFAULT_OTP_TTL_MINUTES),
            max_attempts: None,
        }
    }
}

/// Purpose recorded on codes issued for sign-in.
pub const OTP_PURPOSE_LOGIN: &str = "login";

/// OTP length in decimal digits.
pub const DEFAULT_OTP_LENGTH: u32 = 5;

/// OTP time-to-live in minutes.
pub const DEFAULT_OTP_TTL_MINUTES: i64 = 5;

/// Story lifetime in hours.
pub const DEFAULT_POST_TTL_HOURS: i64 = 24;
