use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Barrier;
use uuid::Uuid;

use hapa_api::domain::repository::{
    IdentityAuthority, OtpCodeRepository, OtpSender, PostRepository, UserRepository,
    VenueRepository,
};
use hapa_api::domain::types::{
    DelegatedIdentity, MediaType, OtpCode, OtpSettings, Post, PostMetrics, User, Venue,
    VenueSearch,
};
use hapa_api::error::ApiError;
use hapa_api::usecase::token::TokenIssuer;
use hapa_domain::id::{PostId, UserId, VenueId};
use hapa_domain::user::UserRole;
use hapa_testing::auth::MockAuth;

pub const ACCESS_TTL: Duration = Duration::from_secs(60 * 60);
pub const REFRESH_TTL: Duration = Duration::from_secs(30 * 86_400);

pub fn test_issuer() -> TokenIssuer {
    TokenIssuer::new(MockAuth::secret(), ACCESS_TTL, REFRESH_TTL)
}

pub fn test_settings() -> OtpSettings {
    OtpSettings::default()
}

// ── MockUserRepo ─────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockUserRepo {
    pub users: Arc<Mutex<Vec<User>>>,
    /// When set, every lookup waits here so concurrent callers all miss
    /// before any of them inserts.
    pub lookup_gate: Option<Arc<Barrier>>,
}

impl MockUserRepo {
    pub fn new(users: Vec<User>) -> Self {
        Self {
            users: Arc::new(Mutex::new(users)),
            ..Self::default()
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Lookups block until `callers` of them are in flight at once.
    pub fn gated(callers: usize) -> Self {
        Self {
            lookup_gate: Some(Arc::new(Barrier::new(callers))),
            ..Self::default()
        }
    }

    async fn pass_gate(&self) {
        if let Some(gate) = &self.lookup_gate {
            gate.wait().await;
        }
    }

    /// Shared handle to the user list for post-execution inspection.
    pub fn users_handle(&self) -> Arc<Mutex<Vec<User>>> {
        Arc::clone(&self.users)
    }
}

impl UserRepository for MockUserRepo {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, ApiError> {
        self.pass_gate().await;
        Ok(self.users.lock().unwrap().iter().find(|u| &u.id == id).cloned())
    }

    async fn find_by_phone(&self, phone_number: &str) -> Result<Option<User>, ApiError> {
        self.pass_gate().await;
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.phone_number.as_deref() == Some(phone_number))
            .cloned())
    }

    async fn create(&self, user: &User) -> Result<User, ApiError> {
        let mut users = self.users.lock().unwrap();
        if let Some(existing) = users.iter().find(|u| u.id == user.id) {
            return Ok(existing.clone());
        }
        users.push(user.clone());
        Ok(user.clone())
    }

    async fn touch_last_login(&self, id: &UserId, at: DateTime<Utc>) -> Result<(), ApiError> {
        let mut users = self.users.lock().unwrap();
        if let Some(u) = users.iter_mut().find(|u| &u.id == id) {
            u.last_login_at = Some(at);
        }
        Ok(())
    }
}

// ── MockOtpCodeRepo ──────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockOtpCodeRepo {
    pub codes: Arc<Mutex<Vec<OtpCode>>>,
}

impl MockOtpCodeRepo {
    pub fn new(codes: Vec<OtpCode>) -> Self {
        Self {
            codes: Arc::new(Mutex::new(codes)),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Shared handle to the code list for post-execution inspection.
    pub fn codes_handle(&self) -> Arc<Mutex<Vec<OtpCode>>> {
        Arc::clone(&self.codes)
    }
}

impl OtpCodeRepository for MockOtpCodeRepo {
    async fn create(&self, code: &OtpCode) -> Result<(), ApiError> {
        self.codes.lock().unwrap().push(code.clone());
        Ok(())
    }

    async fn find_latest(
        &self,
        phone_number: &str,
        code: &str,
    ) -> Result<Option<OtpCode>, ApiError> {
        Ok(self
            .codes
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.phone_number == phone_number && c.code == code)
            .max_by_key(|c| c.created_at)
            .cloned())
    }

    async fn record_attempt(&self, id: Uuid) -> Result<i32, ApiError> {
        let mut codes = self.codes.lock().unwrap();
        let row = codes
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("otp row missing")))?;
        row.attempts += 1;
        Ok(row.attempts)
    }
}

// ── MockVenueRepo ────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockVenueRepo {
    pub venues: Arc<Mutex<Vec<Venue>>>,
    pub views: Arc<Mutex<Vec<(VenueId, Option<UserId>)>>>,
    pub fail_tracking: bool,
}

impl MockVenueRepo {
    pub fn new(venues: Vec<Venue>) -> Self {
        Self {
            venues: Arc::new(Mutex::new(venues)),
            ..Self::default()
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn venues_handle(&self) -> Arc<Mutex<Vec<Venue>>> {
        Arc::clone(&self.venues)
    }
}

impl VenueRepository for MockVenueRepo {
    async fn create(&self, venue: &Venue) -> Result<Venue, ApiError> {
        self.venues.lock().unwrap().push(venue.clone());
        Ok(venue.clone())
    }

    async fn find_by_id(&self, id: VenueId) -> Result<Option<Venue>, ApiError> {
        Ok(self.venues.lock().unwrap().iter().find(|v| v.id == id).cloned())
    }

    async fn find_by_owner(&self, owner_id: &UserId) -> Result<Option<Venue>, ApiError> {
        Ok(self
            .venues
            .lock()
            .unwrap()
            .iter()
            .find(|v| &v.owner_id == owner_id)
            .cloned())
    }

    async fn update(&self, venue: &Venue) -> Result<Venue, ApiError> {
        let mut venues = self.venues.lock().unwrap();
        if let Some(v) = venues.iter_mut().find(|v| v.id == venue.id) {
            *v = venue.clone();
        }
        Ok(venue.clone())
    }

    async fn track_view(&self, id: VenueId, viewer: Option<&UserId>) -> Result<(), ApiError> {
        if self.fail_tracking {
            return Err(ApiError::Internal(anyhow::anyhow!("procedure failed")));
        }
        self.views.lock().unwrap().push((id, viewer.cloned()));
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Venue>, ApiError> {
        Ok(self.venues.lock().unwrap().clone())
    }

    async fn search(&self, filter: &VenueSearch, limit: u64) -> Result<Vec<Venue>, ApiError> {
        let q = filter.q.as_deref().map(str::to_lowercase);
        Ok(self
            .venues
            .lock()
            .unwrap()
            .iter()
            .filter(|v| filter.city.as_deref().is_none_or(|c| v.city == c))
            .filter(|v| filter.area.as_deref().is_none_or(|a| v.area == a))
            .filter(|v| {
                q.as_deref().is_none_or(|q| {
                    v.name.to_lowercase().contains(q) || v.venue_type.to_lowercase().contains(q)
                })
            })
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

// ── MockPostRepo ─────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockPostRepo {
    pub posts: Arc<Mutex<Vec<Post>>>,
    pub likes: Arc<Mutex<HashSet<(PostId, UserId)>>>,
    pub views: Arc<Mutex<Vec<(PostId, Option<UserId>)>>>,
    pub fail_tracking: bool,
}

impl MockPostRepo {
    pub fn new(posts: Vec<Post>) -> Self {
        Self {
            posts: Arc::new(Mutex::new(posts)),
            ..Self::default()
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn posts_handle(&self) -> Arc<Mutex<Vec<Post>>> {
        Arc::clone(&self.posts)
    }

    pub fn with_like(self, post_id: PostId, user_id: &str) -> Self {
        self.likes
            .lock()
            .unwrap()
            .insert((post_id, UserId::from(user_id)));
        self
    }
}

impl PostRepository for MockPostRepo {
    async fn create(&self, post: &Post) -> Result<Post, ApiError> {
        self.posts.lock().unwrap().push(post.clone());
        Ok(post.clone())
    }

    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, ApiError> {
        Ok(self.posts.lock().unwrap().iter().find(|p| p.id == id).cloned())
    }

    async fn list_live(
        &self,
        venue_ids: &[VenueId],
        now: DateTime<Utc>,
        limit: Option<u64>,
    ) -> Result<Vec<Post>, ApiError> {
        let mut posts: Vec<Post> = self
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| venue_ids.contains(&p.venue_id) && p.is_live_at(now))
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = limit {
            posts.truncate(limit as usize);
        }
        Ok(posts)
    }

    async fn list_for_venue(&self, venue_id: VenueId) -> Result<Vec<Post>, ApiError> {
        Ok(self
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.venue_id == venue_id)
            .cloned()
            .collect())
    }

    async fn liked_by(
        &self,
        user_id: &UserId,
        post_ids: &[PostId],
    ) -> Result<HashSet<PostId>, ApiError> {
        Ok(self
            .likes
            .lock()
            .unwrap()
            .iter()
            .filter(|(post, user)| user == user_id && post_ids.contains(post))
            .map(|(post, _)| *post)
            .collect())
    }

    async fn delete(&self, id: PostId) -> Result<(), ApiError> {
        self.posts.lock().unwrap().retain(|p| p.id != id);
        Ok(())
    }

    async fn toggle_like(
        &self,
        id: PostId,
        user_id: &UserId,
    ) -> Result<Option<PostMetrics>, ApiError> {
        let mut posts = self.posts.lock().unwrap();
        let Some(post) = posts.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        let mut likes = self.likes.lock().unwrap();
        let key = (id, user_id.clone());
        if !likes.remove(&key) {
            likes.insert(key);
        }
        post.metrics.likes = likes.iter().filter(|(p, _)| *p == id).count() as i64;
        Ok(Some(post.metrics))
    }

    async fn track_view(&self, id: PostId, viewer: Option<&UserId>) -> Result<(), ApiError> {
        if self.fail_tracking {
            return Err(ApiError::Internal(anyhow::anyhow!("procedure failed")));
        }
        self.views.lock().unwrap().push((id, viewer.cloned()));
        Ok(())
    }
}

// ── MockSender ───────────────────────────────────────────────────────────────

/// Records every dispatched `(phone, code)` pair.
#[derive(Clone, Default)]
pub struct MockSender {
    pub sent: Arc<Mutex<Vec<(String, String)>>>,
    pub reveal: bool,
}

impl MockSender {
    pub fn revealing() -> Self {
        Self {
            reveal: true,
            ..Self::default()
        }
    }

    pub fn silent() -> Self {
        Self::default()
    }

    pub fn sent_handle(&self) -> Arc<Mutex<Vec<(String, String)>>> {
        Arc::clone(&self.sent)
    }
}

impl OtpSender for MockSender {
    async fn send(&self, phone_number: &str, code: &str) {
        self.sent
            .lock()
            .unwrap()
            .push((phone_number.to_owned(), code.to_owned()));
    }

    fn reveals_code(&self) -> bool {
        self.reveal
    }
}

// ── MockAuthority ────────────────────────────────────────────────────────────

/// Accepts exactly one token and answers with a fixed identity.
pub struct MockAuthority {
    pub accepted_token: String,
    pub identity: DelegatedIdentity,
}

impl MockAuthority {
    pub fn new(accepted_token: &str, subject_id: &str, is_anonymous: bool) -> Self {
        Self {
            accepted_token: accepted_token.to_owned(),
            identity: DelegatedIdentity {
                subject_id: subject_id.to_owned(),
                is_anonymous,
                phone: None,
            },
        }
    }
}

impl IdentityAuthority for MockAuthority {
    async fn verify(&self, bearer_token: &str) -> Result<DelegatedIdentity, ApiError> {
        if bearer_token == self.accepted_token {
            Ok(self.identity.clone())
        } else {
            Err(ApiError::InvalidToken)
        }
    }
}

// ── Test fixture helpers ─────────────────────────────────────────────────────

pub fn test_user(id: &str, phone: Option<&str>, role: UserRole) -> User {
    let created = Utc::now() - chrono::Duration::days(7);
    User {
        id: UserId::from(id),
        phone_number: phone.map(str::to_owned),
        role,
        status: "active".to_owned(),
        created_at: created,
        last_login_at: Some(created),
    }
}

/// OTP row created `age` ago with the default five-minute TTL.
pub fn test_otp(phone: &str, code: &str, age: chrono::Duration) -> OtpCode {
    OtpCode::new(
        phone.to_owned(),
        code.to_owned(),
        chrono::Duration::minutes(5),
        Utc::now() - age,
    )
}

pub fn test_venue(owner: &str) -> Venue {
    Venue {
        id: VenueId(Uuid::new_v4()),
        owner_id: UserId::from(owner),
        name: "Cafe Java".to_owned(),
        venue_type: "cafe".to_owned(),
        city: "Kampala".to_owned(),
        area: "Kololo".to_owned(),
        address: Some("Plot 5, Acacia Ave".to_owned()),
        contact_phone: Some("+256700123456".to_owned()),
        categories: vec!["coffee".to_owned()],
        images: vec![],
        working_hours: None,
        lat: None,
        lng: None,
        views: 0,
        created_at: Utc::now() - chrono::Duration::days(1),
        updated_at: None,
    }
}

pub fn test_venue_at(owner: &str, name: &str, lat: f64, lng: f64) -> Venue {
    Venue {
        name: name.to_owned(),
        lat: Some(lat),
        lng: Some(lng),
        ..test_venue(owner)
    }
}

/// Image post on `venue_id` published `age` ago with a 24-hour lifetime.
pub fn test_post(venue_id: VenueId, age: chrono::Duration) -> Post {
    Post::new(
        venue_id,
        MediaType::Image,
        "https://cdn.example/story.jpg".to_owned(),
        None,
        chrono::Duration::hours(24),
        Utc::now() - age,
    )
}
