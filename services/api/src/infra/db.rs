use std::collections::HashSet;

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, Func, LikeExpr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, DbBackend, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Statement,
};
use uuid::Uuid;

use hapa_api_schema::{otp_codes, post_likes, posts, users, venues};
use hapa_domain::id::{PostId, UserId, VenueId};
use hapa_domain::user::UserRole;

use crate::domain::repository::{
    OtpCodeRepository, PostRepository, UserRepository, VenueRepository,
};
use crate::domain::types::{
    MediaType, OtpCode, Post, PostMetrics, User, Venue, VenueSearch,
};
use crate::error::ApiError;

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, ApiError> {
        let model = users::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .context("find user by id")?;
        model.map(user_from_model).transpose()
    }

    async fn find_by_phone(&self, phone_number: &str) -> Result<Option<User>, ApiError> {
        let model = users::Entity::find()
            .filter(users::Column::PhoneNumber.eq(phone_number))
            .order_by_asc(users::Column::CreatedAt)
            .one(&self.db)
            .await
            .context("find user by phone")?;
        model.map(user_from_model).transpose()
    }

    async fn create(&self, user: &User) -> Result<User, ApiError> {
        let active = users::ActiveModel {
            id: Set(user.id.to_string()),
            phone_number: Set(user.phone_number.clone()),
            role: Set(user.role.as_str().to_owned()),
            status: Set(user.status.clone()),
            created_at: Set(user.created_at),
            last_login_at: Set(user.last_login_at),
        };
        // A concurrent login may have inserted the same id first; keep its row.
        users::Entity::insert(active)
            .on_conflict(
                OnConflict::column(users::Column::Id)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .context("create user")?;

        let model = users::Entity::find_by_id(user.id.to_string())
            .one(&self.db)
            .await
            .context("reload created user")?
            .with_context(|| format!("user {} missing after insert", user.id))?;
        user_from_model(model)
    }

    async fn touch_last_login(&self, id: &UserId, at: DateTime<Utc>) -> Result<(), ApiError> {
        users::Entity::update_many()
            .col_expr(users::Column::LastLoginAt, Expr::value(at))
            .filter(users::Column::Id.eq(id.to_string()))
            .exec(&self.db)
            .await
            .context("update user last_login_at")?;
        Ok(())
    }
}

fn user_from_model(model: users::Model) -> Result<User, ApiError> {
    let role = model
        .role
        .parse::<UserRole>()
        .with_context(|| format!("user {} has an empty role", model.id))?;
    Ok(User {
        id: UserId(model.id),
        phone_number: model.phone_number,
        role,
        status: model.status,
        created_at: model.created_at,
        last_login_at: model.last_login_at,
    })
}

// ── OTP code repository ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbOtpCodeRepository {
    pub db: DatabaseConnection,
}

impl OtpCodeRepository for DbOtpCodeRepository {
    async fn create(&self, code: &OtpCode) -> Result<(), ApiError> {
        otp_codes::ActiveModel {
            id: Set(code.id),
            phone_number: Set(code.phone_number.clone()),
            code: Set(code.code.clone()),
            purpose: Set(code.purpose.clone()),
            attempts: Set(code.attempts),
            created_at: Set(code.created_at),
            expires_at: Set(code.expires_at),
        }
        .insert(&self.db)
        .await
        .context("create otp code")?;
        Ok(())
    }

    async fn find_latest(
        &self,
        phone_number: &str,
        code: &str,
    ) -> Result<Option<OtpCode>, ApiError> {
        let model = otp_codes::Entity::find()
            .filter(otp_codes::Column::PhoneNumber.eq(phone_number))
            .filter(otp_codes::Column::Code.eq(code))
            .order_by_desc(otp_codes::Column::CreatedAt)
            .one(&self.db)
            .await
            .context("find latest otp code")?;
        Ok(model.map(otp_from_model))
    }

    async fn record_attempt(&self, id: Uuid) -> Result<i32, ApiError> {
        let updated = otp_codes::Entity::update_many()
            .col_expr(
                otp_codes::Column::Attempts,
                Expr::col(otp_codes::Column::Attempts).add(1),
            )
            .filter(otp_codes::Column::Id.eq(id))
            .exec_with_returning(&self.db)
            .await
            .context("increment otp attempts")?;
        let row = updated
            .into_iter()
            .next()
            .with_context(|| format!("otp code {id} vanished while counting attempt"))?;
        Ok(row.attempts)
    }
}

fn otp_from_model(model: otp_codes::Model) -> OtpCode {
    OtpCode {
        id: model.id,
        phone_number: model.phone_number,
        code: model.code,
        purpose: model.purpose,
        attempts: model.attempts,
        created_at: model.created_at,
        expires_at: model.expires_at,
    }
}

// ── Venue repository ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbVenueRepository {
    pub db: DatabaseConnection,
}

impl VenueRepository for DbVenueRepository {
    async fn create(&self, venue: &Venue) -> Result<Venue, ApiError> {
        let model = venue_to_active(venue)
            .insert(&self.db)
            .await
            .context("create venue")?;
        Ok(venue_from_model(model))
    }

    async fn find_by_id(&self, id: VenueId) -> Result<Option<Venue>, ApiError> {
        let model = venues::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .context("find venue by id")?;
        Ok(model.map(venue_from_model))
    }

    async fn find_by_owner(&self, owner_id: &UserId) -> Result<Option<Venue>, ApiError> {
        let model = venues::Entity::find()
            .filter(venues::Column::OwnerId.eq(owner_id.as_str()))
            .order_by_asc(venues::Column::CreatedAt)
            .one(&self.db)
            .await
            .context("find venue by owner")?;
        Ok(model.map(venue_from_model))
    }

    async fn update(&self, venue: &Venue) -> Result<Venue, ApiError> {
        let mut active = venue_to_active(venue);
        // Counter is owned by the view-tracking procedure.
        active.views = sea_orm::ActiveValue::NotSet;
        let model = active.update(&self.db).await.context("update venue")?;
        Ok(venue_from_model(model))
    }

    async fn track_view(&self, id: VenueId, viewer: Option<&UserId>) -> Result<(), ApiError> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT track_venue_view($1, $2)",
            [id.0.into(), viewer.map(|v| v.to_string()).into()],
        );
        self.db
            .execute(stmt)
            .await
            .context("call track_venue_view")?;
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Venue>, ApiError> {
        let models = venues::Entity::find()
            .order_by_asc(venues::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list venues")?;
        Ok(models.into_iter().map(venue_from_model).collect())
    }

    async fn search(&self, filter: &VenueSearch, limit: u64) -> Result<Vec<Venue>, ApiError> {
        let mut query = venues::Entity::find();
        if let Some(city) = &filter.city {
            query = query.filter(venues::Column::City.eq(city.as_str()));
        }
        if let Some(area) = &filter.area {
            query = query.filter(venues::Column::Area.eq(area.as_str()));
        }
        if let Some(q) = &filter.q {
            let pattern = format!("%{}%", escape_like(&q.to_lowercase()));
            query = query.filter(
                Condition::any()
                    .add(lower_like(venues::Column::Name, &pattern))
                    .add(lower_like(venues::Column::VenueType, &pattern)),
            );
        }
        let models = query
            .order_by_asc(venues::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .context("search venues")?;
        Ok(models.into_iter().map(venue_from_model).collect())
    }
}

/// `lower(column) LIKE pattern`; `pattern` must already be lowercase.
fn lower_like(column: venues::Column, pattern: &str) -> sea_orm::sea_query::SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column))).like(LikeExpr::new(pattern).escape('\\'))
}

/// Escape LIKE wildcards so user input matches literally.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn venue_to_active(venue: &Venue) -> venues::ActiveModel {
    venues::ActiveModel {
        id: Set(venue.id.0),
        owner_id: Set(venue.owner_id.to_string()),
        name: Set(venue.name.clone()),
        venue_type: Set(venue.venue_type.clone()),
        city: Set(venue.city.clone()),
        area: Set(venue.area.clone()),
        address: Set(venue.address.clone()),
        contact_phone: Set(venue.contact_phone.clone()),
        categories: Set(serde_json::json!(venue.categories)),
        images: Set(serde_json::json!(venue.images)),
        working_hours: Set(venue.working_hours.clone()),
        lat: Set(venue.lat),
        lng: Set(venue.lng),
        views: Set(venue.views),
        created_at: Set(venue.created_at),
        updated_at: Set(venue.updated_at),
    }
}

/// Non-array JSON in the list columns reads as an empty list.
fn string_list(value: serde_json::Value) -> Vec<String> {
    serde_json::from_value(value).unwrap_or_default()
}

fn venue_from_model(model: venues::Model) -> Venue {
    Venue {
        id: VenueId(model.id),
        owner_id: UserId(model.owner_id),
        name: model.name,
        venue_type: model.venue_type,
        city: model.city,
        area: model.area,
        address: model.address,
        contact_phone: model.contact_phone,
        categories: string_list(model.categories),
        images: string_list(model.images),
        working_hours: model.working_hours,
        lat: model.lat,
        lng: model.lng,
        views: model.views,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Post repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbPostRepository {
    pub db: DatabaseConnection,
}

impl PostRepository for DbPostRepository {
    async fn create(&self, post: &Post) -> Result<Post, ApiError> {
        let model = posts::ActiveModel {
            id: Set(post.id.0),
            venue_id: Set(post.venue_id.0),
            media_type: Set(post.media_type.as_str().to_owned()),
            media_url: Set(post.media_url.clone()),
            caption: Set(post.caption.clone()),
            likes: Set(post.metrics.likes),
            views: Set(post.metrics.views),
            created_at: Set(post.created_at),
            expires_at: Set(post.expires_at),
        }
        .insert(&self.db)
        .await
        .context("create post")?;
        post_from_model(model)
    }

    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, ApiError> {
        let model = posts::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .context("find post by id")?;
        model.map(post_from_model).transpose()
    }

    async fn list_live(
        &self,
        venue_ids: &[VenueId],
        now: DateTime<Utc>,
        limit: Option<u64>,
    ) -> Result<Vec<Post>, ApiError> {
        if venue_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut query = posts::Entity::find()
            .filter(posts::Column::VenueId.is_in(venue_ids.iter().map(|v| v.0)))
            .filter(posts::Column::ExpiresAt.gt(now))
            .order_by_desc(posts::Column::CreatedAt);
        if let Some(limit) = limit {
            query = query.limit(limit);
        }
        let models = query.all(&self.db).await.context("list live posts")?;
        models.into_iter().map(post_from_model).collect()
    }

    async fn list_for_venue(&self, venue_id: VenueId) -> Result<Vec<Post>, ApiError> {
        let models = posts::Entity::find()
            .filter(posts::Column::VenueId.eq(venue_id.0))
            .all(&self.db)
            .await
            .context("list venue posts")?;
        models.into_iter().map(post_from_model).collect()
    }

    async fn liked_by(
        &self,
        user_id: &UserId,
        post_ids: &[PostId],
    ) -> Result<HashSet<PostId>, ApiError> {
        if post_ids.is_empty() {
            return Ok(HashSet::new());
        }
        let likes = post_likes::Entity::find()
            .filter(post_likes::Column::UserId.eq(user_id.as_str()))
            .filter(post_likes::Column::PostId.is_in(post_ids.iter().map(|p| p.0)))
            .all(&self.db)
            .await
            .context("find post likes")?;
        Ok(likes.into_iter().map(|l| PostId(l.post_id)).collect())
    }

    async fn delete(&self, id: PostId) -> Result<(), ApiError> {
        posts::Entity::delete_by_id(id.0)
            .exec(&self.db)
            .await
            .context("delete post")?;
        Ok(())
    }

    async fn toggle_like(
        &self,
        id: PostId,
        user_id: &UserId,
    ) -> Result<Option<PostMetrics>, ApiError> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT likes, views FROM toggle_post_like($1, $2)",
            [id.0.into(), user_id.to_string().into()],
        );
        let Some(row) = self
            .db
            .query_one(stmt)
            .await
            .context("call toggle_post_like")?
        else {
            return Ok(None);
        };
        Ok(Some(PostMetrics {
            likes: row.try_get("", "likes").context("read toggled likes")?,
            views: row.try_get("", "views").context("read toggled views")?,
        }))
    }

    async fn track_view(&self, id: PostId, viewer: Option<&UserId>) -> Result<(), ApiError> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT track_post_view($1, $2)",
            [id.0.into(), viewer.map(|v| v.to_string()).into()],
        );
        self.db
            .execute(stmt)
            .await
            .context("call track_post_view")?;
        Ok(())
    }
}

fn post_from_model(model: posts::Model) -> Result<Post, ApiError> {
    let media_type = model
        .media_type
        .parse::<MediaType>()
        .with_context(|| format!("post {} has unreadable media type", model.id))?;
    Ok(Post {
        id: PostId(model.id),
        venue_id: VenueId(model.venue_id),
        media_type,
        media_url: model.media_url,
        caption: model.caption,
        metrics: PostMetrics {
            likes: model.likes,
            views: model.views,
        },
        created_at: model.created_at,
        expires_at: model.expires_at,
    })
}
