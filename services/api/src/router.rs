use axum::{
    Router,
    routing::{get, post},
};

use hapa_core::health::{health, healthz, readyz};
use hapa_core::layers::{cors_layer, request_id_layer, trace_layer};

use crate::handlers::{
    auth::{login_supabase, me, refresh, request_otp, verify_otp},
    discover::{feed, search},
    post::{
        create_post, delete_post, get_post, list_venue_posts, toggle_post_like,
        track_post_view,
    },
    venue::{create_venue, get_my_venue, get_venue, track_venue_view, update_venue},
};
use crate::state::AppState;

pub fn build_router(state: AppState, cors_origins: &str) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        // Auth
        .route("/auth/request-otp", post(request_otp))
        .route("/auth/verify-otp", post(verify_otp))
        .route("/auth/refresh", post(refresh))
        .route("/auth/me", get(me))
        .route("/auth/login-supabase", post(login_supabase))
        // Venues
        .route("/venues", post(create_venue))
        .route("/venues/me", get(get_my_venue))
        .route("/venues/{venue_id}", get(get_venue).patch(update_venue))
        .route("/venues/{venue_id}/view", post(track_venue_view))
        // Posts
        .route("/posts", post(create_post))
        .route("/posts/venue/{venue_id}", get(list_venue_posts))
        .route("/posts/{post_id}", get(get_post).delete(delete_post))
        .route("/posts/{post_id}/like", post(toggle_post_like))
        .route("/posts/{post_id}/view", post(track_post_view))
        // Discover
        .route("/discover/feed", get(feed))
        .route("/discover/search", get(search));

    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .nest("/api", api)
        .layer(cors_layer(cors_origins))
        .layer(trace_layer())
        .layer(request_id_layer())
        .with_state(state)
}
