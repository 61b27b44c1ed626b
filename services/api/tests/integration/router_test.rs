//! Router-level checks for paths that never reach the database.

use axum::http::StatusCode;
use axum_test::TestServer;
use sea_orm::DatabaseConnection;
use serde_json::json;

use hapa_api::domain::types::OtpSettings;
use hapa_api::infra::identity::SupabaseIdentityAuthority;
use hapa_api::infra::sms::OtpChannel;
use hapa_api::router::build_router;
use hapa_api::state::AppState;
use hapa_auth_types::token::{TokenKind, validate_token};
use hapa_domain::user::UserRole;
use hapa_testing::auth::MockAuth;

use crate::helpers::test_issuer;

fn server() -> TestServer {
    let state = AppState {
        db: DatabaseConnection::default(),
        tokens: test_issuer(),
        otp: OtpSettings::default(),
        signup_role: UserRole::VenueOwner,
        post_ttl: chrono::Duration::hours(24),
        sms: OtpChannel::Log,
        identity: SupabaseIdentityAuthority {
            http: reqwest::Client::new(),
            base_url: "http://127.0.0.1:9".to_owned(),
            service_key: "service-key".to_owned(),
        },
    };
    TestServer::new(build_router(state, "*")).unwrap()
}

#[tokio::test]
async fn should_answer_health_checks() {
    let server = server();

    server.get("/healthz").await.assert_status_ok();
    server.get("/readyz").await.assert_status_ok();
    let body: serde_json::Value = server.get("/api/health").await.json();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn should_reject_request_otp_without_phone() {
    let response = server()
        .post("/api/auth/request-otp")
        .json(&json!({}))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "phone_number is required");
}

#[tokio::test]
async fn should_treat_malformed_body_as_empty() {
    let response = server()
        .post("/api/auth/verify-otp")
        .text("not json")
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "phone_number and code are required");
}

#[tokio::test]
async fn should_require_access_token_for_login_supabase_body() {
    let response = server()
        .post("/api/auth/login-supabase")
        .json(&json!({ "access_token": "" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "access_token is required");
}

#[tokio::test]
async fn should_refresh_access_token_with_refresh_bearer() {
    let auth = MockAuth::new("u-1", UserRole::Anonymous);

    let response = server()
        .post("/api/auth/refresh")
        .authorization_bearer(auth.refresh_token())
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: serde_json::Value = response.json();
    let access = body["access_token"].as_str().unwrap();
    let info = validate_token(access, &MockAuth::secret(), TokenKind::Access).unwrap();
    assert_eq!(info.user_id.as_str(), "u-1");
    assert_eq!(info.role, UserRole::Anonymous);
}

#[tokio::test]
async fn should_reject_access_token_on_refresh() {
    let auth = MockAuth::new("u-1", UserRole::VenueOwner);

    let response = server()
        .post("/api/auth/refresh")
        .authorization_bearer(auth.access_token())
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_reject_expired_refresh_token() {
    let auth = MockAuth::new("u-1", UserRole::VenueOwner);

    let response = server()
        .post("/api/auth/refresh")
        .authorization_bearer(auth.expired_token(TokenKind::Refresh))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["kind"], "TOKEN_EXPIRED");
}

#[tokio::test]
async fn should_reject_malformed_refresh_token() {
    let response = server()
        .post("/api/auth/refresh")
        .authorization_bearer("not-a-jwt")
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_require_bearer_for_me() {
    let response = server().get("/api/auth/me").await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["kind"], "MISSING_TOKEN");
}

#[tokio::test]
async fn should_forbid_venue_creation_for_other_roles() {
    let auth = MockAuth::new("u-1", UserRole::Anonymous);

    let response = server()
        .post("/api/venues")
        .authorization_bearer(auth.access_token())
        .json(&json!({ "name": "Cafe", "type": "cafe", "city": "Kampala", "area": "Kololo" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Forbidden");
}

#[tokio::test]
async fn should_validate_venue_fields_before_store_access() {
    let auth = MockAuth::new("owner-1", UserRole::VenueOwner);

    let response = server()
        .post("/api/venues")
        .authorization_bearer(auth.access_token())
        .json(&json!({ "name": "Cafe" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "name, type, city, area are required");
}

#[tokio::test]
async fn should_forbid_my_venue_for_anonymous() {
    let auth = MockAuth::new("u-1", UserRole::Anonymous);

    let response = server()
        .get("/api/venues/me")
        .authorization_bearer(auth.access_token())
        .await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn should_return_not_found_for_non_uuid_venue_id() {
    let response = server().get("/api/venues/not-a-uuid").await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn should_report_failed_view_tracking_with_ok_status() {
    // The disconnected store makes the procedure call fail.
    let response = server()
        .post(&format!("/api/venues/{}/view", uuid::Uuid::new_v4()))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn should_reject_invalid_optional_bearer_on_view() {
    let response = server()
        .post(&format!("/api/venues/{}/view", uuid::Uuid::new_v4()))
        .authorization_bearer("garbage")
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_name_mistyped_field_in_venue_body() {
    let auth = MockAuth::new("owner-1", UserRole::VenueOwner);

    let response = server()
        .post("/api/venues")
        .authorization_bearer(auth.access_token())
        .json(&json!({
            "name": "Cafe",
            "type": "cafe",
            "city": "Kampala",
            "area": "Kololo",
            "categories": "x",
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["kind"], "VALIDATION");
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("categories"), "got {message}");
}

#[tokio::test]
async fn should_name_mistyped_field_in_otp_body() {
    let response = server()
        .post("/api/auth/verify-otp")
        .json(&json!({ "phone_number": "+256700123456", "code": 123456 }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("code"), "got {message}");
}

#[tokio::test]
async fn should_forbid_post_creation_for_other_roles() {
    let auth = MockAuth::new("u-1", UserRole::Authenticated);

    let response = server()
        .post("/api/posts")
        .authorization_bearer(auth.access_token())
        .json(&json!({ "media_type": "image", "media_url": "https://cdn.example/a.jpg" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn should_require_bearer_to_create_post() {
    let response = server()
        .post("/api/posts")
        .json(&json!({ "media_type": "image", "media_url": "https://cdn.example/a.jpg" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_validate_post_media_before_store_access() {
    let auth = MockAuth::new("owner-1", UserRole::VenueOwner);

    let response = server()
        .post("/api/posts")
        .authorization_bearer(auth.access_token())
        .json(&json!({ "media_type": "gif", "media_url": "https://cdn.example/a.gif" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(
        body["error"],
        "media_type ('image' or 'video') and media_url are required"
    );
}

#[tokio::test]
async fn should_return_not_found_for_non_uuid_post_id() {
    let response = server().get("/api/posts/not-a-uuid").await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json();
    assert_eq!(body["kind"], "POST_NOT_FOUND");
}

#[tokio::test]
async fn should_list_no_posts_for_non_uuid_venue_id() {
    let response = server().get("/api/posts/venue/not-a-uuid").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["posts"], json!([]));
}

#[tokio::test]
async fn should_report_unknown_post_view_as_unsuccessful() {
    let response = server().post("/api/posts/not-a-uuid/view").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn should_require_bearer_to_like_post() {
    let response = server()
        .post(&format!("/api/posts/{}/like", uuid::Uuid::new_v4()))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_require_bearer_to_delete_post() {
    let response = server()
        .delete(&format!("/api/posts/{}", uuid::Uuid::new_v4()))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_forbid_post_deletion_for_other_roles() {
    let auth = MockAuth::new("u-1", UserRole::Anonymous);

    let response = server()
        .delete(&format!("/api/posts/{}", uuid::Uuid::new_v4()))
        .authorization_bearer(auth.access_token())
        .await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}
