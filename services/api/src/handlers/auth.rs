use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};

use hapa_auth_types::bearer::{AccessClaims, RefreshClaims};

use crate::error::ApiError;
use crate::handlers::json_body;
use crate::handlers::dto::{LoginResponse, UserResponse};
use crate::state::AppState;
use crate::usecase::identity::{DelegatedLoginInput, DelegatedLoginUseCase};
use crate::usecase::otp::{RequestOtpInput, RequestOtpUseCase, VerifyOtpInput, VerifyOtpUseCase};
use crate::usecase::user::GetUserUseCase;

// ── POST /api/auth/request-otp ────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct RequestOtpRequest {
    pub phone_number: Option<String>,
}

#[derive(Serialize)]
pub struct RequestOtpResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otp: Option<String>,
}

pub async fn request_otp(
    State(state): State<AppState>,
    body: Result<Json<RequestOtpRequest>, JsonRejection>,
) -> Result<Json<RequestOtpResponse>, ApiError> {
    let body = json_body(body)?;
    let usecase = RequestOtpUseCase {
        otp_codes: state.otp_code_repo(),
        sender: state.otp_sender(),
        settings: state.otp,
    };

    let out = usecase
        .execute(RequestOtpInput {
            phone_number: body.phone_number,
        })
        .await?;

    Ok(Json(RequestOtpResponse {
        success: true,
        otp: out.revealed_code,
    }))
}

// ── POST /api/auth/verify-otp ─────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct VerifyOtpRequest {
    pub phone_number: Option<String>,
    pub code: Option<String>,
}

pub async fn verify_otp(
    State(state): State<AppState>,
    body: Result<Json<VerifyOtpRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let body = json_body(body)?;
    let usecase = VerifyOtpUseCase {
        otp_codes: state.otp_code_repo(),
        users: state.user_repo(),
        tokens: state.tokens.clone(),
        settings: state.otp,
        signup_role: state.signup_role.clone(),
    };

    let out = usecase
        .execute(VerifyOtpInput {
            phone_number: body.phone_number,
            code: body.code,
        })
        .await?;

    Ok(Json(out.into()))
}

// ── POST /api/auth/refresh ────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
}

pub async fn refresh(
    State(state): State<AppState>,
    RefreshClaims(claims): RefreshClaims,
) -> Result<Json<RefreshResponse>, ApiError> {
    let access_token = state.tokens.refresh(&claims)?;
    Ok(Json(RefreshResponse { access_token }))
}

// ── GET /api/auth/me ──────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct MeResponse {
    pub user: UserResponse,
}

pub async fn me(
    State(state): State<AppState>,
    AccessClaims(claims): AccessClaims,
) -> Result<Json<MeResponse>, ApiError> {
    let usecase = GetUserUseCase {
        users: state.user_repo(),
    };
    let user = usecase.execute(&claims.user_id).await?;
    Ok(Json(MeResponse { user: user.into() }))
}

// ── POST /api/auth/login-supabase ─────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct DelegatedLoginRequest {
    pub access_token: Option<String>,
}

pub async fn login_supabase(
    State(state): State<AppState>,
    body: Result<Json<DelegatedLoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let body = json_body(body)?;
    let usecase = DelegatedLoginUseCase {
        authority: state.identity_authority(),
        users: state.user_repo(),
        tokens: state.tokens.clone(),
    };

    let out = usecase
        .execute(DelegatedLoginInput {
            access_token: body.access_token,
        })
        .await?;

    Ok(Json(out.into()))
}
