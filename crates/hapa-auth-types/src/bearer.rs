//! `Authorization: Bearer` extractors.
//!
//! The signing secret is pulled from handler state through [`FromRef`], so any
//! state type that can hand out a [`JwtSecret`] can use these extractors.

use axum::extract::{FromRef, FromRequestParts, OptionalFromRequestParts};
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use http::header::AUTHORIZATION;
use http::request::Parts;

use crate::token::{AuthError, JwtSecret, TokenInfo, TokenKind, validate_token};

/// Identity from a valid, unexpired access token.
#[derive(Debug, Clone)]
pub struct AccessClaims(pub TokenInfo);

/// Identity from a valid, unexpired refresh token.
#[derive(Debug, Clone)]
pub struct RefreshClaims(pub TokenInfo);

/// Rejection for the bearer extractors. Always 401.
#[derive(Debug, thiserror::Error)]
pub enum BearerRejection {
    #[error("missing authorization header")]
    Missing,
    #[error("token has expired")]
    Expired,
    #[error("invalid token")]
    Invalid(AuthError),
}

impl BearerRejection {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Missing => "MISSING_TOKEN",
            Self::Expired => "TOKEN_EXPIRED",
            Self::Invalid(_) => "INVALID_TOKEN",
        }
    }
}

impl From<AuthError> for BearerRejection {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Expired => Self::Expired,
            other => Self::Invalid(other),
        }
    }
}

impl IntoResponse for BearerRejection {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.to_string(),
            "kind": self.kind(),
        });
        (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response()
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

fn extract(parts: &Parts, secret: &JwtSecret, kind: TokenKind) -> Result<TokenInfo, BearerRejection> {
    let token = bearer_token(parts).ok_or(BearerRejection::Missing)?;
    Ok(validate_token(token, secret, kind)?)
}

// axum-core 0.5 declares these as `fn -> impl Future + Send`. Validation is
// synchronous, so the work happens up front and a 'static ready future is returned.

impl<S> FromRequestParts<S> for AccessClaims
where
    JwtSecret: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = BearerRejection;

    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let result = extract(parts, &JwtSecret::from_ref(state), TokenKind::Access).map(Self);
        async move { result }
    }
}

/// Missing header yields `None`; a present but invalid token is still rejected.
impl<S> OptionalFromRequestParts<S> for AccessClaims
where
    JwtSecret: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = BearerRejection;

    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Option<Self>, Self::Rejection>> + Send {
        let result = match bearer_token(parts) {
            None => Ok(None),
            Some(token) => validate_token(token, &JwtSecret::from_ref(state), TokenKind::Access)
                .map(|info| Some(Self(info)))
                .map_err(BearerRejection::from),
        };
        async move { result }
    }
}

impl<S> FromRequestParts<S> for RefreshClaims
where
    JwtSecret: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = BearerRejection;

    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let result = extract(parts, &JwtSecret::from_ref(state), TokenKind::Refresh).map(Self);
        async move { result }
    }
}
