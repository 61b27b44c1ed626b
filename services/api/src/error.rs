use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// API service error variants.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("Invalid or expired code")]
    InvalidOtp,
    #[error("invalid token")]
    InvalidToken,
    #[error("invalid refresh token")]
    InvalidRefreshToken,
    #[error("Forbidden")]
    Forbidden,
    #[error("User not found")]
    UserNotFound,
    #[error("Venue not found")]
    VenueNotFound,
    #[error("Venue not found or not owned by user")]
    VenueNotOwned,
    #[error("Post not found")]
    PostNotFound,
    #[error("Unauthorized to delete this post")]
    PostNotOwned,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION",
            Self::InvalidOtp => "INVALID_OTP",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::InvalidRefreshToken => "INVALID_REFRESH_TOKEN",
            Self::Forbidden | Self::PostNotOwned => "FORBIDDEN",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::VenueNotFound | Self::VenueNotOwned => "VENUE_NOT_FOUND",
            Self::PostNotFound => "POST_NOT_FOUND",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidOtp => StatusCode::BAD_REQUEST,
            Self::InvalidToken | Self::InvalidRefreshToken => StatusCode::UNAUTHORIZED,
            Self::Forbidden | Self::PostNotOwned => StatusCode::FORBIDDEN,
            Self::UserNotFound
            | Self::VenueNotFound
            | Self::VenueNotOwned
            | Self::PostNotFound => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // TraceLayer already records every status; only 500s carry a cause worth logging.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = format!("{e:#}"), kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "error": self.to_string(),
            "kind": self.kind(),
        });
        (self.status(), axum::Json(body)).into_response()
    }
}
