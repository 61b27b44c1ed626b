use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use tracing::warn;

use crate::domain::repository::IdentityAuthority;
use crate::domain::types::DelegatedIdentity;
use crate::error::ApiError;

#[derive(Deserialize)]
struct AuthUser {
    id: String,
    #[serde(default)]
    is_anonymous: bool,
    #[serde(default)]
    phone: Option<String>,
}

/// Supabase Auth as the external identity authority (`GET /auth/v1/user`).
#[derive(Clone, Debug)]
pub struct SupabaseIdentityAuthority {
    pub http: reqwest::Client,
    pub base_url: String,
    pub service_key: String,
}

impl IdentityAuthority for SupabaseIdentityAuthority {
    async fn verify(&self, bearer_token: &str) -> Result<DelegatedIdentity, ApiError> {
        let url = format!("{}/auth/v1/user", self.base_url.trim_end_matches('/'));
        let resp = self
            .http
            .get(url)
            .header(AUTHORIZATION, format!("Bearer {bearer_token}"))
            .header("apikey", &self.service_key)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "identity authority unreachable");
                ApiError::InvalidToken
            })?;

        if !resp.status().is_success() {
            warn!(status = %resp.status(), "identity authority rejected token");
            return Err(ApiError::InvalidToken);
        }

        let user: AuthUser = resp.json().await.map_err(|e| {
            warn!(error = %e, "identity authority returned an unreadable user");
            ApiError::InvalidToken
        })?;
        if user.id.is_empty() {
            return Err(ApiError::InvalidToken);
        }

        Ok(DelegatedIdentity {
            subject_id: user.id,
            is_anonymous: user.is_anonymous,
            phone: user.phone.filter(|p| !p.is_empty()),
        })
    }
}
