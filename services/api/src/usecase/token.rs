use std::time::Duration;

use hapa_auth_types::token::{JwtClaims, JwtSecret, TokenInfo, TokenKind, now_secs, sign};
use hapa_domain::id::UserId;
use hapa_domain::user::UserRole;

use crate::error::ApiError;

/// Freshly minted access/refresh pair.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Mints HS256 tokens carrying `sub`, `role` and a `type` tag.
#[derive(Clone, Debug)]
pub struct TokenIssuer {
    secret: JwtSecret,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: JwtSecret, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            secret,
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn secret(&self) -> &JwtSecret {
        &self.secret
    }

    pub fn issue_pair(&self, user_id: &UserId, role: &UserRole) -> Result<TokenPair, ApiError> {
        self.issue_pair_at(user_id, role, now_secs())
    }

    /// Pair issued at `now` (seconds since epoch); expiries are `now + ttl` exactly.
    pub fn issue_pair_at(
        &self,
        user_id: &UserId,
        role: &UserRole,
        now: u64,
    ) -> Result<TokenPair, ApiError> {
        Ok(TokenPair {
            access_token: self.mint(user_id, role, TokenKind::Access, now)?,
            refresh_token: self.mint(user_id, role, TokenKind::Refresh, now)?,
        })
    }

    /// New access token from a validated refresh token.
    ///
    /// The role comes from the refresh token itself, not from storage.
    pub fn refresh(&self, claims: &TokenInfo) -> Result<String, ApiError> {
        if claims.kind != TokenKind::Refresh {
            return Err(ApiError::InvalidRefreshToken);
        }
        self.mint(&claims.user_id, &claims.role, TokenKind::Access, now_secs())
    }

    fn mint(
        &self,
        user_id: &UserId,
        role: &UserRole,
        kind: TokenKind,
        now: u64,
    ) -> Result<String, ApiError> {
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        let claims = JwtClaims {
            sub: user_id.to_string(),
            role: role.clone(),
            kind,
            iat: now,
            exp: now + ttl.as_secs(),
        };
        sign(&claims, &self.secret).map_err(|e| ApiError::Internal(e.into()))
    }
}
