//! Token minting for integration tests.
//!
//! Routes authenticate with `Authorization: Bearer <jwt>`. `MockAuth` signs
//! tokens with the test secret so requests can skip the OTP flow entirely.

use hapa_auth_types::token::{JwtClaims, JwtSecret, TokenKind, now_secs, sign};
use hapa_domain::id::UserId;
use hapa_domain::user::UserRole;

/// Shared secret used by test app states and [`MockAuth`].
pub const TEST_JWT_SECRET: &str = "test-jwt-secret-for-unit-tests-only";

/// Configurable identity for test requests.
pub struct MockAuth {
    pub user_id: UserId,
    pub role: UserRole,
}

impl MockAuth {
    pub fn new(user_id: impl Into<UserId>, role: UserRole) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }

    pub fn secret() -> JwtSecret {
        JwtSecret::new(TEST_JWT_SECRET)
    }

    /// Access token valid for one hour.
    pub fn access_token(&self) -> String {
        self.token(TokenKind::Access, now_secs() + 3600)
    }

    /// Refresh token valid for one day.
    pub fn refresh_token(&self) -> String {
        self.token(TokenKind::Refresh, now_secs() + 86_400)
    }

    /// Token of the given kind that expired an hour ago.
    pub fn expired_token(&self, kind: TokenKind) -> String {
        self.token(kind, now_secs().saturating_sub(3600))
    }

    pub fn token(&self, kind: TokenKind, exp: u64) -> String {
        let claims = JwtClaims {
            sub: self.user_id.to_string(),
            role: self.role.clone(),
            kind,
            iat: now_secs(),
            exp,
        };
        sign(&claims, &Self::secret()).expect("signing with HS256 cannot fail")
    }
}
