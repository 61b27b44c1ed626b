//! JWT signing and validation for access and refresh tokens.

use std::fmt;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use hapa_domain::id::UserId;
use hapa_domain::user::UserRole;

/// Which half of a token pair a JWT is. Serialized as the `type` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT claims payload shared by issuance and validation.
///
/// | Field  | JWT claim | Meaning                               |
/// |--------|-----------|---------------------------------------|
/// | `sub`  | `sub`     | user id                               |
/// | `role` | custom    | [`UserRole`] at issuance time         |
/// | `kind` | `type`    | `access` or `refresh`                 |
/// | `iat`  | `iat`     | issue time, seconds since UNIX epoch  |
/// | `exp`  | `exp`     | expiry, seconds since UNIX epoch      |
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub role: UserRole,
    #[serde(rename = "type")]
    pub kind: TokenKind,
    pub iat: u64,
    pub exp: u64,
}

/// Identity extracted from a validated token.
#[derive(Debug, Clone)]
pub struct TokenInfo {
    pub user_id: UserId,
    pub role: UserRole,
    pub kind: TokenKind,
    pub issued_at: u64,
    pub expires_at: u64,
}

/// Errors returned by [`validate_token`].
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
    #[error("expected {expected:?} token")]
    WrongKind { expected: TokenKind },
}

/// HMAC secret shared by every signer and validator in the process.
///
/// Cheap to clone. `Debug` never prints the key material.
#[derive(Clone)]
pub struct JwtSecret(Arc<str>);

impl JwtSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(Arc::from(secret.into()))
    }

    fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for JwtSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("JwtSecret(..)")
    }
}

/// Current wall-clock time in whole seconds since the UNIX epoch.
pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Sign claims with HS256.
pub fn sign(
    claims: &JwtClaims,
    secret: &JwtSecret,
) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Decode and validate a JWT, returning raw claims.
///
/// HS256, zero leeway, required claims `exp` + `sub`. A token is live only
/// while `now < exp`.
fn decode_jwt(token: &str, secret: &JwtSecret) -> Result<JwtClaims, AuthError> {
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = 0;
    validation.required_spec_claims.clear();
    validation.set_required_spec_claims(&["exp", "sub"]);

    let data = decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature
        | jsonwebtoken::errors::ErrorKind::InvalidEcdsaKey
        | jsonwebtoken::errors::ErrorKind::InvalidRsaKey(_) => AuthError::InvalidSignature,
        _ => AuthError::Malformed,
    })?;

    if data.claims.exp <= now_secs() {
        return Err(AuthError::Expired);
    }
    Ok(data.claims)
}

/// Validate a token of the expected kind and return the identity it carries.
pub fn validate_token(
    token: &str,
    secret: &JwtSecret,
    expected: TokenKind,
) -> Result<TokenInfo, AuthError> {
    let claims = decode_jwt(token, secret)?;
    if claims.kind != expected {
        return Err(AuthError::WrongKind { expected });
    }
    Ok(TokenInfo {
        user_id: UserId(claims.sub),
        role: claims.role,
        kind: claims.kind,
        issued_at: claims.iat,
        expires_at: claims.exp,
    })
}
