use chrono::Utc;
use rand::RngExt;
use tracing::warn;

use hapa_domain::phone::normalize_phone;
use hapa_domain::user::UserRole;

use crate::domain::repository::{OtpCodeRepository, OtpSender, UserRepository};
use crate::domain::types::{OtpCode, OtpSettings};
use crate::error::ApiError;
use crate::usecase::identity::{IdentityResolver, LoginOutput};
use crate::usecase::token::TokenIssuer;

/// Uniform decimal code of exactly `length` digits (no leading zero).
pub fn generate_code(length: u32) -> String {
    let length = length.clamp(1, 18);
    let low = 10u64.pow(length - 1);
    let high = 10u64.pow(length) - 1;
    rand::rng().random_range(low..=high).to_string()
}

fn required(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

// ── RequestOtp ───────────────────────────────────────────────────────────────

pub struct RequestOtpInput {
    pub phone_number: Option<String>,
}

#[derive(Debug)]
pub struct RequestOtpOutput {
    pub phone_number: String,
    /// Present only when the configured channel is the development log sink.
    pub revealed_code: Option<String>,
}

pub struct RequestOtpUseCase<O: OtpCodeRepository, S: OtpSender> {
    pub otp_codes: O,
    pub sender: S,
    pub settings: OtpSettings,
}

impl<O: OtpCodeRepository, S: OtpSender> RequestOtpUseCase<O, S> {
    pub async fn execute(&self, input: RequestOtpInput) -> Result<RequestOtpOutput, ApiError> {
        let raw = required(input.phone_number.as_deref())
            .ok_or_else(|| ApiError::validation("phone_number is required"))?;
        let phone_number = normalize_phone(raw);

        let code = generate_code(self.settings.length);
        let row = OtpCode::new(
            phone_number.clone(),
            code.clone(),
            self.settings.ttl,
            Utc::now(),
        );
        self.otp_codes.create(&row).await?;

        self.sender.send(&phone_number, &code).await;

        Ok(RequestOtpOutput {
            phone_number,
            revealed_code: self.sender.reveals_code().then_some(code),
        })
    }
}

// ── VerifyOtp ────────────────────────────────────────────────────────────────

pub struct VerifyOtpInput {
    pub phone_number: Option<String>,
    pub code: Option<String>,
}

pub struct VerifyOtpUseCase<O: OtpCodeRepository, U: UserRepository> {
    pub otp_codes: O,
    pub users: U,
    pub tokens: TokenIssuer,
    pub settings: OtpSettings,
    pub signup_role: UserRole,
}

impl<O: OtpCodeRepository, U: UserRepository> VerifyOtpUseCase<O, U> {
    pub async fn execute(&self, input: VerifyOtpInput) -> Result<LoginOutput, ApiError> {
        let (Some(raw_phone), Some(code)) = (
            required(input.phone_number.as_deref()),
            required(input.code.as_deref()),
        ) else {
            return Err(ApiError::validation("phone_number and code are required"));
        };
        let phone_number = normalize_phone(raw_phone);

        let otp = self
            .otp_codes
            .find_latest(&phone_number, code)
            .await?
            .ok_or(ApiError::InvalidOtp)?;

        // Counted on every lookup that finds a row, before any rejection.
        let attempts = self.otp_codes.record_attempt(otp.id).await?;
        if self.settings.max_attempts.is_some_and(|max| attempts > max) {
            warn!(otp_id = %otp.id, attempts, "otp attempt limit exceeded");
            return Err(ApiError::InvalidOtp);
        }

        let now = Utc::now();
        if otp.is_expired_at(now) {
            return Err(ApiError::InvalidOtp);
        }

        let resolver = IdentityResolver { users: &self.users };
        let user = resolver
            .resolve_phone(&phone_number, self.signup_role.clone(), now)
            .await?;
        let tokens = self.tokens.issue_pair(&user.id, &user.role)?;
        Ok(LoginOutput { user, tokens })
    }
}
