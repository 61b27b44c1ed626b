use serde::Deserialize;

use hapa_core::config::Config;
use hapa_domain::user::UserRole;

/// OTP dispatch channel selected by `SMS_PROVIDER`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmsProvider {
    /// Log the code; development only.
    Log,
    Twilio,
    /// Unrecognised value. Dispatches like `Log` but never reveals the code.
    Unknown(String),
}

impl SmsProvider {
    pub fn from_setting(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "log" => Self::Log,
            "twilio" => Self::Twilio,
            other => Self::Unknown(other.to_owned()),
        }
    }
}

/// API service configuration loaded from environment variables (and `.env`).
#[derive(Debug, Deserialize)]
pub struct ApiConfig {
    /// Postgres connection URL of the managed backend.
    pub database_url: String,
    /// HMAC secret for signing access and refresh tokens.
    pub jwt_secret_key: String,
    #[serde(default = "default_access_minutes")]
    pub jwt_access_token_expires_minutes: i64,
    #[serde(default = "default_refresh_days")]
    pub jwt_refresh_token_expires_days: i64,
    #[serde(default = "default_otp_ttl_minutes")]
    pub otp_ttl_minutes: i64,
    /// Number of decimal digits in an OTP (1..=18).
    #[serde(default = "default_otp_length")]
    pub otp_length: u32,
    /// Reject a code once it has been tried more than this many times. Unset = no lockout.
    #[serde(default)]
    pub otp_max_attempts: Option<i32>,
    /// How long a published post stays in feeds.
    #[serde(default = "default_post_ttl_hours")]
    pub post_ttl_hours: i64,
    /// Role given to users created by phone verification.
    #[serde(default = "default_phone_signup_role")]
    pub phone_signup_role: UserRole,
    #[serde(default = "default_sms_provider")]
    pub sms_provider: String,
    #[serde(default)]
    pub twilio_account_sid: Option<String>,
    #[serde(default)]
    pub twilio_auth_token: Option<String>,
    #[serde(default)]
    pub twilio_from_number: Option<String>,
    #[serde(default = "default_twilio_api_base")]
    pub twilio_api_base: String,
    /// Base URL of the external identity authority (Supabase project URL).
    pub supabase_url: String,
    pub supabase_service_key: String,
    /// `*` or a comma-separated list of allowed origins.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: String,
    /// TCP port to listen on. Env var: `API_PORT`.
    #[serde(default = "default_api_port")]
    pub api_port: u16,
}

impl Config for ApiConfig {}

impl ApiConfig {
    pub fn sms_provider(&self) -> SmsProvider {
        SmsProvider::from_setting(&self.sms_provider)
    }

    /// Reject values the rest of the service cannot work with.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            (1..=18).contains(&self.otp_length),
            "OTP_LENGTH must be between 1 and 18, got {}",
            self.otp_length
        );
        anyhow::ensure!(self.otp_ttl_minutes > 0, "OTP_TTL_MINUTES must be positive");
        if let Some(max) = self.otp_max_attempts {
            anyhow::ensure!(max >= 1, "OTP_MAX_ATTEMPTS must be at least 1, got {max}");
        }
        anyhow::ensure!(self.post_ttl_hours > 0, "POST_TTL_HOURS must be positive");
        anyhow::ensure!(
            self.jwt_access_token_expires_minutes > 0,
            "JWT_ACCESS_TOKEN_EXPIRES_MINUTES must be positive"
        );
        anyhow::ensure!(
            self.jwt_refresh_token_expires_days > 0,
            "JWT_REFRESH_TOKEN_EXPIRES_DAYS must be positive"
        );
        anyhow::ensure!(
            !self.jwt_secret_key.is_empty(),
            "JWT_SECRET_KEY must not be empty"
        );
        Ok(())
    }
}

fn default_access_minutes() -> i64 {
    60
}

fn default_refresh_days() -> i64 {
    30
}

fn default_otp_ttl_minutes() -> i64 {
    5
}

fn default_otp_length() -> u32 {
    5
}

fn default_post_ttl_hours() -> i64 {
    24
}

fn default_phone_signup_role() -> UserRole {
    UserRole::VenueOwner
}

fn default_sms_provider() -> String {
    "log".to_owned()
}

fn default_twilio_api_base() -> String {
    "https://api.twilio.com".to_owned()
}

fn default_cors_origins() -> String {
    "*".to_owned()
}

fn default_api_port() -> u16 {
    5000
}
