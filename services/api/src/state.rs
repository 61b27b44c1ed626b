use std::time::Duration;

use axum::extract::FromRef;
use sea_orm::DatabaseConnection;

use hapa_auth_types::token::JwtSecret;
use hapa_domain::user::UserRole;

use crate::config::ApiConfig;
use crate::domain::types::OtpSettings;
use crate::infra::db::{
    DbOtpCodeRepository, DbPostRepository, DbUserRepository, DbVenueRepository,
};
use crate::infra::identity::SupabaseIdentityAuthority;
use crate::infra::sms::{OtpChannel, TwilioClient, TwilioCredentials};
use crate::usecase::token::TokenIssuer;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub tokens: TokenIssuer,
    pub otp: OtpSettings,
    pub signup_role: UserRole,
    /// Lifetime of a newly published post.
    pub post_ttl: chrono::Duration,
    pub sms: OtpChannel,
    pub identity: SupabaseIdentityAuthority,
}

impl AppState {
    /// Wire every collaborator from configuration. One HTTP client is shared
    /// by the SMS gateway and the identity authority.
    pub fn from_config(config: &ApiConfig, db: DatabaseConnection) -> Self {
        let http = reqwest::Client::new();
        let tokens = TokenIssuer::new(
            JwtSecret::new(config.jwt_secret_key.clone()),
            Duration::from_secs(config.jwt_access_token_expires_minutes.unsigned_abs() * 60),
            Duration::from_secs(config.jwt_refresh_token_expires_days.unsigned_abs() * 86_400),
        );
        let twilio = TwilioClient {
            http: http.clone(),
            api_base: config.twilio_api_base.clone(),
            credentials: TwilioCredentials::from_parts(
                config.twilio_account_sid.clone(),
                config.twilio_auth_token.clone(),
                config.twilio_from_number.clone(),
            ),
        };
        Self {
            db,
            tokens,
            otp: OtpSettings {
                length: config.otp_length,
                ttl: chrono::Duration::minutes(config.otp_ttl_minutes),
                max_attempts: config.otp_max_attempts,
            },
            signup_role: config.phone_signup_role.clone(),
            post_ttl: chrono::Duration::hours(config.post_ttl_hours),
            sms: OtpChannel::from_provider(config.sms_provider(), twilio),
            identity: SupabaseIdentityAuthority {
                http,
                base_url: config.supabase_url.clone(),
                service_key: config.supabase_service_key.clone(),
            },
        }
    }

    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn otp_code_repo(&self) -> DbOtpCodeRepository {
        DbOtpCodeRepository {
            db: self.db.clone(),
        }
    }

    pub fn venue_repo(&self) -> DbVenueRepository {
        DbVenueRepository {
            db: self.db.clone(),
        }
    }

    pub fn post_repo(&self) -> DbPostRepository {
        DbPostRepository {
            db: self.db.clone(),
        }
    }

    pub fn otp_sender(&self) -> OtpChannel {
        self.sms.clone()
    }

    pub fn identity_authority(&self) -> SupabaseIdentityAuthority {
        self.identity.clone()
    }
}

impl FromRef<AppState> for JwtSecret {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.secret().clone()
    }
}
