//! OTP delivery channels.
//!
//! The Twilio channel never surfaces a failure: missing credentials, transport
//! errors and non-2xx answers are logged and the code goes to the log sink.

use anyhow::Context as _;
use tracing::{error, info, warn};

use crate::config::SmsProvider;
use crate::domain::repository::OtpSender;

fn message_body(code: &str) -> String {
    format!("Your HAPA verification code is {code}")
}

fn log_code(phone_number: &str, code: &str) {
    info!(phone_number, code, "otp issued (log channel)");
}

/// Account credentials for the Twilio Messages API.
#[derive(Clone)]
pub struct TwilioCredentials {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
}

impl TwilioCredentials {
    /// All three settings, or `None` when any is missing or blank.
    pub fn from_parts(
        account_sid: Option<String>,
        auth_token: Option<String>,
        from_number: Option<String>,
    ) -> Option<Self> {
        let filled = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        Some(Self {
            account_sid: filled(account_sid)?,
            auth_token: filled(auth_token)?,
            from_number: filled(from_number)?,
        })
    }
}

impl std::fmt::Debug for TwilioCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwilioCredentials")
            .field("account_sid", &self.account_sid)
            .field("from_number", &self.from_number)
            .finish_non_exhaustive()
    }
}

/// Minimal client for `POST /2010-04-01/Accounts/{sid}/Messages.json`.
#[derive(Clone, Debug)]
pub struct TwilioClient {
    pub http: reqwest::Client,
    pub api_base: String,
    pub credentials: Option<TwilioCredentials>,
}

impl TwilioClient {
    pub async fn send_message(&self, to: &str, body: &str) -> anyhow::Result<()> {
        let creds = self
            .credentials
            .as_ref()
            .context("twilio credentials are not configured")?;
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_base.trim_end_matches('/'),
            creds.account_sid
        );
        let form = [
            ("To", to),
            ("From", creds.from_number.as_str()),
            ("Body", body),
        ];
        let resp = self
            .http
            .post(url)
            .basic_auth(&creds.account_sid, Some(&creds.auth_token))
            .form(&form)
            .send()
            .await
            .context("twilio request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            anyhow::bail!("twilio returned {status}: {detail}");
        }
        Ok(())
    }
}

/// Channel selected by `SMS_PROVIDER`.
#[derive(Clone, Debug)]
pub enum OtpChannel {
    Log,
    Twilio(TwilioClient),
    /// Unrecognised provider: dispatch through the log sink without revealing the code.
    Fallback,
}

impl OtpChannel {
    pub fn from_provider(provider: SmsProvider, twilio: TwilioClient) -> Self {
        match provider {
            SmsProvider::Log => Self::Log,
            SmsProvider::Twilio => Self::Twilio(twilio),
            SmsProvider::Unknown(name) => {
                warn!(sms_provider = %name, "unknown SMS_PROVIDER, falling back to log channel");
                Self::Fallback
            }
        }
    }
}

impl OtpSender for OtpChannel {
    async fn send(&self, phone_number: &str, code: &str) {
        match self {
            Self::Log | Self::Fallback => log_code(phone_number, code),
            Self::Twilio(client) => {
                if let Err(e) = client.send_message(phone_number, &message_body(code)).await {
                    error!(error = format!("{e:#}"), phone_number, "sms dispatch failed, using log channel");
                    log_code(phone_number, code);
                }
            }
        }
    }

    fn reveals_code(&self) -> bool {
        matches!(self, Self::Log)
    }
}
