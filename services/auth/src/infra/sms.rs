use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use crate::domain::repository::OtpSender;
use crate::error::AuthServiceError;

/// Assumed gateway session lifetime for a freshly issued bearer token.
const TOKEN_TTL_SECS: i64 = 30 * 60;

/// Tokens are refreshed this long before the assumed deadline, so a token
/// the gateway is about to reject is never used for a send.
const TOKEN_REFRESH_MARGIN_SECS: i64 = 5 * 60;

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Explicit bearer-token cache, dependency-injected into the gateway client
/// rather than living in a process-wide global.
///
/// The mutex guards only the read/swap of the slot and is never held across
/// I/O. Two callers that both observe a stale token will both log in again;
/// the duplicate refresh wastes one gateway call but is safe — the login is
/// idempotent and the last write wins.
#[derive(Default)]
pub struct TokenCache {
    slot: Mutex<Option<CachedToken>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn fresh(&self, now: DateTime<Utc>) -> Option<String> {
        let slot = self.slot.lock().unwrap();
        slot.as_ref()
            .filter(|c| c.expires_at > now + Duration::seconds(TOKEN_REFRESH_MARGIN_SECS))
            .map(|c| c.token.clone())
    }

    fn store(&self, token: String, now: DateTime<Utc>) {
        let mut slot = self.slot.lock().unwrap();
        *slot = Some(CachedToken {
            token,
            expires_at: now + Duration::seconds(TOKEN_TTL_SECS),
        });
    }
}

/// Eskiz gateway settings (credentials are validated at startup by
/// `AuthConfig::from_env`).
#[derive(Debug, Clone)]
pub struct EskizConfig {
    pub base_url: String,
    pub email: String,
    pub password: String,
    pub sender: String,
    pub callback_url: Option<String>,
}

#[derive(Deserialize)]
struct LoginResponse {
    data: LoginData,
}

#[derive(Deserialize)]
struct LoginData {
    token: String,
}

#[derive(Deserialize)]
struct SendResponse {
    status: Option<String>,
}

/// HTTP client for the Eskiz SMS gateway.
///
/// Failures are hard errors surfaced to the caller — never retried here,
/// since repeated sends cost money and risk delivering duplicate codes.
#[derive(Clone)]
pub struct EskizClient {
    http: reqwest::Client,
    config: EskizConfig,
    tokens: Arc<TokenCache>,
}

impl EskizClient {
    pub fn new(config: EskizConfig, tokens: Arc<TokenCache>) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            tokens,
        }
    }

    async fn bearer_token(&self) -> Result<String, AuthServiceError> {
        if let Some(token) = self.tokens.fresh(Utc::now()) {
            return Ok(token);
        }

        let response = self
            .http
            .post(format!("{}/api/auth/login", self.config.base_url))
            .form(&[
                ("email", self.config.email.as_str()),
                ("password", self.config.password.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                AuthServiceError::SmsDispatch(anyhow::Error::new(e).context("eskiz login request"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AuthServiceError::SmsDispatch(anyhow!(
                "eskiz login rejected ({status}): {body}"
            )));
        }

        let body: LoginResponse = response.json().await.map_err(|e| {
            AuthServiceError::SmsDispatch(anyhow::Error::new(e).context("eskiz login response"))
        })?;

        self.tokens.store(body.data.token.clone(), Utc::now());
        Ok(body.data.token)
    }
}

impl OtpSender for EskizClient {
    async fn send_code(&self, phone: &str, code: &str) -> Result<(), AuthServiceError> {
        let token = self.bearer_token().await?;

        let message =
            format!("Kitob ilovasi uchun tasdiqlash kodi: {code}. Kod 5 daqiqa amal qiladi.");
        let mobile_phone = phone.trim_start_matches('+');
        let callback_url = self.config.callback_url.as_deref().unwrap_or_default();

        let response = self
            .http
            .post(format!("{}/api/message/sms/send", self.config.base_url))
            .bearer_auth(&token)
            .form(&[
                ("mobile_phone", mobile_phone),
                ("message", message.as_str()),
                ("from", self.config.sender.as_str()),
                ("callback_url", callback_url),
            ])
            .send()
            .await
            .map_err(|e| {
                AuthServiceError::SmsDispatch(anyhow::Error::new(e).context("eskiz send request"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AuthServiceError::SmsDispatch(anyhow!(
                "eskiz send failed ({status}): {body}"
            )));
        }

        let body: SendResponse = response.json().await.map_err(|e| {
            AuthServiceError::SmsDispatch(anyhow::Error::new(e).context("eskiz send response"))
        })?;

        match body.status.as_deref() {
            Some("waiting") | Some("success") => Ok(()),
            other => Err(AuthServiceError::SmsDispatch(anyhow!(
                "eskiz rejected message: status {other:?}"
            ))),
        }
    }
}
