//! HTTP client for the Kitob auth service, including the status-polling loop
//! used by the reading apps while a Telegram login is in flight.

use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use uuid::Uuid;

use kitob_domain::user::PublicUser;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed")]
    Http(#[from] reqwest::Error),
    /// The service answered with its error contract (`{"error": ...}`).
    #[error("{message}")]
    Api { status: StatusCode, message: String },
    #[error("login was not completed in time")]
    TimedOut,
}

/// Result of a single status probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthStatus {
    /// Not completed yet; carries the raw server-reported status.
    InProgress(String),
    Completed(PublicUser),
}

/// Receipt for an issued SMS code.
#[derive(Debug, Clone, Deserialize)]
pub struct OtpTicket {
    pub request_id: Uuid,
    pub expires_in_seconds: i64,
    pub retry_after_seconds: i64,
}

#[derive(Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
    poll_interval: Duration,
    poll_attempts: u32,
}

impl AuthClient {
    /// Defaults to the production polling contract: one probe per second,
    /// sixty attempts, then give up.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            poll_interval: Duration::from_secs(1),
            poll_attempts: 60,
        }
    }

    /// Override the polling cadence (tests shrink it).
    pub fn with_polling(mut self, interval: Duration, attempts: u32) -> Self {
        self.poll_interval = interval;
        self.poll_attempts = attempts;
        self
    }

    pub async fn create_auth_request(&self) -> Result<Uuid, ClientError> {
        #[derive(Deserialize)]
        struct Body {
            request_uuid: Uuid,
        }
        let response = self
            .http
            .post(format!("{}/api/create-auth-request", self.base_url))
            .send()
            .await?;
        let response = check_api(response).await?;
        Ok(response.json::<Body>().await?.request_uuid)
    }

    pub async fn check_auth(&self, request_id: Uuid) -> Result<AuthStatus, ClientError> {
        #[derive(Deserialize)]
        struct Body {
            status: String,
            user: Option<PublicUser>,
        }
        let response = self
            .http
            .get(format!("{}/api/check-auth", self.base_url))
            .query(&[("request_uuid", request_id.to_string())])
            .send()
            .await?;
        let response = check_api(response).await?;
        let body: Body = response.json().await?;
        match (body.status.as_str(), body.user) {
            ("completed", Some(user)) => Ok(AuthStatus::Completed(user)),
            _ => Ok(AuthStatus::InProgress(body.status)),
        }
    }

    /// Poll until the handshake completes: one sequential probe per interval,
    /// up to the attempt budget, then a timeout error.
    ///
    /// Transient probe failures do not abort the loop; the attempt budget is
    /// the only deadline. Cancellation is dropping the future: the server-side
    /// request is simply abandoned and harmlessly stays `pending` (there is no
    /// cancellation call in the protocol).
    pub async fn poll_until_complete(&self, request_id: Uuid) -> Result<PublicUser, ClientError> {
        for attempt in 0..self.poll_attempts {
            if attempt > 0 {
                tokio::time::sleep(self.poll_interval).await;
            }
            if let Ok(AuthStatus::Completed(user)) = self.check_auth(request_id).await {
                return Ok(user);
            }
        }
        Err(ClientError::TimedOut)
    }

    pub async fn request_otp(&self, phone: &str) -> Result<OtpTicket, ClientError> {
        let response = self
            .http
            .post(format!("{}/api/auth/sms/request-otp", self.base_url))
            .json(&serde_json::json!({ "phone": phone }))
            .send()
            .await?;
        let response = check_api(response).await?;
        Ok(response.json().await?)
    }

    pub async fn verify_otp(&self, phone: &str, code: &str) -> Result<PublicUser, ClientError> {
        #[derive(Deserialize)]
        struct Body {
            user: PublicUser,
        }
        let response = self
            .http
            .post(format!("{}/api/auth/sms/verify-otp", self.base_url))
            .json(&serde_json::json!({ "phone": phone, "code": code }))
            .send()
            .await?;
        let response = check_api(response).await?;
        Ok(response.json::<Body>().await?.user)
    }

    pub async fn get_user(&self, id: Uuid) -> Result<PublicUser, ClientError> {
        let response = self
            .http
            .get(format!("{}/api/user", self.base_url))
            .query(&[("id", id.to_string())])
            .send()
            .await?;
        let response = check_api(response).await?;
        Ok(response.json().await?)
    }
}

async fn check_api(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    if response.status().is_success() {
        return Ok(response);
    }
    #[derive(Deserialize)]
    struct ErrorBody {
        error: String,
    }
    let status = response.status();
    let message = response
        .json::<ErrorBody>()
        .await
        .map(|b| b.error)
        .unwrap_or_else(|_| status.to_string());
    Err(ClientError::Api { status, message })
}
