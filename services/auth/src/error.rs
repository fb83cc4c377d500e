use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Auth service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    #[error("invalid phone number format")]
    InvalidPhone,
    #[error("invalid code format")]
    InvalidCode,
    #[error("no active code for this phone")]
    NoActiveCode,
    #[error("incorrect code")]
    WrongCode,
    #[error("code has expired")]
    CodeExpired,
    #[error("too many incorrect attempts")]
    TooManyAttempts,
    #[error("wait before requesting another code")]
    Cooldown { retry_after_seconds: i64 },
    #[error("hourly SMS limit reached for this phone")]
    HourlyLimitReached,
    #[error("daily SMS limit reached for this phone")]
    DailyLimitReached,
    #[error("too many requests from this address")]
    IpLimitReached,
    #[error("request not found")]
    RequestNotFound,
    #[error("user not found")]
    UserNotFound,
    #[error("failed to send SMS")]
    SmsDispatch(#[source] anyhow::Error),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl AuthServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidPhone => "INVALID_PHONE",
            Self::InvalidCode => "INVALID_CODE",
            Self::NoActiveCode => "NO_ACTIVE_CODE",
            Self::WrongCode => "WRONG_CODE",
            Self::CodeExpired => "CODE_EXPIRED",
            Self::TooManyAttempts => "TOO_MANY_ATTEMPTS",
            Self::Cooldown { .. } => "COOLDOWN",
            Self::HourlyLimitReached => "HOURLY_LIMIT",
            Self::DailyLimitReached => "DAILY_LIMIT",
            Self::IpLimitReached => "IP_LIMIT",
            Self::RequestNotFound => "REQUEST_NOT_FOUND",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::SmsDispatch(_) => "SMS_DISPATCH",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for AuthServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::InvalidPhone
            | Self::InvalidCode
            | Self::NoActiveCode
            | Self::WrongCode
            | Self::CodeExpired => StatusCode::BAD_REQUEST,
            Self::TooManyAttempts
            | Self::Cooldown { .. }
            | Self::HourlyLimitReached
            | Self::DailyLimitReached
            | Self::IpLimitReached => StatusCode::TOO_MANY_REQUESTS,
            Self::RequestNotFound | Self::UserNotFound => StatusCode::NOT_FOUND,
            Self::SmsDispatch(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Log 500s only — tower-http TraceLayer already records method/uri/status
        // for all requests. 4xx are expected client errors; logging them here
        // would be noise. Upstream and storage failures need their error chains
        // logged so the root cause is traceable; clients only ever see the
        // generic message.
        match &self {
            Self::SmsDispatch(e) => {
                tracing::error!(error = %e, kind = "SMS_DISPATCH", "sms dispatch failed");
            }
            Self::Internal(e) => {
                tracing::error!(error = %e, kind = "INTERNAL", "internal error");
            }
            _ => {}
        }
        let body = match &self {
            Self::Cooldown {
                retry_after_seconds,
            } => serde_json::json!({
                "error": self.to_string(),
                "retry_after_seconds": retry_after_seconds,
            }),
            _ => serde_json::json!({ "error": self.to_string() }),
        };
        (status, axum::Json(body)).into_response()
    }
}
