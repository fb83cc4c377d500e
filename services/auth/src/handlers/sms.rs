use std::net::SocketAddr;

use axum::{
    Json,
    extract::{ConnectInfo, State},
    http::HeaderMap,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use kitob_domain::user::PublicUser;

use crate::error::AuthServiceError;
use crate::state::AppState;
use crate::usecase::otp::{RequestOtpInput, RequestOtpUseCase, VerifyOtpInput, VerifyOtpUseCase};

/// Client IP for the per-source rate limit: first `x-forwarded-for` hop when
/// behind the reverse proxy, else the socket peer.
fn client_ip(headers: &HeaderMap, peer: SocketAddr) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| peer.ip().to_string())
}

// ── POST /api/auth/sms/request-otp ───────────────────────────────────────────

#[derive(Deserialize)]
pub struct RequestOtpRequest {
    pub phone: String,
}

#[derive(Serialize)]
pub struct RequestOtpResponse {
    pub ok: bool,
    pub request_id: Uuid,
    pub expires_in_seconds: i64,
    pub retry_after_seconds: i64,
}

pub async fn request_otp(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(body): Json<RequestOtpRequest>,
) -> Result<Json<RequestOtpResponse>, AuthServiceError> {
    let usecase = RequestOtpUseCase {
        otp_requests: state.otp_repo(),
        sms: state.sms.clone(),
        otp_salt: state.otp_salt.clone(),
    };
    let out = usecase
        .execute(RequestOtpInput {
            phone: body.phone,
            ip_address: client_ip(&headers, peer),
        })
        .await?;
    Ok(Json(RequestOtpResponse {
        ok: true,
        request_id: out.request_id,
        expires_in_seconds: out.expires_in_seconds,
        retry_after_seconds: out.retry_after_seconds,
    }))
}

// ── POST /api/auth/sms/verify-otp ────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyOtpRequest {
    pub phone: String,
    pub code: String,
}

#[derive(Serialize)]
pub struct VerifyOtpResponse {
    pub status: &'static str,
    pub user: PublicUser,
}

pub async fn verify_otp(
    State(state): State<AppState>,
    Json(body): Json<VerifyOtpRequest>,
) -> Result<Json<VerifyOtpResponse>, AuthServiceError> {
    let usecase = VerifyOtpUseCase {
        otp_requests: state.otp_repo(),
        users: state.user_repo(),
        otp_salt: state.otp_salt.clone(),
    };
    let user = usecase
        .execute(VerifyOtpInput {
            phone: body.phone,
            code: body.code,
        })
        .await?;
    Ok(Json(VerifyOtpResponse {
        status: "completed",
        user: user.to_public(),
    }))
}
