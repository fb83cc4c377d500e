use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use kitob_domain::handshake::AuthRequestStatus;
use kitob_domain::user::PublicUser;

use crate::error::AuthServiceError;
use crate::state::AppState;
use crate::usecase::auth_request::{
    CheckAuthOutput, CheckAuthStatusUseCase, CreateAuthRequestUseCase,
};

// ── POST /api/create-auth-request ────────────────────────────────────────────

#[derive(Serialize)]
pub struct CreateAuthRequestResponse {
    pub request_uuid: Uuid,
}

pub async fn create_auth_request(
    State(state): State<AppState>,
) -> Result<Json<CreateAuthRequestResponse>, AuthServiceError> {
    let usecase = CreateAuthRequestUseCase {
        auth_requests: state.auth_request_repo(),
    };
    let request_uuid = usecase.execute().await?;
    Ok(Json(CreateAuthRequestResponse { request_uuid }))
}

// ── GET /api/check-auth ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CheckAuthQuery {
    pub request_uuid: Uuid,
}

#[derive(Serialize)]
pub struct CheckAuthResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<PublicUser>,
}

pub async fn check_auth(
    State(state): State<AppState>,
    Query(query): Query<CheckAuthQuery>,
) -> Result<Json<CheckAuthResponse>, AuthServiceError> {
    let usecase = CheckAuthStatusUseCase {
        auth_requests: state.auth_request_repo(),
    };
    let response = match usecase.execute(query.request_uuid).await? {
        CheckAuthOutput::Completed(user) => CheckAuthResponse {
            status: AuthRequestStatus::Completed.as_str(),
            user: Some(user),
        },
        CheckAuthOutput::InProgress(status) => CheckAuthResponse {
            status: status.as_str(),
            user: None,
        },
    };
    Ok(Json(response))
}
