use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use kitob_domain::user::UserRole;

use crate::error::AuthServiceError;
use crate::state::AppState;
use crate::usecase::user::GetUserUseCase;

// ── GET /api/user ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct GetUserQuery {
    pub id: Uuid,
}

#[derive(Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub telegram_id: String,
    pub full_name: String,
    pub username: Option<String>,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub role: UserRole,
    #[serde(serialize_with = "kitob_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "kitob_core::serde::to_rfc3339_ms_opt")]
    pub last_login_at: Option<chrono::DateTime<chrono::Utc>>,
}

pub async fn get_user(
    State(state): State<AppState>,
    Query(query): Query<GetUserQuery>,
) -> Result<Json<UserResponse>, AuthServiceError> {
    let usecase = GetUserUseCase {
        users: state.user_repo(),
    };
    let user = usecase.execute(query.id).await?;
    Ok(Json(UserResponse {
        id: user.id,
        telegram_id: user.telegram_id,
        full_name: user.full_name,
        username: user.username,
        phone: user.phone,
        avatar_url: user.avatar_url,
        role: user.role,
        created_at: user.created_at,
        last_login_at: user.last_login_at,
    }))
}
