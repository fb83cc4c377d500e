use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use kitob_core::health::{healthz, readyz};
use kitob_core::middleware::request_id_layer;

use crate::handlers::{
    auth_request::{check_auth, create_auth_request},
    sms::{request_otp, verify_otp},
    user::get_user,
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Telegram handshake
        .route("/api/create-auth-request", post(create_auth_request))
        .route("/api/check-auth", get(check_auth))
        // SMS one-time codes
        .route("/api/auth/sms/request-otp", post(request_otp))
        .route("/api/auth/sms/verify-otp", post(verify_otp))
        // Users
        .route("/api/user", get(get_user))
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
