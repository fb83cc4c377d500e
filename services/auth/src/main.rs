use std::net::SocketAddr;
use std::sync::Arc;

use sea_orm::Database;
use tracing::info;

use kitob_auth::config::AuthConfig;
use kitob_auth::infra::sms::{EskizClient, EskizConfig, TokenCache};
use kitob_auth::router::build_router;
use kitob_auth::state::AppState;

#[tokio::main]
async fn main() {
    kitob_core::tracing::init_tracing();

    let config = AuthConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let sms = EskizClient::new(
        EskizConfig {
            base_url: config.eskiz_base_url.clone(),
            email: config.eskiz_email.clone(),
            password: config.eskiz_password.clone(),
            sender: config.eskiz_from.clone(),
            callback_url: config.eskiz_callback_url.clone(),
        },
        Arc::new(TokenCache::new()),
    );

    let state = AppState {
        db,
        sms,
        otp_salt: config.otp_hash_salt.clone(),
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.auth_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("auth service listening on {addr}");
    // connect-info service: the OTP rate limiter needs the peer address.
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("server error");
}
