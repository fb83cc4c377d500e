/// Auth service configuration loaded from environment variables.
#[derive(Debug)]
pub struct AuthConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// TCP port to listen on (default 3101). Env var: `AUTH_PORT`.
    pub auth_port: u16,
    /// Server-side salt mixed into OTP hashes. Env var: `OTP_HASH_SALT`.
    pub otp_hash_salt: String,
    /// Eskiz gateway account email. Env var: `ESKIZ_EMAIL`.
    pub eskiz_email: String,
    /// Eskiz gateway account password. Env var: `ESKIZ_PASSWORD`.
    pub eskiz_password: String,
    /// Registered SMS sender id (default "4546"). Env var: `ESKIZ_FROM`.
    pub eskiz_from: String,
    /// Optional delivery-status callback URL. Env var: `ESKIZ_CALLBACK_URL`.
    pub eskiz_callback_url: Option<String>,
    /// Gateway base URL (default "https://notify.eskiz.uz"). Env var: `ESKIZ_BASE_URL`.
    pub eskiz_base_url: String,
}

impl AuthConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            auth_port: std::env::var("AUTH_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3101),
            otp_hash_salt: std::env::var("OTP_HASH_SALT")
                .unwrap_or_else(|_| "kitob-otp-salt".to_owned()),
            // Gateway credentials are hard requirements: a missing value must
            // abort startup, never surface later as a failed send.
            eskiz_email: std::env::var("ESKIZ_EMAIL").expect("ESKIZ_EMAIL"),
            eskiz_password: std::env::var("ESKIZ_PASSWORD").expect("ESKIZ_PASSWORD"),
            eskiz_from: std::env::var("ESKIZ_FROM").unwrap_or_else(|_| "4546".to_owned()),
            eskiz_callback_url: std::env::var("ESKIZ_CALLBACK_URL").ok(),
            eskiz_base_url: std::env::var("ESKIZ_BASE_URL")
                .unwrap_or_else(|_| "https://notify.eskiz.uz".to_owned()),
        }
    }
}
