#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::types::{AuthRequest, OtpRequest, User};
use crate::error::AuthServiceError;

/// Repository for login-handshake records. The API process only creates and
/// reads them; completion belongs to the bot process.
pub trait AuthRequestRepository: Send + Sync {
    async fn create(&self, request: &AuthRequest) -> Result<(), AuthServiceError>;

    /// Fetch a request together with the user it may reference (left join).
    async fn find_with_user(
        &self,
        id: Uuid,
    ) -> Result<Option<(AuthRequest, Option<User>)>, AuthServiceError>;
}

/// Repository for users.
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthServiceError>;

    /// Lookup by canonical E.164 phone. First match wins.
    async fn find_by_phone(&self, phone: &str) -> Result<Option<User>, AuthServiceError>;

    async fn find_by_telegram_id(&self, telegram_id: &str)
    -> Result<Option<User>, AuthServiceError>;

    async fn create(&self, user: &User) -> Result<(), AuthServiceError>;

    /// Backfill the phone and refresh `last_login_at` after a successful login.
    async fn record_login(&self, id: Uuid, phone: &str) -> Result<(), AuthServiceError>;
}

/// Repository for OTP issuance history. The rate limiter is COUNT queries
/// over this history at call time: sliding windows, no maintained counters.
pub trait OtpRequestRepository: Send + Sync {
    /// `created_at` of the most recent row for a phone, if any (cooldown check).
    async fn latest_created_for_phone(
        &self,
        phone: &str,
    ) -> Result<Option<DateTime<Utc>>, AuthServiceError>;

    async fn count_for_phone_since(
        &self,
        phone: &str,
        since: DateTime<Utc>,
    ) -> Result<u64, AuthServiceError>;

    async fn count_for_ip_since(
        &self,
        ip_address: &str,
        since: DateTime<Utc>,
    ) -> Result<u64, AuthServiceError>;

    async fn create(&self, request: &OtpRequest) -> Result<(), AuthServiceError>;

    /// Newest `pending` row for a phone, the only row verification runs
    /// against; older pending rows are implicitly superseded.
    async fn find_latest_pending(&self, phone: &str)
    -> Result<Option<OtpRequest>, AuthServiceError>;

    async fn mark_expired(&self, id: Uuid) -> Result<(), AuthServiceError>;

    async fn mark_failed(&self, id: Uuid) -> Result<(), AuthServiceError>;

    async fn mark_verified(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), AuthServiceError>;

    /// Plain `attempts = attempts + 1` update. Deliberately not CAS-guarded:
    /// concurrent verifies may under-count, bounded by the 5-minute expiry.
    async fn increment_attempts(&self, id: Uuid) -> Result<(), AuthServiceError>;
}

/// Port for the external SMS gateway.
pub trait OtpSender: Send + Sync {
    /// Deliver a code. A failure here means the user was NOT told a code is
    /// on its way, so callers must not persist anything on error.
    async fn send_code(&self, phone: &str, code: &str) -> Result<(), AuthServiceError>;
}
