use chrono::{DateTime, Utc};
use uuid::Uuid;

use kitob_domain::handshake::{AuthRequestStatus, OtpStatus};
use kitob_domain::user::{PublicUser, UserRole};

/// Shared login-handshake record. Created here in `pending`; completed by the
/// bot process; abandoned requests simply stay `pending` (the poller decides
/// when to give up).
#[derive(Debug, Clone)]
pub struct AuthRequest {
    pub id: Uuid,
    pub status: AuthRequestStatus,
    pub telegram_user_id: Option<String>,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl AuthRequest {
    pub fn new_pending() -> Self {
        Self {
            id: Uuid::new_v4(),
            status: AuthRequestStatus::Pending,
            telegram_user_id: None,
            user_id: None,
            created_at: Utc::now(),
        }
    }
}

/// Full user record as the auth service sees it.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub telegram_id: String,
    pub full_name: String,
    pub username: Option<String>,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            telegram_id: self.telegram_id.clone(),
            full_name: self.full_name.clone(),
            username: self.username.clone(),
            phone: self.phone.clone(),
            avatar_url: self.avatar_url.clone(),
            role: self.role,
        }
    }
}

/// One SMS one-time-code issuance.
#[derive(Debug, Clone)]
pub struct OtpRequest {
    pub id: Uuid,
    pub phone: String,
    pub otp_hash: String,
    pub status: OtpStatus,
    pub attempts: i32,
    pub ip_address: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub verified_at: Option<DateTime<Utc>>,
}

impl OtpRequest {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Minimum gap between two OTP requests for the same phone.
pub const OTP_COOLDOWN_SECS: i64 = 120;

/// Code validity window.
pub const OTP_TTL_SECS: i64 = 300;

/// Sliding-window issuance caps.
pub const MAX_OTP_PER_PHONE_HOUR: u64 = 5;
pub const MAX_OTP_PER_PHONE_DAY: u64 = 12;
pub const MAX_OTP_PER_IP_HOUR: u64 = 20;

/// Wrong-code budget per issued code.
pub const MAX_VERIFY_ATTEMPTS: i32 = 5;
