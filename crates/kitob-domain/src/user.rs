//! User domain types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User permission level.
///
/// Wire format: string (`"user"` / `"admin"`); stored as smallint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    User = 0,
    Admin = 1,
}

impl UserRole {
    /// Convert from the stored smallint value. Returns `None` for unknown values.
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::User),
            1 => Some(Self::Admin),
            _ => None,
        }
    }

    /// Convert to the stored smallint value.
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Public user projection returned by login and status endpoints.
///
/// Identity is always phone/Telegram-derived — there is no password material
/// to omit. `telegram_id` is either the numeric Telegram id or the synthetic
/// `sms:<e164>` form for SMS-only identities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub telegram_id: String,
    pub full_name: String,
    pub username: Option<String>,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub role: UserRole,
}

/// Synthetic `telegram_id` for identities created through the SMS flow.
pub fn sms_identity(phone: &str) -> String {
    format!("sms:{phone}")
}
