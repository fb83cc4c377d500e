use chrono::{DateTime, Utc};
use url::Url;
use uuid::Uuid;

use kitob_domain::handshake::AuthRequestStatus;
use kitob_domain::user::UserRole;

/// Login handshake record as the bot sees it.
#[derive(Debug, Clone)]
pub struct AuthRequest {
    pub id: Uuid,
    pub status: AuthRequestStatus,
    pub telegram_user_id: Option<String>,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// User record as the bot sees it.
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

/// Identity attached to an incoming Telegram update.
#[derive(Debug, Clone)]
pub struct TelegramIdentity {
    /// Numeric Telegram user id, as text (the `users.telegram_id` key).
    pub telegram_id: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

impl TelegramIdentity {
    pub fn full_name(&self) -> String {
        match &self.last_name {
            Some(last) => format!("{} {}", self.first_name, last),
            None => self.first_name.clone(),
        }
    }

    /// Placeholder avatar for accounts created through the bot.
    pub fn avatar_url(&self) -> String {
        let mut url = Url::parse("https://ui-avatars.com/api/").expect("static URL");
        url.query_pairs_mut().append_pair("name", &self.first_name);
        url.to_string()
    }
}
