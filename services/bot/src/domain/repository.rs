#![allow(async_fn_in_trait)]

use uuid::Uuid;

use crate::domain::types::{AuthRequest, User};
use crate::error::BotError;

/// The bot's view of the shared handshake table. All writes are idempotent
/// transitions: completion is filtered on `status = 'pending'`, so repeating
/// a transition (or losing a race to a concurrent `/start`) is a silent
/// no-op and the rows converge.
pub trait AuthRequestStore: Send + Sync {
    /// Load a request only if it is still pending.
    async fn find_pending(&self, id: Uuid) -> Result<Option<AuthRequest>, BotError>;

    /// Record which identity opened the deep link WITHOUT completing the
    /// handshake (first phase of the two-phase completion).
    async fn attach_identity(
        &self,
        id: Uuid,
        telegram_user_id: &str,
        user_id: Uuid,
    ) -> Result<(), BotError>;

    /// Complete a pending request. A no-op if the request has already left
    /// `pending`.
    async fn complete(
        &self,
        id: Uuid,
        telegram_user_id: &str,
        user_id: Uuid,
    ) -> Result<(), BotError>;

    /// Newest still-pending request previously linked to this identity.
    /// This is how the second phase resumes after a phone share (or a crash).
    async fn latest_pending_for_identity(
        &self,
        telegram_user_id: &str,
    ) -> Result<Option<AuthRequest>, BotError>;
}

/// The bot's view of the users table.
pub trait UserStore: Send + Sync {
    async fn find_by_telegram_id(&self, telegram_id: &str) -> Result<Option<User>, BotError>;

    async fn create(&self, user: &User) -> Result<(), BotError>;

    async fn touch_last_login(&self, id: Uuid) -> Result<(), BotError>;

    async fn set_phone(&self, id: Uuid, phone: &str) -> Result<(), BotError>;
}
