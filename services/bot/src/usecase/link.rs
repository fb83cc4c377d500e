use chrono::Utc;
use uuid::Uuid;

use kitob_domain::phone::normalize_phone;
use kitob_domain::user::UserRole;

use crate::domain::repository::{AuthRequestStore, UserStore};
use crate::domain::types::{TelegramIdentity, User};
use crate::error::BotError;

// ── HandleDeepLink ───────────────────────────────────────────────────────────

pub struct DeepLinkInput {
    pub request_id: Uuid,
    pub identity: TelegramIdentity,
}

#[derive(Debug, PartialEq, Eq)]
pub enum DeepLinkOutcome {
    /// Unknown, already-resolved, or foreign request. Nothing was mutated.
    InvalidRequest,
    /// Identity linked to the request; the handshake stays pending until the
    /// user shares a phone number.
    PhoneNeeded,
    Completed,
}

pub struct HandleDeepLinkUseCase<A, U>
where
    A: AuthRequestStore,
    U: UserStore,
{
    pub auth_requests: A,
    pub users: U,
}

impl<A, U> HandleDeepLinkUseCase<A, U>
where
    A: AuthRequestStore,
    U: UserStore,
{
    /// `/start <request_uuid>`: phase one of the handshake completion.
    pub async fn execute(&self, input: DeepLinkInput) -> Result<DeepLinkOutcome, BotError> {
        let Some(request) = self.auth_requests.find_pending(input.request_id).await? else {
            return Ok(DeepLinkOutcome::InvalidRequest);
        };

        let identity = input.identity;
        let (user_id, phone) = match self.users.find_by_telegram_id(&identity.telegram_id).await? {
            Some(user) => {
                self.users.touch_last_login(user.id).await?;
                (user.id, user.phone)
            }
            None => {
                let now = Utc::now();
                let user = User {
                    id: Uuid::now_v7(),
                    telegram_id: identity.telegram_id.clone(),
                    full_name: identity.full_name(),
                    username: identity.username.clone(),
                    phone: None,
                    avatar_url: Some(identity.avatar_url()),
                    role: UserRole::User,
                    created_at: now,
                    last_login_at: Some(now),
                };
                self.users.create(&user).await?;
                (user.id, None)
            }
        };

        if phone.is_none() {
            // Two-phase completion: link the identity but leave the request
            // pending. A crash here is safe — the phone-share phase re-locates
            // the request by telegram_user_id, not by any in-memory state.
            self.auth_requests
                .attach_identity(request.id, &identity.telegram_id, user_id)
                .await?;
            return Ok(DeepLinkOutcome::PhoneNeeded);
        }

        self.auth_requests
            .complete(request.id, &identity.telegram_id, user_id)
            .await?;
        Ok(DeepLinkOutcome::Completed)
    }
}

// ── HandlePhoneShared ────────────────────────────────────────────────────────

pub struct PhoneSharedInput {
    pub telegram_id: String,
    pub phone: String,
}

#[derive(Debug, PartialEq, Eq)]
pub enum PhoneSharedOutcome {
    /// Phone stored and a pending handshake completed.
    Completed,
    /// Phone stored; no handshake was waiting on it.
    Saved,
    /// No user on record for this identity.
    UnknownUser,
}

pub struct HandlePhoneSharedUseCase<A, U>
where
    A: AuthRequestStore,
    U: UserStore,
{
    pub auth_requests: A,
    pub users: U,
}

impl<A, U> HandlePhoneSharedUseCase<A, U>
where
    A: AuthRequestStore,
    U: UserStore,
{
    /// Contact-share event: phase two of the handshake completion.
    pub async fn execute(&self, input: PhoneSharedInput) -> Result<PhoneSharedOutcome, BotError> {
        let Some(user) = self.users.find_by_telegram_id(&input.telegram_id).await? else {
            return Ok(PhoneSharedOutcome::UnknownUser);
        };

        // Telegram sends contacts in international form; canonicalize when it
        // fits the known patterns so SMS-path lookups find the same row.
        let phone = normalize_phone(&input.phone).unwrap_or(input.phone);
        self.users.set_phone(user.id, &phone).await?;

        match self
            .auth_requests
            .latest_pending_for_identity(&input.telegram_id)
            .await?
        {
            Some(request) => {
                self.auth_requests
                    .complete(request.id, &input.telegram_id, user.id)
                    .await?;
                Ok(PhoneSharedOutcome::Completed)
            }
            None => Ok(PhoneSharedOutcome::Saved),
        }
    }
}
