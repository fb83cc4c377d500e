use std::sync::{Arc, Mutex};

use chrono::Utc;
use uuid::Uuid;

use kitob_bot::domain::repository::{AuthRequestStore, UserStore};
use kitob_bot::domain::types::{AuthRequest, TelegramIdentity, User};
use kitob_bot::error::BotError;
use kitob_domain::handshake::AuthRequestStatus;
use kitob_domain::user::UserRole;

pub fn pending_request() -> AuthRequest {
    AuthRequest {
        id: Uuid::new_v4(),
        status: AuthRequestStatus::Pending,
        telegram_user_id: None,
        user_id: None,
        created_at: Utc::now(),
    }
}

pub fn identity(telegram_id: &str) -> TelegramIdentity {
    TelegramIdentity {
        telegram_id: telegram_id.to_owned(),
        first_name: "Alisher".to_owned(),
        last_name: Some("Navoiy".to_owned()),
        username: Some("navoiy".to_owned()),
    }
}

pub fn known_user(telegram_id: &str, phone: Option<&str>) -> User {
    User {
        id: Uuid::now_v7(),
        telegram_id: telegram_id.to_owned(),
        full_name: "Alisher Navoiy".to_owned(),
        username: Some("navoiy".to_owned()),
        phone: phone.map(str::to_owned),
        avatar_url: None,
        role: UserRole::User,
        created_at: Utc::now(),
        last_login_at: None,
    }
}

// ── MockAuthRequestStore ─────────────────────────────────────────────────────

/// In-memory stand-in for the shared auth_requests table, mirroring the
/// idempotent pending-filtered transitions of the real store.
#[derive(Clone)]
pub struct MockAuthRequestStore {
    pub requests: Arc<Mutex<Vec<AuthRequest>>>,
}

impl MockAuthRequestStore {
    pub fn new(requests: Vec<AuthRequest>) -> Self {
        Self {
            requests: Arc::new(Mutex::new(requests)),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    pub fn requests_handle(&self) -> Arc<Mutex<Vec<AuthRequest>>> {
        Arc::clone(&self.requests)
    }
}

impl AuthRequestStore for MockAuthRequestStore {
    async fn find_pending(&self, id: Uuid) -> Result<Option<AuthRequest>, BotError> {
        Ok(self
            .requests
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id && r.status == AuthRequestStatus::Pending)
            .cloned())
    }

    async fn attach_identity(
        &self,
        id: Uuid,
        telegram_user_id: &str,
        user_id: Uuid,
    ) -> Result<(), BotError> {
        let mut requests = self.requests.lock().unwrap();
        if let Some(request) = requests.iter_mut().find(|r| r.id == id) {
            request.telegram_user_id = Some(telegram_user_id.to_owned());
            request.user_id = Some(user_id);
        }
        Ok(())
    }

    async fn complete(
        &self,
        id: Uuid,
        telegram_user_id: &str,
        user_id: Uuid,
    ) -> Result<(), BotError> {
        let mut requests = self.requests.lock().unwrap();
        if let Some(request) = requests
            .iter_mut()
            .find(|r| r.id == id && r.status == AuthRequestStatus::Pending)
        {
            request.status = AuthRequestStatus::Completed;
            request.telegram_user_id = Some(telegram_user_id.to_owned());
            request.user_id = Some(user_id);
        }
        Ok(())
    }

    async fn latest_pending_for_identity(
        &self,
        telegram_user_id: &str,
    ) -> Result<Option<AuthRequest>, BotError> {
        Ok(self
            .requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| {
                r.telegram_user_id.as_deref() == Some(telegram_user_id)
                    && r.status == AuthRequestStatus::Pending
            })
            .max_by_key(|r| r.created_at)
            .cloned())
    }
}

// ── MockUserStore ────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockUserStore {
    pub users: Arc<Mutex<Vec<User>>>,
}

impl MockUserStore {
    pub fn new(users: Vec<User>) -> Self {
        Self {
            users: Arc::new(Mutex::new(users)),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    pub fn users_handle(&self) -> Arc<Mutex<Vec<User>>> {
        Arc::clone(&self.users)
    }
}

impl UserStore for MockUserStore {
    async fn find_by_telegram_id(&self, telegram_id: &str) -> Result<Option<User>, BotError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.telegram_id == telegram_id)
            .cloned())
    }

    async fn create(&self, user: &User) -> Result<(), BotError> {
        self.users.lock().unwrap().push(user.clone());
        Ok(())
    }

    async fn touch_last_login(&self, id: Uuid) -> Result<(), BotError> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.id == id) {
            user.last_login_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn set_phone(&self, id: Uuid, phone: &str) -> Result<(), BotError> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.id == id) {
            user.phone = Some(phone.to_owned());
        }
        Ok(())
    }
}
