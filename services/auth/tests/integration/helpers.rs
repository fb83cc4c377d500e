use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use kitob_auth::domain::repository::{
    AuthRequestRepository, OtpRequestRepository, OtpSender, UserRepository,
};
use kitob_auth::domain::types::{AuthRequest, OtpRequest, User};
use kitob_auth::error::AuthServiceError;
use kitob_domain::handshake::OtpStatus;
use kitob_domain::user::UserRole;

pub const TEST_SALT: &str = "test-otp-salt";

pub fn test_user(phone: Option<&str>) -> User {
    User {
        id: Uuid::now_v7(),
        telegram_id: "123456789".to_owned(),
        full_name: "Alisher Navoiy".to_owned(),
        username: Some("navoiy".to_owned()),
        phone: phone.map(str::to_owned),
        avatar_url: None,
        role: UserRole::User,
        created_at: Utc::now(),
        last_login_at: None,
    }
}

// ── MockAuthRequestRepo ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockAuthRequestRepo {
    pub requests: Arc<Mutex<Vec<AuthRequest>>>,
    pub users: Vec<User>,
}

impl MockAuthRequestRepo {
    pub fn new(requests: Vec<AuthRequest>, users: Vec<User>) -> Self {
        Self {
            requests: Arc::new(Mutex::new(requests)),
            users,
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![], vec![])
    }

    /// Shared handle to the stored requests for post-execution inspection.
    pub fn requests_handle(&self) -> Arc<Mutex<Vec<AuthRequest>>> {
        Arc::clone(&self.requests)
    }
}

impl AuthRequestRepository for MockAuthRequestRepo {
    async fn create(&self, request: &AuthRequest) -> Result<(), AuthServiceError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(())
    }

    async fn find_with_user(
        &self,
        id: Uuid,
    ) -> Result<Option<(AuthRequest, Option<User>)>, AuthServiceError> {
        Ok(self
            .requests
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .map(|r| {
                let user = r
                    .user_id
                    .and_then(|uid| self.users.iter().find(|u| u.id == uid).cloned());
                (r.clone(), user)
            }))
    }
}

// ── MockUserRepo ─────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockUserRepo {
    pub users: Arc<Mutex<Vec<User>>>,
}

impl MockUserRepo {
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

impl UserRepository for MockUserRepo {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthServiceError> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<User>, AuthServiceError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.phone.as_deref() == Some(phone))
            .cloned())
    }

    async fn find_by_telegram_id(
        &self,
        telegram_id: &str,
    ) -> Result<Option<User>, AuthServiceError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.telegram_id == telegram_id)
            .cloned())
    }

    async fn create(&self, user: &User) -> Result<(), AuthServiceError> {
        self.users.lock().unwrap().push(user.clone());
        Ok(())
    }

    async fn record_login(&self, id: Uuid, phone: &str) -> Result<(), AuthServiceError> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.id == id) {
            user.phone = Some(phone.to_owned());
            user.last_login_at = Some(Utc::now());
        }
        Ok(())
    }
}

// ── MockOtpRepo ──────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockOtpRepo {
    pub rows: Arc<Mutex<Vec<OtpRequest>>>,
}

impl MockOtpRepo {
    pub fn new(rows: Vec<OtpRequest>) -> Self {
        Self {
            rows: Arc::new(Mutex::new(rows)),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    pub fn rows_handle(&self) -> Arc<Mutex<Vec<OtpRequest>>> {
        Arc::clone(&self.rows)
    }

    fn set_status(&self, id: Uuid, status: OtpStatus, verified_at: Option<DateTime<Utc>>) {
        let mut rows = self.rows.lock().unwrap();
        if let Some(row) = rows.iter_mut().find(|r| r.id == id) {
            row.status = status;
            if verified_at.is_some() {
                row.verified_at = verified_at;
            }
        }
    }
}

impl OtpRequestRepository for MockOtpRepo {
    async fn latest_created_for_phone(
        &self,
        phone: &str,
    ) -> Result<Option<DateTime<Utc>>, AuthServiceError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.phone == phone)
            .map(|r| r.created_at)
            .max())
    }

    async fn count_for_phone_since(
        &self,
        phone: &str,
        since: DateTime<Utc>,
    ) -> Result<u64, AuthServiceError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.phone == phone && r.created_at > since)
            .count() as u64)
    }

    async fn count_for_ip_since(
        &self,
        ip_address: &str,
        since: DateTime<Utc>,
    ) -> Result<u64, AuthServiceError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.ip_address.as_deref() == Some(ip_address) && r.created_at > since)
            .count() as u64)
    }

    async fn create(&self, request: &OtpRequest) -> Result<(), AuthServiceError> {
        self.rows.lock().unwrap().push(request.clone());
        Ok(())
    }

    async fn find_latest_pending(
        &self,
        phone: &str,
    ) -> Result<Option<OtpRequest>, AuthServiceError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.phone == phone && r.status == OtpStatus::Pending)
            .max_by_key(|r| r.created_at)
            .cloned())
    }

    async fn mark_expired(&self, id: Uuid) -> Result<(), AuthServiceError> {
        self.set_status(id, OtpStatus::Expired, None);
        Ok(())
    }

    async fn mark_failed(&self, id: Uuid) -> Result<(), AuthServiceError> {
        self.set_status(id, OtpStatus::Failed, None);
        Ok(())
    }

    async fn mark_verified(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), AuthServiceError> {
        self.set_status(id, OtpStatus::Verified, Some(at));
        Ok(())
    }

    async fn increment_attempts(&self, id: Uuid) -> Result<(), AuthServiceError> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(row) = rows.iter_mut().find(|r| r.id == id) {
            row.attempts += 1;
        }
        Ok(())
    }
}

// ── MockSms ──────────────────────────────────────────────────────────────────

/// Captures dispatched codes; optionally simulates a gateway outage.
#[derive(Clone)]
pub struct MockSms {
    pub sent: Arc<Mutex<Vec<(String, String)>>>,
    pub fail: bool,
}

impl MockSms {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(vec![])),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            sent: Arc::new(Mutex::new(vec![])),
            fail: true,
        }
    }

    /// The last code handed to the gateway — what the end user would type in.
    pub fn last_code(&self) -> Option<String> {
        self.sent.lock().unwrap().last().map(|(_, code)| code.clone())
    }
}

impl OtpSender for MockSms {
    async fn send_code(&self, phone: &str, code: &str) -> Result<(), AuthServiceError> {
        if self.fail {
            return Err(AuthServiceError::SmsDispatch(anyhow::anyhow!(
                "gateway unavailable"
            )));
        }
        self.sent
            .lock()
            .unwrap()
            .push((phone.to_owned(), code.to_owned()));
        Ok(())
    }
}
