use uuid::Uuid;

use kitob_domain::handshake::AuthRequestStatus;
use kitob_domain::user::PublicUser;

use crate::domain::repository::AuthRequestRepository;
use crate::domain::types::AuthRequest;
use crate::error::AuthServiceError;

// ── CreateAuthRequest ────────────────────────────────────────────────────────

pub struct CreateAuthRequestUseCase<A: AuthRequestRepository> {
    pub auth_requests: A,
}

impl<A: AuthRequestRepository> CreateAuthRequestUseCase<A> {
    /// Insert a fresh `pending` handshake and return its public id. The id is
    /// embedded in the Telegram deep link, so it is the only thing a client
    /// needs to keep.
    pub async fn execute(&self) -> Result<Uuid, AuthServiceError> {
        let request = AuthRequest::new_pending();
        self.auth_requests.create(&request).await?;
        Ok(request.id)
    }
}

// ── CheckAuthStatus ──────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum CheckAuthOutput {
    /// Not completed yet — reports the raw stored status.
    InProgress(AuthRequestStatus),
    /// Completed with a resolved user.
    Completed(PublicUser),
}

pub struct CheckAuthStatusUseCase<A: AuthRequestRepository> {
    pub auth_requests: A,
}

impl<A: AuthRequestRepository> CheckAuthStatusUseCase<A> {
    /// Read-only status probe. Called once a second by polling clients, so it
    /// must stay idempotent and side-effect-free.
    pub async fn execute(&self, id: Uuid) -> Result<CheckAuthOutput, AuthServiceError> {
        let (request, user) = self
            .auth_requests
            .find_with_user(id)
            .await?
            .ok_or(AuthServiceError::RequestNotFound)?;

        match (request.status, user) {
            (AuthRequestStatus::Completed, Some(user)) => {
                Ok(CheckAuthOutput::Completed(user.to_public()))
            }
            (status, _) => Ok(CheckAuthOutput::InProgress(status)),
        }
    }
}
