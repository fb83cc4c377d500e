use sea_orm::DatabaseConnection;

use crate::infra::db::{DbAuthRequestRepository, DbOtpRequestRepository, DbUserRepository};
use crate::infra::sms::EskizClient;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub sms: EskizClient,
    pub otp_salt: String,
}

impl AppState {
    pub fn auth_request_repo(&self) -> DbAuthRequestRepository {
        DbAuthRequestRepository {
            db: self.db.clone(),
        }
    }

    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn otp_repo(&self) -> DbOtpRequestRepository {
        DbOtpRequestRepository {
            db: self.db.clone(),
        }
    }
}
