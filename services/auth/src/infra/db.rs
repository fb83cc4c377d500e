use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
    sea_query::{Expr, ExprTrait as _},
};
use uuid::Uuid;

use kitob_auth_schema::{auth_requests, sms_otp_requests, users};
use kitob_domain::handshake::{AuthRequestStatus, OtpStatus};
use kitob_domain::user::UserRole;

use crate::domain::repository::{AuthRequestRepository, OtpRequestRepository, UserRepository};
use crate::domain::types::{AuthRequest, OtpRequest, User};
use crate::error::AuthServiceError;

// ── AuthRequest repository ───────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbAuthRequestRepository {
    pub db: DatabaseConnection,
}

impl AuthRequestRepository for DbAuthRequestRepository {
    async fn create(&self, request: &AuthRequest) -> Result<(), AuthServiceError> {
        auth_requests::ActiveModel {
            id: Set(request.id),
            status: Set(request.status.as_str().to_owned()),
            telegram_user_id: Set(request.telegram_user_id.clone()),
            user_id: Set(request.user_id),
            created_at: Set(request.created_at),
        }
        .insert(&self.db)
        .await
        .context("create auth request")?;
        Ok(())
    }

    async fn find_with_user(
        &self,
        id: Uuid,
    ) -> Result<Option<(AuthRequest, Option<User>)>, AuthServiceError> {
        let found = auth_requests::Entity::find_by_id(id)
            .find_also_related(users::Entity)
            .one(&self.db)
            .await
            .context("find auth request with user")?;

        match found {
            None => Ok(None),
            Some((request, user)) => {
                let request = auth_request_from_model(request)?;
                let user = user.map(user_from_model).transpose()?;
                Ok(Some((request, user)))
            }
        }
    }
}

fn auth_request_from_model(model: auth_requests::Model) -> Result<AuthRequest, AuthServiceError> {
    let status = AuthRequestStatus::parse(&model.status)
        .ok_or_else(|| anyhow::anyhow!("unknown auth_request status: {}", model.status))?;
    Ok(AuthRequest {
        id: model.id,
        status,
        telegram_user_id: model.telegram_user_id,
        user_id: model.user_id,
        created_at: model.created_at,
    })
}

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthServiceError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        model.map(user_from_model).transpose()
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<User>, AuthServiceError> {
        let model = users::Entity::find()
            .filter(users::Column::Phone.eq(phone))
            .one(&self.db)
            .await
            .context("find user by phone")?;
        model.map(user_from_model).transpose()
    }

    async fn find_by_telegram_id(
        &self,
        telegram_id: &str,
    ) -> Result<Option<User>, AuthServiceError> {
        let model = users::Entity::find()
            .filter(users::Column::TelegramId.eq(telegram_id))
            .one(&self.db)
            .await
            .context("find user by telegram id")?;
        model.map(user_from_model).transpose()
    }

    async fn create(&self, user: &User) -> Result<(), AuthServiceError> {
        users::ActiveModel {
            id: Set(user.id),
            telegram_id: Set(user.telegram_id.clone()),
            full_name: Set(user.full_name.clone()),
            username: Set(user.username.clone()),
            phone: Set(user.phone.clone()),
            avatar_url: Set(user.avatar_url.clone()),
            role: Set(user.role.as_u8() as i16),
            created_at: Set(user.created_at),
            last_login_at: Set(user.last_login_at),
        }
        .insert(&self.db)
        .await
        .context("create user")?;
        Ok(())
    }

    async fn record_login(&self, id: Uuid, phone: &str) -> Result<(), AuthServiceError> {
        users::ActiveModel {
            id: Set(id),
            phone: Set(Some(phone.to_owned())),
            last_login_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("record user login")?;
        Ok(())
    }
}

fn user_from_model(model: users::Model) -> Result<User, AuthServiceError> {
    let role = UserRole::from_u8(model.role as u8)
        .ok_or_else(|| anyhow::anyhow!("unknown user role: {}", model.role))?;
    Ok(User {
        id: model.id,
        telegram_id: model.telegram_id,
        full_name: model.full_name,
        username: model.username,
        phone: model.phone,
        avatar_url: model.avatar_url,
        role,
        created_at: model.created_at,
        last_login_at: model.last_login_at,
    })
}

// ── OtpRequest repository ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbOtpRequestRepository {
    pub db: DatabaseConnection,
}

impl OtpRequestRepository for DbOtpRequestRepository {
    async fn latest_created_for_phone(
        &self,
        phone: &str,
    ) -> Result<Option<DateTime<Utc>>, AuthServiceError> {
        let model = sms_otp_requests::Entity::find()
            .filter(sms_otp_requests::Column::Phone.eq(phone))
            .order_by_desc(sms_otp_requests::Column::CreatedAt)
            .one(&self.db)
            .await
            .context("find latest otp for phone")?;
        Ok(model.map(|m| m.created_at))
    }

    async fn count_for_phone_since(
        &self,
        phone: &str,
        since: DateTime<Utc>,
    ) -> Result<u64, AuthServiceError> {
        let count = sms_otp_requests::Entity::find()
            .filter(sms_otp_requests::Column::Phone.eq(phone))
            .filter(sms_otp_requests::Column::CreatedAt.gt(since))
            .count(&self.db)
            .await
            .context("count otps for phone")?;
        Ok(count)
    }

    async fn count_for_ip_since(
        &self,
        ip_address: &str,
        since: DateTime<Utc>,
    ) -> Result<u64, AuthServiceError> {
        let count = sms_otp_requests::Entity::find()
            .filter(sms_otp_requests::Column::IpAddress.eq(ip_address))
            .filter(sms_otp_requests::Column::CreatedAt.gt(since))
            .count(&self.db)
            .await
            .context("count otps for ip")?;
        Ok(count)
    }

    async fn create(&self, request: &OtpRequest) -> Result<(), AuthServiceError> {
        sms_otp_requests::ActiveModel {
            id: Set(request.id),
            phone: Set(request.phone.clone()),
            otp_hash: Set(request.otp_hash.clone()),
            status: Set(request.status.as_str().to_owned()),
            attempts: Set(request.attempts),
            ip_address: Set(request.ip_address.clone()),
            expires_at: Set(request.expires_at),
            created_at: Set(request.created_at),
            verified_at: Set(request.verified_at),
        }
        .insert(&self.db)
        .await
        .context("create otp request")?;
        Ok(())
    }

    async fn find_latest_pending(
        &self,
        phone: &str,
    ) -> Result<Option<OtpRequest>, AuthServiceError> {
        let model = sms_otp_requests::Entity::find()
            .filter(sms_otp_requests::Column::Phone.eq(phone))
            .filter(sms_otp_requests::Column::Status.eq(OtpStatus::Pending.as_str()))
            .order_by_desc(sms_otp_requests::Column::CreatedAt)
            .one(&self.db)
            .await
            .context("find latest pending otp")?;
        model.map(otp_from_model).transpose()
    }

    async fn mark_expired(&self, id: Uuid) -> Result<(), AuthServiceError> {
        self.set_status(id, OtpStatus::Expired, None)
            .await
            .context("mark otp expired")?;
        Ok(())
    }

    async fn mark_failed(&self, id: Uuid) -> Result<(), AuthServiceError> {
        self.set_status(id, OtpStatus::Failed, None)
            .await
            .context("mark otp failed")?;
        Ok(())
    }

    async fn mark_verified(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), AuthServiceError> {
        self.set_status(id, OtpStatus::Verified, Some(at))
            .await
            .context("mark otp verified")?;
        Ok(())
    }

    async fn increment_attempts(&self, id: Uuid) -> Result<(), AuthServiceError> {
        // Plain increment, not compare-and-swap: racing verifies may
        // under-count. Accepted — the expiry window bounds the damage.
        sms_otp_requests::Entity::update_many()
            .col_expr(
                sms_otp_requests::Column::Attempts,
                Expr::col(sms_otp_requests::Column::Attempts).add(1),
            )
            .filter(sms_otp_requests::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .context("increment otp attempts")?;
        Ok(())
    }
}

impl DbOtpRequestRepository {
    async fn set_status(
        &self,
        id: Uuid,
        status: OtpStatus,
        verified_at: Option<DateTime<Utc>>,
    ) -> Result<(), sea_orm::DbErr> {
        let mut am = sms_otp_requests::ActiveModel {
            id: Set(id),
            status: Set(status.as_str().to_owned()),
            ..Default::default()
        };
        if verified_at.is_some() {
            am.verified_at = Set(verified_at);
        }
        am.update(&self.db).await?;
        Ok(())
    }
}

fn otp_from_model(model: sms_otp_requests::Model) -> Result<OtpRequest, AuthServiceError> {
    let status = OtpStatus::parse(&model.status)
        .ok_or_else(|| anyhow::anyhow!("unknown otp status: {}", model.status))?;
    Ok(OtpRequest {
        id: model.id,
        phone: model.phone,
        otp_hash: model.otp_hash,
        status,
        attempts: model.attempts,
        ip_address: model.ip_address,
        expires_at: model.expires_at,
        created_at: model.created_at,
        verified_at: model.verified_at,
    })
}
