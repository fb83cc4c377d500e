use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
    sea_query::Expr,
};
use uuid::Uuid;

use kitob_auth_schema::{auth_requests, users};
use kitob_domain::handshake::AuthRequestStatus;
use kitob_domain::user::UserRole;

use crate::domain::repository::{AuthRequestStore, UserStore};
use crate::domain::types::{AuthRequest, User};
use crate::error::BotError;

// ── AuthRequest store ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbAuthRequestStore {
    pub db: DatabaseConnection,
}

impl AuthRequestStore for DbAuthRequestStore {
    async fn find_pending(&self, id: Uuid) -> Result<Option<AuthRequest>, BotError> {
        let model = auth_requests::Entity::find_by_id(id)
            .filter(auth_requests::Column::Status.eq(AuthRequestStatus::Pending.as_str()))
            .one(&self.db)
            .await
            .context("find pending auth request")?;
        model.map(auth_request_from_model).transpose()
    }

    async fn attach_identity(
        &self,
        id: Uuid,
        telegram_user_id: &str,
        user_id: Uuid,
    ) -> Result<(), BotError> {
        auth_requests::ActiveModel {
            id: Set(id),
            telegram_user_id: Set(Some(telegram_user_id.to_owned())),
            user_id: Set(Some(user_id)),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("attach identity to auth request")?;
        Ok(())
    }

    async fn complete(
        &self,
        id: Uuid,
        telegram_user_id: &str,
        user_id: Uuid,
    ) -> Result<(), BotError> {
        // Filtered on pending: losing a race to another completer (or
        // repeating the transition) updates zero rows, which is the intended
        // idempotent convergence.
        auth_requests::Entity::update_many()
            .col_expr(
                auth_requests::Column::Status,
                Expr::value(AuthRequestStatus::Completed.as_str()),
            )
            .col_expr(
                auth_requests::Column::TelegramUserId,
                Expr::value(telegram_user_id),
            )
            .col_expr(auth_requests::Column::UserId, Expr::value(user_id))
            .filter(auth_requests::Column::Id.eq(id))
            .filter(auth_requests::Column::Status.eq(AuthRequestStatus::Pending.as_str()))
            .exec(&self.db)
            .await
            .context("complete auth request")?;
        Ok(())
    }

    async fn latest_pending_for_identity(
        &self,
        telegram_user_id: &str,
    ) -> Result<Option<AuthRequest>, BotError> {
        let model = auth_requests::Entity::find()
            .filter(auth_requests::Column::TelegramUserId.eq(telegram_user_id))
            .filter(auth_requests::Column::Status.eq(AuthRequestStatus::Pending.as_str()))
            .order_by_desc(auth_requests::Column::CreatedAt)
            .one(&self.db)
            .await
            .context("find latest pending request for identity")?;
        model.map(auth_request_from_model).transpose()
    }
}

fn auth_request_from_model(model: auth_requests::Model) -> Result<AuthRequest, BotError> {
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

// ── User store ───────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserStore {
    pub db: DatabaseConnection,
}

impl UserStore for DbUserStore {
    async fn find_by_telegram_id(&self, telegram_id: &str) -> Result<Option<User>, BotError> {
        let model = users::Entity::find()
            .filter(users::Column::TelegramId.eq(telegram_id))
            .one(&self.db)
            .await
            .context("find user by telegram id")?;
        model.map(user_from_model).transpose()
    }

    async fn create(&self, user: &User) -> Result<(), BotError> {
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

    async fn touch_last_login(&self, id: Uuid) -> Result<(), BotError> {
        users::ActiveModel {
            id: Set(id),
            last_login_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("touch last login")?;
        Ok(())
    }

    async fn set_phone(&self, id: Uuid, phone: &str) -> Result<(), BotError> {
        users::ActiveModel {
            id: Set(id),
            phone: Set(Some(phone.to_owned())),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("set user phone")?;
        Ok(())
    }
}

fn user_from_model(model: users::Model) -> Result<User, BotError> {
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
