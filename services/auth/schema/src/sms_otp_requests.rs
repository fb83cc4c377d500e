use sea_orm::entity::prelude::*;

/// One SMS one-time-code issuance. Rows are append-only history: the verify
/// path always picks the newest `pending` row per phone, and the rate limiter
/// counts rows in sliding windows, so superseded rows are kept, not deleted.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sms_otp_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub phone: String,
    /// Salted sha256 of the code — the raw code is never persisted.
    pub otp_hash: String,
    pub status: String,
    pub attempts: i32,
    pub ip_address: Option<String>,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub verified_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
