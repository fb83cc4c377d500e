use sea_orm::entity::prelude::*;

/// User record owned by the auth subsystem.
/// `telegram_id` is the only required unique key; `phone` is a secondary
/// lookup key for SMS login.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub telegram_id: String,
    pub full_name: String,
    pub username: Option<String>,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub role: i16,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub last_login_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::auth_requests::Entity")]
    AuthRequests,
}

impl Related<super::auth_requests::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AuthRequests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
