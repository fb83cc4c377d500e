use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AuthRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AuthRequests::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AuthRequests::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(AuthRequests::TelegramUserId).string())
                    .col(ColumnDef::new(AuthRequests::UserId).uuid())
                    .col(
                        ColumnDef::new(AuthRequests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(AuthRequests::Table, AuthRequests::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // The bot re-locates an identity's newest pending request after a
        // phone share, so it needs the telegram_user_id lookup path.
        manager
            .create_index(
                Index::create()
                    .table(AuthRequests::Table)
                    .col(AuthRequests::TelegramUserId)
                    .name("idx_auth_requests_telegram_user_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AuthRequests::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum AuthRequests {
    Table,
    Id,
    Status,
    TelegramUserId,
    UserId,
    CreatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
