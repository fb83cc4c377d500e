use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SmsOtpRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SmsOtpRequests::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SmsOtpRequests::Phone).string().not_null())
                    .col(ColumnDef::new(SmsOtpRequests::OtpHash).string().not_null())
                    .col(
                        ColumnDef::new(SmsOtpRequests::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(SmsOtpRequests::Attempts)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(SmsOtpRequests::IpAddress).string())
                    .col(
                        ColumnDef::new(SmsOtpRequests::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SmsOtpRequests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SmsOtpRequests::VerifiedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // Sliding-window rate limits count rows per phone and per source IP,
        // and verification fetches the newest pending row per phone.
        manager
            .create_index(
                Index::create()
                    .table(SmsOtpRequests::Table)
                    .col(SmsOtpRequests::Phone)
                    .col(SmsOtpRequests::CreatedAt)
                    .name("idx_sms_otp_phone_created")
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(SmsOtpRequests::Table)
                    .col(SmsOtpRequests::IpAddress)
                    .col(SmsOtpRequests::CreatedAt)
                    .name("idx_sms_otp_ip_created")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SmsOtpRequests::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum SmsOtpRequests {
    Table,
    Id,
    Phone,
    OtpHash,
    Status,
    Attempts,
    IpAddress,
    ExpiresAt,
    CreatedAt,
    VerifiedAt,
}
