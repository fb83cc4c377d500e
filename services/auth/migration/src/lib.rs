use sea_orm_migration::prelude::*;

mod m20260801_000001_create_users;
mod m20260801_000002_create_auth_requests;
mod m20260801_000003_create_sms_otp_requests;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260801_000001_create_users::Migration),
            Box::new(m20260801_000002_create_auth_requests::Migration),
            Box::new(m20260801_000003_create_sms_otp_requests::Migration),
        ]
    }
}
