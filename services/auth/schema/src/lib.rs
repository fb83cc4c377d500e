//! sea-orm entities for the auth store, shared by the API and bot processes.

pub mod auth_requests;
pub mod sms_otp_requests;
pub mod users;
