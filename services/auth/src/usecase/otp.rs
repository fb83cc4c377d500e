use chrono::{Duration, Utc};
use rand::RngExt;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use kitob_domain::handshake::OtpStatus;
use kitob_domain::phone::normalize_phone;
use kitob_domain::user::{UserRole, sms_identity};

use crate::domain::repository::{OtpRequestRepository, OtpSender, UserRepository};
use crate::domain::types::{
    MAX_OTP_PER_IP_HOUR, MAX_OTP_PER_PHONE_DAY, MAX_OTP_PER_PHONE_HOUR, MAX_VERIFY_ATTEMPTS,
    OTP_COOLDOWN_SECS, OTP_TTL_SECS, OtpRequest, User,
};
use crate::error::AuthServiceError;

/// Salted digest stored in place of the raw code.
pub fn otp_hash(salt: &str, phone: &str, code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{phone}:{code}:{salt}").as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Strip non-digits; a valid code is exactly six digits.
pub fn sanitize_code(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    (digits.len() == 6).then_some(digits)
}

fn generate_code() -> String {
    let mut rng = rand::rng();
    rng.random_range(100_000..1_000_000).to_string()
}

// ── RequestOtp ───────────────────────────────────────────────────────────────

pub struct RequestOtpInput {
    pub phone: String,
    pub ip_address: String,
}

#[derive(Debug)]
pub struct RequestOtpOutput {
    pub request_id: Uuid,
    pub expires_in_seconds: i64,
    pub retry_after_seconds: i64,
}

pub struct RequestOtpUseCase<O, S>
where
    O: OtpRequestRepository,
    S: OtpSender,
{
    pub otp_requests: O,
    pub sms: S,
    pub otp_salt: String,
}

impl<O, S> RequestOtpUseCase<O, S>
where
    O: OtpRequestRepository,
    S: OtpSender,
{
    /// The four throttle checks run unconditionally, in this order; the first
    /// one that trips is the error the client sees. All windows slide from
    /// the current instant, never calendar boundaries.
    pub async fn execute(&self, input: RequestOtpInput) -> Result<RequestOtpOutput, AuthServiceError> {
        let phone = normalize_phone(&input.phone).ok_or(AuthServiceError::InvalidPhone)?;
        let now = Utc::now();

        // 1. Cooldown against the phone's most recent issuance.
        if let Some(last) = self.otp_requests.latest_created_for_phone(&phone).await? {
            let elapsed = (now - last).num_seconds();
            if elapsed < OTP_COOLDOWN_SECS {
                return Err(AuthServiceError::Cooldown {
                    retry_after_seconds: OTP_COOLDOWN_SECS - elapsed,
                });
            }
        }

        // 2 + 3. Per-phone hourly and daily caps.
        let hour_ago = now - Duration::hours(1);
        let sent_last_hour = self
            .otp_requests
            .count_for_phone_since(&phone, hour_ago)
            .await?;
        if sent_last_hour >= MAX_OTP_PER_PHONE_HOUR {
            return Err(AuthServiceError::HourlyLimitReached);
        }
        let day_ago = now - Duration::days(1);
        let sent_last_day = self
            .otp_requests
            .count_for_phone_since(&phone, day_ago)
            .await?;
        if sent_last_day >= MAX_OTP_PER_PHONE_DAY {
            return Err(AuthServiceError::DailyLimitReached);
        }

        // 4. Per-source-IP cap, independent of the phone being targeted.
        let sent_from_ip = self
            .otp_requests
            .count_for_ip_since(&input.ip_address, hour_ago)
            .await?;
        if sent_from_ip >= MAX_OTP_PER_IP_HOUR {
            return Err(AuthServiceError::IpLimitReached);
        }

        let code = generate_code();
        let request = OtpRequest {
            id: Uuid::new_v4(),
            phone: phone.clone(),
            otp_hash: otp_hash(&self.otp_salt, &phone, &code),
            status: OtpStatus::Pending,
            attempts: 0,
            ip_address: Some(input.ip_address),
            expires_at: now + Duration::seconds(OTP_TTL_SECS),
            created_at: now,
            verified_at: None,
        };

        // Dispatch before persisting: a failed send must leave no row behind,
        // so the user is never told a code was sent when it wasn't.
        self.sms.send_code(&phone, &code).await?;
        self.otp_requests.create(&request).await?;

        Ok(RequestOtpOutput {
            request_id: request.id,
            expires_in_seconds: OTP_TTL_SECS,
            retry_after_seconds: OTP_COOLDOWN_SECS,
        })
    }
}

// ── VerifyOtp ────────────────────────────────────────────────────────────────

pub struct VerifyOtpInput {
    pub phone: String,
    pub code: String,
}

pub struct VerifyOtpUseCase<O, U>
where
    O: OtpRequestRepository,
    U: UserRepository,
{
    pub otp_requests: O,
    pub users: U,
    pub otp_salt: String,
}

impl<O, U> VerifyOtpUseCase<O, U>
where
    O: OtpRequestRepository,
    U: UserRepository,
{
    /// Synchronous login path: validates against the newest pending code for
    /// the phone and resolves a user directly — no handshake record involved.
    pub async fn execute(&self, input: VerifyOtpInput) -> Result<User, AuthServiceError> {
        let phone = normalize_phone(&input.phone).ok_or(AuthServiceError::InvalidPhone)?;
        let code = sanitize_code(&input.code).ok_or(AuthServiceError::InvalidCode)?;

        let otp = self
            .otp_requests
            .find_latest_pending(&phone)
            .await?
            .ok_or(AuthServiceError::NoActiveCode)?;

        let now = Utc::now();
        if otp.is_expired_at(now) {
            self.otp_requests.mark_expired(otp.id).await?;
            return Err(AuthServiceError::CodeExpired);
        }

        if otp.attempts >= MAX_VERIFY_ATTEMPTS {
            self.otp_requests.mark_failed(otp.id).await?;
            return Err(AuthServiceError::TooManyAttempts);
        }

        if otp_hash(&self.otp_salt, &phone, &code) != otp.otp_hash {
            // The cap is enforced on the NEXT call, so a burst can land one
            // extra attempt past the limit. Tolerated: the expiry window
            // bounds the blast radius.
            self.otp_requests.increment_attempts(otp.id).await?;
            return Err(AuthServiceError::WrongCode);
        }

        self.otp_requests.mark_verified(otp.id, now).await?;

        // Resolve identity: phone first, then the synthetic SMS telegram_id.
        let existing = match self.users.find_by_phone(&phone).await? {
            Some(user) => Some(user),
            None => self.users.find_by_telegram_id(&sms_identity(&phone)).await?,
        };

        let user = match existing {
            Some(user) => {
                self.users.record_login(user.id, &phone).await?;
                User {
                    phone: Some(phone.clone()),
                    last_login_at: Some(now),
                    ..user
                }
            }
            None => {
                let user = User {
                    id: Uuid::now_v7(),
                    telegram_id: sms_identity(&phone),
                    full_name: format!("SMS user {phone}"),
                    username: None,
                    phone: Some(phone.clone()),
                    avatar_url: None,
                    role: UserRole::User,
                    created_at: now,
                    last_login_at: Some(now),
                };
                self.users.create(&user).await?;
                user
            }
        };

        Ok(user)
    }
}
