use chrono::{Duration, Utc};
use uuid::Uuid;

use kitob_auth::domain::types::OtpRequest;
use kitob_auth::error::AuthServiceError;
use kitob_auth::usecase::otp::{
    RequestOtpInput, RequestOtpUseCase, VerifyOtpInput, VerifyOtpUseCase, otp_hash,
};
use kitob_domain::handshake::OtpStatus;
use kitob_domain::user::sms_identity;

use crate::helpers::{MockOtpRepo, MockSms, MockUserRepo, TEST_SALT, test_user};

const PHONE: &str = "+998901234567";
const IP: &str = "203.0.113.9";

fn request_usecase(
    otp_requests: MockOtpRepo,
    sms: MockSms,
) -> RequestOtpUseCase<MockOtpRepo, MockSms> {
    RequestOtpUseCase {
        otp_requests,
        sms,
        otp_salt: TEST_SALT.to_owned(),
    }
}

fn verify_usecase(
    otp_requests: MockOtpRepo,
    users: MockUserRepo,
) -> VerifyOtpUseCase<MockOtpRepo, MockUserRepo> {
    VerifyOtpUseCase {
        otp_requests,
        users,
        otp_salt: TEST_SALT.to_owned(),
    }
}

fn request_input(phone: &str) -> RequestOtpInput {
    RequestOtpInput {
        phone: phone.to_owned(),
        ip_address: IP.to_owned(),
    }
}

fn verify_input(code: &str) -> VerifyOtpInput {
    VerifyOtpInput {
        phone: PHONE.to_owned(),
        code: code.to_owned(),
    }
}

/// A pending row as `request-otp` would have written it, shifted in time.
fn pending_row(code: &str, created_secs_ago: i64, expires_in_secs: i64) -> OtpRequest {
    let now = Utc::now();
    OtpRequest {
        id: Uuid::new_v4(),
        phone: PHONE.to_owned(),
        otp_hash: otp_hash(TEST_SALT, PHONE, code),
        status: OtpStatus::Pending,
        attempts: 0,
        ip_address: Some(IP.to_owned()),
        expires_at: now + Duration::seconds(expires_in_secs),
        created_at: now - Duration::seconds(created_secs_ago),
        verified_at: None,
    }
}

// ── request-otp ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_issue_code_and_persist_row() {
    let repo = MockOtpRepo::empty();
    let sms = MockSms::new();
    let rows = repo.rows_handle();
    let uc = request_usecase(repo, sms.clone());

    // Local 9-digit form must land on the canonical key.
    let out = uc.execute(request_input("901234567")).await.unwrap();
    assert_eq!(out.expires_in_seconds, 300);
    assert_eq!(out.retry_after_seconds, 120);

    let rows = rows.lock().unwrap();
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.id, out.request_id);
    assert_eq!(row.phone, PHONE);
    assert_eq!(row.status, OtpStatus::Pending);
    assert_eq!(row.attempts, 0);
    assert_eq!(row.ip_address.as_deref(), Some(IP));
    assert!(row.expires_at > Utc::now());

    // The stored hash matches the code that went out, and only that code.
    let code = sms.last_code().expect("a code was dispatched");
    assert_eq!(row.otp_hash, otp_hash(TEST_SALT, PHONE, &code));
}

#[tokio::test]
async fn should_reject_invalid_phone() {
    let uc = request_usecase(MockOtpRepo::empty(), MockSms::new());
    let result = uc.execute(request_input("12345")).await;
    assert!(
        matches!(result, Err(AuthServiceError::InvalidPhone)),
        "expected InvalidPhone, got {result:?}"
    );
}

#[tokio::test]
async fn should_not_persist_row_when_dispatch_fails() {
    let repo = MockOtpRepo::empty();
    let rows = repo.rows_handle();
    let uc = request_usecase(repo, MockSms::failing());

    let result = uc.execute(request_input(PHONE)).await;
    assert!(
        matches!(result, Err(AuthServiceError::SmsDispatch(_))),
        "expected SmsDispatch, got {result:?}"
    );
    // The user was never told a code was sent, so no row may exist.
    assert!(rows.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_enforce_cooldown_with_remaining_wait() {
    let repo = MockOtpRepo::new(vec![pending_row("111111", 30, 270)]);
    let uc = request_usecase(repo, MockSms::new());

    let result = uc.execute(request_input(PHONE)).await;
    match result {
        Err(AuthServiceError::Cooldown {
            retry_after_seconds,
        }) => {
            assert!(
                (1..=120).contains(&retry_after_seconds),
                "remaining wait must fit the 120s window, got {retry_after_seconds}"
            );
            assert!(
                retry_after_seconds <= 90,
                "30s already elapsed, got {retry_after_seconds}"
            );
        }
        other => panic!("expected Cooldown, got {other:?}"),
    }
}

#[tokio::test]
async fn should_enforce_hourly_phone_cap() {
    // Five issuances in the trailing hour, the newest safely past cooldown.
    let rows = (1..=5)
        .map(|i| pending_row("111111", i * 600, 300))
        .collect();
    let uc = request_usecase(MockOtpRepo::new(rows), MockSms::new());

    let result = uc.execute(request_input(PHONE)).await;
    assert!(
        matches!(result, Err(AuthServiceError::HourlyLimitReached)),
        "expected HourlyLimitReached, got {result:?}"
    );
}

#[tokio::test]
async fn should_enforce_daily_phone_cap() {
    // Twelve issuances spread over the trailing day, none inside the hour.
    let rows = (2..=13)
        .map(|h| pending_row("111111", h * 3600, 300))
        .collect();
    let uc = request_usecase(MockOtpRepo::new(rows), MockSms::new());

    let result = uc.execute(request_input(PHONE)).await;
    assert!(
        matches!(result, Err(AuthServiceError::DailyLimitReached)),
        "expected DailyLimitReached, got {result:?}"
    );
}

#[tokio::test]
async fn should_enforce_ip_cap_across_phones() {
    // Twenty sends from one source, each to a different phone; the target
    // phone itself is untouched, so only the IP check can trip.
    let now = Utc::now();
    let rows = (0..20)
        .map(|i| OtpRequest {
            id: Uuid::new_v4(),
            phone: format!("+9989012345{i:02}"),
            otp_hash: otp_hash(TEST_SALT, &format!("+9989012345{i:02}"), "111111"),
            status: OtpStatus::Pending,
            attempts: 0,
            ip_address: Some(IP.to_owned()),
            expires_at: now + Duration::seconds(300),
            created_at: now - Duration::seconds(600),
            verified_at: None,
        })
        .collect();
    let uc = request_usecase(MockOtpRepo::new(rows), MockSms::new());

    let result = uc.execute(request_input("+998907654321")).await;
    assert!(
        matches!(result, Err(AuthServiceError::IpLimitReached)),
        "expected IpLimitReached, got {result:?}"
    );
}

// ── verify-otp ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_verify_only_against_newest_code() {
    // An older, still-unexpired code and a fresh replacement.
    let repo = MockOtpRepo::new(vec![
        pending_row("111111", 200, 100),
        pending_row("222222", 10, 290),
    ]);
    let rows = repo.rows_handle();
    let uc = verify_usecase(repo, MockUserRepo::empty());

    // The superseded code no longer verifies...
    let result = uc.execute(verify_input("111111")).await;
    assert!(
        matches!(result, Err(AuthServiceError::WrongCode)),
        "expected WrongCode, got {result:?}"
    );

    // ...and the failed attempt was charged to the newest row.
    {
        let rows = rows.lock().unwrap();
        let newest = rows.iter().max_by_key(|r| r.created_at).unwrap();
        assert_eq!(newest.attempts, 1);
    }

    // The fresh code does verify.
    let user = uc.execute(verify_input("222222")).await.unwrap();
    assert_eq!(user.phone.as_deref(), Some(PHONE));

    let rows = rows.lock().unwrap();
    let newest = rows.iter().max_by_key(|r| r.created_at).unwrap();
    assert_eq!(newest.status, OtpStatus::Verified);
    assert!(newest.verified_at.is_some());
}

#[tokio::test]
async fn should_expire_stale_code_regardless_of_correctness() {
    let repo = MockOtpRepo::new(vec![pending_row("123456", 400, -100)]);
    let rows = repo.rows_handle();
    let uc = verify_usecase(repo, MockUserRepo::empty());

    let result = uc.execute(verify_input("123456")).await;
    assert!(
        matches!(result, Err(AuthServiceError::CodeExpired)),
        "expected CodeExpired, got {result:?}"
    );
    assert_eq!(rows.lock().unwrap()[0].status, OtpStatus::Expired);
}

#[tokio::test]
async fn should_exhaust_attempts_then_fail_terminally() {
    let repo = MockOtpRepo::new(vec![pending_row("123456", 10, 290)]);
    let rows = repo.rows_handle();
    let uc = verify_usecase(repo, MockUserRepo::empty());

    for _ in 0..5 {
        let result = uc.execute(verify_input("000000")).await;
        assert!(
            matches!(result, Err(AuthServiceError::WrongCode)),
            "expected WrongCode, got {result:?}"
        );
    }
    assert_eq!(rows.lock().unwrap()[0].attempts, 5);

    // Sixth attempt is rejected even with the RIGHT code, and the row is
    // terminally failed.
    let result = uc.execute(verify_input("123456")).await;
    assert!(
        matches!(result, Err(AuthServiceError::TooManyAttempts)),
        "expected TooManyAttempts, got {result:?}"
    );
    assert_eq!(rows.lock().unwrap()[0].status, OtpStatus::Failed);
}

#[tokio::test]
async fn should_create_user_with_synthetic_identity_on_first_login() {
    let repo = MockOtpRepo::new(vec![pending_row("123456", 10, 290)]);
    let users = MockUserRepo::empty();
    let stored = users.users_handle();
    let uc = verify_usecase(repo, users);

    let user = uc.execute(verify_input("123456")).await.unwrap();
    assert_eq!(user.telegram_id, sms_identity(PHONE));
    assert_eq!(user.full_name, format!("SMS user {PHONE}"));
    assert_eq!(user.phone.as_deref(), Some(PHONE));
    assert!(user.last_login_at.is_some());

    let stored = stored.lock().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, user.id);
}

#[tokio::test]
async fn should_refresh_existing_user_matched_by_phone() {
    let existing = test_user(Some(PHONE));
    let repo = MockOtpRepo::new(vec![pending_row("123456", 10, 290)]);
    let users = MockUserRepo::new(vec![existing.clone()]);
    let stored = users.users_handle();
    let uc = verify_usecase(repo, users);

    let user = uc.execute(verify_input("123456")).await.unwrap();
    assert_eq!(user.id, existing.id);

    let stored = stored.lock().unwrap();
    assert_eq!(stored.len(), 1, "no duplicate user may be created");
    assert!(stored[0].last_login_at.is_some());
}

#[tokio::test]
async fn should_fall_back_to_synthetic_identity_lookup() {
    // An SMS-only account that lost its phone backfill still matches via the
    // synthetic telegram_id, and the phone is re-backfilled.
    let mut existing = test_user(None);
    existing.telegram_id = sms_identity(PHONE);
    let repo = MockOtpRepo::new(vec![pending_row("123456", 10, 290)]);
    let users = MockUserRepo::new(vec![existing.clone()]);
    let stored = users.users_handle();
    let uc = verify_usecase(repo, users);

    let user = uc.execute(verify_input("123456")).await.unwrap();
    assert_eq!(user.id, existing.id);
    assert_eq!(user.phone.as_deref(), Some(PHONE));

    let stored = stored.lock().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].phone.as_deref(), Some(PHONE));
}

#[tokio::test]
async fn should_reject_malformed_inputs() {
    let uc = verify_usecase(MockOtpRepo::empty(), MockUserRepo::empty());

    let result = uc
        .execute(VerifyOtpInput {
            phone: "bogus".to_owned(),
            code: "123456".to_owned(),
        })
        .await;
    assert!(
        matches!(result, Err(AuthServiceError::InvalidPhone)),
        "expected InvalidPhone, got {result:?}"
    );

    let result = uc.execute(verify_input("12x45")).await;
    assert!(
        matches!(result, Err(AuthServiceError::InvalidCode)),
        "expected InvalidCode, got {result:?}"
    );
}

#[tokio::test]
async fn should_require_an_active_code() {
    let uc = verify_usecase(MockOtpRepo::empty(), MockUserRepo::empty());
    let result = uc.execute(verify_input("123456")).await;
    assert!(
        matches!(result, Err(AuthServiceError::NoActiveCode)),
        "expected NoActiveCode, got {result:?}"
    );
}
