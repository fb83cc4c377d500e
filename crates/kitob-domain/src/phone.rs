//! Phone number normalization.

/// Normalize a raw phone number to canonical E.164 form.
///
/// Accepted inputs (anything else is rejected):
/// - 12 digits starting with the `998` country code, with or without a
///   leading `+` and arbitrary formatting characters;
/// - 9-digit local numbers, which are assumed to belong to `+998`.
///
/// The canonical value is the lookup key for both `sms_otp_requests` and
/// `users.phone`, so every caller must normalize before touching storage.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    match digits.len() {
        12 if digits.starts_with("998") => Some(format!("+{digits}")),
        9 => Some(format!("+998{digits}")),
        _ => None,
    }
}
