//! Login handshake state machines and the deep-link format.
//!
//! Auth requests and OTP requests are shared mutable rows touched by
//! independent processes with no lock between them. Correctness rests on the
//! transitions being monotonic and idempotent: a transition that has already
//! been applied is a no-op, never an error, so repeated or racing writers
//! converge on the same terminal state.

use uuid::Uuid;

/// Status of a cross-process login handshake (`auth_requests.status`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRequestStatus {
    Pending,
    Completed,
    Expired,
    Failed,
}

impl AuthRequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Expired => "expired",
            Self::Failed => "failed",
        }
    }

    /// Parse the stored text form. Returns `None` for unknown values.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            "expired" => Some(Self::Expired),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Monotonic transition table: forward-only, terminal states absorb.
    /// Re-applying the current state is allowed (idempotent no-op).
    pub fn can_transition_to(self, next: Self) -> bool {
        self == next || !self.is_terminal()
    }
}

/// Status of an SMS one-time-code row (`sms_otp_requests.status`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpStatus {
    Pending,
    Verified,
    Expired,
    Failed,
}

impl OtpStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Verified => "verified",
            Self::Expired => "expired",
            Self::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "verified" => Some(Self::Verified),
            "expired" => Some(Self::Expired),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    pub fn can_transition_to(self, next: Self) -> bool {
        self == next || !self.is_terminal()
    }
}

/// Deep link that opens the Telegram bot with the handshake id as the
/// `/start` payload.
pub fn telegram_deep_link(bot_username: &str, request_id: Uuid) -> String {
    format!("https://t.me/{bot_username}?start={request_id}")
}
