use serde::Serialize;

/// Stable error taxonomy surfaced to callers on the wire.
///
/// Serialized names are the wire `error_type` values and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    #[serde(rename = "AuthenticationError")]
    Authentication,
    #[serde(rename = "UserNotFound")]
    UserNotFound,
    #[serde(rename = "RichTextError")]
    RichText,
    #[serde(rename = "ConversationError")]
    Conversation,
    #[serde(rename = "BlockedError")]
    Blocked,
    #[serde(rename = "DMsDisabled")]
    DmsDisabled,
    #[serde(rename = "RateLimit")]
    RateLimit,
    #[serde(rename = "DMError")]
    Dm,
}

impl ErrorKind {
    /// Wire name of this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Authentication => "AuthenticationError",
            Self::UserNotFound => "UserNotFound",
            Self::RichText => "RichTextError",
            Self::Conversation => "ConversationError",
            Self::Blocked => "BlockedError",
            Self::DmsDisabled => "DMsDisabled",
            Self::RateLimit => "RateLimit",
            Self::Dm => "DMError",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified delivery failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryFailure {
    pub kind: ErrorKind,
    pub message: String,
    /// Suggested wait before retrying, in seconds. `RateLimit` only.
    pub retry_after: Option<u64>,
    /// Populated for the kinds whose wire responses echo the target back.
    pub target_handle: Option<String>,
}

/// Outcome of one delivery attempt. Failures are always classified; a raw
/// remote error never reaches the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Success {
        target_handle: String,
        rich_text_used: bool,
    },
    Failure(DeliveryFailure),
}
