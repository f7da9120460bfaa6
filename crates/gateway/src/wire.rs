use {
    secrecy::Secret,
    serde::{Deserialize, Serialize},
};

use {
    petrel_chat::{DeliveryFailure, DeliveryOutcome, ErrorKind},
    petrel_richtext::LinkSpan,
};

/// Maximum message length, counted in characters.
pub const MAX_MESSAGE_CHARS: usize = 1000;

/// Stable wording for missing/empty required fields.
pub const MISSING_FIELDS_ERROR: &str =
    "Missing required fields (userHandle, userPassword, targetHandle, message)";

/// Stable wording for an oversize message.
pub const MESSAGE_TOO_LONG_ERROR: &str = "Message too long. Maximum 1000 characters allowed.";

/// Inbound `/dm` request body.
///
/// Every field is optional at parse time so missing-field reporting happens
/// in one place with the stable wording instead of as a serde error. The
/// password deserializes straight into a `Secret` and never derives Debug.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DmRequestBody {
    pub user_handle: Option<String>,
    pub user_password: Option<Secret<String>>,
    pub target_handle: Option<String>,
    pub message: Option<String>,
    pub embedded_links: Option<Vec<LinkSpan>>,
}

/// Outbound `/dm` response body. The transport status is always 200;
/// success lives here.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum DmResponse {
    Success {
        success: bool,
        message: String,
        target_handle: String,
        rich_text_used: bool,
    },
    Failure {
        success: bool,
        error: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        error_type: Option<ErrorKind>,
        #[serde(skip_serializing_if = "Option::is_none")]
        target_handle: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        retry_after: Option<u64>,
    },
}

impl DmResponse {
    #[must_use]
    pub fn success(target_handle: String, rich_text_used: bool) -> Self {
        Self::Success {
            success: true,
            message: format!("Successfully sent DM to {target_handle}"),
            target_handle,
            rich_text_used,
        }
    }

    /// Locally detected validation failure. Carries no `error_type`: the
    /// wire enum has no validation member and existing callers expect the
    /// field to be absent.
    #[must_use]
    pub fn validation_error(error: impl Into<String>) -> Self {
        Self::Failure {
            success: false,
            error: error.into(),
            error_type: None,
            target_handle: None,
            retry_after: None,
        }
    }

    #[must_use]
    pub fn from_failure(failure: DeliveryFailure) -> Self {
        Self::Failure {
            success: false,
            error: failure.message,
            error_type: Some(failure.kind),
            target_handle: failure.target_handle,
            retry_after: failure.retry_after,
        }
    }

    #[must_use]
    pub fn from_outcome(outcome: DeliveryOutcome) -> Self {
        match outcome {
            DeliveryOutcome::Success {
                target_handle,
                rich_text_used,
            } => Self::success(target_handle, rich_text_used),
            DeliveryOutcome::Failure(failure) => Self::from_failure(failure),
        }
    }
}
