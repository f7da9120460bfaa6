use crate::outcome::{DeliveryFailure, ErrorKind};

/// Fixed retry hint for rate-limited deliveries. The remote API does not
/// reliably surface a retry-after value, and this service does not retry.
pub const RATE_LIMIT_RETRY_AFTER_SECS: u64 = 60;

/// Map a raw remote failure onto the stable error taxonomy.
///
/// Substring-driven and case-insensitive, first match wins. The remote
/// protocol collapses many distinct refusal causes into one error, so the
/// likely cause is recovered from the wording. The wording of a third-party
/// API is not a stable contract: every heuristic stays inside this function
/// and the mapping is not assumed complete.
#[must_use]
pub fn classify_delivery_error(
    target_handle: &str,
    status: Option<u16>,
    raw_message: &str,
) -> DeliveryFailure {
    let lower = raw_message.to_lowercase();

    if lower.contains("block") {
        return DeliveryFailure {
            kind: ErrorKind::Blocked,
            message: format!("Cannot send DM to {target_handle}: You may be blocked by this user"),
            retry_after: None,
            target_handle: None,
        };
    }

    if lower.contains("disabled") || lower.contains("not accepting") {
        return DeliveryFailure {
            kind: ErrorKind::DmsDisabled,
            message: format!("Cannot send DM to {target_handle}: User has DMs disabled"),
            retry_after: None,
            target_handle: None,
        };
    }

    if lower.contains("conversation") || lower.contains("convo") {
        return DeliveryFailure {
            kind: ErrorKind::Conversation,
            message: format!(
                "Cannot send DM to {target_handle}: Conversation error. User may not accept DMs from you."
            ),
            retry_after: None,
            target_handle: None,
        };
    }

    let rate_limited = status == Some(429)
        || (lower.contains("rate") && lower.contains("limit"))
        || lower.contains("too many requests")
        || lower.contains("ratelimit");
    if rate_limited {
        return DeliveryFailure {
            kind: ErrorKind::RateLimit,
            message: "Rate limit exceeded. Please slow down your requests.".into(),
            retry_after: Some(RATE_LIMIT_RETRY_AFTER_SECS),
            target_handle: Some(target_handle.to_owned()),
        };
    }

    DeliveryFailure {
        kind: ErrorKind::Dm,
        message: format!("Failed to send DM to {target_handle}: {raw_message}"),
        retry_after: None,
        target_handle: Some(target_handle.to_owned()),
    }
}
