use {
    axum::{Json, body::Bytes, extract::State},
    secrecy::{ExposeSecret, Secret},
    tracing::{info, warn},
};

use {
    crate::{
        state::AppState,
        wire::{
            DmRequestBody, DmResponse, MAX_MESSAGE_CHARS, MESSAGE_TOO_LONG_ERROR,
            MISSING_FIELDS_ERROR,
        },
    },
    petrel_chat::DmDelivery,
    petrel_richtext::validate_spans,
};

/// Handle `POST /dm`.
///
/// Every outcome is HTTP 200 with success encoded in the body. Validation
/// failures are detected here and short-circuit before any remote call;
/// everything past validation is the delivery service's problem.
pub async fn dm_handler(State(state): State<AppState>, body: Bytes) -> Json<DmResponse> {
    let request: DmRequestBody = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "rejected unparseable /dm body");
            return Json(DmResponse::validation_error(format!("Invalid JSON data: {e}")));
        },
    };

    let Some(user_handle) = non_empty(request.user_handle) else {
        return Json(DmResponse::validation_error(MISSING_FIELDS_ERROR));
    };
    let Some(password) = non_empty_secret(request.user_password) else {
        return Json(DmResponse::validation_error(MISSING_FIELDS_ERROR));
    };
    let Some(target_handle) = non_empty(request.target_handle) else {
        return Json(DmResponse::validation_error(MISSING_FIELDS_ERROR));
    };
    let Some(message) = non_empty(request.message) else {
        return Json(DmResponse::validation_error(MISSING_FIELDS_ERROR));
    };

    if message.chars().count() > MAX_MESSAGE_CHARS {
        return Json(DmResponse::validation_error(MESSAGE_TOO_LONG_ERROR));
    }

    if let Some(links) = request.embedded_links.as_deref()
        && !links.is_empty()
        && let Err(e) = validate_spans(&message, links)
    {
        warn!(target_handle = %target_handle, error = %e, "rejected invalid embedded links");
        return Json(DmResponse::validation_error(format!(
            "Invalid embedded links: {e}"
        )));
    }

    info!(
        target_handle = %target_handle,
        message_chars = message.chars().count(),
        link_count = request.embedded_links.as_deref().map_or(0, |links| links.len()),
        "delivering direct message"
    );
    let outcome = state
        .services
        .dm
        .deliver(DmDelivery {
            user_handle,
            password,
            target_handle,
            message,
            links: request.embedded_links,
        })
        .await;
    Json(DmResponse::from_outcome(outcome))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

fn non_empty_secret(value: Option<Secret<String>>) -> Option<Secret<String>> {
    value.filter(|s| !s.expose_secret().is_empty())
}
