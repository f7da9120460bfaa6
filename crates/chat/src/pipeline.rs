use {
    secrecy::Secret,
    tracing::{info, warn},
};

use {
    crate::{
        backend::{ChatBackend, IdentityProvider, ProfileDirectory},
        classify::classify_delivery_error,
        error::Error,
        outcome::{DeliveryFailure, DeliveryOutcome, ErrorKind},
    },
    petrel_richtext::{ComposedMessage, LinkSpan},
};

/// One delivery request. Owned by the pipeline for the duration of a single
/// inbound request; nothing survives it.
pub struct DmDelivery {
    pub user_handle: String,
    pub password: Secret<String>,
    pub target_handle: String,
    pub message: String,
    /// Explicit link spans; `None` or empty enables URL auto-detection.
    pub links: Option<Vec<LinkSpan>>,
}

/// Drive one message through auth, profile resolution, composition,
/// conversation resolution, and dispatch.
///
/// Infallible by construction: every failure comes back as a classified
/// `DeliveryOutcome::Failure`, never as a raw remote error. Strictly
/// sequential; concurrent deliveries share nothing.
pub async fn deliver(
    identity: &dyn IdentityProvider,
    directory: &dyn ProfileDirectory,
    backend: &dyn ChatBackend,
    request: &DmDelivery,
) -> DeliveryOutcome {
    let target = request.target_handle.as_str();

    let session = match identity
        .create_session(&request.user_handle, &request.password)
        .await
    {
        Ok(session) => session,
        Err(e) => {
            warn!(user_handle = %request.user_handle, error = %e, "authentication failed");
            return DeliveryOutcome::Failure(DeliveryFailure {
                kind: ErrorKind::Authentication,
                message: format!("Authentication failed: {}", remote_detail(&e)),
                retry_after: None,
                target_handle: None,
            });
        },
    };

    let profile = match directory.resolve_actor(&session, target).await {
        Ok(profile) => profile,
        Err(e) => {
            warn!(target_handle = target, error = %e, "profile resolution failed");
            return DeliveryOutcome::Failure(DeliveryFailure {
                kind: ErrorKind::UserNotFound,
                message: format!("Could not find user {target}: {}", remote_detail(&e)),
                retry_after: None,
                target_handle: None,
            });
        },
    };

    // Callers pre-validate spans, so a composition failure here is a
    // defensive path rather than an expected one.
    let composed = match compose_request(request) {
        Ok(composed) => composed,
        Err(e) => {
            warn!(target_handle = target, error = %e, "rich-text composition failed");
            return DeliveryOutcome::Failure(DeliveryFailure {
                kind: ErrorKind::RichText,
                message: format!("Failed to compose rich text: {e}"),
                retry_after: None,
                target_handle: None,
            });
        },
    };
    let rich_text_used = composed.has_facets();

    let convo = match backend.resolve_conversation(&session, &profile.did).await {
        Ok(convo) => convo,
        Err(e) => return classified(target, &e),
    };

    info!(
        target_handle = target,
        convo_id = %convo.id,
        facet_count = composed.facets.len(),
        "dispatching direct message"
    );
    match backend.send_message(&session, &convo, &composed).await {
        Ok(receipt) => {
            info!(target_handle = target, message_id = %receipt.id, "direct message delivered");
            DeliveryOutcome::Success {
                target_handle: target.to_owned(),
                rich_text_used,
            }
        },
        Err(e) => classified(target, &e),
    }
}

fn compose_request(request: &DmDelivery) -> petrel_richtext::Result<ComposedMessage> {
    match request.links.as_deref() {
        Some(spans) if !spans.is_empty() => petrel_richtext::compose(&request.message, spans),
        _ => Ok(petrel_richtext::compose_auto(&request.message)),
    }
}

/// Route a resolution or dispatch failure through the classifier.
fn classified(target: &str, error: &Error) -> DeliveryOutcome {
    let (status, message) = match error {
        Error::Remote { status, message } => (*status, message.clone()),
        other => (None, other.to_string()),
    };
    warn!(target_handle = target, status = ?status, "delivery failed");
    DeliveryOutcome::Failure(classify_delivery_error(target, status, &message))
}

/// Bare remote detail for auth/profile failures; the surrounding wording is
/// added by the caller-facing message.
fn remote_detail(error: &Error) -> String {
    match error {
        Error::Auth { message } | Error::UnsupportedBackend { message } => message.clone(),
        Error::ActorNotFound { message, .. } => message.clone(),
        other => other.to_string(),
    }
}
