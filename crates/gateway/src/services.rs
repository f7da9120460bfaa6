//! Trait interface for the delivery service the gateway delegates to.
//! Production wires in `LiveDmService`; tests inject stubs.

use std::sync::Arc;

use {async_trait::async_trait, tracing::warn};

use {
    petrel_chat::{DeliveryFailure, DeliveryOutcome, DmDelivery, ErrorKind, XrpcChatClient, deliver},
    petrel_config::ChatServiceConfig,
};

/// Deliver one direct message. Implementations never error out of band;
/// every failure is a classified `DeliveryOutcome::Failure`.
#[async_trait]
pub trait DmService: Send + Sync {
    async fn deliver(&self, request: DmDelivery) -> DeliveryOutcome;
}

/// Domain services threaded through the gateway state.
#[derive(Clone)]
pub struct GatewayServices {
    pub dm: Arc<dyn DmService>,
}

impl GatewayServices {
    #[must_use]
    pub fn live(chat: ChatServiceConfig) -> Self {
        Self {
            dm: Arc::new(LiveDmService { chat }),
        }
    }
}

/// Production service: one fresh XRPC client per request, the full chat
/// pipeline behind it. Nothing is shared or cached across requests.
pub struct LiveDmService {
    chat: ChatServiceConfig,
}

impl LiveDmService {
    #[must_use]
    pub fn new(chat: ChatServiceConfig) -> Self {
        Self { chat }
    }
}

#[async_trait]
impl DmService for LiveDmService {
    async fn deliver(&self, request: DmDelivery) -> DeliveryOutcome {
        let client = match XrpcChatClient::new(
            &self.chat.service_url,
            &self.chat.chat_service,
            self.chat.request_timeout(),
        ) {
            Ok(client) => client,
            Err(e) => {
                // Misconfigured backend: fail fast, but still inside the
                // body-encoded error contract.
                warn!(error = %e, "chat backend unavailable");
                return DeliveryOutcome::Failure(DeliveryFailure {
                    kind: ErrorKind::Dm,
                    message: format!("Failed to send DM to {}: {e}", request.target_handle),
                    retry_after: None,
                    target_handle: Some(request.target_handle.clone()),
                });
            },
        };
        deliver(&client, &client, &client, &request).await
    }
}
