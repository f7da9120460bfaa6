use {async_trait::async_trait, secrecy::Secret};

use {crate::error::Result, petrel_richtext::ComposedMessage};

/// An authenticated session with the identity provider.
///
/// Lives for one delivery; sessions are never reused across requests.
#[derive(Clone, Debug)]
pub struct ChatSession {
    pub did: String,
    pub handle: String,
    pub access_token: Secret<String>,
}

/// Resolved actor profile: the stable identifier behind a handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorProfile {
    pub did: String,
    pub handle: String,
}

/// The 1:1 conversation channel used for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationHandle {
    pub id: String,
    pub member_dids: Vec<String>,
}

/// Receipt returned by the chat service for an accepted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageReceipt {
    pub id: String,
}

/// Accepts a handle/credential pair and returns an authenticated session.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn create_session(
        &self,
        identifier: &str,
        password: &Secret<String>,
    ) -> Result<ChatSession>;
}

/// Resolves a human-readable handle to a stable actor identifier.
#[async_trait]
pub trait ProfileDirectory: Send + Sync {
    async fn resolve_actor(&self, session: &ChatSession, handle: &str) -> Result<ActorProfile>;
}

/// Fixed chat-backend contract: conversation resolution plus dispatch.
///
/// A backend that cannot satisfy this contract is rejected when the client
/// is constructed, never probed per call.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Resolve (or lazily create) the 1:1 conversation with `target_did`.
    async fn resolve_conversation(
        &self,
        session: &ChatSession,
        target_did: &str,
    ) -> Result<ConversationHandle>;

    /// Send a composed message into a resolved conversation.
    ///
    /// No local retry and no idempotency guarantee: sending twice produces
    /// two remote messages.
    async fn send_message(
        &self,
        session: &ChatSession,
        convo: &ConversationHandle,
        message: &ComposedMessage,
    ) -> Result<MessageReceipt>;
}
