use std::time::Duration;

use {
    async_trait::async_trait,
    secrecy::{ExposeSecret, Secret},
    serde::Deserialize,
    serde_json::json,
    tracing::debug,
};

use {
    crate::{
        backend::{
            ActorProfile, ChatBackend, ChatSession, ConversationHandle, IdentityProvider,
            MessageReceipt, ProfileDirectory,
        },
        error::{Error, Result},
    },
    petrel_richtext::{ComposedMessage, Facet},
};

/// Default PDS entrypoint.
pub const DEFAULT_SERVICE_URL: &str = "https://bsky.social";

/// Default chat-service proxy target.
pub const DEFAULT_CHAT_SERVICE: &str = "did:web:api.bsky.chat#bsky_chat";

/// Service fragment a proxy target must expose for the convo contract.
const CHAT_SERVICE_FRAGMENT: &str = "#bsky_chat";

/// XRPC client for one PDS plus its proxied chat service.
///
/// One instance serves one inbound request; nothing is cached across
/// requests. Every call is bounded by the request-scoped timeout.
#[derive(Debug)]
pub struct XrpcChatClient {
    http: reqwest::Client,
    service_url: String,
    chat_service: String,
}

impl XrpcChatClient {
    /// Build a client, failing fast when the configured chat service does
    /// not expose the convo contract.
    pub fn new(service_url: &str, chat_service: &str, timeout: Duration) -> Result<Self> {
        if !chat_service.ends_with(CHAT_SERVICE_FRAGMENT) {
            return Err(Error::unsupported_backend(format!(
                "chat service '{chat_service}' does not expose the {CHAT_SERVICE_FRAGMENT} convo contract"
            )));
        }
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            service_url: service_url.trim_end_matches('/').to_owned(),
            chat_service: chat_service.to_owned(),
        })
    }

    fn xrpc_url(&self, nsid: &str) -> String {
        format!("{}/xrpc/{nsid}", self.service_url)
    }
}

// ── Wire shapes ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateSessionOutput {
    did: String,
    handle: String,
    access_jwt: String,
}

#[derive(Debug, Deserialize)]
struct ProfileOutput {
    did: String,
    handle: String,
}

#[derive(Debug, Deserialize)]
struct ConvoOutput {
    convo: ConvoView,
}

#[derive(Debug, Deserialize)]
struct ConvoView {
    id: String,
    #[serde(default)]
    members: Vec<ConvoMember>,
}

#[derive(Debug, Deserialize)]
struct ConvoMember {
    did: String,
}

#[derive(Debug, Deserialize)]
struct SendMessageOutput {
    id: String,
}

#[derive(Debug, Deserialize)]
struct XrpcErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Extract the human-readable message from a non-success XRPC response.
///
/// XRPC errors are `{error, message}` JSON; fall back to the raw body, then
/// the bare status, so classification always has text to work with.
async fn error_detail(resp: reqwest::Response) -> (u16, String) {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<XrpcErrorBody>(&body)
        .ok()
        .and_then(|parsed| parsed.message.or(parsed.error))
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                format!("HTTP {status}")
            } else {
                body.clone()
            }
        });
    (status, message)
}

/// Serialize a link facet the way the chat lexicon expects it: byte-range
/// index plus a link feature.
fn facet_json(facet: &Facet) -> serde_json::Value {
    json!({
        "index": { "byteStart": facet.byte_start, "byteEnd": facet.byte_end },
        "features": [{ "$type": "app.bsky.richtext.facet#link", "uri": facet.url }],
    })
}

fn message_input(message: &ComposedMessage) -> serde_json::Value {
    let mut input = json!({ "text": message.text });
    if message.has_facets() {
        input["facets"] = serde_json::Value::Array(message.facets.iter().map(facet_json).collect());
    }
    input
}

// ── Contract implementations ─────────────────────────────────────────────────

#[async_trait]
impl IdentityProvider for XrpcChatClient {
    async fn create_session(
        &self,
        identifier: &str,
        password: &Secret<String>,
    ) -> Result<ChatSession> {
        let resp = self
            .http
            .post(self.xrpc_url("com.atproto.server.createSession"))
            .json(&json!({ "identifier": identifier, "password": password.expose_secret() }))
            .send()
            .await?;
        if !resp.status().is_success() {
            let (_, message) = error_detail(resp).await;
            return Err(Error::auth(message));
        }
        let body: CreateSessionOutput = resp.json().await?;
        debug!(did = %body.did, handle = %body.handle, "session created");
        Ok(ChatSession {
            did: body.did,
            handle: body.handle,
            access_token: Secret::new(body.access_jwt),
        })
    }
}

#[async_trait]
impl ProfileDirectory for XrpcChatClient {
    async fn resolve_actor(&self, session: &ChatSession, handle: &str) -> Result<ActorProfile> {
        let resp = self
            .http
            .get(self.xrpc_url("app.bsky.actor.getProfile"))
            .query(&[("actor", handle)])
            .bearer_auth(session.access_token.expose_secret())
            .send()
            .await?;
        if !resp.status().is_success() {
            let (_, message) = error_detail(resp).await;
            return Err(Error::actor_not_found(handle, message));
        }
        let body: ProfileOutput = resp.json().await?;
        debug!(did = %body.did, "actor resolved");
        Ok(ActorProfile {
            did: body.did,
            handle: body.handle,
        })
    }
}

#[async_trait]
impl ChatBackend for XrpcChatClient {
    async fn resolve_conversation(
        &self,
        session: &ChatSession,
        target_did: &str,
    ) -> Result<ConversationHandle> {
        let resp = self
            .http
            .get(self.xrpc_url("chat.bsky.convo.getConvoForMembers"))
            .query(&[("members", target_did)])
            .bearer_auth(session.access_token.expose_secret())
            .header("atproto-proxy", &self.chat_service)
            .send()
            .await?;
        if !resp.status().is_success() {
            let (status, message) = error_detail(resp).await;
            return Err(Error::remote(status, message));
        }
        let body: ConvoOutput = resp.json().await?;
        debug!(convo_id = %body.convo.id, "conversation resolved");
        Ok(ConversationHandle {
            id: body.convo.id,
            member_dids: body.convo.members.into_iter().map(|m| m.did).collect(),
        })
    }

    async fn send_message(
        &self,
        session: &ChatSession,
        convo: &ConversationHandle,
        message: &ComposedMessage,
    ) -> Result<MessageReceipt> {
        let resp = self
            .http
            .post(self.xrpc_url("chat.bsky.convo.sendMessage"))
            .bearer_auth(session.access_token.expose_secret())
            .header("atproto-proxy", &self.chat_service)
            .json(&json!({ "convoId": convo.id, "message": message_input(message) }))
            .send()
            .await?;
        if !resp.status().is_success() {
            let (status, message) = error_detail(resp).await;
            return Err(Error::remote(status, message));
        }
        let body: SendMessageOutput = resp.json().await?;
        Ok(MessageReceipt { id: body.id })
    }
}
