use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PetrelConfig {
    pub server: ServerConfig,
    pub chat: ChatServiceConfig,
}

/// Gateway listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".into(),
            port: 8787,
        }
    }
}

/// Remote chat service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatServiceConfig {
    /// PDS entrypoint the XRPC client talks to.
    pub service_url: String,

    /// Proxy target for the chat service (must expose the convo contract).
    pub chat_service: String,

    /// Request-scoped timeout bounding each remote call, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ChatServiceConfig {
    fn default() -> Self {
        Self {
            service_url: "https://bsky.social".into(),
            chat_service: "did:web:api.bsky.chat#bsky_chat".into(),
            request_timeout_secs: 30,
        }
    }
}

impl ChatServiceConfig {
    #[must_use]
    pub const fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs)
    }
}
