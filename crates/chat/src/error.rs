use thiserror::Error;

/// Crate-wide result type for chat operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Typed errors for the chat backend and delivery pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// The identity provider rejected the credentials.
    #[error("authentication failed: {message}")]
    Auth { message: String },

    /// The target handle does not resolve to an actor.
    #[error("unknown actor {handle}: {message}")]
    ActorNotFound { handle: String, message: String },

    /// The configured backend does not satisfy the convo contract.
    #[error("unsupported chat backend: {message}")]
    UnsupportedBackend { message: String },

    /// Rich-text composition failed.
    #[error(transparent)]
    RichText(#[from] petrel_richtext::Error),

    /// A chat call failed remotely; recovered by the error classifier.
    #[error("remote chat call failed: {message}")]
    Remote { status: Option<u16>, message: String },

    /// Transport-level failure reaching the remote service.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// JSON (de)serialization failed.
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

impl Error {
    #[must_use]
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn actor_not_found(handle: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ActorNotFound {
            handle: handle.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn unsupported_backend(message: impl Into<String>) -> Self {
        Self::UnsupportedBackend {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn remote(status: impl Into<Option<u16>>, message: impl Into<String>) -> Self {
        Self::Remote {
            status: status.into(),
            message: message.into(),
        }
    }
}
