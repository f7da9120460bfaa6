//! Direct-message delivery over the AT Protocol chat service.
//!
//! The backend contract is three fixed traits (identity, profile directory,
//! chat backend); `XrpcChatClient` implements all of them against a PDS.
//! The delivery pipeline drives one message through auth, profile
//! resolution, rich-text composition, conversation resolution, and
//! dispatch, classifying every remote failure into a stable error taxonomy.

pub mod backend;
pub mod classify;
pub mod error;
pub mod outcome;
pub mod pipeline;
pub mod xrpc;

pub use {
    backend::{
        ActorProfile, ChatBackend, ChatSession, ConversationHandle, IdentityProvider,
        MessageReceipt, ProfileDirectory,
    },
    classify::{RATE_LIMIT_RETRY_AFTER_SECS, classify_delivery_error},
    error::{Error, Result},
    outcome::{DeliveryFailure, DeliveryOutcome, ErrorKind},
    pipeline::{DmDelivery, deliver},
    xrpc::{DEFAULT_CHAT_SERVICE, DEFAULT_SERVICE_URL, XrpcChatClient},
};
