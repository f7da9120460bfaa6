//! HTTP gateway for petrel direct-message delivery.
//!
//! One route does the work: `POST /dm`. Every response is HTTP 200 with
//! success encoded in the body; the wire contract predates this
//! implementation and existing callers depend on it. Validation failures
//! short-circuit locally; everything else is delegated through the
//! `DmService` seam so tests can run the full HTTP surface against stubs.

pub mod dm;
pub mod server;
pub mod services;
pub mod state;
pub mod wire;

pub use {
    server::{build_gateway_app, run_gateway},
    services::{DmService, GatewayServices, LiveDmService},
    state::AppState,
};
