//! Rich-text composition for AT Protocol direct messages.
//!
//! Turns raw message text plus link spans (caller-supplied or auto-detected)
//! into a final text and an ordered list of link facets. Span offsets are
//! measured in characters; facet offsets are measured in bytes of the UTF-8
//! encoded composed text, which is what the remote protocol slices.

pub mod detect;
pub mod error;
pub mod facet;
pub mod segment;

pub use {
    detect::detect_links,
    error::{Error, Result},
    facet::{ComposedMessage, Facet, compose, compose_auto, encode_facets},
    segment::{LinkSpan, Segment, segment_message, validate_spans},
};
