use crate::{
    detect::detect_links,
    error::Result,
    segment::{LinkSpan, Segment, segment_message},
};

/// A byte-range link annotation on the composed text.
///
/// Offsets index the UTF-8 encoding of the composed text, not its
/// characters. The remote protocol slices the encoded bytes directly, so a
/// character offset here would point a facet at the wrong substring
/// whenever multi-byte text precedes the link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Facet {
    pub byte_start: usize,
    pub byte_end: usize,
    pub url: String,
}

/// Final composed text plus its ordered link facets.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ComposedMessage {
    pub text: String,
    pub facets: Vec<Facet>,
}

impl ComposedMessage {
    /// Whether the message carries any link annotation.
    #[must_use]
    pub fn has_facets(&self) -> bool {
        !self.facets.is_empty()
    }
}

/// Concatenate segment display texts and record byte-offset facets.
///
/// The cursor advances by UTF-8 byte length per segment. Facets come out in
/// non-decreasing `byte_start` order and never overlap because the input
/// segments are already an ordered partition. Links with empty display text
/// emit no facet (`byte_start < byte_end` must hold).
#[must_use]
pub fn encode_facets(segments: &[Segment]) -> ComposedMessage {
    let mut text = String::new();
    let mut facets = Vec::new();
    for segment in segments {
        match segment {
            Segment::Plain { text: run } => text.push_str(run),
            Segment::Link { text: run, url } => {
                let byte_start = text.len();
                text.push_str(run);
                if text.len() > byte_start {
                    facets.push(Facet {
                        byte_start,
                        byte_end: text.len(),
                        url: url.clone(),
                    });
                }
            },
        }
    }
    ComposedMessage { text, facets }
}

/// Compose a message from explicit link spans.
pub fn compose(message: &str, spans: &[LinkSpan]) -> Result<ComposedMessage> {
    Ok(encode_facets(&segment_message(message, spans)?))
}

/// Compose a message, auto-detecting bare URLs.
///
/// Detected spans are in-bounds and non-overlapping by construction, so
/// this cannot fail.
#[must_use]
pub fn compose_auto(message: &str) -> ComposedMessage {
    let spans = detect_links(message);
    segment_message(message, &spans)
        .map(|segments| encode_facets(&segments))
        .unwrap_or_default()
}
