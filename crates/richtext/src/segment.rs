use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A hyperlink covering a character range of the original message.
///
/// `start`/`end` are character offsets, not bytes: callers address the
/// message as they see it, before UTF-8 encoding. The display `text`
/// substitutes for the covered range in the composed output; auto-detected
/// spans always carry the matched URL as their display text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSpan {
    pub text: String,
    pub url: String,
    pub start: usize,
    pub end: usize,
}

/// One run of the segmented message, in display order.
///
/// Concatenating display texts yields the composed message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Plain { text: String },
    Link { text: String, url: String },
}

impl Segment {
    /// Display text this segment contributes to the composed message.
    #[must_use]
    pub fn display_text(&self) -> &str {
        match self {
            Self::Plain { text } | Self::Link { text, .. } => text,
        }
    }
}

/// Check span bounds and overlap without segmenting.
///
/// Cheap enough to run before any remote call; `segment_message` repeats
/// the same checks so it cannot be bypassed.
pub fn validate_spans(message: &str, spans: &[LinkSpan]) -> Result<()> {
    let len = message.chars().count();
    for span in spans {
        if span.end < span.start {
            return Err(Error::SpanInverted {
                start: span.start,
                end: span.end,
            });
        }
        if span.end > len {
            return Err(Error::SpanOutOfBounds {
                start: span.start,
                end: span.end,
                len,
            });
        }
    }

    let mut sorted: Vec<&LinkSpan> = spans.iter().collect();
    sorted.sort_by_key(|s| s.start);
    for pair in sorted.windows(2) {
        if pair[1].start < pair[0].end {
            return Err(Error::OverlappingSpans {
                first_end: pair[0].end,
                second_start: pair[1].start,
            });
        }
    }
    Ok(())
}

/// Partition `message` into plain and link runs.
///
/// Spans are sorted ascending by `start` (stable on ties); non-empty gaps
/// between spans become `Plain` segments, each span becomes a `Link`
/// segment carrying the supplied display text and url, and a non-empty
/// suffix after the last span becomes a trailing `Plain` segment. This is
/// the minimal sequence whose display texts concatenate back to the message
/// when every span's text equals the slice it covers.
pub fn segment_message(message: &str, spans: &[LinkSpan]) -> Result<Vec<Segment>> {
    validate_spans(message, spans)?;

    let mut sorted: Vec<&LinkSpan> = spans.iter().collect();
    sorted.sort_by_key(|s| s.start);

    let len = message.chars().count();
    let mut segments = Vec::with_capacity(sorted.len() * 2 + 1);
    let mut cursor = 0usize;
    for span in sorted {
        if span.start > cursor {
            segments.push(Segment::Plain {
                text: slice_chars(message, cursor, span.start),
            });
        }
        segments.push(Segment::Link {
            text: span.text.clone(),
            url: span.url.clone(),
        });
        cursor = span.end;
    }
    if cursor < len {
        segments.push(Segment::Plain {
            text: slice_chars(message, cursor, len),
        });
    }
    Ok(segments)
}

/// Slice `text` by character offsets. Byte slicing is not valid here: the
/// message may contain multi-byte characters before the range.
fn slice_chars(text: &str, start: usize, end: usize) -> String {
    text.chars().skip(start).take(end - start).collect()
}
