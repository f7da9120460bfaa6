use thiserror::Error;

/// Crate-wide result type for composition operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while validating or segmenting link spans.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A span ends before it starts.
    #[error("link span {start}..{end} ends before it starts")]
    SpanInverted { start: usize, end: usize },

    /// A span extends past the end of the message.
    #[error("link span {start}..{end} extends past the message ({len} characters)")]
    SpanOutOfBounds {
        start: usize,
        end: usize,
        len: usize,
    },

    /// Two spans overlap after sorting by start offset.
    #[error("link spans overlap: one ends at {first_end}, the next starts at {second_start}")]
    OverlappingSpans {
        first_end: usize,
        second_start: usize,
    },
}
