use std::sync::LazyLock;

use regex::Regex;

use crate::segment::LinkSpan;

/// Bare-URL pattern: a scheme followed by `://` and at least one
/// non-whitespace character.
static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)] // compile-time constant pattern
    Regex::new(r"[A-Za-z][A-Za-z0-9+.-]*://\S+").unwrap()
});

/// Scan `text` left to right for bare URLs.
///
/// Returned spans use the matched URL as display text, carry character
/// offsets, and are sorted and non-overlapping by construction (regex
/// matches never overlap). Text without URLs yields an empty vec.
#[must_use]
pub fn detect_links(text: &str) -> Vec<LinkSpan> {
    URL_PATTERN
        .find_iter(text)
        .map(|m| {
            // Regex reports byte offsets; spans carry character offsets.
            let start = text[..m.start()].chars().count();
            let url = m.as_str();
            LinkSpan {
                text: url.to_owned(),
                url: url.to_owned(),
                start,
                end: start + url.chars().count(),
            }
        })
        .collect()
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn single_url_with_surrounding_text() {
        let spans = detect_links("see https://example.com/x for details");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "https://example.com/x");
        assert_eq!(spans[0].url, "https://example.com/x");
        assert_eq!(spans[0].start, 4);
        assert_eq!(spans[0].end, 25);
    }

    #[test]
    fn no_url_yields_no_spans() {
        assert!(detect_links("nothing to link here").is_empty());
        assert!(detect_links("").is_empty());
    }

    #[test]
    fn multiple_urls_in_order() {
        let spans = detect_links("a https://one.example b http://two.example c");
        assert_eq!(spans.len(), 2);
        assert!(spans[0].start < spans[1].start);
        assert_eq!(spans[0].url, "https://one.example");
        assert_eq!(spans[1].url, "http://two.example");
    }

    #[test]
    fn offsets_are_characters_when_preceded_by_multibyte_text() {
        let text = "\u{1f99a}\u{1f99a} https://example.com";
        let spans = detect_links(text);
        assert_eq!(spans.len(), 1);
        // Two emoji plus a space: character offset 3, byte offset 9.
        assert_eq!(spans[0].start, 3);
        assert_eq!(spans[0].end, 3 + "https://example.com".chars().count());
    }

    #[rstest]
    #[case("ftp://files.example.com/a.txt")]
    #[case("wss://socket.example")]
    #[case("at://did:plc:abc123/app.bsky.feed.post/xyz")]
    fn other_schemes_match(#[case] url: &str) {
        let spans = detect_links(url);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].url, url);
    }

    #[test]
    fn scheme_without_separator_is_ignored() {
        assert!(detect_links("mailto:user@example.com").is_empty());
    }

    #[test]
    fn url_runs_to_next_whitespace() {
        let spans = detect_links("go https://example.com/a?q=1#frag.\nnext line");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].url, "https://example.com/a?q=1#frag.");
    }
}
