//! Whitespace normalization and text statistics.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static PAGE_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bpage \d+\s*of\s*\d+").expect("Page marker regex pattern is valid and should compile")
});

/// Normalize extracted text.
///
/// - Line endings become `\n`.
/// - A blank line (two or more newlines, possibly with whitespace between) separates paragraphs,
///   and each separator is written as exactly `\n\n`.
/// - Inside a paragraph every whitespace run, single newlines included, becomes one space.
/// - The result is trimmed.
///
/// The function is idempotent: `normalize(&normalize(x)) == normalize(x)`.
///
/// ```rust
/// use flashdoc::text::normalize;
///
/// assert_eq!(normalize("Hello   world\nfoo"), "Hello world foo");
/// assert_eq!(normalize("a\n\n\n\nb"), "a\n\nb");
/// ```
pub fn normalize(text: &str) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut out = String::with_capacity(unified.len());
    let mut paragraph_open = false;
    let mut pending_break = false;

    for line in unified.split('\n') {
        let mut words = line.split_whitespace().peekable();
        if words.peek().is_none() {
            if paragraph_open {
                pending_break = true;
            }
            continue;
        }

        for word in words {
            if pending_break {
                out.push_str("\n\n");
                pending_break = false;
            } else if paragraph_open {
                out.push(' ');
            }
            out.push_str(word);
            paragraph_open = true;
        }
    }

    out
}

/// Remove `Page N of M` running headers and footers.
pub fn strip_page_markers(text: &str) -> String {
    PAGE_MARKER.replace_all(text, "").into_owned()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStats {
    pub char_count: usize,
    pub word_count: usize,
}

impl TextStats {
    pub fn of(text: &str) -> Self {
        Self {
            char_count: text.chars().count(),
            word_count: text.split_whitespace().count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_inline_whitespace_and_single_newlines() {
        let normalized = normalize("Hello   world\nfoo");
        assert_eq!(normalized, "Hello world foo");
        assert_eq!(TextStats::of(&normalized).word_count, 3);
    }

    #[test]
    fn test_blank_line_runs_become_one_break() {
        assert_eq!(normalize("one\n\n\n\n\ntwo"), "one\n\ntwo");
        assert_eq!(normalize("one\n  \t\n two"), "one\n\ntwo");
    }

    #[test]
    fn test_crlf_is_unified() {
        assert_eq!(normalize("a\r\nb\r\n\r\nc\rd"), "a b\n\nc d");
    }

    #[test]
    fn test_trims_leading_and_trailing_whitespace() {
        assert_eq!(normalize("\n\n   padded text \t\n\n"), "padded text");
        assert_eq!(normalize(" \n\t "), "");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "Hello   world\nfoo",
            "\r\n\r\nTitle\r\n\r\n\r\nBody  text\twith\ttabs\n- item\n\n\n",
            "a\u{a0}\u{a0}b\n \n\n c",
            "",
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", sample);
            assert!(!once.contains("\n\n\n"));
        }
    }

    #[test]
    fn test_strip_page_markers() {
        assert_eq!(strip_page_markers("intro Page 1 of 10 body"), "intro  body");
        assert_eq!(strip_page_markers("PAGE 3 OF 4"), "");
        assert_eq!(strip_page_markers("homepage 3 of 4"), "homepage 3 of 4");
    }

    #[test]
    fn test_stats_count_unicode_scalars() {
        let stats = TextStats::of("héllo wörld");
        assert_eq!(stats.char_count, 11);
        assert_eq!(stats.word_count, 2);
        assert_eq!(TextStats::of(""), TextStats { char_count: 0, word_count: 0 });
    }
}
