//! Properties of text normalization over a varied corpus.

use flashdoc::text::{TextStats, normalize, preview, strip_page_markers};

const SAMPLES: &[&str] = &[
    "",
    "   ",
    "single",
    "Hello   world\nfoo",
    "a\n\n\n\nb",
    "line one\r\nline two\r\n\r\nnew paragraph",
    "old mac\rline\r\rbreaks",
    "\t\tIndented\ttabs  and\u{a0}no-break spaces\n",
    "trailing blank lines\n\n\n\n",
    "\n\n\nleading blank lines",
    "mixed \n \n whitespace-only separator",
    "Unicode: café naïve 東京 \u{2003}em-space",
    "Page 1 of 3\nIntroduction\nPage 2 of 3",
];

#[test]
fn test_normalize_is_idempotent() {
    for sample in SAMPLES {
        let once = normalize(sample);
        assert_eq!(normalize(&once), once, "not idempotent for {:?}", sample);
    }
}

#[test]
fn test_normalized_text_shape() {
    for sample in SAMPLES {
        let text = normalize(sample);
        assert_eq!(text.trim(), text, "untrimmed output for {:?}", sample);
        assert!(!text.contains("\n\n\n"), "triple newline for {:?}", sample);
        assert!(!text.contains('\r'), "carriage return kept for {:?}", sample);
        assert!(!text.contains("  "), "double space for {:?}", sample);
        assert!(!text.contains('\t'), "tab kept for {:?}", sample);

        for paragraph in text.split("\n\n") {
            assert!(!paragraph.contains('\n'), "single newline inside paragraph for {:?}", sample);
        }
    }
}

#[test]
fn test_normalize_preserves_words() {
    for sample in SAMPLES {
        let before: Vec<&str> = sample.split_whitespace().collect();
        let normalized = normalize(sample);
        let after: Vec<&str> = normalized.split_whitespace().collect();
        assert_eq!(before, after, "words changed for {:?}", sample);
    }
}

#[test]
fn test_strip_then_normalize_is_stable() {
    for sample in SAMPLES {
        let cleaned = normalize(&strip_page_markers(sample));
        assert_eq!(normalize(&strip_page_markers(&cleaned)), cleaned);
        assert!(!cleaned.to_lowercase().contains("page 1 of 3"));
    }
}

#[test]
fn test_stats_agree_with_text() {
    for sample in SAMPLES {
        let text = normalize(sample);
        let stats = TextStats::of(&text);
        assert_eq!(stats.char_count, text.chars().count());
        assert_eq!(stats.word_count, text.split_whitespace().count());
    }
}

#[test]
fn test_preview_never_splits_a_char() {
    let text = "東京".repeat(300);
    let short = preview(&text, 250);
    assert_eq!(short.chars().count(), 253);
    assert!(short.ends_with("..."));
    assert_eq!(preview("short", 250), "short");
}
