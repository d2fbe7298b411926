//! Coarse block classification and previews for normalized text.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static LIST_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\*|-|\d+\.)\s").expect("List item regex pattern is valid and should compile"));

const MAX_HEADING_CHARS: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Heading,
    ListItem,
    Paragraph,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBlock {
    #[serde(rename = "type")]
    pub kind: BlockKind,
    pub content: String,
}

fn classify(line: &str) -> BlockKind {
    let len = line.chars().count();
    if LIST_ITEM.is_match(line) {
        BlockKind::ListItem
    } else if len > 2 && len < MAX_HEADING_CHARS && !line.ends_with('.') {
        BlockKind::Heading
    } else {
        BlockKind::Paragraph
    }
}

/// Split normalized text into blocks on paragraph breaks and classify each one.
pub fn parse_structure(text: &str) -> Vec<TextBlock> {
    text.split("\n\n")
        .flat_map(str::lines)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| TextBlock {
            kind: classify(line),
            content: line.to_string(),
        })
        .collect()
}

/// First `max_chars` chars of `text`, with `...` appended when truncated.
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
