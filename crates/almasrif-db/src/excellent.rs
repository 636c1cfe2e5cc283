//! Text form of the `excellent_issues` column.
//!
//! The grading process writes mentions joined by the Arabic comma, or a
//! sentinel when the user has none. Everything above the store works with
//! `Vec<ExcellentMention>`.

use almasrif_types::models::ExcellentMention;

/// Stored value meaning "no excellent issues".
pub const NONE_SENTINEL: &str = "لا يوجد";

/// Separator between mentions (U+060C ARABIC COMMA).
pub const DELIMITER: char = '،';

const JOINER: &str = "، ";

pub fn decode(raw: &str) -> Vec<ExcellentMention> {
    let raw = raw.trim();
    if raw.is_empty() || raw == NONE_SENTINEL {
        return Vec::new();
    }

    raw.split(DELIMITER)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(ExcellentMention::parse)
        .collect()
}

pub fn encode(mentions: &[ExcellentMention]) -> String {
    if mentions.is_empty() {
        return NONE_SENTINEL.to_string();
    }

    mentions
        .iter()
        .map(|m| m.label.as_str())
        .collect::<Vec<_>>()
        .join(JOINER)
}
