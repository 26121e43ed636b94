//! Title normalization

use serde::{Deserialize, Serialize};

/// Normalized title plus the verbatim original for audit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanedTitle {
    pub cleaned: String,
    pub original: String,
}

/// Entities decoded before matching. `&amp;` goes last so `&amp;lt;`
/// decodes to `&lt;` rather than `<`.
const HTML_ENTITIES: &[(&str, &str)] = &[
    ("&#39;", "'"),
    ("&quot;", "\""),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&amp;", "&"),
];

/// Emoji and pictograph code-point ranges stripped from titles
const EMOJI_RANGES: &[(u32, u32)] = &[
    (0x1F000, 0x1FAFF), // mahjong, cards, flags, pictographs, emoticons, transport
    (0x2300, 0x23FF),   // misc technical (watches, hourglasses)
    (0x2600, 0x27BF),   // misc symbols, dingbats
    (0x2B00, 0x2BFF),   // stars, arrows
    (0xFE00, 0xFE0F),   // variation selectors
    (0x200D, 0x200D),   // zero width joiner
    (0x20E3, 0x20E3),   // combining keycap
    (0xE0020, 0xE007F), // tag sequences
];

fn is_emoji(c: char) -> bool {
    let cp = c as u32;
    EMOJI_RANGES.iter().any(|&(lo, hi)| cp >= lo && cp <= hi)
}

fn decode_entities(raw: &str) -> String {
    HTML_ENTITIES
        .iter()
        .fold(raw.to_string(), |acc, (entity, plain)| acc.replace(entity, plain))
}

/// Strip emoji, decode entities, collapse whitespace, trim and lower-case.
pub fn clean_title(raw: &str) -> CleanedTitle {
    let decoded = decode_entities(raw);
    let stripped: String = decoded.chars().filter(|c| !is_emoji(*c)).collect();
    let cleaned = stripped
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    CleanedTitle {
        cleaned,
        original: raw.to_string(),
    }
}
