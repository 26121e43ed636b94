//! Junk listing detection

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Why a listing was classified as junk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JunkReason {
    BulkLot,
    Counterfeit,
    NonCardProduct,
    NonEnglishScript,
    NonEnglishLanguage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JunkVerdict {
    pub is_junk: bool,
    pub reason: Option<JunkReason>,
}

impl JunkVerdict {
    pub fn clean() -> Self {
        Self {
            is_junk: false,
            reason: None,
        }
    }

    pub fn junk(reason: JunkReason) -> Self {
        Self {
            is_junk: true,
            reason: Some(reason),
        }
    }
}

/// Rules in evaluation order. The first rule that matches fixes the reason.
static JUNK_RULES: LazyLock<Vec<(Regex, JunkReason)>> = LazyLock::new(|| {
    [
        (
            r"\b(?:bulk|job\s?lots?|joblots?|lots?|bundles?|mystery|random)\b",
            JunkReason::BulkLot,
        ),
        // A bare number before "cards" is usually a card number or grade, so
        // a count needs an x multiplier or a trailing plus
        (
            r"(?:\b\d+\s*x|\bx\s*\d+|\b\d+\+)\s*(?:pokemon\s+)?cards\b",
            JunkReason::BulkLot,
        ),
        (
            r"\b(?:prox(?:y|ies)|fake|replica|custom|orica|reprint|fan\s?made|fan\s?art|unofficial|not\s+original|gold\s+metal)\b",
            JunkReason::Counterfeit,
        ),
        (
            r"\b(?:booster\s+(?:box|pack)|elite\s+trainer\s+box|etb|binder|sleeves?|deck\s+box|playmat|tins?|figures?|plush|coins?|code\s+cards?|online\s+codes?|empty|display\s+case|toploaders?)\b",
            JunkReason::NonCardProduct,
        ),
        (
            r"[\p{Hiragana}\p{Katakana}\p{Han}\p{Hangul}]",
            JunkReason::NonEnglishScript,
        ),
        (
            r"\b(?:japanese|japan|jpn|jp|korean|chinese|german|deutsch|french|fran[cç]ais|italian|italiano|spanish|espa[nñ]ol|portuguese|dutch|thai|indonesian)\b",
            JunkReason::NonEnglishLanguage,
        ),
    ]
    .into_iter()
    .map(|(pattern, reason)| (Regex::new(pattern).expect("junk pattern compiles"), reason))
    .collect()
});

/// Classify a cleaned title as junk or not.
pub fn detect_junk(cleaned: &str) -> JunkVerdict {
    JUNK_RULES
        .iter()
        .find(|(pattern, _)| pattern.is_match(cleaned))
        .map(|(_, reason)| JunkVerdict::junk(*reason))
        .unwrap_or_else(JunkVerdict::clean)
}
