//! Printing variant detection
//!
//! Three ordered tables, evaluated in sequence, first match wins:
//!
//! 1. `VARIANT_KEYWORDS` - finish keywords, most specific first. "reverse holo"
//!    must precede "holo" and "1st edition holo" must precede "1st edition",
//!    otherwise the shorter phrase swallows the longer one.
//! 2. `SIGNAL_PHRASES` - standalone rarity phrases.
//! 3. `ABBREVIATIONS` - short forms, anchored on word boundaries so "sir"
//!    inside "desire" does not match.
//!
//! Reordering any table changes results.

use regex::Regex;
use std::sync::LazyLock;

const VARIANT_KEYWORDS: &[(&str, &str)] = &[
    ("reverse holofoil", "reverse holo"),
    ("reverse holo", "reverse holo"),
    ("reverse-holo", "reverse holo"),
    ("reverse foil", "reverse holo"),
    ("rev holo", "reverse holo"),
    ("1st edition holo", "1st edition holo"),
    ("first edition holo", "1st edition holo"),
    ("1st edition", "1st edition"),
    ("first edition", "1st edition"),
    ("non holo", "non holo"),
    ("non-holo", "non holo"),
    ("cosmos holo", "cosmos holo"),
    ("holofoil", "holo"),
    ("holo", "holo"),
];

const SIGNAL_PHRASES: &[(&str, &str)] = &[
    ("special illustration rare", "special illustration rare"),
    ("special art rare", "special art rare"),
    ("illustration rare", "illustration rare"),
    ("character rare", "character rare"),
    ("trainer gallery", "trainer gallery"),
    ("gold secret rare", "gold secret rare"),
    ("secret rare", "secret rare"),
    ("hyper rare", "hyper rare"),
    ("rainbow rare", "rainbow rare"),
    ("full art", "full art"),
    ("alternate art", "alt art"),
    ("alt art", "alt art"),
    ("shadowless", "shadowless"),
    ("gold star", "gold star"),
    ("shiny", "shiny"),
    ("promo", "promo"),
];

static ABBREVIATIONS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"\bsir\b", "special illustration rare"),
        (r"\bsar\b", "special art rare"),
        (r"\bchr\b", "character rare"),
        (r"\btg\d{0,2}\b", "trainer gallery"),
    ]
    .into_iter()
    .map(|(pattern, tag)| (Regex::new(pattern).expect("abbreviation pattern compiles"), tag))
    .collect()
});

/// Detect the printing variant in a cleaned (lower-cased) title.
pub fn detect_variant(cleaned: &str) -> Option<String> {
    VARIANT_KEYWORDS
        .iter()
        .chain(SIGNAL_PHRASES.iter())
        .find(|(phrase, _)| cleaned.contains(phrase))
        .map(|(_, tag)| *tag)
        .or_else(|| {
            ABBREVIATIONS
                .iter()
                .find(|(pattern, _)| pattern.is_match(cleaned))
                .map(|(_, tag)| *tag)
        })
        .map(str::to_string)
}
