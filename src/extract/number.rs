//! Card number detection

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Collector number printed on the card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardNumber {
    pub number: u32,
    /// Upper-cased set prefix (SV, TG, GG, SWSH, SM, XY)
    pub prefix: Option<String>,
    /// Printed set total after the slash
    pub denominator: Option<u32>,
}

/// `[PREFIX]digits/[PREFIX]digits`. A repeated prefix on the denominator
/// side is consumed and ignored.
static FRACTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(swsh|sv|tg|gg|sm|xy)?(\d{1,4})\s*/\s*(?:swsh|sv|tg|gg|sm|xy)?(\d{1,4})\b")
        .expect("fraction pattern compiles")
});

static HASH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#\s?(\d{1,4})\b").expect("hash pattern compiles"));

static NO_DOT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bno\.?\s?(\d{1,4})\b").expect("no. pattern compiles"));

/// Find the card number in a cleaned title.
///
/// Patterns are tried in priority order: fraction, `#N`, `No. N`. Only the
/// first pattern that matches is used.
pub fn extract_card_number(cleaned: &str) -> Option<CardNumber> {
    if let Some(caps) = FRACTION.captures(cleaned) {
        let number = caps.get(2)?.as_str().parse().ok()?;
        let denominator = caps.get(3).and_then(|m| m.as_str().parse().ok());
        return Some(CardNumber {
            number,
            prefix: caps.get(1).map(|m| m.as_str().to_uppercase()),
            denominator,
        });
    }

    [&*HASH, &*NO_DOT].iter().find_map(|pattern| {
        let caps = pattern.captures(cleaned)?;
        Some(CardNumber {
            number: caps.get(1)?.as_str().parse().ok()?,
            prefix: None,
            denominator: None,
        })
    })
}

/// Parse a card number from a structured aspect value such as "065/198",
/// "#65" or a bare "65".
pub fn card_number_from_aspect(value: &str) -> Option<CardNumber> {
    let lowered = value.trim().to_lowercase();
    if let Some(found) = extract_card_number(&lowered) {
        return Some(found);
    }

    let digits = lowered.trim_start_matches('#').trim();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(CardNumber {
        number: digits.parse().ok()?,
        prefix: None,
        denominator: None,
    })
}
