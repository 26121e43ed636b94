//! Signal extraction from listing titles and aspects
//!
//! Pure, deterministic functions. Nothing here fails: a missing signal is
//! `None`, never an error.

mod aspects;
mod junk;
mod number;
mod title;
mod variant;


pub use aspects::{extract_structured_data, StructuredSignals};
pub use junk::{detect_junk, JunkReason, JunkVerdict};
pub use number::{card_number_from_aspect, extract_card_number, CardNumber};
pub use title::{clean_title, CleanedTitle};
pub use variant::detect_variant;

use crate::types::RawListing;
use serde::{Deserialize, Serialize};

const ENGLISH_TOKENS: &[&str] = &["english", "eng", "en"];

/// True when any word of a language aspect names English, e.g. "EN" or "English (UK)"
fn is_english(language: &str) -> bool {
    language
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| ENGLISH_TOKENS.iter().any(|token| word.eq_ignore_ascii_case(token)))
}

/// Everything the matcher knows about a listing's identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedSignals {
    pub title: CleanedTitle,
    pub card_number: Option<CardNumber>,
    pub variant: Option<String>,
    pub junk: JunkVerdict,
    pub structured: StructuredSignals,
}

impl ExtractedSignals {
    /// Best available card name: the structured aspect if present, else the title
    pub fn name_text(&self) -> String {
        self.structured
            .name
            .as_deref()
            .map(str::to_lowercase)
            .unwrap_or_else(|| self.title.cleaned.clone())
    }
}

/// Run every extractor over a listing.
///
/// Structured aspects override title signals: an aspect card number wins over
/// the title's (borrowing the title's prefix and denominator when both agree
/// on the number), and a non-English language aspect marks an otherwise clean
/// listing as junk.
pub fn extract_signals(listing: &RawListing) -> ExtractedSignals {
    let title = clean_title(&listing.title);
    let structured = extract_structured_data(&listing.aspects);

    let title_number = extract_card_number(&title.cleaned);
    let card_number = match structured.number.as_deref().and_then(card_number_from_aspect) {
        Some(mut from_aspect) => {
            if let Some(from_title) = title_number.as_ref().filter(|t| t.number == from_aspect.number) {
                from_aspect.prefix = from_aspect.prefix.or_else(|| from_title.prefix.clone());
                from_aspect.denominator = from_aspect.denominator.or(from_title.denominator);
            }
            Some(from_aspect)
        }
        None => title_number,
    };

    let variant = detect_variant(&title.cleaned).or_else(|| {
        structured
            .rarity
            .as_deref()
            .and_then(|rarity| detect_variant(&rarity.to_lowercase()))
    });

    let mut junk = detect_junk(&title.cleaned);
    if !junk.is_junk {
        let non_english = structured
            .language
            .as_deref()
            .map(|lang| !is_english(lang))
            .unwrap_or(false);
        if non_english {
            junk = JunkVerdict::junk(JunkReason::NonEnglishLanguage);
        }
    }

    ExtractedSignals {
        title,
        card_number,
        variant,
        junk,
        structured,
    }
}
