//! Structured aspect extraction

use crate::types::Aspect;
use serde::{Deserialize, Serialize};

/// Identity fields read from marketplace item specifics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredSignals {
    pub name: Option<String>,
    pub number: Option<String>,
    pub set: Option<String>,
    pub rarity: Option<String>,
    pub language: Option<String>,
    pub grader: Option<String>,
    pub grade: Option<String>,
    pub year: Option<String>,
}

#[derive(Debug, Clone, Copy)]
enum Field {
    Name,
    Number,
    Set,
    Rarity,
    Language,
    Grader,
    Grade,
    Year,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Precedence {
    /// Always overwrites
    Primary,
    /// Only fills a field no primary aspect supplied
    Fallback,
}

const ASPECT_TABLE: &[(&str, Field, Precedence)] = &[
    ("card name", Field::Name, Precedence::Primary),
    ("character", Field::Name, Precedence::Fallback),
    ("card number", Field::Number, Precedence::Primary),
    ("set", Field::Set, Precedence::Primary),
    ("expansion", Field::Set, Precedence::Fallback),
    ("series", Field::Set, Precedence::Fallback),
    ("rarity", Field::Rarity, Precedence::Primary),
    ("language", Field::Language, Precedence::Primary),
    ("card language", Field::Language, Precedence::Fallback),
    ("professional grader", Field::Grader, Precedence::Primary),
    ("grader", Field::Grader, Precedence::Fallback),
    ("grade", Field::Grade, Precedence::Primary),
    ("year manufactured", Field::Year, Precedence::Primary),
    ("year", Field::Year, Precedence::Fallback),
];

const PLACEHOLDER_VALUES: &[&str] = &["", "does not apply", "n/a", "na", "unknown", "-"];

impl StructuredSignals {
    fn slot(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Name => &mut self.name,
            Field::Number => &mut self.number,
            Field::Set => &mut self.set,
            Field::Rarity => &mut self.rarity,
            Field::Language => &mut self.language,
            Field::Grader => &mut self.grader,
            Field::Grade => &mut self.grade,
            Field::Year => &mut self.year,
        }
    }
}

fn lookup(name: &str) -> Option<(Field, Precedence)> {
    let name = name.trim().to_lowercase();
    ASPECT_TABLE
        .iter()
        .find(|(key, _, _)| *key == name)
        .map(|(_, field, precedence)| (*field, *precedence))
}

/// Map aspects to identity fields.
///
/// Primary aspects are applied in a first pass, fallbacks in a second pass
/// that only fills empty fields, so the result does not depend on the order
/// the marketplace returned the aspects in.
pub fn extract_structured_data(aspects: &[Aspect]) -> StructuredSignals {
    let mut out = StructuredSignals::default();

    let usable: Vec<(Field, Precedence, &str)> = aspects
        .iter()
        .filter_map(|aspect| {
            let value = aspect.value.trim();
            if PLACEHOLDER_VALUES.contains(&value.to_lowercase().as_str()) {
                return None;
            }
            lookup(&aspect.name).map(|(field, precedence)| (field, precedence, value))
        })
        .collect();

    for pass in [Precedence::Primary, Precedence::Fallback] {
        for (field, precedence, value) in &usable {
            if *precedence != pass {
                continue;
            }
            let slot = out.slot(*field);
            if pass == Precedence::Primary || slot.is_none() {
                *slot = Some(value.to_string());
            }
        }
    }

    out
}
