//! French (Québec) label rules.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// Street type → abbreviation, as used on Québec signage.
pub const STREET_TYPES: &[(&str, &str)] = &[
    ("avenue", "av."),
    ("boulevard", "boul."),
    ("chemin", "ch."),
    ("montée", "mtée"),
    ("place", "pl."),
    ("route", "rte"),
    ("terrasse", "tsse"),
];

/// Words kept in lower case unless they start the label.
pub const FRENCH_PARTICLES: &[&str] = &[
    "à", "au", "aux", "de", "des", "du", "en", "et", "la", "le", "les", "sur",
];

static STREET_TYPE_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    STREET_TYPES
        .iter()
        .map(|(word, abbreviation)| {
            let re = Regex::new(&format!(r"(?i)\b{word}\b")).expect("static street type pattern");
            (re, *abbreviation)
        })
        .collect()
});

pub(super) fn abbreviate_street_types(text: &str) -> Cow<'_, str> {
    let mut out = Cow::Borrowed(text);
    for (re, abbreviation) in STREET_TYPE_PATTERNS.iter() {
        if re.is_match(&out) {
            out = Cow::Owned(re.replace_all(&out, *abbreviation).into_owned());
        }
    }
    out
}

/// Upper-case the first letter and lower-case particles and elisions
/// ("l'", "d'") everywhere else. Expects single-spaced input.
pub(super) fn apply_casing(text: &str) -> String {
    let mut words = text.split(' ');
    let Some(first) = words.next() else {
        return String::new();
    };

    let mut out = capitalize(first);
    for word in words {
        out.push(' ');
        let lower = word.to_lowercase();
        if FRENCH_PARTICLES.contains(&lower.as_str()) {
            out.push_str(&lower);
        } else if lower.len() > 2 && (lower.starts_with("l'") || lower.starts_with("d'")) {
            out.push_str(&decapitalize(word));
        } else {
            out.push_str(word);
        }
    }
    out
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn decapitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(c) => c.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
