//! Display label cleanup for routes, stops and trip headsigns.
//!
//! All rules are regex based and applied until the text stops changing, so
//! [`normalize_label`] is idempotent. Every rule strictly shortens the text,
//! which bounds the number of passes.

mod french;

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

pub use french::{FRENCH_PARTICLES, STREET_TYPES};

/// Which cleanup rules apply to a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelRules {
    /// Drop the "direction " filler (trip headsigns).
    pub strip_direction: bool,
    /// Drop "face à", "face au" and "face" (stop names).
    pub strip_facing: bool,
    /// Abbreviate French street types.
    pub street_types: bool,
    /// French casing of particles and first letter.
    pub french_casing: bool,
}

impl LabelRules {
    pub const ROUTE_LONG_NAME: LabelRules = LabelRules {
        strip_direction: false,
        strip_facing: false,
        street_types: false,
        french_casing: false,
    };

    pub const STOP_NAME: LabelRules = LabelRules {
        strip_direction: false,
        strip_facing: true,
        street_types: true,
        french_casing: true,
    };

    pub const TRIP_HEADSIGN: LabelRules = LabelRules {
        strip_direction: true,
        strip_facing: false,
        street_types: true,
        french_casing: true,
    };
}

fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static label pattern")
}

static DIRECTION: LazyLock<Regex> = LazyLock::new(|| regex(r"(?i)\bdirection\s+"));

// Most specific first: "face à" must win over the bare "face".
static START_WITH_FACES: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        regex(r"(?i)^face\s+à\s+"),
        regex(r"(?i)^face\s+au\s+"),
        regex(r"(?i)^face\s+"),
    ]
});

static SPACE_FACES: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        regex(r"(?i)\s+face\s+à\s+"),
        regex(r"(?i)\s+face\s+au\s+"),
        regex(r"(?i)\s+face\s+"),
    ]
});

static SAINT: LazyLock<Regex> = LazyLock::new(|| regex(r"(?i)\bsaint(e?)[\s-]+(\w)"));

static SPACES: LazyLock<Regex> = LazyLock::new(|| regex(r"\s+"));
static OPEN_PAREN_SPACE: LazyLock<Regex> = LazyLock::new(|| regex(r"\(\s+"));
static SPACE_CLOSE_PAREN: LazyLock<Regex> = LazyLock::new(|| regex(r"\s+\)"));

/// Clean a route, stop or trip label.
///
/// Steps, in order: direction filler, facing prepositions, street types,
/// "Saint"/"Sainte" → "St-"/"Ste-", whitespace and parenthesis cleanup,
/// then casing. Unrecognised text passes through with only its whitespace
/// normalised.
///
/// # Examples
///
/// ```
/// use citsv_parser::labels::{LabelRules, normalize_label};
///
/// assert_eq!(normalize_label("face à l'école", &LabelRules::STOP_NAME), "L'école");
/// assert_eq!(normalize_label("Direction  Sainte-Julie", &LabelRules::TRIP_HEADSIGN), "Ste-Julie");
/// ```
pub fn normalize_label(text: &str, rules: &LabelRules) -> String {
    let mut label = text.to_string();

    if rules.strip_direction {
        label = replace_until_stable(label, |s| DIRECTION.replace_all(s, ""));
    }

    if rules.strip_facing {
        label = replace_until_stable(label, strip_facing);
    }

    if rules.street_types {
        label = replace_until_stable(label, french::abbreviate_street_types);
    }

    label = replace_until_stable(label, abbreviate_saint);
    label = clean_spacing(&label);

    if rules.french_casing {
        label = french::apply_casing(&label);
    }
    label
}

fn strip_facing(text: &str) -> Cow<'_, str> {
    let mut out = Cow::Borrowed(text);
    for re in START_WITH_FACES.iter() {
        out = Cow::Owned(re.replace_all(&out, "").into_owned());
    }
    for re in SPACE_FACES.iter() {
        out = Cow::Owned(re.replace_all(&out, " ").into_owned());
    }
    out
}

fn abbreviate_saint(text: &str) -> Cow<'_, str> {
    SAINT.replace_all(text, |caps: &Captures| {
        let abbreviation = if caps[1].is_empty() { "St-" } else { "Ste-" };
        format!("{abbreviation}{}", &caps[2])
    })
}

/// Collapse whitespace, tighten parentheses and trim.
fn clean_spacing(text: &str) -> String {
    let collapsed = SPACES.replace_all(text, " ");
    let opened = OPEN_PAREN_SPACE.replace_all(&collapsed, "(");
    let closed = SPACE_CLOSE_PAREN.replace_all(&opened, ")");
    closed.trim().to_string()
}

fn replace_until_stable<F>(mut text: String, step: F) -> String
where
    F: for<'a> Fn(&'a str) -> Cow<'a, str>,
{
    loop {
        let next = match step(&text) {
            Cow::Borrowed(_) => None,
            Cow::Owned(next) => Some(next),
        };
        match next {
            Some(next) if next != text => text = next,
            _ => return text,
        }
    }
}
