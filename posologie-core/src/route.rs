//! Administration route extraction.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::dose::DoseUnit;
use crate::rules::{compile, first_match, names, Rule};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Nasal,
    Intramuscular,
    Subcutaneous,
    Ocular,
    LeftEye,
    RightEye,
    BothEyes,
    Otic,
    LeftEar,
    RightEar,
    BothEars,
    Topical,
    Oral,
    Sublingual,
    Inhalation,
}

impl Route {
    pub fn as_str(self) -> &'static str {
        match self {
            Route::Nasal => "nasale",
            Route::Intramuscular => "intramusculaire",
            Route::Subcutaneous => "sous-cutané",
            Route::Ocular => "oculaire",
            Route::LeftEye => "oeil gauche",
            Route::RightEye => "oeil droit",
            Route::BothEyes => "dans les 2 yeux",
            Route::Otic => "otique",
            Route::LeftEar => "oreille gauche",
            Route::RightEar => "oreille droit",
            Route::BothEars => "dans les 2 oreilles",
            Route::Topical => "topique",
            Route::Oral => "oral",
            Route::Sublingual => "sublingual",
            Route::Inhalation => "inhalation",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// `(?-u:\s)`: ASCII whitespace only.
static INTRAMUSCULAR: LazyLock<Regex> =
    LazyLock::new(|| compile(r"INTRA(?:-|(?-u:\s))?MUSCULAIRE"));
static SUBCUTANEOUS: LazyLock<Regex> =
    LazyLock::new(|| compile(r"SOUS(?:-|(?-u:\s))?CUTANEE"));
static TOPICAL: LazyLock<Regex> = LazyLock::new(|| compile(r"APPLIQUE(?:R|Z)|APPLICATION LOCALE"));
static DISSOLVED: LazyLock<Regex> = LazyLock::new(|| compile(r"DISSOU.*(?-u:\s)VERRE D'EAU"));
static INHALED_CAPSULE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"INHALE(?:R|Z) (?:LE CONTENU D'UNE )?CAPSULE"));

/// Left, right, both, or unspecified side, checked in that order.
fn laterality(line: &str, left: Route, right: Route, both: (&str, Route), generic: Route) -> Route {
    if line.contains("GAUCHE") {
        left
    } else if line.contains("DROIT") {
        right
    } else if line.contains(both.0) {
        both.1
    } else {
        generic
    }
}

static ROUTE_RULES: [Rule<Option<DoseUnit>, Route>; 10] = [
    Rule {
        name: "nasal",
        apply: |line, _| {
            (line.contains("CHAQUE NARINE") || line.contains("DANS LES NARINES"))
                .then_some(Route::Nasal)
        },
    },
    Rule {
        name: "intramuscular",
        apply: |line, _| INTRAMUSCULAR.is_match(line).then_some(Route::Intramuscular),
    },
    Rule {
        name: "subcutaneous",
        apply: |line, _| SUBCUTANEOUS.is_match(line).then_some(Route::Subcutaneous),
    },
    Rule {
        name: "eye",
        apply: |line, _| {
            // "Œ" has no decomposition, so both spellings are checked.
            let eye = line.contains("OEIL") || line.contains("ŒIL") || line.contains("YEUX");
            eye.then(|| {
                laterality(
                    line,
                    Route::LeftEye,
                    Route::RightEye,
                    ("YEUX", Route::BothEyes),
                    Route::Ocular,
                )
            })
        },
    },
    Rule {
        name: "ear",
        apply: |line, _| {
            line.contains("OREILLE").then(|| {
                laterality(
                    line,
                    Route::LeftEar,
                    Route::RightEar,
                    ("OREILLES", Route::BothEars),
                    Route::Otic,
                )
            })
        },
    },
    Rule {
        name: "topical",
        apply: |line, _| TOPICAL.is_match(line).then_some(Route::Topical),
    },
    Rule {
        name: "oral",
        apply: |line, _| {
            (line.contains("BOIRE") || DISSOLVED.is_match(line)).then_some(Route::Oral)
        },
    },
    Rule {
        name: "sublingual",
        apply: |line, _| line.contains("SOUS LA LANGUE").then_some(Route::Sublingual),
    },
    Rule {
        name: "inhaled_capsule",
        apply: |line, _| INHALED_CAPSULE.is_match(line).then_some(Route::Inhalation),
    },
    Rule {
        name: "dose_unit",
        apply: |_, unit| match unit {
            Some(DoseUnit::Tablet | DoseUnit::Capsule) => Some(Route::Oral),
            Some(DoseUnit::Puff) => Some(Route::Inhalation),
            Some(DoseUnit::Patch) => Some(Route::Topical),
            _ => None,
        },
    },
];

/// Rule names in evaluation order.
pub fn route_rule_names() -> Vec<&'static str> {
    names(&ROUTE_RULES)
}

/// Extract the route from a normalized line.
///
/// No complexity gating applies. `dose_unit` is only consulted when none of
/// the textual cues match.
pub fn extract_route(line: &str, dose_unit: Option<DoseUnit>) -> Option<Route> {
    first_match("route", &ROUTE_RULES, line, &dose_unit)
}
