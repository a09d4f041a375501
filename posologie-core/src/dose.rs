//! Dose extraction: quantity and unit.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::gate::is_complex;
use crate::normalize::normalize_fractions;
use crate::rules::{compile, first_match, names, Rule};

/// Dose units reported by the extractor; [`DoseUnit::as_str`] gives the French label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DoseUnit {
    Tablet,
    Capsule,
    Spray,
    Puff,
    Drop,
    Gram,
    Patch,
}

impl DoseUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            DoseUnit::Tablet => "comprimé",
            DoseUnit::Capsule => "capsule",
            DoseUnit::Spray => "vaporisation",
            DoseUnit::Puff => "bouffée",
            DoseUnit::Drop => "goutte",
            DoseUnit::Gram => "g",
            DoseUnit::Patch => "timbre",
        }
    }
}

impl fmt::Display for DoseUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A quantity ("2", "0.5", "1-2") with its unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dose {
    pub quantity: String,
    pub unit: DoseUnit,
}

impl Dose {
    fn new(quantity: impl Into<String>, unit: DoseUnit) -> Self {
        Self {
            quantity: quantity.into(),
            unit,
        }
    }
}

// Number or range: "2", "0,5", "1 A 2", "1-2", "0.5 - 1".
static TABLET: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"((?:(?:[0-9][.,])?[0-9]+(?: A |-| - ))?(?:[0-9][.,])?[0-9]+) (?:COMPRIMES?|TABLETS?)")
});
static CAPSULE: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"((?:[0-9]+(?: A |-| - ))?(?:[0-9][.,])?[0-9]+) CAPSULES?")
});
static THE_CAPSULE: LazyLock<Regex> = LazyLock::new(|| compile(r"(?:LA|UNE) CAPSULE"));
static SPRAY_COUNT: LazyLock<Regex> = LazyLock::new(|| compile(r"([0-9]+) VAPORISATIONS?"));
static SPRAY_TIMES: LazyLock<Regex> = LazyLock::new(|| compile(r"VAPORISE(?:R|Z) ([0-9]+) FOIS"));
static SPRAY_VERB: LazyLock<Regex> = LazyLock::new(|| compile(r"VAPORISE(?:R|Z)"));
static INHALATION: LazyLock<Regex> = LazyLock::new(|| compile(r"([0-9]+) INHALATIONS?"));
static DROP: LazyLock<Regex> = LazyLock::new(|| compile(r"([0-9]+) (?:GOUTTES?|G )"));
static GRAM_SPACED: LazyLock<Regex> = LazyLock::new(|| compile(r"([0-9]+) (?:GRAMMES?|G )"));
static GRAM_JOINED: LazyLock<Regex> =
    LazyLock::new(|| compile(r"([0-9]+)(?:GRAMMES?|G|G\. )"));
static PATCH: LazyLock<Regex> =
    LazyLock::new(|| compile(r"([0-9]+|UN) (?:TIMBRES?|PATCHS?)"));

fn clean_quantity(raw: &str) -> String {
    raw.replace('A', "-").replace(' ', "").replace(',', ".")
}

fn first_group(re: &Regex, line: &str) -> Option<String> {
    re.captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

static DOSE_RULES: [Rule<(), Dose>; 11] = [
    Rule {
        name: "tablet",
        apply: |line, _| {
            first_group(&TABLET, line).map(|q| Dose::new(clean_quantity(&q), DoseUnit::Tablet))
        },
    },
    Rule {
        name: "capsule",
        apply: |line, _| {
            first_group(&CAPSULE, line).map(|q| Dose::new(clean_quantity(&q), DoseUnit::Capsule))
        },
    },
    Rule {
        name: "the_capsule",
        apply: |line, _| {
            THE_CAPSULE
                .is_match(line)
                .then(|| Dose::new("1", DoseUnit::Capsule))
        },
    },
    Rule {
        name: "spray_count",
        apply: |line, _| first_group(&SPRAY_COUNT, line).map(|q| Dose::new(q, DoseUnit::Spray)),
    },
    Rule {
        name: "spray_times",
        apply: |line, _| first_group(&SPRAY_TIMES, line).map(|q| Dose::new(q, DoseUnit::Spray)),
    },
    Rule {
        name: "spray_verb",
        apply: |line, _| {
            SPRAY_VERB
                .is_match(line)
                .then(|| Dose::new("1", DoseUnit::Spray))
        },
    },
    // Inhalations are counted as puffs.
    Rule {
        name: "inhalation",
        apply: |line, _| first_group(&INHALATION, line).map(|q| Dose::new(q, DoseUnit::Puff)),
    },
    Rule {
        name: "drop",
        apply: |line, _| first_group(&DROP, line).map(|q| Dose::new(q, DoseUnit::Drop)),
    },
    Rule {
        name: "gram_spaced",
        apply: |line, _| first_group(&GRAM_SPACED, line).map(|q| Dose::new(q, DoseUnit::Gram)),
    },
    Rule {
        name: "gram_joined",
        apply: |line, _| first_group(&GRAM_JOINED, line).map(|q| Dose::new(q, DoseUnit::Gram)),
    },
    Rule {
        name: "patch",
        apply: |line, _| {
            first_group(&PATCH, line).map(|q| {
                let quantity = if q == "UN" { "1".to_string() } else { q };
                Dose::new(quantity, DoseUnit::Patch)
            })
        },
    },
];

/// Rule names in evaluation order.
pub fn dose_rule_names() -> Vec<&'static str> {
    names(&DOSE_RULES)
}

/// Extract the dose from a normalized line.
///
/// Returns `None` for complex lines and when no rule matches.
pub fn extract_dose(line: &str) -> Option<Dose> {
    if is_complex(line) {
        tracing::debug!("complex dosage, dose skipped");
        return None;
    }

    let line = normalize_fractions(line);
    first_match("dose", &DOSE_RULES, &line, &())
}
