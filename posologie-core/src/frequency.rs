//! Frequency extraction into fixed French schedule phrases.
//!
//! Two modifiers are read from the whole line before any rule runs: whether
//! the dose is taken as needed (PRN) and whether it is taken with food. Rule
//! groups are then evaluated in order; a group may recognize its pattern yet
//! produce nothing (an untabulated count, say), in which case the next group
//! gets its turn.

use std::sync::LazyLock;

use regex::Regex;

use crate::gate::is_complex;
use crate::rules::{compile, first_match, names, Rule};

/// A schedule phrase and the identifier of the rule that produced it.
///
/// `id` is reserved for rule identity tracking and is always `0` today.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frequency {
    pub id: u32,
    pub phrase: String,
}

impl Frequency {
    fn new(phrase: impl Into<String>) -> Self {
        Self {
            id: 0,
            phrase: phrase.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.phrase.is_empty()
    }
}

/// Line-wide qualifiers shared by every frequency rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub prn: bool,
    pub with_food: bool,
}

static PAIN: LazyLock<Regex> = LazyLock::new(|| compile(r"SI DOULEURS?"));

impl Modifiers {
    pub fn detect(line: &str) -> Self {
        let prn = ["PRN", "AU BESOIN", "SI BESOIN", "AS NEEDED"]
            .iter()
            .any(|cue| line.contains(cue))
            || PAIN.is_match(line);
        let with_food = line.contains("EN MANGEANT") || line.contains("AVEC NOURRITURE");
        Self { prn, with_food }
    }
}

fn prn(phrase: &str, modifiers: &Modifiers) -> String {
    if modifiers.prn {
        format!("{phrase} PRN")
    } else {
        phrase.to_string()
    }
}

static TIMES_PER_DAY: LazyLock<Regex> = LazyLock::new(|| compile(r"([0-9]+|UNE) FOIS PAR JOUR"));
static AT_BREAKFAST: LazyLock<Regex> = LazyLock::new(|| compile(r"(?:AU|AVEC LE) DEJEUNER"));
static BEFORE_BREAKFAST: LazyLock<Regex> = LazyLock::new(|| compile(r"AVANT LE DEJEUNER"));
static BEFORE_BED: LazyLock<Regex> = LazyLock::new(|| compile(r"AVANT (?:LE )?COUCHER"));
static EVERY_HOURS: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?:AUX|TOU(?:TE)?S LES) ([0-9]+)(?: A [0-9]+)?(?-u:\s)+HEURES"));
static EVERY_MINUTES: LazyLock<Regex> =
    LazyLock::new(|| compile(r"AUX ([0-9]+)(?: A [0-9]+)?(?-u:\s)+MIN(?:UTES|UTE)?"));
static TIMES_PER_WEEK: LazyLock<Regex> =
    LazyLock::new(|| compile(r"([0-9]+) FOIS PAR SEMAINE|(ONCE|TWICE) A WEEK"));
static UNITS_PER_DAY: LazyLock<Regex> =
    LazyLock::new(|| compile(r"[0-9]+ (?:COMPRIMES?|CAPSULES?) PAR JOUR"));
static UNITS_PER_WEEK: LazyLock<Regex> =
    LazyLock::new(|| compile(r"[0-9]+ (?:COMPRIMES?|CAPSULES?|TIMBRES?) PAR SEMAINE"));
static HALF_HOUR_BEFORE_BED: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?:30 MINUTES|1/2 HEURE) AVANT LE COUCHER"));
static SINGLE_DOSE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"UNE SEULE DOSE|DOSE UNIQUE|UNE SEULE PRISE|IMMEDIATEMENT"));
static PATCH_CHANGE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"GARDER 24 HEURES,? ?RETIRER .* CHANGER"));

/// Meal or time-of-day cue qualifying a once-daily schedule.
fn daily_anchor(line: &str) -> Option<&'static str> {
    if AT_BREAKFAST.is_match(line) {
        Some("au déjeuner")
    } else if BEFORE_BREAKFAST.is_match(line) {
        Some("avant le déjeuner")
    } else if line.contains("LE MATIN") {
        Some("le matin")
    } else if line.contains("AU DINER") {
        Some("au dîner")
    } else if line.contains("AU SOUPER") {
        Some("au souper")
    } else if BEFORE_BED.is_match(line) || line.contains("AU COUCHER") {
        Some("au coucher")
    } else {
        None
    }
}

fn english_daily_anchor(line: &str) -> Option<&'static str> {
    if line.contains("BREAKFAST") {
        Some("au déjeuner")
    } else if line.contains("IN THE MORNING") {
        Some("le matin")
    } else if line.contains("AT BEDTIME") {
        Some("au coucher")
    } else {
        None
    }
}

fn anchored(base: &str, anchor: Option<&str>) -> String {
    match anchor {
        Some(anchor) => format!("{base} {anchor}"),
        None => base.to_string(),
    }
}

/// True when some match of `re` starts before the first "MAXIMUM".
fn outside_maximum(re: &Regex, line: &str) -> bool {
    re.find_iter(line)
        .any(|m| !line[..m.start()].contains("MAXIMUM"))
}

fn times_per_day(line: &str, modifiers: &Modifiers) -> Option<String> {
    let caps = TIMES_PER_DAY.captures(line)?;
    match caps.get(1)?.as_str() {
        "1" | "UNE" => Some(prn(&anchored("1 fois par jour", daily_anchor(line)), modifiers)),
        "2" if !modifiers.prn => {
            let meals = (line.contains("DEJEUNER") && line.contains("SOUPER"))
                || (line.contains("MATIN") && line.contains("SOIR") && modifiers.with_food);
            if meals {
                Some("2 fois par jour au déjeuner et au souper".to_string())
            } else {
                Some("2 fois par jour".to_string())
            }
        }
        count @ ("2" | "3" | "4") => Some(prn(&format!("{count} fois par jour"), modifiers)),
        _ => None,
    }
}

fn english_daily(line: &str, modifiers: &Modifiers) -> Option<String> {
    if !line.contains("DAILY") || line.contains("TWICE") || line.contains("THREE TIMES") {
        return None;
    }
    if modifiers.prn {
        return Some("1 fois par jour PRN".to_string());
    }
    Some(anchored("1 fois par jour", english_daily_anchor(line)))
}

fn every_hours(line: &str, modifiers: &Modifiers) -> Option<String> {
    let caps = EVERY_HOURS.captures(line)?;
    let phrase = match caps.get(1)?.as_str() {
        "3" => "q3h",
        "4" => "q4h",
        "6" => "q6h",
        "8" => "q8h",
        // 12 and 24 hours are reported as q8h.
        "12" | "24" => "q8h",
        _ => return None,
    };
    Some(prn(phrase, modifiers))
}

fn every_minutes(line: &str, modifiers: &Modifiers) -> Option<String> {
    let caps = EVERY_MINUTES.captures(line)?;
    let phrase = match caps.get(1)?.as_str() {
        "5" => "q5min",
        "10" => "q10min",
        "15" => "q15min",
        "30" => "q30min",
        _ => return None,
    };
    Some(prn(phrase, modifiers))
}

fn times_per_week(line: &str, modifiers: &Modifiers) -> Option<String> {
    let caps = TIMES_PER_WEEK.captures(line)?;
    let count = caps.get(1).map(|m| m.as_str());
    let english = caps.get(2).map(|m| m.as_str());
    let phrase = match (count, english) {
        (Some("1"), _) | (_, Some("ONCE")) => "1 fois par semaine",
        (Some("2"), _) => "2 fois par semaine",
        (Some("3"), _) => "3 fois par semaine",
        _ => return None,
    };
    Some(prn(phrase, modifiers))
}

fn units_per_day(line: &str, modifiers: &Modifiers) -> Option<String> {
    if !outside_maximum(&UNITS_PER_DAY, line) {
        return None;
    }
    let phrase = if modifiers.prn {
        "1 fois par jour PRN"
    } else if line.contains("30 MINUTES AVANT LE COUCHER") {
        "1 fois par jour au coucher PRN"
    } else if AT_BREAKFAST.is_match(line) {
        "1 fois par jour au déjeuner"
    } else {
        "1 fois par jour"
    };
    Some(phrase.to_string())
}

static FREQUENCY_RULES: [Rule<Modifiers, String>; 11] = [
    Rule {
        name: "times_per_day",
        apply: times_per_day,
    },
    Rule {
        name: "english_daily",
        apply: english_daily,
    },
    Rule {
        name: "every_hours",
        apply: every_hours,
    },
    Rule {
        name: "every_minutes",
        apply: every_minutes,
    },
    Rule {
        name: "times_per_week",
        apply: times_per_week,
    },
    Rule {
        name: "units_per_day",
        apply: units_per_day,
    },
    Rule {
        name: "units_per_week",
        apply: |line, _| {
            outside_maximum(&UNITS_PER_WEEK, line).then(|| "1 fois par semaine".to_string())
        },
    },
    Rule {
        name: "morning",
        apply: |line, modifiers| {
            line.contains("LE MATIN")
                .then(|| prn("1 fois par jour le matin", modifiers))
        },
    },
    Rule {
        name: "half_hour_before_bed",
        apply: |line, modifiers| {
            HALF_HOUR_BEFORE_BED
                .is_match(line)
                .then(|| prn("1 fois par jour au coucher", modifiers))
        },
    },
    Rule {
        name: "single_dose",
        apply: |line, modifiers| SINGLE_DOSE.is_match(line).then(|| prn("1 fois", modifiers)),
    },
    Rule {
        name: "patch_change",
        apply: |line, _| PATCH_CHANGE.is_match(line).then(|| "1 fois par jour".to_string()),
    },
];

/// Rule names in evaluation order.
pub fn frequency_rule_names() -> Vec<&'static str> {
    names(&FREQUENCY_RULES)
}

/// Extract the schedule phrase from a normalized line.
///
/// Complex lines and lines no rule recognizes give an empty [`Frequency`].
pub fn extract_frequency(line: &str) -> Frequency {
    if is_complex(line) {
        tracing::debug!("complex dosage, frequency skipped");
        return Frequency::default();
    }

    let modifiers = Modifiers::detect(line);
    first_match("frequency", &FREQUENCY_RULES, line, &modifiers)
        .map(Frequency::new)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phrase(line: &str) -> String {
        extract_frequency(line).phrase
    }

    #[test]
    fn reference_phrases() {
        let cases = [
            ("PRENDRE 1 COMPRIME 1 FOIS PAR JOUR", "1 fois par jour"),
            ("PRENDRE 1 COMPRIME 2 FOIS PAR JOUR", "2 fois par jour"),
            (
                "PRENDRE 1 A 2 COMPRIMES AUX 4 A 6  HEURES SI BESOIN (MAXIMUM 8 COMPRIMES PAR JOUR)",
                "q4h PRN",
            ),
            ("PRENDRE 1 COMPRIME PAR JOUR", "1 fois par jour"),
            (
                "PRENDRE 1 COMPRIME PAR JOUR MAXIMUM 10 COMPRIME PAR JOUR",
                "1 fois par jour",
            ),
            (
                "PRENDRE 1 COMPRIME 1 FOIS PAR JOUR AVANT LE DEJEUNER",
                "1 fois par jour avant le déjeuner",
            ),
            (
                "PRENEZ 1 COMPRIME 30 MINUTES AVANT LE COUCHER - AU BESOIN (INSOMNIE)",
                "1 fois par jour au coucher PRN",
            ),
            ("PRENEZ 1 COMPRIME PAR JOUR SANS ARRET", "1 fois par jour"),
            (
                "PRENEZ 1 COMPRIME PAR JOUR AVEC LE DEJEUNER - REGULIEREMENT (PRESSION)",
                "1 fois par jour au déjeuner",
            ),
            (
                "VAPORISEZ 2 FOIS DANS LES NARINES LE MATIN - REGULIEREMENT (ALLERGIE)",
                "1 fois par jour le matin",
            ),
            (
                "PRENDRE 1 COMPRIME 1 FOIS PAR JOUR 1/2 HEURE AVANT COUCHER",
                "1 fois par jour au coucher",
            ),
            ("PRENEZ 1 COMPRIME AUX 4 HEURES - AU BESOIN (DOULEUR)", "q4h PRN"),
            (
                "PRENEZ 2 COMPRIMES AUX 6 HEURES - REGULIEREMENT (DOULEUR - FIEVRE)",
                "q6h",
            ),
            ("PRENEZ 1 COMPRIME AUX 4 A 6 HEURES - AU BESOIN (DOULEUR)", "q4h PRN"),
            (
                "PRENDRE 1 COMPRIME PAR SEMAINE AVEC 120 ML D'EAU, LE MATIN, AU MOINS 30 MINUTES AVANT NOURRITURE OU AUTRE MEDICAMENT",
                "1 fois par semaine",
            ),
            (
                "PRENDRE 1 CAPSULE UNE FOIS PAR JOUR, A LA MEME HEURE CHAQUE JOUR",
                "1 fois par jour",
            ),
            ("TAKE 1 TABLET ONCE DAILY", "1 fois par jour"),
            ("TAKE 1 TABLET ONCE DAILY AT BEDTIME", "1 fois par jour au coucher"),
            ("TAKE 1 TABLET ONCE DAILY IN THE MORNING", "1 fois par jour le matin"),
            (
                "TAKE 1 TABLET DAILY WITH BREAKFAST - REGULARLY (PRESSURE)",
                "1 fois par jour au déjeuner",
            ),
            ("TAKE 1 TABLET ONCE A WEEK", "1 fois par semaine"),
            (
                "1 VAPORISATION SOUS LA LANGUE AUX 5 MINUTES SI DOULEUR A LA POITRINE. MAX. 3 VAPORISATIONS SI BESOIN.",
                "q5min PRN",
            ),
            ("1 COMPRIME TOUTES LES 4 HEURES SI DOULEURS", "q4h PRN"),
            (
                "COLLER UN TIMBRE, GARDER 24 HEURES, RETIRER ET CHANGER. POURSUIVRE PENDANT 6 SEMAINES ET PASSER A L'ETAPE 2",
                "1 fois par jour",
            ),
        ];
        for (input, expected) in cases {
            assert_eq!(phrase(input), expected, "input: {input}");
        }
    }

    #[test]
    fn modifiers_detection() {
        assert_eq!(
            Modifiers::detect("1 COMPRIME AU BESOIN EN MANGEANT"),
            Modifiers {
                prn: true,
                with_food: true
            }
        );
        assert!(Modifiers::detect("TAKE AS NEEDED").prn);
        assert!(Modifiers::detect("1 COMPRIME SI DOULEUR").prn);
        assert!(Modifiers::detect("1 COMPRIME AVEC NOURRITURE").with_food);
        assert_eq!(Modifiers::detect("1 COMPRIME"), Modifiers::default());
    }

    #[test]
    fn once_daily_anchor_priority() {
        let cases = [
            ("1 FOIS PAR JOUR AU DEJEUNER", "1 fois par jour au déjeuner"),
            ("1 FOIS PAR JOUR AVEC LE DEJEUNER", "1 fois par jour au déjeuner"),
            ("1 FOIS PAR JOUR LE MATIN AU DEJEUNER", "1 fois par jour au déjeuner"),
            ("1 FOIS PAR JOUR LE MATIN", "1 fois par jour le matin"),
            ("1 FOIS PAR JOUR AU DINER", "1 fois par jour au dîner"),
            ("1 FOIS PAR JOUR AU SOUPER", "1 fois par jour au souper"),
            ("1 FOIS PAR JOUR AVANT LE COUCHER", "1 fois par jour au coucher"),
            ("1 FOIS PAR JOUR AU COUCHER", "1 fois par jour au coucher"),
            ("UNE FOIS PAR JOUR AU COUCHER AU BESOIN", "1 fois par jour au coucher PRN"),
            ("1 FOIS PAR JOUR SI BESOIN", "1 fois par jour PRN"),
        ];
        for (input, expected) in cases {
            assert_eq!(phrase(input), expected, "input: {input}");
        }
    }

    #[test]
    fn twice_daily_meal_anchor() {
        assert_eq!(
            phrase("1 COMPRIME 2 FOIS PAR JOUR AU DEJEUNER ET AU SOUPER"),
            "2 fois par jour au déjeuner et au souper"
        );
        assert_eq!(
            phrase("1 COMPRIME 2 FOIS PAR JOUR MATIN ET SOIR EN MANGEANT"),
            "2 fois par jour au déjeuner et au souper"
        );
        assert_eq!(
            phrase("1 COMPRIME 2 FOIS PAR JOUR MATIN ET SOIR"),
            "2 fois par jour"
        );
        // The meal anchor is not applied to as-needed schedules.
        assert_eq!(
            phrase("1 COMPRIME 2 FOIS PAR JOUR AU DEJEUNER ET AU SOUPER SI BESOIN"),
            "2 fois par jour PRN"
        );
    }

    #[test]
    fn three_and_four_times_daily() {
        assert_eq!(phrase("3 FOIS PAR JOUR"), "3 fois par jour");
        assert_eq!(phrase("4 FOIS PAR JOUR PRN"), "4 fois par jour PRN");
    }

    #[test]
    fn untabulated_count_falls_through() {
        assert_eq!(phrase("5 FOIS PAR JOUR"), "");
        assert_eq!(phrase("5 FOIS PAR JOUR LE MATIN"), "1 fois par jour le matin");
    }

    #[test]
    fn english_daily_variants() {
        assert_eq!(phrase("TAKE 1 TABLET DAILY AS NEEDED"), "1 fois par jour PRN");
        assert_eq!(phrase("TAKE 1 TABLET TWICE DAILY"), "");
        assert_eq!(phrase("TAKE 1 TABLET THREE TIMES DAILY"), "");
    }

    #[test]
    fn interval_hours_table() {
        let cases = [
            ("AUX 3 HEURES", "q3h"),
            ("AUX 4 HEURES", "q4h"),
            ("TOUS LES 6 HEURES", "q6h"),
            ("TOUTES LES 8 HEURES", "q8h"),
            ("AUX 12 HEURES", "q8h"),
            ("AUX 24 HEURES", "q8h"),
            ("AUX 6 HEURES AU BESOIN", "q6h PRN"),
        ];
        for (input, expected) in cases {
            assert_eq!(phrase(input), expected, "input: {input}");
        }
        assert_eq!(phrase("AUX 48 HEURES"), "");
    }

    #[test]
    fn interval_minutes_table() {
        assert_eq!(phrase("AUX 5 MINUTES"), "q5min");
        assert_eq!(phrase("AUX 10 MIN"), "q10min");
        assert_eq!(phrase("AUX 15 MINUTE"), "q15min");
        assert_eq!(phrase("AUX 30 MINUTES SI BESOIN"), "q30min PRN");
        assert_eq!(phrase("AUX 20 MINUTES"), "");
    }

    #[test]
    fn weekly_counts() {
        assert_eq!(phrase("1 FOIS PAR SEMAINE"), "1 fois par semaine");
        assert_eq!(phrase("2 FOIS PAR SEMAINE"), "2 fois par semaine");
        assert_eq!(phrase("3 FOIS PAR SEMAINE AU BESOIN"), "3 fois par semaine PRN");
        assert_eq!(phrase("4 FOIS PAR SEMAINE"), "");
        // Only ONCE is tabulated for the English form.
        assert_eq!(phrase("TAKE 1 TABLET TWICE A WEEK"), "");
    }

    #[test]
    fn units_per_day_overrides() {
        assert_eq!(phrase("2 COMPRIMES PAR JOUR SI BESOIN"), "1 fois par jour PRN");
        assert_eq!(
            phrase("1 COMPRIME PAR JOUR 30 MINUTES AVANT LE COUCHER"),
            "1 fois par jour au coucher PRN"
        );
        assert_eq!(
            phrase("1 CAPSULE PAR JOUR AU DEJEUNER"),
            "1 fois par jour au déjeuner"
        );
        assert_eq!(
            phrase("1 CAPSULE PAR JOUR AU DEJEUNER SI BESOIN"),
            "1 fois par jour PRN"
        );
    }

    #[test]
    fn maximum_ceiling_is_not_a_schedule() {
        assert_eq!(
            phrase("2 COMPRIMES PAR JOUR, MAXIMUM 6 COMPRIMES PAR JOUR"),
            "1 fois par jour"
        );
        assert_eq!(phrase("NE PAS DEPASSER MAXIMUM 6 COMPRIMES PAR JOUR"), "");
        assert_eq!(phrase("MAXIMUM 2 TIMBRES PAR SEMAINE"), "");
    }

    #[test]
    fn units_per_week() {
        assert_eq!(phrase("APPLIQUER 1 TIMBRE PAR SEMAINE"), "1 fois par semaine");
        assert_eq!(phrase("2 CAPSULES PAR SEMAINE AU BESOIN"), "1 fois par semaine");
    }

    #[test]
    fn late_fallback_groups() {
        assert_eq!(phrase("1 COMPRIME LE MATIN SI BESOIN"), "1 fois par jour le matin PRN");
        assert_eq!(
            phrase("1 COMPRIME 1/2 HEURE AVANT LE COUCHER"),
            "1 fois par jour au coucher"
        );
        assert_eq!(phrase("2 COMPRIMES IMMEDIATEMENT"), "1 fois");
        assert_eq!(phrase("DOSE UNIQUE AU BESOIN"), "1 fois PRN");
        assert_eq!(
            phrase("GARDER 24 HEURES RETIRER PUIS CHANGER"),
            "1 fois par jour"
        );
    }

    #[test]
    fn complex_lines_yield_empty() {
        let freq = extract_frequency(
            "PRENDRE 2 COMPRIMES LE 1ER JOUR, PUIS 1 COMPRIME 1 FOIS PAR JOUR AUX 24 HEURES DU 2IEME AU 5IEME JOUR",
        );
        assert_eq!(freq, Frequency::default());
        assert_eq!(freq.id, 0);
        assert!(freq.is_empty());
    }

    #[test]
    fn id_is_reserved_zero() {
        assert_eq!(extract_frequency("AUX 4 HEURES").id, 0);
    }

    #[test]
    fn unmatched_line_is_empty() {
        assert!(extract_frequency("SELON LES DIRECTIVES DU MEDECIN").is_empty());
    }

    #[test]
    fn rule_order_is_fixed() {
        assert_eq!(
            frequency_rule_names(),
            [
                "times_per_day",
                "english_daily",
                "every_hours",
                "every_minutes",
                "times_per_week",
                "units_per_day",
                "units_per_week",
                "morning",
                "half_hour_before_bed",
                "single_dose",
                "patch_change",
            ]
        );
    }

    #[test]
    fn interval_separator_is_ascii_whitespace_only() {
        assert_eq!(phrase("1 COMPRIME AUX 4\tHEURES"), "q4h");
        assert_eq!(phrase("1 COMPRIME AUX 4\u{A0}HEURES"), "");
        assert_eq!(phrase("AUX 5\u{2003}MINUTES"), "");
    }
}
