//! English to French rewriting of medication instructions.
//!
//! The translation is a fixed cascade of substitutions applied in order. Each
//! step sees the output of the previous one, so the order of [`CASCADE`] is
//! significant: "INHALER" must become "INHALATEUR" before "INHALE " becomes
//! "INHALER ", "TAKE IN AM" must be handled before "TAKE", and so on.

use std::sync::LazyLock;

use posologie_core::Preprocessor;
use regex::{Captures, Regex};

enum Step {
    Literal(&'static str, &'static str),
    Pattern(Regex, String),
    Rewrite(Regex, fn(&Captures<'_>) -> String),
}

impl Step {
    fn apply(&self, line: String) -> String {
        match self {
            Step::Literal(from, to) => line.replace(from, to),
            Step::Pattern(re, replacement) => re.replace_all(&line, replacement.as_str()).into_owned(),
            Step::Rewrite(re, rewrite) => re.replace_all(&line, |caps: &Captures<'_>| rewrite(caps)).into_owned(),
        }
    }
}

fn lit(from: &'static str, to: &'static str) -> Step {
    Step::Literal(from, to)
}

fn pat(pattern: &str, replacement: &str) -> Step {
    let re = Regex::new(pattern).expect("invalid translation pattern - this is a bug");
    Step::Pattern(re, replacement.to_string())
}

fn rewrite(pattern: &str, rewrite: fn(&Captures<'_>) -> String) -> Step {
    let re = Regex::new(pattern).expect("invalid translation pattern - this is a bug");
    Step::Rewrite(re, rewrite)
}

/// "(12.5 MG TOTAL)" -> "(12,5 MG)"
fn total_with_decimal_comma(caps: &Captures<'_>) -> String {
    format!("({} {})", caps[1].replacen('.', ",", 1), &caps[2])
}

/// "(1,000 MG TOTAL)" -> "(1000 MG)"
fn total_without_thousands(caps: &Captures<'_>) -> String {
    format!("({} MG)", caps[1].replace(',', ""))
}

/// "EVERY 6 HOURS", "EVERY 6 (SIX) HOURS" -> "AUX 6 HEURES"
fn every_n_hours() -> Vec<Step> {
    [
        ("2", "TWO"),
        ("3", "THREE"),
        ("4", "FOUR"),
        ("6", "SIX"),
        ("8", "EIGHT"),
        ("12", "TWELVE"),
        ("24", "TWENTYFOUR"),
    ]
    .into_iter()
    .map(|(digits, word)| {
        pat(
            &format!(r"EVERY {digits} (?:\({word}\) )?HOURS"),
            &format!("AUX {digits} HEURES"),
        )
    })
    .collect()
}

static CASCADE: LazyLock<Vec<Step>> = LazyLock::new(|| {
    let mut steps = vec![
        // Thousands separators.
        rewrite(r"[0-9]{1,3}(?:,[0-9]{3})*", |caps| caps[0].replace(',', "")),
        // Verbs.
        lit("TAKE IN AM", "PRENDRE LE MATIN"),
        lit("TAKE", "PRENDRE"),
        lit("ADMINISTER", "ADMINISTRER"),
        lit("APPLY", "APPLIQUER"),
        lit("INJECT", "INJECTER"),
        lit("INHALER", "INHALATEUR"),
        lit("INHALE ", "INHALER "),
        lit("PLACE RECTALLY", "INSÉRER DANS LE RECTUM"),
        lit("PLACE 1 APPLICATOR VAGINALLY", "INSÉRER 1 APPLICATEUR DANS LE VAGIN"),
        lit("PLACE", "APPLIQUER"),
        lit("INSTILL", "INSTILLER"),
        lit("CHEW", "MÂCHER"),
        lit("INSERT", "INSÉRER"),
        lit(
            "PLEASE OBTAIN MEDICINE (OVER THE COUNTER) FROM YOUR LOCAL PHARMACY",
            "VEUILLER VOUS PROCURER CE MÉDICAMENT (EN VENTE LIBRE) DANS VOTRE PHARMACIE COMMUNAUTAIRE",
        ),
        pat(r"^SPRAY ", "VAPORISER "),
        lit("ONE-HALF", "1/2"),
        // Dose forms.
        lit("TABLET", "COMPRIMÉ"),
        lit("TAB ", "COMPRIMÉ "),
        lit("DROP", "GOUTTE"),
        lit("SPRAY", "VAPORISATION"),
        lit("UNIT", "UNITÉ"),
        lit("PUFF", "BOUFFÉE"),
        lit("PATCH", "TIMBRE"),
        lit("SUPPOSITORY ", "SUPPOSITOIRE "),
        lit("AMPULE", "NÉBULE"),
        lit("LOZENGE", "PASTILLE"),
        lit("APPLICATOR", "APPLICATEUR"),
        lit("PILL", "PILULE"),
        rewrite(r"\(([0-9.]+) (MG|G) TOTAL\)", total_with_decimal_comma),
        rewrite(r"\(([0-9]{1,3}(?:,[0-9]{3})*) MG TOTAL\)", total_without_thousands),
        // Routes.
        lit("BY MOUTH", "PAR LA BOUCHE"),
        lit("ORALLY", "PAR LA BOUCHE"),
        lit("INTO AFFECTED EAR(S)", "DANS OREILLE(S) AFFECTÉE(S)"),
        lit("INTO THE LEFT EAR", "DANS L'OREILLE GAUCHE"),
        lit("INTO THE RIGHT EAR", "DANS L'OREILLE DROITE"),
        lit("DOSE IS FOR EACH NOSTRIL", "LA DOSE EST POUR CHAQUE NARINE"),
        lit("INTO EACH NOSTRIL", "DANS CHAQUE NARINE"),
        lit("IN BOTH NOSTRILS", "DANS CHAQUE NARINE"),
        lit("EACH NARE ROUTE", "DANS CHAQUE NARINE"),
        lit("INTO NOSE", "DANS LE NEZ"),
        lit("BY NASAL ROUTE", "PAR VOIE NASALE"),
        lit("BY NEBULIZATION", "EN NÉBULISATION"),
        lit("BY NEBULIZER ROUTE", "EN NÉBULISATION"),
        lit("INTO BOTH EYES", "DANS LES 2 YEUX"),
        lit("UNDER THE SKIN", "SOUS LA PEAU"),
        lit("INTO THE SKIN", "SOUS LA PEAU"),
        lit("ONTO THE SKIN", "SUR LA PEAU"),
        lit("TO SKIN", "SUR LA PEAU"),
        lit("TOPICALLY", "LOCALEMENT"),
        lit("TO AFFECTED AREA", "SUR LA ZONE AFFECTÉE"),
        lit("INTO THE LEFT EYE", "DANS L'OEIL GAUCHE"),
        lit("INTO THE RIGHT EYE", "DANS L'OEIL DROIT"),
        lit("IN AFFECTED EYE(S)", "DANS L'OEIL (OU LES YEUX) AFFECTÉ(S)"),
        lit("TO AFFECTED EYE(S)", "DANS L'OEIL (OU LES YEUX) AFFECTÉ(S)"),
        lit("TO EYE", "DANS L'OEIL"),
        lit("INTRAMUSCULARLY", "PAR VOIE INTRAMUSCULAIRE"),
        lit("INTO THE MUSCLE", "PAR VOIE INTRAMUSCULAIRE"),
        lit("INTO THE RECTUM", "DANS LE RECTUM"),
        lit("INTO THE LUNGS", "DANS LES POUMONS"),
        // Daily ceilings.
        pat(
            r"MAX(?:IMUM)? DAILY AMOUNT(?::| IS)? ([0-9]+) (MG|MCG|MEQ|ML|COMPRIMÉS|COMPRIMÉ|GOUTTES|GOUTTE|PASTILLES|UNITÉS|INHALATIONS|INHALATION|CAPSULE|BOUFFÉES|BOUFFÉE|APPLICATEUR|VAPORISATIONS|VAPORISATION|TIMBRE|APPLICATION|G|INHALATEURS|INHALATEUR|DOSES|DOSE)",
            "(DOSE MAX PAR JOUR: ${1} ${2})",
        ),
        pat(
            r"MAX(?:IMUM)? DAILY AMOUNT: ([0-9]+)\.([0-9]+) (MG|MCG|ML|COMPRIMÉS|COMPRIMÉ)",
            "(DOSE MAX PAR JOUR: ${1},${2} ${3})",
        ),
        pat(
            r"MAX DAILY AMOUNT: ([0-9]+),([0-9]+) (MG|ML|COMPRIMÉS|COMPRIMÉ)",
            "(DOSE MAX PAR JOUR: ${1}${2} ${3})",
        ),
        lit("DOSE IN 24 HOURS", "DOSE PAR JOUR"),
        lit("DOSES IN 24 HOURS", "DOSES PAR JOUR"),
        lit("MG IN 24 HOURS", "MG PAR JOUR"),
        // Frequencies.
        pat(r"(?:ONCE|ONE TIME) (?:DAILY|A DAY)", "1 FOIS PAR JOUR"),
        pat(r"(?:2|2 \(TWO\)|TWO) TIMES (?:DAILY|A DAY)", "2 FOIS PAR JOUR"),
        pat(r"TWICE (?:DAILY|A DAY)", "2 FOIS PAR JOUR"),
        pat(r"(?:3|3 \(THREE\)|THREE) TIMES (?:DAILY|A DAY)", "3 FOIS PAR JOUR"),
        pat(r"(?:4|4 \(FOUR\)|FOUR) TIMES (?:DAILY|A DAY)", "4 FOIS PAR JOUR"),
        pat(r"EVERY ([2-9]) DAYS", "À TOUS LES ${1} JOURS"),
        lit("PRIOR TO FOOD", "À JEUN"),
        lit("BEFORE MEALS AND NIGHTLY", "AVANT LES REPAS ET AU COUCHER"),
        lit("BEFORE BREAKFAST", "AVANT LE DÉJEUNER"),
        lit("BEFORE MEALS", "AVANT LES REPAS"),
        lit("WITH BREAKFAST", "AVEC LE DÉJEUNER"),
        lit("Q DAY", "1 FOIS PAR JOUR"),
        lit(" BID ", " 2 FOIS PAR JOUR "),
        lit("TWICE DAILY", "2 FOIS PAR JOUR"),
        lit("THREE TIMES DAILY", "3 FOIS PAR JOUR"),
        lit("NIGHTLY", "1 FOIS PAR JOUR AU COUCHER"),
        lit("EVERY DAY", "1 FOIS PAR JOUR"),
        lit("EVERY 4 (FOUR) TO 6 (SIX) HOURS", "AUX 4 À 6 HEURES"),
    ];

    steps.extend(every_n_hours());

    steps.extend([
        pat(r"EVERY (?:12|12 \(TWELVE\)|TWELVE) HOURS", "AUX 12 HEURES"),
        lit("ONCE A WEEK", "1 FOIS PAR SEMAINE"),
        lit("TWICE A WEEK", "2 FOIS PAR SEMAINE"),
        lit("WEEKLY", "1 FOIS PAR SEMAINE"),
        lit("EVERY MORNING", "CHAQUE MATIN"),
        lit("EVERY EVENING", "CHAQUE SOIR"),
        lit("EVERY NIGHT", "CHAQUE SOIR"),
        lit("IN THE MORNING", "LE MATIN"),
        lit("IN THE EVENING", "LE SOIR"),
        lit("AT BEDTIME", "AU COUCHER"),
        lit("EVERY 5 (FIVE) MINUTES", "AUX 5 MINUTES"),
        lit("EVERY 5 MINUTES", "AUX 5 MINUTES"),
        lit("DAILY", "1 FOIS PAR JOUR"),
        lit("EVERY OTHER DAY", "AUX 2 JOURS"),
        lit("EVERY 7 (SEVEN) DAYS", "AUX 7 JOURS"),
        lit("EVERY 14 (FOURTEEN) DAYS", "AUX 14 JOURS"),
        lit("EVERY 30 (THIRTY) DAYS", "AUX 30 JOURS"),
        lit("EVERY 3 (THREE) MONTHS", "AUX 3 MOIS"),
        lit("ONCE FOR 1 DOSE", "POUR 1 DOSE"),
        pat(r"EVERY ([0-9]+) DAYS", "AUX ${1} JOURS"),
        pat(r"IN ([0-9]+) HOURS", "DANS ${1} HEURES"),
        // As needed.
        lit("AS NEEDED", "AU BESOIN"),
        lit("IF NEEDED", "AU BESOIN"),
        lit("IF UNRESOLVED", "SI NON SOULAGÉ"),
        lit("IF NO RELIEF", "SI NON SOULAGÉ"),
        // Durations.
        lit("FOR UP TO", "JUSQU'À UN MAXIMUM DE"),
        pat(r"FOR ([0-9]+) DAYS", "POUR ${1} JOURS"),
        pat(r"X ([0-9]+) DAYS", "X ${1} JOURS"),
        // Indications.
        lit("FOR MILD PAIN (1-3)", "POUR DOULEUR LÉGÈRE"),
        lit("FOR MODERATE PAIN (PAIN SCALE 4-7)", "POUR DOULEUR MODÉRÉE"),
        lit("FOR MODERATE PAIN (4-6)", "POUR DOULEUR MODÉRÉE"),
        lit("FOR SEVERE PAIN (7-10)", "POUR DOULEUR SÉVÈRE"),
        lit("FOR SEVERE PAIN", "POUR DOULEUR SÉVÈRE"),
        lit("SEVERE PAIN", "POUR DOULEUR SÉVÈRE"),
        lit("FOR DEPRESSION", "POUR LA DÉPRESSION"),
        lit("FOR COUGH", "POUR LA TOUX"),
        lit("FOR FEVER", "POUR LA FIÈVRE"),
        lit("FOR SLEEP", "POUR L'INSOMNIE"),
        lit("COUGH", "TOUX"),
        lit("ITCHING", "PRURIT"),
        lit("FOR NAUSEA OR VOMITING", "POUR LES NAUSÉES/VOMISSEMENTS"),
        lit("TO THE RASH", "SUR LES ROUGEURS"),
        lit("TO RASH", "SUR LES ROUGEURS"),
        lit("FOR WHEEZING", "SI RESPIRATION SIFFLANTE"),
        lit("ANXIETY", "ANXIÉTÉ"),
        lit("HEADACHES", "MAUX DE TÊTE"),
        lit("MUSCLE SPASMS", "SPASMES MUSCULAIRE"),
        lit("CRAMPING", "CRAMPES"),
        lit("PAIN", "DOULEUR"),
        lit("FEVER", "FIÈVRE"),
        lit("SHORTNESS OF BREATH", "DYSPNÉE"),
        lit("SHORTNESS OF AIR", "DYSPNÉE"),
        lit("NAUSEA/VOMITING", "NAUSÉES/VOMISSEMENTS"),
        lit("NAUSE/VOMITING", "NAUSÉES/VOMISSEMENTS"),
        lit("NAUSEA", "NAUSÉES"),
        lit("RHINITIS", "RHINITE"),
        lit("ANAPHYLAXIS", "ANAPHYXIE"),
        lit("HEMORRHOIDS", "HÉMORROÏDES"),
        lit("HIGH BLOOD PRESSURE", "HYPERTENSION"),
        lit("ERECTILE DYSFUNCTION", "DYSFONCTION ÉRECTILE"),
        // Advisories.
        lit("MAY REPEAT DOSE", "PEUT RÉPÉTER LA DOSE"),
        lit("MAY REPEAT", "PEUT RÉPÉTER"),
        lit("DO NOT EXCEED", "NE PAS DÉPASSER"),
        lit("AVOID GRAPEFRUIT PRODUCTS", "ÉVITER LE PAMPLEMOUSSE"),
        lit("WITH GLASS OF WATER", "AVEC UN VERRE D'EAU"),
        lit("WITH A FULL GLASS OF WATER", "AVEC UN GRAND VERRE D'EAU"),
        lit("WITH FULL GLASS OF WATER", "AVEC UN GRAND VERRE D'EAU"),
        lit(
            "WITH A SMALL AMOUNT OF NON-DAIRY FOOD",
            "AVEC UN PEU DE NOURRITURE SANS PRODUITS LAITIERS",
        ),
        lit("DON'T LIE DOWN", "ÉVITER DE S'ALLONGER"),
        // Number words.
        pat(r"^ONE(?-u:\s)", "UN "),
        pat(r"(?-u:\s)ONE(?-u:\s)", " UN "),
        pat(r"(?-u:\s)TWO(?-u:\s)", " DEUX "),
        pat(r"^TWO(?-u:\s)", "DEUX "),
        lit("TWO", "DEUX"),
        lit("THREE", "TROIS"),
        lit("ONCE", "1 FOIS"),
        lit("TWICE", "2 FOIS"),
        // Meals and leftovers.
        lit("GIVE WITH MEALS", "AVEC LES REPAS"),
        lit("GIVE AFTER MEALS", "PRENDRE APRÈS LES REPAS"),
        lit("WITH MEALS", "AVEC LES REPAS"),
        lit("WITH FOOD", "AVEC NOURRITURE"),
        lit("DAYS", "JOURS"),
        lit("/DAY", "/JOUR"),
        lit("/WEEK", "/SEMAINE"),
        lit("MEDICINE", "MÉDICAMENT"),
        // Connectors.
        lit(" MLS ", " ML "),
        lit(" OR ", " OU "),
        lit(" AND ", " ET "),
        lit(" FOR ", " POUR "),
        lit(" TO ", " À "),
        lit(" PO ", " PAR LA BOUCHE "),
        lit(" IN ", " DANS "),
        // Feminine agreement.
        lit("UN GOUTTE", "UNE GOUTTE"),
        lit("UN BOUFFÉE", "UNE BOUFFÉE"),
        lit("UN CAPSULE", "UNE CAPSULE"),
        lit("UN PILLULE", "UNE PILLULE"),
        // 12.5 -> 12,5
        pat(r"([0-9])\.([0-9])", "${1},${2}"),
        lit("((", "("),
        lit("))", ")"),
    ]);

    steps
});

/// Translate an English instruction into the French phrasing the extractors expect.
///
/// The line is upper-cased first; lines already in French pass through
/// mostly unchanged.
pub fn translate(line: &str) -> String {
    let translated = CASCADE
        .iter()
        .fold(line.to_uppercase(), |acc, step| step.apply(acc));
    tracing::trace!(from = line, to = translated.as_str(), "translated");
    translated
}

/// [`Preprocessor`] running [`translate`] before extraction.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishToFrench;

impl Preprocessor for EnglishToFrench {
    fn preprocess(&self, line: &str) -> String {
        translate(line)
    }
}
