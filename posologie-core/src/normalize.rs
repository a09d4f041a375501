//! Text normalization applied before any rule runs.

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::rules::compile;
use crate::{DosageError, Result};

static NONSPACING_MARK: LazyLock<Regex> = LazyLock::new(|| compile(r"\p{Mn}"));

/// Upper-case the line and strip accents.
///
/// Accents are removed by decomposing, dropping nonspacing marks (Mn) and
/// recomposing, so "é" becomes "E" while "œ" (which has no canonical
/// decomposition) comes out as "Œ". Fractions are left untouched here: see
/// [`normalize_fractions`].
pub fn normalize(raw: &str) -> String {
    let decomposed: String = raw.to_uppercase().nfd().collect();
    let stripped = NONSPACING_MARK.replace_all(&decomposed, "");
    stripped.nfc().collect()
}

/// Validate raw bytes as UTF-8, then [`normalize`].
///
/// `line` is the 1-based input position used in the error.
pub fn normalize_bytes(raw: &[u8], line: usize) -> Result<String> {
    let text = std::str::from_utf8(raw).map_err(|source| DosageError::Encoding { line, source })?;
    Ok(normalize(text))
}

/// Rewrite vulgar and ASCII fractions as decimals.
///
/// Only the first applicable case runs: a line holding both "1 1/2" and a
/// lone "1/4" only gets the mixed number rewritten.
pub fn normalize_fractions(text: &str) -> String {
    let text = text
        .replace('½', "1/2")
        .replace('¼', "1/4")
        .replace('¾', "3/4");

    const CASES: [(&str, &str); 5] = [
        ("1 1/2", "1.5"),
        ("1 1/4", "1.25"),
        ("1/2", "0.5"),
        ("1/4", "0.25"),
        ("3/4", "0.75"),
    ];

    match CASES.iter().find(|(from, _)| text.contains(from)) {
        Some((from, to)) => text.replace(from, to),
        None => text,
    }
}
