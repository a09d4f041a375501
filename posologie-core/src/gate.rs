//! Detection of multi-phase instructions that must not be partially parsed.

use std::sync::LazyLock;

use regex::Regex;

use crate::rules::compile;

// "... PUIS 1 COMPRIME ..." : step-up / step-down schedule.
static STEP_CHANGE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"PUIS ([0-9]+) (?:COMPRIMES?|CAPSULES?)"));

// Loading dose now, then one per stool.
static PER_STOOL: LazyLock<Regex> = LazyLock::new(|| compile(r"MAINTENANT.*CHAQUE SELLE"));

/// True when a normalized line describes more than one dosing phase.
///
/// Dose and frequency extraction yield nothing for such lines; route
/// extraction still runs.
pub fn is_complex(line: &str) -> bool {
    STEP_CHANGE.is_match(line) || PER_STOOL.is_match(line)
}
