//! Structured dosage extraction from free-text medication instructions.
//!
//! A raw instruction line ("PRENDRE 1 A 2 COMPRIMES AUX 4 HEURES SI BESOIN")
//! is normalized, checked against the complexity gate, then run through three
//! ordered rule tables (dose, route, frequency). The result is a flat
//! [`DosageRecord`] whose values are drawn from fixed French vocabularies.

use serde::{Deserialize, Serialize};

mod assemble;
pub mod dose;
pub mod frequency;
pub mod gate;
pub mod normalize;
pub mod route;
mod rules;

pub use assemble::{
    assemble, assemble_batch, assemble_bytes, assemble_with, BatchStats, Identity, Preprocessor,
};
pub use dose::{dose_rule_names, extract_dose, Dose, DoseUnit};
pub use frequency::{extract_frequency, frequency_rule_names, Frequency, Modifiers};
pub use gate::is_complex;
pub use normalize::{normalize, normalize_bytes, normalize_fractions};
pub use route::{extract_route, route_rule_names, Route};

/// Knobs for batch assembly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtractionConfig {
    /// Spread a batch across the rayon pool. Ids still follow input order.
    pub parallel: bool,
    /// Identifier given to the first line of a batch.
    pub start_id: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            parallel: false,
            start_id: 1,
        }
    }
}

/// Extraction result for one input line.
///
/// `dose` and `dose_unit` are either both empty or both set. `frequency_id`
/// is a reserved slot and is currently always `0`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DosageRecord {
    pub id: usize,
    pub text: String,
    pub dose: String,
    pub dose_unit: String,
    pub route: String,
    pub frequency_id: u32,
    pub frequency: String,
}

impl DosageRecord {
    /// Plain-text summary: `text, dose, dose_unit, frequency`.
    pub fn summary_line(&self) -> String {
        format!(
            "{}, {}, {}, {}",
            self.text, self.dose, self.dose_unit, self.frequency
        )
    }

    pub fn has_dose(&self) -> bool {
        !self.dose.is_empty()
    }

    pub fn has_route(&self) -> bool {
        !self.route.is_empty()
    }

    pub fn has_frequency(&self) -> bool {
        !self.frequency.is_empty()
    }
}

/// Errors raised at the boundary of the engine. Rule matching itself never fails.
#[derive(Debug, thiserror::Error)]
pub enum DosageError {
    #[error("line {line} is not valid UTF-8: {source}")]
    Encoding {
        line: usize,
        #[source]
        source: std::str::Utf8Error,
    },
    #[error("cannot serialize records: {0}")]
    Serialize(String),
}

pub type Result<T> = std::result::Result<T, DosageError>;

/// Serialize records as a pretty JSON array (two-space indent).
pub fn to_json(records: &[DosageRecord]) -> Result<String> {
    serde_json::to_string_pretty(records).map_err(|err| DosageError::Serialize(err.to_string()))
}

/// One summary line per record, each terminated by a newline.
pub fn to_text(records: &[DosageRecord]) -> String {
    records
        .iter()
        .map(|record| record.summary_line() + "\n")
        .collect()
}
