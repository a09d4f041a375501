//! Per-line orchestration of the extractors into [`DosageRecord`]s.

use crate::dose::extract_dose;
use crate::frequency::extract_frequency;
use crate::normalize::normalize;
use crate::route::extract_route;
use crate::{DosageError, DosageRecord, ExtractionConfig, Result};

/// Rewrites a raw line before normalization (e.g. English to French).
pub trait Preprocessor: Sync {
    fn preprocess(&self, line: &str) -> String;
}

/// Leaves lines untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Preprocessor for Identity {
    fn preprocess(&self, line: &str) -> String {
        line.to_string()
    }
}

/// Build the record for one raw line.
pub fn assemble(id: usize, raw: &str) -> DosageRecord {
    assemble_with(id, raw, &Identity)
}

/// Build the record for one raw line, rewriting it with `preprocessor` first.
///
/// `text` keeps the raw line as given.
pub fn assemble_with<P: Preprocessor + ?Sized>(
    id: usize,
    raw: &str,
    preprocessor: &P,
) -> DosageRecord {
    let line = normalize(&preprocessor.preprocess(raw));

    let dose = extract_dose(&line);
    let route = extract_route(&line, dose.as_ref().map(|d| d.unit));
    let frequency = extract_frequency(&line);

    let (dose, dose_unit) = match dose {
        Some(d) => (d.quantity, d.unit.as_str().to_string()),
        None => (String::new(), String::new()),
    };

    DosageRecord {
        id,
        text: raw.to_string(),
        dose,
        dose_unit,
        route: route.map(|r| r.as_str().to_string()).unwrap_or_default(),
        frequency_id: frequency.id,
        frequency: frequency.phrase,
    }
}

/// Build records for a batch; ids follow input order from `config.start_id`.
pub fn assemble_batch<S, P>(
    lines: &[S],
    config: &ExtractionConfig,
    preprocessor: &P,
) -> Vec<DosageRecord>
where
    S: AsRef<str> + Sync,
    P: Preprocessor + ?Sized,
{
    let build = |(index, line): (usize, &S)| {
        assemble_with(config.start_id + index, line.as_ref(), preprocessor)
    };

    #[cfg(feature = "parallel")]
    let records: Vec<DosageRecord> = if config.parallel {
        use rayon::prelude::*;
        // Indexed collect keeps input order regardless of completion order.
        lines.par_iter().enumerate().map(build).collect()
    } else {
        lines.iter().enumerate().map(build).collect()
    };

    #[cfg(not(feature = "parallel"))]
    let records: Vec<DosageRecord> = lines.iter().enumerate().map(build).collect();

    let stats = BatchStats::from_records(&records);
    tracing::info!(
        lines = stats.total,
        with_dose = stats.with_dose,
        with_route = stats.with_route,
        with_frequency = stats.with_frequency,
        parallel = config.parallel,
        "batch assembled"
    );
    records
}

/// Validate raw byte lines as UTF-8, then [`assemble_batch`].
///
/// The first invalid line aborts the batch; its 1-based position is reported.
pub fn assemble_bytes<B, P>(
    lines: &[B],
    config: &ExtractionConfig,
    preprocessor: &P,
) -> Result<Vec<DosageRecord>>
where
    B: AsRef<[u8]>,
    P: Preprocessor + ?Sized,
{
    let text = lines
        .iter()
        .enumerate()
        .map(|(index, bytes)| {
            std::str::from_utf8(bytes.as_ref()).map_err(|source| DosageError::Encoding {
                line: index + 1,
                source,
            })
        })
        .collect::<Result<Vec<&str>>>()?;

    Ok(assemble_batch(&text, config, preprocessor))
}

/// Counts over an assembled batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub total: usize,
    pub with_dose: usize,
    pub with_route: usize,
    pub with_frequency: usize,
}

impl BatchStats {
    pub fn from_records(records: &[DosageRecord]) -> Self {
        records.iter().fold(Self::default(), |mut stats, record| {
            stats.total += 1;
            stats.with_dose += usize::from(record.has_dose());
            stats.with_route += usize::from(record.has_route());
            stats.with_frequency += usize::from(record.has_frequency());
            stats
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Shout;

    impl Preprocessor for Shout {
        fn preprocess(&self, line: &str) -> String {
            line.replace("TAKE", "PRENDRE").replace("TABLET", "COMPRIME")
        }
    }

    #[test]
    fn assembles_full_record() {
        let record = assemble(3, "Prendre 1 à 2 comprimés aux 4 heures si besoin");
        assert_eq!(
            record,
            DosageRecord {
                id: 3,
                text: "Prendre 1 à 2 comprimés aux 4 heures si besoin".to_string(),
                dose: "1-2".to_string(),
                dose_unit: "comprimé".to_string(),
                route: "oral".to_string(),
                frequency_id: 0,
                frequency: "q4h PRN".to_string(),
            }
        );
    }

    #[test]
    fn complex_line_keeps_route_only() {
        let record = assemble(
            1,
            "Prendre 2 comprimés le 1er jour, puis 1 comprimé 1 fois par jour",
        );
        assert_eq!(record.dose, "");
        assert_eq!(record.dose_unit, "");
        assert_eq!(record.frequency, "");
        assert_eq!(record.frequency_id, 0);
        // No dose unit, and no textual route cue.
        assert_eq!(record.route, "");
    }

    #[test]
    fn complex_line_with_route_cue() {
        let record = assemble(
            1,
            "2 gouttes maintenant puis 1 goutte dans l'oeil gauche après chaque selle",
        );
        assert_eq!(record.dose, "");
        assert_eq!(record.route, "oeil gauche");
    }

    #[test]
    fn dose_and_unit_set_together() {
        for raw in ["2 VAPORISATIONS", "SELON LES DIRECTIVES", "PRENDRE 17 GRAMMES"] {
            let record = assemble(1, raw);
            assert_eq!(record.dose.is_empty(), record.dose_unit.is_empty(), "raw: {raw}");
        }
    }

    #[test]
    fn preprocessor_runs_before_normalization_but_text_is_raw() {
        let record = assemble_with(1, "TAKE 1 TABLET 2 FOIS PAR JOUR", &Shout);
        assert_eq!(record.text, "TAKE 1 TABLET 2 FOIS PAR JOUR");
        assert_eq!(record.dose, "1");
        assert_eq!(record.dose_unit, "comprimé");
        assert_eq!(record.frequency, "2 fois par jour");
    }

    #[test]
    fn batch_ids_follow_input_order() {
        let lines = ["2 VAPORISATIONS", "PRENDRE 1 COMPRIME", "AUX 4 HEURES"];
        let config = ExtractionConfig {
            start_id: 10,
            ..ExtractionConfig::default()
        };
        let records = assemble_batch(&lines, &config, &Identity);
        let ids: Vec<usize> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, [10, 11, 12]);
        assert_eq!(records[1].text, "PRENDRE 1 COMPRIME");
    }

    #[test]
    fn parallel_batch_matches_sequential() {
        let lines: Vec<String> = (0..64)
            .map(|i| format!("PRENDRE {} COMPRIMES AUX {} HEURES", i % 3 + 1, [4, 6, 8][i % 3]))
            .collect();
        let sequential = assemble_batch(&lines, &ExtractionConfig::default(), &Identity);
        let parallel = assemble_batch(
            &lines,
            &ExtractionConfig {
                parallel: true,
                ..ExtractionConfig::default()
            },
            &Identity,
        );
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn bytes_batch_reports_bad_line() {
        let lines: Vec<Vec<u8>> = vec![b"PRENDRE 1 COMPRIME".to_vec(), vec![0xC3, 0x28]];
        let err = assemble_bytes(&lines, &ExtractionConfig::default(), &Identity).unwrap_err();
        assert!(matches!(err, DosageError::Encoding { line: 2, .. }));
    }

    #[test]
    fn bytes_batch_accepts_utf8() {
        let lines = ["Prendre ½ comprimé".as_bytes()];
        let records = assemble_bytes(&lines, &ExtractionConfig::default(), &Identity).unwrap();
        assert_eq!(records[0].dose, "0.5");
        assert_eq!(records[0].id, 1);
    }

    #[test]
    fn stats_count_fields() {
        let lines = [
            "PRENDRE 1 COMPRIME 1 FOIS PAR JOUR",
            "SELON LES DIRECTIVES DU MEDECIN",
            "PRENDRE 2 COMPRIMES, PUIS 1 COMPRIME PAR JOUR",
        ];
        let records = assemble_batch(&lines, &ExtractionConfig::default(), &Identity);
        assert_eq!(
            BatchStats::from_records(&records),
            BatchStats {
                total: 3,
                with_dose: 1,
                with_route: 1,
                with_frequency: 1,
            }
        );
    }
}
