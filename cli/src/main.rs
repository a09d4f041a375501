use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use posologie_core::{
    assemble_bytes, to_json, to_text, BatchStats, DosageRecord, ExtractionConfig, Identity,
    Preprocessor,
};
use posologie_translate::EnglishToFrench;

mod logging;

use logging::{init_logging, LogConfig};

#[derive(Parser, Debug)]
#[command(
    name = "posologie-cli",
    about = "Extract dose, route and frequency from medication instructions, one per line."
)]
struct Args {
    /// Instruction file, one instruction per line.
    #[arg(short, long, default_value = "in_sample.txt")]
    input: PathBuf,

    /// Where to write the JSON records.
    #[arg(long, default_value = "out.json")]
    json_out: PathBuf,

    /// Where to write the "text, dose, dose_unit, frequency" summary.
    #[arg(long, default_value = "out.txt")]
    text_out: PathBuf,

    /// Translate English instructions to French before extraction.
    #[arg(long)]
    translate: bool,

    /// Process lines on all cores.
    #[arg(long)]
    parallel: bool,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn extraction_config(&self) -> ExtractionConfig {
        ExtractionConfig {
            parallel: self.parallel,
            ..ExtractionConfig::default()
        }
    }

    fn preprocessor(&self) -> &'static dyn Preprocessor {
        if self.translate {
            &EnglishToFrench
        } else {
            &Identity
        }
    }
}

/// Split on `\n`, dropping a trailing `\r` from each line.
fn read_lines<R: BufRead>(reader: R) -> std::io::Result<Vec<Vec<u8>>> {
    reader
        .split(b'\n')
        .map(|line| {
            line.map(|mut bytes| {
                if bytes.last() == Some(&b'\r') {
                    bytes.pop();
                }
                bytes
            })
        })
        .collect()
}

fn write_outputs(records: &[DosageRecord], json_out: &Path, text_out: &Path) -> anyhow::Result<()> {
    let json = to_json(records)?;
    std::fs::write(json_out, json)
        .with_context(|| format!("cannot write {}", json_out.display()))?;
    std::fs::write(text_out, to_text(records))
        .with_context(|| format!("cannot write {}", text_out.display()))?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&LogConfig::from_verbosity(args.verbose));

    let file = File::open(&args.input)
        .with_context(|| format!("cannot open {}", args.input.display()))?;
    let lines = read_lines(BufReader::new(file))
        .with_context(|| format!("cannot read {}", args.input.display()))?;
    tracing::debug!(lines = lines.len(), input = %args.input.display(), "input read");

    let records = assemble_bytes(&lines, &args.extraction_config(), args.preprocessor())
        .with_context(|| format!("invalid input in {}", args.input.display()))?;

    write_outputs(&records, &args.json_out, &args.text_out)?;

    let stats = BatchStats::from_records(&records);
    println!(
        "Lines: {}\nWith dose: {}\nWith route: {}\nWith frequency: {}\nJSON: {}\nText: {}",
        stats.total,
        stats.with_dose,
        stats.with_route,
        stats.with_frequency,
        args.json_out.display(),
        args.text_out.display()
    );

    Ok(())
}
