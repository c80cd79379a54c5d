use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::ArgMatches;
use serde::Serialize;
use tracing::{debug, info, warn};

use naha_core::{ConfigError, HeaderParser, SequenceRecord};
use naha_io::{FastaReader, TableWrite};
use naha_motifs::{StalkConfig, StalkExtractor, StalkMode, StalkOutcome, Unmeasurable};

use crate::audit::AuditLog;
use crate::input::{filter_by_date, header_parser_and_window, load_records};
use crate::na::cli::NA_CMD;

#[derive(Serialize)]
struct NaParameters<'a> {
    fasta: &'a str,
    #[serde(flatten)]
    stalk: &'a StalkConfig,
    reference: Option<&'a str>,
    drop_reference: bool,
    id_pattern: Option<&'a str>,
    skip_unidentified: bool,
    min_date: Option<&'a str>,
    max_date: Option<&'a str>,
    out: &'a str,
}

#[derive(Serialize)]
struct RecordOutcome<'a> {
    identifier: &'a str,
    collection_date: Option<NaiveDate>,
    #[serde(flatten)]
    outcome: &'a StalkOutcome,
}

///
/// Stalk parameters from `--config`, overridden by any flag given on the command line.
///
fn stalk_config(matches: &ArgMatches) -> Result<StalkConfig> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => StalkConfig::try_from(Path::new(path))?,
        None => StalkConfig::default(),
    };

    if let Some(begin) = matches.get_one::<String>("begin-pattern") {
        config.begin = Some(begin.clone());
    }
    if let Some(end) = matches.get_one::<String>("end-pattern") {
        config.end = Some(end.clone());
    }
    if let Some(offset) = matches.get_one::<isize>("start-offset") {
        config.start_offset = *offset;
    }
    if let Some(offset) = matches.get_one::<isize>("end-offset") {
        config.end_offset = *offset;
    }
    if matches.get_flag("drop-first-residue") {
        config.drop_first_residue = true;
    }
    if let Some(mode) = matches.get_one::<String>("mode") {
        config.mode = mode.parse()?;
    }

    Ok(config)
}

fn check_reference_options(
    mode: StalkMode,
    reference: Option<&String>,
    drop_reference: bool,
) -> Result<(), ConfigError> {
    match mode {
        StalkMode::PerRecord if reference.is_some() => Err(ConfigError::IncompatibleOptions(
            "--reference requires --mode reference".to_string(),
        )),
        StalkMode::PerRecord if drop_reference => Err(ConfigError::IncompatibleOptions(
            "--drop-reference requires --mode reference".to_string(),
        )),
        StalkMode::Reference if reference.is_some() && drop_reference => {
            Err(ConfigError::IncompatibleOptions(
                "--drop-reference only applies when the reference is the first input record"
                    .to_string(),
            ))
        }
        _ => Ok(()),
    }
}

fn first_record(path: &Path, parser: HeaderParser) -> Result<SequenceRecord> {
    FastaReader::from_path(path, parser)
        .with_context(|| format!("Failed to open reference {}", path.display()))?
        .next()
        .with_context(|| format!("Reference file {} has no records", path.display()))?
        .with_context(|| format!("Failed to parse reference {}", path.display()))
}

pub fn run_na(matches: &ArgMatches) -> Result<()> {
    let fasta = matches
        .get_one::<String>("fasta")
        .expect("--fasta is required");
    let out = matches.get_one::<String>("out").expect("--out is required");
    let reference_path = matches.get_one::<String>("reference");
    let drop_reference = matches.get_flag("drop-reference");
    let skip_unidentified = matches.get_flag("skip-unidentified");

    let config = stalk_config(matches)?;
    check_reference_options(config.mode, reference_path, drop_reference)?;
    let boundaries = config.boundaries()?;
    let (parser, window) = header_parser_and_window(matches)?;

    let mut loaded = load_records(Path::new(fasta), parser.clone(), skip_unidentified)?;

    let extractor = match config.mode {
        StalkMode::PerRecord => StalkExtractor::per_record(boundaries),
        StalkMode::Reference => {
            let reference = match reference_path {
                Some(path) => first_record(Path::new(path), parser)?,
                None => loaded
                    .records
                    .first()
                    .cloned()
                    .with_context(|| format!("{} has no records to use as reference", fasta))?,
            };
            let extractor = StalkExtractor::from_reference(boundaries, reference.sequence())?;
            info!(
                reference = %reference.identifier(),
                span = ?extractor.reference_span(),
                "Stalk columns fixed from reference"
            );
            extractor
        }
    };

    if drop_reference && !loaded.records.is_empty() {
        let reference = loaded.records.remove(0);
        info!(identifier = %reference.identifier(), "Reference record left out of the table");
    }

    let removed_by_date = filter_by_date(&mut loaded.records, &window);
    if loaded.records.is_empty() {
        warn!("No records left to measure; writing an empty table");
    }

    let batch = extractor.measure_all(&loaded.records);

    for reason in [
        Unmeasurable::BeginNotFound,
        Unmeasurable::EndNotFound,
        Unmeasurable::InvalidSpan,
    ] {
        let count = batch.unmeasurable_for(reason);
        if count > 0 {
            warn!(count, reason = %reason, "Stalk could not be measured");
        }
    }
    for (record, outcome) in loaded.records.iter().zip(&batch.outcomes) {
        if let StalkOutcome::Unmeasurable { reason } = outcome {
            debug!(identifier = %record.identifier(), reason = %reason, "Unmeasurable stalk");
        }
    }

    let written = batch
        .measurements
        .write_table(out)
        .with_context(|| format!("Failed to write NA table {}", out))?;
    info!(
        path = %out,
        rows = written,
        measured = batch.measured(),
        unmeasurable = batch.unmeasurable(),
        "NA table written"
    );

    if let Some(audit_path) = matches.get_one::<String>("audit") {
        let parameters = NaParameters {
            fasta,
            stalk: &config,
            reference: reference_path.map(String::as_str),
            drop_reference,
            id_pattern: matches.get_one::<String>("id-pattern").map(String::as_str),
            skip_unidentified,
            min_date: matches.get_one::<String>("min-date").map(String::as_str),
            max_date: matches.get_one::<String>("max-date").map(String::as_str),
            out,
        };
        let mut audit = AuditLog::new(NA_CMD, &parameters)?;
        audit.summarize("unidentified", loaded.unidentified);
        audit.summarize("removed_by_date", removed_by_date);
        audit.summarize("records", batch.len());
        audit.summarize("measured", batch.measured());
        audit.summarize("unmeasurable", batch.unmeasurable());
        for (record, outcome) in loaded.records.iter().zip(&batch.outcomes) {
            audit.record(&RecordOutcome {
                identifier: record.identifier(),
                collection_date: record.collection_date(),
                outcome,
            })?;
        }
        audit.write(audit_path)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::path::PathBuf;

    use naha_io::read_stalk_table;

    const BEGIN: &str = "G-?N-?I-?I-?S-?.-?.";
    const END: &str = "V-?.-?.-?.-?T-?L";

    fn get_test_path(file_name: &str) -> PathBuf {
        std::env::current_dir()
            .unwrap()
            .join("../tests/data")
            .join(file_name)
    }

    fn run_cli(args: &[&str]) -> Result<()> {
        let fasta = get_test_path("fasta/na_aligned.fasta");
        let mut argv = vec!["naha", "na", "--fasta", fasta.to_str().unwrap()];
        argv.extend_from_slice(args);
        let matches = crate::build_parser().try_get_matches_from(argv)?;
        crate::run(&matches)
    }

    fn lengths(path: &Path) -> Vec<(String, Option<u32>)> {
        read_stalk_table(path)
            .unwrap()
            .into_iter()
            .map(|m| (m.identifier, m.stalk_length))
            .collect()
    }

    fn row(id: &str, length: Option<u32>) -> (String, Option<u32>) {
        (id.to_string(), length)
    }

    #[rstest]
    fn test_per_record_table() {
        let tempdir = tempfile::tempdir().unwrap();
        let out = tempdir.path().join("na.csv");

        run_cli(&[
            "--begin-pattern",
            BEGIN,
            "--end-pattern",
            END,
            "--out",
            out.to_str().unwrap(),
        ])
        .unwrap();

        assert_eq!(
            std::fs::read_to_string(&out).unwrap(),
            "EPI,Date,Stalk_length\n\
             EPI_ISL_1001,2021-03-04,6\n\
             EPI_ISL_1002,2022-01-15,3\n\
             EPI_ISL_1003,,6\n\
             EPI_ISL_1004,2019-07-01,\n"
        );
    }

    #[rstest]
    fn test_config_file_with_flag_override() {
        let tempdir = tempfile::tempdir().unwrap();
        let out = tempdir.path().join("na.csv");
        let config = get_test_path("config/stalk.toml");

        // the file drops the first residue; the offset only comes from the command line
        run_cli(&[
            "--config",
            config.to_str().unwrap(),
            "--end-offset",
            "-1",
            "--out",
            out.to_str().unwrap(),
        ])
        .unwrap();

        assert_eq!(
            lengths(&out),
            vec![
                row("EPI_ISL_1001", Some(4)),
                row("EPI_ISL_1002", Some(1)),
                row("EPI_ISL_1003", Some(4)),
                row("EPI_ISL_1004", None),
            ]
        );
    }

    #[rstest]
    fn test_reference_mode_drop_reference() {
        let tempdir = tempfile::tempdir().unwrap();
        let out = tempdir.path().join("na.csv");

        run_cli(&[
            "--begin-pattern",
            BEGIN,
            "--end-pattern",
            END,
            "--mode",
            "reference",
            "--drop-reference",
            "--out",
            out.to_str().unwrap(),
        ])
        .unwrap();

        assert_eq!(
            lengths(&out),
            vec![
                row("EPI_ISL_1002", Some(3)),
                row("EPI_ISL_1003", Some(3)),
                row("EPI_ISL_1004", Some(6)),
            ]
        );
    }

    #[rstest]
    fn test_date_window_and_audit() {
        let tempdir = tempfile::tempdir().unwrap();
        let out = tempdir.path().join("na.csv");
        let audit = tempdir.path().join("na.json");

        run_cli(&[
            "--begin-pattern",
            BEGIN,
            "--end-pattern",
            END,
            "--min-date",
            "2021-01-01",
            "--out",
            out.to_str().unwrap(),
            "--audit",
            audit.to_str().unwrap(),
        ])
        .unwrap();

        assert_eq!(
            lengths(&out),
            vec![
                row("EPI_ISL_1001", Some(6)),
                row("EPI_ISL_1002", Some(3)),
                row("EPI_ISL_1003", Some(6)),
            ]
        );

        let audit: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&audit).unwrap()).unwrap();
        assert_eq!(audit["command"], "na");
        assert_eq!(audit["parameters"]["begin"], BEGIN);
        assert_eq!(audit["parameters"]["mode"], "per-record");
        assert_eq!(audit["summary"]["removed_by_date"], 1);
        assert_eq!(audit["summary"]["measured"], 3);
        assert_eq!(audit["records"][0]["status"], "measured");
        assert_eq!(audit["records"][0]["length"], 6);
        assert_eq!(audit["records"][0]["span"]["start"], 9);
    }

    #[rstest]
    fn test_unmeasurable_is_reported() {
        let tempdir = tempfile::tempdir().unwrap();
        let out = tempdir.path().join("na.csv");
        let audit = tempdir.path().join("na.json");

        run_cli(&[
            "--begin-pattern",
            BEGIN,
            "--end-pattern",
            END,
            "--out",
            out.to_str().unwrap(),
            "--audit",
            audit.to_str().unwrap(),
        ])
        .unwrap();

        let audit: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&audit).unwrap()).unwrap();
        assert_eq!(audit["summary"]["unmeasurable"], 1);
        assert_eq!(audit["records"][3]["identifier"], "EPI_ISL_1004");
        assert_eq!(audit["records"][3]["status"], "unmeasurable");
        assert_eq!(audit["records"][3]["reason"], "begin_not_found");
    }

    #[rstest]
    #[case(&["--begin-pattern", BEGIN])]
    #[case(&["--begin-pattern", "", "--end-pattern", END])]
    #[case(&["--begin-pattern", "G-?[NI", "--end-pattern", END])]
    #[case(&["--begin-pattern", BEGIN, "--end-pattern", END, "--drop-reference"])]
    #[case(&["--begin-pattern", BEGIN, "--end-pattern", END, "--min-date", "2022-01-01", "--max-date", "2021-01-01"])]
    fn test_configuration_errors(#[case] args: &[&str]) {
        let tempdir = tempfile::tempdir().unwrap();
        let out = tempdir.path().join("na.csv");

        let mut args = args.to_vec();
        args.extend_from_slice(&["--out", out.to_str().unwrap()]);

        assert!(run_cli(&args).is_err());
        assert!(!out.exists());
    }

    #[rstest]
    fn test_reference_options() {
        let reference = "ref.fasta".to_string();
        assert!(check_reference_options(StalkMode::Reference, Some(&reference), false).is_ok());
        assert!(check_reference_options(StalkMode::Reference, None, true).is_ok());
        assert!(check_reference_options(StalkMode::PerRecord, Some(&reference), false).is_err());
        assert!(check_reference_options(StalkMode::Reference, Some(&reference), true).is_err());
    }
}
