use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, arg};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use naha_core::header::DEFAULT_IDENTIFIER_PATTERN;
use naha_core::{DateWindow, HeaderParser, SequenceRecord};
use naha_io::FastaReader;

///
/// Arguments shared by the subcommands that read an aligned FASTA file.
///
pub fn fasta_input_args() -> Vec<Arg> {
    vec![
        arg!(--fasta <FASTA>)
            .required(true)
            .help("Path to an aligned FASTA file (.gz accepted)"),
        Arg::new("id-pattern")
            .long("id-pattern")
            .default_value(DEFAULT_IDENTIFIER_PATTERN)
            .help("Regular expression locating the isolate identifier in each header"),
        Arg::new("skip-unidentified")
            .long("skip-unidentified")
            .action(ArgAction::SetTrue)
            .help("Drop records whose header has no identifier instead of failing"),
        Arg::new("min-date")
            .long("min-date")
            .help("Keep records collected on or after this date (YYYY-MM-DD)"),
        Arg::new("max-date")
            .long("max-date")
            .help("Keep records collected on or before this date (YYYY-MM-DD)"),
    ]
}

///
/// The header parser and date window described by [`fasta_input_args`].
///
pub fn header_parser_and_window(matches: &ArgMatches) -> Result<(HeaderParser, DateWindow)> {
    let id_pattern = matches
        .get_one::<String>("id-pattern")
        .expect("id-pattern has a default");
    let parser = HeaderParser::with_identifier_pattern(id_pattern)?;

    let window = DateWindow::parse(
        matches.get_one::<String>("min-date").map(String::as_str),
        matches.get_one::<String>("max-date").map(String::as_str),
    )?;

    Ok((parser, window))
}

#[derive(Debug)]
pub struct LoadedRecords {
    pub records: Vec<SequenceRecord>,
    /// Headers without an identifier that were dropped.
    pub unidentified: usize,
}

///
/// Read every record of `path`, reporting progress on a spinner.
///
pub fn load_records(
    path: &Path,
    parser: HeaderParser,
    skip_unidentified: bool,
) -> Result<LoadedRecords> {
    let mut reader = FastaReader::from_path(path, parser)
        .with_context(|| format!("Failed to open {}", path.display()))?
        .skip_unidentified(skip_unidentified);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] {pos} records {msg}",
    )?);
    spinner.set_message(path.display().to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));

    let records = collect_with_progress(reader.by_ref(), &spinner)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    let unidentified = reader.skipped();
    if unidentified > 0 {
        warn!(
            skipped = unidentified,
            "Records without an identifier were dropped"
        );
    }
    info!(path = %path.display(), records = records.len(), "Loaded records");

    Ok(LoadedRecords {
        records,
        unidentified,
    })
}

///
/// Collect `items` until the first error, ticking `spinner` once per item. The spinner
/// is cleared whichever way the iteration ends.
///
fn collect_with_progress<T, E>(
    items: impl Iterator<Item = std::result::Result<T, E>>,
    spinner: &ProgressBar,
) -> std::result::Result<Vec<T>, E> {
    let collected = items
        .inspect(|item| {
            if item.is_ok() {
                spinner.inc(1);
            }
        })
        .collect();
    spinner.finish_and_clear();
    collected
}

///
/// Keep the records collected inside `window`. Returns how many were removed.
///
pub fn filter_by_date(records: &mut Vec<SequenceRecord>, window: &DateWindow) -> usize {
    if window.is_unbounded() {
        return 0;
    }
    let before = records.len();
    records.retain(|r| window.contains(r.collection_date()));
    let removed = before - records.len();
    info!(
        before,
        after = records.len(),
        removed,
        "Applied collection date window"
    );
    removed
}
