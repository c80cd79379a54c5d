use std::path::Path;

use anyhow::{Context, Result};
use clap::ArgMatches;
use serde::Serialize;
use tracing::info;

use naha_io::TableWrite;
use naha_motifs::{GLYCOSYLATION_MOTIF, MotifScanner, OverlapPolicy};

use crate::audit::AuditLog;
use crate::ha::cli::HA_CMD;
use crate::input::{filter_by_date, header_parser_and_window, load_records};

#[derive(Serialize)]
struct HaParameters<'a> {
    fasta: &'a str,
    motif: &'a str,
    overlap_policy: String,
    id_pattern: Option<&'a str>,
    skip_unidentified: bool,
    min_date: Option<&'a str>,
    max_date: Option<&'a str>,
    out: &'a str,
}

#[derive(Serialize)]
struct RecordSites<'a> {
    identifier: &'a str,
    motif_count: u32,
    /// 0-based positions of the motif asparagines in the ungapped sequence.
    sites: &'a [usize],
}

pub fn run_ha(matches: &ArgMatches) -> Result<()> {
    let fasta = matches
        .get_one::<String>("fasta")
        .expect("--fasta is required");
    let out = matches.get_one::<String>("out").expect("--out is required");
    let skip_unidentified = matches.get_flag("skip-unidentified");
    let policy: OverlapPolicy = matches
        .get_one::<String>("overlap-policy")
        .expect("overlap-policy has a default")
        .parse()?;

    let (parser, window) = header_parser_and_window(matches)?;

    let mut loaded = load_records(Path::new(fasta), parser, skip_unidentified)?;
    let removed_by_date = filter_by_date(&mut loaded.records, &window);

    let scanner = MotifScanner::new(policy);
    let batch = scanner.scan_all(&loaded.records);

    let written = batch
        .counts
        .write_table(out)
        .with_context(|| format!("Failed to write HA table {}", out))?;
    info!(
        path = %out,
        rows = written,
        motifs = batch.total_motifs(),
        without_motifs = batch.without_motifs(),
        policy = %policy,
        "HA table written"
    );

    if let Some(audit_path) = matches.get_one::<String>("audit") {
        let parameters = HaParameters {
            fasta,
            motif: GLYCOSYLATION_MOTIF,
            overlap_policy: policy.to_string(),
            id_pattern: matches.get_one::<String>("id-pattern").map(String::as_str),
            skip_unidentified,
            min_date: matches.get_one::<String>("min-date").map(String::as_str),
            max_date: matches.get_one::<String>("max-date").map(String::as_str),
            out,
        };
        let mut audit = AuditLog::new(HA_CMD, &parameters)?;
        audit.summarize("unidentified", loaded.unidentified);
        audit.summarize("removed_by_date", removed_by_date);
        audit.summarize("records", batch.len());
        audit.summarize("total_motifs", batch.total_motifs());
        audit.summarize("without_motifs", batch.without_motifs());
        for (count, sites) in batch.counts.iter().zip(&batch.sites) {
            audit.record(&RecordSites {
                identifier: &count.identifier,
                motif_count: count.motif_count,
                sites,
            })?;
        }
        audit.write(audit_path)?;
    }

    Ok(())
}
