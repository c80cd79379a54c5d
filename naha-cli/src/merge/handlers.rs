use anyhow::{Context, Result};
use clap::ArgMatches;
use serde::Serialize;
use tracing::{debug, info, warn};

use naha_io::{TableWrite, read_motif_table, read_stalk_table};
use naha_merge::{FrequencyTable, JoinPolicy, merge_tables};

use crate::audit::AuditLog;
use crate::merge::cli::MERGE_CMD;

#[derive(Serialize)]
struct MergeParameters<'a> {
    na: &'a str,
    ha: &'a str,
    join: JoinPolicy,
    na_group: &'a str,
    out: &'a str,
    counts: Option<&'a str>,
}

pub fn run_merge(matches: &ArgMatches) -> Result<()> {
    let na = matches.get_one::<String>("na").expect("--na is required");
    let ha = matches.get_one::<String>("ha").expect("--ha is required");
    let out = matches.get_one::<String>("out").expect("--out is required");
    let counts_path = matches.get_one::<String>("counts");
    let na_group = matches
        .get_one::<String>("na-group")
        .expect("na-group has a default");
    let join: JoinPolicy = matches
        .get_one::<String>("join")
        .expect("join has a default")
        .parse()?;

    let stalks = read_stalk_table(na).with_context(|| format!("Failed to read NA table {}", na))?;
    let motifs = read_motif_table(ha).with_context(|| format!("Failed to read HA table {}", ha))?;
    info!(na = stalks.len(), ha = motifs.len(), "Loaded tables");

    let outcome = merge_tables(&stalks, &motifs, join)?;
    let report = &outcome.report;

    if report.unmatched_stalk > 0 || report.unmatched_motif > 0 {
        warn!(
            na_only = report.unmatched_stalk,
            ha_only = report.unmatched_motif,
            join = ?join,
            "Isolates missing from one of the tables"
        );
    }
    for identifier in &outcome.dropped_stalk {
        debug!(identifier = %identifier, "No HA record");
    }
    for identifier in &outcome.dropped_motif {
        debug!(identifier = %identifier, "No NA record");
    }
    if report.unmeasured_stalk > 0 {
        warn!(
            count = report.unmeasured_stalk,
            "Matched isolates without a stalk length"
        );
    }

    let written = outcome
        .records
        .write_table(out)
        .with_context(|| format!("Failed to write merged table {}", out))?;
    info!(path = %out, rows = written, "Merged table written");

    let frequencies = FrequencyTable::from_records(&outcome.records, na_group);
    if let Some(counts_path) = counts_path {
        let cells = frequencies
            .write_table(counts_path)
            .with_context(|| format!("Failed to write frequency table {}", counts_path))?;
        info!(
            path = %counts_path,
            cells,
            isolates = frequencies.total(),
            excluded = frequencies.excluded(),
            "Frequency table written"
        );
    }

    if let Some(audit_path) = matches.get_one::<String>("audit") {
        let parameters = MergeParameters {
            na,
            ha,
            join,
            na_group,
            out,
            counts: counts_path.map(String::as_str),
        };
        let mut audit = AuditLog::new(MERGE_CMD, &parameters)?;
        audit.summarize("report", serde_json::to_value(report)?);
        audit.summarize("na_only", outcome.dropped_stalk.clone());
        audit.summarize("ha_only", outcome.dropped_motif.clone());
        audit.summarize("frequency_cells", frequencies.len());
        audit.summarize("frequency_excluded", frequencies.excluded());
        for record in &outcome.records {
            audit.record(record)?;
        }
        audit.write(audit_path)?;
    }

    Ok(())
}
