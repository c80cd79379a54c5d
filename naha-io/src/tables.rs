use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use flate2::Compression;
use flate2::write::GzEncoder;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use naha_core::header::DATE_FORMAT;
use naha_core::utils::get_dynamic_reader;
use naha_core::{
    FormatError, GlycosylationCount, MergedRecord, StalkMeasurement, normalize_identifier,
};

use crate::error::{Result, TableError};

pub const IDENTIFIER_COLUMN: &str = "EPI";
pub const DATE_COLUMN: &str = "Date";
pub const STALK_LENGTH_COLUMN: &str = "Stalk_length";
pub const MOTIF_COUNT_COLUMN: &str = "GLS_count";

pub const STALK_TABLE_COLUMNS: [&str; 3] = [IDENTIFIER_COLUMN, DATE_COLUMN, STALK_LENGTH_COLUMN];
pub const MOTIF_TABLE_COLUMNS: [&str; 3] = [IDENTIFIER_COLUMN, DATE_COLUMN, MOTIF_COUNT_COLUMN];
pub const MERGED_TABLE_COLUMNS: [&str; 4] = [
    IDENTIFIER_COLUMN,
    DATE_COLUMN,
    STALK_LENGTH_COLUMN,
    MOTIF_COUNT_COLUMN,
];
/// Read by the bubble plot; keep in sync with it.
pub const FREQUENCY_TABLE_COLUMNS: [&str; 4] = ["#GLS", "NA", "Stalk_length", "Frequency"];

///
/// Read a `Date` cell. An empty cell, or one that is not a real `YYYY-MM-DD` date, is a
/// missing date rather than an error.
///
fn lenient_date<'de, D>(deserializer: D) -> std::result::Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw.as_deref().map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(None);
    };
    match NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        Ok(date) => Ok(Some(date)),
        Err(_) => {
            warn!(value = %raw, "Unreadable date in table; treated as missing");
            Ok(None)
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StalkRow {
    #[serde(rename = "EPI")]
    pub identifier: String,
    #[serde(rename = "Date", default, deserialize_with = "lenient_date")]
    pub date: Option<NaiveDate>,
    #[serde(rename = "Stalk_length")]
    pub stalk_length: Option<u32>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MotifRow {
    #[serde(rename = "EPI")]
    pub identifier: String,
    #[serde(rename = "Date", default, deserialize_with = "lenient_date")]
    pub date: Option<NaiveDate>,
    #[serde(rename = "GLS_count")]
    pub motif_count: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MergedRow {
    #[serde(rename = "EPI")]
    pub identifier: String,
    #[serde(rename = "Date")]
    pub date: Option<NaiveDate>,
    #[serde(rename = "Stalk_length")]
    pub stalk_length: Option<u32>,
    #[serde(rename = "GLS_count")]
    pub motif_count: Option<u32>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FrequencyRow {
    #[serde(rename = "#GLS")]
    pub motif_count: u32,
    #[serde(rename = "NA")]
    pub group: String,
    #[serde(rename = "Stalk_length")]
    pub stalk_length: u32,
    #[serde(rename = "Frequency")]
    pub frequency: u64,
}

impl From<&StalkMeasurement> for StalkRow {
    fn from(m: &StalkMeasurement) -> Self {
        StalkRow {
            identifier: m.identifier.clone(),
            date: m.collection_date,
            stalk_length: m.stalk_length,
        }
    }
}

impl From<StalkRow> for StalkMeasurement {
    fn from(row: StalkRow) -> Self {
        StalkMeasurement {
            identifier: normalize_identifier(&row.identifier),
            collection_date: row.date,
            stalk_length: row.stalk_length,
        }
    }
}

impl From<&GlycosylationCount> for MotifRow {
    fn from(c: &GlycosylationCount) -> Self {
        MotifRow {
            identifier: c.identifier.clone(),
            date: c.collection_date,
            motif_count: c.motif_count,
        }
    }
}

impl From<MotifRow> for GlycosylationCount {
    fn from(row: MotifRow) -> Self {
        GlycosylationCount {
            identifier: normalize_identifier(&row.identifier),
            collection_date: row.date,
            motif_count: row.motif_count,
        }
    }
}

impl From<&MergedRecord> for MergedRow {
    fn from(r: &MergedRecord) -> Self {
        MergedRow {
            identifier: r.identifier.clone(),
            date: r.collection_date,
            stalk_length: r.stalk_length,
            motif_count: r.motif_count,
        }
    }
}

pub trait TableWrite {
    ///
    /// Write data to disk as a CSV table with a header row. Paths ending in `.gz` are
    /// gzip compressed.
    ///
    /// # Arguments
    /// - path: the path to the file to dump to
    ///
    /// # Returns
    /// The number of data rows written.
    fn write_table<T: AsRef<Path>>(&self, path: T) -> Result<usize>;
}

impl TableWrite for [StalkMeasurement] {
    fn write_table<T: AsRef<Path>>(&self, path: T) -> Result<usize> {
        write_rows(path, &STALK_TABLE_COLUMNS, self.iter().map(StalkRow::from))
    }
}

impl TableWrite for [GlycosylationCount] {
    fn write_table<T: AsRef<Path>>(&self, path: T) -> Result<usize> {
        write_rows(path, &MOTIF_TABLE_COLUMNS, self.iter().map(MotifRow::from))
    }
}

impl TableWrite for [MergedRecord] {
    fn write_table<T: AsRef<Path>>(&self, path: T) -> Result<usize> {
        write_rows(path, &MERGED_TABLE_COLUMNS, self.iter().map(MergedRow::from))
    }
}

fn is_gzipped(path: &Path) -> bool {
    path.extension() == Some(OsStr::new("gz"))
}

fn serialize_rows<W, S, I>(inner: W, columns: &[&str], rows: I) -> Result<(W, usize)>
where
    W: Write,
    S: Serialize,
    I: IntoIterator<Item = S>,
{
    // the header is written by hand so that empty tables still carry their columns
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(inner);
    writer.write_record(columns)?;

    let mut written = 0;
    for row in rows {
        writer.serialize(row)?;
        written += 1;
    }
    writer.flush()?;

    let inner = writer
        .into_inner()
        .map_err(|e| TableError::Io(e.into_error()))?;
    Ok((inner, written))
}

///
/// Serialize `rows` under the given header to a CSV file.
///
pub fn write_rows<P, S, I>(path: P, columns: &[&str], rows: I) -> Result<usize>
where
    P: AsRef<Path>,
    S: Serialize,
    I: IntoIterator<Item = S>,
{
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = File::create(path)?;

    if is_gzipped(path) {
        let encoder = GzEncoder::new(BufWriter::new(file), Compression::best());
        let (encoder, written) = serialize_rows(encoder, columns, rows)?;
        encoder.finish()?;
        Ok(written)
    } else {
        let (mut writer, written) = serialize_rows(BufWriter::new(file), columns, rows)?;
        writer.flush()?;
        Ok(written)
    }
}

///
/// Read a CSV table, checking that the `required` columns are present. Extra columns
/// are ignored.
///
pub fn read_rows<R, P>(path: P, required: &[&str]) -> Result<Vec<R>>
where
    R: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let reader = get_dynamic_reader(path)?;
    let mut csv_reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let missing: Vec<String> = required
        .iter()
        .filter(|column| !headers.iter().any(|h| h == **column))
        .map(|column| column.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(FormatError::MissingColumns {
            path: path.display().to_string(),
            columns: missing,
        }
        .into());
    }

    let mut rows = Vec::new();
    for (index, record) in csv_reader.records().enumerate() {
        let record = record?;
        let row = record
            .deserialize(Some(&headers))
            .map_err(|e| invalid_field(e, &headers, &record, index + 1))?;
        rows.push(row);
    }
    Ok(rows)
}

/// Point at the offending cell when a value doesn't fit its column.
fn invalid_field(
    error: csv::Error,
    headers: &StringRecord,
    record: &StringRecord,
    row: usize,
) -> TableError {
    let field = match error.kind() {
        csv::ErrorKind::Deserialize { err, .. } => err.field(),
        _ => None,
    };
    match field {
        Some(i) => FormatError::InvalidField {
            row,
            column: headers.get(i as usize).unwrap_or_default().to_string(),
            value: record.get(i as usize).unwrap_or_default().to_string(),
        }
        .into(),
        None => error.into(),
    }
}

///
/// Read an NA table. Only the identifier and stalk length columns are required.
///
pub fn read_stalk_table<P: AsRef<Path>>(path: P) -> Result<Vec<StalkMeasurement>> {
    let rows: Vec<StalkRow> = read_rows(path, &[IDENTIFIER_COLUMN, STALK_LENGTH_COLUMN])?;
    Ok(rows.into_iter().map(StalkMeasurement::from).collect())
}

///
/// Read an HA table. Only the identifier and motif count columns are required.
///
pub fn read_motif_table<P: AsRef<Path>>(path: P) -> Result<Vec<GlycosylationCount>> {
    let rows: Vec<MotifRow> = read_rows(path, &[IDENTIFIER_COLUMN, MOTIF_COUNT_COLUMN])?;
    Ok(rows.into_iter().map(GlycosylationCount::from).collect())
}
