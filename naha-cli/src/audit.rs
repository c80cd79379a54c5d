use std::fs::{File, create_dir_all};
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::info;

use crate::consts::{PKG_NAME, VERSION};

///
/// JSON account of one run: what was asked for, what came out and what happened to
/// every record. Entries are only ever appended; the document is written once.
///
#[derive(Debug, Serialize)]
pub struct AuditLog {
    tool: &'static str,
    version: &'static str,
    command: String,
    started: String,
    parameters: Value,
    summary: Map<String, Value>,
    records: Vec<Value>,
}

impl AuditLog {
    pub fn new<P: Serialize>(command: &str, parameters: &P) -> Result<Self> {
        Ok(AuditLog {
            tool: PKG_NAME,
            version: VERSION,
            command: command.to_string(),
            started: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            parameters: serde_json::to_value(parameters)
                .context("Failed to serialize run parameters")?,
            summary: Map::new(),
            records: Vec::new(),
        })
    }

    pub fn summarize<V: Into<Value>>(&mut self, key: &str, value: V) {
        self.summary.insert(key.to_string(), value.into());
    }

    pub fn record<T: Serialize>(&mut self, entry: &T) -> Result<()> {
        self.records
            .push(serde_json::to_value(entry).context("Failed to serialize audit record")?);
        Ok(())
    }

    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                create_dir_all(parent)?;
            }
        }
        let file = File::create(path)
            .with_context(|| format!("Failed to create audit file {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)
            .with_context(|| format!("Failed to write audit file {}", path.display()))?;
        writer
            .flush()
            .with_context(|| format!("Failed to write audit file {}", path.display()))?;
        info!(path = %path.display(), records = self.records.len(), "Audit log written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;
    use serde_json::json;

    #[rstest]
    fn test_audit_document() {
        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("logs/run.json");

        let mut audit = AuditLog::new("ha", &json!({"overlap_policy": "overlapping"})).unwrap();
        audit.summarize("records", 2);
        audit.record(&json!({"identifier": "EPI_ISL_1", "count": 3})).unwrap();
        audit.record(&json!({"identifier": "EPI_ISL_2", "count": 0})).unwrap();
        audit.write(&path).unwrap();

        let written: Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["tool"], "naha");
        assert_eq!(written["command"], "ha");
        assert_eq!(written["parameters"]["overlap_policy"], "overlapping");
        assert_eq!(written["summary"]["records"], 2);
        assert_eq!(written["records"].as_array().unwrap().len(), 2);
        assert_eq!(written["records"][1]["identifier"], "EPI_ISL_2");
    }

    #[cfg(target_os = "linux")]
    #[rstest]
    fn test_failed_write_is_an_error() {
        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("run.json");
        std::os::unix::fs::symlink("/dev/full", &path).unwrap();

        let mut audit = AuditLog::new("na", &json!({})).unwrap();
        audit.record(&json!({"identifier": "EPI_ISL_1"})).unwrap();
        assert!(audit.write(&path).is_err());
    }
}
