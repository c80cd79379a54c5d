use std::collections::BTreeMap;
use std::path::Path;

use naha_core::MergedRecord;
use naha_io::{FREQUENCY_TABLE_COLUMNS, FrequencyRow, TableWrite, write_rows};

///
/// Cross-tabulation of (stalk length, motif count) over merged isolates, for one NA
/// subtype or group. Cells iterate in (stalk length, motif count) order.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    group: String,
    cells: BTreeMap<(u32, u32), u64>,
    excluded: usize,
}

impl FrequencyTable {
    pub fn new(group: &str) -> Self {
        FrequencyTable {
            group: group.to_string(),
            cells: BTreeMap::new(),
            excluded: 0,
        }
    }

    ///
    /// Tabulate `records`. Records lacking a stalk length or a motif count are left out
    /// and counted in [`FrequencyTable::excluded`].
    ///
    pub fn from_records<'a, I>(records: I, group: &str) -> Self
    where
        I: IntoIterator<Item = &'a MergedRecord>,
    {
        let mut table = FrequencyTable::new(group);
        for record in records {
            table.add(record);
        }
        table
    }

    pub fn add(&mut self, record: &MergedRecord) {
        match record.cell() {
            Some(cell) => *self.cells.entry(cell).or_insert(0) += 1,
            None => self.excluded += 1,
        }
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn get(&self, stalk_length: u32, motif_count: u32) -> u64 {
        self.cells
            .get(&(stalk_length, motif_count))
            .copied()
            .unwrap_or(0)
    }

    /// Number of tabulated isolates.
    pub fn total(&self) -> u64 {
        self.cells.values().sum()
    }

    pub fn excluded(&self) -> usize {
        self.excluded
    }

    /// Number of non-empty cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ((u32, u32), u64)> + '_ {
        self.cells.iter().map(|(cell, count)| (*cell, *count))
    }

    pub fn rows(&self) -> Vec<FrequencyRow> {
        self.iter()
            .map(|((stalk_length, motif_count), frequency)| FrequencyRow {
                motif_count,
                group: self.group.clone(),
                stalk_length,
                frequency,
            })
            .collect()
    }
}

impl TableWrite for FrequencyTable {
    fn write_table<T: AsRef<Path>>(&self, path: T) -> naha_io::Result<usize> {
        write_rows(path, &FREQUENCY_TABLE_COLUMNS, self.rows())
    }
}
