use chrono::NaiveDate;
use std::fmt::{self, Display};

use crate::utils::{GAP, count_residues, strip_gaps};

///
/// One entry of an aligned sequence file: the accession identifier and collection
/// date pulled from the header, plus the residues exactly as they appear in the
/// file (gap characters included).
///
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SequenceRecord {
    identifier: String,
    collection_date: Option<NaiveDate>,
    sequence: Vec<u8>,
}

impl SequenceRecord {
    pub fn new(
        identifier: impl Into<String>,
        collection_date: Option<NaiveDate>,
        sequence: impl Into<Vec<u8>>,
    ) -> Self {
        SequenceRecord {
            identifier: identifier.into(),
            collection_date,
            sequence: sequence.into(),
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn collection_date(&self) -> Option<NaiveDate> {
        self.collection_date
    }

    ///
    /// Raw residues in alignment coordinates, gaps included.
    ///
    pub fn sequence(&self) -> &[u8] {
        &self.sequence
    }

    ///
    /// Length of the aligned sequence, gaps included.
    ///
    pub fn aligned_len(&self) -> usize {
        self.sequence.len()
    }

    ///
    /// Number of residues, gaps excluded.
    ///
    pub fn residue_count(&self) -> usize {
        count_residues(&self.sequence)
    }

    pub fn has_gaps(&self) -> bool {
        self.sequence.contains(&GAP)
    }

    ///
    /// Copy of the sequence with every gap character removed.
    ///
    pub fn ungapped(&self) -> Vec<u8> {
        strip_gaps(&self.sequence)
    }
}

impl Display for SequenceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.collection_date {
            Some(date) => write!(
                f,
                "{}|{} ({} aa)",
                self.identifier,
                date,
                self.residue_count()
            ),
            None => write!(f, "{} ({} aa)", self.identifier, self.residue_count()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn gapped_record() -> SequenceRecord {
        SequenceRecord::new(
            "EPI_ISL_100",
            NaiveDate::from_ymd_opt(2021, 3, 4),
            "MN--PNQ-KI",
        )
    }

    #[rstest]
    fn test_lengths(gapped_record: SequenceRecord) {
        assert_eq!(gapped_record.aligned_len(), 10);
        assert_eq!(gapped_record.residue_count(), 7);
        assert!(gapped_record.has_gaps());
    }

    #[rstest]
    fn test_ungapped(gapped_record: SequenceRecord) {
        assert_eq!(gapped_record.ungapped(), b"MNPNQKI".to_vec());
        // the raw sequence is left untouched
        assert_eq!(gapped_record.sequence(), b"MN--PNQ-KI");
    }

    #[rstest]
    fn test_display(gapped_record: SequenceRecord) {
        assert_eq!(gapped_record.to_string(), "EPI_ISL_100|2021-03-04 (7 aa)");

        let undated = SequenceRecord::new("EPI_ISL_7", None, "AC-");
        assert_eq!(undated.to_string(), "EPI_ISL_7 (2 aa)");
    }
}
