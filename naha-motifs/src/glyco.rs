//! N-linked glycosylation motif scanning.
//!
//! The sequon is N-X-[S/T] with X anything but proline. Gaps are removed before
//! scanning, so motif positions are in ungapped (protein) coordinates.
use serde::Serialize;

use naha_core::utils::strip_gaps;
use naha_core::{GlycosylationCount, SequenceRecord};

use crate::pattern::{GapAwarePattern, OverlapPolicy, PatternElement, ResidueMatcher};

pub const GLYCOSYLATION_MOTIF: &str = "N[^P][ST]";

fn glycosylation_motif() -> GapAwarePattern {
    let element = |matcher| PatternElement {
        matcher,
        gaps_before: false,
    };
    GapAwarePattern::from_elements(
        GLYCOSYLATION_MOTIF,
        vec![
            element(ResidueMatcher::Literal(b'N')),
            element(ResidueMatcher::Class {
                residues: vec![b'P'],
                negated: true,
            }),
            element(ResidueMatcher::Class {
                residues: vec![b'S', b'T'],
                negated: false,
            }),
        ],
    )
}

#[derive(Debug, Clone)]
pub struct MotifScanner {
    motif: GapAwarePattern,
    policy: OverlapPolicy,
}

impl MotifScanner {
    pub fn new(policy: OverlapPolicy) -> Self {
        MotifScanner {
            motif: glycosylation_motif(),
            policy,
        }
    }

    pub fn policy(&self) -> OverlapPolicy {
        self.policy
    }

    ///
    /// 0-based positions of every motif's asparagine in the ungapped sequence.
    ///
    pub fn find_sites(&self, sequence: &[u8]) -> Vec<usize> {
        let ungapped = strip_gaps(sequence);
        self.motif
            .find_iter(&ungapped, self.policy)
            .map(|span| span.start)
            .collect()
    }

    pub fn count(&self, sequence: &[u8]) -> u32 {
        let ungapped = strip_gaps(sequence);
        self.motif.count(&ungapped, self.policy) as u32
    }

    pub fn scan(&self, record: &SequenceRecord) -> GlycosylationCount {
        GlycosylationCount {
            identifier: record.identifier().to_string(),
            collection_date: record.collection_date(),
            motif_count: self.count(record.sequence()),
        }
    }

    ///
    /// Scan every record, keeping input order.
    ///
    pub fn scan_all<'a, I>(&self, records: I) -> MotifBatch
    where
        I: IntoIterator<Item = &'a SequenceRecord>,
    {
        let mut batch = MotifBatch::default();
        for record in records {
            let sites = self.find_sites(record.sequence());
            batch.counts.push(GlycosylationCount {
                identifier: record.identifier().to_string(),
                collection_date: record.collection_date(),
                motif_count: sites.len() as u32,
            });
            batch.sites.push(sites);
        }
        batch
    }
}

impl Default for MotifScanner {
    fn default() -> Self {
        MotifScanner::new(OverlapPolicy::default())
    }
}

/// Counts and site positions of a scan run, in input order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MotifBatch {
    pub counts: Vec<GlycosylationCount>,
    pub sites: Vec<Vec<usize>>,
}

impl MotifBatch {
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Records in which no motif was found.
    pub fn without_motifs(&self) -> usize {
        self.counts.iter().filter(|c| c.motif_count == 0).count()
    }

    pub fn total_motifs(&self) -> u64 {
        self.counts.iter().map(|c| c.motif_count as u64).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn scanner() -> MotifScanner {
        MotifScanner::default()
    }

    #[rstest]
    fn test_builtin_motif_matches_grammar() {
        assert_eq!(
            glycosylation_motif(),
            GapAwarePattern::parse(GLYCOSYLATION_MOTIF).unwrap()
        );
    }

    #[rstest]
    #[case(b"N-AT", 1)]
    #[case(b"NPTS", 0)]
    #[case(b"NAS", 1)]
    #[case(b"nas", 1)]
    #[case(b"NA", 0)]
    #[case(b"AAAAAAAAA", 0)]
    #[case(b"", 0)]
    #[case(b"N--P--T", 0)]
    #[case(b"MNGTLNLSNVTQ", 3)]
    fn test_count(scanner: MotifScanner, #[case] sequence: &[u8], #[case] expected: u32) {
        assert_eq!(scanner.count(sequence), expected);
    }

    #[rstest]
    #[case(OverlapPolicy::Overlapping, 2)]
    #[case(OverlapPolicy::NonOverlapping, 1)]
    fn test_overlapping_sequons(#[case] policy: OverlapPolicy, #[case] expected: u32) {
        // NNST: N-N-S at 0 and N-S-T at 1 share two residues
        assert_eq!(MotifScanner::new(policy).count(b"NNST"), expected);
    }

    #[rstest]
    fn test_count_is_stable(scanner: MotifScanner) {
        let sequence = b"MEKIVLLLAIVSLVKSDQICIGYHANNSTEQVDTIMEKNVTVTHAQDILEK";
        assert_eq!(scanner.count(sequence), scanner.count(sequence));
    }

    #[rstest]
    fn test_gap_insertion_does_not_change_count(scanner: MotifScanner) {
        let plain = b"HANNSTEQVDTIMEKNVTV";
        let gapped = b"HA-N-NS--TEQ-VDTIMEK--N-VTV-";
        assert_eq!(scanner.count(plain), 3);
        assert_eq!(scanner.count(gapped), scanner.count(plain));
    }

    #[rstest]
    fn test_sites_are_ungapped_positions(scanner: MotifScanner) {
        assert_eq!(scanner.find_sites(b"--AN-AT-NGS"), vec![1, 4]);
    }

    #[rstest]
    fn test_scan_all(scanner: MotifScanner) {
        let records = vec![
            SequenceRecord::new("EPI_ISL_1", None, "NAT-NGS"),
            SequenceRecord::new("EPI_ISL_2", None, "MKAAQ"),
        ];
        let batch = scanner.scan_all(&records);

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.counts[0].motif_count, 2);
        assert_eq!(batch.sites[0], vec![0, 3]);
        assert_eq!(batch.without_motifs(), 1);
        assert_eq!(batch.total_motifs(), 2);
        assert_eq!(scanner.scan(&records[1]).motif_count, 0);
    }
}
