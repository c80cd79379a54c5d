use std::fmt::{self, Display};
use std::str::FromStr;

use fxhash::{FxHashMap, FxHashSet};
use serde::Serialize;
use tracing::{info, warn};

use naha_core::{ConfigError, GlycosylationCount, MergeError, MergedRecord, StalkMeasurement};

/// Anything carrying an isolate identifier that tables can be joined on.
pub trait Keyed {
    fn key(&self) -> &str;
}

impl Keyed for StalkMeasurement {
    fn key(&self) -> &str {
        &self.identifier
    }
}

impl Keyed for GlycosylationCount {
    fn key(&self) -> &str {
        &self.identifier
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinPolicy {
    /// Keep only isolates present in both tables.
    #[default]
    Inner,
    /// Keep every isolate; the missing side is left empty.
    Outer,
}

impl FromStr for JoinPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "inner" => Ok(JoinPolicy::Inner),
            "outer" => Ok(JoinPolicy::Outer),
            _ => Err(ConfigError::IncompatibleOptions(format!(
                "unknown join policy '{}', expected 'inner' or 'outer'",
                s
            ))),
        }
    }
}

///
/// Result of pairing two keyed collections.
///
/// Only the first record seen for an identifier takes part in the join; later records
/// with the same identifier are counted as duplicates. `pairs` follows the order of
/// `left`, `left_only` and `right_only` follow their own tables.
///
#[derive(Debug)]
pub struct Join<'a, L, R> {
    pub pairs: Vec<(&'a L, &'a R)>,
    pub left_only: Vec<&'a L>,
    pub right_only: Vec<&'a R>,
    pub left_duplicates: usize,
    pub right_duplicates: usize,
}

/// Keep the first record per key, counting the rest.
fn first_by_key<T: Keyed>(records: &[T]) -> (Vec<&T>, usize) {
    let mut seen: FxHashSet<&str> = FxHashSet::default();
    let mut unique = Vec::with_capacity(records.len());
    let mut duplicates = 0;
    for record in records {
        if seen.insert(record.key()) {
            unique.push(record);
        } else {
            duplicates += 1;
        }
    }
    (unique, duplicates)
}

///
/// Pair the records of two tables sharing an identifier.
///
pub fn join_by_identifier<'a, L: Keyed, R: Keyed>(
    left: &'a [L],
    right: &'a [R],
) -> Join<'a, L, R> {
    let (left, left_duplicates) = first_by_key(left);
    let (right, right_duplicates) = first_by_key(right);

    let right_index: FxHashMap<&str, &R> = right.iter().map(|r| (r.key(), *r)).collect();

    let mut pairs = Vec::new();
    let mut left_only = Vec::new();
    let mut matched: FxHashSet<&str> = FxHashSet::default();
    for l in left {
        match right_index.get(l.key()) {
            Some(r) => {
                matched.insert(l.key());
                pairs.push((l, *r));
            }
            None => left_only.push(l),
        }
    }

    let right_only = right
        .into_iter()
        .filter(|r| !matched.contains(r.key()))
        .collect();

    Join {
        pairs,
        left_only,
        right_only,
        left_duplicates,
        right_duplicates,
    }
}

///
/// Record counts of a merge, so that every dropped isolate is accounted for.
///
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    pub stalk_records: usize,
    pub motif_records: usize,
    pub matched: usize,
    /// NA isolates with no HA counterpart.
    pub unmatched_stalk: usize,
    /// HA isolates with no NA counterpart.
    pub unmatched_motif: usize,
    pub duplicate_stalk: usize,
    pub duplicate_motif: usize,
    /// Matched isolates whose stalk could not be measured.
    pub unmeasured_stalk: usize,
}

impl Display for MergeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} matched; dropped {} NA-only and {} HA-only isolates; {} NA and {} HA duplicates ignored",
            self.matched,
            self.unmatched_stalk,
            self.unmatched_motif,
            self.duplicate_stalk,
            self.duplicate_motif
        )
    }
}

#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub records: Vec<MergedRecord>,
    pub report: MergeReport,
    /// Identifiers of NA isolates with no HA counterpart, in NA table order.
    pub dropped_stalk: Vec<String>,
    /// Identifiers of HA isolates with no NA counterpart, in HA table order.
    pub dropped_motif: Vec<String>,
}

///
/// Join NA stalk lengths with HA motif counts on the isolate identifier.
///
/// Output follows the order of `stalks`; under [`JoinPolicy::Outer`] the HA-only
/// isolates are appended in the order of `motifs`. Fails only when no identifier is
/// shared at all.
///
pub fn merge_tables(
    stalks: &[StalkMeasurement],
    motifs: &[GlycosylationCount],
    policy: JoinPolicy,
) -> Result<MergeOutcome, MergeError> {
    let join = join_by_identifier(stalks, motifs);

    let report = MergeReport {
        stalk_records: stalks.len(),
        motif_records: motifs.len(),
        matched: join.pairs.len(),
        unmatched_stalk: join.left_only.len(),
        unmatched_motif: join.right_only.len(),
        duplicate_stalk: join.left_duplicates,
        duplicate_motif: join.right_duplicates,
        unmeasured_stalk: join
            .pairs
            .iter()
            .filter(|(stalk, _)| !stalk.is_measured())
            .count(),
    };

    if report.matched == 0 {
        return Err(MergeError::NoOverlap {
            stalk_records: stalks.len(),
            motif_records: motifs.len(),
        });
    }

    if report.duplicate_stalk > 0 || report.duplicate_motif > 0 {
        warn!(
            duplicate_stalk = report.duplicate_stalk,
            duplicate_motif = report.duplicate_motif,
            "Duplicate identifiers found; keeping the first record of each"
        );
    }
    info!("{}", report);

    let mut records: Vec<MergedRecord> = join
        .pairs
        .iter()
        .map(|(stalk, motif)| MergedRecord::from_pair(stalk, motif))
        .collect();

    if policy == JoinPolicy::Outer {
        records.extend(join.left_only.iter().map(|s| MergedRecord::from_stalk_only(s)));
        records.extend(join.right_only.iter().map(|m| MergedRecord::from_motifs_only(m)));
    }

    Ok(MergeOutcome {
        records,
        report,
        dropped_stalk: join.left_only.iter().map(|s| s.identifier.clone()).collect(),
        dropped_motif: join.right_only.iter().map(|m| m.identifier.clone()).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn stalk(id: &str, length: Option<u32>) -> StalkMeasurement {
        StalkMeasurement {
            identifier: id.to_string(),
            collection_date: None,
            stalk_length: length,
        }
    }

    fn motif(id: &str, count: u32) -> GlycosylationCount {
        GlycosylationCount {
            identifier: id.to_string(),
            collection_date: NaiveDate::from_ymd_opt(2022, 2, 2),
            motif_count: count,
        }
    }

    #[fixture]
    fn na_table() -> Vec<StalkMeasurement> {
        vec![stalk("EPI_ISL_1", Some(33)), stalk("EPI_ISL_2", Some(53))]
    }

    #[fixture]
    fn ha_table() -> Vec<GlycosylationCount> {
        vec![motif("EPI_ISL_1", 7), motif("EPI_ISL_3", 6)]
    }

    #[rstest]
    fn test_inner_merge(na_table: Vec<StalkMeasurement>, ha_table: Vec<GlycosylationCount>) {
        let outcome = merge_tables(&na_table, &ha_table, JoinPolicy::Inner).unwrap();

        assert_eq!(
            outcome.records,
            vec![MergedRecord {
                identifier: "EPI_ISL_1".to_string(),
                collection_date: NaiveDate::from_ymd_opt(2022, 2, 2),
                stalk_length: Some(33),
                motif_count: Some(7),
            }]
        );
        assert_eq!(outcome.report.matched, 1);
        assert_eq!(outcome.report.unmatched_stalk, 1);
        assert_eq!(outcome.report.unmatched_motif, 1);
        assert_eq!(outcome.dropped_stalk, vec!["EPI_ISL_2".to_string()]);
        assert_eq!(outcome.dropped_motif, vec!["EPI_ISL_3".to_string()]);
    }

    #[rstest]
    fn test_outer_merge(na_table: Vec<StalkMeasurement>, ha_table: Vec<GlycosylationCount>) {
        let outcome = merge_tables(&na_table, &ha_table, JoinPolicy::Outer).unwrap();

        let ids: Vec<&str> = outcome.records.iter().map(|r| r.identifier.as_str()).collect();
        assert_eq!(ids, vec!["EPI_ISL_1", "EPI_ISL_2", "EPI_ISL_3"]);
        assert_eq!(outcome.records[1].motif_count, None);
        assert_eq!(outcome.records[2].stalk_length, None);
        // dropped counts are reported the same way under both policies
        assert_eq!(outcome.report.unmatched_stalk, 1);
        assert_eq!(outcome.report.unmatched_motif, 1);
    }

    #[rstest]
    fn test_no_overlap_is_an_error(na_table: Vec<StalkMeasurement>) {
        let ha = vec![motif("EPI_ISL_9", 4)];
        assert_eq!(
            merge_tables(&na_table, &ha, JoinPolicy::Outer).unwrap_err(),
            MergeError::NoOverlap {
                stalk_records: 2,
                motif_records: 1
            }
        );
    }

    #[rstest]
    fn test_first_duplicate_wins() {
        let na = vec![
            stalk("EPI_ISL_1", Some(33)),
            stalk("EPI_ISL_1", Some(20)),
        ];
        let ha = vec![motif("EPI_ISL_1", 7), motif("EPI_ISL_1", 9)];
        let outcome = merge_tables(&na, &ha, JoinPolicy::Inner).unwrap();

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].cell(), Some((33, 7)));
        assert_eq!(outcome.report.duplicate_stalk, 1);
        assert_eq!(outcome.report.duplicate_motif, 1);
    }

    #[rstest]
    fn test_unmeasured_stalks_are_kept_and_counted() {
        let na = vec![stalk("EPI_ISL_1", None), stalk("EPI_ISL_2", Some(20))];
        let ha = vec![motif("EPI_ISL_1", 7), motif("EPI_ISL_2", 5)];
        let outcome = merge_tables(&na, &ha, JoinPolicy::Inner).unwrap();

        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.records[0].stalk_length, None);
        assert_eq!(outcome.report.unmeasured_stalk, 1);
    }

    #[rstest]
    fn test_join_is_commutative(
        na_table: Vec<StalkMeasurement>,
        ha_table: Vec<GlycosylationCount>,
    ) {
        let forward = join_by_identifier(&na_table, &ha_table);
        let backward = join_by_identifier(&ha_table, &na_table);

        let mut forward_pairs: Vec<(String, String)> = forward
            .pairs
            .iter()
            .map(|(s, m)| (s.key().to_string(), m.key().to_string()))
            .collect();
        let mut backward_pairs: Vec<(String, String)> = backward
            .pairs
            .iter()
            .map(|(m, s)| (s.key().to_string(), m.key().to_string()))
            .collect();
        forward_pairs.sort();
        backward_pairs.sort();

        assert_eq!(forward_pairs, backward_pairs);
        assert_eq!(forward.left_only.len(), backward.right_only.len());
        assert_eq!(forward.right_only.len(), backward.left_only.len());
    }

    #[rstest]
    #[case("inner", JoinPolicy::Inner)]
    #[case("OUTER", JoinPolicy::Outer)]
    fn test_join_policy_from_str(#[case] input: &str, #[case] expected: JoinPolicy) {
        assert_eq!(input.parse::<JoinPolicy>().unwrap(), expected);
        assert!("left".parse::<JoinPolicy>().is_err());
    }
}
