use chrono::NaiveDate;

#[cfg(feature = "serde")]
use serde::Serialize;

///
/// NA stalk length for one isolate. `stalk_length` is `None` when the stalk
/// boundaries could not be located.
///
#[derive(Eq, PartialEq, Hash, Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct StalkMeasurement {
    pub identifier: String,
    pub collection_date: Option<NaiveDate>,
    pub stalk_length: Option<u32>,
}

impl StalkMeasurement {
    pub fn is_measured(&self) -> bool {
        self.stalk_length.is_some()
    }
}

///
/// Number of N-X-[S/T] motifs found in one isolate's HA sequence.
///
#[derive(Eq, PartialEq, Hash, Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct GlycosylationCount {
    pub identifier: String,
    pub collection_date: Option<NaiveDate>,
    pub motif_count: u32,
}

///
/// An isolate present in both the NA and HA tables.
///
/// Under an inner join both measurements come from the inputs. Under an outer join
/// a side missing from one table is `None`.
///
#[derive(Eq, PartialEq, Hash, Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct MergedRecord {
    pub identifier: String,
    pub collection_date: Option<NaiveDate>,
    pub stalk_length: Option<u32>,
    pub motif_count: Option<u32>,
}

impl MergedRecord {
    ///
    /// Join one NA and one HA measurement. The date is taken from whichever side has
    /// one, preferring the NA side when both do.
    ///
    pub fn from_pair(stalk: &StalkMeasurement, motifs: &GlycosylationCount) -> Self {
        MergedRecord {
            identifier: stalk.identifier.clone(),
            collection_date: stalk.collection_date.or(motifs.collection_date),
            stalk_length: stalk.stalk_length,
            motif_count: Some(motifs.motif_count),
        }
    }

    pub fn from_stalk_only(stalk: &StalkMeasurement) -> Self {
        MergedRecord {
            identifier: stalk.identifier.clone(),
            collection_date: stalk.collection_date,
            stalk_length: stalk.stalk_length,
            motif_count: None,
        }
    }

    pub fn from_motifs_only(motifs: &GlycosylationCount) -> Self {
        MergedRecord {
            identifier: motifs.identifier.clone(),
            collection_date: motifs.collection_date,
            stalk_length: None,
            motif_count: Some(motifs.motif_count),
        }
    }

    ///
    /// The (stalk_length, motif_count) cell this record falls into, if both are known.
    ///
    pub fn cell(&self) -> Option<(u32, u32)> {
        Some((self.stalk_length?, self.motif_count?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    fn date(s: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
    }

    #[rstest]
    #[case(Some("2020-01-01"), Some("2021-05-05"), Some("2020-01-01"))]
    #[case(None, Some("2021-05-05"), Some("2021-05-05"))]
    #[case(Some("2020-01-01"), None, Some("2020-01-01"))]
    #[case(None, None, None)]
    fn test_merged_date_preference(
        #[case] na_date: Option<&str>,
        #[case] ha_date: Option<&str>,
        #[case] expected: Option<&str>,
    ) {
        let stalk = StalkMeasurement {
            identifier: "EPI_ISL_1".to_string(),
            collection_date: na_date.and_then(date),
            stalk_length: Some(33),
        };
        let motifs = GlycosylationCount {
            identifier: "EPI_ISL_1".to_string(),
            collection_date: ha_date.and_then(date),
            motif_count: 7,
        };

        let merged = MergedRecord::from_pair(&stalk, &motifs);
        assert_eq!(merged.collection_date, expected.and_then(date));
        assert_eq!(merged.cell(), Some((33, 7)));
    }

    #[rstest]
    fn test_cell_requires_both_sides() {
        let stalk = StalkMeasurement {
            identifier: "EPI_ISL_2".to_string(),
            collection_date: None,
            stalk_length: None,
        };
        assert!(!stalk.is_measured());
        assert_eq!(MergedRecord::from_stalk_only(&stalk).cell(), None);
    }
}
