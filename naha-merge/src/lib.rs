//! Joining of per-isolate NA and HA measurements.
//!
//! The NA stalk table and the HA glycosylation table are produced independently, from
//! different alignments. [`merge_tables`] joins them on the accession identifier and
//! reports every record it could not pair, and [`FrequencyTable`] counts how often each
//! (stalk length, motif count) combination occurs among the joined isolates.
//!
//! # Example
//!
//! ```rust
//! use naha_core::{GlycosylationCount, StalkMeasurement};
//! use naha_merge::{FrequencyTable, JoinPolicy, merge_tables};
//!
//! let stalks = vec![StalkMeasurement {
//!     identifier: "EPI_ISL_1".to_string(),
//!     collection_date: None,
//!     stalk_length: Some(33),
//! }];
//! let motifs = vec![GlycosylationCount {
//!     identifier: "EPI_ISL_1".to_string(),
//!     collection_date: None,
//!     motif_count: 7,
//! }];
//!
//! let merged = merge_tables(&stalks, &motifs, JoinPolicy::Inner).unwrap();
//! let counts = FrequencyTable::from_records(&merged.records, "N1");
//! assert_eq!(counts.get(33, 7), 1);
//! ```
pub mod frequency;
pub mod merge;

// re-exports
pub use frequency::FrequencyTable;
pub use merge::{
    Join, JoinPolicy, Keyed, MergeOutcome, MergeReport, join_by_identifier, merge_tables,
};
