//! Core data model for naha.
//!
//! naha measures two per-isolate properties of avian influenza proteins from aligned,
//! gapped sequences: the length of the neuraminidase (NA) stalk and the number of
//! N-linked glycosylation motifs in hemagglutinin (HA). This crate holds the types
//! shared by every stage of that pipeline:
//!
//! - [`SequenceRecord`]: one parsed FASTA entry with its accession identifier and date
//! - [`StalkMeasurement`], [`GlycosylationCount`], [`MergedRecord`]: per-isolate results
//! - [`HeaderParser`]: identifier/date extraction from FASTA headers
//! - [`DateWindow`]: inclusive collection-date filtering
//! - the fatal error kinds [`FormatError`], [`ConfigError`] and [`MergeError`]
//!
pub mod dates;
pub mod errors;
pub mod header;
pub mod models;
pub mod utils;

// re-exports
pub use dates::DateWindow;
pub use errors::{ConfigError, FormatError, MergeError};
pub use header::{HeaderFields, HeaderParser, normalize_identifier};
pub use models::{GlycosylationCount, MergedRecord, SequenceRecord, StalkMeasurement};
