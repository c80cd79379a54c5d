//! # naha-motifs
//!
//! Sequence analysis for aligned influenza proteins.
//!
//! - [`pattern`]: compiles residue patterns that tolerate alignment gaps and finds their
//!   occurrences in gapped sequences, with an explicit [`OverlapPolicy`].
//! - [`stalk`]: locates the NA stalk between a begin and an end pattern and counts its
//!   residues.
//! - [`glyco`]: counts N-X-[S/T] glycosylation sequons in HA.
//! - [`config`]: stalk parameters loaded from TOML.
//!
//! ## Example
//!
//! ```rust
//! use naha_motifs::{GapAwarePattern, StalkBoundaries, MotifScanner, OverlapPolicy};
//!
//! let boundaries = StalkBoundaries::new(
//!     GapAwarePattern::parse("G-?N-?I-?I-?S-?.-?.").unwrap(),
//!     GapAwarePattern::parse("V-?.-?.-?.-?T-?L").unwrap(),
//! );
//! assert_eq!(boundaries.measure(b"MKGNIISAA-PKSEHKVQQQTL").length(), Some(6));
//!
//! let scanner = MotifScanner::new(OverlapPolicy::Overlapping);
//! assert_eq!(scanner.count(b"N-AT"), 1);
//! ```
//!
pub mod config;
pub mod glyco;
pub mod pattern;
pub mod stalk;

// re-export things
pub use config::StalkConfig;
pub use glyco::{GLYCOSYLATION_MOTIF, MotifBatch, MotifScanner};
pub use pattern::{GapAwarePattern, MatchSpan, OverlapPolicy};
pub use stalk::{
    StalkBatch, StalkBoundaries, StalkExtractor, StalkMode, StalkOutcome, StalkSpan, Unmeasurable,
};
