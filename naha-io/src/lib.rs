//! # Input/Output utilities for naha.
//!
//! Two halves:
//!
//! - [`fasta`]: a lazy reader that turns an aligned (optionally gzip'd) FASTA file into
//!   [`SequenceRecord`](naha_core::SequenceRecord)s, pulling the accession identifier and
//!   collection date out of each header.
//! - [`tables`]: CSV readers and writers for the NA, HA, merged and frequency tables.
//!   Column names are a contract with the downstream plotting scripts and are fixed here.
//!
pub mod error;
pub mod fasta;
pub mod tables;

// re-expose core functions
pub use error::*;
pub use fasta::*;
pub use tables::*;
