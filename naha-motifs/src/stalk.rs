//! NA stalk length measurement.
//!
//! The stalk is the stretch of residues strictly between the end of a begin-pattern
//! match and the start of the first end-pattern match that follows it. Its length is
//! the number of non-gap characters in that stretch.
//!
//! Two strategies are available:
//!
//! - **per record**: both patterns are searched for in every sequence, so the result
//!   is independent of where the aligner put its gaps.
//! - **reference**: the patterns are located once in a reference sequence and the
//!   resulting alignment columns are applied to every record of the alignment.
use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use naha_core::utils::count_residues;
use naha_core::{ConfigError, SequenceRecord, StalkMeasurement};

use crate::pattern::GapAwarePattern;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StalkMode {
    #[default]
    PerRecord,
    Reference,
}

impl FromStr for StalkMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "per-record" => Ok(StalkMode::PerRecord),
            "reference" => Ok(StalkMode::Reference),
            _ => Err(ConfigError::IncompatibleOptions(format!(
                "unknown stalk mode '{}', expected 'per-record' or 'reference'",
                s
            ))),
        }
    }
}

/// Alignment columns `[start, end)` holding the stalk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct StalkSpan {
    pub start: usize,
    pub end: usize,
}

/// Why a record could not be measured. Not an error: the record is reported as such.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Unmeasurable {
    BeginNotFound,
    EndNotFound,
    /// Offsets pushed the span outside the sequence or made it run backwards.
    InvalidSpan,
}

impl Display for Unmeasurable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unmeasurable::BeginNotFound => write!(f, "begin pattern not found"),
            Unmeasurable::EndNotFound => write!(f, "end pattern not found after begin"),
            Unmeasurable::InvalidSpan => write!(f, "stalk span outside sequence"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StalkOutcome {
    Measured { length: u32, span: StalkSpan },
    Unmeasurable { reason: Unmeasurable },
}

impl StalkOutcome {
    pub fn length(&self) -> Option<u32> {
        match self {
            StalkOutcome::Measured { length, .. } => Some(*length),
            StalkOutcome::Unmeasurable { .. } => None,
        }
    }
}

///
/// The begin/end patterns plus the adjustments applied to the span between them.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StalkBoundaries {
    begin: GapAwarePattern,
    end: GapAwarePattern,
    start_offset: isize,
    end_offset: isize,
    drop_first_residue: bool,
}

impl StalkBoundaries {
    pub fn new(begin: GapAwarePattern, end: GapAwarePattern) -> Self {
        StalkBoundaries {
            begin,
            end,
            start_offset: 0,
            end_offset: 0,
            drop_first_residue: false,
        }
    }

    ///
    /// Shift the span start (relative to the end of the begin match) and the span end
    /// (relative to the start of the end match), in alignment columns.
    ///
    pub fn with_offsets(mut self, start_offset: isize, end_offset: isize) -> Self {
        self.start_offset = start_offset;
        self.end_offset = end_offset;
        self
    }

    ///
    /// Leave the first residue of the span out of the count. Corrects for the
    /// one-residue ambiguity at the transmembrane/stalk boundary.
    ///
    pub fn with_drop_first_residue(mut self, drop: bool) -> Self {
        self.drop_first_residue = drop;
        self
    }

    pub fn begin(&self) -> &GapAwarePattern {
        &self.begin
    }

    pub fn end(&self) -> &GapAwarePattern {
        &self.end
    }

    ///
    /// Find the stalk columns in `sequence`.
    ///
    pub fn locate(&self, sequence: &[u8]) -> Result<StalkSpan, Unmeasurable> {
        let begin = self
            .begin
            .find(sequence)
            .ok_or(Unmeasurable::BeginNotFound)?;
        let end = self
            .end
            .find_from(sequence, begin.end)
            .ok_or(Unmeasurable::EndNotFound)?;

        let start = begin.end as isize + self.start_offset;
        let stop = end.start as isize + self.end_offset;
        if start < 0 || stop > sequence.len() as isize || start > stop {
            return Err(Unmeasurable::InvalidSpan);
        }

        Ok(StalkSpan {
            start: start as usize,
            end: stop as usize,
        })
    }

    ///
    /// Count the residues of `sequence` inside `span`. Columns past the end of the
    /// sequence are treated as gaps.
    ///
    pub fn length_in(&self, span: StalkSpan, sequence: &[u8]) -> u32 {
        let start = span.start.min(sequence.len());
        let end = span.end.min(sequence.len());
        let residues = count_residues(&sequence[start..end]) as u32;
        if self.drop_first_residue {
            residues.saturating_sub(1)
        } else {
            residues
        }
    }

    pub fn measure(&self, sequence: &[u8]) -> StalkOutcome {
        match self.locate(sequence) {
            Ok(span) => StalkOutcome::Measured {
                length: self.length_in(span, sequence),
                span,
            },
            Err(reason) => StalkOutcome::Unmeasurable { reason },
        }
    }
}

///
/// Applies [`StalkBoundaries`] to records, either per record or through a span fixed
/// by a reference sequence.
///
#[derive(Debug, Clone)]
pub struct StalkExtractor {
    boundaries: StalkBoundaries,
    reference_span: Option<StalkSpan>,
}

impl StalkExtractor {
    pub fn per_record(boundaries: StalkBoundaries) -> Self {
        StalkExtractor {
            boundaries,
            reference_span: None,
        }
    }

    ///
    /// Fix the stalk columns using `reference`. Failing to find the boundaries in the
    /// reference means nothing can be measured, so that is a configuration error.
    ///
    pub fn from_reference(
        boundaries: StalkBoundaries,
        reference: &[u8],
    ) -> Result<Self, ConfigError> {
        let span = boundaries.locate(reference).map_err(|reason| {
            ConfigError::IncompatibleOptions(format!(
                "can't place the stalk in the reference sequence: {} (begin '{}', end '{}')",
                reason,
                boundaries.begin(),
                boundaries.end()
            ))
        })?;
        Ok(StalkExtractor {
            boundaries,
            reference_span: Some(span),
        })
    }

    pub fn mode(&self) -> StalkMode {
        match self.reference_span {
            Some(_) => StalkMode::Reference,
            None => StalkMode::PerRecord,
        }
    }

    pub fn reference_span(&self) -> Option<StalkSpan> {
        self.reference_span
    }

    pub fn measure(&self, record: &SequenceRecord) -> StalkOutcome {
        match self.reference_span {
            Some(span) => StalkOutcome::Measured {
                length: self.boundaries.length_in(span, record.sequence()),
                span,
            },
            None => self.boundaries.measure(record.sequence()),
        }
    }

    ///
    /// Measure every record, keeping input order.
    ///
    pub fn measure_all<'a, I>(&self, records: I) -> StalkBatch
    where
        I: IntoIterator<Item = &'a SequenceRecord>,
    {
        let mut batch = StalkBatch::default();
        for record in records {
            let outcome = self.measure(record);
            batch.push(record, outcome);
        }
        batch
    }
}

/// Per-record outcomes of a stalk run, in input order.
#[derive(Debug, Clone, Default)]
pub struct StalkBatch {
    pub measurements: Vec<StalkMeasurement>,
    pub outcomes: Vec<StalkOutcome>,
}

impl StalkBatch {
    pub fn push(&mut self, record: &SequenceRecord, outcome: StalkOutcome) {
        self.measurements.push(StalkMeasurement {
            identifier: record.identifier().to_string(),
            collection_date: record.collection_date(),
            stalk_length: outcome.length(),
        });
        self.outcomes.push(outcome);
    }

    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    pub fn measured(&self) -> usize {
        self.outcomes.iter().filter(|o| o.length().is_some()).count()
    }

    pub fn unmeasurable(&self) -> usize {
        self.len() - self.measured()
    }

    /// Count of unmeasurable records for one reason.
    pub fn unmeasurable_for(&self, reason: Unmeasurable) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, StalkOutcome::Unmeasurable { reason: r } if *r == reason))
            .count()
    }
}
