//! Gap-tolerant residue patterns.
//!
//! Alignment gaps can split a motif that is contiguous in the protein across columns
//! that are far apart in the alignment. A [`GapAwarePattern`] is a short list of
//! residue matchers where each link between two neighbours either requires them to be
//! adjacent or lets any run of gap characters sit between them.
//!
//! ## Grammar
//!
//! | Token        | Meaning                                                  |
//! |--------------|----------------------------------------------------------|
//! | `A`..`Z`, `*`| that residue (case-insensitive)                          |
//! | `.`          | any residue that is not a gap                            |
//! | `[ST]`       | any of the listed residues                               |
//! | `[^P]`       | any non-gap residue except the listed ones               |
//! | `-?`         | between two elements: zero or more gaps may appear here |
//!
//! Elements written back to back must be adjacent in the sequence. A connector at the
//! start or end of a pattern, two connectors in a row, or a bare `-` is a
//! [`ConfigError`].
//!
//! ## Matching
//!
//! Matching walks a `(pattern position, sequence position)` pair forward; the first
//! element never matches a gap, so a match always starts and ends on a residue and the
//! match at a given start is unique. Spans are half-open and in gapped coordinates.
use std::fmt::{self, Display};
use std::str::FromStr;

use naha_core::ConfigError;
use naha_core::utils::is_gap;

pub const GAP_CONNECTOR: &str = "-?";

/// How successive occurrences of a pattern may relate to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlapPolicy {
    /// Every start position that matches counts, even if matches share residues.
    #[default]
    Overlapping,
    /// Leftmost match wins and scanning resumes after its end.
    NonOverlapping,
}

impl FromStr for OverlapPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "overlapping" => Ok(OverlapPolicy::Overlapping),
            "non-overlapping" | "nonoverlapping" => Ok(OverlapPolicy::NonOverlapping),
            _ => Err(ConfigError::IncompatibleOptions(format!(
                "unknown overlap policy '{}', expected 'overlapping' or 'non-overlapping'",
                s
            ))),
        }
    }
}

impl Display for OverlapPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverlapPolicy::Overlapping => write!(f, "overlapping"),
            OverlapPolicy::NonOverlapping => write!(f, "non-overlapping"),
        }
    }
}

/// One occurrence of a pattern, `[start, end)` in gapped coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatchSpan {
    pub start: usize,
    pub end: usize,
}

impl MatchSpan {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ResidueMatcher {
    Literal(u8),
    Any,
    Class { residues: Vec<u8>, negated: bool },
}

impl ResidueMatcher {
    fn matches(&self, residue: u8) -> bool {
        if is_gap(residue) {
            return false;
        }
        let residue = residue.to_ascii_uppercase();
        match self {
            ResidueMatcher::Literal(r) => *r == residue,
            ResidueMatcher::Any => true,
            ResidueMatcher::Class { residues, negated } => residues.contains(&residue) != *negated,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PatternElement {
    pub(crate) matcher: ResidueMatcher,
    /// Gaps may sit between the previous element and this one.
    pub(crate) gaps_before: bool,
}

///
/// A compiled residue pattern that can see through alignment gaps.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GapAwarePattern {
    source: String,
    elements: Vec<PatternElement>,
}

fn is_residue_symbol(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'*'
}

impl GapAwarePattern {
    pub(crate) fn from_elements(source: &str, elements: Vec<PatternElement>) -> Self {
        GapAwarePattern {
            source: source.to_string(),
            elements,
        }
    }

    ///
    /// Compile a pattern string. See the module docs for the grammar.
    ///
    pub fn parse(pattern: &str) -> Result<Self, ConfigError> {
        let invalid = |position: usize, reason: &str| ConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            position,
            reason: reason.to_string(),
        };

        if pattern.is_empty() {
            return Err(ConfigError::EmptyPattern);
        }

        let bytes = pattern.as_bytes();
        let mut elements: Vec<PatternElement> = Vec::new();
        let mut gaps_before = false;
        let mut i = 0;

        while i < bytes.len() {
            let c = bytes[i];
            let matcher = match c {
                b'-' => {
                    if bytes.get(i + 1) != Some(&b'?') {
                        return Err(invalid(
                            i,
                            "gap character must be written as the '-?' connector",
                        ));
                    }
                    if elements.is_empty() {
                        return Err(invalid(i, "connector must follow a residue"));
                    }
                    if gaps_before {
                        return Err(invalid(i, "repeated connector"));
                    }
                    gaps_before = true;
                    i += GAP_CONNECTOR.len();
                    continue;
                }
                b'.' => {
                    i += 1;
                    ResidueMatcher::Any
                }
                b'[' => {
                    let close = bytes[i + 1..]
                        .iter()
                        .position(|&b| b == b']')
                        .map(|offset| i + 1 + offset)
                        .ok_or_else(|| invalid(i, "unclosed character class"))?;
                    let mut body = &bytes[i + 1..close];
                    let negated = body.first() == Some(&b'^');
                    if negated {
                        body = &body[1..];
                    }
                    if body.is_empty() {
                        return Err(invalid(i, "empty character class"));
                    }
                    if let Some(offset) = body.iter().position(|&b| !is_residue_symbol(b)) {
                        return Err(invalid(
                            close - body.len() + offset,
                            "character classes may only list residues",
                        ));
                    }
                    let mut residues: Vec<u8> =
                        body.iter().map(|b| b.to_ascii_uppercase()).collect();
                    residues.sort_unstable();
                    residues.dedup();
                    i = close + 1;
                    ResidueMatcher::Class { residues, negated }
                }
                c if is_residue_symbol(c) => {
                    i += 1;
                    ResidueMatcher::Literal(c.to_ascii_uppercase())
                }
                _ => return Err(invalid(i, "unexpected character")),
            };

            elements.push(PatternElement {
                matcher,
                gaps_before,
            });
            gaps_before = false;
        }

        if gaps_before {
            return Err(invalid(
                pattern.len() - GAP_CONNECTOR.len(),
                "connector must precede a residue",
            ));
        }

        Ok(GapAwarePattern::from_elements(pattern, elements))
    }

    /// The pattern as it was written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Number of residues a match consumes, gaps excluded.
    pub fn residue_len(&self) -> usize {
        self.elements.len()
    }

    ///
    /// Try to match with the first element anchored at `start`.
    ///
    pub fn match_at(&self, sequence: &[u8], start: usize) -> Option<MatchSpan> {
        let mut position = start;
        for (index, element) in self.elements.iter().enumerate() {
            if index > 0 && element.gaps_before {
                while position < sequence.len() && is_gap(sequence[position]) {
                    position += 1;
                }
            }
            // running off the end is a miss, never a partial match
            if position >= sequence.len() || !element.matcher.matches(sequence[position]) {
                return None;
            }
            position += 1;
        }
        Some(MatchSpan {
            start,
            end: position,
        })
    }

    ///
    /// Leftmost match starting at or after `from`.
    ///
    pub fn find_from(&self, sequence: &[u8], from: usize) -> Option<MatchSpan> {
        (from..sequence.len()).find_map(|start| self.match_at(sequence, start))
    }

    /// Leftmost match in the whole sequence.
    pub fn find(&self, sequence: &[u8]) -> Option<MatchSpan> {
        self.find_from(sequence, 0)
    }

    ///
    /// Iterate over all matches, left to right, under the given overlap policy.
    ///
    pub fn find_iter<'p, 's>(
        &'p self,
        sequence: &'s [u8],
        policy: OverlapPolicy,
    ) -> Matches<'p, 's> {
        Matches {
            pattern: self,
            sequence,
            policy,
            next_start: 0,
        }
    }

    pub fn count(&self, sequence: &[u8], policy: OverlapPolicy) -> usize {
        self.find_iter(sequence, policy).count()
    }
}

impl FromStr for GapAwarePattern {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GapAwarePattern::parse(s)
    }
}

impl Display for GapAwarePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

/// Iterator over the matches of a [`GapAwarePattern`].
pub struct Matches<'p, 's> {
    pattern: &'p GapAwarePattern,
    sequence: &'s [u8],
    policy: OverlapPolicy,
    next_start: usize,
}

impl Iterator for Matches<'_, '_> {
    type Item = MatchSpan;

    fn next(&mut self) -> Option<Self::Item> {
        let span = self.pattern.find_from(self.sequence, self.next_start)?;
        self.next_start = match self.policy {
            OverlapPolicy::Overlapping => span.start + 1,
            OverlapPolicy::NonOverlapping => span.end,
        };
        Some(span)
    }
}
