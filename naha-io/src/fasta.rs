use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use tracing::{debug, warn};

use naha_core::utils::get_dynamic_reader;
use naha_core::{FormatError, HeaderParser, SequenceRecord};

const HEADER_MARKER: char = '>';

///
/// Lazy reader over the records of an aligned FASTA file.
///
/// Each `>` line starts a record; the identifier and date are taken from it with a
/// [`HeaderParser`]. Sequence lines up to the next header are concatenated as-is (gap
/// characters kept, residue alphabet not checked). Records come back in file order and
/// duplicate identifiers are passed through untouched.
///
/// A header without an identifier is a [`FormatError::MissingIdentifier`], unless
/// [`FastaReader::skip_unidentified`] is set, in which case the record is dropped and
/// counted. The reader stops after the first error.
///
pub struct FastaReader<R: BufRead> {
    reader: R,
    parser: HeaderParser,
    skip_unidentified: bool,
    line: String,
    line_number: usize,
    pending_header: Option<(String, usize)>,
    skipped: usize,
    done: bool,
}

impl FastaReader<BufReader<Box<dyn Read>>> {
    ///
    /// Open a FASTA file for reading. Files ending in `.gz` are decompressed on the fly.
    ///
    /// # Arguments
    /// - path: path to the FASTA file
    /// - parser: header parser used to pull identifiers and dates
    ///
    pub fn from_path<P: AsRef<Path>>(path: P, parser: HeaderParser) -> std::io::Result<Self> {
        debug!(path = %path.as_ref().display(), "Opening FASTA file");
        let reader = get_dynamic_reader(path.as_ref())?;
        Ok(FastaReader::new(reader, parser))
    }
}

impl<R: BufRead> FastaReader<R> {
    pub fn new(reader: R, parser: HeaderParser) -> Self {
        FastaReader {
            reader,
            parser,
            skip_unidentified: false,
            line: String::new(),
            line_number: 0,
            pending_header: None,
            skipped: 0,
            done: false,
        }
    }

    ///
    /// Drop records whose header has no identifier instead of failing.
    ///
    pub fn skip_unidentified(mut self, skip: bool) -> Self {
        self.skip_unidentified = skip;
        self
    }

    ///
    /// Number of records dropped so far because their header had no identifier.
    ///
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn next_line(&mut self) -> std::io::Result<Option<&str>> {
        self.line.clear();
        let bytes_read = self.reader.read_line(&mut self.line)?;
        if bytes_read == 0 {
            return Ok(None);
        }
        self.line_number += 1;
        Ok(Some(self.line.trim_end()))
    }

    /// Advance to the next header line, skipping blank lines.
    fn next_header(&mut self) -> Result<Option<(String, usize)>, FormatError> {
        if let Some(pending) = self.pending_header.take() {
            return Ok(Some(pending));
        }
        loop {
            let line_number = self.line_number + 1;
            match self.next_line()? {
                None => return Ok(None),
                Some(line) if line.starts_with(HEADER_MARKER) => {
                    return Ok(Some((line[1..].trim().to_string(), line_number)));
                }
                Some(line) if line.trim().is_empty() => continue,
                Some(_) => return Err(FormatError::SequenceBeforeHeader { line: line_number }),
            }
        }
    }

    /// Collect sequence lines until the next header or end of file.
    fn read_sequence(&mut self) -> Result<Vec<u8>, FormatError> {
        let mut sequence = Vec::new();
        loop {
            let line_number = self.line_number + 1;
            match self.next_line()? {
                None => return Ok(sequence),
                Some(line) if line.starts_with(HEADER_MARKER) => {
                    let header = line[1..].trim().to_string();
                    self.pending_header = Some((header, line_number));
                    return Ok(sequence);
                }
                Some(line) => {
                    sequence.extend(line.bytes().filter(|b| !b.is_ascii_whitespace()));
                }
            }
        }
    }

    fn read_record(&mut self) -> Result<Option<SequenceRecord>, FormatError> {
        loop {
            let Some((header, line)) = self.next_header()? else {
                return Ok(None);
            };
            let sequence = self.read_sequence()?;
            let fields = self.parser.parse(&header);

            match fields.identifier {
                Some(identifier) => {
                    return Ok(Some(SequenceRecord::new(
                        identifier,
                        fields.collection_date,
                        sequence,
                    )));
                }
                None if self.skip_unidentified => {
                    warn!(line, header = %header, "Missing identifier in header; record dropped");
                    self.skipped += 1;
                }
                None => return Err(FormatError::MissingIdentifier { header, line }),
            }
        }
    }
}

impl<R: BufRead> Iterator for FastaReader<R> {
    type Item = Result<SequenceRecord, FormatError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

///
/// Read every record of a FASTA file into memory.
///
pub fn read_fasta<P: AsRef<Path>>(
    path: P,
    parser: HeaderParser,
) -> Result<Vec<SequenceRecord>, FormatError> {
    FastaReader::from_path(path, parser)?.collect()
}
