use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::MultiGzDecoder;

/// The alignment gap character.
pub const GAP: u8 = b'-';

pub fn is_gap(residue: u8) -> bool {
    residue == GAP
}

///
/// Copy of `sequence` with every gap character removed.
///
pub fn strip_gaps(sequence: &[u8]) -> Vec<u8> {
    sequence.iter().copied().filter(|&r| !is_gap(r)).collect()
}

///
/// Count the non-gap characters of `sequence`.
///
pub fn count_residues(sequence: &[u8]) -> usize {
    sequence.iter().filter(|&&r| !is_gap(r)).count()
}

///
/// Get a reader for either a gzip'd or non-gzip'd file.
///
/// # Arguments
///
/// - path: path to the file to read
///
pub fn get_dynamic_reader(path: &Path) -> std::io::Result<BufReader<Box<dyn Read>>> {
    let is_gzipped = path.extension() == Some(OsStr::new("gz"));
    let file = File::open(path)?;
    let file: Box<dyn Read> = match is_gzipped {
        true => Box::new(MultiGzDecoder::new(file)),
        false => Box::new(file),
    };

    Ok(BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::io::{BufRead, Write};

    use flate2::Compression;
    use flate2::write::GzEncoder;

    #[rstest]
    #[case(b"N-AT", b"NAT")]
    #[case(b"----", b"")]
    #[case(b"MNPNQK", b"MNPNQK")]
    fn test_strip_gaps(#[case] input: &[u8], #[case] expected: &[u8]) {
        assert_eq!(strip_gaps(input), expected.to_vec());
        assert_eq!(count_residues(input), expected.len());
    }

    #[rstest]
    fn test_dynamic_reader_handles_gzip() {
        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("seqs.fasta.gz");

        let file = File::create(&path).unwrap();
        let mut encoder = GzEncoder::new(file, Compression::default());
        writeln!(encoder, ">EPI_ISL_1").unwrap();
        encoder.finish().unwrap();

        let reader = get_dynamic_reader(&path).unwrap();
        let lines: Vec<String> = reader.lines().map(|l| l.unwrap()).collect();
        assert_eq!(lines, vec![">EPI_ISL_1".to_string()]);
    }

    #[rstest]
    fn test_dynamic_reader_missing_file() {
        let result = get_dynamic_reader(Path::new("does/not/exist.fasta"));
        assert!(result.is_err());
    }
}
