//! Extraction of the accession identifier and collection date from a sequence header.
//!
//! Headers are free-form text, commonly `|`-delimited GISAID exports such as
//! `A/duck/Vietnam/1/2021|EPI_ISL_1234567|2021-03-04`. The identifier is mandatory
//! for every record; the date is optional and a missing or impossible date is `None`.
use chrono::NaiveDate;
use regex::{Regex, RegexBuilder};

use crate::errors::ConfigError;

pub const DEFAULT_IDENTIFIER_PATTERN: &str = r"EPI_ISL_\d+";
pub const DATE_PATTERN: &str = r"\d{4}-\d{2}-\d{2}";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

///
/// The single rule used to key isolates across files: surrounding whitespace is
/// dropped and ASCII letters are upper-cased.
///
pub fn normalize_identifier(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

/// Identifier and date found in a single header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderFields {
    pub identifier: Option<String>,
    pub collection_date: Option<NaiveDate>,
}

///
/// Compiled header token matchers. Built once per run and handed to the loader.
///
#[derive(Debug, Clone)]
pub struct HeaderParser {
    identifier: Regex,
    date: Regex,
}

impl HeaderParser {
    ///
    /// Build a parser using a custom accession-identifier pattern.
    ///
    /// The pattern is matched case-insensitively and the matched token is upper-cased,
    /// so the same isolate gets the same key in every file it appears in.
    ///
    pub fn with_identifier_pattern(pattern: &str) -> Result<Self, ConfigError> {
        if pattern.is_empty() {
            return Err(ConfigError::EmptyPattern);
        }
        let identifier = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| ConfigError::InvalidPattern {
                pattern: pattern.to_string(),
                position: 0,
                reason: e.to_string(),
            })?;
        let date = Regex::new(DATE_PATTERN).map_err(|e| ConfigError::InvalidPattern {
            pattern: DATE_PATTERN.to_string(),
            position: 0,
            reason: e.to_string(),
        })?;

        Ok(HeaderParser { identifier, date })
    }

    pub fn parse(&self, header: &str) -> HeaderFields {
        let identifier = self
            .identifier
            .find(header)
            .map(|m| normalize_identifier(m.as_str()));

        // take the first token that is an actual calendar date
        let collection_date = self
            .date
            .find_iter(header)
            .find_map(|m| NaiveDate::parse_from_str(m.as_str(), DATE_FORMAT).ok());

        HeaderFields {
            identifier,
            collection_date,
        }
    }
}

impl Default for HeaderParser {
    fn default() -> Self {
        HeaderParser::with_identifier_pattern(DEFAULT_IDENTIFIER_PATTERN)
            .expect("built-in header patterns compile")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn parser() -> HeaderParser {
        HeaderParser::default()
    }

    #[rstest]
    #[case("A/duck/Vietnam/1/2021|EPI_ISL_1234567|2021-03-04", "EPI_ISL_1234567", Some((2021, 3, 4)))]
    #[case("EPI_ISL_42", "EPI_ISL_42", None)]
    #[case("epi_isl_42|2019-11-30", "EPI_ISL_42", Some((2019, 11, 30)))]
    #[case("A/chicken/x|EPI_ISL_9|2020-13-45", "EPI_ISL_9", None)]
    #[case("A/chicken/x|EPI_ISL_9|2020-02", "EPI_ISL_9", None)]
    #[case("EPI_ISL_9|2020-02-30|2020-02-28", "EPI_ISL_9", Some((2020, 2, 28)))]
    fn test_parse_header(
        parser: HeaderParser,
        #[case] header: &str,
        #[case] identifier: &str,
        #[case] date: Option<(i32, u32, u32)>,
    ) {
        let fields = parser.parse(header);
        assert_eq!(fields.identifier.as_deref(), Some(identifier));
        assert_eq!(
            fields.collection_date,
            date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d))
        );
    }

    #[rstest]
    fn test_parse_header_without_identifier(parser: HeaderParser) {
        let fields = parser.parse("A/duck/Vietnam/1/2021|2021-03-04");
        assert_eq!(fields.identifier, None);
        assert!(fields.collection_date.is_some());
    }

    #[rstest]
    fn test_normalize_identifier() {
        assert_eq!(normalize_identifier(" epi_isl_12 "), "EPI_ISL_12");
    }

    #[rstest]
    fn test_custom_identifier_pattern() {
        let parser = HeaderParser::with_identifier_pattern(r"ISOLATE-\d+").unwrap();
        let fields = parser.parse("isolate-17|2022-01-01");
        assert_eq!(fields.identifier.as_deref(), Some("ISOLATE-17"));
    }

    #[rstest]
    #[case("")]
    #[case("EPI_(")]
    fn test_invalid_identifier_pattern(#[case] pattern: &str) {
        assert!(HeaderParser::with_identifier_pattern(pattern).is_err());
    }

    #[rstest]
    #[case("A/duck/Guangdong/1/2021|EPI_ISL_402124|2021-03-15")]
    #[case("epi_isl_7|2019-13-01|2019-12-31")]
    #[case("no identifier here")]
    fn test_default_matches_builtin_pattern(#[case] header: &str) {
        let explicit = HeaderParser::with_identifier_pattern(DEFAULT_IDENTIFIER_PATTERN).unwrap();
        assert_eq!(HeaderParser::default().parse(header), explicit.parse(header));
    }
}
