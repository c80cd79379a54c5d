use chrono::NaiveDate;

use crate::errors::ConfigError;
use crate::header::DATE_FORMAT;

///
/// Parse a `YYYY-MM-DD` date supplied as a parameter.
///
pub fn parse_date(value: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| ConfigError::InvalidDate(value.to_string()))
}

///
/// Inclusive collection-date window. Records without a date always pass.
///
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateWindow {
    min: Option<NaiveDate>,
    max: Option<NaiveDate>,
}

impl DateWindow {
    pub fn new(min: Option<NaiveDate>, max: Option<NaiveDate>) -> Result<Self, ConfigError> {
        if let (Some(lo), Some(hi)) = (min, max) {
            if lo > hi {
                return Err(ConfigError::InvalidDateWindow {
                    min: lo.to_string(),
                    max: hi.to_string(),
                });
            }
        }
        Ok(DateWindow { min, max })
    }

    ///
    /// Build a window from optional `YYYY-MM-DD` strings.
    ///
    pub fn parse(min: Option<&str>, max: Option<&str>) -> Result<Self, ConfigError> {
        let min = min.map(parse_date).transpose()?;
        let max = max.map(parse_date).transpose()?;
        DateWindow::new(min, max)
    }

    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    pub fn contains(&self, date: Option<NaiveDate>) -> bool {
        let Some(date) = date else {
            return true;
        };
        self.min.is_none_or(|lo| date >= lo) && self.max.is_none_or(|hi| date <= hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    fn ymd(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[rstest]
    fn test_parse_date() {
        assert_eq!(parse_date("2020-02-29").ok(), ymd(2020, 2, 29));
        assert_eq!(
            parse_date("2021-02-29"),
            Err(ConfigError::InvalidDate("2021-02-29".to_string()))
        );
    }

    #[rstest]
    #[case(None, true)]
    #[case(ymd(2019, 12, 31), false)]
    #[case(ymd(2020, 1, 1), true)]
    #[case(ymd(2020, 12, 31), true)]
    #[case(ymd(2021, 1, 1), false)]
    fn test_window_contains(#[case] date: Option<NaiveDate>, #[case] expected: bool) {
        let window = DateWindow::parse(Some("2020-01-01"), Some("2020-12-31")).unwrap();
        assert_eq!(window.contains(date), expected);
    }

    #[rstest]
    fn test_unbounded_window() {
        let window = DateWindow::default();
        assert!(window.is_unbounded());
        assert!(window.contains(ymd(1901, 1, 1)));
    }

    #[rstest]
    fn test_inverted_window() {
        let result = DateWindow::parse(Some("2021-01-01"), Some("2020-01-01"));
        assert!(matches!(result, Err(ConfigError::InvalidDateWindow { .. })));
    }
}
