use std::fs::read_to_string;
use std::path::Path;

use serde::{Deserialize, Serialize};

use naha_core::ConfigError;

use crate::pattern::GapAwarePattern;
use crate::stalk::{StalkBoundaries, StalkMode};

///
/// Stalk parameters as written in a TOML file:
///
/// ```toml
/// begin = "G-?N-?I-?I-?S-?.-?."
/// end = "V-?.-?.-?.-?T-?L"
/// start_offset = 0
/// end_offset = 0
/// drop_first_residue = false
/// mode = "per-record"
/// ```
///
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(default, deny_unknown_fields)]
pub struct StalkConfig {
    pub begin: Option<String>,
    pub end: Option<String>,
    pub start_offset: isize,
    pub end_offset: isize,
    pub drop_first_residue: bool,
    pub mode: StalkMode,
}

impl StalkConfig {
    ///
    /// Compile the patterns and assemble the boundaries. Both patterns are required.
    ///
    pub fn boundaries(&self) -> Result<StalkBoundaries, ConfigError> {
        let begin = self.begin.as_deref().ok_or_else(|| {
            ConfigError::IncompatibleOptions("a begin pattern is required".to_string())
        })?;
        let end = self.end.as_deref().ok_or_else(|| {
            ConfigError::IncompatibleOptions("an end pattern is required".to_string())
        })?;

        Ok(StalkBoundaries::new(
            GapAwarePattern::parse(begin)?,
            GapAwarePattern::parse(end)?,
        )
        .with_offsets(self.start_offset, self.end_offset)
        .with_drop_first_residue(self.drop_first_residue))
    }
}

impl TryFrom<&Path> for StalkConfig {
    type Error = ConfigError;

    fn try_from(path: &Path) -> Result<Self, Self::Error> {
        let config_error = |reason: String| ConfigError::ConfigFile {
            path: path.display().to_string(),
            reason,
        };
        let toml_str = read_to_string(path).map_err(|e| config_error(e.to_string()))?;
        let config = toml::from_str(&toml_str).map_err(|e| config_error(e.to_string()))?;
        Ok(config)
    }
}
