// Upstream entries: one detected color region over one time window.
//
// Entries arrive as a JSON array produced by the color-region detector.
// `color`, `segments`, `area`, `start_time` and `end_time` are required;
// `percentage` defaults to 100 (always sound). Missing or mistyped fields
// fail at parse time, and `validate_entries` checks value ranges, so both
// kinds of bad input surface before any note is generated.
//
// An entry whose `end_time` is not after its `start_time` is valid: it is
// an empty window and produces nothing.

use crate::error::{EntryError, LoadError};
use crate::row::ROW_LEN;
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_percentage() -> f64 {
    100.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Color label, resolved through the palette.
    pub color: String,
    /// Indices into the tone row; order matters and repeats are allowed.
    pub segments: Vec<usize>,
    /// Normalized region size in [0, 1].
    pub area: f64,
    /// Window start in seconds.
    pub start_time: f64,
    /// Window end in seconds.
    pub end_time: f64,
    /// Sounding density in percent.
    #[serde(default = "default_percentage")]
    pub percentage: f64,
}

impl Entry {
    /// Probability that a row position sounds rather than rests.
    pub fn density(&self) -> f64 {
        self.percentage / 100.0
    }

    /// Length of the window in seconds; zero for an empty window.
    pub fn window(&self) -> f64 {
        (self.end_time - self.start_time).max(0.0)
    }

    /// Check value ranges. `index` is the entry's position in its input, used
    /// in error messages.
    pub fn validate(&self, index: usize) -> Result<(), EntryError> {
        for (field, value) in [
            ("area", self.area),
            ("start_time", self.start_time),
            ("end_time", self.end_time),
            ("percentage", self.percentage),
        ] {
            if !value.is_finite() {
                return Err(EntryError::NonFinite { index, field });
            }
        }
        if !(0.0..=1.0).contains(&self.area) {
            return Err(EntryError::AreaOutOfRange {
                index,
                area: self.area,
            });
        }
        if !(0.0..=100.0).contains(&self.percentage) {
            return Err(EntryError::PercentageOutOfRange {
                index,
                percentage: self.percentage,
            });
        }
        if self.start_time < 0.0 {
            return Err(EntryError::NegativeStartTime {
                index,
                start_time: self.start_time,
            });
        }
        if self.segments.is_empty() {
            return Err(EntryError::EmptySegments { index });
        }
        if let Some(&segment) = self.segments.iter().find(|&&s| s >= ROW_LEN) {
            return Err(EntryError::SegmentOutOfRange { index, segment });
        }
        Ok(())
    }
}

/// Validate every entry, stopping at the first failure.
pub fn validate_entries(entries: &[Entry]) -> Result<(), EntryError> {
    entries
        .iter()
        .enumerate()
        .try_for_each(|(index, entry)| entry.validate(index))
}

pub fn parse_entries(json: &str) -> Result<Vec<Entry>, serde_json::Error> {
    serde_json::from_str(json)
}

/// Read and parse an entry file. Values are not range-checked here.
pub fn load_entries(path: &Path) -> Result<Vec<Entry>, LoadError> {
    let data = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_entries(&data).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })
}
