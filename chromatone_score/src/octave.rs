// Octave shift selection for one row traversal.
//
// The nominal window (default -2..=2 octaves) is clipped against the base
// note so that `base_note + 12 * shift` alone stays inside the MIDI range.
// The melodic offset added later can still push a pitch past 0 or 127; the
// emitter clamps that.

use crate::error::ConfigError;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Default nominal octave window, in octaves relative to the base note.
pub const DEFAULT_OCTAVE_WINDOW: (i32, i32) = (-2, 2);

/// Inclusive range of octave shifts usable with one base note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OctaveRange {
    pub low: i32,
    pub high: i32,
}

impl OctaveRange {
    /// Clip the nominal `window` to the shifts that keep `base_note` inside
    /// 0-127.
    pub fn new(base_note: u8, window: (i32, i32)) -> Result<Self, ConfigError> {
        let base = i32::from(base_note);
        let low = window.0.max(-(base / 12));
        let high = window.1.min((127 - base) / 12);
        if low > high {
            return Err(ConfigError::OctaveWindow {
                low: window.0,
                high: window.1,
                base_note,
            });
        }
        Ok(OctaveRange { low, high })
    }

    /// Uniformly pick a shift from the range.
    pub fn sample(&self, rng: &mut impl Rng) -> i32 {
        rng.random_range(self.low..=self.high)
    }
}
