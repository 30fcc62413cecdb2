// Generator configuration.
//
// Every tunable of the engine lives in `GeneratorConfig`: tempo, base note,
// tick resolution, the duration candidates, the octave window, the color
// palette, the stutter probability and note velocity. Defaults reproduce the
// detector pipeline's original settings. A config can be loaded from JSON;
// missing fields fall back to their defaults.
//
// The config is fixed when a `ScoreGenerator` is built and is validated
// there, so nothing downstream re-checks it.

use crate::error::{ConfigError, LoadError};
use crate::octave::{DEFAULT_OCTAVE_WINDOW, OctaveRange};
use crate::registry::default_palette;
use crate::row::ToneRow;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const DEFAULT_TEMPO: f64 = 120.0;
pub const DEFAULT_BASE_NOTE: u8 = 60;
pub const DEFAULT_TICKS_PER_BEAT: u16 = 480;
pub const DEFAULT_REPEAT_PROBABILITY: f64 = 0.01;
pub const DEFAULT_VELOCITY: u8 = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Beats per minute.
    pub tempo: f64,
    /// MIDI pitch that offset 0 at octave shift 0 maps to.
    pub base_note: u8,
    pub ticks_per_beat: u16,
    /// Ordered duration candidates in ticks, shortest-first by convention.
    /// The first candidate is the one small regions favor.
    pub durations: Vec<u32>,
    /// Nominal octave shift window, clipped per base note.
    pub octave_window: (i32, i32),
    /// Color label -> General MIDI program.
    pub palette: BTreeMap<String, u8>,
    /// Chance that one note is played as two half-length repeats.
    pub repeat_probability: f64,
    pub velocity: u8,
    /// Fixed tone row to use instead of drawing one from the RNG.
    pub tone_row: Option<Vec<u8>>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        let ticks_per_beat = DEFAULT_TICKS_PER_BEAT;
        GeneratorConfig {
            tempo: DEFAULT_TEMPO,
            base_note: DEFAULT_BASE_NOTE,
            ticks_per_beat,
            durations: vec![u32::from(ticks_per_beat) * 16, u32::from(ticks_per_beat) * 32],
            octave_window: DEFAULT_OCTAVE_WINDOW,
            palette: default_palette(),
            repeat_probability: DEFAULT_REPEAT_PROBABILITY,
            velocity: DEFAULT_VELOCITY,
            tone_row: None,
        }
    }
}

impl GeneratorConfig {
    /// Load from a JSON file.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let data = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| LoadError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Check every field; returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.tempo.is_finite() || self.tempo <= 0.0 {
            return Err(ConfigError::Tempo(self.tempo));
        }
        if self.base_note > 127 {
            return Err(ConfigError::BaseNote(self.base_note));
        }
        if self.ticks_per_beat == 0 {
            return Err(ConfigError::TicksPerBeat);
        }
        if self.durations.is_empty() {
            return Err(ConfigError::NoDurations);
        }
        if self.durations.contains(&0) {
            return Err(ConfigError::ZeroDuration);
        }
        self.octave_range()?;
        if !(0.0..=1.0).contains(&self.repeat_probability) {
            return Err(ConfigError::RepeatProbability(self.repeat_probability));
        }
        if self.velocity == 0 || self.velocity > 127 {
            return Err(ConfigError::Velocity(self.velocity));
        }
        if let Some((color, &program)) = self.palette.iter().find(|(_, p)| **p > 127) {
            return Err(ConfigError::Program {
                color: color.clone(),
                program,
            });
        }
        if let Some(values) = &self.tone_row {
            ToneRow::from_values(values)?;
        }
        Ok(())
    }

    pub fn octave_range(&self) -> Result<OctaveRange, ConfigError> {
        OctaveRange::new(self.base_note, self.octave_window)
    }
}
