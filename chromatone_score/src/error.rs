// Error types for the score generator.
//
// One enum per concern: entry validation, generator configuration, tone-row
// construction, generation itself, file loading and MIDI output. Generation
// errors wrap the others so callers of `ScoreGenerator::generate` only need
// to match one type. Pitch and octave overflow are never errors; they are
// clamped where they occur (see emitter.rs and octave.rs).

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// An upstream entry failed validation before any notes were generated.
#[derive(Debug, Error, PartialEq)]
pub enum EntryError {
    #[error("entry {index}: area {area} is outside [0, 1]")]
    AreaOutOfRange { index: usize, area: f64 },
    #[error("entry {index}: percentage {percentage} is outside [0, 100]")]
    PercentageOutOfRange { index: usize, percentage: f64 },
    #[error("entry {index}: start_time {start_time} is negative")]
    NegativeStartTime { index: usize, start_time: f64 },
    #[error("entry {index}: {field} is not a finite number")]
    NonFinite { index: usize, field: &'static str },
    #[error("entry {index}: segment index {segment} is outside the tone row (0-11)")]
    SegmentOutOfRange { index: usize, segment: usize },
    #[error("entry {index}: segments list is empty")]
    EmptySegments { index: usize },
}

/// A tone row could not be built or indexed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RowError {
    #[error("tone row must have 12 values, got {0}")]
    WrongLength(usize),
    #[error("tone row value {0} is outside 0-11")]
    ValueOutOfRange(u8),
    #[error("tone row repeats value {0}")]
    Duplicate(u8),
    #[error("segment index {0} is outside the tone row")]
    IndexOutOfRange(usize),
}

/// Generator configuration is unusable.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("tempo must be positive and finite, got {0}")]
    Tempo(f64),
    #[error("ticks_per_beat must be non-zero")]
    TicksPerBeat,
    #[error("base_note {0} is outside the MIDI range 0-127")]
    BaseNote(u8),
    #[error("duration candidate list is empty")]
    NoDurations,
    #[error("duration candidates must be non-zero tick counts")]
    ZeroDuration,
    #[error("octave window [{low}, {high}] leaves no shift that keeps base note {base_note} in range")]
    OctaveWindow { low: i32, high: i32, base_note: u8 },
    #[error("repeat_probability {0} is outside [0, 1]")]
    RepeatProbability(f64),
    #[error("velocity {0} is outside 1-127")]
    Velocity(u8),
    #[error("color {color:?} maps to program {program}, outside 0-127")]
    Program { color: String, program: u8 },
    #[error("invalid pinned tone row: {0}")]
    ToneRow(#[from] RowError),
}

/// A color label has no instrument program in the palette.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown color {0:?}")]
pub struct UnknownColor(pub String);

/// Score generation failed.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("entry {index}: unknown color {color:?}")]
    UnknownColor { index: usize, color: String },
    #[error(transparent)]
    Entry(#[from] EntryError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Row(#[from] RowError),
    #[error("duration weights could not be sampled: {0}")]
    DurationWeights(String),
}

/// Reading an entry or config file failed.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Writing a score as a MIDI file failed.
#[derive(Debug, Error)]
pub enum MidiError {
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode MIDI data: {0}")]
    Encode(String),
    #[error("ticks_per_beat {0} does not fit MIDI's 15-bit timing field")]
    TicksPerBeat(u16),
    #[error("tempo {0} BPM cannot be stored as a MIDI tempo event")]
    Tempo(f64),
    #[error("time {0}s is beyond the range of a MIDI delta")]
    TickOverflow(f64),
    #[error("{0} tracks exceed the 15 melodic MIDI channels")]
    TooManyTracks(usize),
}
