// Chromatone Score Generator
//
// Turns timed, color-tagged regions detected in video frames into a
// multi-track twelve-tone score. Each entry (one color region over one time
// window) is mapped to an instrument track through a color palette, and its
// window is filled with notes drawn from a private tone row: the row is
// walked again and again under random row forms and octave shifts, with
// area-weighted durations, density-controlled rests and an occasional
// stutter.
//
// Architecture:
// - row.rs: Tone row generation and the four row forms (prime, inversion,
//   retrograde, retrograde-inversion)
// - duration.rs: Logistic, area-weighted duration selection
// - octave.rs: Octave window clipping and per-traversal shift sampling
// - emitter.rs: Offset/octave/ticks -> clamped, timed notes; stutter policy
// - schedule.rs: Window-filling loop for one entry (rests, traversals, stop rule)
// - registry.rs: Color -> program palette and lazy per-program tracks
// - generator.rs: Entry-ordered generation over a fixed config and tone row
// - entry.rs: Upstream entry records, parsing and validation
// - config.rs: Generator configuration (defaults, JSON loading, validation)
// - score.rs: Output representation (notes, tracks, score)
// - midi.rs: MIDI file output from completed scores
// - error.rs: Error types
//
// The generator is deterministic given a seed, supporting reproducible output.

pub mod config;
pub mod duration;
pub mod emitter;
pub mod entry;
pub mod error;
pub mod generator;
pub mod midi;
pub mod octave;
pub mod registry;
pub mod row;
pub mod schedule;
pub mod score;
