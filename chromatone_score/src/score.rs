// The score: the engine's output representation.
//
// A `Score` is a list of instrument tracks, one per MIDI program, each
// holding the notes appended to it in generation order. Times are in
// seconds. The score also records the tempo, base note and ticks-per-beat
// the notes were computed with, since a serializer needs them to convert
// back to ticks.
//
// Notes are never edited or reordered once appended. Within one entry's
// run they are in time order; across entries that share a program they
// follow entry order, which may jump backwards in time.

use serde::{Deserialize, Serialize};

/// One sounding note.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// MIDI pitch, always within 0-127.
    pub pitch: u8,
    pub velocity: u8,
    /// Onset in seconds.
    pub start: f64,
    /// Release in seconds, strictly after `start`.
    pub end: f64,
}

impl Note {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// All notes for one instrument program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// General MIDI program number (0-127).
    pub program: u8,
    /// Color labels that have written into this track, in first-use order.
    pub colors: Vec<String>,
    pub notes: Vec<Note>,
}

impl Track {
    pub fn new(program: u8) -> Self {
        Track {
            program,
            colors: Vec::new(),
            notes: Vec::new(),
        }
    }

    /// Record that `color` feeds this track (no-op if already recorded).
    pub fn add_color(&mut self, color: &str) {
        if !self.colors.iter().any(|c| c == color) {
            self.colors.push(color.to_string());
        }
    }

    pub fn push(&mut self, note: Note) {
        self.notes.push(note);
    }

    /// Human-readable track name, e.g. `"red+orange (program 1)"`.
    pub fn label(&self) -> String {
        if self.colors.is_empty() {
            format!("program {}", self.program)
        } else {
            format!("{} (program {})", self.colors.join("+"), self.program)
        }
    }
}

/// Generated multi-track score plus the timing it was computed with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    /// Tempo in beats per minute.
    pub tempo: f64,
    pub base_note: u8,
    pub ticks_per_beat: u16,
    /// Tracks in creation order.
    pub tracks: Vec<Track>,
}

impl Score {
    pub fn note_count(&self) -> usize {
        self.tracks.iter().map(|t| t.notes.len()).sum()
    }

    pub fn track_for_program(&self, program: u8) -> Option<&Track> {
        self.tracks.iter().find(|t| t.program == program)
    }

    /// Latest note release across all tracks, or 0 for an empty score.
    pub fn end_time(&self) -> f64 {
        self.tracks
            .iter()
            .flat_map(|t| t.notes.iter())
            .map(|n| n.end)
            .fold(0.0, f64::max)
    }

    /// Compact one-line-per-track text summary for debugging.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        for track in &self.tracks {
            let sounding: f64 = track.notes.iter().map(Note::duration).sum();
            out.push_str(&format!(
                "{:>28}: {} notes, {:.1}s sounding\n",
                track.label(),
                track.notes.len(),
                sounding
            ));
        }
        out
    }
}
