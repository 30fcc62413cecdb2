// Note emission: offsets and ticks in, timed notes out.
//
// `NoteEmitter` turns a semitone offset, an octave shift and a duration in
// ticks into one `Note` appended to a track, and returns the time the next
// event may start. The pitch is `base_note + offset + 12 * shift`, clamped
// to 0-127. Seconds per tick follow from the tempo:
// `seconds = ticks / (ticks_per_beat * tempo / 60)`.
//
// The stutter ornament lives here as `emit_with_repeat`: with a small fixed
// probability one note becomes two back-to-back notes of half the length at
// the same pitch. It is applied once per decision and never recurses.

use crate::config::GeneratorConfig;
use crate::score::{Note, Track};
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteEmitter {
    base_note: u8,
    tempo: f64,
    ticks_per_beat: u16,
    velocity: u8,
}

impl NoteEmitter {
    pub fn new(base_note: u8, tempo: f64, ticks_per_beat: u16, velocity: u8) -> Self {
        NoteEmitter {
            base_note,
            tempo,
            ticks_per_beat,
            velocity,
        }
    }

    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self::new(
            config.base_note,
            config.tempo,
            config.ticks_per_beat,
            config.velocity,
        )
    }

    /// Ticks per second at the configured tempo.
    pub fn ticks_per_second(&self) -> f64 {
        f64::from(self.ticks_per_beat) * self.tempo / 60.0
    }

    pub fn ticks_to_seconds(&self, ticks: f64) -> f64 {
        ticks / self.ticks_per_second()
    }

    /// Absolute MIDI pitch for an offset and octave shift, clamped to 0-127.
    pub fn pitch(&self, offset: i32, octave_shift: i32) -> u8 {
        let raw = i32::from(self.base_note) + offset + 12 * octave_shift;
        raw.clamp(0, 127) as u8
    }

    /// Append one note starting at `start` and lasting `ticks`. Returns the
    /// note's end time.
    pub fn emit(
        &self,
        track: &mut Track,
        offset: i32,
        octave_shift: i32,
        start: f64,
        ticks: f64,
    ) -> f64 {
        let end = start + self.ticks_to_seconds(ticks);
        track.push(Note {
            pitch: self.pitch(offset, octave_shift),
            velocity: self.velocity,
            start,
            end,
        });
        end
    }

    /// Emit one note, or with probability `repeat_probability` two notes of
    /// half the length each. Either way the returned end time is
    /// `start + ticks` converted to seconds.
    #[allow(clippy::too_many_arguments)]
    pub fn emit_with_repeat(
        &self,
        track: &mut Track,
        offset: i32,
        octave_shift: i32,
        start: f64,
        ticks: f64,
        repeat_probability: f64,
        rng: &mut impl Rng,
    ) -> f64 {
        if rng.random::<f64>() < repeat_probability {
            let half = ticks / 2.0;
            let next = self.emit(track, offset, octave_shift, start, half);
            self.emit(track, offset, octave_shift, next, half)
        } else {
            self.emit(track, offset, octave_shift, start, ticks)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chromatone_prng::ScoreRng;

    fn emitter() -> NoteEmitter {
        NoteEmitter::new(60, 120.0, 480, 100)
    }

    #[test]
    fn tick_conversion_follows_tempo() {
        let e = emitter();
        assert_eq!(e.ticks_per_second(), 960.0);
        assert_eq!(e.ticks_to_seconds(480.0 * 16.0), 8.0);
        assert_eq!(e.ticks_to_seconds(480.0 * 32.0), 16.0);
        let slow = NoteEmitter::new(60, 60.0, 480, 100);
        assert_eq!(slow.ticks_to_seconds(480.0), 1.0);
    }

    #[test]
    fn pitch_is_clamped() {
        let e = emitter();
        assert_eq!(e.pitch(7, 0), 67);
        assert_eq!(e.pitch(12, 2), 96);
        assert_eq!(e.pitch(0, -2), 36);
        let high = NoteEmitter::new(120, 120.0, 480, 100);
        assert_eq!(high.pitch(12, 0), 127);
        let low = NoteEmitter::new(3, 120.0, 480, 100);
        assert_eq!(low.pitch(0, -1), 0);
    }

    #[test]
    fn emit_appends_and_returns_end() {
        let e = emitter();
        let mut track = Track::new(1);
        let next = e.emit(&mut track, 4, 1, 2.0, 960.0);
        assert_eq!(next, 3.0);
        assert_eq!(
            track.notes,
            vec![Note {
                pitch: 76,
                velocity: 100,
                start: 2.0,
                end: 3.0
            }]
        );
    }

    #[test]
    fn certain_repeat_splits_into_two_halves() {
        let e = emitter();
        let mut track = Track::new(1);
        let mut rng = ScoreRng::new(1);
        let next = e.emit_with_repeat(&mut track, 0, 0, 1.0, 1920.0, 1.0, &mut rng);
        assert_eq!(next, 3.0);
        assert_eq!(track.notes.len(), 2);
        assert_eq!((track.notes[0].start, track.notes[0].end), (1.0, 2.0));
        assert_eq!((track.notes[1].start, track.notes[1].end), (2.0, 3.0));
        assert_eq!(track.notes[0].pitch, track.notes[1].pitch);
    }

    #[test]
    fn zero_repeat_probability_never_splits() {
        let e = emitter();
        let mut track = Track::new(1);
        let mut rng = ScoreRng::new(2);
        let mut start = 0.0;
        for _ in 0..1000 {
            start = e.emit_with_repeat(&mut track, 0, 0, start, 96.0, 0.0, &mut rng);
        }
        assert_eq!(track.notes.len(), 1000);
    }

    #[test]
    fn default_repeat_rate_is_rare() {
        let e = emitter();
        let mut track = Track::new(1);
        let mut rng = ScoreRng::new(3);
        let decisions = 10_000;
        for i in 0..decisions {
            e.emit_with_repeat(&mut track, 0, 0, i as f64, 96.0, 0.01, &mut rng);
        }
        let repeats = track.notes.len() - decisions;
        assert!((30..300).contains(&repeats), "repeats: {repeats}");
    }
}
