// Track population: filling one entry's time window with notes and rests.
//
// The scheduler walks the entry's material (its segments mapped through the
// tone row) over and over until the window is used up. Each walk is one
// traversal:
//
// 1. pick a row form and an octave shift for the whole traversal;
// 2. for every offset in the transformed material, in order:
//    - draw a duration from the area-weighted candidates,
//    - rest when `random() > density`, otherwise emit (with the stutter
//      policy),
//    - add the duration to the elapsed time and stop as soon as it reaches
//      the window length, even mid-traversal.
//
// The check comes after each event, so the last note can run past
// `end_time` by up to one duration. No note starts before `start_time`, and
// only the second half of a stutter can start at or after `end_time`.
//
// Random draws happen in a fixed order (form, octave, then per position:
// duration, rest, stutter), which is what makes a seeded run reproducible.

use crate::config::GeneratorConfig;
use crate::duration::select_duration;
use crate::emitter::NoteEmitter;
use crate::entry::Entry;
use crate::error::{ConfigError, GenerateError};
use crate::octave::OctaveRange;
use crate::row::RowForm;
use crate::score::Track;
use rand::Rng;
use serde::Serialize;
use tracing::debug;

/// Counters from one populator run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PopulateStats {
    /// Notes appended (a stutter counts as two).
    pub notes: usize,
    pub rests: usize,
    /// Row traversals started, including a final partial one.
    pub traversals: usize,
    /// Seconds of window consumed by notes and rests.
    pub elapsed: f64,
}

/// Everything the populator needs that does not change between entries.
#[derive(Debug, Clone)]
pub struct Scheduler {
    emitter: NoteEmitter,
    durations: Vec<u32>,
    octaves: OctaveRange,
    repeat_probability: f64,
}

impl Scheduler {
    pub fn new(
        emitter: NoteEmitter,
        durations: Vec<u32>,
        octaves: OctaveRange,
        repeat_probability: f64,
    ) -> Self {
        Scheduler {
            emitter,
            durations,
            octaves,
            repeat_probability,
        }
    }

    pub fn from_config(config: &GeneratorConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(
            NoteEmitter::from_config(config),
            config.durations.clone(),
            config.octave_range()?,
            config.repeat_probability,
        ))
    }

    pub fn emitter(&self) -> &NoteEmitter {
        &self.emitter
    }

    /// Fill `entry`'s window on `track` using `material` as the row to walk.
    ///
    /// An empty window or empty material returns immediately with zeroed
    /// stats.
    pub fn populate_track(
        &self,
        track: &mut Track,
        material: &[i32],
        entry: &Entry,
        rng: &mut impl Rng,
    ) -> Result<PopulateStats, GenerateError> {
        let mut stats = PopulateStats::default();
        let window = entry.end_time - entry.start_time;
        if window <= 0.0 || material.is_empty() {
            return Ok(stats);
        }
        let density = entry.density();
        let mut cursor = entry.start_time;

        'window: loop {
            let form = RowForm::random(rng);
            let octave_shift = self.octaves.sample(rng);
            stats.traversals += 1;
            debug!(?form, octave_shift, cursor, "row traversal");

            for offset in form.apply(material) {
                let ticks = f64::from(select_duration(entry.area, &self.durations, rng)?);
                let seconds = self.emitter.ticks_to_seconds(ticks);

                let next = if rng.random::<f64>() > density {
                    stats.rests += 1;
                    cursor + seconds
                } else {
                    let before = track.notes.len();
                    let next = self.emitter.emit_with_repeat(
                        track,
                        offset,
                        octave_shift,
                        cursor,
                        ticks,
                        self.repeat_probability,
                        rng,
                    );
                    stats.notes += track.notes.len() - before;
                    next
                };

                stats.elapsed += seconds;
                cursor = next;
                if stats.elapsed >= window {
                    break 'window;
                }
            }
        }

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::Note;
    use chromatone_prng::ScoreRng;

    fn entry(start: f64, end: f64, percentage: f64) -> Entry {
        Entry {
            color: "red".to_string(),
            segments: vec![0, 3, 7],
            area: 0.5,
            start_time: start,
            end_time: end,
            percentage,
        }
    }

    /// Short durations so windows hold many events: 1/8 s and 1/4 s at 120 BPM.
    fn scheduler(repeat_probability: f64) -> Scheduler {
        Scheduler::new(
            NoteEmitter::new(60, 120.0, 480, 100),
            vec![120, 240],
            OctaveRange::new(60, (-2, 2)).unwrap(),
            repeat_probability,
        )
    }

    #[test]
    fn empty_window_emits_nothing() {
        let mut rng = ScoreRng::new(1);
        let mut track = Track::new(1);
        let s = scheduler(0.01);
        for e in [entry(3.0, 3.0, 100.0), entry(3.0, 1.0, 100.0)] {
            let stats = s.populate_track(&mut track, &[0, 4, 7], &e, &mut rng).unwrap();
            assert_eq!(stats, PopulateStats::default());
        }
        assert!(track.notes.is_empty());
    }

    #[test]
    fn window_is_filled_with_bounded_overrun() {
        let s = scheduler(0.01);
        let longest = s.emitter().ticks_to_seconds(240.0);
        for seed in 0..50 {
            let mut rng = ScoreRng::new(seed);
            let mut track = Track::new(1);
            let e = entry(1.0, 6.0, 70.0);
            let stats = s.populate_track(&mut track, &[0, 4, 7, 11], &e, &mut rng).unwrap();

            assert!(stats.elapsed >= e.window(), "seed {seed}: elapsed {}", stats.elapsed);
            assert!(stats.elapsed < e.window() + longest + 1e-9);
            for note in &track.notes {
                assert!(note.start >= e.start_time - 1e-9, "seed {seed}: {:?}", note);
                // The second half of a stutter is the only note that may
                // start past the window.
                assert!(note.start < e.end_time + longest / 2.0, "seed {seed}: {:?}", note);
                assert!(note.end <= e.end_time + longest + 1e-9, "seed {seed}: {:?}", note);
                assert!(note.end > note.start);
            }
            assert_eq!(stats.notes, track.notes.len());
        }
    }

    #[test]
    fn only_the_last_decision_crosses_the_window_end() {
        // Without stutters every note is one decision.
        let s = scheduler(0.0);
        for seed in 0..50 {
            let mut rng = ScoreRng::new(seed);
            let mut track = Track::new(1);
            let e = entry(1.0, 6.0, 70.0);
            s.populate_track(&mut track, &[0, 4, 7, 11], &e, &mut rng).unwrap();

            let (last, earlier) = track.notes.split_last().unwrap();
            assert!(last.start < e.end_time, "seed {seed}: {:?}", last);
            for note in earlier {
                assert!(note.start < e.end_time, "seed {seed}: {:?}", note);
                assert!(note.end <= e.end_time + 1e-9, "seed {seed}: {:?}", note);
            }
        }
    }

    #[test]
    fn stutter_halves_start_the_decision_inside_the_window() {
        let s = scheduler(1.0);
        for seed in 0..50 {
            let mut rng = ScoreRng::new(seed);
            let mut track = Track::new(1);
            let e = entry(1.0, 6.0, 70.0);
            s.populate_track(&mut track, &[0, 4, 7, 11], &e, &mut rng).unwrap();

            assert_eq!(track.notes.len() % 2, 0, "seed {seed}");
            let pairs: Vec<&[Note]> = track.notes.chunks(2).collect();
            let (last, earlier) = pairs.split_last().unwrap();
            for pair in &pairs {
                assert_eq!(pair[0].pitch, pair[1].pitch);
                assert!((pair[1].start - pair[0].end).abs() < 1e-12);
                assert!(pair[0].start < e.end_time, "seed {seed}: {:?}", pair);
            }
            for pair in earlier {
                assert!(pair[1].end <= e.end_time + 1e-9, "seed {seed}: {:?}", pair);
            }
            assert!(last[1].end > last[0].start);
        }
    }

    #[test]
    fn notes_are_time_ordered_within_a_run() {
        let mut rng = ScoreRng::new(8);
        let mut track = Track::new(1);
        scheduler(0.2)
            .populate_track(&mut track, &[1, 2, 3], &entry(0.0, 10.0, 60.0), &mut rng)
            .unwrap();
        for pair in track.notes.windows(2) {
            assert!(pair[1].start >= pair[0].end - 1e-9, "{:?}", pair);
        }
    }

    #[test]
    fn full_density_never_rests() {
        let mut rng = ScoreRng::new(4);
        let mut track = Track::new(1);
        let stats = scheduler(0.0)
            .populate_track(&mut track, &[0, 3, 7], &entry(0.0, 2.0, 100.0), &mut rng)
            .unwrap();
        assert_eq!(stats.rests, 0);
        assert!(stats.notes > 0);
        // Back-to-back notes: the first starts at the window start and each
        // next one starts where the previous ended.
        assert_eq!(track.notes[0].start, 0.0);
        for pair in track.notes.windows(2) {
            assert!((pair[1].start - pair[0].end).abs() < 1e-12);
        }
    }

    #[test]
    fn zero_density_only_rests() {
        let mut rng = ScoreRng::new(5);
        let mut track = Track::new(1);
        let stats = scheduler(0.01)
            .populate_track(&mut track, &[0, 3, 7], &entry(0.0, 4.0, 0.0), &mut rng)
            .unwrap();
        assert!(track.notes.is_empty());
        assert!(stats.rests > 0);
        assert!(stats.elapsed >= 4.0);
    }

    #[test]
    fn traversal_can_stop_mid_row() {
        // One 1/4 s event fills a 0.1 s window, so a 12-step row stops after
        // its first position.
        let s = Scheduler::new(
            NoteEmitter::new(60, 120.0, 480, 100),
            vec![240],
            OctaveRange::new(60, (0, 0)).unwrap(),
            0.0,
        );
        let mut rng = ScoreRng::new(6);
        let mut track = Track::new(1);
        let material: Vec<i32> = (0..12).collect();
        let stats = s
            .populate_track(&mut track, &material, &entry(0.0, 0.1, 100.0), &mut rng)
            .unwrap();
        assert_eq!(stats.traversals, 1);
        assert_eq!(track.notes.len(), 1);
        assert_eq!(track.notes[0].end, 0.25);
    }

    #[test]
    fn pitches_follow_material_and_octave() {
        let s = Scheduler::new(
            NoteEmitter::new(60, 120.0, 480, 100),
            vec![240],
            OctaveRange::new(60, (0, 0)).unwrap(),
            0.0,
        );
        let mut rng = ScoreRng::new(7);
        let mut track = Track::new(1);
        s.populate_track(&mut track, &[0, 3, 7], &entry(0.0, 30.0, 100.0), &mut rng)
            .unwrap();
        let allowed = [60, 63, 67, 72, 69, 65];
        for note in &track.notes {
            assert!(allowed.contains(&note.pitch), "unexpected pitch {}", note.pitch);
        }
    }

    #[test]
    fn same_seed_same_notes() {
        let s = scheduler(0.3);
        let run = |seed| {
            let mut rng = ScoreRng::new(seed);
            let mut track = Track::new(1);
            s.populate_track(&mut track, &[2, 5, 9, 11], &entry(0.5, 12.0, 80.0), &mut rng)
                .unwrap();
            track.notes
        };
        assert_eq!(run(42), run(42));
        assert_ne!(run(42), run(43));
    }
}
