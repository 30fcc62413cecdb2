// The score generator: entries in, multi-track score out.
//
// `ScoreGenerator` is built once from a validated `GeneratorConfig` and an
// RNG. Construction fixes the tone row (drawn from the RNG unless the config
// pins one) and the timing used for every note. Generation then walks the
// entries strictly in input order: resolve the entry's color to a track,
// map its segments through the tone row, and hand both to the scheduler.
//
// The generator holds no mutable state of its own. Tracks live in a
// `TrackRegistry` owned by the caller of `process_entry` (or by `generate`
// for the whole run), and the RNG is passed in explicitly, so a given seed
// and input always give the same score.
//
// Two failure policies are offered for unknown colors:
// - `generate` stops at the first one (nothing partial is returned);
// - `generate_lenient` skips the entry, logs it and reports it back.
// Range validation of all entries happens up front in both.

use crate::config::GeneratorConfig;
use crate::entry::{Entry, validate_entries};
use crate::error::GenerateError;
use crate::registry::TrackRegistry;
use crate::row::ToneRow;
use crate::schedule::{PopulateStats, Scheduler};
use crate::score::Score;
use rand::Rng;
use tracing::{debug, info, warn};

/// An entry that `generate_lenient` could not place.
#[derive(Debug)]
pub struct SkippedEntry {
    pub index: usize,
    pub error: GenerateError,
}

/// Output of `generate_lenient`.
#[derive(Debug)]
pub struct Generation {
    pub score: Score,
    pub skipped: Vec<SkippedEntry>,
}

#[derive(Debug, Clone)]
pub struct ScoreGenerator {
    config: GeneratorConfig,
    row: ToneRow,
    scheduler: Scheduler,
}

impl ScoreGenerator {
    /// Validate `config` and fix the tone row.
    pub fn new(config: GeneratorConfig, rng: &mut impl Rng) -> Result<Self, GenerateError> {
        config.validate()?;
        let row = match &config.tone_row {
            Some(values) => ToneRow::from_values(values)?,
            None => ToneRow::generate(rng),
        };
        let scheduler = Scheduler::from_config(&config)?;
        debug!(
            row = ?row.values(),
            tempo = config.tempo,
            base_note = config.base_note,
            "generator ready"
        );
        Ok(ScoreGenerator {
            config,
            row,
            scheduler,
        })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn tone_row(&self) -> &ToneRow {
        &self.row
    }

    /// Fresh registry over this generator's palette.
    pub fn registry(&self) -> TrackRegistry {
        TrackRegistry::new(self.config.palette.clone())
    }

    /// Populate the track for one entry. `index` is only used in errors and
    /// logs. The entry is assumed to be range-validated.
    pub fn process_entry(
        &self,
        registry: &mut TrackRegistry,
        index: usize,
        entry: &Entry,
        rng: &mut impl Rng,
    ) -> Result<PopulateStats, GenerateError> {
        let material = self.row.pitch_classes(&entry.segments)?;
        let track = registry
            .resolve(&entry.color)
            .map_err(|e| GenerateError::UnknownColor {
                index,
                color: e.0,
            })?;
        let program = track.program;
        let stats = self.scheduler.populate_track(track, &material, entry, rng)?;
        debug!(
            index,
            color = %entry.color,
            program,
            notes = stats.notes,
            rests = stats.rests,
            traversals = stats.traversals,
            "entry populated"
        );
        Ok(stats)
    }

    /// Generate a score from `entries`, failing on the first bad entry.
    pub fn generate(&self, entries: &[Entry], rng: &mut impl Rng) -> Result<Score, GenerateError> {
        validate_entries(entries)?;
        let mut registry = self.registry();
        for (index, entry) in entries.iter().enumerate() {
            self.process_entry(&mut registry, index, entry, rng)?;
        }
        let score = self.finish(registry);
        info!(
            entries = entries.len(),
            tracks = score.tracks.len(),
            notes = score.note_count(),
            "score generated"
        );
        Ok(score)
    }

    /// Generate a score from `entries`, skipping entries whose color is not
    /// in the palette. Range validation still fails the whole run.
    pub fn generate_lenient(
        &self,
        entries: &[Entry],
        rng: &mut impl Rng,
    ) -> Result<Generation, GenerateError> {
        validate_entries(entries)?;
        let mut registry = self.registry();
        let mut skipped = Vec::new();
        for (index, entry) in entries.iter().enumerate() {
            match self.process_entry(&mut registry, index, entry, rng) {
                Ok(_) => {}
                Err(error @ GenerateError::UnknownColor { .. }) => {
                    warn!(index, color = %entry.color, "skipping entry with unknown color");
                    skipped.push(SkippedEntry { index, error });
                }
                Err(e) => return Err(e),
            }
        }
        let score = self.finish(registry);
        info!(
            entries = entries.len(),
            skipped = skipped.len(),
            tracks = score.tracks.len(),
            notes = score.note_count(),
            "score generated"
        );
        Ok(Generation { score, skipped })
    }

    /// Package a registry's tracks with this generator's timing.
    pub fn finish(&self, registry: TrackRegistry) -> Score {
        Score {
            tempo: self.config.tempo,
            base_note: self.config.base_note,
            ticks_per_beat: self.config.ticks_per_beat,
            tracks: registry.into_tracks(),
        }
    }
}
