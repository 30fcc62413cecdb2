// Chromatone score generator: CLI entry point.
//
// Reads a JSON array of color-region entries (as produced by the frame
// color detector), generates one instrument track per palette program and
// writes the result as a MIDI file.
// The pipeline: load config -> load entries -> build generator (fixes the
// tone row) -> generate -> MIDI output (+ optional JSON dump).
//
// Usage:
//   chromatone <ENTRIES_JSON> [--output output.mid] [--config FILE]
//     [--seed N] [--tempo BPM] [--base-note N] [--skip-unknown]
//     [--dump-json FILE] [-v]
//
// Without --seed a seed is taken from the clock and logged, so any run can
// be reproduced.

use chromatone_prng::ScoreRng;
use chromatone_score::config::GeneratorConfig;
use chromatone_score::entry::load_entries;
use chromatone_score::generator::ScoreGenerator;
use chromatone_score::midi::write_midi;
use clap::Parser;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Generate a MIDI file from color-region JSON data")]
struct Args {
    /// Path to the JSON file containing the entries
    #[arg(value_name = "ENTRIES_JSON")]
    entries: PathBuf,

    /// Output MIDI file path
    #[arg(long, default_value = "output.mid")]
    output: PathBuf,

    /// Generator config JSON (missing fields use defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    /// RNG seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Tempo in BPM (overrides config)
    #[arg(long)]
    tempo: Option<f64>,

    /// Base MIDI note (overrides config)
    #[arg(long)]
    base_note: Option<u8>,

    /// Skip entries whose color has no instrument instead of failing
    #[arg(long, default_value_t = false)]
    skip_unknown: bool,

    /// Also write the generated score as JSON
    #[arg(long)]
    dump_json: Option<PathBuf>,

    /// Log per-entry details
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => {
            info!(path = %path.display(), "loading config");
            GeneratorConfig::load(path)?
        }
        None => GeneratorConfig::default(),
    };
    if let Some(tempo) = args.tempo {
        config.tempo = tempo;
    }
    if let Some(base_note) = args.base_note {
        config.base_note = base_note;
    }

    let entries = load_entries(&args.entries)?;
    info!(path = %args.entries.display(), entries = entries.len(), "loaded entries");

    let seed = args.seed.unwrap_or_else(clock_seed);
    info!(seed, "seeding generator");
    let mut rng = ScoreRng::new(seed);

    let generator = ScoreGenerator::new(config, &mut rng)?;
    info!(
        row = ?generator.tone_row().values(),
        tempo = generator.config().tempo,
        base_note = generator.config().base_note,
        "tone row"
    );

    let score = if args.skip_unknown {
        let generation = generator.generate_lenient(&entries, &mut rng)?;
        if !generation.skipped.is_empty() {
            warn!(skipped = generation.skipped.len(), "some entries were skipped");
        }
        generation.score
    } else {
        generator.generate(&entries, &mut rng)?
    };
    for line in score.summary().lines() {
        info!("{line}");
    }

    if let Some(path) = &args.dump_json {
        std::fs::write(path, serde_json::to_string_pretty(&score)?)?;
        info!(path = %path.display(), "score written as JSON");
    }

    write_midi(&score, &args.output)?;
    info!(duration_seconds = score.end_time(), "done");
    println!("MIDI file generated: {}", args.output.display());
    Ok(())
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}
