// MIDI output from generated scores.
//
// Converts a `Score` into a Standard MIDI File (SMF) for playback. The
// engine itself stops at timed notes per track; this module is the
// serializer the CLI hands them to.
//
// Output is SMF Format 1: track 0 carries the tempo, then one track per
// score track with its name (the color labels feeding it), a program change
// and the note on/off events. Note times in seconds are rounded to ticks at
// the score's tempo. Events are sorted by tick with note-offs ahead of
// note-ons at the same tick, so a note that starts where another ends on
// the same pitch is not cut off. Channels are handed out in track order,
// skipping the General MIDI percussion channel.
//
// Uses the `midly` crate for MIDI writing.

use crate::error::MidiError;
use crate::score::{Score, Track};
use midly::{
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind,
    num::{u4, u7, u15, u24, u28},
};
use std::path::Path;

/// Channel 10 in 1-based numbering, reserved for drums by General MIDI.
const PERCUSSION_CHANNEL: u8 = 9;

/// Largest value a variable-length delta (28 bits) can hold.
const MAX_DELTA: u64 = (1 << 28) - 1;

/// Largest tempo value (24 bits, microseconds per beat).
const MAX_TEMPO_MICROS: f64 = ((1 << 24) - 1) as f64;

/// Convert a Score to MIDI and write to a file.
pub fn write_midi(score: &Score, path: &Path) -> Result<(), MidiError> {
    let names: Vec<String> = score.tracks.iter().map(Track::label).collect();
    let smf = score_to_smf(score, &names)?;
    let mut buf = Vec::new();
    smf.write(&mut buf)
        .map_err(|e| MidiError::Encode(e.to_string()))?;
    std::fs::write(path, &buf).map_err(|source| MidiError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Melodic channels in allocation order (0-15 without 9).
fn melodic_channels() -> impl Iterator<Item = u8> {
    (0..16u8).filter(|&c| c != PERCUSSION_CHANNEL)
}

/// Convert a Score to an in-memory SMF. `names` holds one track name per
/// score track.
fn score_to_smf<'a>(score: &Score, names: &'a [String]) -> Result<Smf<'a>, MidiError> {
    if score.ticks_per_beat == 0 || score.ticks_per_beat > 0x7fff {
        return Err(MidiError::TicksPerBeat(score.ticks_per_beat));
    }
    let channel_count = melodic_channels().count();
    if score.tracks.len() > channel_count {
        return Err(MidiError::TooManyTracks(score.tracks.len()));
    }

    let mut smf = Smf::new(Header::new(
        Format::Parallel,
        Timing::Metrical(u15::new(score.ticks_per_beat)),
    ));

    // Track 0: tempo track
    let tempo_micros = (60_000_000.0 / score.tempo).round();
    if !tempo_micros.is_finite() || !(1.0..=MAX_TEMPO_MICROS).contains(&tempo_micros) {
        return Err(MidiError::Tempo(score.tempo));
    }
    let tempo_track = vec![
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(tempo_micros as u32))),
        },
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
        },
    ];
    smf.tracks.push(tempo_track);

    let ticks_per_second = f64::from(score.ticks_per_beat) * score.tempo / 60.0;
    for ((track, name), channel) in score.tracks.iter().zip(names).zip(melodic_channels()) {
        smf.tracks
            .push(track_events(track, name, u4::new(channel), ticks_per_second)?);
    }

    Ok(smf)
}

/// A note boundary at an absolute tick.
struct NoteEdge {
    tick: u64,
    on: bool,
    key: u8,
    vel: u8,
}

fn seconds_to_tick(seconds: f64, ticks_per_second: f64) -> Result<u64, MidiError> {
    let tick = (seconds * ticks_per_second).round();
    if !tick.is_finite() || tick < 0.0 || tick > u64::MAX as f64 {
        return Err(MidiError::TickOverflow(seconds));
    }
    Ok(tick as u64)
}

fn track_events<'a>(
    track: &Track,
    name: &'a str,
    channel: u4,
    ticks_per_second: f64,
) -> Result<Vec<TrackEvent<'a>>, MidiError> {
    let mut events = vec![
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::TrackName(name.as_bytes())),
        },
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Midi {
                channel,
                message: MidiMessage::ProgramChange {
                    program: u7::new(track.program.min(127)),
                },
            },
        },
    ];

    let mut edges = Vec::with_capacity(track.notes.len() * 2);
    for note in &track.notes {
        let start = seconds_to_tick(note.start, ticks_per_second)?;
        // A note shorter than a tick still gets one tick so its off event
        // cannot sort ahead of its own on event.
        let end = seconds_to_tick(note.end, ticks_per_second)?.max(start + 1);
        let key = note.pitch.min(127);
        edges.push(NoteEdge {
            tick: start,
            on: true,
            key,
            vel: note.velocity.min(127),
        });
        edges.push(NoteEdge {
            tick: end,
            on: false,
            key,
            vel: 0,
        });
    }
    // Stable sort keeps generation order among simultaneous edges.
    edges.sort_by_key(|e| (e.tick, e.on));

    let mut last_tick = 0u64;
    for edge in edges {
        let delta = edge.tick - last_tick;
        if delta > MAX_DELTA {
            return Err(MidiError::TickOverflow(edge.tick as f64 / ticks_per_second));
        }
        let message = if edge.on {
            MidiMessage::NoteOn {
                key: u7::new(edge.key),
                vel: u7::new(edge.vel),
            }
        } else {
            MidiMessage::NoteOff {
                key: u7::new(edge.key),
                vel: u7::new(edge.vel),
            }
        };
        events.push(TrackEvent {
            delta: u28::new(delta as u32),
            kind: TrackEventKind::Midi { channel, message },
        });
        last_tick = edge.tick;
    }

    events.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });
    Ok(events)
}
