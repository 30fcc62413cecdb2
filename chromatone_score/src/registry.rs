// Color-to-instrument resolution and lazy track creation.
//
// The palette maps an upstream color label to a General MIDI program. The
// registry creates one `Track` per program the first time any color needs
// it and hands the same track back afterwards, so several colors mapped to
// one program share a track. Tracks are kept in creation order and never
// removed.

use crate::error::UnknownColor;
use crate::score::Track;
use std::collections::BTreeMap;

/// Palette used by the upstream color detector.
pub fn default_palette() -> BTreeMap<String, u8> {
    [
        ("red", 1),
        ("blue", 40),
        ("green", 70),
        ("yellow", 50),
        ("orange", 60),
        ("purple", 90),
    ]
    .into_iter()
    .map(|(color, program)| (color.to_string(), program))
    .collect()
}

#[derive(Debug, Clone)]
pub struct TrackRegistry {
    palette: BTreeMap<String, u8>,
    tracks: Vec<Track>,
    by_program: BTreeMap<u8, usize>,
}

impl TrackRegistry {
    pub fn new(palette: BTreeMap<String, u8>) -> Self {
        TrackRegistry {
            palette,
            tracks: Vec::new(),
            by_program: BTreeMap::new(),
        }
    }

    /// Program number mapped to `color`, if any.
    pub fn program_for(&self, color: &str) -> Option<u8> {
        self.palette.get(color).copied()
    }

    /// Resolve `color` to its track, creating the track on first use.
    pub fn resolve(&mut self, color: &str) -> Result<&mut Track, UnknownColor> {
        let program = self
            .program_for(color)
            .ok_or_else(|| UnknownColor(color.to_string()))?;
        let idx = match self.by_program.get(&program) {
            Some(&idx) => idx,
            None => {
                self.tracks.push(Track::new(program));
                let idx = self.tracks.len() - 1;
                self.by_program.insert(program, idx);
                idx
            }
        };
        let track = &mut self.tracks[idx];
        track.add_color(color);
        Ok(track)
    }

    pub fn track(&self, program: u8) -> Option<&Track> {
        self.by_program.get(&program).map(|&idx| &self.tracks[idx])
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn into_tracks(self) -> Vec<Track> {
        self.tracks
    }
}
