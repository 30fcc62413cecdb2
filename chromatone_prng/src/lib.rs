// Deterministic, portable pseudo-random number generator.
//
// Implements xoshiro256++ (Blackman & Vigna, 2019) with SplitMix64 seeding.
// The generator core is hand-rolled so that a given seed produces the same
// raw stream on every platform (`StdRng` makes no such promise). It plugs
// into the `rand` ecosystem by implementing `rand_core::RngCore` and
// `SeedableRng`, so the score engine can take `&mut impl rand::Rng`
// everywhere and still be replayed from a `u64` seed. Only the raw stream is
// pinned: values derived through `rand` (shuffles, ranges, weighted picks)
// are reproducible for a fixed `rand` version.
//
// **Critical constraint: determinism.** Every method on `ScoreRng` must
// produce identical output given the same prior state, regardless of
// platform, compiler version, or optimization level. Do not use
// floating-point arithmetic in the core generator.

use rand_core::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

/// Xoshiro256++ PRNG, the single source of randomness for one generation run.
///
/// The tone row, row-form choices, octave shifts, durations, rests and
/// stutters are all drawn from one `ScoreRng` in call order, so two runs from
/// the same seed over the same entries emit identical note streams.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRng {
    s: [u64; 4],
}

impl ScoreRng {
    /// Create a new PRNG seeded from a `u64`.
    ///
    /// Uses SplitMix64 to expand the seed into the 256-bit internal state.
    pub fn new(seed: u64) -> Self {
        let mut sm = seed;
        Self {
            s: [
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
            ],
        }
    }

    /// Generate the next `u64` in the sequence.
    pub fn next_u64(&mut self) -> u64 {
        let result = (self.s[0].wrapping_add(self.s[3]))
            .rotate_left(23)
            .wrapping_add(self.s[0]);

        let t = self.s[1] << 17;

        self.s[2] ^= self.s[0];
        self.s[3] ^= self.s[1];
        self.s[1] ^= self.s[2];
        self.s[0] ^= self.s[3];

        self.s[2] ^= t;
        self.s[3] = self.s[3].rotate_left(45);

        result
    }

    /// Generate a `u32` by taking the upper 32 bits of a `u64`.
    pub fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }
}

impl RngCore for ScoreRng {
    fn next_u32(&mut self) -> u32 {
        ScoreRng::next_u32(self)
    }

    fn next_u64(&mut self) -> u64 {
        ScoreRng::next_u64(self)
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        for chunk in dst.chunks_mut(8) {
            let bytes = ScoreRng::next_u64(self).to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}

impl SeedableRng for ScoreRng {
    type Seed = [u8; 32];

    /// Build the state directly from 32 little-endian bytes.
    ///
    /// xoshiro must never run from an all-zero state, so an all-zero seed
    /// falls back to the SplitMix64 expansion of 0.
    fn from_seed(seed: Self::Seed) -> Self {
        let mut s = [0u64; 4];
        for (word, bytes) in s.iter_mut().zip(seed.chunks_exact(8)) {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(bytes);
            *word = u64::from_le_bytes(buf);
        }
        if s == [0; 4] {
            return Self::new(0);
        }
        Self { s }
    }

    fn seed_from_u64(state: u64) -> Self {
        Self::new(state)
    }
}

/// SplitMix64, used only for seeding xoshiro256++ from a single `u64`.
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
