// Tone rows and the four row forms.
//
// A `ToneRow` is the private twelve-tone permutation one generator draws at
// construction time. Entries never see the row directly: their `segments`
// are indices into it, and `pitch_classes` turns those indices into the
// semitone offsets that one traversal plays.
//
// `RowForm` is the per-traversal transformation. Inversion mirrors around 12
// (`v -> 12 - v`) without reducing modulo 12, so an inverted row spans 1..=12
// rather than 0..=11. Retrograde-inversion reverses first and then inverts.
// Both are kept exactly as the rest of the pipeline expects them; the
// emitter clamps the final pitch anyway.

use crate::error::RowError;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Number of pitch classes in a row.
pub const ROW_LEN: usize = 12;

/// Axis used by the inversion map `v -> INVERSION_AXIS - v`.
pub const INVERSION_AXIS: i32 = 12;

/// A permutation of the pitch classes 0-11.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToneRow([u8; ROW_LEN]);

impl ToneRow {
    /// Draw a uniformly random permutation of 0-11.
    pub fn generate(rng: &mut impl Rng) -> Self {
        let mut values: [u8; ROW_LEN] = std::array::from_fn(|i| i as u8);
        values.shuffle(rng);
        ToneRow(values)
    }

    /// Build a row from explicit values, rejecting anything that is not a
    /// permutation of 0-11.
    pub fn from_values(values: &[u8]) -> Result<Self, RowError> {
        if values.len() != ROW_LEN {
            return Err(RowError::WrongLength(values.len()));
        }
        let mut seen = [false; ROW_LEN];
        let mut row = [0u8; ROW_LEN];
        for (slot, &v) in row.iter_mut().zip(values) {
            let idx = usize::from(v);
            if idx >= ROW_LEN {
                return Err(RowError::ValueOutOfRange(v));
            }
            if seen[idx] {
                return Err(RowError::Duplicate(v));
            }
            seen[idx] = true;
            *slot = v;
        }
        Ok(ToneRow(row))
    }

    pub fn values(&self) -> &[u8; ROW_LEN] {
        &self.0
    }

    /// Look up each segment index in the row. Indices may repeat.
    pub fn pitch_classes(&self, segments: &[usize]) -> Result<Vec<i32>, RowError> {
        segments
            .iter()
            .map(|&i| {
                self.0
                    .get(i)
                    .map(|&v| i32::from(v))
                    .ok_or(RowError::IndexOutOfRange(i))
            })
            .collect()
    }
}

/// The four classical row transformations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RowForm {
    Prime,
    Inversion,
    Retrograde,
    RetrogradeInversion,
}

impl RowForm {
    pub const ALL: [RowForm; 4] = [
        RowForm::Prime,
        RowForm::Inversion,
        RowForm::Retrograde,
        RowForm::RetrogradeInversion,
    ];

    /// Pick one of the four forms with equal probability.
    pub fn random(rng: &mut impl Rng) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    /// Transform a sequence of semitone offsets. The output has the same
    /// length as the input.
    pub fn apply(self, offsets: &[i32]) -> Vec<i32> {
        match self {
            RowForm::Prime => offsets.to_vec(),
            RowForm::Inversion => invert(offsets),
            RowForm::Retrograde => offsets.iter().rev().copied().collect(),
            RowForm::RetrogradeInversion => {
                let reversed: Vec<i32> = offsets.iter().rev().copied().collect();
                invert(&reversed)
            }
        }
    }
}

fn invert(offsets: &[i32]) -> Vec<i32> {
    offsets.iter().map(|&v| INVERSION_AXIS - v).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chromatone_prng::ScoreRng;

    #[test]
    fn generated_rows_are_permutations() {
        let mut rng = ScoreRng::new(1);
        for _ in 0..500 {
            let row = ToneRow::generate(&mut rng);
            let mut sorted = *row.values();
            sorted.sort_unstable();
            let expected: [u8; ROW_LEN] = std::array::from_fn(|i| i as u8);
            assert_eq!(sorted, expected, "not a permutation: {:?}", row.values());
        }
    }

    #[test]
    fn generation_is_seed_deterministic() {
        let a = ToneRow::generate(&mut ScoreRng::new(99));
        let b = ToneRow::generate(&mut ScoreRng::new(99));
        assert_eq!(a, b);
    }

    #[test]
    fn from_values_rejects_non_permutations() {
        assert_eq!(ToneRow::from_values(&[0, 1, 2]), Err(RowError::WrongLength(3)));
        assert_eq!(
            ToneRow::from_values(&[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 12]),
            Err(RowError::ValueOutOfRange(12))
        );
        assert_eq!(
            ToneRow::from_values(&[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 10]),
            Err(RowError::Duplicate(10))
        );
        assert!(ToneRow::from_values(&[11, 10, 9, 8, 7, 6, 5, 4, 3, 2, 1, 0]).is_ok());
    }

    #[test]
    fn pitch_classes_follow_segment_indices() {
        let row = ToneRow::from_values(&[4, 9, 2, 7, 0, 5, 10, 3, 8, 1, 6, 11]).unwrap();
        assert_eq!(row.pitch_classes(&[0, 3, 7, 0]).unwrap(), vec![4, 7, 3, 4]);
        assert_eq!(row.pitch_classes(&[12]), Err(RowError::IndexOutOfRange(12)));
    }

    #[test]
    fn inversion_is_not_reduced_modulo_twelve() {
        assert_eq!(RowForm::Inversion.apply(&[0, 1, 11]), vec![12, 11, 1]);
    }

    #[test]
    fn retrograde_inversion_reverses_then_inverts() {
        assert_eq!(RowForm::RetrogradeInversion.apply(&[0, 3, 7]), vec![5, 9, 12]);
    }

    #[test]
    fn inversion_and_retrograde_are_involutions() {
        let mut rng = ScoreRng::new(2024);
        for _ in 0..200 {
            let row: Vec<i32> = ToneRow::generate(&mut rng)
                .values()
                .iter()
                .map(|&v| i32::from(v))
                .collect();
            let twice_inverted = RowForm::Inversion.apply(&RowForm::Inversion.apply(&row));
            assert_eq!(twice_inverted, row);
            let twice_reversed = RowForm::Retrograde.apply(&RowForm::Retrograde.apply(&row));
            assert_eq!(twice_reversed, row);
            assert_eq!(RowForm::Prime.apply(&row), row);
        }
    }

    #[test]
    fn every_form_is_eventually_chosen() {
        let mut rng = ScoreRng::new(5);
        let mut seen = [false; 4];
        for _ in 0..200 {
            let form = RowForm::random(&mut rng);
            let idx = RowForm::ALL.iter().position(|&f| f == form).unwrap();
            seen[idx] = true;
        }
        assert!(seen.iter().all(|&s| s), "forms seen: {:?}", seen);
    }
}
