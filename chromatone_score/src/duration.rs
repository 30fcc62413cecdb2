// Area-weighted duration selection.
//
// Each candidate duration `i` of `N` gets the weight
// `sigmoid(10 * (area - i / N))`; the weights are normalized and one
// candidate is drawn from the resulting categorical distribution. A small
// region (area near 0) puts almost all weight on the first, shortest
// candidate. As the area grows the later candidates catch up and the
// distribution flattens toward uniform.

use crate::error::GenerateError;
use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;

/// Slope of the logistic curve applied to `area - i / N`.
pub const DURATION_STEEPNESS: f64 = 10.0;

pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Normalized selection weights for `count` candidates at the given area.
pub fn duration_weights(area: f64, count: usize) -> Vec<f64> {
    let n = count as f64;
    let raw: Vec<f64> = (0..count)
        .map(|i| sigmoid(DURATION_STEEPNESS * (area - i as f64 / n)))
        .collect();
    let total: f64 = raw.iter().sum();
    raw.into_iter().map(|w| w / total).collect()
}

/// Draw one duration (in ticks) from `candidates`, biased by `area`.
pub fn select_duration(
    area: f64,
    candidates: &[u32],
    rng: &mut impl Rng,
) -> Result<u32, GenerateError> {
    let weights = duration_weights(area, candidates.len());
    let dist =
        WeightedIndex::new(&weights).map_err(|e| GenerateError::DurationWeights(e.to_string()))?;
    Ok(candidates[dist.sample(rng)])
}
