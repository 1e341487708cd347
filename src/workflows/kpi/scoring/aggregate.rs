use super::config::KpiWeights;

/// Collapse `(score, weight)` pairs into a single rounded weighted average.
///
/// Returns 0 when the total weight is 0 (including the empty input). Scores
/// outside 0-100 pass through unclamped; input range is the caller's
/// contract.
pub fn weighted_average<I>(items: I) -> u32
where
    I: IntoIterator<Item = (u32, u32)>,
{
    let mut weighted_sum: u64 = 0;
    let mut total_weight: u64 = 0;

    for (score, weight) in items {
        weighted_sum += u64::from(score) * u64::from(weight);
        total_weight += u64::from(weight);
    }

    if total_weight == 0 {
        return 0;
    }

    (weighted_sum as f64 / total_weight as f64).round() as u32
}

/// Final cross-check total: `Σ scoreP_i · weight_i / 100`, rounded.
///
/// The divisor is the nominal 100, not the actual weight sum. Weights that do
/// not sum to 100 therefore scale the result instead of renormalizing; the
/// configuration editor is expected to catch those before save.
pub fn final_weighted_total(weights: KpiWeights, p1: u32, p2: u32, p3: u32) -> u32 {
    let sum = u64::from(p1) * u64::from(weights.p1)
        + u64::from(p2) * u64::from(weights.p2)
        + u64::from(p3) * u64::from(weights.p3);
    (sum as f64 / 100.0).round() as u32
}
