//! Order statistics over small numeric samples.

/// Linearly interpolated percentiles, one output per requested rank.
///
/// Uses the same piecewise-linear rule as NumPy's default `linear` method: the
/// fractional index `(n - 1) * rank / 100` is resolved against the sorted sample
/// and, when it falls between two positions, the neighbours are blended by
/// distance. Ranks outside `[0, 100]` are clamped. An empty sample yields an
/// empty output.
pub fn percentile(values: &[f64], ranks: &[f64]) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|left, right| left.total_cmp(right));
    let last_index = (sorted.len() - 1) as f64;

    ranks
        .iter()
        .map(|rank| {
            let x = last_index * (rank.clamp(0.0, 100.0) / 100.0);
            let floor = x.floor();
            let ceil = x.ceil();
            if floor == ceil {
                sorted[x as usize]
            } else {
                (ceil - x) * sorted[floor as usize] + (x - floor) * sorted[ceil as usize]
            }
        })
        .collect()
}
