//! Order statistics over resolution times.

/// Median of an unsorted sample; mean of the two middle values for even sizes.
/// Returns 0.0 for an empty sample.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let sorted = sorted(values);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}

/// `n - 1` cut points dividing the sample into `n` equal-probability bins,
/// using the exclusive method (sample treated as drawn from a wider population).
///
/// Requires at least two values and `n >= 1`; returns an empty vector otherwise.
pub fn quantiles_exclusive(values: &[f64], n: usize) -> Vec<f64> {
    let len = values.len();
    if len < 2 || n < 1 {
        return Vec::new();
    }

    let data = sorted(values);
    let m = len + 1;
    let nf = n as f64;

    (1..n)
        .map(|i| {
            // Integer arithmetic keeps the interpolation weights exact.
            let j = (i * m / n).clamp(1, len - 1);
            let delta = (i * m) as i64 - (j * n) as i64;
            (data[j - 1] * (nf - delta as f64) + data[j] * delta as f64) / nf
        })
        .collect()
}

/// 95th percentile: 19th of 20 cut points, or the lone value / 0.0 for tiny samples.
pub fn p95(values: &[f64]) -> f64 {
    match values.len() {
        0 => 0.0,
        1 => values[0],
        _ => quantiles_exclusive(values, 20)[18],
    }
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut data = values.to_vec();
    data.sort_by(f64::total_cmp);
    data
}
