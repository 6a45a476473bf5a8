//! Rolling return statistics used by the shock detector.

/// 1-day percent change series. Index 0 is NaN; a NaN close (void bar)
/// poisons the return at that index and the next.
pub fn pct_returns(closes: &[f64]) -> Vec<f64> {
    let mut out = vec![f64::NAN; closes.len()];
    for i in 1..closes.len() {
        let prev = closes[i - 1];
        if prev != 0.0 {
            out[i] = closes[i] / prev - 1.0;
        }
    }
    out
}

/// Population standard deviation (ddof = 0) of a slice.
/// NaN if the slice is empty or contains NaN.
pub fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() || values.iter().any(|v| v.is_nan()) {
        return f64::NAN;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    var.sqrt()
}
