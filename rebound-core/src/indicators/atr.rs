//! Average True Range (ATR), Wilder-smoothed.
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|).
//! ATR uses Wilder smoothing (EMA with alpha = 1/period), seeded with the
//! mean of the first `period` true ranges. Needs `period + 1` bars: TR has no
//! previous close at index 0, so the series starts at index 1.

use crate::domain::Bar;

/// True Range series. TR[0] is NaN (no previous close); a void bar or a void
/// previous close yields NaN at that index.
pub fn true_range(bars: &[Bar]) -> Vec<f64> {
    let mut tr = vec![f64::NAN; bars.len()];
    for i in 1..bars.len() {
        let h = bars[i].high;
        let l = bars[i].low;
        let pc = bars[i - 1].close;
        if h.is_nan() || l.is_nan() || pc.is_nan() {
            continue;
        }
        tr[i] = (h - l).max((h - pc).abs()).max((l - pc).abs());
    }
    tr
}

/// Wilder-smoothed ATR series aligned to `bars`.
///
/// The seed forms at the first run of `period` consecutive valid true ranges;
/// indices before that are NaN. Once seeded, a NaN true range poisons the rest
/// of the series — the caller decides how to treat void stretches.
pub fn atr(bars: &[Bar], period: usize) -> Vec<f64> {
    let tr = true_range(bars);
    let n = tr.len();
    let mut out = vec![f64::NAN; n];
    if period == 0 || n == 0 {
        return out;
    }

    let alpha = 1.0 / period as f64;
    let mut window_sum = 0.0;
    let mut window_len = 0usize;
    let mut smoothed: Option<f64> = None;

    for i in 0..n {
        match smoothed {
            Some(prev) => {
                if tr[i].is_nan() {
                    return out;
                }
                let next = alpha * tr[i] + (1.0 - alpha) * prev;
                out[i] = next;
                smoothed = Some(next);
            }
            None => {
                if tr[i].is_nan() {
                    window_sum = 0.0;
                    window_len = 0;
                    continue;
                }
                window_sum += tr[i];
                window_len += 1;
                if window_len == period {
                    let seed = window_sum / period as f64;
                    out[i] = seed;
                    smoothed = Some(seed);
                }
            }
        }
    }

    out
}
