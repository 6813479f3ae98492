//! Exponentially weighted moving averages.
//!
//! Recursive form seeded with the first observation:
//! `y[0] = x[0]`, `y[t] = (1 - alpha) * y[t-1] + alpha * x[t]`.

/// Full EWM series for a smoothing factor `alpha` in (0, 1].
pub fn ewm(values: &[f64], alpha: f64) -> Vec<f64> {
    let mut result = Vec::with_capacity(values.len());
    let mut iter = values.iter();
    let Some(&first) = iter.next() else {
        return result;
    };

    let mut current = first;
    result.push(current);
    for &value in iter {
        current = (1.0 - alpha) * current + alpha * value;
        result.push(current);
    }
    result
}

/// EWM with `alpha = 2 / (span + 1)`.
pub fn ewm_span(values: &[f64], span: usize) -> Vec<f64> {
    ewm(values, 2.0 / (span as f64 + 1.0))
}

/// EWM with `alpha = 1 / (com + 1)`. Wilder smoothing over `period` is
/// `com = period - 1`.
pub fn ewm_com(values: &[f64], com: usize) -> Vec<f64> {
    ewm(values, 1.0 / (com as f64 + 1.0))
}
