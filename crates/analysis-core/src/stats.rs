//! Numeric helpers shared by the indicator, planning and decision layers.

/// Compute the mean of a data slice.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Compute sample standard deviation (n - 1 denominator).
pub fn std_dev(data: &[f64]) -> f64 {
    if data.len() < 2 {
        return 0.0;
    }
    let m = mean(data);
    let variance = data.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (data.len() - 1) as f64;
    variance.sqrt()
}

/// Bar-over-bar fractional change. The output is one shorter than the input;
/// changes from a zero base are skipped.
pub fn pct_change(data: &[f64]) -> Vec<f64> {
    data.windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect()
}

/// Volatility of a close series: std-dev of daily returns, in percent.
pub fn return_volatility_pct(closes: &[f64]) -> f64 {
    std_dev(&pct_change(closes)) * 100.0
}

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Upper bound for price precision
pub const MAX_PRICE_DECIMALS: u32 = 12;

/// Decimal places that keep four significant digits of a sub-unit price,
/// never fewer than `min_decimals`.
pub fn price_decimals(value: f64, min_decimals: u32) -> u32 {
    if !value.is_finite() || value <= 0.0 || value >= 1.0 {
        return min_decimals;
    }
    let leading_zeros = (-value.log10()).floor().max(0.0) as u32;
    (leading_zeros + 4).clamp(min_decimals, MAX_PRICE_DECIMALS.max(min_decimals))
}

/// Smallest price step at `decimals` places
pub fn tick(decimals: u32) -> f64 {
    10f64.powi(-(decimals as i32))
}

/// Relative float equality used for boundary comparisons between a price and its averages.
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}
