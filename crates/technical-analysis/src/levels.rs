use analysis_core::Bar;
use serde::{Deserialize, Serialize};

/// Retracement ratios measured down from the series high
pub const FIB_RATIOS: [f64; 5] = [0.236, 0.382, 0.5, 0.618, 0.786];

/// Classic floor-trader pivot levels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PivotLevels {
    pub pivot: f64,
    pub r1: f64,
    pub r2: f64,
    pub s1: f64,
    pub s2: f64,
}

impl PivotLevels {
    pub fn from_bar(bar: &Bar) -> Self {
        let pivot = bar.typical_price();
        let range = bar.high - bar.low;
        Self {
            pivot,
            r1: 2.0 * pivot - bar.low,
            r2: pivot + range,
            s1: 2.0 * pivot - bar.high,
            s2: pivot - range,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FibonacciLevels {
    pub high: f64,
    pub low: f64,
    pub fib_23_6: f64,
    pub fib_38_2: f64,
    pub fib_50: f64,
    pub fib_61_8: f64,
    pub fib_78_6: f64,
}

impl FibonacciLevels {
    /// Levels over the highest high and lowest low of the whole series.
    /// With a zero range every level equals the high.
    pub fn from_bars(bars: &[Bar]) -> Option<Self> {
        if bars.is_empty() {
            return None;
        }
        let high = bars.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
        let low = bars.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
        Some(Self::from_range(high, low))
    }

    pub fn from_range(high: f64, low: f64) -> Self {
        let diff = (high - low).max(0.0);
        let level = |ratio: f64| high - diff * ratio;
        Self {
            high,
            low,
            fib_23_6: level(FIB_RATIOS[0]),
            fib_38_2: level(FIB_RATIOS[1]),
            fib_50: level(FIB_RATIOS[2]),
            fib_61_8: level(FIB_RATIOS[3]),
            fib_78_6: level(FIB_RATIOS[4]),
        }
    }

    /// Named levels in ratio order
    pub fn levels(&self) -> [(&'static str, f64); 5] {
        [
            ("Fib_23.6", self.fib_23_6),
            ("Fib_38.2", self.fib_38_2),
            ("Fib_50", self.fib_50),
            ("Fib_61.8", self.fib_61_8),
            ("Fib_78.6", self.fib_78_6),
        ]
    }
}

/// Price interval with elevated trading frequency
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SrZone {
    pub low: f64,
    pub high: f64,
}

impl SrZone {
    pub fn contains(&self, price: f64) -> bool {
        price >= self.low && price <= self.high
    }
}

/// Bucket the trailing `window` closes into `bins` equal-width bins and return the
/// `top` most populated bins as zones ordered by increasing price.
///
/// Ties in frequency go to the higher-priced bin. Empty bins never become zones.
/// A window with zero price range yields no zones.
pub fn sr_zones(closes: &[f64], window: usize, bins: usize, top: usize) -> Vec<SrZone> {
    let tail = &closes[closes.len().saturating_sub(window)..];
    if tail.is_empty() || bins == 0 || top == 0 {
        return Vec::new();
    }

    let lo = tail.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = tail.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = hi - lo;
    if range <= 0.0 {
        return Vec::new();
    }

    let edges: Vec<f64> = (0..=bins).map(|i| lo + range * i as f64 / bins as f64).collect();
    let mut counts = vec![0usize; bins];

    for &close in tail {
        let mut idx = (((close - lo) / range) * bins as f64) as usize;
        idx = idx.min(bins - 1);
        // Keep the bin consistent with the edge values after rounding
        if idx > 0 && close < edges[idx] {
            idx -= 1;
        } else if idx < bins - 1 && close >= edges[idx + 1] {
            idx += 1;
        }
        counts[idx] += 1;
    }

    let mut ranked: Vec<usize> = (0..bins).filter(|&i| counts[i] > 0).collect();
    ranked.sort_by(|&a, &b| counts[b].cmp(&counts[a]).then(b.cmp(&a)));
    ranked.truncate(top);
    ranked.sort_unstable();

    ranked
        .into_iter()
        .map(|i| SrZone {
            low: edges[i],
            high: edges[i + 1],
        })
        .collect()
}

/// Indices of local maxima, with flat tops resolved to their middle sample
fn local_maxima(values: &[f64]) -> Vec<usize> {
    let mut peaks = Vec::new();
    if values.len() < 3 {
        return peaks;
    }

    let last = values.len() - 1;
    let mut i = 1;
    while i < last {
        if values[i - 1] < values[i] {
            let mut ahead = i + 1;
            while ahead < last && values[ahead] == values[i] {
                ahead += 1;
            }
            if values[ahead] < values[i] {
                peaks.push((i + ahead - 1) / 2);
                i = ahead;
            }
        }
        i += 1;
    }
    peaks
}

/// Local maxima separated by at least `distance` samples. Higher peaks win;
/// a lower peak closer than `distance` to a kept one is discarded.
pub fn find_peaks(values: &[f64], distance: usize) -> Vec<usize> {
    let peaks = local_maxima(values);
    if distance <= 1 || peaks.len() < 2 {
        return peaks;
    }

    let mut by_height: Vec<usize> = (0..peaks.len()).collect();
    by_height.sort_by(|&a, &b| {
        values[peaks[a]]
            .partial_cmp(&values[peaks[b]])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });

    let mut keep = vec![true; peaks.len()];
    for &j in by_height.iter().rev() {
        if !keep[j] {
            continue;
        }
        let mut k = j;
        while k > 0 && peaks[j] - peaks[k - 1] < distance {
            keep[k - 1] = false;
            k -= 1;
        }
        let mut k = j + 1;
        while k < peaks.len() && peaks[k] - peaks[j] < distance {
            keep[k] = false;
            k += 1;
        }
    }

    peaks
        .into_iter()
        .zip(keep)
        .filter_map(|(p, kept)| kept.then_some(p))
        .collect()
}

/// Long-run support and resistance from swing extrema of the close series
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SwingLevels {
    pub long_support: Option<f64>,
    pub long_resistance: Option<f64>,
}

impl SwingLevels {
    pub fn detect(closes: &[f64], distance: usize) -> Self {
        let highs = find_peaks(closes, distance);
        let inverted: Vec<f64> = closes.iter().map(|c| -c).collect();
        let lows = find_peaks(&inverted, distance);

        let long_resistance = highs.iter().map(|&i| closes[i]).reduce(f64::max);
        let long_support = lows.iter().map(|&i| closes[i]).reduce(f64::min);

        Self {
            long_support,
            long_resistance,
        }
    }
}

/// Every price level derived from a series, threaded explicitly to scoring and planning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelSet {
    pub fibonacci: FibonacciLevels,
    /// Pivot levels of the most recent bar
    pub pivot: PivotLevels,
    pub swing: SwingLevels,
    pub zones: Vec<SrZone>,
}
