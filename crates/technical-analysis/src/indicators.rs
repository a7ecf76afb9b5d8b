use analysis_core::stats::std_dev;
use analysis_core::Bar;

/// Denominators at or below this are treated as zero.
const EPSILON: f64 = 1e-12;

/// Rolling mean over an optional series. A window containing any undefined value is undefined.
pub fn rolling_mean(data: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; data.len()];
    if period == 0 || data.len() < period {
        return result;
    }

    for i in period - 1..data.len() {
        let window = &data[i + 1 - period..=i];
        if window.iter().all(Option::is_some) {
            let sum: f64 = window.iter().flatten().sum();
            result[i] = Some(sum / period as f64);
        }
    }
    result
}

/// Simple Moving Average, aligned index-for-index with the input
pub fn sma(data: &[f64], period: usize) -> Vec<Option<f64>> {
    let wrapped: Vec<Option<f64>> = data.iter().copied().map(Some).collect();
    rolling_mean(&wrapped, period)
}

/// Rolling sample standard deviation
pub fn rolling_std(data: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; data.len()];
    if period < 2 || data.len() < period {
        return result;
    }

    for i in period - 1..data.len() {
        result[i] = Some(std_dev(&data[i + 1 - period..=i]));
    }
    result
}

/// Exponential Moving Average, seeded with the SMA of the first `span` values
pub fn ema(data: &[f64], span: usize) -> Vec<Option<f64>> {
    let wrapped: Vec<Option<f64>> = data.iter().copied().map(Some).collect();
    ema_opt(&wrapped, span)
}

/// EMA over an optional series. Seeding restarts after every undefined value.
pub fn ema_opt(data: &[Option<f64>], span: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; data.len()];
    if span == 0 {
        return result;
    }

    let multiplier = 2.0 / (span as f64 + 1.0);
    let mut seed: Vec<f64> = Vec::with_capacity(span);
    let mut prev: Option<f64> = None;

    for (i, value) in data.iter().enumerate() {
        match (*value, prev) {
            (None, _) => {
                seed.clear();
                prev = None;
            }
            (Some(v), Some(p)) => {
                let ema_val = (v - p) * multiplier + p;
                result[i] = Some(ema_val);
                prev = Some(ema_val);
            }
            (Some(v), None) => {
                seed.push(v);
                if seed.len() == span {
                    let sma = seed.iter().sum::<f64>() / span as f64;
                    result[i] = Some(sma);
                    prev = Some(sma);
                }
            }
        }
    }
    result
}

/// Relative Strength Index with Wilder smoothing (alpha = 1/period).
///
/// The first change is taken as zero, matching an unadjusted exponential mean
/// seeded at the first observation. Values are defined from index `period - 1`.
/// A zero average loss gives 100, or 50 when the average gain is also zero.
pub fn rsi(data: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; data.len()];
    if period == 0 || data.len() < period {
        return result;
    }

    let alpha = 1.0 / period as f64;
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;

    for i in 0..data.len() {
        let change = if i == 0 { 0.0 } else { data[i] - data[i - 1] };
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);

        if i == 0 {
            avg_gain = gain;
            avg_loss = loss;
        } else {
            avg_gain = (1.0 - alpha) * avg_gain + alpha * gain;
            avg_loss = (1.0 - alpha) * avg_loss + alpha * loss;
        }

        if i + 1 >= period {
            result[i] = Some(rsi_from_averages(avg_gain, avg_loss));
        }
    }
    result
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 {
            50.0
        } else {
            100.0
        }
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - (100.0 / (1.0 + rs))
    }
}

/// MACD (Moving Average Convergence Divergence)
#[derive(Debug, Clone)]
pub struct MacdSeries {
    pub ema_fast: Vec<Option<f64>>,
    pub ema_slow: Vec<Option<f64>>,
    pub macd_line: Vec<Option<f64>>,
    pub signal_line: Vec<Option<f64>>,
    pub histogram: Vec<Option<f64>>,
}

pub fn macd(data: &[f64], fast_period: usize, slow_period: usize, signal_period: usize) -> MacdSeries {
    let ema_fast = ema(data, fast_period);
    let ema_slow = ema(data, slow_period);

    let macd_line: Vec<Option<f64>> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();
    let signal_line = ema_opt(&macd_line, signal_period);
    let histogram = macd_line
        .iter()
        .zip(&signal_line)
        .map(|(m, s)| Some((*m)? - (*s)?))
        .collect();

    MacdSeries {
        ema_fast,
        ema_slow,
        macd_line,
        signal_line,
        histogram,
    }
}

/// Bollinger Bands with %B
#[derive(Debug, Clone)]
pub struct BollingerSeries {
    pub upper: Vec<Option<f64>>,
    pub middle: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
    pub percent_b: Vec<Option<f64>>,
}

pub fn bollinger_bands(data: &[f64], period: usize, std_dev: f64) -> BollingerSeries {
    let middle = sma(data, period);
    let std = rolling_std(data, period);

    let mut upper = vec![None; data.len()];
    let mut lower = vec![None; data.len()];
    let mut percent_b = vec![None; data.len()];

    for i in 0..data.len() {
        if let (Some(mean), Some(sd)) = (middle[i], std[i]) {
            let up = mean + std_dev * sd;
            let lo = mean - std_dev * sd;
            upper[i] = Some(up);
            lower[i] = Some(lo);
            percent_b[i] = percent_b_of(data[i], up, lo);
        }
    }

    BollingerSeries {
        upper,
        middle,
        lower,
        percent_b,
    }
}

/// Position of `close` within the bands; undefined when the bands have collapsed
pub fn percent_b_of(close: f64, upper: f64, lower: f64) -> Option<f64> {
    let width = upper - lower;
    if width > 0.0 {
        Some((close - lower) / width)
    } else {
        None
    }
}

/// True range per bar. The first bar has no previous close and uses high - low.
pub fn true_range(bars: &[Bar]) -> Vec<f64> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let high_low = bar.high - bar.low;
            if i == 0 {
                return high_low;
            }
            let prev_close = bars[i - 1].close;
            let high_close = (bar.high - prev_close).abs();
            let low_close = (bar.low - prev_close).abs();
            high_low.max(high_close).max(low_close)
        })
        .collect()
}

/// Average True Range as a rolling mean of the true range
pub fn atr(bars: &[Bar], period: usize) -> Vec<Option<f64>> {
    sma(&true_range(bars), period)
}

/// Average Directional Index with +DI / -DI
#[derive(Debug, Clone)]
pub struct AdxSeries {
    pub adx: Vec<Option<f64>>,
    pub plus_di: Vec<Option<f64>>,
    pub minus_di: Vec<Option<f64>>,
}

pub fn adx(bars: &[Bar], period: usize) -> AdxSeries {
    let n = bars.len();
    let mut plus_dm = vec![None; n];
    let mut minus_dm = vec![None; n];

    for i in 1..n {
        plus_dm[i] = Some((bars[i].high - bars[i - 1].high).max(0.0));
        minus_dm[i] = Some((bars[i - 1].low - bars[i].low).max(0.0));
    }

    let atr_values = atr(bars, period);
    let plus_avg = rolling_mean(&plus_dm, period);
    let minus_avg = rolling_mean(&minus_dm, period);

    let directional = |avg: &[Option<f64>]| -> Vec<Option<f64>> {
        avg.iter()
            .zip(&atr_values)
            .map(|(dm, tr)| match (*dm, *tr) {
                (Some(dm), Some(tr)) if tr > EPSILON => Some(100.0 * dm / tr),
                _ => None,
            })
            .collect()
    };
    let plus_di = directional(&plus_avg);
    let minus_di = directional(&minus_avg);

    let dx: Vec<Option<f64>> = plus_di
        .iter()
        .zip(&minus_di)
        .map(|(p, m)| match (*p, *m) {
            (Some(p), Some(m)) if p + m > EPSILON => Some(100.0 * (p - m).abs() / (p + m)),
            _ => None,
        })
        .collect();

    AdxSeries {
        adx: rolling_mean(&dx, period),
        plus_di,
        minus_di,
    }
}

/// Stochastic Oscillator
#[derive(Debug, Clone)]
pub struct StochasticSeries {
    pub k: Vec<Option<f64>>,
    pub d: Vec<Option<f64>>,
}

pub fn stochastic(bars: &[Bar], k_period: usize, d_period: usize) -> StochasticSeries {
    let mut k_values = vec![None; bars.len()];

    if k_period > 0 && bars.len() >= k_period {
        for i in k_period - 1..bars.len() {
            let slice = &bars[i + 1 - k_period..=i];
            let highest = slice.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
            let lowest = slice.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
            let range = highest - lowest;

            if range > EPSILON {
                k_values[i] = Some(100.0 * (bars[i].close - lowest) / range);
            }
        }
    }

    let d_values = rolling_mean(&k_values, d_period);

    StochasticSeries {
        k: k_values,
        d: d_values,
    }
}

/// On-Balance Volume, seeded at zero on the first bar
pub fn obv(bars: &[Bar]) -> Vec<f64> {
    let mut obv_values = Vec::with_capacity(bars.len());

    for (i, bar) in bars.iter().enumerate() {
        if i == 0 {
            obv_values.push(0.0);
            continue;
        }
        let prev_obv = obv_values[i - 1];
        let prev_close = bars[i - 1].close;
        let new_obv = if bar.close > prev_close {
            prev_obv + bar.volume
        } else if bar.close < prev_close {
            prev_obv - bar.volume
        } else {
            prev_obv
        };
        obv_values.push(new_obv);
    }

    obv_values
}
