use analysis_core::{validate_bars, AnalysisError, Bar, Vote};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::indicators::*;
use crate::levels::*;
use crate::signals::*;

/// Fewest rows that may remain after warm-up trimming
pub const MIN_ANALYSIS_ROWS: usize = 10;

/// Window sizes for every indicator the engine computes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorParams {
    pub sma_short: usize,
    pub sma_long: usize,
    pub rsi_periods: [usize; 3],
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bb_period: usize,
    pub bb_std_dev: f64,
    pub adx_period: usize,
    pub stoch_k: usize,
    pub stoch_d: usize,
    pub zone_window: usize,
    pub zone_bins: usize,
    pub zone_top: usize,
    pub swing_distance: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            sma_short: 20,
            sma_long: 50,
            rsi_periods: [7, 14, 21],
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            bb_period: 20,
            bb_std_dev: 2.0,
            adx_period: 14,
            stoch_k: 14,
            stoch_d: 3,
            zone_window: 20,
            zone_bins: 20,
            zone_top: 3,
            swing_distance: 10,
        }
    }
}

impl IndicatorParams {
    /// Index of the first bar at which every windowed indicator is defined
    pub fn warmup(&self) -> usize {
        let lookback = |period: usize| period.saturating_sub(1);
        [
            lookback(self.sma_short),
            lookback(self.sma_long),
            self.rsi_periods.iter().copied().map(lookback).max().unwrap_or(0),
            lookback(self.macd_fast.max(self.macd_slow)) + lookback(self.macd_signal),
            lookback(self.bb_period),
            // DM needs a previous bar, then DI and ADX each average over a full window
            self.adx_period + lookback(self.adx_period),
            lookback(self.stoch_k) + lookback(self.stoch_d),
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }
}

/// One bar enriched with every indicator column.
///
/// Undefined values are `None`; the aggregator skips them. Callers may build rows
/// with a partial indicator set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    pub date: Option<NaiveDate>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,

    pub sma_20: Option<f64>,
    pub sma_50: Option<f64>,
    pub rsi_7: Option<f64>,
    pub rsi_14: Option<f64>,
    /// Scored RSI
    pub rsi_21: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_histogram: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_middle: Option<f64>,
    pub bb_lower: Option<f64>,
    pub bb_percent_b: Option<f64>,
    pub adx: Option<f64>,
    pub plus_di: Option<f64>,
    pub minus_di: Option<f64>,
    pub atr: Option<f64>,
    pub stoch_k: Option<f64>,
    pub stoch_d: Option<f64>,
    pub obv: Option<f64>,
    pub pivot: Option<f64>,
    pub r1: Option<f64>,
    pub r2: Option<f64>,
    pub s1: Option<f64>,
    pub s2: Option<f64>,
    pub long_support: Option<f64>,
    pub long_resistance: Option<f64>,

    pub ema_signal: Option<CrossSignal>,
    pub macd_trade_signal: Option<Vote>,
    pub obv_signal: Option<Vote>,
    pub bb_signal: Option<Vote>,
    pub adx_signal: Option<Vote>,
    pub stoch_signal: Option<Vote>,
}

/// Indicator rows past warm-up plus the level set of the whole series
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorFrame {
    pub rows: Vec<IndicatorRow>,
    pub levels: LevelSet,
    /// Number of leading bars trimmed
    pub warmup: usize,
}

impl IndicatorFrame {
    pub fn latest(&self) -> Option<&IndicatorRow> {
        self.rows.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.close).collect()
    }

    /// Last `n` rows (all rows when fewer exist)
    pub fn tail(&self, n: usize) -> &[IndicatorRow] {
        &self.rows[self.rows.len().saturating_sub(n)..]
    }
}

#[derive(Debug, Clone, Default)]
pub struct IndicatorEngine {
    params: IndicatorParams,
}

impl IndicatorEngine {
    pub fn new(params: IndicatorParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &IndicatorParams {
        &self.params
    }

    /// Compute every indicator over `bars` and drop the warm-up rows.
    pub fn compute(&self, bars: &[Bar]) -> Result<IndicatorFrame, AnalysisError> {
        if bars.is_empty() {
            return Err(AnalysisError::InsufficientData("no price bars supplied".to_string()));
        }
        validate_bars(bars)?;

        let p = &self.params;
        let warmup = p.warmup();
        let n = bars.len();
        if n < warmup + MIN_ANALYSIS_ROWS {
            return Err(AnalysisError::InsufficientData(format!(
                "need at least {} bars ({} warm-up + {} usable), got {}",
                warmup + MIN_ANALYSIS_ROWS,
                warmup,
                MIN_ANALYSIS_ROWS,
                n
            )));
        }

        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();

        let sma_short = sma(&closes, p.sma_short);
        let sma_long = sma(&closes, p.sma_long);
        let [rsi_a, rsi_b, rsi_c] = p.rsi_periods.map(|period| rsi(&closes, period));
        let macd_series = macd(&closes, p.macd_fast, p.macd_slow, p.macd_signal);
        let bb = bollinger_bands(&closes, p.bb_period, p.bb_std_dev);
        let adx_series = adx(bars, p.adx_period);
        let atr_values = atr(bars, p.adx_period);
        let stoch = stochastic(bars, p.stoch_k, p.stoch_d);
        let obv_values = obv(bars);

        let swing = SwingLevels::detect(&closes, p.swing_distance);
        if swing.long_support.is_none() || swing.long_resistance.is_none() {
            warn!("no swing extrema detected over {} bars", n);
        }
        let zones = sr_zones(&closes, p.zone_window, p.zone_bins, p.zone_top);
        if zones.is_empty() {
            warn!("support/resistance zone window has zero price range");
        }
        let fibonacci = FibonacciLevels::from_bars(bars)
            .ok_or_else(|| AnalysisError::InsufficientData("no price bars supplied".to_string()))?;
        let pivot = PivotLevels::from_bar(&bars[n - 1]);

        let rows: Vec<IndicatorRow> = (warmup..n)
            .map(|i| {
                let bar = &bars[i];
                let pivots = PivotLevels::from_bar(bar);
                let obv_delta = if i == 0 { 0.0 } else { obv_values[i] - obv_values[i - 1] };

                IndicatorRow {
                    date: Some(bar.date),
                    open: bar.open,
                    high: bar.high,
                    low: bar.low,
                    close: bar.close,
                    volume: bar.volume,
                    sma_20: sma_short[i],
                    sma_50: sma_long[i],
                    rsi_7: rsi_a[i],
                    rsi_14: rsi_b[i],
                    rsi_21: rsi_c[i],
                    macd: macd_series.macd_line[i],
                    macd_signal: macd_series.signal_line[i],
                    macd_histogram: macd_series.histogram[i],
                    bb_upper: bb.upper[i],
                    bb_middle: bb.middle[i],
                    bb_lower: bb.lower[i],
                    bb_percent_b: bb.percent_b[i],
                    adx: adx_series.adx[i],
                    plus_di: adx_series.plus_di[i],
                    minus_di: adx_series.minus_di[i],
                    atr: atr_values[i],
                    stoch_k: stoch.k[i],
                    stoch_d: stoch.d[i],
                    obv: Some(obv_values[i]),
                    pivot: Some(pivots.pivot),
                    r1: Some(pivots.r1),
                    r2: Some(pivots.r2),
                    s1: Some(pivots.s1),
                    s2: Some(pivots.s2),
                    long_support: swing.long_support,
                    long_resistance: swing.long_resistance,
                    ema_signal: match (macd_series.ema_fast[i], macd_series.ema_slow[i]) {
                        (Some(fast), Some(slow)) => CrossSignal::of(fast, slow),
                        _ => None,
                    },
                    macd_trade_signal: macd_series.histogram[i].map(macd_vote),
                    obv_signal: Some(obv_vote(obv_delta)),
                    bb_signal: match (bb.upper[i], bb.lower[i]) {
                        (Some(up), Some(lo)) => Some(bollinger_vote(bar.close, up, lo)),
                        _ => None,
                    },
                    adx_signal: match (adx_series.plus_di[i], adx_series.minus_di[i]) {
                        (Some(pdi), Some(mdi)) => Some(directional_vote(pdi, mdi)),
                        _ => None,
                    },
                    stoch_signal: match (stoch.k[i], stoch.d[i]) {
                        (Some(k), Some(d)) => Some(stochastic_vote(k, d)),
                        _ => None,
                    },
                }
            })
            .collect();

        debug!(
            "computed indicators: {} bars, {} warm-up, {} rows, {} zones",
            n,
            warmup,
            rows.len(),
            zones.len()
        );

        Ok(IndicatorFrame {
            rows,
            levels: LevelSet {
                fibonacci,
                pivot,
                swing,
                zones,
            },
            warmup,
        })
    }
}
