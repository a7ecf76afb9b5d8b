use serde::{Deserialize, Serialize};
use technical_analysis::{IndicatorParams, SignalConfig, DEFAULT_AVG_WINDOW};

pub const DEFAULT_INVESTMENT: f64 = 10_000.0;
/// Rows used for the recent support and resistance
pub const DEFAULT_RECENT_WINDOW: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub indicator: IndicatorParams,
    pub signal: SignalConfig,
    pub investment_amount: f64,
    pub avg_window: usize,
    pub recent_window: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            indicator: IndicatorParams::default(),
            signal: SignalConfig::default(),
            investment_amount: DEFAULT_INVESTMENT,
            avg_window: DEFAULT_AVG_WINDOW,
            recent_window: DEFAULT_RECENT_WINDOW,
        }
    }
}

impl AnalysisConfig {
    /// Defaults overlaid with `SIGNAL_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values from `lookup`. Unparsable values keep the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(flag) = parsed(&lookup, "SIGNAL_DYNAMIC_WEIGHTS", parse_flag) {
            config.signal.dynamic_weights = flag;
        }
        if let Some(amount) = parsed(&lookup, "SIGNAL_INVESTMENT_AMOUNT", |v| {
            v.parse::<f64>().ok().filter(|a| a.is_finite() && *a >= 0.0)
        }) {
            config.investment_amount = amount;
        }
        if let Some(window) = parsed(&lookup, "SIGNAL_AVG_WINDOW", |v| {
            v.parse::<usize>().ok().filter(|w| *w > 0)
        }) {
            config.avg_window = window;
        }

        config
    }
}

fn parsed<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Option<T> {
    let raw = lookup(key)?;
    let value = parse(raw.trim());
    if value.is_none() {
        tracing::warn!("Ignoring invalid {}={:?}", key, raw);
    }
    value
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
