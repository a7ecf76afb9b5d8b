use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::AnalysisError;

/// Daily OHLCV bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// Typical price (H + L + C) / 3
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }
}

/// Check that a price history is usable: finite values, chronological, no duplicate dates.
pub fn validate_bars(bars: &[Bar]) -> Result<(), AnalysisError> {
    for (i, bar) in bars.iter().enumerate() {
        let fields = [bar.open, bar.high, bar.low, bar.close, bar.volume];
        if fields.iter().any(|v| !v.is_finite()) {
            return Err(AnalysisError::InvalidData(format!(
                "non-finite value in bar {} ({})",
                i, bar.date
            )));
        }
        if bar.close <= 0.0 {
            return Err(AnalysisError::InvalidData(format!(
                "non-positive close {} on {}",
                bar.close, bar.date
            )));
        }
        if bar.volume < 0.0 {
            return Err(AnalysisError::InvalidData(format!(
                "negative volume on {}",
                bar.date
            )));
        }
        if bar.high < bar.low {
            return Err(AnalysisError::InvalidData(format!(
                "high {} below low {} on {}",
                bar.high, bar.low, bar.date
            )));
        }
        if i > 0 && bars[i - 1].date >= bar.date {
            return Err(AnalysisError::InvalidData(format!(
                "bars out of order or duplicated at {}",
                bar.date
            )));
        }
    }
    Ok(())
}

/// Categorical vote an indicator casts for a single bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Vote {
    Buy,
    Sell,
    Hold,
}

impl Vote {
    /// Vote from the sign of a value; zero is Hold
    pub fn from_sign(value: f64) -> Self {
        if value > 0.0 {
            Vote::Buy
        } else if value < 0.0 {
            Vote::Sell
        } else {
            Vote::Hold
        }
    }

    pub fn to_label(&self) -> &'static str {
        match self {
            Vote::Buy => "Buy",
            Vote::Sell => "Sell",
            Vote::Hold => "Hold",
        }
    }
}

/// Final trading decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    StrongBuy,
    Buy,
    Hold,
    Sell,
    StrongSell,
}

impl Decision {
    /// Map a combined decision score onto a label
    pub fn from_score(score: f64) -> Self {
        if score >= 4.0 {
            Decision::StrongBuy
        } else if score >= 2.0 {
            Decision::Buy
        } else if score >= -1.0 {
            Decision::Hold
        } else if score >= -3.0 {
            Decision::Sell
        } else {
            Decision::StrongSell
        }
    }

    pub fn is_buy(&self) -> bool {
        matches!(self, Decision::StrongBuy | Decision::Buy)
    }

    pub fn is_sell(&self) -> bool {
        matches!(self, Decision::StrongSell | Decision::Sell)
    }

    pub fn to_label(&self) -> &'static str {
        match self {
            Decision::StrongBuy => "Strong Buy",
            Decision::Buy => "Buy",
            Decision::Hold => "Hold",
            Decision::Sell => "Sell",
            Decision::StrongSell => "Strong Sell",
        }
    }
}

/// Trend classification derived from the smoothed technical score and financial health
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendPrediction {
    StrongUptrend,
    PossibleUptrend,
    Sideways,
    PossibleDowntrend,
    StrongDowntrend,
}

impl TrendPrediction {
    pub fn to_label(&self) -> &'static str {
        match self {
            TrendPrediction::StrongUptrend => "Strong Uptrend",
            TrendPrediction::PossibleUptrend => "Possible Uptrend",
            TrendPrediction::Sideways => "Sideways Movement",
            TrendPrediction::PossibleDowntrend => "Possible Downtrend",
            TrendPrediction::StrongDowntrend => "Strong Downtrend",
        }
    }
}

/// Per-bar market regime used to scale category weights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarketCondition {
    Trending,
    Ranging,
    Volatile,
    Calm,
}

impl MarketCondition {
    /// ADX at or above this marks a trending bar
    pub const TRENDING_ADX: f64 = 25.0;
    /// ATR/close above this marks a volatile bar
    pub const VOLATILE_ATR_RATIO: f64 = 0.03;
    /// ATR/close below this marks a calm bar
    pub const CALM_ATR_RATIO: f64 = 0.01;

    /// Classify a bar; None when either input is undefined.
    /// Volatility takes precedence over trend strength.
    pub fn classify(adx: Option<f64>, atr: Option<f64>, close: f64) -> Option<Self> {
        let adx = adx?;
        let atr = atr?;
        if close <= 0.0 {
            return None;
        }
        let atr_ratio = atr / close;
        Some(if atr_ratio > Self::VOLATILE_ATR_RATIO {
            MarketCondition::Volatile
        } else if adx >= Self::TRENDING_ADX {
            MarketCondition::Trending
        } else if atr_ratio < Self::CALM_ATR_RATIO {
            MarketCondition::Calm
        } else {
            MarketCondition::Ranging
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskRating {
    Low,
    Medium,
    High,
}

impl RiskRating {
    /// Rate risk from return volatility (percent) and an optional debt-to-equity ratio
    pub fn assess(volatility: f64, debt_to_equity: Option<f64>) -> Self {
        let de = debt_to_equity.filter(|v| v.is_finite());
        if volatility > 5.0 || de.is_some_and(|d| d > 1.0) {
            RiskRating::High
        } else if volatility > 3.0 || de.is_some_and(|d| d > 0.5) {
            RiskRating::Medium
        } else {
            RiskRating::Low
        }
    }
}

/// Output of the external fundamental scorecard
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FundamentalSnapshot {
    /// Overall financial health, 0 to 100
    pub overall_score: f64,
    #[serde(default)]
    pub ratios: HashMap<String, f64>,
}

impl FundamentalSnapshot {
    pub fn new(overall_score: f64) -> Self {
        Self {
            overall_score,
            ratios: HashMap::new(),
        }
    }

    pub fn with_ratio(mut self, name: &str, value: f64) -> Self {
        self.ratios.insert(name.to_string(), value);
        self
    }

    pub fn ratio(&self, name: &str) -> Option<f64> {
        self.ratios.get(name).copied().filter(|v| v.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(day: u32, close: f64) -> Bar {
        Bar {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1000.0,
        }
    }

    #[test]
    fn test_decision_thresholds() {
        assert_eq!(Decision::from_score(4.0), Decision::StrongBuy);
        assert_eq!(Decision::from_score(3.5), Decision::Buy);
        assert_eq!(Decision::from_score(-1.0), Decision::Hold);
        assert_eq!(Decision::from_score(-1.5), Decision::Sell);
        assert_eq!(Decision::from_score(-3.5), Decision::StrongSell);
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let bars = vec![bar(1, 10.0), bar(1, 11.0)];
        assert!(matches!(validate_bars(&bars), Err(AnalysisError::InvalidData(_))));
    }

    #[test]
    fn test_validate_rejects_nan() {
        let mut bars = vec![bar(1, 10.0), bar(2, 11.0)];
        bars[1].high = f64::NAN;
        assert!(validate_bars(&bars).is_err());
        assert!(validate_bars(&bars[..1]).is_ok());
    }

    #[test]
    fn test_market_condition() {
        assert_eq!(MarketCondition::classify(Some(30.0), Some(1.0), 100.0), Some(MarketCondition::Trending));
        assert_eq!(MarketCondition::classify(Some(30.0), Some(5.0), 100.0), Some(MarketCondition::Volatile));
        assert_eq!(MarketCondition::classify(Some(15.0), Some(0.5), 100.0), Some(MarketCondition::Calm));
        assert_eq!(MarketCondition::classify(Some(15.0), Some(2.0), 100.0), Some(MarketCondition::Ranging));
        assert_eq!(MarketCondition::classify(None, Some(2.0), 100.0), None);
    }

    #[test]
    fn test_risk_rating() {
        assert_eq!(RiskRating::assess(6.0, None), RiskRating::High);
        assert_eq!(RiskRating::assess(1.0, Some(1.5)), RiskRating::High);
        assert_eq!(RiskRating::assess(1.0, Some(0.7)), RiskRating::Medium);
        assert_eq!(RiskRating::assess(1.0, Some(f64::NAN)), RiskRating::Low);
    }

    #[test]
    fn test_snapshot_json() {
        let snap: FundamentalSnapshot =
            serde_json::from_str(r#"{"overall_score": 72.5, "ratios": {"debt_to_equity": 0.4}}"#).unwrap();
        assert_eq!(snap.ratio("debt_to_equity"), Some(0.4));
        assert_eq!(snap.ratio("roe"), None);
    }
}
