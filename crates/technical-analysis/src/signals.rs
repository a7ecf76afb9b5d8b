//! Per-indicator vote rules. Each rule is a pure function of one bar's values.

use analysis_core::stats::approx_eq;
use analysis_core::Vote;
use serde::{Deserialize, Serialize};

pub const RSI_OVERSOLD: f64 = 30.0;
pub const RSI_OVERBOUGHT: f64 = 70.0;
/// Fractional distance from S1/R1 that counts as touching the level
pub const SR_PROXIMITY: f64 = 0.005;

/// Close relative to a moving average
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Position {
    Above,
    Below,
    At,
}

impl Position {
    pub fn of(close: f64, average: f64) -> Self {
        if approx_eq(close, average) {
            Position::At
        } else if close > average {
            Position::Above
        } else {
            Position::Below
        }
    }

    pub fn vote(&self) -> Vote {
        match self {
            Position::Above => Vote::Buy,
            Position::Below => Vote::Sell,
            Position::At => Vote::Hold,
        }
    }
}

/// Fast EMA against slow EMA
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrossSignal {
    GoldenCross,
    DeathCross,
}

impl CrossSignal {
    /// None when the averages coincide
    pub fn of(fast: f64, slow: f64) -> Option<Self> {
        if fast > slow {
            Some(CrossSignal::GoldenCross)
        } else if fast < slow {
            Some(CrossSignal::DeathCross)
        } else {
            None
        }
    }

    pub fn vote(&self) -> Vote {
        match self {
            CrossSignal::GoldenCross => Vote::Buy,
            CrossSignal::DeathCross => Vote::Sell,
        }
    }

    pub fn to_label(&self) -> &'static str {
        match self {
            CrossSignal::GoldenCross => "Golden Cross",
            CrossSignal::DeathCross => "Death Cross",
        }
    }
}

/// Proximity of the close to the bar's pivot support or resistance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SrZoneState {
    Support,
    Resistance,
    None,
}

impl SrZoneState {
    /// Resistance is checked first. A collapsed pivot range (S1 >= R1) is never a zone.
    pub fn of(close: f64, s1: f64, r1: f64, proximity: f64) -> Self {
        if s1 >= r1 {
            return SrZoneState::None;
        }
        if close >= r1 * (1.0 - proximity) {
            SrZoneState::Resistance
        } else if close <= s1 * (1.0 + proximity) {
            SrZoneState::Support
        } else {
            SrZoneState::None
        }
    }

    pub fn vote(&self) -> Vote {
        match self {
            SrZoneState::Support => Vote::Buy,
            SrZoneState::Resistance => Vote::Sell,
            SrZoneState::None => Vote::Hold,
        }
    }
}

pub fn rsi_vote(rsi: f64) -> Vote {
    if rsi < RSI_OVERSOLD {
        Vote::Buy
    } else if rsi > RSI_OVERBOUGHT {
        Vote::Sell
    } else {
        Vote::Hold
    }
}

/// MACD trade signal: MACD above its signal line is a Buy.
/// Taken from the histogram so the vote always matches its sign.
pub fn macd_vote(histogram: f64) -> Vote {
    Vote::from_sign(histogram)
}

/// OBV signal from the bar-over-bar change
pub fn obv_vote(delta: f64) -> Vote {
    Vote::from_sign(delta)
}

/// Close below the lower band is a Buy, above the upper band a Sell
pub fn bollinger_vote(close: f64, upper: f64, lower: f64) -> Vote {
    if close > upper {
        Vote::Sell
    } else if close < lower {
        Vote::Buy
    } else {
        Vote::Hold
    }
}

/// +DI above -DI is a Buy
pub fn directional_vote(plus_di: f64, minus_di: f64) -> Vote {
    Vote::from_sign(plus_di - minus_di)
}

/// %K above %D is a Buy
pub fn stochastic_vote(k: f64, d: f64) -> Vote {
    Vote::from_sign(k - d)
}
