use analysis_core::{MarketCondition, Vote};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::frame::IndicatorRow;
use crate::signals::*;

/// Scoring categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Trend,
    Momentum,
    Volume,
    Volatility,
    Strength,
    SupportResistance,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Trend,
        Category::Momentum,
        Category::Volume,
        Category::Volatility,
        Category::Strength,
        Category::SupportResistance,
    ];

    /// Categories summed into the Important score (raw volatility excluded)
    pub fn is_important(&self) -> bool {
        !matches!(self, Category::Volatility)
    }
}

/// Per-indicator weights. Immutable; regime scaling produces a new profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightProfile {
    // trend
    pub position_vs_sma20: f64,
    pub position_vs_sma50: f64,
    pub ema_signal: f64,
    // momentum
    pub macd_trade_signal: f64,
    pub macd_histogram: f64,
    pub stoch_signal: f64,
    pub rsi_signal: f64,
    // volume
    pub obv_signal: f64,
    // volatility
    pub bb_signal: f64,
    // strength
    pub adx_signal: f64,
    // support / resistance
    pub sr_zone: f64,
}

impl Default for WeightProfile {
    fn default() -> Self {
        Self::base()
    }
}

impl WeightProfile {
    pub const fn base() -> Self {
        Self {
            position_vs_sma20: 1.2,
            position_vs_sma50: 1.5,
            ema_signal: 1.8,
            macd_trade_signal: 2.2,
            macd_histogram: 1.0,
            stoch_signal: 1.3,
            rsi_signal: 1.5,
            obv_signal: 1.4,
            bb_signal: 1.6,
            adx_signal: 1.7,
            sr_zone: 1.3,
        }
    }

    /// Copy of this profile with every weight in `category` multiplied by `factor`
    pub fn scaled(&self, category: Category, factor: f64) -> Self {
        let mut w = *self;
        match category {
            Category::Trend => {
                w.position_vs_sma20 *= factor;
                w.position_vs_sma50 *= factor;
                w.ema_signal *= factor;
            }
            Category::Momentum => {
                w.macd_trade_signal *= factor;
                w.macd_histogram *= factor;
                w.stoch_signal *= factor;
                w.rsi_signal *= factor;
            }
            Category::Volume => w.obv_signal *= factor,
            Category::Volatility => w.bb_signal *= factor,
            Category::Strength => w.adx_signal *= factor,
            Category::SupportResistance => w.sr_zone *= factor,
        }
        w
    }

    /// Base weights adjusted for a market regime
    pub fn for_condition(condition: MarketCondition) -> Self {
        let base = Self::base();
        match condition {
            MarketCondition::Trending => base
                .scaled(Category::Trend, 1.3)
                .scaled(Category::Strength, 1.2)
                .scaled(Category::SupportResistance, 0.8),
            MarketCondition::Ranging => base
                .scaled(Category::Trend, 0.8)
                .scaled(Category::Momentum, 1.2)
                .scaled(Category::SupportResistance, 1.3),
            MarketCondition::Volatile => base
                .scaled(Category::Volatility, 1.3)
                .scaled(Category::Volume, 1.2)
                .scaled(Category::Momentum, 0.8),
            MarketCondition::Calm => base
                .scaled(Category::Trend, 1.1)
                .scaled(Category::Volatility, 0.8),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub buy: f64,
    pub sell: f64,
}

impl CategoryScore {
    pub fn net(&self) -> f64 {
        self.buy - self.sell
    }

    fn add(&mut self, vote: Option<Vote>, weight: f64) {
        match vote {
            Some(Vote::Buy) => self.buy += weight,
            Some(Vote::Sell) => self.sell += weight,
            Some(Vote::Hold) | None => {}
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryScores {
    pub trend: CategoryScore,
    pub momentum: CategoryScore,
    pub volume: CategoryScore,
    pub volatility: CategoryScore,
    pub strength: CategoryScore,
    pub support_resistance: CategoryScore,
}

impl CategoryScores {
    pub fn get(&self, category: Category) -> &CategoryScore {
        match category {
            Category::Trend => &self.trend,
            Category::Momentum => &self.momentum,
            Category::Volume => &self.volume,
            Category::Volatility => &self.volatility,
            Category::Strength => &self.strength,
            Category::SupportResistance => &self.support_resistance,
        }
    }
}

/// Scores for one bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRow {
    pub date: Option<NaiveDate>,
    pub categories: CategoryScores,
    pub buy_score: f64,
    pub sell_score: f64,
    pub net_score: f64,
    pub important_buy_score: f64,
    pub important_sell_score: f64,
    pub important_net_score: f64,
    pub signal: Vote,
    pub important_signal: Vote,
    pub position_vs_sma20: Option<Position>,
    pub position_vs_sma50: Option<Position>,
    pub rsi_signal: Option<Vote>,
    pub sr_zone: SrZoneState,
    pub market_condition: Option<MarketCondition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    /// Scale weights per bar by market condition
    pub dynamic_weights: bool,
    /// Fractional distance from S1/R1 that counts as touching
    pub sr_proximity: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            dynamic_weights: false,
            sr_proximity: SR_PROXIMITY,
        }
    }
}

/// Maps indicator rows to weighted buy/sell scores
#[derive(Debug, Clone, Default)]
pub struct SignalAggregator {
    config: SignalConfig,
}

impl SignalAggregator {
    pub fn new(config: SignalConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SignalConfig {
        &self.config
    }

    /// Weight profile used for a bar in the given regime
    pub fn profile_for(&self, condition: Option<MarketCondition>) -> WeightProfile {
        match condition {
            Some(c) if self.config.dynamic_weights => WeightProfile::for_condition(c),
            _ => WeightProfile::base(),
        }
    }

    /// Score every row, recomputed in full
    pub fn score(&self, rows: &[IndicatorRow]) -> Vec<ScoreRow> {
        rows.iter()
            .map(|row| {
                let condition = MarketCondition::classify(row.adx, row.atr, row.close);
                let profile = self.profile_for(condition);
                let mut scored = self.score_row(row, &profile);
                scored.market_condition = condition;
                scored
            })
            .collect()
    }

    /// Score a single row against an explicit weight profile.
    /// Absent indicators contribute nothing.
    pub fn score_row(&self, row: &IndicatorRow, weights: &WeightProfile) -> ScoreRow {
        let mut c = CategoryScores::default();

        let position_vs_sma20 = row.sma_20.map(|avg| Position::of(row.close, avg));
        let position_vs_sma50 = row.sma_50.map(|avg| Position::of(row.close, avg));
        c.trend.add(position_vs_sma20.map(|p| p.vote()), weights.position_vs_sma20);
        c.trend.add(position_vs_sma50.map(|p| p.vote()), weights.position_vs_sma50);
        c.trend.add(row.ema_signal.map(|s| s.vote()), weights.ema_signal);

        let rsi_signal = row.rsi_21.map(rsi_vote);
        c.momentum.add(rsi_signal, weights.rsi_signal);
        c.momentum.add(row.macd_trade_signal, weights.macd_trade_signal);
        c.momentum.add(row.macd_histogram.map(Vote::from_sign), weights.macd_histogram);
        c.momentum.add(row.stoch_signal, weights.stoch_signal);

        c.volume.add(row.obv_signal, weights.obv_signal);
        c.volatility.add(row.bb_signal, weights.bb_signal);
        c.strength.add(row.adx_signal, weights.adx_signal);

        let sr_zone = match (row.s1, row.r1) {
            (Some(s1), Some(r1)) => SrZoneState::of(row.close, s1, r1, self.config.sr_proximity),
            _ => SrZoneState::None,
        };
        c.support_resistance.add(Some(sr_zone.vote()), weights.sr_zone);

        let (mut buy, mut sell, mut imp_buy, mut imp_sell) = (0.0, 0.0, 0.0, 0.0);
        for category in Category::ALL {
            let s = c.get(category);
            buy += s.buy;
            sell += s.sell;
            if category.is_important() {
                imp_buy += s.buy;
                imp_sell += s.sell;
            }
        }
        let net = buy - sell;
        let important_net = imp_buy - imp_sell;

        ScoreRow {
            date: row.date,
            categories: c,
            buy_score: buy,
            sell_score: sell,
            net_score: net,
            important_buy_score: imp_buy,
            important_sell_score: imp_sell,
            important_net_score: important_net,
            signal: Vote::from_sign(net),
            important_signal: Vote::from_sign(important_net),
            position_vs_sma20,
            position_vs_sma50,
            rsi_signal,
            sr_zone,
            market_condition: None,
        }
    }
}

/// Mean Important_Net_Score over the last `window` rows, skipping non-finite rows.
/// None when nothing remains.
pub fn avg_net_score(scores: &[ScoreRow], window: usize) -> Option<f64> {
    let tail = &scores[scores.len().saturating_sub(window)..];
    let values: Vec<f64> = tail
        .iter()
        .map(|s| s.important_net_score)
        .filter(|v| v.is_finite())
        .collect();
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
