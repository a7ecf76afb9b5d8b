use analysis_core::TrendPrediction;
use serde::{Deserialize, Serialize};
use technical_analysis::{FibonacciLevels, IndicatorRow, LevelSet, PivotLevels, SrZone};

/// Side of the current price a level or target lies on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// `value` is at or beyond `threshold`
    pub fn qualifies(&self, value: f64, threshold: f64) -> bool {
        match self {
            Direction::Up => value >= threshold,
            Direction::Down => value <= threshold,
        }
    }

    /// `value` is strictly beyond `reference`
    pub fn beyond(&self, value: f64, reference: f64) -> bool {
        match self {
            Direction::Up => value > reference,
            Direction::Down => value < reference,
        }
    }

    /// The one of two levels closer to the current price
    pub fn nearest(&self, a: f64, b: f64) -> f64 {
        match self {
            Direction::Up => a.min(b),
            Direction::Down => a.max(b),
        }
    }

    pub fn furthest(&self, a: f64, b: f64) -> f64 {
        match self {
            Direction::Up => a.max(b),
            Direction::Down => a.min(b),
        }
    }

    /// Move `price` by `pct` in this direction
    pub fn step(&self, price: f64, pct: f64) -> f64 {
        match self {
            Direction::Up => price * (1.0 + pct),
            Direction::Down => price * (1.0 - pct),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelCandidate {
    pub name: String,
    pub value: f64,
}

/// Named levels searched for a target.
///
/// Priority entries are tried in insertion order and the first qualifying one wins.
/// Otherwise the qualifying entry of `rest` nearest the current price is taken.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidatePool {
    pub priority: Vec<LevelCandidate>,
    pub rest: Vec<LevelCandidate>,
}

impl CandidatePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Undefined and non-finite values are skipped
    pub fn with_priority(mut self, name: &str, value: Option<f64>) -> Self {
        if let Some(value) = value.filter(|v| v.is_finite()) {
            self.priority.push(LevelCandidate {
                name: name.to_string(),
                value,
            });
        }
        self
    }

    pub fn with_level(mut self, name: &str, value: Option<f64>) -> Self {
        if let Some(value) = value.filter(|v| v.is_finite()) {
            self.rest.push(LevelCandidate {
                name: name.to_string(),
                value,
            });
        }
        self
    }

    /// Copy keeping only the candidates whose value passes `keep`, order preserved
    pub fn filtered(&self, keep: impl Fn(f64) -> bool) -> Self {
        let pick = |list: &[LevelCandidate]| -> Vec<LevelCandidate> {
            list.iter().filter(|c| keep(c.value)).cloned().collect()
        };
        Self {
            priority: pick(&self.priority),
            rest: pick(&self.rest),
        }
    }

    pub fn len(&self) -> usize {
        self.priority.len() + self.rest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Every level the planner may consult. Absent levels are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlannerLevels {
    /// Lowest low of the recent window
    pub support: Option<f64>,
    /// Highest high of the recent window
    pub resistance: Option<f64>,
    /// S1 of the latest bar
    pub short_support: Option<f64>,
    /// R1 of the latest bar
    pub short_resistance: Option<f64>,
    pub long_support: Option<f64>,
    pub long_resistance: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_lower: Option<f64>,
    pub fibonacci: Option<FibonacciLevels>,
    pub pivot: Option<PivotLevels>,
    #[serde(default)]
    pub zones: Vec<SrZone>,
}

impl PlannerLevels {
    pub fn from_analysis(levels: &LevelSet, latest: &IndicatorRow, support: f64, resistance: f64) -> Self {
        Self {
            support: Some(support),
            resistance: Some(resistance),
            short_support: latest.s1,
            short_resistance: latest.r1,
            long_support: levels.swing.long_support,
            long_resistance: levels.swing.long_resistance,
            bb_upper: latest.bb_upper,
            bb_lower: latest.bb_lower,
            fibonacci: Some(levels.fibonacci),
            pivot: Some(levels.pivot),
            zones: levels.zones.clone(),
        }
    }

    /// Resistance-side pool: short and long resistance first, then the remaining
    /// levels plus every zone bound at or above the current price
    pub fn up_candidates(&self, current_price: f64) -> CandidatePool {
        let mut pool = CandidatePool::new()
            .with_priority("Short_Resistance", self.short_resistance)
            .with_priority("Long_Resistance", self.long_resistance)
            .with_level("BB_Upper", self.bb_upper)
            .with_level("Resistance", self.resistance)
            .with_level("Fib_23.6", self.fibonacci.map(|f| f.fib_23_6))
            .with_level("Fib_38.2", self.fibonacci.map(|f| f.fib_38_2))
            .with_level("R1", self.pivot.map(|p| p.r1))
            .with_level("R2", self.pivot.map(|p| p.r2));
        for zone in &self.zones {
            for (name, bound) in [("SR_Zone_Low", zone.low), ("SR_Zone_High", zone.high)] {
                if bound >= current_price {
                    pool = pool.with_level(name, Some(bound));
                }
            }
        }
        pool
    }

    pub fn down_candidates(&self, current_price: f64) -> CandidatePool {
        let mut pool = CandidatePool::new()
            .with_priority("Short_Support", self.short_support)
            .with_priority("Long_Support", self.long_support)
            .with_level("BB_Lower", self.bb_lower)
            .with_level("Support", self.support)
            .with_level("Fib_61.8", self.fibonacci.map(|f| f.fib_61_8))
            .with_level("Fib_78.6", self.fibonacci.map(|f| f.fib_78_6))
            .with_level("S1", self.pivot.map(|p| p.s1))
            .with_level("S2", self.pivot.map(|p| p.s2));
        for zone in &self.zones {
            for (name, bound) in [("SR_Zone_Low", zone.low), ("SR_Zone_High", zone.high)] {
                if bound <= current_price {
                    pool = pool.with_level(name, Some(bound));
                }
            }
        }
        pool
    }

    /// Lower bound of the nearest zone lying entirely below the price
    pub fn zone_floor_below(&self, price: f64) -> Option<f64> {
        self.zones
            .iter()
            .filter(|z| z.high < price)
            .map(|z| z.low)
            .reduce(f64::max)
    }

    /// Upper bound of the nearest zone lying entirely above the price
    pub fn zone_ceiling_above(&self, price: f64) -> Option<f64> {
        self.zones
            .iter()
            .filter(|z| z.low > price)
            .map(|z| z.high)
            .reduce(f64::min)
    }

    /// Nearest zone upper bound above the price
    pub fn zone_high_above(&self, price: f64) -> Option<f64> {
        self.zones
            .iter()
            .map(|z| z.high)
            .filter(|&h| h > price)
            .reduce(f64::min)
    }

    /// Nearest zone lower bound below the price
    pub fn zone_low_below(&self, price: f64) -> Option<f64> {
        self.zones
            .iter()
            .map(|z| z.low)
            .filter(|&l| l < price)
            .reduce(f64::max)
    }
}

/// How targets are projected for a trend prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetMode {
    /// Three targets per side, each looked up against the level pools
    LevelLookup,
    /// Two targets per side straight from the percentage tiers
    Sideways,
}

impl TargetMode {
    pub fn for_prediction(prediction: TrendPrediction) -> Self {
        match prediction {
            TrendPrediction::StrongUptrend | TrendPrediction::StrongDowntrend => TargetMode::LevelLookup,
            _ => TargetMode::Sideways,
        }
    }
}

/// Ordered targets, nearest to the current price first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceTargets {
    pub up: Vec<f64>,
    pub down: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradePlan {
    pub entry_point: f64,
    pub exit_point: f64,
    pub stop_loss: f64,
    pub up_targets: Vec<f64>,
    pub down_targets: Vec<f64>,
    /// Undefined when the exit lies on the losing side of the entry, or for Hold
    pub reward_to_risk: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionSizing {
    pub shares: u64,
    pub invested: f64,
    pub remaining_cash: f64,
}

/// Profit or loss of the sized position if the price reaches a target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetReturn {
    pub label: String,
    pub direction: Direction,
    pub target: f64,
    pub pct_move: f64,
    pub profit_loss: f64,
}
