use analysis_core::stats::{price_decimals, round_to};
use analysis_core::{AnalysisError, Decision, TrendPrediction};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::*;
use crate::plan;

/// Smallest first-tier distance
pub const BASE_PCT: f64 = 0.02;
pub const TIER2_STEP: f64 = 0.03;
pub const TIER3_STEP: f64 = 0.05;
pub const TARGET_DECIMALS: u32 = 4;

/// Percentage distances of the three target tiers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tiers {
    pub pct1: f64,
    pub pct2: f64,
    pub pct3: f64,
}

impl Tiers {
    /// `volatility` is a percentage (2.0 means 2%)
    pub fn from_volatility(volatility: f64) -> Self {
        let pct1 = BASE_PCT.max(volatility / 100.0);
        let pct2 = pct1 + TIER2_STEP;
        let pct3 = pct2 + TIER3_STEP;
        Self { pct1, pct2, pct3 }
    }

    fn as_array(&self) -> [f64; 3] {
        [self.pct1, self.pct2, self.pct3]
    }
}

/// First qualifying priority candidate, else the nearest qualifying one of the rest.
/// A candidate qualifies when it lies at or beyond `threshold` in `direction`.
pub fn select_level(pool: &CandidatePool, threshold: f64, direction: Direction) -> Option<f64> {
    if let Some(hit) = pool
        .priority
        .iter()
        .find(|c| direction.qualifies(c.value, threshold))
    {
        return Some(hit.value);
    }

    pool.rest
        .iter()
        .map(|c| c.value)
        .filter(|&v| direction.qualifies(v, threshold))
        .reduce(|a, b| direction.nearest(a, b))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PriceTargetPlanner;

impl PriceTargetPlanner {
    pub fn new() -> Self {
        Self
    }

    /// Up and down targets for the current price, each list moving strictly away from it
    pub fn targets(
        &self,
        current_price: f64,
        volatility: f64,
        levels: &PlannerLevels,
        prediction: TrendPrediction,
    ) -> Result<PriceTargets, AnalysisError> {
        check_price(current_price)?;
        let tiers = Tiers::from_volatility(volatility);
        let decimals = price_decimals(current_price, TARGET_DECIMALS);
        let mode = TargetMode::for_prediction(prediction);

        let targets = match mode {
            TargetMode::Sideways => PriceTargets {
                up: sideways(current_price, &tiers, Direction::Up, decimals),
                down: sideways(current_price, &tiers, Direction::Down, decimals),
            },
            TargetMode::LevelLookup => PriceTargets {
                up: ladder(
                    &levels.up_candidates(current_price),
                    current_price,
                    &tiers,
                    Direction::Up,
                    decimals,
                ),
                down: ladder(
                    &levels.down_candidates(current_price),
                    current_price,
                    &tiers,
                    Direction::Down,
                    decimals,
                ),
            },
        };

        debug!(
            "targets for {:?} at {:.4}: up {:?}, down {:?}",
            mode, current_price, targets.up, targets.down
        );
        Ok(targets)
    }

    /// Targets plus entry, exit, stop-loss and reward-to-risk for a decision
    pub fn plan(
        &self,
        decision: Decision,
        prediction: TrendPrediction,
        current_price: f64,
        volatility: f64,
        levels: &PlannerLevels,
    ) -> Result<TradePlan, AnalysisError> {
        let targets = self.targets(current_price, volatility, levels, prediction)?;

        let entry = plan::entry_point(decision, current_price, levels);
        let exit = plan::exit_point(decision, current_price, entry, &targets, levels);
        let stop = plan::stop_loss(decision, entry);
        let reward_to_risk = plan::reward_to_risk(decision, entry, exit, stop);

        debug!(
            "{} plan: entry {}, exit {}, stop {}, r/r {:?}",
            decision.to_label(),
            entry,
            exit,
            stop,
            reward_to_risk
        );

        Ok(TradePlan {
            entry_point: entry,
            exit_point: exit,
            stop_loss: stop,
            up_targets: targets.up,
            down_targets: targets.down,
            reward_to_risk,
        })
    }
}

fn check_price(current_price: f64) -> Result<(), AnalysisError> {
    if current_price.is_finite() && current_price > 0.0 {
        Ok(())
    } else {
        Err(AnalysisError::CalculationError(format!(
            "current price must be positive, got {}",
            current_price
        )))
    }
}

fn sideways(current_price: f64, tiers: &Tiers, direction: Direction, decimals: u32) -> Vec<f64> {
    [tiers.pct1, tiers.pct2]
        .into_iter()
        .map(|pct| round_to(direction.step(current_price, pct), decimals))
        .collect()
}

/// Tier 1 is the raw percentage target. Each later target looks up the pool at the
/// previous tier's threshold, falling back to its own tier, and must lie strictly
/// beyond the target before it.
fn ladder(
    pool: &CandidatePool,
    current_price: f64,
    tiers: &Tiers,
    direction: Direction,
    decimals: u32,
) -> Vec<f64> {
    let thresholds = tiers.as_array().map(|pct| direction.step(current_price, pct));
    let steps = [TIER2_STEP, TIER3_STEP];

    let mut targets = vec![round_to(thresholds[0], decimals)];
    for tier in 1..thresholds.len() {
        let prev = targets[tier - 1];
        let lookup = thresholds[tier - 1];
        let beyond_prev = pool.filtered(|v| direction.beyond(round_to(v, decimals), prev));

        let raw = match select_level(&beyond_prev, lookup, direction) {
            Some(level) => direction.furthest(lookup, level),
            None => thresholds[tier],
        };
        let mut target = round_to(raw, decimals);
        if !direction.beyond(target, prev) {
            target = round_to(direction.step(prev, steps[tier - 1]), decimals);
        }
        targets.push(target);
    }
    targets
}
