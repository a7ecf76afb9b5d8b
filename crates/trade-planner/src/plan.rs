//! Entry, exit and stop-loss points for a trading decision.
//!
//! Buy and Hold enter at the highest support-side level, Sell at the lowest
//! resistance-side level. Prices are rounded to cents, or to four significant
//! digits below one, and stop and exit always sit at least one tick off the entry.

use analysis_core::stats::{price_decimals, round_to, tick};
use analysis_core::Decision;

use crate::models::{PlannerLevels, PriceTargets};

/// Stop-loss distance from the entry
pub const STOP_LOSS_PCT: f64 = 0.05;
/// Exit distance used when no level lies on the profitable side of the entry
pub const EXIT_FALLBACK_PCT: f64 = 0.05;
pub const PLAN_DECIMALS: u32 = 2;

fn round_price(value: f64) -> f64 {
    round_to(value, price_decimals(value, PLAN_DECIMALS))
}

fn usable(values: impl IntoIterator<Item = Option<f64>>) -> Vec<f64> {
    values
        .into_iter()
        .flatten()
        .filter(|v| v.is_finite() && *v > 0.0)
        .collect()
}

pub fn entry_point(decision: Decision, current_price: f64, levels: &PlannerLevels) -> f64 {
    let fib = levels.fibonacci;
    let entry = if decision.is_sell() {
        usable([
            levels.resistance,
            fib.map(|f| f.fib_38_2),
            levels.zone_ceiling_above(current_price),
            levels.long_resistance,
            levels.bb_upper,
        ])
        .into_iter()
        .reduce(f64::min)
    } else {
        usable([
            levels.support,
            fib.map(|f| f.fib_61_8),
            levels.zone_floor_below(current_price),
            levels.long_support,
            levels.bb_lower,
        ])
        .into_iter()
        .reduce(f64::max)
    };
    round_price(entry.unwrap_or(current_price))
}

/// Buy exits at the nearest level above the entry, Sell at the nearest below it.
/// Hold exits at the current price.
pub fn exit_point(
    decision: Decision,
    current_price: f64,
    entry: f64,
    targets: &PriceTargets,
    levels: &PlannerLevels,
) -> f64 {
    let fib = levels.fibonacci;
    let decimals = price_decimals(entry, PLAN_DECIMALS).max(price_decimals(current_price, PLAN_DECIMALS));
    let round = |v: f64| round_to(v, decimals);
    let step = tick(decimals);

    if decision.is_buy() {
        let target = second_or_first(&targets.up).unwrap_or(current_price * (1.0 + EXIT_FALLBACK_PCT));
        let nearest = usable([
            Some(target),
            levels.resistance,
            fib.map(|f| f.fib_23_6),
            levels.long_resistance,
            levels.bb_upper,
            levels.zone_high_above(current_price),
        ])
        .into_iter()
        .map(round)
        .filter(|&v| v > entry)
        .reduce(f64::min);

        let exit = nearest.unwrap_or_else(|| {
            let fallback = round(current_price * (1.0 + EXIT_FALLBACK_PCT));
            if fallback > entry {
                fallback
            } else {
                round(entry * (1.0 + EXIT_FALLBACK_PCT))
            }
        });
        exit.max(round(entry + step))
    } else if decision.is_sell() {
        let target = second_or_first(&targets.down).unwrap_or(current_price * (1.0 - EXIT_FALLBACK_PCT));
        let nearest = usable([
            Some(target),
            levels.support,
            fib.map(|f| f.fib_78_6),
            levels.long_support,
            levels.bb_lower,
            levels.zone_low_below(current_price),
        ])
        .into_iter()
        .map(round)
        .filter(|&v| v < entry)
        .reduce(f64::max);

        let exit = nearest.unwrap_or_else(|| {
            let fallback = round(current_price * (1.0 - EXIT_FALLBACK_PCT));
            if fallback < entry {
                fallback
            } else {
                round(entry * (1.0 - EXIT_FALLBACK_PCT))
            }
        });
        exit.min(round(entry - step))
    } else {
        round_price(current_price)
    }
}

fn second_or_first(targets: &[f64]) -> Option<f64> {
    targets.get(1).or_else(|| targets.first()).copied()
}

/// Fixed band off the entry: below it for Buy and Hold, above it for Sell
pub fn stop_loss(decision: Decision, entry: f64) -> f64 {
    let decimals = price_decimals(entry, PLAN_DECIMALS);
    let step = tick(decimals);
    if decision.is_sell() {
        round_to(entry * (1.0 + STOP_LOSS_PCT), decimals).max(round_to(entry + step, decimals))
    } else {
        round_to(entry * (1.0 - STOP_LOSS_PCT), decimals).min(round_to(entry - step, decimals))
    }
}

/// Defined only when the exit lies on the profitable side of the entry
pub fn reward_to_risk(decision: Decision, entry: f64, exit: f64, stop: f64) -> Option<f64> {
    let risk = (entry - stop).abs();
    let profitable = (decision.is_buy() && exit > entry) || (decision.is_sell() && exit < entry);
    if risk > 0.0 && profitable {
        Some(round_to((exit - entry).abs() / risk, PLAN_DECIMALS))
    } else {
        None
    }
}
