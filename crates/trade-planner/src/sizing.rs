use analysis_core::stats::round_to;

use crate::models::{Direction, PositionSizing, PriceTargets, TargetReturn};

impl PositionSizing {
    /// Whole shares affordable with `investment` at `price`
    pub fn for_investment(investment: f64, price: f64) -> Self {
        let shares = if price > 0.0 && investment.is_finite() && investment > 0.0 {
            (investment / price).floor() as u64
        } else {
            0
        };
        let invested = shares as f64 * price;
        Self {
            shares,
            invested: round_to(invested, 2),
            remaining_cash: round_to(investment.max(0.0) - invested, 2),
        }
    }
}

/// P/L of `shares` at every up target, then every down target
pub fn target_returns(current_price: f64, shares: u64, targets: &PriceTargets) -> Vec<TargetReturn> {
    let sides = [(Direction::Up, "Upward", &targets.up), (Direction::Down, "Downward", &targets.down)];

    sides
        .into_iter()
        .flat_map(|(direction, side, list)| {
            list.iter().enumerate().map(move |(i, &target)| {
                let pct_move = (target / current_price - 1.0) * 100.0;
                TargetReturn {
                    label: format!("{} - Target {} ({:+.1}%)", side, i + 1, pct_move),
                    direction,
                    target,
                    pct_move: round_to(pct_move, 2),
                    profit_loss: round_to((target - current_price) * shares as f64, 2),
                }
            })
        })
        .collect()
}
