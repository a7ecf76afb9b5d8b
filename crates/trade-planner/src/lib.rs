pub mod models;
pub mod plan;
pub mod sizing;
pub mod targets;
#[cfg(test)]
mod tests;

pub use models::*;
pub use plan::{entry_point, exit_point, reward_to_risk, stop_loss};
pub use sizing::target_returns;
pub use targets::{select_level, PriceTargetPlanner, Tiers};
