use analysis_core::{Decision, RiskRating, TrendPrediction};
use serde::{Deserialize, Serialize};
use technical_analysis::{IndicatorRow, LevelSet, ScoreRow};
use trade_planner::{PositionSizing, TargetReturn, TradePlan};

/// Everything one analysis run produces
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub decision: Decision,
    pub decision_label: String,
    pub decision_score: f64,
    pub confidence: f64,
    pub reasons: Vec<String>,
    pub prediction: TrendPrediction,
    pub prediction_label: String,

    pub financial_score: f64,
    pub avg_net_score: f64,
    pub technical_score: f64,

    pub current_price: f64,
    /// Lowest low of the recent window
    pub support: f64,
    /// Highest high of the recent window
    pub resistance: f64,
    /// Return volatility in percent
    pub volatility: f64,
    pub atr: Option<f64>,
    pub risk_rating: RiskRating,

    pub levels: LevelSet,
    pub plan: TradePlan,
    pub position: PositionSizing,
    pub target_returns: Vec<TargetReturn>,

    pub rows: Vec<IndicatorRow>,
    pub scores: Vec<ScoreRow>,
}

impl AnalysisReport {
    /// One-line summary for logs
    pub fn headline(&self) -> String {
        format!(
            "{} ({:.0}% confidence), {} at {:.2}, entry {:.2} exit {:.2} stop {:.2}",
            self.decision_label,
            self.confidence,
            self.prediction_label,
            self.current_price,
            self.plan.entry_point,
            self.plan.exit_point,
            self.plan.stop_loss
        )
    }
}
