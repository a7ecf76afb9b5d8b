use analysis_core::stats::return_volatility_pct;
use analysis_core::{AnalysisError, Bar, FundamentalSnapshot, RiskRating};
use technical_analysis::{IndicatorRow, TechnicalAnalysisEngine};
use trade_planner::{target_returns, PlannerLevels, PositionSizing, PriceTargetPlanner};

pub mod config;
pub mod decision;
pub mod report;

pub use config::AnalysisConfig;
pub use decision::{technical_score, DecisionCombiner, DecisionInputs, DecisionOutcome, TrendOutlook};
pub use report::AnalysisReport;

/// Runs indicators, scoring, the decision and trade planning over one price history
pub struct StockAnalyzer {
    config: AnalysisConfig,
    technical: TechnicalAnalysisEngine,
    combiner: DecisionCombiner,
    planner: PriceTargetPlanner,
}

impl StockAnalyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        let technical = TechnicalAnalysisEngine::new(config.indicator.clone(), config.signal.clone())
            .with_avg_window(config.avg_window);
        Self {
            config,
            technical,
            combiner: DecisionCombiner::new(),
            planner: PriceTargetPlanner::new(),
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Public accessor for the technical analysis engine
    pub fn technical_engine(&self) -> &TechnicalAnalysisEngine {
        &self.technical
    }

    pub fn analyze(&self, bars: &[Bar], fundamentals: &FundamentalSnapshot) -> Result<AnalysisReport, AnalysisError> {
        tracing::debug!("Starting analysis over {} bars", bars.len());
        let technical = self.technical.analyze(bars)?;
        let frame = &technical.frame;

        let latest = frame
            .latest()
            .ok_or_else(|| AnalysisError::InsufficientData("no rows after warm-up".to_string()))?;
        let current_price = latest.close;
        let (support, resistance) = recent_range(frame.tail(self.config.recent_window.max(1)));
        let volatility = return_volatility_pct(&frame.closes());
        let avg_net_score = technical.avg_net_score;
        let financial_score = fundamentals.overall_score;

        tracing::debug!(
            "price {:.2}, support {:.2}, resistance {:.2}, volatility {:.3}%, avg net score {:.3}",
            current_price,
            support,
            resistance,
            volatility,
            avg_net_score
        );

        let outlook = self.combiner.predict_trend(avg_net_score, financial_score);
        let outcome = self.combiner.decide(
            &DecisionInputs {
                financial_score,
                avg_net_score,
                volatility,
                rsi: latest.rsi_14,
            },
            outlook.base_confidence,
        );

        let levels = PlannerLevels::from_analysis(&frame.levels, latest, support, resistance);
        let plan = self.planner.plan(
            outcome.decision,
            outlook.prediction,
            current_price,
            volatility,
            &levels,
        )?;

        let position = PositionSizing::for_investment(self.config.investment_amount, current_price);
        let targets = trade_planner::PriceTargets {
            up: plan.up_targets.clone(),
            down: plan.down_targets.clone(),
        };
        let returns = target_returns(current_price, position.shares, &targets);
        let risk_rating = RiskRating::assess(volatility, fundamentals.ratio("debt_to_equity"));

        let report = AnalysisReport {
            decision: outcome.decision,
            decision_label: outcome.decision.to_label().to_string(),
            decision_score: outcome.score,
            confidence: outcome.confidence,
            reasons: outcome.reasons,
            prediction: outlook.prediction,
            prediction_label: outlook.prediction.to_label().to_string(),
            financial_score,
            avg_net_score,
            technical_score: technical_score(avg_net_score),
            current_price,
            support,
            resistance,
            volatility,
            atr: latest.atr,
            risk_rating,
            levels: frame.levels.clone(),
            plan,
            position,
            target_returns: returns,
            rows: technical.frame.rows.clone(),
            scores: technical.scores.clone(),
        };

        tracing::info!("Analysis complete: {}", report.headline());
        Ok(report)
    }
}

impl Default for StockAnalyzer {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

/// Lowest low and highest high over `rows`
fn recent_range(rows: &[IndicatorRow]) -> (f64, f64) {
    let support = rows.iter().map(|r| r.low).fold(f64::INFINITY, f64::min);
    let resistance = rows.iter().map(|r| r.high).fold(f64::NEG_INFINITY, f64::max);
    (support, resistance)
}
