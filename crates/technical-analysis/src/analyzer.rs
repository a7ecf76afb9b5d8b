use analysis_core::{AnalysisError, Bar};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aggregator::*;
use crate::frame::*;

/// Number of recent rows averaged into `avg_net_score`
pub const DEFAULT_AVG_WINDOW: usize = 30;

/// Indicator frame with per-row scores and the smoothed technical verdict
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnicalAnalysis {
    pub frame: IndicatorFrame,
    pub scores: Vec<ScoreRow>,
    /// Mean Important_Net_Score over the recent window
    pub avg_net_score: f64,
}

pub struct TechnicalAnalysisEngine {
    indicators: IndicatorEngine,
    aggregator: SignalAggregator,
    avg_window: usize,
}

impl TechnicalAnalysisEngine {
    pub fn new(params: IndicatorParams, config: SignalConfig) -> Self {
        Self {
            indicators: IndicatorEngine::new(params),
            aggregator: SignalAggregator::new(config),
            avg_window: DEFAULT_AVG_WINDOW,
        }
    }

    pub fn with_avg_window(mut self, window: usize) -> Self {
        self.avg_window = window.max(1);
        self
    }

    pub fn indicator_engine(&self) -> &IndicatorEngine {
        &self.indicators
    }

    pub fn aggregator(&self) -> &SignalAggregator {
        &self.aggregator
    }

    pub fn analyze(&self, bars: &[Bar]) -> Result<TechnicalAnalysis, AnalysisError> {
        let frame = self.indicators.compute(bars)?;
        let scores = self.aggregator.score(&frame.rows);
        let avg_net_score = avg_net_score(&scores, self.avg_window).ok_or_else(|| {
            AnalysisError::InsufficientData("no scored rows after warm-up".to_string())
        })?;

        debug!(
            "scored {} rows, avg important net score {:.3} over last {}",
            scores.len(),
            avg_net_score,
            self.avg_window
        );

        Ok(TechnicalAnalysis {
            frame,
            scores,
            avg_net_score,
        })
    }
}

impl Default for TechnicalAnalysisEngine {
    fn default() -> Self {
        Self::new(IndicatorParams::default(), SignalConfig::default())
    }
}
