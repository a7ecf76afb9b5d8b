use analysis_core::{Decision, TrendPrediction};
use serde::{Deserialize, Serialize};

/// Confidence taken off when the financial score is below 50
pub const WEAK_FUNDAMENTALS_PENALTY: f64 = 15.0;
const NEUTRAL_RSI: f64 = 50.0;

/// Trend prediction and its base confidence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendOutlook {
    pub prediction: TrendPrediction,
    pub base_confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionOutcome {
    pub decision: Decision,
    pub score: f64,
    /// Percentage, 0 to 100
    pub confidence: f64,
    pub reasons: Vec<String>,
}

/// Inputs of one decision
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionInputs {
    /// Overall financial health, 0 to 100
    pub financial_score: f64,
    pub avg_net_score: f64,
    /// Return volatility in percent
    pub volatility: f64,
    /// RSI_14 of the latest row
    pub rsi: Option<f64>,
}

/// Merges the smoothed technical score with the financial health score
#[derive(Debug, Clone, Copy, Default)]
pub struct DecisionCombiner;

impl DecisionCombiner {
    pub fn new() -> Self {
        Self
    }

    pub fn predict_trend(&self, avg_net_score: f64, financial_score: f64) -> TrendOutlook {
        let (prediction, base_confidence) = if avg_net_score > 2.0 && financial_score >= 70.0 {
            (TrendPrediction::StrongUptrend, (60.0 + avg_net_score * 5.0).min(85.0))
        } else if avg_net_score > 0.0 && financial_score >= 50.0 {
            (TrendPrediction::PossibleUptrend, (55.0 + avg_net_score * 5.0).min(75.0))
        } else if avg_net_score < -2.0 && financial_score < 40.0 {
            (TrendPrediction::StrongDowntrend, (60.0 + avg_net_score.abs() * 5.0).min(85.0))
        } else if avg_net_score < 0.0 && financial_score < 50.0 {
            (TrendPrediction::PossibleDowntrend, (55.0 + avg_net_score.abs() * 5.0).min(75.0))
        } else {
            (TrendPrediction::Sideways, 50.0)
        };
        TrendOutlook {
            prediction,
            base_confidence,
        }
    }

    pub fn decide(&self, inputs: &DecisionInputs, base_confidence: f64) -> DecisionOutcome {
        let mut score = 0.0;
        let mut reasons = Vec::new();
        let fin = inputs.financial_score;
        let avg = inputs.avg_net_score;

        let (points, reason) = if fin >= 80.0 {
            (4.0, "Excellent financial health")
        } else if fin >= 70.0 {
            (3.0, "Strong financial performance")
        } else if fin >= 60.0 {
            (2.0, "Good financial stability")
        } else if fin >= 40.0 {
            (1.0, "Moderate financial health")
        } else {
            (-2.0, "Weak financial performance")
        };
        score += points;
        reasons.push(format!("{} ({:.1})", reason, fin));

        let technical = if avg >= 3.0 {
            Some((3.0, "Very strong technical signals"))
        } else if avg >= 1.5 {
            Some((2.0, "Strong technical momentum"))
        } else if avg >= 0.5 {
            Some((1.0, "Positive technical trend"))
        } else if avg <= -3.0 {
            Some((-3.0, "Very weak technical signals"))
        } else if avg <= -1.5 {
            Some((-2.0, "Negative technical momentum"))
        } else if avg <= -0.5 {
            Some((-1.0, "Bearish technical trend"))
        } else {
            None
        };
        if let Some((points, reason)) = technical {
            score += points;
            reasons.push(format!("{} ({:.2})", reason, avg));
        }

        if inputs.volatility > 5.0 {
            score -= 0.5;
            reasons.push(format!("High volatility risk ({:.1}%)", inputs.volatility));
        } else if inputs.volatility < 2.0 {
            score += 0.5;
        }

        let rsi = inputs.rsi.unwrap_or(NEUTRAL_RSI);
        if rsi <= 30.0 {
            score += 0.5;
            reasons.push("RSI indicates oversold condition".to_string());
        } else if rsi >= 70.0 {
            score -= 0.5;
            reasons.push("RSI indicates overbought condition".to_string());
        }

        let penalty = if fin < 50.0 { WEAK_FUNDAMENTALS_PENALTY } else { 0.0 };
        let confidence = (base_confidence - penalty).clamp(0.0, 100.0);

        DecisionOutcome {
            decision: Decision::from_score(score),
            score,
            confidence,
            reasons,
        }
    }
}

/// avg_net_score mapped from roughly -4..4 onto 0..100
pub fn technical_score(avg_net_score: f64) -> f64 {
    ((avg_net_score + 4.0) / 8.0 * 100.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(financial_score: f64, avg_net_score: f64, volatility: f64, rsi: Option<f64>) -> DecisionInputs {
        DecisionInputs {
            financial_score,
            avg_net_score,
            volatility,
            rsi,
        }
    }

    #[test]
    fn test_trend_prediction_table() {
        let c = DecisionCombiner::new();
        let cases = [
            (3.0, 75.0, TrendPrediction::StrongUptrend, 75.0),
            (6.0, 90.0, TrendPrediction::StrongUptrend, 85.0),
            (2.0, 75.0, TrendPrediction::PossibleUptrend, 65.0),
            (1.0, 50.0, TrendPrediction::PossibleUptrend, 60.0),
            (-3.0, 30.0, TrendPrediction::StrongDowntrend, 75.0),
            (-1.0, 45.0, TrendPrediction::PossibleDowntrend, 60.0),
            (-5.0, 45.0, TrendPrediction::PossibleDowntrend, 75.0),
            (1.0, 40.0, TrendPrediction::Sideways, 50.0),
            (0.0, 90.0, TrendPrediction::Sideways, 50.0),
            (-1.0, 60.0, TrendPrediction::Sideways, 50.0),
        ];
        for (avg, fin, prediction, base) in cases {
            let outlook = c.predict_trend(avg, fin);
            assert_eq!(outlook.prediction, prediction, "avg {} fin {}", avg, fin);
            assert!((outlook.base_confidence - base).abs() < 1e-9, "avg {} fin {}", avg, fin);
        }
    }

    #[test]
    fn test_strong_buy_with_reasons() {
        let out = DecisionCombiner::new().decide(&inputs(85.0, 3.2, 1.5, Some(25.0)), 76.0);
        assert_eq!(out.score, 8.0);
        assert_eq!(out.decision, Decision::StrongBuy);
        assert_eq!(out.confidence, 76.0);
        assert_eq!(
            out.reasons,
            vec![
                "Excellent financial health (85.0)".to_string(),
                "Very strong technical signals (3.20)".to_string(),
                "RSI indicates oversold condition".to_string(),
            ]
        );
    }

    #[test]
    fn test_weak_fundamentals_sell() {
        let out = DecisionCombiner::new().decide(&inputs(30.0, -1.6, 6.0, Some(72.0)), 60.0);
        // -2 - 2 - 0.5 - 0.5
        assert_eq!(out.score, -5.0);
        assert_eq!(out.decision, Decision::StrongSell);
        assert_eq!(out.confidence, 45.0);
        assert_eq!(out.reasons.len(), 4);
        assert_eq!(out.reasons[2], "High volatility risk (6.0%)");
    }

    #[test]
    fn test_neutral_inputs_hold() {
        let out = DecisionCombiner::new().decide(&inputs(50.0, 0.2, 3.0, None), 50.0);
        assert_eq!(out.score, 1.0);
        assert_eq!(out.decision, Decision::Hold);
        assert_eq!(out.reasons.len(), 1);
    }

    #[test]
    fn test_confidence_clamped() {
        let out = DecisionCombiner::new().decide(&inputs(10.0, 0.0, 3.0, None), 5.0);
        assert_eq!(out.confidence, 0.0);
    }

    #[test]
    fn test_decision_boundaries() {
        let c = DecisionCombiner::new();
        // 1 (fin 40) + 1 (avg 0.5) = 2
        assert_eq!(c.decide(&inputs(40.0, 0.5, 3.0, None), 50.0).decision, Decision::Buy);
        // -2 (fin) + 1 (avg 0.5) = -1
        assert_eq!(c.decide(&inputs(20.0, 0.5, 3.0, None), 50.0).decision, Decision::Hold);
        // -2 (fin) - 1 (avg) = -3
        assert_eq!(c.decide(&inputs(20.0, -0.5, 3.0, None), 50.0).decision, Decision::Sell);
    }

    #[test]
    fn test_technical_score() {
        assert_eq!(technical_score(0.0), 50.0);
        assert_eq!(technical_score(4.0), 100.0);
        assert_eq!(technical_score(-9.0), 0.0);
        assert_eq!(technical_score(2.0), 75.0);
    }
}
