//! signal-cli: score a single stock's price history and print a trade plan.
//!
//! Usage:
//!   cargo run -p signal-cli -- prices.csv --score 72
//!   cargo run -p signal-cli -- prices.csv --fundamentals fundamentals.json --summary
//!   cargo run -p signal-cli -- prices.csv --score 55 --dynamic-weights --investment 5000

mod loader;

use analysis_core::FundamentalSnapshot;
use analysis_orchestrator::{AnalysisConfig, AnalysisReport, StockAnalyzer};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "signal-cli",
    about = "Technical signal scoring and price-target planning for one stock"
)]
struct Cli {
    /// CSV price history with Date, Open, High, Low, Close and Volume columns.
    prices: PathBuf,

    /// JSON fundamentals: {"overall_score": 72.5, "ratios": {"debt_to_equity": 0.4}}.
    #[arg(long)]
    fundamentals: Option<PathBuf>,

    /// Overall financial health score (0-100). Overrides the fundamentals file.
    #[arg(long)]
    score: Option<f64>,

    /// Amount to size the position with.
    #[arg(long)]
    investment: Option<f64>,

    /// Scale indicator weights by market condition.
    #[arg(long, default_value_t = false)]
    dynamic_weights: bool,

    /// Rows averaged into the smoothed technical score.
    #[arg(long)]
    avg_window: Option<usize>,

    /// Print the decision and trade plan only.
    #[arg(long, default_value_t = false)]
    summary: bool,

    /// Pretty-print the JSON output.
    #[arg(long, default_value_t = false)]
    pretty: bool,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "signal_cli=info,analysis_orchestrator=info,technical_analysis=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = build_config(&cli);

    let bars = loader::load_bars(&cli.prices)?;
    tracing::info!("Loaded {} bars from {}", bars.len(), cli.prices.display());

    let fundamentals = load_fundamentals(&cli)?;
    let report = StockAnalyzer::new(config)
        .analyze(&bars, &fundamentals)
        .with_context(|| format!("analysis of {} failed", cli.prices.display()))?;

    let output = if cli.summary {
        summary(&report)
    } else {
        serde_json::to_value(&report)?
    };
    let text = if cli.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{}", text);
    Ok(())
}

/// Environment first, then command-line flags
fn build_config(cli: &Cli) -> AnalysisConfig {
    let mut config = AnalysisConfig::from_env();
    if cli.dynamic_weights {
        config.signal.dynamic_weights = true;
    }
    if let Some(amount) = cli.investment {
        config.investment_amount = amount;
    }
    if let Some(window) = cli.avg_window {
        config.avg_window = window.max(1);
    }
    config
}

fn load_fundamentals(cli: &Cli) -> Result<FundamentalSnapshot> {
    let mut snapshot = match &cli.fundamentals {
        Some(path) => loader::load_fundamentals(path)?,
        None => FundamentalSnapshot::default(),
    };
    if let Some(score) = cli.score {
        snapshot.overall_score = score;
    }
    if cli.fundamentals.is_none() && cli.score.is_none() {
        tracing::warn!("No fundamentals supplied, using a financial score of 0");
    }
    Ok(snapshot)
}

fn summary(report: &AnalysisReport) -> serde_json::Value {
    serde_json::json!({
        "decision": report.decision_label,
        "confidence": report.confidence,
        "decision_score": report.decision_score,
        "reasons": report.reasons,
        "prediction": report.prediction_label,
        "technical_score": report.technical_score,
        "risk_rating": report.risk_rating,
        "current_price": report.current_price,
        "plan": report.plan,
        "position": report.position,
        "target_returns": report.target_returns,
    })
}
