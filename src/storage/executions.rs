//! Trade outcome storage

use anyhow::Result;
use chrono::Utc;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tracing::info;
use crate::types::TradeOutcome;

pub const EXECUTIONS_DIR: &str = "output/executions";

pub fn save_trade_outcome(outcome: &TradeOutcome) -> Result<()> {
    save_trade_outcome_in(Path::new(EXECUTIONS_DIR), outcome)
}

pub fn save_trade_outcome_in(dir: &Path, outcome: &TradeOutcome) -> Result<()> {
    let filename = dir.join(format!("trades_{}.jsonl", Utc::now().format("%Y-%m-%d")));

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&filename)?;

    writeln!(file, "{}", serde_json::to_string(outcome)?)?;

    info!(
        opportunity_id = %outcome.opportunity_id,
        success = outcome.success,
        realized_profit = %outcome.realized_profit,
        "Saved trade outcome"
    );

    Ok(())
}
