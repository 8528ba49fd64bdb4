//! Arbitrage opportunity storage

use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tracing::debug;
use crate::types::{Opportunity, ProfitResult};

pub const OPPORTUNITIES_DIR: &str = "output/opportunities";

#[derive(Serialize)]
struct OpportunityRecord<'a> {
    #[serde(flatten)]
    opportunity: &'a Opportunity,
    profit: &'a ProfitResult,
    dispatched: bool,
}

pub fn save_opportunity(opp: &Opportunity, profit: &ProfitResult, dispatched: bool) -> Result<()> {
    save_opportunity_in(Path::new(OPPORTUNITIES_DIR), opp, profit, dispatched)
}

pub fn save_opportunity_in(
    dir: &Path,
    opp: &Opportunity,
    profit: &ProfitResult,
    dispatched: bool,
) -> Result<()> {
    let filename = dir.join(format!("arbitrage_{}.jsonl", Utc::now().format("%Y-%m-%d")));

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&filename)?;

    let record = OpportunityRecord {
        opportunity: opp,
        profit,
        dispatched,
    };
    writeln!(file, "{}", serde_json::to_string(&record)?)?;

    debug!(
        opportunity_id = %opp.id,
        net_profit = %profit.net_profit,
        dispatched,
        "Saved arbitrage opportunity"
    );

    Ok(())
}
