//! Daily summary reports

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use serde_json::json;
use std::path::Path;
use tracing::info;
use crate::{bot::TradingStats, types::SafetyStatus};

pub const REPORTS_DIR: &str = "output/reports";

pub fn save_daily_report(day: NaiveDate, stats: &TradingStats, safety: &SafetyStatus) -> Result<()> {
    save_daily_report_in(Path::new(REPORTS_DIR), day, stats, safety)
}

pub fn save_daily_report_in(
    dir: &Path,
    day: NaiveDate,
    stats: &TradingStats,
    safety: &SafetyStatus,
) -> Result<()> {
    let filename = dir.join(format!("daily_{}.json", day.format("%Y-%m-%d")));
    let report = json!({
        "day": day.to_string(),
        "generated_at": Utc::now(),
        "stats": stats,
        "net_profit": stats.net_profit(),
        "success_rate": stats.success_rate(),
        "safety": safety,
    });
    std::fs::write(&filename, serde_json::to_string_pretty(&report)?)?;

    info!(report = %filename.display(), "📄 Saved daily report");
    Ok(())
}
