//! Logging setup and configuration

use anyhow::Result;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_DIR: &str = "output/logs";
const LOG_FILE: &str = "flash-arb-bot.log";

pub struct LoggingGuard {
    pub _guard: tracing_appender::non_blocking::WorkerGuard,
}

/// `RUST_LOG` when set, otherwise info everywhere with debug for this crate's targets.
pub fn log_filter() -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => Ok(EnvFilter::new("info")
            .add_directive(format!("{}=debug", env!("CARGO_CRATE_NAME")).parse()?)),
    }
}

/// Console shows the module target for crate events only; the notify sink logs under
/// its own `notify` target. The file layer rolls hourly under `output/logs`.
pub fn setup_logging() -> Result<Arc<LoggingGuard>> {
    let file_appender = tracing_appender::rolling::hourly(LOG_DIR, LOG_FILE);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_ansi(true)
                .with_level(true)
                .compact()
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_target(true)
                .with_level(true)
                .with_ansi(false)
                .json()
        )
        .with(log_filter()?)
        .init();

    Ok(Arc::new(LoggingGuard { _guard: guard }))
}

pub fn setup_output_directories() -> Result<()> {
    use std::fs;

    for dir in [LOG_DIR, "output/opportunities", "output/executions", "output/reports"] {
        fs::create_dir_all(dir)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_raises_crate_level() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let filter = log_filter().unwrap().to_string();
        assert!(filter.contains("flash_arb_bot=debug"));
    }
}
