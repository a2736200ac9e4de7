use crate::domain::OverdueCreditScanService;
use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use chrono_tz::Tz;
use cron::Schedule;
use std::str::FromStr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

#[derive(Debug, Clone)]
pub struct ScanScheduleConfig {
    /// Six-field cron expression (sec min hour day month day-of-week)
    pub cron_expression: String,
    /// IANA timezone the cron expression is evaluated in
    pub timezone: String,
}

/// Long-running process firing the overdue scan on a cron schedule.
/// Sleeps until the next occurrence in the configured timezone, runs one
/// scan, then re-arms. A failed scan is logged and the schedule keeps going.
pub struct ScanProcess {
    config: ScanScheduleConfig,
    service: Arc<OverdueCreditScanService>,
    cancellation_token: CancellationToken,
}

impl ScanProcess {
    pub fn new(
        config: ScanScheduleConfig,
        service: Arc<OverdueCreditScanService>,
        cancellation_token: CancellationToken,
    ) -> Self {
        Self {
            config,
            service,
            cancellation_token,
        }
    }

    pub async fn run(self) -> Result<()> {
        let schedule = Schedule::from_str(&self.config.cron_expression)
            .with_context(|| format!("invalid cron expression {}", self.config.cron_expression))?;
        let tz: Tz = self
            .config
            .timezone
            .parse()
            .map_err(|e| anyhow!("invalid timezone {}: {e}", self.config.timezone))?;

        debug!(
            cron = %self.config.cron_expression,
            timezone = %self.config.timezone,
            "starting credit scan schedule"
        );

        loop {
            let now = Utc::now().with_timezone(&tz);
            let Some(next) = schedule.after(&now).next() else {
                return Err(anyhow!("cron schedule has no upcoming occurrence"));
            };
            let wait = (next - now)
                .to_std()
                .unwrap_or(std::time::Duration::ZERO);

            debug!(next = %next, "waiting for next scheduled scan");

            tokio::select! {
                _ = self.cancellation_token.cancelled() => {
                    info!("credit scan schedule cancelled, shutting down");
                    return Ok(());
                }
                _ = tokio::time::sleep(wait) => {
                    info!(scheduled_for = %next, "running scheduled overdue credit scan");
                    if let Err(e) = self.service.run_scan().await {
                        error!(error = %e, "scheduled overdue credit scan failed");
                    }
                }
            }
        }
    }
}
