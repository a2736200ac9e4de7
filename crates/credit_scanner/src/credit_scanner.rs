use crate::domain::{OverdueCreditScanService, ScanProcess, ScanScheduleConfig};
use common::domain::{CreditSaleRepository, NotificationWriter};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub struct CreditScannerConfig {
    pub cron_expression: String,
    pub timezone: String,
}

pub struct CreditScanner {
    config: CreditScannerConfig,
    service: Arc<OverdueCreditScanService>,
}

impl CreditScanner {
    pub fn new(
        credit_sale_repository: Arc<dyn CreditSaleRepository>,
        writer: Arc<NotificationWriter>,
        config: CreditScannerConfig,
    ) -> Self {
        debug!("initializing credit scanner module");
        Self {
            config,
            service: Arc::new(OverdueCreditScanService::new(
                credit_sale_repository,
                writer,
            )),
        }
    }

    #[allow(clippy::type_complexity)]
    pub fn into_runner_process(
        self,
    ) -> Box<
        dyn FnOnce(
                CancellationToken,
            ) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = anyhow::Result<()>> + Send>,
            > + Send,
    > {
        Box::new({
            let schedule_config = ScanScheduleConfig {
                cron_expression: self.config.cron_expression,
                timezone: self.config.timezone,
            };
            let service = self.service;
            move |ctx| {
                let process = ScanProcess::new(schedule_config, service, ctx);
                Box::pin(async move { process.run().await })
            }
        })
    }
}
