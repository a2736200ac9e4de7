mod config;

use caisse_runner::Runner;
use common::domain::NotificationWriter;
use common::nats::NatsClient;
use common::postgres::{
    PostgresClient, PostgresCreditSaleRepository, PostgresDeviceTokenRepository,
    PostgresNotificationRepository,
};
use common::telemetry::{init_telemetry, TelemetryConfig};
use config::ServiceConfig;
use credit_scanner::{CreditScanner, CreditScannerConfig};
use notification_worker::nats::JetStreamNotificationProducer;
use notification_worker::{NotificationWorker, NotificationWorkerConfig};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() {
    let config = match ServiceConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_telemetry(&TelemetryConfig {
        service_name: config.service_name.clone(),
        log_level: config.log_level.clone(),
    }) {
        eprintln!("Failed to initialize telemetry: {}", e);
        std::process::exit(1);
    }

    info!("starting caisse notification service");
    debug!("configuration: {:?}", config);

    let (postgres_client, nats_client) = match initialize_shared_dependencies(&config).await {
        Ok(deps) => deps,
        Err(e) => {
            error!("Failed to initialize shared dependencies: {}", e);
            std::process::exit(1);
        }
    };

    let notification_repository =
        Arc::new(PostgresNotificationRepository::new(postgres_client.clone()));
    let device_token_repository =
        Arc::new(PostgresDeviceTokenRepository::new(postgres_client.clone()));
    let credit_sale_repository = Arc::new(PostgresCreditSaleRepository::new(postgres_client));

    let notification_worker = match NotificationWorker::new(
        notification_repository.clone(),
        device_token_repository,
        nats_client.clone(),
        NotificationWorkerConfig {
            documents_stream: config.documents_stream.clone(),
            notifications_stream: config.notifications_stream.clone(),
            push_stream: config.push_stream.clone(),
            nats_batch_size: config.nats_batch_size,
            nats_batch_wait_secs: config.nats_batch_wait_secs,
        },
    )
    .await
    {
        Ok(worker) => worker,
        Err(e) => {
            error!("Failed to initialize notification worker: {}", e);
            std::process::exit(1);
        }
    };

    // The scanner writes through the same path as the stream handlers so
    // its notifications also reach the push relay.
    let scan_writer = Arc::new(NotificationWriter::new(
        notification_repository,
        Arc::new(JetStreamNotificationProducer::new(
            nats_client.create_publisher_client(),
            config.notifications_stream.clone(),
        )),
    ));
    let scanner = CreditScanner::new(
        credit_sale_repository,
        scan_writer,
        CreditScannerConfig {
            cron_expression: config.scan_cron.clone(),
            timezone: config.scan_timezone.clone(),
        },
    );

    let mut runner = Runner::new();

    for process in notification_worker.into_runner_processes() {
        runner = runner.with_boxed_app_process(process);
    }
    runner = runner.with_boxed_app_process(scanner.into_runner_process());

    runner = runner
        .with_closer({
            let nats_for_close = Arc::clone(&nats_client);
            move || async move {
                nats_for_close.close().await;
                info!("cleanup complete");
                Ok(())
            }
        })
        .with_closer_timeout(Duration::from_secs(10));

    runner.run().await;
}

async fn initialize_shared_dependencies(
    config: &ServiceConfig,
) -> anyhow::Result<(PostgresClient, Arc<NatsClient>)> {
    info!("initializing PostgreSQL");
    let postgres_client = PostgresClient::new(
        &config.postgres_host,
        config.postgres_port,
        &config.postgres_database,
        &config.postgres_username,
        &config.postgres_password,
        config.postgres_pool_size,
    )?;
    postgres_client.ping().await?;

    info!("initializing NATS");
    let nats_client = Arc::new(
        NatsClient::connect(
            &config.nats_url,
            Duration::from_secs(config.startup_timeout_secs),
        )
        .await?,
    );
    nats_client.ensure_stream(&config.documents_stream).await?;
    nats_client
        .ensure_stream(&config.notifications_stream)
        .await?;
    nats_client.ensure_stream(&config.push_stream).await?;

    Ok((postgres_client, nats_client))
}
