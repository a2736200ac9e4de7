use crate::domain::{CollecteNotificationService, PushRelayService};
use crate::nats::{
    create_collecte_processor, create_push_relay_processor, JetStreamNotificationProducer,
    JetStreamPushSender,
};
use common::domain::{
    CollecteKind, DeviceTokenRepository, NotificationRepository, NotificationWriter,
};
use common::nats::{NatsClient, NatsConsumer};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub struct NotificationWorkerConfig {
    pub documents_stream: String,
    pub notifications_stream: String,
    pub push_stream: String,
    pub nats_batch_size: usize,
    pub nats_batch_wait_secs: u64,
}

/// Wires the collecte handlers and the push relay onto their streams.
///
/// One durable consumer per collecte kind (mirroring the four create
/// triggers of the source collections) plus one consumer for the
/// notification-created feed.
pub struct NotificationWorker {
    collecte_consumers: Vec<NatsConsumer>,
    push_relay_consumer: NatsConsumer,
}

impl NotificationWorker {
    pub async fn new(
        notification_repository: Arc<dyn NotificationRepository>,
        device_token_repository: Arc<dyn DeviceTokenRepository>,
        nats_client: Arc<NatsClient>,
        config: NotificationWorkerConfig,
    ) -> anyhow::Result<Self> {
        info!("initializing notification worker module");

        let publisher = nats_client.create_publisher_client();

        let notification_producer = Arc::new(JetStreamNotificationProducer::new(
            publisher.clone(),
            config.notifications_stream.clone(),
        ));
        let writer = Arc::new(NotificationWriter::new(
            notification_repository,
            notification_producer,
        ));
        let collecte_service = Arc::new(CollecteNotificationService::new(writer));

        let mut collecte_consumers = Vec::with_capacity(CollecteKind::ALL.len());
        for kind in CollecteKind::ALL {
            let processor = create_collecte_processor(kind, collecte_service.clone());
            let consumer = NatsConsumer::new(
                nats_client.create_consumer_client(),
                &config.documents_stream,
                &format!("caisse-collecte-{}", kind.collection()),
                &format!("{}.*.{}", config.documents_stream, kind.collection()),
                config.nats_batch_size,
                config.nats_batch_wait_secs,
                processor,
            )
            .await?;
            collecte_consumers.push(consumer);
        }

        let push_sender = Arc::new(JetStreamPushSender::new(
            publisher,
            format!("{}.multicast", config.push_stream),
        ));
        let push_relay_service = Arc::new(PushRelayService::new(
            device_token_repository,
            push_sender,
        ));
        let push_relay_processor = create_push_relay_processor(push_relay_service);
        let push_relay_consumer = NatsConsumer::new(
            nats_client.create_consumer_client(),
            &config.notifications_stream,
            "caisse-push-relay",
            &format!("{}.>", config.notifications_stream),
            config.nats_batch_size,
            config.nats_batch_wait_secs,
            push_relay_processor,
        )
        .await?;

        info!("notification worker initialized");

        Ok(Self {
            collecte_consumers,
            push_relay_consumer,
        })
    }

    #[allow(clippy::type_complexity)]
    pub fn into_runner_processes(
        self,
    ) -> Vec<
        Box<
            dyn FnOnce(
                    CancellationToken,
                ) -> std::pin::Pin<
                    Box<dyn std::future::Future<Output = anyhow::Result<()>> + Send>,
                > + Send,
        >,
    > {
        let mut processes: Vec<
            Box<
                dyn FnOnce(
                        CancellationToken,
                    ) -> std::pin::Pin<
                        Box<dyn std::future::Future<Output = anyhow::Result<()>> + Send>,
                    > + Send,
            >,
        > = Vec::new();

        for consumer in self.collecte_consumers {
            processes.push(Box::new(move |ctx| {
                Box::pin(async move { consumer.run(ctx).await })
            }));
        }

        let push_relay_consumer = self.push_relay_consumer;
        processes.push(Box::new(move |ctx| {
            Box::pin(async move { push_relay_consumer.run(ctx).await })
        }));

        processes
    }
}
