use crate::nats::traits::{JetStreamConsumer, PullConsumer};
use anyhow::{Context as _, Result};
use async_nats::jetstream;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Outcome of one processed batch: message indices to acknowledge and
/// indices to reject (with an optional reason for the log).
pub struct ProcessingResult {
    pub ack: Vec<usize>,
    pub nak: Vec<(usize, Option<String>)>,
}

/// Batch handler installed on a consumer. Implementations copy what they
/// need out of the messages before returning their future.
pub type BatchProcessor = Box<
    dyn Fn(
            &[jetstream::Message],
        ) -> Pin<Box<dyn Future<Output = Result<ProcessingResult>> + Send>>
        + Send
        + Sync,
>;

/// Durable pull consumer driving a BatchProcessor until cancellation.
///
/// A nak'd message is redelivered by JetStream, which is how handler
/// failures surface to the platform's retry policy.
pub struct NatsConsumer {
    consumer: Box<dyn PullConsumer>,
    stream_name: String,
    consumer_name: String,
    batch_size: usize,
    max_wait: Duration,
    processor: BatchProcessor,
}

impl NatsConsumer {
    pub async fn new(
        jetstream: Arc<dyn JetStreamConsumer>,
        stream_name: &str,
        consumer_name: &str,
        subject_filter: &str,
        batch_size: usize,
        max_wait_secs: u64,
        processor: BatchProcessor,
    ) -> Result<Self> {
        debug!(
            stream = %stream_name,
            consumer = %consumer_name,
            filter_subject = %subject_filter,
            "creating nats consumer"
        );

        let config = jetstream::consumer::pull::Config {
            name: Some(consumer_name.to_string()),
            durable_name: Some(consumer_name.to_string()),
            filter_subject: subject_filter.to_string(),
            ack_policy: jetstream::consumer::AckPolicy::Explicit,
            ..Default::default()
        };

        let consumer = jetstream
            .create_consumer(config, stream_name)
            .await
            .context("failed to create consumer")?;

        Ok(Self {
            consumer,
            stream_name: stream_name.to_string(),
            consumer_name: consumer_name.to_string(),
            batch_size,
            max_wait: Duration::from_secs(max_wait_secs),
            processor,
        })
    }

    pub async fn run(self, ctx: CancellationToken) -> Result<()> {
        debug!(
            stream = %self.stream_name,
            consumer = %self.consumer_name,
            "starting nats consumer"
        );

        loop {
            tokio::select! {
                _ = ctx.cancelled() => {
                    info!(
                        stream = %self.stream_name,
                        consumer = %self.consumer_name,
                        "received shutdown signal, stopping consumer"
                    );
                    break;
                }
                result = self.fetch_and_process_batch() => {
                    if let Err(e) = result {
                        error!(
                            stream = %self.stream_name,
                            consumer = %self.consumer_name,
                            error = %e,
                            "error processing batch"
                        );
                        // Keep consuming despite errors
                        tokio::time::sleep(Duration::from_secs(1)).await;
                    }
                }
            }
        }

        debug!(
            stream = %self.stream_name,
            consumer = %self.consumer_name,
            "consumer stopped gracefully"
        );
        Ok(())
    }

    async fn fetch_and_process_batch(&self) -> Result<()> {
        let messages = self
            .consumer
            .fetch_messages(self.batch_size, self.max_wait)
            .await?;

        if messages.is_empty() {
            return Ok(());
        }

        debug!(message_count = messages.len(), "received message batch");

        let result = (self.processor)(&messages).await?;

        for idx in result.ack {
            if let Some(msg) = messages.get(idx) {
                if let Err(e) = msg.ack().await {
                    error!(subject = %msg.subject, error = %e, "failed to acknowledge message");
                }
            }
        }

        for (idx, reason) in result.nak {
            if let Some(msg) = messages.get(idx) {
                match reason {
                    Some(ref r) => warn!(subject = %msg.subject, reason = %r, "rejecting message"),
                    None => warn!(subject = %msg.subject, "rejecting message"),
                }
                if let Err(e) = msg.ack_with(jetstream::AckKind::Nak(None)).await {
                    error!(subject = %msg.subject, error = %e, "failed to reject message");
                }
            }
        }

        Ok(())
    }
}
