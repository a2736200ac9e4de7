use crate::domain::PushRelayService;
use async_nats::jetstream::Message;
use common::domain::NotificationCreatedEvent;
use common::nats::{BatchProcessor, ProcessingResult};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Create a BatchProcessor relaying notification-created events to the
/// push sender.
pub fn create_push_relay_processor(service: Arc<PushRelayService>) -> BatchProcessor {
    Box::new(move |messages: &[Message]| {
        let service = Arc::clone(&service);

        let message_data: Vec<(usize, Vec<u8>, String)> = messages
            .iter()
            .enumerate()
            .map(|(idx, msg)| (idx, msg.payload.to_vec(), msg.subject.to_string()))
            .collect();

        Box::pin(async move {
            let mut ack = Vec::new();
            let mut nak = Vec::new();

            for (idx, payload, subject) in message_data {
                let event: NotificationCreatedEvent = match serde_json::from_slice(&payload) {
                    Ok(event) => event,
                    Err(e) => {
                        error!(
                            error = %e,
                            subject = %subject,
                            "failed to decode NotificationCreatedEvent"
                        );
                        nak.push((idx, Some(format!("Decode error: {}", e))));
                        continue;
                    }
                };

                match service.handle_notification_created(event).await {
                    Ok(()) => {
                        debug!(index = idx, "notification relayed");
                        ack.push(idx);
                    }
                    Err(e) => {
                        warn!(error = %e, index = idx, "failed to relay notification");
                        nak.push((idx, Some(e.to_string())));
                    }
                }
            }

            Ok(ProcessingResult { ack, nak })
        })
    })
}
