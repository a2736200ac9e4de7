use crate::domain::CollecteNotificationService;
use async_nats::jetstream::Message;
use common::domain::{CollecteKind, DocumentCreatedEvent};
use common::nats::{BatchProcessor, ProcessingResult};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Create a BatchProcessor for one collecte kind. Decode failures are
/// nak'd; service failures are nak'd so the platform redelivers, which is
/// the whole failure story for these handlers.
pub fn create_collecte_processor(
    kind: CollecteKind,
    service: Arc<CollecteNotificationService>,
) -> BatchProcessor {
    Box::new(move |messages: &[Message]| {
        let service = Arc::clone(&service);

        // Copy payloads out of the borrowed messages before going async
        let message_data: Vec<(usize, Vec<u8>, String)> = messages
            .iter()
            .enumerate()
            .map(|(idx, msg)| (idx, msg.payload.to_vec(), msg.subject.to_string()))
            .collect();

        Box::pin(async move {
            let mut ack = Vec::new();
            let mut nak = Vec::new();

            for (idx, payload, subject) in message_data {
                let event: DocumentCreatedEvent = match serde_json::from_slice(&payload) {
                    Ok(event) => event,
                    Err(e) => {
                        error!(
                            error = %e,
                            subject = %subject,
                            "failed to decode DocumentCreatedEvent"
                        );
                        nak.push((idx, Some(format!("Decode error: {}", e))));
                        continue;
                    }
                };

                match service.handle_collecte(kind, event).await {
                    Ok(()) => {
                        debug!(index = idx, "collecte notification created");
                        ack.push(idx);
                    }
                    Err(e) => {
                        warn!(
                            error = %e,
                            index = idx,
                            "failed to handle collecte event"
                        );
                        nak.push((idx, Some(e.to_string())));
                    }
                }
            }

            Ok(ProcessingResult { ack, nak })
        })
    })
}

// Processor behavior over real NATS messages is covered by integration
// testing with live infrastructure; constructing jetstream::Message values
// requires an actual connection.
