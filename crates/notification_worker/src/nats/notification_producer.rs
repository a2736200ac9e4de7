use async_trait::async_trait;
use common::domain::{
    DomainError, DomainResult, Notification, NotificationCreatedEvent, NotificationCreatedProducer,
};
use common::nats::JetStreamPublisher;
use std::sync::Arc;
use tracing::debug;

/// Publishes notification-created events to JetStream, standing in for the
/// store's own create-trigger. Subject: `{base_subject}.{site}`.
pub struct JetStreamNotificationProducer {
    publisher: Arc<dyn JetStreamPublisher>,
    base_subject: String,
}

impl JetStreamNotificationProducer {
    pub fn new(publisher: Arc<dyn JetStreamPublisher>, base_subject: String) -> Self {
        debug!(base_subject = %base_subject, "initialized JetStreamNotificationProducer");
        Self {
            publisher,
            base_subject,
        }
    }
}

#[async_trait]
impl NotificationCreatedProducer for JetStreamNotificationProducer {
    async fn notification_created(&self, notification: &Notification) -> DomainResult<()> {
        let event = NotificationCreatedEvent::from(notification);
        let payload = serde_json::to_vec(&event)
            .map_err(|e| DomainError::RepositoryError(anyhow::Error::new(e)))?;

        let subject = format!("{}.{}", self.base_subject, notification.site);

        self.publisher
            .publish(subject, payload.into())
            .await
            .map_err(DomainError::RepositoryError)?;

        Ok(())
    }
}
