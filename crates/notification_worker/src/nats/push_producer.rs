use async_trait::async_trait;
use common::domain::{DomainError, DomainResult, MulticastPush, PushSender};
use common::nats::JetStreamPublisher;
use std::sync::Arc;
use tracing::debug;

/// Hands multicast pushes to the push gateway by publishing them on its
/// ingest subject. Delivery to individual devices is the gateway's job.
pub struct JetStreamPushSender {
    publisher: Arc<dyn JetStreamPublisher>,
    subject: String,
}

impl JetStreamPushSender {
    pub fn new(publisher: Arc<dyn JetStreamPublisher>, subject: String) -> Self {
        debug!(subject = %subject, "initialized JetStreamPushSender");
        Self { publisher, subject }
    }
}

#[async_trait]
impl PushSender for JetStreamPushSender {
    async fn send_multicast(&self, push: &MulticastPush) -> DomainResult<()> {
        let payload =
            serde_json::to_vec(push).map_err(|e| DomainError::PushSendError(e.to_string()))?;

        self.publisher
            .publish(self.subject.clone(), payload.into())
            .await
            .map_err(|e| DomainError::PushSendError(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::domain::PushNotificationBlock;
    use common::nats::MockJetStreamPublisher;
    use std::collections::BTreeMap;

    #[tokio::test]
    async fn test_multicast_round_trips_as_json() {
        let mut mock_publisher = MockJetStreamPublisher::new();

        mock_publisher
            .expect_publish()
            .withf(|subject: &String, payload: &bytes::Bytes| {
                let push: MulticastPush = serde_json::from_slice(payload).unwrap();
                subject == "push_outbox.multicast"
                    && push.tokens == vec!["tok-1".to_string(), "tok-2".to_string()]
                    && push.notification.title == "Titre"
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let sender = JetStreamPushSender::new(
            Arc::new(mock_publisher),
            "push_outbox.multicast".to_string(),
        );

        let push = MulticastPush {
            tokens: vec!["tok-1".to_string(), "tok-2".to_string()],
            data: BTreeMap::new(),
            notification: PushNotificationBlock {
                title: "Titre".to_string(),
                body: "Corps".to_string(),
            },
        };

        assert!(sender.send_multicast(&push).await.is_ok());
    }

    #[tokio::test]
    async fn test_publish_error_becomes_push_error() {
        let mut mock_publisher = MockJetStreamPublisher::new();

        mock_publisher
            .expect_publish()
            .times(1)
            .returning(|_, _| Err(anyhow::anyhow!("gateway unreachable")));

        let sender = JetStreamPushSender::new(
            Arc::new(mock_publisher),
            "push_outbox.multicast".to_string(),
        );

        let push = MulticastPush {
            tokens: vec!["tok-1".to_string()],
            data: BTreeMap::new(),
            notification: PushNotificationBlock {
                title: "Titre".to_string(),
                body: "Corps".to_string(),
            },
        };

        let result = sender.send_multicast(&push).await;
        assert!(matches!(result, Err(DomainError::PushSendError(_))));
    }
}
