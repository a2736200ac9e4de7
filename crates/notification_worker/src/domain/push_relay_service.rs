use common::domain::{
    DeviceTokenRepository, DomainResult, ListDeviceTokensRepoInput, MulticastPush,
    NotificationCreatedEvent, PushNotificationBlock, PushSender,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, instrument};

const DEFAULT_TITLE: &str = "Notification";
const DEFAULT_BODY: &str = "Vous avez une nouvelle notification";
const DEFAULT_TYPE: &str = "info";

/// Relays a freshly created notification to every device registered for
/// its site as one multicast push.
///
/// A notification without a site is silently skipped, and missing text
/// fields fall back to generic wording rather than failing the relay.
/// Zero registered tokens is a no-op, not an error.
pub struct PushRelayService {
    device_tokens: Arc<dyn DeviceTokenRepository>,
    push_sender: Arc<dyn PushSender>,
}

impl PushRelayService {
    pub fn new(
        device_tokens: Arc<dyn DeviceTokenRepository>,
        push_sender: Arc<dyn PushSender>,
    ) -> Self {
        Self {
            device_tokens,
            push_sender,
        }
    }

    #[instrument(skip(self, event), fields(notif_id = %event.id))]
    pub async fn handle_notification_created(
        &self,
        event: NotificationCreatedEvent,
    ) -> DomainResult<()> {
        let Some(site) = event.site.filter(|s| !s.is_empty()) else {
            debug!("notification without site, skipping push");
            return Ok(());
        };

        let title = event
            .titre
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());
        let body = event
            .message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_BODY.to_string());
        let kind = event
            .kind
            .filter(|k| !k.is_empty())
            .unwrap_or_else(|| DEFAULT_TYPE.to_string());

        let registrations = self
            .device_tokens
            .list_device_tokens(ListDeviceTokensRepoInput { site: site.clone() })
            .await?;

        let tokens: Vec<String> = registrations
            .into_iter()
            .map(|registration| registration.token)
            .filter(|token| !token.is_empty())
            .collect();

        if tokens.is_empty() {
            debug!(site = %site, "no device tokens registered, skipping push");
            return Ok(());
        }

        let mut data = BTreeMap::new();
        data.insert("type".to_string(), kind);
        data.insert("site".to_string(), site);
        data.insert("titre".to_string(), title.clone());
        data.insert("message".to_string(), body.clone());
        data.insert("notifId".to_string(), event.id);

        debug!(token_count = tokens.len(), "sending multicast push");

        self.push_sender
            .send_multicast(&MulticastPush {
                tokens,
                data,
                notification: PushNotificationBlock { title, body },
            })
            .await
    }
}
