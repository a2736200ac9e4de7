use common::domain::{
    display_scalar, first_defined, CollecteKind, CollectePath, DocumentCreatedEvent,
    DomainResult, NewNotification, NotificationPriority, NotificationWriter,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Maps a newly created collecte document to exactly one notification.
///
/// All four collecte kinds share this shape; only the wording, the source
/// collection and the legacy field aliases differ, and those live on
/// `CollecteKind`. Errors are not caught here: a failed write propagates so
/// the triggering message is redelivered.
pub struct CollecteNotificationService {
    writer: Arc<NotificationWriter>,
}

impl CollecteNotificationService {
    pub fn new(writer: Arc<NotificationWriter>) -> Self {
        Self { writer }
    }

    #[instrument(
        skip(self, event),
        fields(collection_path = %event.collection_path, document_id = %event.document_id)
    )]
    pub async fn handle_collecte(
        &self,
        kind: CollecteKind,
        event: DocumentCreatedEvent,
    ) -> DomainResult<()> {
        let path = CollectePath::parse(&event.collection_path)?;

        let poids = first_defined(&event.fields, kind.poids_aliases()).cloned();
        let montant = first_defined(&event.fields, kind.montant_aliases()).cloned();

        let message = build_message(kind, poids.as_ref(), montant.as_ref());

        let mut donnees = serde_json::Map::new();
        donnees.insert("docId".to_string(), Value::String(event.document_id));
        donnees.insert("poidsTotal".to_string(), poids.unwrap_or(Value::Null));
        donnees.insert("montantTotal".to_string(), montant.unwrap_or(Value::Null));

        debug!(site = %path.site, "creating collecte notification");

        self.writer
            .create(NewNotification {
                site: path.site,
                kind: kind.notification_type(),
                titre: kind.titre().to_string(),
                message,
                priorite: NotificationPriority::Normale,
                donnees,
                id: None,
            })
            .await?;

        Ok(())
    }
}

/// Builds the notification body. The weight and amount clauses appear only
/// when a value is present; an absent value omits its whole clause instead
/// of leaving placeholder text.
fn build_message(kind: CollecteKind, poids: Option<&Value>, montant: Option<&Value>) -> String {
    let mut message = kind.message_lead().to_string();
    if let Some(poids) = poids.and_then(display_scalar) {
        message.push_str(&format!(" · {} kg", poids));
    }
    if let Some(montant) = montant.and_then(display_scalar) {
        message.push_str(&format!(" · {} FCFA", montant));
    }
    message
}
