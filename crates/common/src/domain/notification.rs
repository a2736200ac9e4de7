use crate::domain::result::{DomainError, DomainResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Enumerated notification tag, stored as its wire string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationType {
    #[serde(rename = "collecte_recolte")]
    CollecteRecolte,
    #[serde(rename = "collecte_scoop")]
    CollecteScoop,
    #[serde(rename = "collecte_individuel")]
    CollecteIndividuel,
    #[serde(rename = "collecte_miellerie")]
    CollecteMiellerie,
    #[serde(rename = "credit_overdue")]
    CreditOverdue,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::CollecteRecolte => "collecte_recolte",
            NotificationType::CollecteScoop => "collecte_scoop",
            NotificationType::CollecteIndividuel => "collecte_individuel",
            NotificationType::CollecteMiellerie => "collecte_miellerie",
            NotificationType::CreditOverdue => "credit_overdue",
        }
    }
}

impl FromStr for NotificationType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "collecte_recolte" => Ok(NotificationType::CollecteRecolte),
            "collecte_scoop" => Ok(NotificationType::CollecteScoop),
            "collecte_individuel" => Ok(NotificationType::CollecteIndividuel),
            "collecte_miellerie" => Ok(NotificationType::CollecteMiellerie),
            "credit_overdue" => Ok(NotificationType::CreditOverdue),
            other => Err(DomainError::InvalidNotificationType(other.to_string())),
        }
    }
}

/// Read status. Notifications are created unread; marking read is a
/// separate client-side operation and never happens in this backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationStatus {
    #[serde(rename = "non_lue")]
    NonLue,
    #[serde(rename = "lue")]
    Lue,
}

impl NotificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationStatus::NonLue => "non_lue",
            NotificationStatus::Lue => "lue",
        }
    }
}

impl FromStr for NotificationStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "non_lue" => Ok(NotificationStatus::NonLue),
            "lue" => Ok(NotificationStatus::Lue),
            other => Err(DomainError::InvalidNotificationStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationPriority {
    #[serde(rename = "basse")]
    Basse,
    #[serde(rename = "normale")]
    Normale,
    #[serde(rename = "haute")]
    Haute,
}

impl NotificationPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationPriority::Basse => "basse",
            NotificationPriority::Normale => "normale",
            NotificationPriority::Haute => "haute",
        }
    }
}

impl FromStr for NotificationPriority {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basse" => Ok(NotificationPriority::Basse),
            "normale" => Ok(NotificationPriority::Normale),
            "haute" => Ok(NotificationPriority::Haute),
            other => Err(DomainError::InvalidNotificationPriority(other.to_string())),
        }
    }
}

/// Domain entity for a caisse notification
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: String,
    pub kind: NotificationType,
    pub site: String,
    pub date_creation: DateTime<Utc>,
    pub titre: String,
    pub message: String,
    pub statut: NotificationStatus,
    pub priorite: NotificationPriority,
    pub donnees: serde_json::Map<String, serde_json::Value>,
}

/// Repository input for creating a notification
#[derive(Debug, Clone, PartialEq)]
pub struct CreateNotificationRepoInput {
    pub id: String,
    pub kind: NotificationType,
    pub site: String,
    pub titre: String,
    pub message: String,
    pub statut: NotificationStatus,
    pub priorite: NotificationPriority,
    pub donnees: serde_json::Map<String, serde_json::Value>,
}

/// Repository input for getting a notification by id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetNotificationRepoInput {
    pub id: String,
}

/// Repository trait for notification persistence operations
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Create a notification with a server-assigned creation timestamp.
    /// Writing an existing id replaces the whole record (no merge).
    async fn create_notification(
        &self,
        input: CreateNotificationRepoInput,
    ) -> DomainResult<Notification>;

    /// Get a notification by id
    async fn get_notification(
        &self,
        input: GetNotificationRepoInput,
    ) -> DomainResult<Option<Notification>>;
}

/// Trait for announcing a freshly created notification so the push relay
/// fires, the same way the store's own create-trigger would.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait NotificationCreatedProducer: Send + Sync {
    async fn notification_created(&self, notification: &Notification) -> DomainResult<()>;
}

/// Wire event emitted on notification creation.
///
/// Deliberately loose: every field except the id is optional so the relay
/// can apply its generic fallbacks instead of rejecting malformed records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationCreatedEvent {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub site: Option<String>,
    #[serde(default)]
    pub titre: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl From<&Notification> for NotificationCreatedEvent {
    fn from(notification: &Notification) -> Self {
        NotificationCreatedEvent {
            id: notification.id.clone(),
            kind: Some(notification.kind.as_str().to_string()),
            site: Some(notification.site.clone()),
            titre: Some(notification.titre.clone()),
            message: Some(notification.message.clone()),
        }
    }
}

/// Parameters for the notification writer. Priority defaults to `normale`
/// and the payload to an empty map when the caller has nothing to attach.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub site: String,
    pub kind: NotificationType,
    pub titre: String,
    pub message: String,
    pub priorite: NotificationPriority,
    pub donnees: serde_json::Map<String, serde_json::Value>,
    /// Optional deterministic id for idempotence; a time-derived id is
    /// generated when omitted.
    pub id: Option<String>,
}

/// Leaf service every handler depends on: persists one notification record
/// and announces its creation. Failures propagate to the caller; there is
/// no local retry.
pub struct NotificationWriter {
    repository: Arc<dyn NotificationRepository>,
    producer: Arc<dyn NotificationCreatedProducer>,
}

impl NotificationWriter {
    pub fn new(
        repository: Arc<dyn NotificationRepository>,
        producer: Arc<dyn NotificationCreatedProducer>,
    ) -> Self {
        Self {
            repository,
            producer,
        }
    }

    #[instrument(skip(self, params), fields(site = %params.site, kind = %params.kind.as_str()))]
    pub async fn create(&self, params: NewNotification) -> DomainResult<Notification> {
        let id = params
            .id
            .unwrap_or_else(|| format!("NOTIF_{}", Utc::now().timestamp_millis()));

        let created = self
            .repository
            .create_notification(CreateNotificationRepoInput {
                id,
                kind: params.kind,
                site: params.site,
                titre: params.titre,
                message: params.message,
                statut: NotificationStatus::NonLue,
                priorite: params.priorite,
                donnees: params.donnees,
            })
            .await?;

        debug!(id = %created.id, "notification created");

        self.producer.notification_created(&created).await?;

        Ok(created)
    }

    /// Existence check used by the overdue-credit scanner's read-before-write.
    pub async fn exists(&self, id: &str) -> DomainResult<bool> {
        let existing = self
            .repository
            .get_notification(GetNotificationRepoInput { id: id.to_string() })
            .await?;
        Ok(existing.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notification_from_input(input: CreateNotificationRepoInput) -> Notification {
        Notification {
            id: input.id,
            kind: input.kind,
            site: input.site,
            date_creation: Utc::now(),
            titre: input.titre,
            message: input.message,
            statut: input.statut,
            priorite: input.priorite,
            donnees: input.donnees,
        }
    }

    #[tokio::test]
    async fn test_writer_generates_time_derived_id() {
        let mut mock_repo = MockNotificationRepository::new();
        let mut mock_producer = MockNotificationCreatedProducer::new();

        mock_repo
            .expect_create_notification()
            .withf(|input: &CreateNotificationRepoInput| {
                input.id.starts_with("NOTIF_") && input.statut == NotificationStatus::NonLue
            })
            .times(1)
            .returning(|input| Ok(notification_from_input(input)));

        mock_producer
            .expect_notification_created()
            .times(1)
            .returning(|_| Ok(()));

        let writer = NotificationWriter::new(Arc::new(mock_repo), Arc::new(mock_producer));

        let result = writer
            .create(NewNotification {
                site: "SiteA".to_string(),
                kind: NotificationType::CollecteRecolte,
                titre: "Titre".to_string(),
                message: "Message".to_string(),
                priorite: NotificationPriority::Normale,
                donnees: serde_json::Map::new(),
                id: None,
            })
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_writer_keeps_deterministic_id() {
        let mut mock_repo = MockNotificationRepository::new();
        let mut mock_producer = MockNotificationCreatedProducer::new();

        mock_repo
            .expect_create_notification()
            .withf(|input: &CreateNotificationRepoInput| input.id == "credit_overdue_SiteA_V1")
            .times(1)
            .returning(|input| Ok(notification_from_input(input)));

        mock_producer
            .expect_notification_created()
            .times(1)
            .returning(|_| Ok(()));

        let writer = NotificationWriter::new(Arc::new(mock_repo), Arc::new(mock_producer));

        let result = writer
            .create(NewNotification {
                site: "SiteA".to_string(),
                kind: NotificationType::CreditOverdue,
                titre: "Titre".to_string(),
                message: "Message".to_string(),
                priorite: NotificationPriority::Haute,
                donnees: serde_json::Map::new(),
                id: Some("credit_overdue_SiteA_V1".to_string()),
            })
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_writer_propagates_repository_error() {
        let mut mock_repo = MockNotificationRepository::new();
        let mock_producer = MockNotificationCreatedProducer::new();

        mock_repo
            .expect_create_notification()
            .times(1)
            .returning(|_| Err(DomainError::RepositoryError(anyhow::anyhow!("write failed"))));

        let writer = NotificationWriter::new(Arc::new(mock_repo), Arc::new(mock_producer));

        let result = writer
            .create(NewNotification {
                site: "SiteA".to_string(),
                kind: NotificationType::CollecteScoop,
                titre: "Titre".to_string(),
                message: "Message".to_string(),
                priorite: NotificationPriority::Normale,
                donnees: serde_json::Map::new(),
                id: None,
            })
            .await;

        assert!(matches!(result, Err(DomainError::RepositoryError(_))));
    }

    #[test]
    fn test_type_round_trip() {
        for kind in [
            NotificationType::CollecteRecolte,
            NotificationType::CollecteScoop,
            NotificationType::CollecteIndividuel,
            NotificationType::CollecteMiellerie,
            NotificationType::CreditOverdue,
        ] {
            assert_eq!(kind.as_str().parse::<NotificationType>().unwrap(), kind);
        }
    }

    #[test]
    fn test_priority_rejects_unknown_value() {
        assert!(matches!(
            "urgente".parse::<NotificationPriority>(),
            Err(DomainError::InvalidNotificationPriority(_))
        ));
    }
}
