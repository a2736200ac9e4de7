use crate::domain::{
    CreateNotificationRepoInput, DomainError, DomainResult, GetNotificationRepoInput, Notification,
    NotificationPriority, NotificationRepository, NotificationStatus, NotificationType,
};
use crate::postgres::PostgresClient;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, instrument};

const SELECT_COLUMNS: &str =
    "id, type, site, date_creation, titre, message, statut, priorite, donnees";

/// Notification row as stored in the `notifications_caisse` table
#[derive(Debug, Clone)]
pub struct NotificationRow {
    pub id: String,
    pub kind: String,
    pub site: String,
    pub date_creation: DateTime<Utc>,
    pub titre: String,
    pub message: String,
    pub statut: String,
    pub priorite: String,
    pub donnees: serde_json::Value,
}

fn row_from_pg(row: &tokio_postgres::Row) -> NotificationRow {
    NotificationRow {
        id: row.get(0),
        kind: row.get(1),
        site: row.get(2),
        date_creation: row.get(3),
        titre: row.get(4),
        message: row.get(5),
        statut: row.get(6),
        priorite: row.get(7),
        donnees: row.get(8),
    }
}

impl TryFrom<NotificationRow> for Notification {
    type Error = DomainError;

    fn try_from(row: NotificationRow) -> Result<Self, Self::Error> {
        Ok(Notification {
            id: row.id,
            kind: row.kind.parse::<NotificationType>()?,
            site: row.site,
            date_creation: row.date_creation,
            titre: row.titre,
            message: row.message,
            statut: row.statut.parse::<NotificationStatus>()?,
            priorite: row.priorite.parse::<NotificationPriority>()?,
            donnees: row.donnees.as_object().cloned().unwrap_or_default(),
        })
    }
}

/// PostgreSQL implementation of NotificationRepository
#[derive(Clone)]
pub struct PostgresNotificationRepository {
    client: PostgresClient,
}

impl PostgresNotificationRepository {
    pub fn new(client: PostgresClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NotificationRepository for PostgresNotificationRepository {
    #[instrument(skip(self, input), fields(id = %input.id, site = %input.site))]
    async fn create_notification(
        &self,
        input: CreateNotificationRepoInput,
    ) -> DomainResult<Notification> {
        debug!(id = %input.id, "creating notification in database");

        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let now = Utc::now();
        let donnees = serde_json::Value::Object(input.donnees.clone());

        // Writing an existing id replaces the whole row (full replace, no merge)
        conn.execute(
            "INSERT INTO notifications_caisse (id, type, site, date_creation, titre, message, statut, priorite, donnees)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             ON CONFLICT (id) DO UPDATE SET
                 type = EXCLUDED.type,
                 site = EXCLUDED.site,
                 date_creation = EXCLUDED.date_creation,
                 titre = EXCLUDED.titre,
                 message = EXCLUDED.message,
                 statut = EXCLUDED.statut,
                 priorite = EXCLUDED.priorite,
                 donnees = EXCLUDED.donnees",
            &[
                &input.id,
                &input.kind.as_str(),
                &input.site,
                &now,
                &input.titre,
                &input.message,
                &input.statut.as_str(),
                &input.priorite.as_str(),
                &donnees,
            ],
        )
        .await
        .map_err(|e| DomainError::RepositoryError(e.into()))?;

        Ok(Notification {
            id: input.id,
            kind: input.kind,
            site: input.site,
            date_creation: now,
            titre: input.titre,
            message: input.message,
            statut: input.statut,
            priorite: input.priorite,
            donnees: input.donnees,
        })
    }

    #[instrument(skip(self, input), fields(id = %input.id))]
    async fn get_notification(
        &self,
        input: GetNotificationRepoInput,
    ) -> DomainResult<Option<Notification>> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let row = conn
            .query_opt(
                &format!(
                    "SELECT {} FROM notifications_caisse WHERE id = $1",
                    SELECT_COLUMNS
                ),
                &[&input.id],
            )
            .await
            .map_err(|e| DomainError::RepositoryError(e.into()))?;

        match row {
            Some(row) => Ok(Some(Notification::try_from(row_from_pg(&row))?)),
            None => Ok(None),
        }
    }
}
