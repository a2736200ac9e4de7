use crate::domain::{
    DeviceToken, DeviceTokenRepository, DomainError, DomainResult, ListDeviceTokensRepoInput,
};
use crate::postgres::PostgresClient;
use async_trait::async_trait;
use tracing::instrument;

/// PostgreSQL implementation of the read-only DeviceTokenRepository
#[derive(Clone)]
pub struct PostgresDeviceTokenRepository {
    client: PostgresClient,
}

impl PostgresDeviceTokenRepository {
    pub fn new(client: PostgresClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DeviceTokenRepository for PostgresDeviceTokenRepository {
    #[instrument(skip(self, input), fields(site = %input.site))]
    async fn list_device_tokens(
        &self,
        input: ListDeviceTokensRepoInput,
    ) -> DomainResult<Vec<DeviceToken>> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let rows = conn
            .query(
                "SELECT site, token FROM device_tokens WHERE site = $1",
                &[&input.site],
            )
            .await
            .map_err(|e| DomainError::RepositoryError(e.into()))?;

        Ok(rows
            .iter()
            .map(|row| DeviceToken {
                site: row.get(0),
                token: row.get(1),
            })
            .collect())
    }
}
