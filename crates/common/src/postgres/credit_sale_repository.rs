use crate::domain::{
    CreditSale, CreditSaleRepository, DomainError, DomainResult, ListPendingCreditSalesRepoInput,
    CREDIT_PENDING_STATUS,
};
use crate::postgres::PostgresClient;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::instrument;

/// Credit sale row as read from the `ventes` table
#[derive(Debug, Clone)]
pub struct CreditSaleRow {
    pub vente_id: String,
    pub site: String,
    pub statut: String,
    pub client_nom: Option<String>,
    pub montant_restant: Option<i64>,
    pub date_vente: Option<DateTime<Utc>>,
}

fn row_from_pg(row: &tokio_postgres::Row) -> CreditSaleRow {
    CreditSaleRow {
        vente_id: row.get(0),
        site: row.get(1),
        statut: row.get(2),
        client_nom: row.get(3),
        montant_restant: row.get(4),
        date_vente: row.get(5),
    }
}

impl From<CreditSaleRow> for CreditSale {
    fn from(row: CreditSaleRow) -> Self {
        CreditSale {
            vente_id: row.vente_id,
            site: row.site,
            statut: row.statut,
            client_nom: row.client_nom,
            montant_restant: row.montant_restant,
            date_vente: row.date_vente,
        }
    }
}

/// PostgreSQL implementation of the read-only CreditSaleRepository
#[derive(Clone)]
pub struct PostgresCreditSaleRepository {
    client: PostgresClient,
}

impl PostgresCreditSaleRepository {
    pub fn new(client: PostgresClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CreditSaleRepository for PostgresCreditSaleRepository {
    #[instrument(skip(self))]
    async fn list_sites(&self) -> DomainResult<Vec<String>> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let rows = conn
            .query("SELECT DISTINCT site FROM ventes ORDER BY site", &[])
            .await
            .map_err(|e| DomainError::RepositoryError(e.into()))?;

        Ok(rows.iter().map(|row| row.get(0)).collect())
    }

    #[instrument(skip(self, input), fields(site = %input.site))]
    async fn list_pending_credit_sales(
        &self,
        input: ListPendingCreditSalesRepoInput,
    ) -> DomainResult<Vec<CreditSale>> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        // Status filter only; age filtering happens in the scanner so this
        // never needs a compound index.
        let rows = conn
            .query(
                "SELECT vente_id, site, statut, client_nom, montant_restant, date_vente
                 FROM ventes
                 WHERE site = $1 AND statut = $2",
                &[&input.site, &CREDIT_PENDING_STATUS],
            )
            .await
            .map_err(|e| DomainError::RepositoryError(e.into()))?;

        Ok(rows
            .iter()
            .map(|row| CreditSale::from(row_from_pg(row)))
            .collect())
    }
}
