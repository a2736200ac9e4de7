use crate::domain::result::DomainResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Sale status marking an unpaid credit, as written by the caisse app.
pub const CREDIT_PENDING_STATUS: &str = "creditEnAttente";

/// Age threshold after which a pending credit counts as overdue.
pub const OVERDUE_AFTER_DAYS: i64 = 30;

/// Credit sale as read from the sales root. Externally owned; this backend
/// never writes these records.
#[derive(Debug, Clone, PartialEq)]
pub struct CreditSale {
    pub vente_id: String,
    pub site: String,
    pub statut: String,
    pub client_nom: Option<String>,
    pub montant_restant: Option<i64>,
    pub date_vente: Option<DateTime<Utc>>,
}

/// Repository input for listing pending credit sales of one site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListPendingCreditSalesRepoInput {
    pub site: String,
}

/// Read-only repository over the `Vente/{site}/ventes` sales root
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait CreditSaleRepository: Send + Sync {
    /// Enumerate the site partitions under the sales root
    async fn list_sites(&self) -> DomainResult<Vec<String>>;

    /// List credit sales whose status is the credit-pending sentinel.
    /// No date predicate here; age filtering happens in process so the
    /// query never needs a compound index.
    async fn list_pending_credit_sales(
        &self,
        input: ListPendingCreditSalesRepoInput,
    ) -> DomainResult<Vec<CreditSale>>;
}
