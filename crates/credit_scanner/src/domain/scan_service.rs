use chrono::{DateTime, Duration, Utc};
use common::domain::{
    CreditSale, CreditSaleRepository, ListPendingCreditSalesRepoInput, NewNotification,
    NotificationPriority, NotificationType, NotificationWriter, OVERDUE_AFTER_DAYS,
};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

const OVERDUE_TITLE: &str = "Crédit en retard (>= 30 jours)";
const DEFAULT_CLIENT_NAME: &str = "Client";

/// Walks every site's pending credit sales and raises one notification per
/// sale older than the overdue threshold. Re-running the scan is harmless:
/// ids are derived from the sale, and an existing id is skipped.
pub struct OverdueCreditScanService {
    sales: Arc<dyn CreditSaleRepository>,
    writer: Arc<NotificationWriter>,
}

impl OverdueCreditScanService {
    pub fn new(sales: Arc<dyn CreditSaleRepository>, writer: Arc<NotificationWriter>) -> Self {
        Self { sales, writer }
    }

    #[instrument(skip(self))]
    pub async fn run_scan(&self) -> anyhow::Result<()> {
        self.scan_at(Utc::now()).await
    }

    /// One full pass over all sites. A failing site is logged and skipped so
    /// it cannot starve the remaining sites.
    pub async fn scan_at(&self, now: DateTime<Utc>) -> anyhow::Result<()> {
        let cutoff = now - Duration::days(OVERDUE_AFTER_DAYS);
        let sites = self.sales.list_sites().await?;
        info!(sites = sites.len(), "starting overdue credit scan");

        for site in sites {
            if let Err(error) = self.scan_site(&site, cutoff).await {
                error!(site = %site, error = %error, "overdue credit scan failed for site");
            }
        }

        info!("overdue credit scan finished");

        Ok(())
    }

    async fn scan_site(&self, site: &str, cutoff: DateTime<Utc>) -> anyhow::Result<()> {
        let sales = self
            .sales
            .list_pending_credit_sales(ListPendingCreditSalesRepoInput {
                site: site.to_string(),
            })
            .await?;

        debug!(site = %site, pending = sales.len(), "scanning pending credit sales");

        for sale in sales {
            // An undated sale cannot prove it is recent, so it counts as
            // overdue rather than slipping through the scan forever.
            if let Some(date_vente) = sale.date_vente {
                if date_vente >= cutoff {
                    continue;
                }
            }

            let id = format!("credit_overdue_{}_{}", site, sale.vente_id);
            if self.writer.exists(&id).await? {
                debug!(id = %id, "overdue notification already raised");
                continue;
            }

            self.writer
                .create(NewNotification {
                    site: site.to_string(),
                    kind: NotificationType::CreditOverdue,
                    titre: OVERDUE_TITLE.to_string(),
                    message: overdue_message(&sale),
                    priorite: NotificationPriority::Haute,
                    donnees: overdue_payload(&sale),
                    id: Some(id),
                })
                .await?;
        }

        Ok(())
    }
}

fn overdue_message(sale: &CreditSale) -> String {
    let client = sale.client_nom.as_deref().unwrap_or(DEFAULT_CLIENT_NAME);
    let mut message = format!("Le crédit du client {} est en retard", client);
    if let Some(montant_restant) = sale.montant_restant {
        message.push_str(&format!(" · {} FCFA", montant_restant));
    }
    message
}

fn overdue_payload(sale: &CreditSale) -> Map<String, Value> {
    let mut donnees = Map::new();
    donnees.insert("venteId".to_string(), json!(sale.vente_id));
    donnees.insert(
        "client".to_string(),
        json!(sale.client_nom.as_deref().unwrap_or(DEFAULT_CLIENT_NAME)),
    );
    donnees.insert(
        "montantRestant".to_string(),
        sale.montant_restant.map(|m| json!(m)).unwrap_or(Value::Null),
    );
    donnees.insert(
        "dateVente".to_string(),
        sale.date_vente
            .map(|d| json!(d.to_rfc3339()))
            .unwrap_or(Value::Null),
    );
    donnees
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::domain::{
        CreateNotificationRepoInput, GetNotificationRepoInput, Notification, NotificationStatus,
    };
    use common::{
        MockCreditSaleRepository, MockNotificationCreatedProducer, MockNotificationRepository,
    };
    use mockall::predicate::eq;

    fn writer_with(
        repo: MockNotificationRepository,
        producer: MockNotificationCreatedProducer,
    ) -> Arc<NotificationWriter> {
        Arc::new(NotificationWriter::new(Arc::new(repo), Arc::new(producer)))
    }

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

    fn sale(vente_id: &str, site: &str, days_old: i64) -> CreditSale {
        CreditSale {
            vente_id: vente_id.to_string(),
            site: site.to_string(),
            statut: "creditEnAttente".to_string(),
            client_nom: Some("Awa".to_string()),
            montant_restant: Some(2500),
            date_vente: Some(Utc::now() - Duration::days(days_old)),
        }
    }

    #[tokio::test]
    async fn test_overdue_sale_raises_haute_notification_with_deterministic_id() {
        let mut mock_sales = MockCreditSaleRepository::new();
        let mut mock_repo = MockNotificationRepository::new();
        let mut mock_producer = MockNotificationCreatedProducer::new();

        mock_sales
            .expect_list_sites()
            .returning(|| Ok(vec!["SiteA".to_string()]));
        mock_sales
            .expect_list_pending_credit_sales()
            .with(eq(ListPendingCreditSalesRepoInput {
                site: "SiteA".to_string(),
            }))
            .returning(|_| Ok(vec![sale("V1", "SiteA", 45)]));
        mock_repo
            .expect_get_notification()
            .with(eq(GetNotificationRepoInput {
                id: "credit_overdue_SiteA_V1".to_string(),
            }))
            .returning(|_| Ok(None));
        mock_repo
            .expect_create_notification()
            .withf(|input: &CreateNotificationRepoInput| {
                input.id == "credit_overdue_SiteA_V1"
                    && input.kind == NotificationType::CreditOverdue
                    && input.priorite == NotificationPriority::Haute
                    && input.statut == NotificationStatus::NonLue
                    && input.message == "Le crédit du client Awa est en retard · 2500 FCFA"
                    && input.donnees.get("venteId") == Some(&json!("V1"))
                    && input.donnees.get("client") == Some(&json!("Awa"))
                    && input.donnees.get("montantRestant") == Some(&json!(2500))
            })
            .returning(|input| Ok(notification_from_input(input)));
        mock_producer
            .expect_notification_created()
            .times(1)
            .returning(|_| Ok(()));

        let service = OverdueCreditScanService::new(
            Arc::new(mock_sales),
            writer_with(mock_repo, mock_producer),
        );

        let result = service.scan_at(Utc::now()).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_existing_notification_is_not_recreated() {
        let mut mock_sales = MockCreditSaleRepository::new();
        let mut mock_repo = MockNotificationRepository::new();
        let mock_producer = MockNotificationCreatedProducer::new();

        mock_sales
            .expect_list_sites()
            .returning(|| Ok(vec!["SiteA".to_string()]));
        mock_sales
            .expect_list_pending_credit_sales()
            .returning(|_| Ok(vec![sale("V1", "SiteA", 45)]));
        mock_repo.expect_get_notification().returning(|input| {
            Ok(Some(notification_from_input(CreateNotificationRepoInput {
                id: input.id,
                kind: NotificationType::CreditOverdue,
                site: "SiteA".to_string(),
                titre: OVERDUE_TITLE.to_string(),
                message: "Le crédit du client Awa est en retard".to_string(),
                statut: NotificationStatus::NonLue,
                priorite: NotificationPriority::Haute,
                donnees: Map::new(),
            })))
        });
        mock_repo.expect_create_notification().times(0);

        let service = OverdueCreditScanService::new(
            Arc::new(mock_sales),
            writer_with(mock_repo, mock_producer),
        );

        let result = service.scan_at(Utc::now()).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_sale_exactly_at_cutoff_is_not_overdue() {
        let mut mock_sales = MockCreditSaleRepository::new();
        let mut mock_repo = MockNotificationRepository::new();
        let mock_producer = MockNotificationCreatedProducer::new();

        let now = Utc::now();
        let at_cutoff = CreditSale {
            date_vente: Some(now - Duration::days(OVERDUE_AFTER_DAYS)),
            ..sale("V1", "SiteA", 0)
        };

        mock_sales
            .expect_list_sites()
            .returning(|| Ok(vec!["SiteA".to_string()]));
        mock_sales
            .expect_list_pending_credit_sales()
            .returning(move |_| Ok(vec![at_cutoff.clone()]));
        mock_repo.expect_get_notification().times(0);
        mock_repo.expect_create_notification().times(0);

        let service = OverdueCreditScanService::new(
            Arc::new(mock_sales),
            writer_with(mock_repo, mock_producer),
        );

        let result = service.scan_at(now).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_sale_one_day_past_cutoff_is_overdue() {
        let mut mock_sales = MockCreditSaleRepository::new();
        let mut mock_repo = MockNotificationRepository::new();
        let mut mock_producer = MockNotificationCreatedProducer::new();

        let now = Utc::now();
        let past_cutoff = CreditSale {
            date_vente: Some(now - Duration::days(OVERDUE_AFTER_DAYS + 1)),
            ..sale("V1", "SiteA", 0)
        };

        mock_sales
            .expect_list_sites()
            .returning(|| Ok(vec!["SiteA".to_string()]));
        mock_sales
            .expect_list_pending_credit_sales()
            .returning(move |_| Ok(vec![past_cutoff.clone()]));
        mock_repo.expect_get_notification().returning(|_| Ok(None));
        mock_repo
            .expect_create_notification()
            .times(1)
            .returning(|input| Ok(notification_from_input(input)));
        mock_producer
            .expect_notification_created()
            .returning(|_| Ok(()));

        let service = OverdueCreditScanService::new(
            Arc::new(mock_sales),
            writer_with(mock_repo, mock_producer),
        );

        let result = service.scan_at(now).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_zero_remaining_balance_still_renders_in_message() {
        let mut mock_sales = MockCreditSaleRepository::new();
        let mut mock_repo = MockNotificationRepository::new();
        let mut mock_producer = MockNotificationCreatedProducer::new();

        let settled_amount = CreditSale {
            montant_restant: Some(0),
            ..sale("V3", "SiteA", 45)
        };

        mock_sales
            .expect_list_sites()
            .returning(|| Ok(vec!["SiteA".to_string()]));
        mock_sales
            .expect_list_pending_credit_sales()
            .returning(move |_| Ok(vec![settled_amount.clone()]));
        mock_repo.expect_get_notification().returning(|_| Ok(None));
        mock_repo
            .expect_create_notification()
            .withf(|input: &CreateNotificationRepoInput| {
                input.message == "Le crédit du client Awa est en retard · 0 FCFA"
                    && input.donnees.get("montantRestant") == Some(&json!(0))
            })
            .returning(|input| Ok(notification_from_input(input)));
        mock_producer
            .expect_notification_created()
            .returning(|_| Ok(()));

        let service = OverdueCreditScanService::new(
            Arc::new(mock_sales),
            writer_with(mock_repo, mock_producer),
        );

        let result = service.scan_at(Utc::now()).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_sale_without_date_is_overdue() {
        let mut mock_sales = MockCreditSaleRepository::new();
        let mut mock_repo = MockNotificationRepository::new();
        let mut mock_producer = MockNotificationCreatedProducer::new();

        let undated = CreditSale {
            client_nom: None,
            montant_restant: None,
            date_vente: None,
            ..sale("V2", "SiteA", 0)
        };

        mock_sales
            .expect_list_sites()
            .returning(|| Ok(vec!["SiteA".to_string()]));
        mock_sales
            .expect_list_pending_credit_sales()
            .returning(move |_| Ok(vec![undated.clone()]));
        mock_repo.expect_get_notification().returning(|_| Ok(None));
        mock_repo
            .expect_create_notification()
            .withf(|input: &CreateNotificationRepoInput| {
                input.message == "Le crédit du client Client est en retard"
                    && input.donnees.get("client") == Some(&json!("Client"))
                    && input.donnees.get("montantRestant") == Some(&Value::Null)
                    && input.donnees.get("dateVente") == Some(&Value::Null)
            })
            .returning(|input| Ok(notification_from_input(input)));
        mock_producer
            .expect_notification_created()
            .returning(|_| Ok(()));

        let service = OverdueCreditScanService::new(
            Arc::new(mock_sales),
            writer_with(mock_repo, mock_producer),
        );

        let result = service.scan_at(Utc::now()).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_failing_site_does_not_stop_remaining_sites() {
        let mut mock_sales = MockCreditSaleRepository::new();
        let mut mock_repo = MockNotificationRepository::new();
        let mut mock_producer = MockNotificationCreatedProducer::new();

        mock_sales
            .expect_list_sites()
            .returning(|| Ok(vec!["SiteA".to_string(), "SiteB".to_string()]));
        mock_sales
            .expect_list_pending_credit_sales()
            .with(eq(ListPendingCreditSalesRepoInput {
                site: "SiteA".to_string(),
            }))
            .returning(|_| Err(anyhow::anyhow!("connection reset").into()));
        mock_sales
            .expect_list_pending_credit_sales()
            .with(eq(ListPendingCreditSalesRepoInput {
                site: "SiteB".to_string(),
            }))
            .returning(|_| Ok(vec![sale("V9", "SiteB", 60)]));
        mock_repo.expect_get_notification().returning(|_| Ok(None));
        mock_repo
            .expect_create_notification()
            .withf(|input: &CreateNotificationRepoInput| input.id == "credit_overdue_SiteB_V9")
            .times(1)
            .returning(|input| Ok(notification_from_input(input)));
        mock_producer
            .expect_notification_created()
            .returning(|_| Ok(()));

        let service = OverdueCreditScanService::new(
            Arc::new(mock_sales),
            writer_with(mock_repo, mock_producer),
        );

        let result = service.scan_at(Utc::now()).await;

        assert!(result.is_ok());
    }
}
