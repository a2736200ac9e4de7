use crate::domain::result::{DomainError, DomainResult};
use crate::domain::NotificationType;
use serde::{Deserialize, Serialize};

/// The four collecte kinds the caisse app records, each with its own
/// source collection, notification wording and legacy field aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollecteKind {
    Recolte,
    Scoop,
    Individuel,
    Miellerie,
}

impl CollecteKind {
    pub const ALL: [CollecteKind; 4] = [
        CollecteKind::Recolte,
        CollecteKind::Scoop,
        CollecteKind::Individuel,
        CollecteKind::Miellerie,
    ];

    /// Per-site subcollection the kind is recorded under.
    pub fn collection(&self) -> &'static str {
        match self {
            CollecteKind::Recolte => "nos_collectes_recoltes",
            CollecteKind::Scoop => "nos_achats_scoop_contenants",
            CollecteKind::Individuel => "nos_achats_individuels",
            // The app writes Miellerie collectes under the singular form.
            CollecteKind::Miellerie => "nos_collecte_mielleries",
        }
    }

    pub fn notification_type(&self) -> NotificationType {
        match self {
            CollecteKind::Recolte => NotificationType::CollecteRecolte,
            CollecteKind::Scoop => NotificationType::CollecteScoop,
            CollecteKind::Individuel => NotificationType::CollecteIndividuel,
            CollecteKind::Miellerie => NotificationType::CollecteMiellerie,
        }
    }

    pub fn titre(&self) -> &'static str {
        match self {
            CollecteKind::Recolte => "Nouvelle collecte – Récoltes",
            CollecteKind::Scoop => "Nouvel achat – SCOOP",
            CollecteKind::Individuel => "Nouvel achat – Individuel",
            CollecteKind::Miellerie => "Nouvelle collecte – Miellerie",
        }
    }

    /// Leading sentence of the notification message; weight/amount clauses
    /// are appended when present.
    pub fn message_lead(&self) -> &'static str {
        match self {
            CollecteKind::Recolte => "Une collecte Récoltes a été enregistrée",
            CollecteKind::Scoop => "Un achat SCOOP a été enregistré",
            CollecteKind::Individuel => "Un achat Individuel a été enregistré",
            CollecteKind::Miellerie => "Une collecte Miellerie a été enregistrée",
        }
    }

    /// Legacy field names for the total weight, in precedence order.
    pub fn poids_aliases(&self) -> &'static [&'static str] {
        match self {
            CollecteKind::Recolte => &["poidsTotal", "totalPoids", "weight"],
            CollecteKind::Scoop | CollecteKind::Individuel => &["total_poids", "poidsTotal"],
            CollecteKind::Miellerie => &["poidsTotal"],
        }
    }

    /// Legacy field names for the total amount, in precedence order.
    pub fn montant_aliases(&self) -> &'static [&'static str] {
        match self {
            CollecteKind::Recolte => &["montantTotal", "total"],
            CollecteKind::Scoop | CollecteKind::Individuel => &["total_montant", "montantTotal"],
            CollecteKind::Miellerie => &["montantTotal"],
        }
    }

    pub fn for_collection(collection: &str) -> Option<CollecteKind> {
        CollecteKind::ALL
            .into_iter()
            .find(|kind| kind.collection() == collection)
    }
}

/// Wire event for a newly created store document, as delivered by the
/// document-change feed. `fields` is the raw document body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentCreatedEvent {
    pub collection_path: String,
    pub document_id: String,
    #[serde(default)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

/// Parsed `Sites/{site}/{collection}` path of a collecte document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectePath {
    pub site: String,
    pub collection: String,
}

impl CollectePath {
    pub fn parse(collection_path: &str) -> DomainResult<CollectePath> {
        let segments: Vec<&str> = collection_path.split('/').collect();
        match segments.as_slice() {
            ["Sites", site, collection] if !site.is_empty() && !collection.is_empty() => {
                Ok(CollectePath {
                    site: (*site).to_string(),
                    collection: (*collection).to_string(),
                })
            }
            _ => Err(DomainError::InvalidCollectionPath(
                collection_path.to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_collecte_path() {
        let path = CollectePath::parse("Sites/SiteA/nos_collectes_recoltes").unwrap();
        assert_eq!(path.site, "SiteA");
        assert_eq!(path.collection, "nos_collectes_recoltes");
    }

    #[test]
    fn test_parse_rejects_wrong_root() {
        assert!(matches!(
            CollectePath::parse("Vente/SiteA/ventes"),
            Err(DomainError::InvalidCollectionPath(_))
        ));
    }

    #[test]
    fn test_parse_rejects_short_path() {
        assert!(CollectePath::parse("Sites/SiteA").is_err());
        assert!(CollectePath::parse("").is_err());
    }

    #[test]
    fn test_kind_for_collection() {
        assert_eq!(
            CollecteKind::for_collection("nos_achats_individuels"),
            Some(CollecteKind::Individuel)
        );
        assert_eq!(CollecteKind::for_collection("nos_ventes"), None);
    }

    #[test]
    fn test_every_kind_has_distinct_collection() {
        let collections: Vec<_> = CollecteKind::ALL.iter().map(|k| k.collection()).collect();
        for (i, a) in collections.iter().enumerate() {
            for b in collections.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }
}
