use super::cache::GenerationCache;
use super::hierarchy::StatusHierarchy;
use crate::domain::status::{StatusDefinition, StatusKind};
use crate::error::{PaymentError, Result};
use std::sync::{Arc, RwLock};

pub const NO_MONEY_TRANSFERRED: &str = "payment_no_money_transferred";
pub const MONEY_TRANSFERRED: &str = "payment_money_transferred";
pub const UNKNOWN: &str = "payment_unknown";
pub const REFUNDED: &str = "payment_refunded";
pub const CREATED: &str = "payment_created";
pub const FAILED: &str = "payment_failed";
pub const PENDING: &str = "payment_pending";
pub const AUTHORIZATION_FAILED: &str = "payment_authorization_failed";
pub const CANCELLED: &str = "payment_cancelled";
pub const EXPIRED: &str = "payment_expired";
pub const SUCCESS: &str = "payment_success";
pub const PARTIALLY_REFUNDED: &str = "payment_partially_refunded";

/// The statuses every installation has.
pub fn builtin_statuses() -> Vec<StatusDefinition> {
    vec![
        StatusDefinition::new(NO_MONEY_TRANSFERRED, "No money transferred", None),
        StatusDefinition::new(MONEY_TRANSFERRED, "Money transferred", None),
        StatusDefinition::new(UNKNOWN, "Unknown", None),
        StatusDefinition::new(REFUNDED, "Refunded", None),
        StatusDefinition::new(CREATED, "Created", Some(NO_MONEY_TRANSFERRED)),
        StatusDefinition::new(FAILED, "Failed", Some(NO_MONEY_TRANSFERRED)),
        StatusDefinition::new(PENDING, "Pending", Some(NO_MONEY_TRANSFERRED)),
        StatusDefinition::new(AUTHORIZATION_FAILED, "Authorization failed", Some(FAILED)),
        StatusDefinition::new(CANCELLED, "Cancelled", Some(FAILED)),
        StatusDefinition::new(EXPIRED, "Expired", Some(FAILED)),
        StatusDefinition::new(SUCCESS, "Completed", Some(MONEY_TRANSFERRED)),
        StatusDefinition::new(PARTIALLY_REFUNDED, "Partially refunded", Some(MONEY_TRANSFERRED)),
    ]
}

/// Built-in statuses plus the statuses configured at runtime.
///
/// The hierarchy over both is derived lazily and rebuilt only after the
/// configured statuses change.
pub struct StatusCatalog {
    builtin: Vec<StatusDefinition>,
    configured: RwLock<Vec<StatusDefinition>>,
    cache: GenerationCache<StatusHierarchy>,
}

impl Default for StatusCatalog {
    fn default() -> Self {
        Self::new(builtin_statuses())
    }
}

impl StatusCatalog {
    pub fn new(builtin: Vec<StatusDefinition>) -> Self {
        Self {
            builtin,
            configured: RwLock::new(Vec::new()),
            cache: GenerationCache::new(),
        }
    }

    pub fn hierarchy(&self) -> Result<Arc<StatusHierarchy>> {
        self.cache.get_or_rebuild(|| {
            let configured = self.configured.read().unwrap_or_else(|e| e.into_inner());
            let hierarchy = self.build(&configured)?;
            tracing::debug!(
                statuses = hierarchy.definitions().len(),
                generation = self.cache.generation(),
                "Rebuilt payment status hierarchy"
            );
            Ok(hierarchy)
        })
    }

    /// Adds or replaces a configured status.
    ///
    /// The catalog is left untouched if the result would not be a valid forest.
    pub fn save(&self, definition: StatusDefinition) -> Result<()> {
        if self.is_builtin(&definition.id) {
            return Err(PaymentError::ValidationError(format!(
                "Built-in status {} cannot be overridden",
                definition.id
            )));
        }
        let mut configured = self.configured.write().unwrap_or_else(|e| e.into_inner());
        let mut candidate = configured.clone();
        match candidate.iter_mut().find(|existing| existing.id == definition.id) {
            Some(existing) => *existing = definition,
            None => candidate.push(definition),
        }
        self.build(&candidate)?;
        *configured = candidate;
        self.cache.invalidate();
        Ok(())
    }

    /// Removes a configured status. Statuses that still have children cannot be removed.
    pub fn delete(&self, kind: &StatusKind) -> Result<()> {
        if self.is_builtin(kind) {
            return Err(PaymentError::ValidationError(format!(
                "Built-in status {kind} cannot be deleted"
            )));
        }
        let mut configured = self.configured.write().unwrap_or_else(|e| e.into_inner());
        let position = configured
            .iter()
            .position(|existing| &existing.id == kind)
            .ok_or_else(|| PaymentError::UnknownStatusKind(kind.clone()))?;
        let mut candidate = configured.clone();
        candidate.remove(position);
        self.build(&candidate)?;
        *configured = candidate;
        self.cache.invalidate();
        Ok(())
    }

    fn is_builtin(&self, kind: &StatusKind) -> bool {
        self.builtin.iter().any(|definition| &definition.id == kind)
    }

    fn build(&self, configured: &[StatusDefinition]) -> Result<StatusHierarchy> {
        let definitions = self.builtin.iter().chain(configured).cloned().collect();
        let hierarchy = StatusHierarchy::new(definitions)?;
        hierarchy.validate()?;
        Ok(hierarchy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(ids: &[&str]) -> Vec<StatusKind> {
        ids.iter().copied().map(StatusKind::new).collect()
    }

    #[test]
    fn test_builtin_children() {
        let hierarchy = StatusCatalog::default().hierarchy().unwrap();
        assert_eq!(
            hierarchy.children(&StatusKind::new(NO_MONEY_TRANSFERRED)).unwrap(),
            kinds(&[CREATED, FAILED, PENDING])
        );
    }

    #[test]
    fn test_builtin_descendants() {
        let hierarchy = StatusCatalog::default().hierarchy().unwrap();
        assert_eq!(
            hierarchy.descendants(&StatusKind::new(NO_MONEY_TRANSFERRED)).unwrap(),
            kinds(&[CREATED, FAILED, PENDING, AUTHORIZATION_FAILED, CANCELLED, EXPIRED])
        );
    }

    #[test]
    fn test_builtin_ancestors() {
        let hierarchy = StatusCatalog::default().hierarchy().unwrap();
        assert_eq!(
            hierarchy.ancestors(&StatusKind::new(AUTHORIZATION_FAILED)).unwrap(),
            kinds(&[FAILED, NO_MONEY_TRANSFERRED])
        );
        assert!(hierarchy
            .is_or_has_ancestor(&StatusKind::new(FAILED), &StatusKind::new(NO_MONEY_TRANSFERRED))
            .unwrap());
    }

    #[test]
    fn test_configured_status_rebuilds_hierarchy() {
        let catalog = StatusCatalog::default();
        let before = catalog.hierarchy().unwrap();
        assert!(Arc::ptr_eq(&before, &catalog.hierarchy().unwrap()));

        catalog
            .save(StatusDefinition::new("payment_chargeback", "Charged back", Some(REFUNDED)))
            .unwrap();

        let after = catalog.hierarchy().unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(
            after.children(&StatusKind::new(REFUNDED)).unwrap(),
            kinds(&["payment_chargeback"])
        );
    }

    #[test]
    fn test_save_rejects_corrupting_status() {
        let catalog = StatusCatalog::default();
        catalog.save(StatusDefinition::new("a", "A", None)).unwrap();
        catalog.save(StatusDefinition::new("b", "B", Some("a"))).unwrap();

        let result = catalog.save(StatusDefinition::new("a", "A", Some("b")));
        assert!(matches!(result, Err(PaymentError::HierarchyCorruption(_))));

        let hierarchy = catalog.hierarchy().unwrap();
        assert!(hierarchy.definition(&StatusKind::new("a")).unwrap().is_root());
    }

    #[test]
    fn test_builtin_statuses_are_protected() {
        let catalog = StatusCatalog::default();
        assert!(catalog
            .save(StatusDefinition::new(SUCCESS, "Paid", None))
            .is_err());
        assert!(catalog.delete(&StatusKind::new(SUCCESS)).is_err());
    }

    #[test]
    fn test_delete_refuses_parents_and_unknown() {
        let catalog = StatusCatalog::default();
        catalog.save(StatusDefinition::new("a", "A", None)).unwrap();
        catalog.save(StatusDefinition::new("b", "B", Some("a"))).unwrap();

        assert!(matches!(
            catalog.delete(&StatusKind::new("a")),
            Err(PaymentError::UnknownStatusKind(_))
        ));
        catalog.delete(&StatusKind::new("b")).unwrap();
        catalog.delete(&StatusKind::new("a")).unwrap();
        assert!(matches!(
            catalog.delete(&StatusKind::new("a")),
            Err(PaymentError::UnknownStatusKind(_))
        ));
    }
}
