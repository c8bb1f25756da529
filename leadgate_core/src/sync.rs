//! Sync orchestrator: composes normalize -> resolve -> reconcile -> apply for
//! one inbound webhook event.

use std::sync::Arc;

use crate::crm::{resolve, CrmContacts};
use crate::models::{Action, AuditRecord, SyncReport};
use crate::normalize::normalize;
use crate::reconcile::reconcile;
use crate::source::SourceSystem;
use crate::Result;

/// Per-process sync engine. Holds no per-request state; independent events
/// run concurrently against the same engine with no shared mutable state.
#[derive(Clone)]
pub struct SyncEngine {
    crm: Arc<dyn CrmContacts>,
}

impl SyncEngine {
    pub fn new(crm: Arc<dyn CrmContacts>) -> Self {
        Self { crm }
    }

    /// Process one inbound event end-to-end.
    ///
    /// The patch is applied as a single property-update call. If that call
    /// fails after a successful create, the contact exists remotely without
    /// its patch; the error surfaces so the sender retries (at-least-once,
    /// never masked).
    #[tracing::instrument(level = "info", skip(self, payload), fields(source = %source))]
    pub async fn process(
        &self,
        source: SourceSystem,
        payload: &serde_json::Value,
    ) -> Result<SyncReport> {
        let intent = normalize(source, payload)?;
        let remote = resolve(self.crm.as_ref(), source, &intent).await?;
        let patch = reconcile(source, &intent, &remote.properties);

        self.crm.update_contact(&remote.contact_id, &patch).await?;

        let action = if remote.existed {
            Action::Updated
        } else {
            Action::Created
        };
        let updated_properties: Vec<String> = patch.keys().cloned().collect();
        let audit = AuditRecord::new(
            source,
            &intent,
            remote.contact_id.clone(),
            action,
            updated_properties,
        );

        tracing::info!(
            contact_id = %audit.contact_id,
            email = %audit.email,
            action = %audit.action,
            source_system = %audit.source_system,
            updated = ?audit.updated_properties,
            "contact sync complete"
        );

        Ok(SyncReport {
            contact_id: remote.contact_id,
            action,
            audit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crm::MemoryCrm;
    use crate::models::PropertyMap;
    use crate::reconcile::{PROP_FIRST_NAME, PROP_SOURCE_SYSTEM};
    use crate::Error;
    use serde_json::json;

    fn engine(crm: &MemoryCrm) -> SyncEngine {
        SyncEngine::new(Arc::new(crm.clone()))
    }

    #[tokio::test]
    async fn unseen_email_creates_with_all_intent_fields() {
        let crm = MemoryCrm::new();
        let payload = json!({
            "email": "jane@example.com",
            "first_name": "Jane",
            "last_name": "Doe",
            "phone": "+15550001",
            "id": "rec_1"
        });

        let report = engine(&crm)
            .process(SourceSystem::Sgcrm, &payload)
            .await
            .unwrap();

        assert_eq!(report.action, Action::Created);
        let updated = &report.audit.updated_properties;
        assert!(updated.contains(&PROP_SOURCE_SYSTEM.to_string()));
        assert!(updated.contains(&PROP_FIRST_NAME.to_string()));
        assert!(updated.contains(&"lastname".to_string()));
        assert!(updated.contains(&"phone".to_string()));
        assert!(updated.contains(&"sgcrm_record_id".to_string()));

        let stored = crm.properties_of(&report.contact_id).await.unwrap();
        assert_eq!(stored.get(PROP_SOURCE_SYSTEM).unwrap(), "SGCRM");
        assert_eq!(stored.get(PROP_FIRST_NAME).unwrap(), "Jane");
    }

    #[tokio::test]
    async fn identical_payload_twice_is_created_then_updated() {
        let crm = MemoryCrm::new();
        let payload = json!({
            "email": "jane@example.com",
            "first_name": "Jane",
            "last_name": "Doe"
        });
        let eng = engine(&crm);

        let first = eng.process(SourceSystem::Sgcrm, &payload).await.unwrap();
        let second = eng.process(SourceSystem::Sgcrm, &payload).await.unwrap();

        assert_eq!(first.action, Action::Created);
        assert_eq!(second.action, Action::Updated);
        assert_eq!(first.contact_id, second.contact_id);
        assert_eq!(crm.contact_count().await, 1);

        // Gaps were filled on the first pass, so the second patch is a strict
        // subset of the first.
        let first_props: std::collections::BTreeSet<_> =
            first.audit.updated_properties.iter().collect();
        let second_props: std::collections::BTreeSet<_> =
            second.audit.updated_properties.iter().collect();
        assert!(second_props.is_subset(&first_props));
        assert!(second_props.len() < first_props.len());
        assert!(second_props.contains(&PROP_SOURCE_SYSTEM.to_string()));
    }

    #[tokio::test]
    async fn existing_firstname_is_never_overwritten() {
        let crm = MemoryCrm::new();
        let mut props = PropertyMap::new();
        props.insert("email".to_string(), "ann@example.com".to_string());
        props.insert(PROP_FIRST_NAME.to_string(), "Ann".to_string());
        let id = crm.seed(props).await;

        let payload = json!({ "email": "ann@example.com", "first_name": "Annie" });
        let report = engine(&crm)
            .process(SourceSystem::Sgcrm, &payload)
            .await
            .unwrap();

        assert_eq!(report.action, Action::Updated);
        assert!(!report
            .audit
            .updated_properties
            .contains(&PROP_FIRST_NAME.to_string()));
        let stored = crm.properties_of(&id).await.unwrap();
        assert_eq!(stored.get(PROP_FIRST_NAME).unwrap(), "Ann");
    }

    #[tokio::test]
    async fn missing_email_makes_no_crm_calls() {
        let crm = MemoryCrm::new();
        let payload = json!({ "name": "No Email Here" });

        let err = engine(&crm)
            .process(SourceSystem::Smartlead, &payload)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::MissingIdentity));
        assert_eq!(crm.calls().await.total(), 0);
    }

    #[tokio::test]
    async fn source_label_recorded_per_endpoint() {
        let crm = MemoryCrm::new();
        let payload = json!({ "to_email": "lead@example.com" });

        let report = engine(&crm)
            .process(SourceSystem::Smartlead, &payload)
            .await
            .unwrap();

        assert_eq!(report.audit.source_system, "Smartlead Email Campaign");
        let stored = crm.properties_of(&report.contact_id).await.unwrap();
        assert_eq!(
            stored.get(PROP_SOURCE_SYSTEM).unwrap(),
            "Smartlead Email Campaign"
        );
    }
}
