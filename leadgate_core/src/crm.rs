//! The CRM seam: the `CrmContacts` trait, the find-or-create resolver, and an
//! in-memory implementation for local development and unit tests.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::models::{ContactIntent, PropertyMap, RemoteContact};
use crate::reconcile::{creation_properties, PROP_EMAIL};
use crate::source::SourceSystem;
use crate::Result;

/// A contact as the CRM hands it back: opaque id plus current properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrmContact {
    pub id: String,
    pub properties: PropertyMap,
}

/// Outbound contact operations against the CRM.
///
/// Implementations live in `leadgate_hubspot` or test code. Errors are never
/// retried here; they propagate to the orchestrator which maps them to a
/// retryable HTTP response.
#[async_trait]
pub trait CrmContacts: Send + Sync {
    /// Exact-match lookup by email, limit 1, tie-broken CRM-side by most
    /// recent creation.
    async fn search_by_email(&self, email: &str) -> Result<Option<CrmContact>>;

    /// Create a contact with the given initial properties.
    async fn create_contact(&self, properties: &PropertyMap) -> Result<CrmContact>;

    /// Patch properties on an existing contact.
    async fn update_contact(&self, contact_id: &str, properties: &PropertyMap) -> Result<()>;
}

/// Find the contact for `intent`, creating it when absent.
///
/// Creation establishes provenance on first write: the initial property map
/// carries `source_system` and the foreign-id property alongside every
/// non-empty intent field. The returned `properties` are the ones the search
/// observed (empty for a fresh create), so the reconciler always merges
/// against pre-existing state. Read-then-maybe-write with no atomicity:
/// concurrent requests for one unseen email may both create, and the CRM's
/// own uniqueness behavior decides the outcome.
#[tracing::instrument(level = "debug", skip(crm, intent), fields(source = %source, email = %intent.email))]
pub async fn resolve(
    crm: &dyn CrmContacts,
    source: SourceSystem,
    intent: &ContactIntent,
) -> Result<RemoteContact> {
    if let Some(found) = crm.search_by_email(&intent.email).await? {
        return Ok(RemoteContact {
            contact_id: found.id,
            existed: true,
            properties: found.properties,
        });
    }

    let created = crm
        .create_contact(&creation_properties(source, intent))
        .await?;
    tracing::debug!(contact_id = %created.id, "created new contact");

    Ok(RemoteContact {
        contact_id: created.id,
        existed: false,
        properties: PropertyMap::new(),
    })
}

/// Call counts observed by [`MemoryCrm`] (primarily for tests).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub searches: usize,
    pub creates: usize,
    pub updates: usize,
}

impl CallCounts {
    pub fn total(&self) -> usize {
        self.searches + self.creates + self.updates
    }
}

#[derive(Debug, Clone)]
struct StoredContact {
    id: String,
    properties: PropertyMap,
}

/// In-memory `CrmContacts` for local development and unit tests.
///
/// Semantics mirror the remote CRM where they matter: email search scans
/// newest-first (the remote tie-break), and updates only overwrite the keys
/// present in the patch.
#[derive(Clone, Default)]
pub struct MemoryCrm {
    contacts: Arc<Mutex<Vec<StoredContact>>>,
    calls: Arc<Mutex<CallCounts>>,
}

impl MemoryCrm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a contact with the given properties; returns its id.
    pub async fn seed(&self, properties: PropertyMap) -> String {
        let id = ulid::Ulid::new().to_string();
        self.contacts.lock().await.push(StoredContact {
            id: id.clone(),
            properties,
        });
        id
    }

    /// Snapshot of a contact's current properties.
    pub async fn properties_of(&self, contact_id: &str) -> Option<PropertyMap> {
        self.contacts
            .lock()
            .await
            .iter()
            .find(|c| c.id == contact_id)
            .map(|c| c.properties.clone())
    }

    pub async fn contact_count(&self) -> usize {
        self.contacts.lock().await.len()
    }

    pub async fn calls(&self) -> CallCounts {
        *self.calls.lock().await
    }
}

#[async_trait]
impl CrmContacts for MemoryCrm {
    async fn search_by_email(&self, email: &str) -> Result<Option<CrmContact>> {
        self.calls.lock().await.searches += 1;
        let contacts = self.contacts.lock().await;
        Ok(contacts
            .iter()
            .rev()
            .find(|c| c.properties.get(PROP_EMAIL).map(String::as_str) == Some(email))
            .map(|c| CrmContact {
                id: c.id.clone(),
                properties: c.properties.clone(),
            }))
    }

    async fn create_contact(&self, properties: &PropertyMap) -> Result<CrmContact> {
        self.calls.lock().await.creates += 1;
        let id = ulid::Ulid::new().to_string();
        self.contacts.lock().await.push(StoredContact {
            id: id.clone(),
            properties: properties.clone(),
        });
        Ok(CrmContact {
            id,
            properties: properties.clone(),
        })
    }

    async fn update_contact(&self, contact_id: &str, properties: &PropertyMap) -> Result<()> {
        self.calls.lock().await.updates += 1;
        let mut contacts = self.contacts.lock().await;
        if let Some(contact) = contacts.iter_mut().find(|c| c.id == contact_id) {
            for (k, v) in properties {
                contact.properties.insert(k.clone(), v.clone());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolve_finds_existing_contact() {
        let crm = MemoryCrm::new();
        let mut props = PropertyMap::new();
        props.insert(PROP_EMAIL.to_string(), "a@b.com".to_string());
        props.insert("firstname".to_string(), "Ann".to_string());
        let id = crm.seed(props).await;

        let intent = ContactIntent::new("a@b.com").unwrap();
        let remote = resolve(&crm, SourceSystem::Sgcrm, &intent).await.unwrap();
        assert!(remote.existed);
        assert_eq!(remote.contact_id, id);
        assert_eq!(remote.properties.get("firstname").unwrap(), "Ann");
    }

    #[tokio::test]
    async fn resolve_creates_with_provenance_and_reports_empty_prior_state() {
        let crm = MemoryCrm::new();
        let mut intent = ContactIntent::new("new@b.com").unwrap();
        intent.first_name = Some("New".to_string());

        let remote = resolve(&crm, SourceSystem::Smartlead, &intent)
            .await
            .unwrap();
        assert!(!remote.existed);
        assert!(remote.properties.is_empty());

        let stored = crm.properties_of(&remote.contact_id).await.unwrap();
        assert_eq!(stored.get(PROP_EMAIL).unwrap(), "new@b.com");
        assert_eq!(
            stored.get("source_system").unwrap(),
            "Smartlead Email Campaign"
        );
        assert_eq!(stored.get("firstname").unwrap(), "New");
    }

    #[tokio::test]
    async fn search_tie_break_prefers_most_recently_created() {
        let crm = MemoryCrm::new();
        let mut props = PropertyMap::new();
        props.insert(PROP_EMAIL.to_string(), "dup@b.com".to_string());
        let _older = crm.seed(props.clone()).await;
        let newer = crm.seed(props).await;

        let found = crm.search_by_email("dup@b.com").await.unwrap().unwrap();
        assert_eq!(found.id, newer);
    }
}
