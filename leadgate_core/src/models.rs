use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::source::SourceSystem;
use crate::{Error, Result};

/// CRM property map (property name -> value).
///
/// Ordered so patches serialize and compare deterministically.
pub type PropertyMap = BTreeMap<String, String>;

/// Normalized representation of an inbound webhook's contact data,
/// source-agnostic. Produced fresh per inbound event; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactIntent {
    /// Sole identity key. Any non-empty string is accepted; email syntax is
    /// not validated.
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    /// Opaque foreign id assigned by the sending platform.
    pub source_record_id: Option<String>,
}

impl ContactIntent {
    pub fn new(email: impl Into<String>) -> Result<Self> {
        let email = email.into();
        if email.trim().is_empty() {
            return Err(Error::MissingIdentity);
        }
        Ok(Self {
            email,
            first_name: None,
            last_name: None,
            phone: None,
            company: None,
            source_record_id: None,
        })
    }
}

/// Authoritative remote state observed at resolution time.
///
/// `properties` is the map the search returned; for a contact that did not
/// exist it is empty (the state observed before creation). It may be stale by
/// the time the reconciled patch is written; there is no locking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteContact {
    /// Opaque CRM-assigned contact id.
    pub contact_id: String,
    pub existed: bool,
    pub properties: PropertyMap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Created,
    Updated,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Created => write!(f, "created"),
            Action::Updated => write!(f, "updated"),
        }
    }
}

/// Per-event audit trail, emitted as a structured log line and returned in
/// the HTTP response. Not stored anywhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    /// ULID (sortable by time).
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_record_id: Option<String>,
    pub contact_id: String,
    pub email: String,
    pub action: Action,
    pub source_system: String,
    pub updated_properties: Vec<String>,
}

impl AuditRecord {
    pub fn new(
        source: SourceSystem,
        intent: &ContactIntent,
        contact_id: impl Into<String>,
        action: Action,
        updated_properties: Vec<String>,
    ) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            timestamp: Utc::now(),
            source_record_id: intent.source_record_id.clone(),
            contact_id: contact_id.into(),
            email: intent.email.clone(),
            action,
            source_system: source.label().to_string(),
            updated_properties,
        }
    }
}

/// Successful end-to-end outcome of one inbound event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub contact_id: String,
    pub action: Action,
    pub audit: AuditRecord,
}
