//! Property reconciler: computes the minimal safe patch for a contact.
//!
//! The merge is one-directional fill-gaps: an intent field is written only
//! when the remote property is currently empty or absent, so fresher but
//! incomplete webhook data never erases richer existing data. Provenance
//! (`source_system` and the per-source foreign-id property) is asserted on
//! every patch.

use crate::models::{ContactIntent, PropertyMap};
use crate::source::SourceSystem;

pub const PROP_EMAIL: &str = "email";
pub const PROP_FIRST_NAME: &str = "firstname";
pub const PROP_LAST_NAME: &str = "lastname";
pub const PROP_PHONE: &str = "phone";
pub const PROP_COMPANY: &str = "company";
pub const PROP_SOURCE_SYSTEM: &str = "source_system";

/// Intent fields paired with their CRM property names, in patch order.
fn intent_properties(intent: &ContactIntent) -> [(&'static str, Option<&String>); 4] {
    [
        (PROP_FIRST_NAME, intent.first_name.as_ref()),
        (PROP_LAST_NAME, intent.last_name.as_ref()),
        (PROP_PHONE, intent.phone.as_ref()),
        (PROP_COMPANY, intent.company.as_ref()),
    ]
}

/// Compute the property patch for `intent` against the remote state observed
/// at resolution time. Never returns an empty map: `source_system` is always
/// present.
#[tracing::instrument(level = "debug", skip_all, fields(source = %source, email = %intent.email))]
pub fn reconcile(
    source: SourceSystem,
    intent: &ContactIntent,
    remote: &PropertyMap,
) -> PropertyMap {
    let mut patch = PropertyMap::new();
    patch.insert(PROP_SOURCE_SYSTEM.to_string(), source.label().to_string());

    if let Some(record_id) = &intent.source_record_id {
        patch.insert(source.id_property().to_string(), record_id.clone());
    }

    for (property, value) in intent_properties(intent) {
        let Some(value) = value else { continue };
        if value.trim().is_empty() {
            continue;
        }
        if remote_has_value(remote, property) {
            continue;
        }
        patch.insert(property.to_string(), value.clone());
    }

    patch
}

/// Initial property map for a contact that does not exist yet: identity,
/// provenance, and every non-empty intent field.
pub fn creation_properties(source: SourceSystem, intent: &ContactIntent) -> PropertyMap {
    let mut properties = PropertyMap::new();
    properties.insert(PROP_EMAIL.to_string(), intent.email.clone());
    properties.insert(PROP_SOURCE_SYSTEM.to_string(), source.label().to_string());

    if let Some(record_id) = &intent.source_record_id {
        properties.insert(source.id_property().to_string(), record_id.clone());
    }

    for (property, value) in intent_properties(intent) {
        if let Some(value) = value {
            if !value.trim().is_empty() {
                properties.insert(property.to_string(), value.clone());
            }
        }
    }

    properties
}

fn remote_has_value(remote: &PropertyMap, property: &str) -> bool {
    remote
        .get(property)
        .map(|v| !v.trim().is_empty())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intent() -> ContactIntent {
        let mut i = ContactIntent::new("jane@example.com").unwrap();
        i.first_name = Some("Jane".to_string());
        i.last_name = Some("Doe".to_string());
        i.phone = Some("+15550001".to_string());
        i.source_record_id = Some("rec_9".to_string());
        i
    }

    #[test]
    fn empty_remote_gets_every_intent_field() {
        let patch = reconcile(SourceSystem::Sgcrm, &intent(), &PropertyMap::new());
        assert_eq!(patch.get(PROP_SOURCE_SYSTEM).unwrap(), "SGCRM");
        assert_eq!(patch.get(PROP_FIRST_NAME).unwrap(), "Jane");
        assert_eq!(patch.get(PROP_LAST_NAME).unwrap(), "Doe");
        assert_eq!(patch.get(PROP_PHONE).unwrap(), "+15550001");
        assert_eq!(patch.get("sgcrm_record_id").unwrap(), "rec_9");
        assert!(!patch.contains_key(PROP_COMPANY));
    }

    #[test]
    fn populated_remote_property_is_never_overwritten() {
        let mut remote = PropertyMap::new();
        remote.insert(PROP_FIRST_NAME.to_string(), "Janet".to_string());
        let patch = reconcile(SourceSystem::Sgcrm, &intent(), &remote);
        assert!(!patch.contains_key(PROP_FIRST_NAME));
        assert_eq!(patch.get(PROP_LAST_NAME).unwrap(), "Doe");
    }

    #[test]
    fn whitespace_remote_value_counts_as_gap() {
        let mut remote = PropertyMap::new();
        remote.insert(PROP_FIRST_NAME.to_string(), "   ".to_string());
        let patch = reconcile(SourceSystem::Sgcrm, &intent(), &remote);
        assert_eq!(patch.get(PROP_FIRST_NAME).unwrap(), "Jane");
    }

    #[test]
    fn source_system_always_present_even_with_no_other_fields() {
        let bare = ContactIntent::new("bare@example.com").unwrap();
        let mut remote = PropertyMap::new();
        remote.insert(PROP_FIRST_NAME.to_string(), "Set".to_string());
        let patch = reconcile(SourceSystem::Smartlead, &bare, &remote);
        assert_eq!(patch.len(), 1);
        assert_eq!(
            patch.get(PROP_SOURCE_SYSTEM).unwrap(),
            "Smartlead Email Campaign"
        );
    }

    #[test]
    fn foreign_id_is_asserted_even_when_remote_has_one() {
        let mut remote = PropertyMap::new();
        remote.insert("sgcrm_record_id".to_string(), "rec_old".to_string());
        let patch = reconcile(SourceSystem::Sgcrm, &intent(), &remote);
        assert_eq!(patch.get("sgcrm_record_id").unwrap(), "rec_9");
    }

    #[test]
    fn creation_properties_include_identity_and_provenance() {
        let props = creation_properties(SourceSystem::Sgcrm, &intent());
        assert_eq!(props.get(PROP_EMAIL).unwrap(), "jane@example.com");
        assert_eq!(props.get(PROP_SOURCE_SYSTEM).unwrap(), "SGCRM");
        assert_eq!(props.get(PROP_FIRST_NAME).unwrap(), "Jane");
        assert_eq!(props.get("sgcrm_record_id").unwrap(), "rec_9");
    }
}
