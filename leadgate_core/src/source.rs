use serde::{Deserialize, Serialize};

/// An external platform that delivers contact webhooks.
///
/// The variant is chosen by which endpoint received the request, never from
/// payload content. Each variant carries its provenance label, the CRM custom
/// property holding the sender's foreign id, and the ordered field fallback
/// chains the normalizer walks. Adding a source system means adding one
/// variant here; shared logic does not branch on payload shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceSystem {
    Sgcrm,
    Smartlead,
}

impl SourceSystem {
    /// Value written to the `source_system` CRM property.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Sgcrm => "SGCRM",
            Self::Smartlead => "Smartlead Email Campaign",
        }
    }

    /// CRM custom property that stores the sender's foreign id.
    pub fn id_property(&self) -> &'static str {
        match self {
            Self::Sgcrm => "sgcrm_record_id",
            Self::Smartlead => "smartlead_lead_id",
        }
    }

    /// Ordered email candidates; the first non-empty match wins.
    pub(crate) fn email_paths(&self) -> &'static [&'static str] {
        match self {
            Self::Sgcrm => &["email", "contact.email", "data.email"],
            Self::Smartlead => &["to_email", "sl_lead_email"],
        }
    }

    pub(crate) fn record_id_paths(&self) -> &'static [&'static str] {
        match self {
            Self::Sgcrm => &["id", "contact.id", "data.id"],
            Self::Smartlead => &["sl_lead_id", "lead_id"],
        }
    }

    pub(crate) fn first_name_paths(&self) -> &'static [&'static str] {
        match self {
            Self::Sgcrm => &["first_name", "contact.first_name"],
            Self::Smartlead => &["first_name"],
        }
    }

    pub(crate) fn last_name_paths(&self) -> &'static [&'static str] {
        match self {
            Self::Sgcrm => &["last_name", "contact.last_name"],
            Self::Smartlead => &["last_name"],
        }
    }

    pub(crate) fn phone_paths(&self) -> &'static [&'static str] {
        match self {
            Self::Sgcrm => &["phone", "contact.phone"],
            Self::Smartlead => &["phone"],
        }
    }

    pub(crate) fn company_paths(&self) -> &'static [&'static str] {
        match self {
            Self::Sgcrm => &["company", "contact.company"],
            Self::Smartlead => &["company"],
        }
    }

    /// Full-name candidates, consulted only when first/last are both absent.
    pub(crate) fn full_name_paths(&self) -> &'static [&'static str] {
        match self {
            Self::Sgcrm => &["name", "contact.name"],
            Self::Smartlead => &["sl_lead_name", "name"],
        }
    }
}

impl std::fmt::Display for SourceSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sgcrm => write!(f, "sgcrm"),
            Self::Smartlead => write!(f, "smartlead"),
        }
    }
}
