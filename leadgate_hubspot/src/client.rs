//! HubSpot connector.
//!
//! Talks to the CRM v3 objects API: contact search by email (equality
//! filter, limit 1, newest-created first), contact creation, and property
//! patches. Auth is a bearer private-app token supplied once at startup.

use std::time::Duration;

use async_trait::async_trait;
use leadgate_core::crm::{CrmContact, CrmContacts};
use leadgate_core::models::PropertyMap;
use leadgate_core::reconcile::{
    PROP_COMPANY, PROP_EMAIL, PROP_FIRST_NAME, PROP_LAST_NAME, PROP_PHONE, PROP_SOURCE_SYSTEM,
};
use leadgate_core::{Error, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::instrument;

pub const DEFAULT_API_BASE: &str = "https://api.hubapi.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Serialize)]
struct SearchRequest {
    #[serde(rename = "filterGroups")]
    filter_groups: Vec<FilterGroup>,
    properties: Vec<String>,
    sorts: Vec<SearchSort>,
    limit: u32,
}

#[derive(Debug, Serialize)]
struct FilterGroup {
    filters: Vec<Filter>,
}

#[derive(Debug, Serialize)]
struct Filter {
    #[serde(rename = "propertyName")]
    property_name: String,
    operator: String,
    value: String,
}

#[derive(Debug, Serialize)]
struct SearchSort {
    #[serde(rename = "propertyName")]
    property_name: String,
    direction: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<ContactObject>,
}

#[derive(Debug, Deserialize)]
struct ContactObject {
    id: String,
    #[serde(default)]
    properties: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct PropertiesEnvelope<'a> {
    properties: &'a PropertyMap,
}

#[derive(Clone)]
pub struct HubSpotClient {
    client: Client,
    api_base: String,
    token: String,
}

impl HubSpotClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_timeout(token, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(token: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("reqwest client");
        Self {
            client,
            api_base: DEFAULT_API_BASE.to_string(),
            token: token.into(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Liveness probe for the configured token: a 1-contact page read.
    #[instrument(level = "info", skip(self))]
    pub async fn check(&self) -> Result<()> {
        let url = format!("{}/crm/v3/objects/contacts", self.api_base);
        let resp = self
            .client
            .get(url)
            .query(&[("limit", "1"), ("archived", "false")])
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| Error::remote_api("check credentials", e))?;
        expect_success("check credentials", resp).await?;
        Ok(())
    }

    async fn contact_from_response(
        operation: &str,
        resp: reqwest::Response,
    ) -> Result<ContactObject> {
        let resp = expect_success(operation, resp).await?;
        resp.json::<ContactObject>()
            .await
            .map_err(|e| Error::remote_api(operation.to_string(), e))
    }
}

#[async_trait]
impl CrmContacts for HubSpotClient {
    #[instrument(level = "debug", skip(self))]
    async fn search_by_email(&self, email: &str) -> Result<Option<CrmContact>> {
        const OP: &str = "search contacts";

        let url = format!("{}/crm/v3/objects/contacts/search", self.api_base);
        let req_body = SearchRequest {
            filter_groups: vec![FilterGroup {
                filters: vec![Filter {
                    property_name: PROP_EMAIL.to_string(),
                    operator: "EQ".to_string(),
                    value: email.to_string(),
                }],
            }],
            properties: [
                PROP_EMAIL,
                PROP_FIRST_NAME,
                PROP_LAST_NAME,
                PROP_PHONE,
                PROP_COMPANY,
                PROP_SOURCE_SYSTEM,
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            // Duplicates exist in the wild; take the most recently created.
            sorts: vec![SearchSort {
                property_name: "createdate".to_string(),
                direction: "DESCENDING".to_string(),
            }],
            limit: 1,
        };

        let resp = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .json(&req_body)
            .send()
            .await
            .map_err(|e| Error::remote_api(OP, e))?;
        let resp = expect_success(OP, resp).await?;
        let body: SearchResponse = resp.json().await.map_err(|e| Error::remote_api(OP, e))?;

        Ok(body.results.into_iter().next().map(|c| CrmContact {
            id: c.id,
            properties: flatten_properties(&c.properties),
        }))
    }

    #[instrument(level = "debug", skip(self, properties))]
    async fn create_contact(&self, properties: &PropertyMap) -> Result<CrmContact> {
        const OP: &str = "create contact";

        let url = format!("{}/crm/v3/objects/contacts", self.api_base);
        let resp = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .json(&PropertiesEnvelope { properties })
            .send()
            .await
            .map_err(|e| Error::remote_api(OP, e))?;
        let created = Self::contact_from_response(OP, resp).await?;

        Ok(CrmContact {
            id: created.id,
            properties: flatten_properties(&created.properties),
        })
    }

    #[instrument(level = "debug", skip(self, properties))]
    async fn update_contact(&self, contact_id: &str, properties: &PropertyMap) -> Result<()> {
        const OP: &str = "update contact properties";

        let url = format!("{}/crm/v3/objects/contacts/{}", self.api_base, contact_id);
        let resp = self
            .client
            .patch(url)
            .bearer_auth(&self.token)
            .json(&PropertiesEnvelope { properties })
            .send()
            .await
            .map_err(|e| Error::remote_api(OP, e))?;
        expect_success(OP, resp).await?;
        Ok(())
    }
}

/// HubSpot returns properties as a JSON object with nullable values; keep the
/// non-empty strings.
fn flatten_properties(value: &serde_json::Value) -> PropertyMap {
    let mut out = PropertyMap::new();
    if let serde_json::Value::Object(map) = value {
        for (k, v) in map {
            if let Some(s) = v.as_str() {
                if !s.trim().is_empty() {
                    out.insert(k.clone(), s.to_string());
                }
            }
        }
    }
    out
}

async fn expect_success(operation: &str, resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(Error::RemoteApiStatus {
        operation: operation.to_string(),
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn search_request_uses_hubspot_wire_names() {
        let req = SearchRequest {
            filter_groups: vec![FilterGroup {
                filters: vec![Filter {
                    property_name: "email".to_string(),
                    operator: "EQ".to_string(),
                    value: "a@b.com".to_string(),
                }],
            }],
            properties: vec!["email".to_string()],
            sorts: vec![SearchSort {
                property_name: "createdate".to_string(),
                direction: "DESCENDING".to_string(),
            }],
            limit: 1,
        };

        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(
            v["filterGroups"][0]["filters"][0]["propertyName"],
            json!("email")
        );
        assert_eq!(v["filterGroups"][0]["filters"][0]["operator"], json!("EQ"));
        assert_eq!(v["sorts"][0]["propertyName"], json!("createdate"));
        assert_eq!(v["limit"], json!(1));
    }

    #[test]
    fn flatten_drops_nulls_and_empties() {
        let props = json!({
            "email": "a@b.com",
            "firstname": null,
            "lastname": "",
            "phone": "  ",
            "company": "Acme"
        });
        let map = flatten_properties(&props);
        assert_eq!(map.get("email").unwrap(), "a@b.com");
        assert_eq!(map.get("company").unwrap(), "Acme");
        assert!(!map.contains_key("firstname"));
        assert!(!map.contains_key("lastname"));
        assert!(!map.contains_key("phone"));
    }

    #[test]
    fn flatten_tolerates_non_object_properties() {
        assert!(flatten_properties(&json!(null)).is_empty());
        assert!(flatten_properties(&json!([1])).is_empty());
    }
}
