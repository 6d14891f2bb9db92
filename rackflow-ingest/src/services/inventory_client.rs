//! Rack-inventory service client
//!
//! Only the SLA countdown is used: `minutesRemainingToHandoff`, signed
//! minutes until the rack must be handed off.

use super::source_error::{excerpt, Fetched, SourceError};
use crate::models::AssetId;
use reqwest::header::{ACCEPT, COOKIE};
use serde_json::Value;
use std::time::Duration;

const USER_AGENT: &str = concat!("rackflow/", env!("CARGO_PKG_VERSION"));
const SLA_FIELD: &str = "minutesRemainingToHandoff";

/// Rack-inventory service client
pub struct InventoryClient {
    http_client: reqwest::Client,
    base_url: String,
    cookie: Option<String>,
}

impl InventoryClient {
    /// `base_url` is joined directly with the asset id (`.../api/racks/` + id)
    pub fn new(base_url: String, cookie: Option<String>, timeout: Duration) -> Result<Self, SourceError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url,
            cookie,
        })
    }

    /// Fetch minutes remaining until handoff.
    ///
    /// A 2xx response without a numeric SLA field is still a success with
    /// `None`.
    pub async fn fetch_sla_minutes(&self, asset_id: &AssetId) -> Result<Fetched<Option<f64>>, SourceError> {
        let url = rack_url(&self.base_url, asset_id);

        tracing::debug!(asset_id = %asset_id, url = %url, "Querying inventory service");

        let mut request = self.http_client.get(&url).header(ACCEPT, "application/json");
        if let Some(cookie) = &self.cookie {
            request = request.header(COOKIE, cookie);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            tracing::error!(
                asset_id = %asset_id,
                status = status.as_u16(),
                body = %excerpt(&text),
                "Inventory fetch failed"
            );
            return Err(SourceError::Api {
                status: status.as_u16(),
                body: excerpt(&text),
            });
        }

        let rack: Value = serde_json::from_str(&text).map_err(|e| SourceError::Parse {
            status: status.as_u16(),
            message: e.to_string(),
        })?;

        let minutes = sla_minutes(&rack);
        if minutes.is_none() {
            tracing::warn!(
                asset_id = %asset_id,
                value = ?rack.get(SLA_FIELD),
                "Inventory: {} missing or not a number",
                SLA_FIELD
            );
        }

        Ok(Fetched {
            status: status.as_u16(),
            value: minutes,
        })
    }
}

/// Numeric SLA field of a rack document
pub fn sla_minutes(rack: &Value) -> Option<f64> {
    rack.get(SLA_FIELD).and_then(Value::as_f64)
}

/// Asset ids are digits only, but the id is still percent-encoded as a
/// path segment.
fn rack_url(base_url: &str, asset_id: &AssetId) -> String {
    let encoded: String = asset_id
        .as_str()
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => (b as char).to_string(),
            _ => format!("%{:02X}", b),
        })
        .collect();
    format!("{}{}", base_url, encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_creation() {
        let client = InventoryClient::new(
            "http://127.0.0.1:9/api/racks/".to_string(),
            Some("session=abc".to_string()),
            Duration::from_secs(5),
        );
        assert!(client.is_ok());
    }

    #[test]
    fn test_rack_url() {
        let id = AssetId::parse("3549012011").unwrap();
        assert_eq!(
            rack_url("https://inventory.test/api/racks/", &id),
            "https://inventory.test/api/racks/3549012011"
        );
    }

    #[test]
    fn test_sla_minutes_numeric() {
        assert_eq!(sla_minutes(&json!({ "minutesRemainingToHandoff": 90 })), Some(90.0));
        assert_eq!(sla_minutes(&json!({ "minutesRemainingToHandoff": -15.5 })), Some(-15.5));
    }

    #[test]
    fn test_sla_minutes_non_numeric() {
        assert_eq!(sla_minutes(&json!({ "minutesRemainingToHandoff": "90" })), None);
        assert_eq!(sla_minutes(&json!({ "minutesRemainingToHandoff": null })), None);
        assert_eq!(sla_minutes(&json!({})), None);
        assert_eq!(sla_minutes(&json!([1, 2])), None);
    }
}
