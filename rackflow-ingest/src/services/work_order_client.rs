//! Installation work-order service client
//!
//! Looks up the most recent accepted/completed rack-installation work
//! order for an asset through the service's GraphQL search endpoint.

use super::source_error::{excerpt, Fetched, SourceError};
use crate::models::{AssetId, WorkOrderRecord};
use reqwest::header::{ACCEPT, CONTENT_TYPE, COOKIE};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::Duration;

const USER_AGENT: &str = concat!("rackflow/", env!("CARGO_PKG_VERSION"));
const OPERATION_NAME: &str = "SearchWorkRequestsCRS";

/// Body marker of a 403 caused by an expired credential
const AUTH_EXPIRED_MARKER: &str = "missing authentication token";

const SEARCH_QUERY: &str = r#"query SearchWorkRequestsCRS($queryInput: QueryInputInput, $requestedOutputFields: [RequestedOutputFieldInput!], $requestedSearchResultsNumber: Int, $startOffset: Int, $sortInputs: [SortInputInput!]) {
  workRequestsCRS(
    queryInput: $queryInput
    requestedOutputFields: $requestedOutputFields
    requestedSearchResultsNumber: $requestedSearchResultsNumber
    startOffset: $startOffset
    sortInputs: $sortInputs
  ) {
    totalSearchResultsNumber
    searchResults {
      workRequestId
      searchResult
      __typename
    }
    __typename
  }
}"#;

/// Fields requested from the search index
const OUTPUT_FIELDS: &[&str] = &[
    "location",
    "position",
    "brickName",
    "rackType",
    "uplinkConfig",
    "vendor",
];

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<SearchData>,
    errors: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct SearchData {
    #[serde(rename = "workRequestsCRS")]
    work_requests: Option<SearchPage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchPage {
    total_search_results_number: Option<u64>,
    #[serde(default)]
    search_results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchHit {
    work_request_id: Option<Value>,
    search_result: Option<Value>,
}

/// Work-order service client
pub struct WorkOrderClient {
    http_client: reqwest::Client,
    url: String,
    cookie: Option<String>,
}

impl WorkOrderClient {
    pub fn new(url: String, cookie: Option<String>, timeout: Duration) -> Result<Self, SourceError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            url,
            cookie,
        })
    }

    /// Find the newest matching work order for an asset.
    ///
    /// `Ok(None)` means the search succeeded but matched nothing.
    pub async fn find_work_order(
        &self,
        asset_id: &AssetId,
    ) -> Result<Fetched<Option<WorkOrderRecord>>, SourceError> {
        let payload = build_search_payload(asset_id);

        tracing::debug!(asset_id = %asset_id, url = %self.url, "Querying work-order service");

        let mut request = self
            .http_client
            .post(&self.url)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .json(&payload);
        if let Some(cookie) = &self.cookie {
            request = request.header(COOKIE, cookie);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            let auth_expired = is_auth_expired(status.as_u16(), &text);
            tracing::error!(
                asset_id = %asset_id,
                status = status.as_u16(),
                body = %excerpt(&text),
                auth_expired,
                "Work-order fetch failed"
            );

            return Err(if auth_expired {
                SourceError::AuthExpired {
                    status: status.as_u16(),
                }
            } else {
                SourceError::Api {
                    status: status.as_u16(),
                    body: excerpt(&text),
                }
            });
        }

        let parsed: GraphQlResponse =
            serde_json::from_str(&text).map_err(|e| SourceError::Parse {
                status: status.as_u16(),
                message: e.to_string(),
            })?;

        if let Some(errors) = parsed.errors.as_ref().filter(|e| !e.is_empty()) {
            tracing::warn!(asset_id = %asset_id, errors = ?errors, "Work-order GraphQL errors present");
        }

        let page = parsed.data.and_then(|d| d.work_requests);
        let total = page.as_ref().and_then(|p| p.total_search_results_number);
        let record = page
            .and_then(|p| p.search_results.into_iter().next())
            .map(record_from_hit);

        match &record {
            Some(r) => tracing::info!(
                asset_id = %asset_id,
                work_order_id = r.work_order_id.as_deref().unwrap_or(""),
                "Work order found"
            ),
            None => tracing::warn!(asset_id = %asset_id, total = ?total, "Work-order search returned 0 results"),
        }

        Ok(Fetched {
            status: status.as_u16(),
            value: record,
        })
    }
}

/// 403 whose body names the missing authentication token
pub fn is_auth_expired(status: u16, body: &str) -> bool {
    status == 403 && body.to_lowercase().contains(AUTH_EXPIRED_MARKER)
}

/// GraphQL search request for the newest non-rejected rack install of an asset
pub fn build_search_payload(asset_id: &AssetId) -> Value {
    let output_fields: Vec<Value> = OUTPUT_FIELDS
        .iter()
        .map(|f| json!({ "fieldType": "FIELD_ALIAS", "requestedOutputFieldValue": f }))
        .collect();

    json!({
        "operationName": OPERATION_NAME,
        "query": SEARCH_QUERY,
        "variables": {
            "queryInput": {
                "combiningOperator": "AND",
                "singleFieldQueries": [
                    {
                        "fieldAlias": "workRequestTemplateCategory",
                        "searchValues": ["Rack", "Rack Install"],
                        "queryOperator": "IN_SET"
                    },
                    {
                        "fieldAlias": "workRequestTemplateWorkType",
                        "searchValues": ["Boost_Rack_Installation"],
                        "queryOperator": "IN_SET"
                    },
                    {
                        "fieldAlias": "allMatch",
                        "searchValues": [asset_id.as_str()],
                        "queryOperator": "MATCH_PREFIX"
                    },
                    {
                        "fieldAlias": "workRequestStatus",
                        "searchValues": ["ACCEPTED", "COMPLETED"],
                        "queryOperator": "IN_SET"
                    },
                    {
                        "fieldAlias": "latestWorkflowMilestoneName",
                        "searchValues": ["Rejected"],
                        "queryOperator": "NOT_EQUAL"
                    }
                ]
            },
            "requestedOutputFields": output_fields,
            "startOffset": 0,
            "requestedSearchResultsNumber": 1,
            "sortInputs": [
                { "fieldAlias": "scannedDate", "sortOrder": "DESC", "precedence": 1 }
            ]
        }
    })
}

/// Flatten a search hit into a record.
///
/// `searchResult` arrives either as an object or as a JSON-encoded string.
/// Each field is looked up at the top level, then under `fields`, then
/// under `values`.
fn record_from_hit(hit: SearchHit) -> WorkOrderRecord {
    let result = match hit.search_result {
        Some(Value::String(s)) => serde_json::from_str::<Value>(&s).ok(),
        other => other,
    };
    let object = result.as_ref().and_then(Value::as_object);

    let get = |key: &str| object.and_then(|o| lookup(o, key)).and_then(scalar_to_string);

    WorkOrderRecord {
        work_order_id: hit.work_request_id.as_ref().and_then(scalar_to_string),
        scanned_date: get("scannedDate"),
        location: get("location"),
        position: get("position"),
        brick_name: get("brickName"),
        rack_type: get("rackType"),
        uplink_config: get("uplinkConfig"),
        vendor: get("vendor"),
    }
}

fn lookup<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    object
        .get(key)
        .or_else(|| object.get("fields").and_then(|f| f.get(key)))
        .or_else(|| object.get("values").and_then(|v| v.get(key)))
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
