//! FileMaker Data API v1 transport
//!
//! Thin blocking HTTP implementation of [`RecordApi`]. Every response is a
//! JSON envelope carrying a `messages[0].code`; code `"0"` is success and
//! anything else is surfaced as [`ApiError::Fault`] for the client layer
//! to classify.

use reqwest::blocking::Client as HttpClient;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::time::Duration;

use crate::core::api::{
    ApiError, Connectivity, QueryGroup, RecordApi, SessionToken, SortSpec, WireRecord,
};
use crate::core::config::ServerConfig;

/// Known-reachable endpoint used to tell "server down" from "no network".
const PROBE_URL: &str = "https://www.google.com";

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Blocking FileMaker Data API transport for one hosted database.
pub struct FmDataApi {
    http: HttpClient,
    base_url: String,
    database: String,
}

impl FmDataApi {
    /// Build a transport for the configured server.
    ///
    /// TLS verification is configurable because the servers this tool
    /// targets commonly run with self-signed certificates.
    pub fn new(server: &ServerConfig) -> Result<Self, ApiError> {
        let http = HttpClient::builder()
            .timeout(HTTP_TIMEOUT)
            .danger_accept_invalid_certs(!server.verify_tls)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url: server.url.trim_end_matches('/').to_string(),
            database: server.database.clone(),
        })
    }

    fn url(&self, tail: &str) -> String {
        format!(
            "{}/fmi/data/v1/databases/{}/{}",
            self.base_url, self.database, tail
        )
    }

    fn read_envelope<T: DeserializeOwned>(
        &self,
        response: reqwest::blocking::Response,
    ) -> Result<T, ApiError> {
        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        parse_envelope(status, &body)
    }
}

/// Response envelope shared by every Data API endpoint.
#[derive(Deserialize)]
struct Envelope<T> {
    response: Option<T>,
    #[serde(default)]
    messages: Vec<ApiMessage>,
}

#[derive(Deserialize)]
struct ApiMessage {
    code: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    token: String,
}

#[derive(Debug, Deserialize)]
struct RecordsResponse {
    #[serde(default)]
    data: Vec<WireRecord>,
}

#[derive(Serialize)]
struct WireSort<'a> {
    #[serde(rename = "fieldName")]
    field_name: &'a str,
    #[serde(rename = "sortOrder")]
    sort_order: &'static str,
}

/// Decode a Data API envelope, faulting on any non-zero message code.
///
/// Fault codes arrive regardless of HTTP status, so the body is parsed
/// first and the status is only reported when the body is unusable.
fn parse_envelope<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, ApiError> {
    let envelope: Envelope<T> = serde_json::from_str(body)
        .map_err(|e| ApiError::Transport(format!("HTTP {status}: unparseable response: {e}")))?;

    let message = envelope
        .messages
        .first()
        .ok_or_else(|| ApiError::Transport(format!("HTTP {status}: response carried no status")))?;

    let code: i64 = message.code.parse().unwrap_or(-1);
    if code != 0 {
        return Err(ApiError::Fault {
            code,
            message: message.message.clone(),
        });
    }

    envelope
        .response
        .ok_or_else(|| ApiError::Transport("success response without a payload".into()))
}

fn sort_param(sort: &[SortSpec]) -> Result<String, ApiError> {
    let wire: Vec<WireSort<'_>> = sort
        .iter()
        .map(|s| WireSort {
            field_name: &s.field,
            sort_order: if s.descending { "descend" } else { "ascend" },
        })
        .collect();
    serde_json::to_string(&wire).map_err(|e| ApiError::Transport(e.to_string()))
}

fn query_body(query: &[QueryGroup]) -> Value {
    let groups: Vec<Value> = query
        .iter()
        .map(|group| {
            let mut terms = Map::new();
            for (field, value) in group {
                terms.insert(field.clone(), Value::String(value.clone()));
            }
            Value::Object(terms)
        })
        .collect();
    json!({ "query": groups })
}

impl RecordApi for FmDataApi {
    fn sign_in(&self, user: &str, password: &str) -> Result<SessionToken, ApiError> {
        let response = self
            .http
            .post(self.url("sessions"))
            .basic_auth(user, Some(password))
            .json(&json!({}))
            .send()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let session: SessionResponse = self.read_envelope(response)?;
        Ok(SessionToken::new(session.token))
    }

    fn find(
        &self,
        token: &SessionToken,
        layout: &str,
        query: &[QueryGroup],
    ) -> Result<Vec<WireRecord>, ApiError> {
        let response = self
            .http
            .post(self.url(&format!("layouts/{layout}/_find")))
            .bearer_auth(token.as_str())
            .json(&query_body(query))
            .send()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let records: RecordsResponse = self.read_envelope(response)?;
        Ok(records.data)
    }

    fn fetch_page(
        &self,
        token: &SessionToken,
        layout: &str,
        sort: &[SortSpec],
        limit: u32,
    ) -> Result<Vec<WireRecord>, ApiError> {
        let mut request = self
            .http
            .get(self.url(&format!("layouts/{layout}/records")))
            .bearer_auth(token.as_str())
            .query(&[("_limit", limit.to_string())]);
        if !sort.is_empty() {
            request = request.query(&[("_sort", sort_param(sort)?)]);
        }

        let response = request
            .send()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let records: RecordsResponse = self.read_envelope(response)?;
        Ok(records.data)
    }

    fn edit(
        &self,
        token: &SessionToken,
        layout: &str,
        record_id: &str,
        changes: &Map<String, Value>,
    ) -> Result<(), ApiError> {
        let response = self
            .http
            .patch(self.url(&format!("layouts/{layout}/records/{record_id}")))
            .bearer_auth(token.as_str())
            .json(&json!({ "fieldData": changes }))
            .send()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        // The edit payload only carries the new modId; nothing to return.
        let _: Value = self.read_envelope(response)?;
        Ok(())
    }

    fn diagnose(&self) -> Connectivity {
        if self.http.get(&self.base_url).send().is_ok() {
            return Connectivity::ServerUnreachable;
        }
        match self.http.get(PROBE_URL).send() {
            Ok(_) => Connectivity::ServerUnreachable,
            Err(_) => Connectivity::NoNetwork,
        }
    }
}
