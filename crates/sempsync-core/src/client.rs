//! HTTP client for the direct (self-hosted) broker management API.
//!
//! Handles basic-auth injection, the `x-broker-name` virtual-broker header,
//! envelope extraction (`{"data": {...}}`), remote-error normalisation and
//! the backend's not-found signature.

use log::debug;
use reqwest::Method;
use serde_json::{json, Value};

use crate::error::{SempError, SempErrorKind, SempResult};
use crate::paths::compose_path;
use crate::types::{BrokerConfig, Settings};

/// Direct-backend client. One instance per reconciliation pass; cheap to
/// clone (shares the underlying connection pool).
#[derive(Debug, Clone)]
pub struct SempClient {
    pub(crate) http: reqwest::Client,
    pub(crate) config: BrokerConfig,
}

impl SempClient {
    pub fn new(config: BrokerConfig) -> SempResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| SempError::config(format!("HTTP client construction failed: {e}")))?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &BrokerConfig {
        &self.config
    }

    // ── Core request ─────────────────────────────────────────────────

    /// One authenticated round-trip. Success is HTTP 200 with the body's
    /// `data` member extracted (`{}` when absent); anything else becomes a
    /// structured remote error. Network-level failures map to the
    /// connection error kind.
    pub async fn request(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&Value>,
    ) -> SempResult<Value> {
        let url = format!("{}{}", self.config.base_url(), compose_path(segments)?);
        let raw = self.send(method, &url, body).await?;
        Ok(extract_data(raw))
    }

    /// Same round-trip but returning the full response body — list queries
    /// need the `meta.paging` envelope next to `data`.
    pub async fn request_raw_url(&self, method: Method, url: &str, body: Option<&Value>) -> SempResult<Value> {
        self.send(method, url, body).await
    }

    async fn send(&self, method: Method, url: &str, body: Option<&Value>) -> SempResult<Value> {
        debug!("{} {}", method, url);
        let mut req = self
            .http
            .request(method, url)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .header("x-broker-name", &self.config.broker_name);
        if let Some(b) = body {
            req = req.json(b);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| SempError::connection(format!("{e}")))?;

        let status = resp.status().as_u16();
        let text = resp
            .text()
            .await
            .map_err(|e| SempError::connection(format!("failed to read response body: {e}")))?;

        if status == 200 {
            if text.is_empty() {
                return Ok(json!({}));
            }
            serde_json::from_str(&text)
                .map_err(|e| SempError::parse(format!("response body is not JSON: {e}")))
        } else {
            Err(remote_error(status, &text))
        }
    }

    // ── Verb helpers ─────────────────────────────────────────────────

    pub async fn get(&self, segments: &[&str]) -> SempResult<Value> {
        self.request(Method::GET, segments, None).await
    }

    pub async fn post(&self, segments: &[&str], body: &Value) -> SempResult<Value> {
        self.request(Method::POST, segments, Some(body)).await
    }

    pub async fn patch(&self, segments: &[&str], body: &Value) -> SempResult<Value> {
        self.request(Method::PATCH, segments, Some(body)).await
    }

    pub async fn delete(&self, segments: &[&str]) -> SempResult<Value> {
        self.request(Method::DELETE, segments, None).await
    }

    // ── Reconcile-facing GET ─────────────────────────────────────────

    /// Fetch current configuration for a single instance. `Ok(None)` when the
    /// backend reports the instance does not exist; the response must carry
    /// `lookup_key` to be accepted as a single-instance read.
    pub async fn get_config(&self, segments: &[&str], lookup_key: &str) -> SempResult<Option<Settings>> {
        match self.get(segments).await {
            Ok(data) => {
                let obj = data.as_object().ok_or_else(|| {
                    SempError::parse(
                        "single-instance GET returned a non-object — check this is not a collection path",
                    )
                })?;
                if !obj.contains_key(lookup_key) {
                    return Err(SempError::parse(format!(
                        "GET response does not contain lookup key '{lookup_key}'"
                    )));
                }
                Ok(Some(obj.clone()))
            }
            Err(e) if is_not_found(&e) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

// ─── Response normalisation ─────────────────────────────────────────

/// The good-response contract: the `data` member when present, else `{}`.
pub fn extract_data(body: Value) -> Value {
    match body {
        Value::Object(mut obj) => obj.remove("data").unwrap_or_else(|| json!({})),
        _ => json!({}),
    }
}

fn reason(status: u16) -> Option<&'static str> {
    match status {
        401 => Some("Unauthorized"),
        404 => Some("Not Found"),
        _ => None,
    }
}

/// Normalise a non-200 response. When the body carries a structured
/// `meta.error`, that whole `meta` object becomes the error detail, with a
/// hint attached for error code 89 (SEMP v2 access to a hosted-cloud
/// service). Otherwise the detail is `{status_code, reason, body}`.
fn remote_error(status: u16, text: &str) -> SempError {
    if text.is_empty() {
        return SempError::remote(status, format!("HTTP status {status}"));
    }
    let body: Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(_) => {
            return SempError::remote(status, format!("HTTP status {status}")).with_details(json!({
                "status_code": status,
                "reason": reason(status),
                "body": text,
            }))
        }
    };

    let description = body
        .pointer("/meta/error/description")
        .and_then(Value::as_str)
        .map(str::to_owned);
    if let Some(desc) = description {
        let mut meta = body.pointer("/meta").cloned().unwrap_or_else(|| json!({}));
        if meta.pointer("/error/code").and_then(Value::as_i64) == Some(89) {
            if let Some(obj) = meta.as_object_mut() {
                obj.insert(
                    "hint".into(),
                    json!([
                        "This might be a hosted-cloud service.",
                        "If so, supply the cloud api token and service id parameters."
                    ]),
                );
            }
        }
        return SempError::remote(status, desc).with_details(meta);
    }

    SempError::remote(status, format!("HTTP status {status}")).with_details(json!({
        "status_code": status,
        "reason": reason(status),
        "body": body,
    }))
}

/// Direct-backend not-found signature: a single-instance GET on a missing
/// instance answers 400 with `meta.error.code == 6`. One known exception: the
/// broker uses the same code for a genuine management-plane fault whose
/// description names `tlsCipherSuiteList` — that one stays an error.
pub fn is_not_found(err: &SempError) -> bool {
    if err.kind != SempErrorKind::Remote {
        return false;
    }
    let Some(details) = &err.details else {
        return false;
    };
    let response_code = details.pointer("/responseCode").and_then(Value::as_u64);
    let error_code = details.pointer("/error/code").and_then(Value::as_i64);
    if response_code != Some(400) || error_code != Some(6) {
        return false;
    }
    let description = details
        .pointer("/error/description")
        .and_then(Value::as_str)
        .unwrap_or("");
    !description.contains("Problem with tlsCipherSuiteList")
}

// ─── Tests ──────────────────────────────────────────────────────────
