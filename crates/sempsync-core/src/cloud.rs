//! HTTP client for the hosted-cloud management API.
//!
//! Differences from the direct backend: bearer-token auth, resource paths
//! rooted at a service id, mutations wrapped in an `operation` body and
//! POSTed to a requests endpoint, and long-running operations answered with
//! HTTP 202 plus a request id that must be polled to completion.

use std::future::Future;
use std::time::Duration;

use log::debug;
use reqwest::Method;
use serde_json::{json, Value};

use crate::error::{SempError, SempResult};
use crate::paths::compose_path;
use crate::types::{CloudConfig, Settings, CLOUD_API_SERVICES_BASE};

/// Completion-poll budget: attempts × delay is the total deadline.
pub const REQUEST_POLL_RETRIES: u32 = 12;
pub const REQUEST_POLL_DELAY: Duration = Duration::from_secs(5);

/// Cloud-backend client. One instance per reconciliation pass.
#[derive(Debug, Clone)]
pub struct CloudClient {
    http: reqwest::Client,
    config: CloudConfig,
    poll_retries: u32,
    poll_delay: Duration,
}

impl CloudClient {
    pub fn new(config: CloudConfig) -> SempResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| SempError::config(format!("HTTP client construction failed: {e}")))?;
        Ok(Self {
            http,
            config,
            poll_retries: REQUEST_POLL_RETRIES,
            poll_delay: REQUEST_POLL_DELAY,
        })
    }

    pub fn config(&self) -> &CloudConfig {
        &self.config
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// URL under the services root: `{base}/{segment}/{segment}/...`
    pub fn services_url(&self, segments: &[&str]) -> SempResult<String> {
        let mut all: Vec<&str> = vec![CLOUD_API_SERVICES_BASE];
        all.extend_from_slice(segments);
        compose_path(&all)
    }

    /// URL under this client's service: `{base}/{service_id}/...`
    pub fn service_url(&self, segments: &[&str]) -> SempResult<String> {
        let mut all: Vec<&str> = vec![CLOUD_API_SERVICES_BASE, &self.config.service_id];
        all.extend_from_slice(segments);
        compose_path(&all)
    }

    // ── Core request ─────────────────────────────────────────────────

    /// One authenticated round-trip against an absolute URL. 200/201 are
    /// synchronous success; 202 means accepted — the request id is polled
    /// until the operation reports `completed`, and the final response's
    /// `data` is returned.
    pub async fn request(&self, method: Method, url: &str, body: Option<&Value>) -> SempResult<Value> {
        let (status, raw) = self.send(method, url, body).await?;
        if status == 202 {
            let accepted = self.wait_request_completed(&raw).await?;
            return Ok(crate::client::extract_data(accepted));
        }
        Ok(crate::client::extract_data(raw))
    }

    async fn send(&self, method: Method, url: &str, body: Option<&Value>) -> SempResult<(u16, Value)> {
        debug!("{} {}", method, url);
        let mut req = self
            .http
            .request(method, url)
            .bearer_auth(&self.config.api_token);
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

        if matches!(status, 200 | 201 | 202) {
            if text.is_empty() {
                return Ok((status, json!({})));
            }
            let body: Value = serde_json::from_str(&text)
                .map_err(|e| SempError::parse(format!("response body is not JSON: {e}")))?;
            Ok((status, body))
        } else {
            let details = serde_json::from_str::<Value>(&text).unwrap_or(Value::Null);
            Err(SempError::remote(status, format!("HTTP status {status}")).with_details(json!({
                "status_code": status,
                "body": details,
            })))
        }
    }

    // ── Verb helpers ─────────────────────────────────────────────────

    pub async fn get(&self, url: &str) -> SempResult<Value> {
        self.request(Method::GET, url, None).await
    }

    pub async fn post(&self, url: &str, body: &Value) -> SempResult<Value> {
        self.request(Method::POST, url, Some(body)).await
    }

    pub async fn patch(&self, url: &str, body: &Value) -> SempResult<Value> {
        self.request(Method::PATCH, url, Some(body)).await
    }

    pub async fn delete(&self, url: &str) -> SempResult<Value> {
        self.request(Method::DELETE, url, None).await
    }

    // ── Reconcile-facing GET ─────────────────────────────────────────

    /// Fetch current configuration for a single instance; the cloud signals a
    /// missing instance with a plain 404.
    pub async fn get_config(&self, url: &str, lookup_key: &str) -> SempResult<Option<Settings>> {
        match self.get(url).await {
            Ok(data) => {
                let obj = data.as_object().ok_or_else(|| {
                    SempError::parse("single-instance GET returned a non-object")
                })?;
                if !obj.contains_key(lookup_key) {
                    return Err(SempError::parse(format!(
                        "GET response does not contain lookup key '{lookup_key}'"
                    )));
                }
                Ok(Some(obj.clone()))
            }
            Err(e) if e.status_code == Some(404) => Ok(None),
            Err(e) => Err(e),
        }
    }

    // ── Completion waiter ────────────────────────────────────────────

    async fn wait_request_completed(&self, accepted: &Value) -> SempResult<Value> {
        let request_id = accepted
            .pointer("/data/id")
            .and_then(Value::as_str)
            .ok_or_else(|| SempError::parse("202 response carries no request id"))?;
        let url = self.service_url(&["requests", request_id])?;

        poll_until_completed(
            || {
                let url = url.clone();
                async move {
                    let (status, body) = self.send(Method::GET, &url, None).await?;
                    if status != 200 {
                        return Err(SempError::remote(status, "request status poll failed"));
                    }
                    Ok(body)
                }
            },
            self.poll_retries,
            self.poll_delay,
        )
        .await
    }
}

/// Poll `fetch` until the returned body reports `data.adminProgress ==
/// "completed"`, with a fixed attempt budget and delay. Exhausting the budget
/// is an indeterminate-state error: the operation may still complete on the
/// remote side, so it must not be read as an ordinary failure.
pub async fn poll_until_completed<F, Fut>(
    mut fetch: F,
    retries: u32,
    delay: Duration,
) -> SempResult<Value>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = SempResult<Value>>,
{
    for attempt in 0..retries {
        let body = fetch().await?;
        let progress = body
            .pointer("/data/adminProgress")
            .and_then(Value::as_str)
            .unwrap_or("");
        if progress == "completed" {
            return Ok(body);
        }
        debug!("request not completed (attempt {}): {}", attempt + 1, progress);
        tokio::time::sleep(delay).await;
    }
    Err(SempError::indeterminate(format!(
        "operation did not complete within {} polls — remote state is unknown",
        retries
    )))
}

/// Mutation body for the cloud requests endpoint:
/// `{"operation": op, "<resourceType>": {fields...}}`.
pub fn operation_body(operation: &str, resource_type: &str, data: &Settings) -> Value {
    json!({
        "operation": operation,
        resource_type: data,
    })
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SempErrorKind;
    use std::cell::RefCell;

    fn client() -> CloudClient {
        CloudClient::new(CloudConfig::new("token", "svc-1")).unwrap()
    }

    #[test]
    fn service_url_roots_at_service_id() {
        let c = client();
        let url = c.service_url(&["clientProfiles", "profile_1"]).unwrap();
        assert_eq!(
            url,
            "https://api.solace.cloud/api/v0/services/svc-1/clientProfiles/profile_1"
        );
    }

    #[test]
    fn service_url_encodes_identifier_slashes() {
        let c = client();
        let url = c.service_url(&["requests", "a/b"]).unwrap();
        assert!(url.ends_with("/requests/a%2Fb"));
    }

    #[test]
    fn operation_body_shape() {
        let mut data = Settings::new();
        data.insert("clientProfileName".into(), json!("profile_1"));
        let body = operation_body("update", "clientProfile", &data);
        assert_eq!(body["operation"], json!("update"));
        assert_eq!(body["clientProfile"]["clientProfileName"], json!("profile_1"));
    }

    #[tokio::test]
    async fn poll_returns_completed_response() {
        let responses = RefCell::new(vec![
            json!({"data": {"adminProgress": "completed", "id": "r1"}}),
            json!({"data": {"adminProgress": "inProgress", "id": "r1"}}),
        ]);
        let responses = &responses;
        let body = poll_until_completed(
            move || async move { Ok(responses.borrow_mut().pop().unwrap()) },
            12,
            Duration::ZERO,
        )
        .await
        .unwrap();
        assert_eq!(body["data"]["adminProgress"], json!("completed"));
    }

    #[tokio::test]
    async fn poll_budget_exhaustion_is_indeterminate() {
        let polls = RefCell::new(0u32);
        let polls_ref = &polls;
        let err = poll_until_completed(
            move || async move {
                *polls_ref.borrow_mut() += 1;
                Ok(json!({"data": {"adminProgress": "inProgress"}}))
            },
            12,
            Duration::ZERO,
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind, SempErrorKind::Indeterminate);
        assert_eq!(*polls.borrow(), 12);
    }

    #[tokio::test]
    async fn poll_propagates_fetch_errors() {
        let err = poll_until_completed(
            || async { Err(SempError::connection("reset")) },
            12,
            Duration::ZERO,
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind, SempErrorKind::Connection);
    }
}
