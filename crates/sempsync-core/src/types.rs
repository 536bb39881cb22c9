//! Configuration and result types shared by both backends.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Settings maps exchanged with the management APIs: field name → scalar or
/// nested map. Scalars may arrive stringified from the calling automation
/// layer and are coerced before comparison (see [`crate::coerce`]).
pub type Settings = Map<String, Value>;

/// SEMP v2 configuration API root.
pub const SEMP_V2_CONFIG: &str = "/SEMP/v2/config";
/// SEMP v2 monitoring API root.
pub const SEMP_V2_MONITOR: &str = "/SEMP/v2/monitor";
/// Hosted-cloud services API root.
pub const CLOUD_API_SERVICES_BASE: &str = "https://api.solace.cloud/api/v0/services";

/// Connection parameters for a directly reachable broker.
///
/// Constructed once per reconciliation pass from caller-supplied parameters
/// and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    pub host: String,
    pub port: u16,
    /// Use https instead of http.
    #[serde(default)]
    pub secure: bool,
    pub username: String,
    pub password: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Value for the `x-broker-name` header (virtual broker selection).
    #[serde(default)]
    pub broker_name: String,
}

fn default_timeout() -> u64 {
    10
}

impl BrokerConfig {
    pub fn new(host: impl Into<String>, port: u16, username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            secure: false,
            username: username.into(),
            password: password.into(),
            timeout_secs: default_timeout(),
            broker_name: String::new(),
        }
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn broker_name(mut self, name: impl Into<String>) -> Self {
        self.broker_name = name.into();
        self
    }

    /// `http(s)://host:port`
    pub fn base_url(&self) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        format!("{}://{}:{}", scheme, self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Connection parameters for the hosted-cloud management API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudConfig {
    pub api_token: String,
    pub service_id: String,
    #[serde(default = "default_cloud_timeout")]
    pub timeout_secs: u64,
}

fn default_cloud_timeout() -> u64 {
    60
}

impl CloudConfig {
    pub fn new(api_token: impl Into<String>, service_id: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            service_id: service_id.into(),
            timeout_secs: default_cloud_timeout(),
        }
    }

    pub fn timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Outcome of one reconciliation pass, in the shape the orchestration layer
/// reports: whether anything changed (or would change, under dry-run), the
/// response of the last successful call, and the minimal update payload when
/// an update was (or would have been) issued.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileResult {
    pub changed: bool,
    pub response: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta: Option<Settings>,
}

impl ReconcileResult {
    pub fn unchanged(response: Value) -> Self {
        Self {
            changed: false,
            response,
            delta: None,
        }
    }

    pub fn changed(response: Value) -> Self {
        Self {
            changed: true,
            response,
            delta: None,
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn base_url_plain() {
        let c = BrokerConfig::new("localhost", 8080, "admin", "admin");
        assert_eq!(c.base_url(), "http://localhost:8080");
    }

    #[test]
    fn base_url_secure() {
        let c = BrokerConfig::new("broker.example.com", 943, "admin", "admin").secure(true);
        assert_eq!(c.base_url(), "https://broker.example.com:943");
    }

    #[test]
    fn broker_defaults() {
        let c = BrokerConfig::new("h", 8080, "u", "p");
        assert_eq!(c.timeout_secs, 10);
        assert!(c.broker_name.is_empty());
        assert!(!c.secure);
    }

    #[test]
    fn cloud_default_timeout() {
        let c = CloudConfig::new("tok", "svc-1");
        assert_eq!(c.timeout_secs, 60);
    }

    #[test]
    fn result_serialisation_skips_empty_delta() {
        let r = ReconcileResult::unchanged(json!({"queueName": "q1"}));
        let s = serde_json::to_string(&r).unwrap();
        assert!(!s.contains("delta"));
        assert!(s.contains("queueName"));
    }

    #[test]
    fn result_serialisation_with_delta() {
        let mut delta = Settings::new();
        delta.insert("egressEnabled".into(), json!(true));
        let r = ReconcileResult {
            changed: true,
            response: json!({}),
            delta: Some(delta),
        };
        let s = serde_json::to_string(&r).unwrap();
        assert!(s.contains("\"changed\":true"));
        assert!(s.contains("egressEnabled"));
    }
}
