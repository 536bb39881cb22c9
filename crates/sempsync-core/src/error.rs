//! Error types shared by both management-API backends.

use std::fmt;

use serde_json::Value;

/// Categorised error kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SempErrorKind {
    /// Network-level failure before any HTTP status was obtained
    Connection,
    /// Remote rejected the request (non-2xx with a structured body)
    Remote,
    /// Settings contain keys the remote resource does not know
    InvalidKeys,
    /// A required-together field group was only partially supplied
    MissingKeys,
    /// Completion poll budget exhausted — remote state is unknown
    Indeterminate,
    /// Malformed or unexpected response body
    Parse,
    /// Legacy XML management call reported a failure
    Rpc,
    /// Invalid local configuration
    Config,
}

impl fmt::Display for SempErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connection => write!(f, "Connection error"),
            Self::Remote => write!(f, "Remote rejection"),
            Self::InvalidKeys => write!(f, "Invalid settings keys"),
            Self::MissingKeys => write!(f, "Missing settings keys"),
            Self::Indeterminate => write!(f, "Indeterminate remote state"),
            Self::Parse => write!(f, "Parse error"),
            Self::Rpc => write!(f, "Legacy management call failed"),
            Self::Config => write!(f, "Configuration error"),
        }
    }
}

/// Error type carrying a kind, a human-readable message, the HTTP status when
/// one was received, and an optional structured payload (remote error body or
/// validation hints).
#[derive(Debug, Clone)]
pub struct SempError {
    pub kind: SempErrorKind,
    pub message: String,
    pub status_code: Option<u16>,
    pub details: Option<Value>,
}

impl SempError {
    pub fn new(kind: SempErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status_code: None,
            details: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status_code = Some(status);
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn connection(msg: impl Into<String>) -> Self {
        Self::new(SempErrorKind::Connection, msg)
    }

    pub fn remote(status: u16, msg: impl Into<String>) -> Self {
        Self::new(SempErrorKind::Remote, msg).with_status(status)
    }

    pub fn invalid_keys(msg: impl Into<String>, details: Value) -> Self {
        Self::new(SempErrorKind::InvalidKeys, msg).with_details(details)
    }

    pub fn missing_keys(msg: impl Into<String>) -> Self {
        Self::new(SempErrorKind::MissingKeys, msg)
    }

    pub fn indeterminate(msg: impl Into<String>) -> Self {
        Self::new(SempErrorKind::Indeterminate, msg)
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::new(SempErrorKind::Parse, msg)
    }

    pub fn rpc(msg: impl Into<String>) -> Self {
        Self::new(SempErrorKind::Rpc, msg)
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::new(SempErrorKind::Config, msg)
    }
}

impl fmt::Display for SempError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "[{} ({})] {}", self.kind, code, self.message),
            None => write!(f, "[{}] {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for SempError {}

impl From<SempError> for String {
    fn from(e: SempError) -> String {
        e.to_string()
    }
}

impl From<reqwest::Error> for SempError {
    fn from(e: reqwest::Error) -> Self {
        if let Some(status) = e.status() {
            Self::remote(status.as_u16(), format!("HTTP error: {e}"))
        } else if e.is_timeout() {
            Self::connection(format!("HTTP timeout: {e}"))
        } else {
            Self::connection(format!("Connection failed: {e}"))
        }
    }
}

/// Convenience alias.
pub type SempResult<T> = Result<T, SempError>;

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn display_without_status() {
        let e = SempError::connection("refused");
        assert_eq!(e.to_string(), "[Connection error] refused");
    }

    #[test]
    fn display_with_status() {
        let e = SempError::remote(400, "bad field");
        assert_eq!(e.to_string(), "[Remote rejection (400)] bad field");
    }

    #[test]
    fn details_attached() {
        let e = SempError::invalid_keys("invalid key(s)", json!({"invalid_keys": "maxMsgSpoolUsge"}));
        assert_eq!(
            e.details.unwrap()["invalid_keys"],
            json!("maxMsgSpoolUsge")
        );
    }

    #[test]
    fn std_error_trait() {
        let e = SempError::indeterminate("poll budget exhausted");
        let _: &dyn std::error::Error = &e;
    }

    #[test]
    fn string_conversion() {
        let e = SempError::missing_keys("missing key(s) in settings: b");
        let s: String = e.into();
        assert!(s.contains("missing key(s)"));
    }
}
