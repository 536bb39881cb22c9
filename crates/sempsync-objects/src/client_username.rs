//! Client usernames on a message VPN.
//!
//! `password` is write-only on this resource; the engine's default whitelist
//! keeps it out of unknown-key validation and always includes it in the
//! update payload when supplied.

use serde_json::{json, Value};

use sempsync_core::paging::{get_collection, ListQuery};
use sempsync_core::reconcile::{ResourceDescriptor, ResourceOps};
use sempsync_core::types::Settings;
use sempsync_core::{SempClient, SempResult};

use crate::SEMP_V2_CONFIG;

pub const DESCRIPTOR: ResourceDescriptor = ResourceDescriptor::new("clientUsername");

pub struct ClientUsernameTask<'a> {
    client: &'a SempClient,
    msg_vpn: String,
    name: String,
}

impl<'a> ClientUsernameTask<'a> {
    pub fn new(client: &'a SempClient, msg_vpn: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            client,
            msg_vpn: msg_vpn.into(),
            name: name.into(),
        }
    }

    fn collection_segments(&self) -> Vec<&str> {
        vec![SEMP_V2_CONFIG, "msgVpns", &self.msg_vpn, "clientUsernames"]
    }

    fn instance_segments(&self) -> Vec<&str> {
        let mut segments = self.collection_segments();
        segments.push(&self.name);
        segments
    }
}

impl ResourceOps for ClientUsernameTask<'_> {
    fn descriptor(&self) -> &ResourceDescriptor {
        &DESCRIPTOR
    }

    fn mandatory_fields(&self) -> Settings {
        let mut fields = Settings::new();
        fields.insert("clientUsername".into(), json!(self.name));
        fields
    }

    async fn fetch(&self) -> SempResult<Option<Settings>> {
        self.client
            .get_config(&self.instance_segments(), DESCRIPTOR.lookup_key)
            .await
    }

    async fn create(&self, data: &Settings) -> SempResult<Value> {
        self.client
            .post(&self.collection_segments(), &Value::Object(data.clone()))
            .await
    }

    async fn update(&self, delta: &Settings) -> SempResult<Value> {
        self.client
            .patch(&self.instance_segments(), &Value::Object(delta.clone()))
            .await
    }

    async fn delete(&self) -> SempResult<Value> {
        self.client.delete(&self.instance_segments()).await
    }
}

/// List client usernames on a VPN.
pub async fn list_client_usernames(
    client: &SempClient,
    msg_vpn: &str,
    query: &ListQuery,
) -> SempResult<Vec<Value>> {
    get_collection(client, &["msgVpns", msg_vpn, "clientUsernames"], query).await
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_is_whitelisted_by_default() {
        assert!(DESCRIPTOR.is_whitelisted("password"));
        assert!(!DESCRIPTOR.is_whitelisted("enabled"));
    }
}
