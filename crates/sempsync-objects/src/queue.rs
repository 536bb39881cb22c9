//! Queues on a message VPN.

use serde_json::{json, Value};

use sempsync_core::paging::{get_collection, ListQuery};
use sempsync_core::reconcile::{ResourceDescriptor, ResourceOps};
use sempsync_core::types::Settings;
use sempsync_core::{SempClient, SempResult};

use crate::SEMP_V2_CONFIG;

pub const DESCRIPTOR: ResourceDescriptor = ResourceDescriptor::new("queueName");

/// One queue within a message VPN.
pub struct QueueTask<'a> {
    client: &'a SempClient,
    msg_vpn: String,
    name: String,
}

impl<'a> QueueTask<'a> {
    pub fn new(client: &'a SempClient, msg_vpn: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            client,
            msg_vpn: msg_vpn.into(),
            name: name.into(),
        }
    }

    fn collection_segments(&self) -> Vec<&str> {
        vec![SEMP_V2_CONFIG, "msgVpns", &self.msg_vpn, "queues"]
    }

    fn instance_segments(&self) -> Vec<&str> {
        let mut segments = self.collection_segments();
        segments.push(&self.name);
        segments
    }
}

impl ResourceOps for QueueTask<'_> {
    fn descriptor(&self) -> &ResourceDescriptor {
        &DESCRIPTOR
    }

    fn mandatory_fields(&self) -> Settings {
        let mut fields = Settings::new();
        fields.insert("queueName".into(), json!(self.name));
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

/// List queues on a VPN, following pagination to exhaustion.
pub async fn list_queues(
    client: &SempClient,
    msg_vpn: &str,
    query: &ListQuery,
) -> SempResult<Vec<Value>> {
    get_collection(client, &["msgVpns", msg_vpn, "queues"], query).await
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use sempsync_core::BrokerConfig;

    fn client() -> SempClient {
        SempClient::new(BrokerConfig::new("localhost", 8080, "admin", "admin")).unwrap()
    }

    #[test]
    fn instance_path_layout() {
        let c = client();
        let task = QueueTask::new(&c, "default", "orders");
        assert_eq!(
            task.instance_segments(),
            vec!["/SEMP/v2/config", "msgVpns", "default", "queues", "orders"]
        );
    }

    #[test]
    fn mandatory_fields_carry_lookup_key() {
        let c = client();
        let task = QueueTask::new(&c, "default", "orders");
        assert_eq!(task.mandatory_fields()["queueName"], json!("orders"));
    }

    #[test]
    fn descriptor_has_no_extra_whitelist() {
        assert_eq!(DESCRIPTOR.lookup_key, "queueName");
        assert!(DESCRIPTOR.whitelist_keys.is_empty());
        assert!(DESCRIPTOR.is_whitelisted("password"));
    }
}
