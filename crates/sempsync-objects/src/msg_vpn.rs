//! Message VPNs (direct backend only — hosted services manage their own VPN).

use serde_json::{json, Value};

use sempsync_core::paging::{get_collection, ListQuery};
use sempsync_core::reconcile::{ResourceDescriptor, ResourceOps};
use sempsync_core::types::Settings;
use sempsync_core::{SempClient, SempResult};

use crate::SEMP_V2_CONFIG;

pub const DESCRIPTOR: ResourceDescriptor = ResourceDescriptor::new("msgVpnName");

pub struct MsgVpnTask<'a> {
    client: &'a SempClient,
    name: String,
}

impl<'a> MsgVpnTask<'a> {
    pub fn new(client: &'a SempClient, name: impl Into<String>) -> Self {
        Self {
            client,
            name: name.into(),
        }
    }

    fn collection_segments(&self) -> Vec<&str> {
        vec![SEMP_V2_CONFIG, "msgVpns"]
    }

    fn instance_segments(&self) -> Vec<&str> {
        vec![SEMP_V2_CONFIG, "msgVpns", &self.name]
    }
}

impl ResourceOps for MsgVpnTask<'_> {
    fn descriptor(&self) -> &ResourceDescriptor {
        &DESCRIPTOR
    }

    fn mandatory_fields(&self) -> Settings {
        let mut fields = Settings::new();
        fields.insert("msgVpnName".into(), json!(self.name));
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

/// List all message VPNs on the broker.
pub async fn list_msg_vpns(client: &SempClient, query: &ListQuery) -> SempResult<Vec<Value>> {
    get_collection(client, &["msgVpns"], query).await
}

// ─── Tests ──────────────────────────────────────────────────────────
