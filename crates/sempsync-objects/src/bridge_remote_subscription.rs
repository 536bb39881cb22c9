//! Remote subscriptions of a bridge.

use serde_json::{json, Value};

use sempsync_core::paging::{get_collection, ListQuery};
use sempsync_core::paths::join_instance_id;
use sempsync_core::reconcile::{ResourceDescriptor, ResourceOps};
use sempsync_core::types::Settings;
use sempsync_core::{SempClient, SempResult};

use crate::SEMP_V2_CONFIG;

pub const DESCRIPTOR: ResourceDescriptor = ResourceDescriptor::new("remoteSubscriptionTopic");

pub struct BridgeRemoteSubscriptionTask<'a> {
    client: &'a SempClient,
    msg_vpn: String,
    bridge_name: String,
    bridge_virtual_router: String,
    topic: String,
    bridge_id: String,
}

impl<'a> BridgeRemoteSubscriptionTask<'a> {
    pub fn new(
        client: &'a SempClient,
        msg_vpn: impl Into<String>,
        bridge_name: impl Into<String>,
        bridge_virtual_router: impl Into<String>,
        topic: impl Into<String>,
    ) -> Self {
        let bridge_name = bridge_name.into();
        let bridge_virtual_router = bridge_virtual_router.into();
        let bridge_id = join_instance_id(&[&bridge_name, &bridge_virtual_router]);
        Self {
            client,
            msg_vpn: msg_vpn.into(),
            bridge_name,
            bridge_virtual_router,
            topic: topic.into(),
            bridge_id,
        }
    }

    fn collection_segments(&self) -> Vec<&str> {
        vec![
            SEMP_V2_CONFIG,
            "msgVpns",
            &self.msg_vpn,
            "bridges",
            &self.bridge_id,
            "remoteSubscriptions",
        ]
    }

    fn instance_segments(&self) -> Vec<&str> {
        let mut segments = self.collection_segments();
        segments.push(&self.topic);
        segments
    }
}

impl ResourceOps for BridgeRemoteSubscriptionTask<'_> {
    fn descriptor(&self) -> &ResourceDescriptor {
        &DESCRIPTOR
    }

    fn mandatory_fields(&self) -> Settings {
        let mut fields = Settings::new();
        fields.insert("msgVpnName".into(), json!(self.msg_vpn));
        fields.insert("bridgeName".into(), json!(self.bridge_name));
        fields.insert(
            "bridgeVirtualRouter".into(),
            json!(self.bridge_virtual_router),
        );
        fields.insert("remoteSubscriptionTopic".into(), json!(self.topic));
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

/// List the remote subscriptions configured on a bridge.
pub async fn list_bridge_remote_subscriptions(
    client: &SempClient,
    msg_vpn: &str,
    bridge_name: &str,
    bridge_virtual_router: &str,
    query: &ListQuery,
) -> SempResult<Vec<Value>> {
    let bridge_id = join_instance_id(&[bridge_name, bridge_virtual_router]);
    get_collection(
        client,
        &[
            "msgVpns",
            msg_vpn,
            "bridges",
            &bridge_id,
            "remoteSubscriptions",
        ],
        query,
    )
    .await
}

// ─── Tests ──────────────────────────────────────────────────────────
