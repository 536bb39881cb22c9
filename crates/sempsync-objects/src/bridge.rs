//! Bridges between message VPNs.
//!
//! A bridge instance is addressed by `bridgeName,bridgeVirtualRouter` inside
//! a single path segment.

use serde_json::{json, Value};

use sempsync_core::paging::{get_collection, ListQuery};
use sempsync_core::paths::join_instance_id;
use sempsync_core::reconcile::{ResourceDescriptor, ResourceOps};
use sempsync_core::types::Settings;
use sempsync_core::{SempClient, SempResult};

use crate::SEMP_V2_CONFIG;

pub const DESCRIPTOR: ResourceDescriptor = ResourceDescriptor::new("bridgeName");

pub struct BridgeTask<'a> {
    client: &'a SempClient,
    msg_vpn: String,
    name: String,
    /// `primary`, `backup` or `auto`.
    virtual_router: String,
    instance_id: String,
}

impl<'a> BridgeTask<'a> {
    pub fn new(
        client: &'a SempClient,
        msg_vpn: impl Into<String>,
        name: impl Into<String>,
        virtual_router: impl Into<String>,
    ) -> Self {
        let name = name.into();
        let virtual_router = virtual_router.into();
        let instance_id = join_instance_id(&[&name, &virtual_router]);
        Self {
            client,
            msg_vpn: msg_vpn.into(),
            name,
            virtual_router,
            instance_id,
        }
    }

    fn collection_segments(&self) -> Vec<&str> {
        vec![SEMP_V2_CONFIG, "msgVpns", &self.msg_vpn, "bridges"]
    }

    fn instance_segments(&self) -> Vec<&str> {
        let mut segments = self.collection_segments();
        segments.push(&self.instance_id);
        segments
    }
}

impl ResourceOps for BridgeTask<'_> {
    fn descriptor(&self) -> &ResourceDescriptor {
        &DESCRIPTOR
    }

    fn mandatory_fields(&self) -> Settings {
        let mut fields = Settings::new();
        fields.insert("bridgeName".into(), json!(self.name));
        fields
    }

    fn create_defaults(&self) -> Settings {
        let mut defaults = Settings::new();
        defaults.insert("msgVpnName".into(), json!(self.msg_vpn));
        defaults.insert("bridgeVirtualRouter".into(), json!(self.virtual_router));
        defaults
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

/// List bridges on a VPN.
pub async fn list_bridges(
    client: &SempClient,
    msg_vpn: &str,
    query: &ListQuery,
) -> SempResult<Vec<Value>> {
    get_collection(client, &["msgVpns", msg_vpn, "bridges"], query).await
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use sempsync_core::paths::compose_path;
    use sempsync_core::BrokerConfig;

    fn client() -> SempClient {
        SempClient::new(BrokerConfig::new("localhost", 8080, "admin", "admin")).unwrap()
    }

    #[test]
    fn instance_uri_is_comma_compound() {
        let c = client();
        let task = BridgeTask::new(&c, "default", "bridge_1", "primary");
        let path = compose_path(&task.instance_segments()).unwrap();
        assert_eq!(
            path,
            "/SEMP/v2/config/msgVpns/default/bridges/bridge_1,primary"
        );
    }

    #[test]
    fn create_defaults_scope_the_bridge() {
        let c = client();
        let task = BridgeTask::new(&c, "default", "bridge_1", "auto");
        let defaults = task.create_defaults();
        assert_eq!(defaults["msgVpnName"], json!("default"));
        assert_eq!(defaults["bridgeVirtualRouter"], json!("auto"));
        assert_eq!(task.mandatory_fields()["bridgeName"], json!("bridge_1"));
    }
}
