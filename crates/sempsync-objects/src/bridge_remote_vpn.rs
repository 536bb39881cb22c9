//! Remote message-VPN endpoints of a bridge.
//!
//! Doubly compound addressing: the parent bridge is
//! `bridgeName,bridgeVirtualRouter` and the remote VPN instance is
//! `remoteMsgVpnName,remoteMsgVpnLocation,remoteMsgVpnInterface` — the
//! trailing interface part may be empty, but its comma is always present.

use serde_json::{json, Value};

use sempsync_core::paging::{get_collection, ListQuery};
use sempsync_core::paths::join_instance_id;
use sempsync_core::reconcile::{ResourceDescriptor, ResourceOps};
use sempsync_core::types::Settings;
use sempsync_core::{SempClient, SempResult};

use crate::SEMP_V2_CONFIG;

pub const DESCRIPTOR: ResourceDescriptor = ResourceDescriptor::new("remoteMsgVpnName");

pub struct BridgeRemoteVpnTask<'a> {
    client: &'a SempClient,
    msg_vpn: String,
    bridge_name: String,
    remote_vpn: String,
    remote_vpn_location: String,
    remote_vpn_interface: Option<String>,
    bridge_id: String,
    instance_id: String,
}

impl<'a> BridgeRemoteVpnTask<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        client: &'a SempClient,
        msg_vpn: impl Into<String>,
        bridge_name: impl Into<String>,
        bridge_virtual_router: impl Into<String>,
        remote_vpn: impl Into<String>,
        remote_vpn_location: impl Into<String>,
        remote_vpn_interface: Option<String>,
    ) -> Self {
        let bridge_name = bridge_name.into();
        let bridge_virtual_router = bridge_virtual_router.into();
        let remote_vpn = remote_vpn.into();
        let remote_vpn_location = remote_vpn_location.into();
        let bridge_id = join_instance_id(&[&bridge_name, &bridge_virtual_router]);
        let instance_id = format!(
            "{},{}",
            join_instance_id(&[&remote_vpn, &remote_vpn_location]),
            remote_vpn_interface.as_deref().unwrap_or("")
        );
        Self {
            client,
            msg_vpn: msg_vpn.into(),
            bridge_name,
            remote_vpn,
            remote_vpn_location,
            remote_vpn_interface,
            bridge_id,
            instance_id,
        }
    }

    fn collection_segments(&self) -> Vec<&str> {
        vec![
            SEMP_V2_CONFIG,
            "msgVpns",
            &self.msg_vpn,
            "bridges",
            &self.bridge_id,
            "remoteMsgVpns",
        ]
    }

    fn instance_segments(&self) -> Vec<&str> {
        let mut segments = self.collection_segments();
        segments.push(&self.instance_id);
        segments
    }
}

impl ResourceOps for BridgeRemoteVpnTask<'_> {
    fn descriptor(&self) -> &ResourceDescriptor {
        &DESCRIPTOR
    }

    fn mandatory_fields(&self) -> Settings {
        let mut fields = Settings::new();
        fields.insert("bridgeName".into(), json!(self.bridge_name));
        fields.insert("remoteMsgVpnName".into(), json!(self.remote_vpn));
        fields
    }

    fn create_defaults(&self) -> Settings {
        let mut defaults = Settings::new();
        defaults.insert("msgVpnName".into(), json!(self.msg_vpn));
        defaults.insert(
            "remoteMsgVpnLocation".into(),
            json!(self.remote_vpn_location),
        );
        if let Some(interface) = &self.remote_vpn_interface {
            defaults.insert("remoteMsgVpnInterface".into(), json!(interface));
        }
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

/// List the remote VPNs configured on a bridge.
pub async fn list_bridge_remote_vpns(
    client: &SempClient,
    msg_vpn: &str,
    bridge_name: &str,
    bridge_virtual_router: &str,
    query: &ListQuery,
) -> SempResult<Vec<Value>> {
    let bridge_id = join_instance_id(&[bridge_name, bridge_virtual_router]);
    get_collection(
        client,
        &["msgVpns", msg_vpn, "bridges", &bridge_id, "remoteMsgVpns"],
        query,
    )
    .await
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
    fn interface_part_keeps_trailing_comma_when_absent() {
        let c = client();
        let task = BridgeRemoteVpnTask::new(&c, "v", "b1", "primary", "remote_v", "192.168.0.34:55555", None);
        let path = compose_path(&task.instance_segments()).unwrap();
        assert!(path.ends_with("/bridges/b1,primary/remoteMsgVpns/remote_v,192.168.0.34:55555,"));
    }

    #[test]
    fn interface_part_present() {
        let c = client();
        let task = BridgeRemoteVpnTask::new(
            &c,
            "v",
            "b1",
            "primary",
            "remote_v",
            "v:routername",
            Some("1/1/1".into()),
        );
        let path = compose_path(&task.instance_segments()).unwrap();
        // the interface's own slashes are encoded with the whole segment
        assert!(path.ends_with("/remoteMsgVpns/remote_v,v:routername,1%2F1%2F1"));
    }

    #[test]
    fn create_fields() {
        let c = client();
        let task = BridgeRemoteVpnTask::new(&c, "v", "b1", "auto", "remote_v", "loc", None);
        let defaults = task.create_defaults();
        assert_eq!(defaults["remoteMsgVpnLocation"], json!("loc"));
        assert!(!defaults.contains_key("remoteMsgVpnInterface"));
        let mandatory = task.mandatory_fields();
        assert_eq!(mandatory["bridgeName"], json!("b1"));
        assert_eq!(mandatory["remoteMsgVpnName"], json!("remote_v"));
    }
}
