//! MQTT sessions on a message VPN.
//!
//! A session instance is addressed by `clientId,virtualRouter` inside a
//! single path segment.

use serde_json::{json, Value};

use sempsync_core::paging::{get_collection, ListQuery};
use sempsync_core::paths::join_instance_id;
use sempsync_core::reconcile::{ResourceDescriptor, ResourceOps};
use sempsync_core::types::Settings;
use sempsync_core::{SempClient, SempResult};

use crate::SEMP_V2_CONFIG;

pub const DESCRIPTOR: ResourceDescriptor = ResourceDescriptor::new("mqttSessionClientId");

pub struct MqttSessionTask<'a> {
    client: &'a SempClient,
    msg_vpn: String,
    client_id: String,
    virtual_router: String,
    instance_id: String,
}

impl<'a> MqttSessionTask<'a> {
    pub fn new(
        client: &'a SempClient,
        msg_vpn: impl Into<String>,
        client_id: impl Into<String>,
        virtual_router: impl Into<String>,
    ) -> Self {
        let client_id = client_id.into();
        let virtual_router = virtual_router.into();
        let instance_id = join_instance_id(&[&client_id, &virtual_router]);
        Self {
            client,
            msg_vpn: msg_vpn.into(),
            client_id,
            virtual_router,
            instance_id,
        }
    }

    fn collection_segments(&self) -> Vec<&str> {
        vec![SEMP_V2_CONFIG, "msgVpns", &self.msg_vpn, "mqttSessions"]
    }

    fn instance_segments(&self) -> Vec<&str> {
        let mut segments = self.collection_segments();
        segments.push(&self.instance_id);
        segments
    }
}

impl ResourceOps for MqttSessionTask<'_> {
    fn descriptor(&self) -> &ResourceDescriptor {
        &DESCRIPTOR
    }

    fn mandatory_fields(&self) -> Settings {
        let mut fields = Settings::new();
        fields.insert("mqttSessionClientId".into(), json!(self.client_id));
        fields
    }

    fn create_defaults(&self) -> Settings {
        let mut defaults = Settings::new();
        defaults.insert("msgVpnName".into(), json!(self.msg_vpn));
        defaults.insert(
            "mqttSessionVirtualRouter".into(),
            json!(self.virtual_router),
        );
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

/// List MQTT sessions on a VPN.
pub async fn list_mqtt_sessions(
    client: &SempClient,
    msg_vpn: &str,
    query: &ListQuery,
) -> SempResult<Vec<Value>> {
    get_collection(client, &["msgVpns", msg_vpn, "mqttSessions"], query).await
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use sempsync_core::paths::compose_path;
    use sempsync_core::BrokerConfig;

    #[test]
    fn session_uri_is_client_id_and_router() {
        let c = SempClient::new(BrokerConfig::new("localhost", 8080, "admin", "admin")).unwrap();
        let task = MqttSessionTask::new(&c, "default", "sensor_17", "primary");
        let path = compose_path(&task.instance_segments()).unwrap();
        assert!(path.ends_with("/mqttSessions/sensor_17,primary"));
        assert_eq!(task.create_defaults()["mqttSessionVirtualRouter"], json!("primary"));
    }
}
