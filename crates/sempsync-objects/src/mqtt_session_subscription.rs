//! Topic subscriptions of an MQTT session.

use serde_json::{json, Value};

use sempsync_core::paging::{get_collection, ListQuery};
use sempsync_core::paths::join_instance_id;
use sempsync_core::reconcile::{ResourceDescriptor, ResourceOps};
use sempsync_core::types::Settings;
use sempsync_core::{SempClient, SempResult};

use crate::SEMP_V2_CONFIG;

pub const DESCRIPTOR: ResourceDescriptor = ResourceDescriptor::new("subscriptionTopic");

pub struct MqttSessionSubscriptionTask<'a> {
    client: &'a SempClient,
    msg_vpn: String,
    topic: String,
    session_id: String,
}

impl<'a> MqttSessionSubscriptionTask<'a> {
    pub fn new(
        client: &'a SempClient,
        msg_vpn: impl Into<String>,
        mqtt_session_client_id: impl Into<String>,
        virtual_router: impl Into<String>,
        topic: impl Into<String>,
    ) -> Self {
        let client_id = mqtt_session_client_id.into();
        let virtual_router = virtual_router.into();
        let session_id = join_instance_id(&[&client_id, &virtual_router]);
        Self {
            client,
            msg_vpn: msg_vpn.into(),
            topic: topic.into(),
            session_id,
        }
    }

    fn collection_segments(&self) -> Vec<&str> {
        vec![
            SEMP_V2_CONFIG,
            "msgVpns",
            &self.msg_vpn,
            "mqttSessions",
            &self.session_id,
            "subscriptions",
        ]
    }

    fn instance_segments(&self) -> Vec<&str> {
        let mut segments = self.collection_segments();
        segments.push(&self.topic);
        segments
    }
}

impl ResourceOps for MqttSessionSubscriptionTask<'_> {
    fn descriptor(&self) -> &ResourceDescriptor {
        &DESCRIPTOR
    }

    fn mandatory_fields(&self) -> Settings {
        let mut fields = Settings::new();
        fields.insert("subscriptionTopic".into(), json!(self.topic));
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

/// List the subscriptions of an MQTT session.
pub async fn list_mqtt_session_subscriptions(
    client: &SempClient,
    msg_vpn: &str,
    mqtt_session_client_id: &str,
    virtual_router: &str,
    query: &ListQuery,
) -> SempResult<Vec<Value>> {
    let session_id = join_instance_id(&[mqtt_session_client_id, virtual_router]);
    get_collection(
        client,
        &[
            "msgVpns",
            msg_vpn,
            "mqttSessions",
            &session_id,
            "subscriptions",
        ],
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

    #[test]
    fn subscription_nests_under_compound_session_uri() {
        let c = SempClient::new(BrokerConfig::new("localhost", 8080, "admin", "admin")).unwrap();
        let task =
            MqttSessionSubscriptionTask::new(&c, "default", "sensor_17", "primary", "telemetry/+/cpu");
        let path = compose_path(&task.instance_segments()).unwrap();
        assert!(path.ends_with("/mqttSessions/sensor_17,primary/subscriptions/telemetry%2F+%2Fcpu"));
    }
}
