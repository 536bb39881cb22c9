//! Topic subscriptions on a queue.

use serde_json::{json, Value};

use sempsync_core::paging::{get_collection, ListQuery};
use sempsync_core::reconcile::{ResourceDescriptor, ResourceOps};
use sempsync_core::types::Settings;
use sempsync_core::{SempClient, SempResult};

use crate::SEMP_V2_CONFIG;

pub const DESCRIPTOR: ResourceDescriptor = ResourceDescriptor::new("subscriptionTopic");

/// One topic subscription on a queue. Topic strings routinely contain `/`;
/// the transport keeps them inside a single path segment.
pub struct QueueSubscriptionTask<'a> {
    client: &'a SempClient,
    msg_vpn: String,
    queue: String,
    topic: String,
}

impl<'a> QueueSubscriptionTask<'a> {
    pub fn new(
        client: &'a SempClient,
        msg_vpn: impl Into<String>,
        queue: impl Into<String>,
        topic: impl Into<String>,
    ) -> Self {
        Self {
            client,
            msg_vpn: msg_vpn.into(),
            queue: queue.into(),
            topic: topic.into(),
        }
    }

    fn collection_segments(&self) -> Vec<&str> {
        vec![
            SEMP_V2_CONFIG,
            "msgVpns",
            &self.msg_vpn,
            "queues",
            &self.queue,
            "subscriptions",
        ]
    }

    fn instance_segments(&self) -> Vec<&str> {
        let mut segments = self.collection_segments();
        segments.push(&self.topic);
        segments
    }
}

impl ResourceOps for QueueSubscriptionTask<'_> {
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

/// List the subscriptions configured on a queue.
pub async fn list_queue_subscriptions(
    client: &SempClient,
    msg_vpn: &str,
    queue: &str,
    query: &ListQuery,
) -> SempResult<Vec<Value>> {
    get_collection(
        client,
        &["msgVpns", msg_vpn, "queues", queue, "subscriptions"],
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
    fn topic_slashes_stay_in_one_segment() {
        let c = SempClient::new(BrokerConfig::new("localhost", 8080, "admin", "admin")).unwrap();
        let task = QueueSubscriptionTask::new(&c, "default", "orders", "orders/eu/*");
        let path = compose_path(&task.instance_segments()).unwrap();
        assert_eq!(
            path,
            "/SEMP/v2/config/msgVpns/default/queues/orders/subscriptions/orders%2Feu%2F*"
        );
    }
}
