//! Hosted-cloud service lifecycle.
//!
//! The service record itself is a reconcilable resource on the cloud
//! account: create provisions a service, update adjusts it, delete tears it
//! down. Provisioning is long-running, so mutations typically come back 202
//! and ride the transport's completion waiter.

use serde_json::{json, Value};

use sempsync_core::coerce::stringify_cloud;
use sempsync_core::reconcile::{ResourceDescriptor, ResourceOps};
use sempsync_core::types::Settings;
use sempsync_core::{CloudClient, SempResult};

pub const DESCRIPTOR: ResourceDescriptor = ResourceDescriptor::new("name");

pub struct CloudServiceTask<'a> {
    client: &'a CloudClient,
    name: String,
}

impl<'a> CloudServiceTask<'a> {
    pub fn new(client: &'a CloudClient, name: impl Into<String>) -> Self {
        Self {
            client,
            name: name.into(),
        }
    }

    fn instance_url(&self) -> SempResult<String> {
        // the client is already scoped to one service id
        self.client
            .services_url(&[self.client.config().service_id.as_str()])
    }
}

impl ResourceOps for CloudServiceTask<'_> {
    fn descriptor(&self) -> &ResourceDescriptor {
        &DESCRIPTOR
    }

    fn mandatory_fields(&self) -> Settings {
        let mut fields = Settings::new();
        fields.insert("name".into(), json!(self.name));
        fields
    }

    async fn fetch(&self) -> SempResult<Option<Settings>> {
        let url = self.instance_url()?;
        self.client.get_config(&url, DESCRIPTOR.lookup_key).await
    }

    async fn create(&self, data: &Settings) -> SempResult<Value> {
        // the provisioning API takes every scalar as a string
        let mut data = data.clone();
        stringify_cloud(&mut data);
        let url = self.client.services_url(&[])?;
        self.client.post(&url, &Value::Object(data)).await
    }

    async fn update(&self, delta: &Settings) -> SempResult<Value> {
        let mut delta = delta.clone();
        stringify_cloud(&mut delta);
        let url = self.instance_url()?;
        self.client.patch(&url, &Value::Object(delta)).await
    }

    async fn delete(&self) -> SempResult<Value> {
        let url = self.instance_url()?;
        self.client.delete(&url).await
    }
}

/// Read one service record (`None` when the id is unknown).
pub async fn get_cloud_service(client: &CloudClient) -> SempResult<Option<Settings>> {
    let url = client.services_url(&[client.config().service_id.as_str()])?;
    client.get_config(&url, "serviceId").await
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use sempsync_core::CloudConfig;

    #[test]
    fn instance_url_targets_the_service_id() {
        let c = CloudClient::new(CloudConfig::new("tok", "svc-1")).unwrap();
        let task = CloudServiceTask::new(&c, "my-service");
        assert_eq!(
            task.instance_url().unwrap(),
            "https://api.solace.cloud/api/v0/services/svc-1"
        );
        assert_eq!(task.mandatory_fields()["name"], json!("my-service"));
    }
}
