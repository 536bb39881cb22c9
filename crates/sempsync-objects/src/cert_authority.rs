//! Certificate authorities (broker-scoped).

use serde_json::{json, Value};

use sempsync_core::paging::{get_collection, ListQuery};
use sempsync_core::reconcile::{ResourceDescriptor, ResourceOps};
use sempsync_core::types::Settings;
use sempsync_core::{SempClient, SempResult};

use crate::SEMP_V2_CONFIG;

pub const DESCRIPTOR: ResourceDescriptor = ResourceDescriptor::new("certAuthorityName");

pub struct CertAuthorityTask<'a> {
    client: &'a SempClient,
    name: String,
    /// PEM content installed on create; changes go through normal settings.
    cert_content: String,
}

impl<'a> CertAuthorityTask<'a> {
    pub fn new(
        client: &'a SempClient,
        name: impl Into<String>,
        cert_content: impl Into<String>,
    ) -> Self {
        Self {
            client,
            name: name.into(),
            cert_content: cert_content.into(),
        }
    }

    fn collection_segments(&self) -> Vec<&str> {
        vec![SEMP_V2_CONFIG, "certAuthorities"]
    }

    fn instance_segments(&self) -> Vec<&str> {
        vec![SEMP_V2_CONFIG, "certAuthorities", &self.name]
    }
}

impl ResourceOps for CertAuthorityTask<'_> {
    fn descriptor(&self) -> &ResourceDescriptor {
        &DESCRIPTOR
    }

    fn mandatory_fields(&self) -> Settings {
        let mut fields = Settings::new();
        fields.insert("certAuthorityName".into(), json!(self.name));
        fields
    }

    fn create_defaults(&self) -> Settings {
        let mut defaults = Settings::new();
        defaults.insert("certContent".into(), json!(self.cert_content));
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

/// List certificate authorities on the broker.
pub async fn list_cert_authorities(
    client: &SempClient,
    query: &ListQuery,
) -> SempResult<Vec<Value>> {
    get_collection(client, &["certAuthorities"], query).await
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use sempsync_core::BrokerConfig;

    #[test]
    fn cert_content_is_seeded_on_create() {
        let c = SempClient::new(BrokerConfig::new("localhost", 8080, "admin", "admin")).unwrap();
        let task = CertAuthorityTask::new(&c, "root_ca", "-----BEGIN CERTIFICATE-----");
        assert_eq!(
            task.create_defaults()["certContent"],
            json!("-----BEGIN CERTIFICATE-----")
        );
        assert_eq!(task.mandatory_fields()["certAuthorityName"], json!("root_ca"));
    }
}
