//! DMR clusters (broker-scoped, not VPN-scoped).
//!
//! The cluster's authentication secrets are write-only, and a client-cert
//! password can only be changed together with the cert content it unlocks.

use serde_json::{json, Value};

use sempsync_core::paging::{get_collection, ListQuery};
use sempsync_core::reconcile::{ResourceDescriptor, ResourceOps};
use sempsync_core::types::Settings;
use sempsync_core::{SempClient, SempResult};

use crate::SEMP_V2_CONFIG;

pub const DESCRIPTOR: ResourceDescriptor = ResourceDescriptor {
    lookup_key: "dmrClusterName",
    whitelist_keys: &[
        "authenticationBasicPassword",
        "authenticationClientCertPassword",
    ],
    required_together: &[&[
        "authenticationClientCertPassword",
        "authenticationClientCertContent",
    ]],
};

pub struct DmrClusterTask<'a> {
    client: &'a SempClient,
    name: String,
}

impl<'a> DmrClusterTask<'a> {
    pub fn new(client: &'a SempClient, name: impl Into<String>) -> Self {
        Self {
            client,
            name: name.into(),
        }
    }

    fn collection_segments(&self) -> Vec<&str> {
        vec![SEMP_V2_CONFIG, "dmrClusters"]
    }

    fn instance_segments(&self) -> Vec<&str> {
        vec![SEMP_V2_CONFIG, "dmrClusters", &self.name]
    }
}

impl ResourceOps for DmrClusterTask<'_> {
    fn descriptor(&self) -> &ResourceDescriptor {
        &DESCRIPTOR
    }

    fn mandatory_fields(&self) -> Settings {
        let mut fields = Settings::new();
        fields.insert("dmrClusterName".into(), json!(self.name));
        fields
    }

    fn create_defaults(&self) -> Settings {
        let mut defaults = Settings::new();
        defaults.insert("enabled".into(), json!(true));
        defaults.insert(
            "authenticationBasicPassword".into(),
            json!(self.client.config().password),
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

/// List DMR clusters on the broker.
pub async fn list_dmr_clusters(client: &SempClient, query: &ListQuery) -> SempResult<Vec<Value>> {
    get_collection(client, &["dmrClusters"], query).await
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use sempsync_core::BrokerConfig;

    #[test]
    fn secrets_are_whitelisted() {
        assert!(DESCRIPTOR.is_whitelisted("authenticationBasicPassword"));
        assert!(DESCRIPTOR.is_whitelisted("authenticationClientCertPassword"));
        assert!(!DESCRIPTOR.is_whitelisted("authenticationClientCertContent"));
    }

    #[test]
    fn cert_password_travels_with_content() {
        assert_eq!(DESCRIPTOR.required_together.len(), 1);
        assert_eq!(
            DESCRIPTOR.required_together[0].to_vec(),
            vec![
                "authenticationClientCertPassword",
                "authenticationClientCertContent"
            ]
        );
    }

    #[test]
    fn create_defaults_seed_link_password() {
        let c = SempClient::new(BrokerConfig::new("localhost", 8080, "admin", "s3cret")).unwrap();
        let task = DmrClusterTask::new(&c, "cluster_1");
        let defaults = task.create_defaults();
        assert_eq!(defaults["enabled"], json!(true));
        assert_eq!(defaults["authenticationBasicPassword"], json!("s3cret"));
    }
}
