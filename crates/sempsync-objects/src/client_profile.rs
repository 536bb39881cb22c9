//! Client profiles — the one resource managed through either backend.
//!
//! On a self-hosted broker this is plain SEMP-v2 CRUD. On a hosted service
//! every mutation is wrapped in an operation body and POSTed to the
//! `requests/clientProfileRequests` endpoint, which answers 202 and is
//! polled to completion by the transport.

use serde_json::{json, Value};

use sempsync_core::cloud::operation_body;
use sempsync_core::coerce::merge_maps;
use sempsync_core::paging::{get_collection, ListQuery};
use sempsync_core::reconcile::{ResourceDescriptor, ResourceOps};
use sempsync_core::types::Settings;
use sempsync_core::{CloudClient, SempClient, SempResult};

use crate::SEMP_V2_CONFIG;

pub const DESCRIPTOR: ResourceDescriptor = ResourceDescriptor::new("clientProfileName");

/// The hosted API rejects profile requests that leave these toggles
/// unspecified, so create/update bodies always carry them.
fn cloud_defaults() -> Settings {
    let defaults = json!({
        "allowTransactedSessionsEnabled": false,
        "allowBridgeConnectionsEnabled": false,
        "allowGuaranteedEndpointCreateEnabled": false,
        "allowSharedSubscriptionsEnabled": false,
        "allowGuaranteedMsgSendEnabled": false,
        "allowGuaranteedMsgReceiveEnabled": false,
    });
    defaults.as_object().unwrap().clone()
}

/// Which backend manages the profile.
#[derive(Clone, Copy)]
pub enum ProfileBackend<'a> {
    Direct(&'a SempClient),
    Cloud(&'a CloudClient),
}

pub struct ClientProfileTask<'a> {
    backend: ProfileBackend<'a>,
    msg_vpn: String,
    name: String,
}

impl<'a> ClientProfileTask<'a> {
    pub fn direct(
        client: &'a SempClient,
        msg_vpn: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            backend: ProfileBackend::Direct(client),
            msg_vpn: msg_vpn.into(),
            name: name.into(),
        }
    }

    /// Hosted services scope profiles by service id, not VPN.
    pub fn cloud(client: &'a CloudClient, name: impl Into<String>) -> Self {
        Self {
            backend: ProfileBackend::Cloud(client),
            msg_vpn: String::new(),
            name: name.into(),
        }
    }

    fn collection_segments(&self) -> Vec<&str> {
        vec![SEMP_V2_CONFIG, "msgVpns", &self.msg_vpn, "clientProfiles"]
    }

    fn instance_segments(&self) -> Vec<&str> {
        let mut segments = self.collection_segments();
        segments.push(&self.name);
        segments
    }

    async fn post_cloud_request(&self, client: &CloudClient, body: &Value) -> SempResult<Value> {
        let url = client.service_url(&["requests", "clientProfileRequests"])?;
        client.post(&url, body).await
    }
}

impl ResourceOps for ClientProfileTask<'_> {
    fn descriptor(&self) -> &ResourceDescriptor {
        &DESCRIPTOR
    }

    fn mandatory_fields(&self) -> Settings {
        let mut fields = Settings::new();
        fields.insert("clientProfileName".into(), json!(self.name));
        fields
    }

    fn create_defaults(&self) -> Settings {
        match self.backend {
            ProfileBackend::Direct(_) => Settings::new(),
            ProfileBackend::Cloud(_) => cloud_defaults(),
        }
    }

    async fn fetch(&self) -> SempResult<Option<Settings>> {
        match self.backend {
            ProfileBackend::Direct(client) => {
                client
                    .get_config(&self.instance_segments(), DESCRIPTOR.lookup_key)
                    .await
            }
            ProfileBackend::Cloud(client) => {
                let url = client.service_url(&["clientProfiles", &self.name])?;
                client.get_config(&url, DESCRIPTOR.lookup_key).await
            }
        }
    }

    async fn create(&self, data: &Settings) -> SempResult<Value> {
        match self.backend {
            ProfileBackend::Direct(client) => {
                client
                    .post(&self.collection_segments(), &Value::Object(data.clone()))
                    .await
            }
            ProfileBackend::Cloud(client) => {
                let body = operation_body("create", "clientProfile", data);
                self.post_cloud_request(client, &body).await
            }
        }
    }

    async fn update(&self, delta: &Settings) -> SempResult<Value> {
        match self.backend {
            ProfileBackend::Direct(client) => {
                client
                    .patch(&self.instance_segments(), &Value::Object(delta.clone()))
                    .await
            }
            ProfileBackend::Cloud(client) => {
                let data = merge_maps(&[&cloud_defaults(), &self.mandatory_fields(), delta]);
                let body = operation_body("update", "clientProfile", &data);
                self.post_cloud_request(client, &body).await
            }
        }
    }

    async fn delete(&self) -> SempResult<Value> {
        match self.backend {
            ProfileBackend::Direct(client) => client.delete(&self.instance_segments()).await,
            ProfileBackend::Cloud(client) => {
                let body = operation_body("delete", "clientProfile", &self.mandatory_fields());
                self.post_cloud_request(client, &body).await
            }
        }
    }
}

/// List client profiles on a VPN (direct backend).
pub async fn list_client_profiles(
    client: &SempClient,
    msg_vpn: &str,
    query: &ListQuery,
) -> SempResult<Vec<Value>> {
    get_collection(client, &["msgVpns", msg_vpn, "clientProfiles"], query).await
}

// ─── Tests ──────────────────────────────────────────────────────────
