//! # SempSync — broker resource declarations
//!
//! One module per manageable resource kind. Each module declares the
//! resource's descriptor (lookup key, write-only whitelist, required-together
//! groups), its URL layout and create-time fields, and a task struct
//! implementing [`sempsync_core::ResourceOps`] so the shared engine can drive
//! it:
//!
//! ```no_run
//! use sempsync_core::{reconcile, BrokerConfig, SempClient, TargetState};
//! use sempsync_objects::queue::QueueTask;
//!
//! # async fn demo() -> sempsync_core::SempResult<()> {
//! let client = SempClient::new(BrokerConfig::new("localhost", 8080, "admin", "admin"))?;
//! let task = QueueTask::new(&client, "default", "orders");
//! let outcome = reconcile(&task, TargetState::Present, None, false).await?;
//! assert!(outcome.changed);
//! # Ok(())
//! # }
//! ```
//!
//! Read-only operations (fact gathering, collection listings) live next to
//! the resource they describe; the legacy-XML reads are in [`facts`].

pub mod bridge;
pub mod bridge_remote_subscription;
pub mod bridge_remote_vpn;
pub mod cert_authority;
pub mod client_profile;
pub mod client_username;
pub mod cloud_service;
pub mod dmr_cluster;
pub mod facts;
pub mod mqtt_session;
pub mod mqtt_session_subscription;
pub mod msg_vpn;
pub mod queue;
pub mod queue_subscription;

pub(crate) const SEMP_V2_CONFIG: &str = sempsync_core::types::SEMP_V2_CONFIG;
