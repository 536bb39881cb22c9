//! # SempSync — core
//!
//! Idempotent reconciliation engine for SEMP-style broker management APIs.
//!
//! One reconciliation pass takes a desired-state declaration, fetches the
//! resource's current configuration, diffs the two, and issues the single
//! create / update / delete call needed to converge — or none at all. A
//! dry-run mode computes and reports the intended change without mutating
//! anything.
//!
//! Two backends share the engine:
//!
//! - **Direct** ([`client::SempClient`]) — a self-hosted broker reachable at
//!   host:port, basic auth, JSON `{"data": ...}` envelopes, synchronous
//!   semantics.
//! - **Cloud** ([`cloud::CloudClient`]) — the hosted variant behind a fixed
//!   public endpoint, bearer-token auth, mutations wrapped in `operation`
//!   bodies, long-running requests answered with 202 and polled to
//!   completion.
//!
//! Per-resource declarations (lookup keys, URL layouts, write-only field
//! whitelists, required-together groups) live in the companion objects crate
//! and plug in through [`reconcile::ResourceOps`].

pub mod client;
pub mod cloud;
pub mod coerce;
pub mod error;
pub mod paging;
pub mod paths;
pub mod reconcile;
pub mod rpc;
pub mod types;

pub use client::SempClient;
pub use cloud::CloudClient;
pub use error::{SempError, SempErrorKind, SempResult};
pub use reconcile::{reconcile, ResourceDescriptor, ResourceOps, TargetState};
pub use types::{BrokerConfig, CloudConfig, ReconcileResult, Settings};
