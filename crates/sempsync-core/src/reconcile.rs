//! The idempotent reconciliation engine.
//!
//! One pass: fetch current state, decide create / update / delete / no-op
//! against the desired state, compute the minimal change-set, and apply it —
//! unless dry-run is requested, in which case the intended change is
//! computed and reported but no mutating call is made.
//!
//! Every resource plugs in through [`ResourceOps`]: a static descriptor
//! (lookup key, write-only whitelist, required-together groups) plus the four
//! remote operations. The engine owns every decision; the per-resource
//! implementations stay declarative.

use serde_json::{json, Value};

use crate::coerce::{coerce_broker, merge_maps};
use crate::error::{SempError, SempResult};
use crate::types::{ReconcileResult, Settings};

/// Fields every resource accepts on write but never returns on read.
pub const DEFAULT_WHITELIST_KEYS: &[&str] = &["password"];

/// Static description of a resource kind.
#[derive(Debug, Clone, Copy)]
pub struct ResourceDescriptor {
    /// Field uniquely identifying an instance within its parent scope.
    pub lookup_key: &'static str,
    /// Additional write-only fields, on top of [`DEFAULT_WHITELIST_KEYS`].
    pub whitelist_keys: &'static [&'static str],
    /// Field groups that must be supplied as a unit when any member changes.
    pub required_together: &'static [&'static [&'static str]],
}

impl ResourceDescriptor {
    pub const fn new(lookup_key: &'static str) -> Self {
        Self {
            lookup_key,
            whitelist_keys: &[],
            required_together: &[],
        }
    }

    pub fn is_whitelisted(&self, key: &str) -> bool {
        DEFAULT_WHITELIST_KEYS.contains(&key) || self.whitelist_keys.contains(&key)
    }
}

/// Desired presence of the resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetState {
    Present,
    Absent,
}

/// Capability set a resource hands to the engine: the descriptor plus the
/// four remote operations. `mandatory_fields` carries the lookup key and
/// scope identifiers and always wins the create merge; `create_defaults` are
/// injected only where the caller supplied nothing.
#[allow(async_fn_in_trait)]
pub trait ResourceOps {
    fn descriptor(&self) -> &ResourceDescriptor;

    fn mandatory_fields(&self) -> Settings;

    fn create_defaults(&self) -> Settings {
        Settings::new()
    }

    async fn fetch(&self) -> SempResult<Option<Settings>>;

    async fn create(&self, data: &Settings) -> SempResult<Value>;

    async fn update(&self, delta: &Settings) -> SempResult<Value>;

    async fn delete(&self) -> SempResult<Value>;
}

/// Run one reconciliation pass.
///
/// Transport failures abort the pass and surface verbatim. Validation
/// failures (unknown keys, partially supplied required-together groups) are
/// detected before any mutating call. Under `dry_run`, `changed` and `delta`
/// are reported exactly as a live run would report them.
pub async fn reconcile<O: ResourceOps>(
    ops: &O,
    target: TargetState,
    settings: Option<&Settings>,
    dry_run: bool,
) -> SempResult<ReconcileResult> {
    let mut desired = settings.cloned().unwrap_or_default();
    coerce_broker(&mut desired);

    let current = ops.fetch().await?;

    match (current, target) {
        (None, TargetState::Absent) => Ok(ReconcileResult::unchanged(json!({}))),

        (None, TargetState::Present) => {
            let data = merge_maps(&[&ops.create_defaults(), &desired, &ops.mandatory_fields()]);
            let response = if dry_run {
                json!({})
            } else {
                ops.create(&data).await?
            };
            Ok(ReconcileResult::changed(response))
        }

        (Some(_), TargetState::Absent) => {
            if !dry_run {
                ops.delete().await?;
            }
            Ok(ReconcileResult::changed(json!({})))
        }

        (Some(current), TargetState::Present) => {
            if desired.is_empty() {
                return Ok(ReconcileResult::unchanged(Value::Object(current)));
            }
            diff_and_update(ops, &current, &desired, dry_run).await
        }
    }
}

async fn diff_and_update<O: ResourceOps>(
    ops: &O,
    current: &Settings,
    desired: &Settings,
    dry_run: bool,
) -> SempResult<ReconcileResult> {
    let descriptor = ops.descriptor();

    let supplied_whitelisted: Vec<String> = desired
        .keys()
        .filter(|k| descriptor.is_whitelisted(k))
        .cloned()
        .collect();

    // Unknown keys fail the whole pass before any mutation.
    let bad_keys: Vec<String> = desired
        .keys()
        .filter(|k| !current.contains_key(*k) && !descriptor.is_whitelisted(k))
        .cloned()
        .collect();
    if !bad_keys.is_empty() {
        let valid_keys: Vec<&String> = current.keys().chain(supplied_whitelisted.iter()).collect();
        return Err(SempError::invalid_keys(
            "invalid key(s) found in settings",
            json!({
                "invalid_keys": bad_keys.join(", "),
                "hint": [
                    "possible causes:",
                    "- wrong spelling or wrong key: check the SEMP v2 reference documentation",
                    "- the resource whitelist is out of date",
                ],
                "valid_keys": valid_keys,
            }),
        ));
    }

    // Keys whose coerced values differ from current state. Whitelisted keys
    // count as changed whenever supplied: their remote value is unknowable.
    let mut changed_keys: Vec<String> = desired
        .iter()
        .filter(|(k, v)| current.get(*k).map(|cur| cur != *v).unwrap_or(false))
        .map(|(k, _)| k.clone())
        .collect();
    for key in supplied_whitelisted {
        push_key_once(&mut changed_keys, key);
    }

    // Pull in whole required-together groups touched by any changed key.
    for group in descriptor.required_together {
        if changed_keys.iter().any(|k| group.contains(&k.as_str())) {
            for member in *group {
                push_key_once(&mut changed_keys, (*member).to_string());
            }
        }
    }

    // Cross-field groups must be supplied atomically by the caller.
    let missing_keys: Vec<&String> = changed_keys
        .iter()
        .filter(|k| !desired.contains_key(*k))
        .collect();
    if !missing_keys.is_empty() {
        let names: Vec<&str> = missing_keys.iter().map(|s| s.as_str()).collect();
        return Err(SempError::missing_keys(format!(
            "missing key(s) in settings: {}",
            names.join(", ")
        )));
    }

    if changed_keys.is_empty() {
        return Ok(ReconcileResult::unchanged(Value::Object(current.clone())));
    }

    let mut delta = Settings::new();
    for key in &changed_keys {
        if let Some(v) = desired.get(key) {
            delta.insert(key.clone(), v.clone());
        }
    }

    let response = if dry_run {
        json!({})
    } else {
        ops.update(&delta).await?
    };

    Ok(ReconcileResult {
        changed: true,
        response,
        delta: Some(delta),
    })
}

fn push_key_once(keys: &mut Vec<String>, key: String) {
    if !keys.contains(&key) {
        keys.push(key);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
