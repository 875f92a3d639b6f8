use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, NaiveTime, Utc};
use serde_json::Value;
use upgrades_core_types::{AddonId, HostError, MaintenanceWindow};

use crate::errors::PolicyError;
use crate::model::{PolicySnapshot, PolicySource};

/// Read side of the host's upgrade configuration.
pub trait UpgradeSettings {
    /// Window applying at `reference`.
    fn maintenance_window(&self, reference: DateTime<Utc>)
        -> Result<MaintenanceWindow, HostError>;
    fn allowed_addon_ids(&self) -> Result<BTreeSet<AddonId>, HostError>;
    fn blocked_addon_ids(&self) -> Result<BTreeSet<AddonId>, HostError>;
}

impl<S> UpgradeSettings for Arc<S>
where
    S: UpgradeSettings + ?Sized,
{
    fn maintenance_window(
        &self,
        reference: DateTime<Utc>,
    ) -> Result<MaintenanceWindow, HostError> {
        (**self).maintenance_window(reference)
    }

    fn allowed_addon_ids(&self) -> Result<BTreeSet<AddonId>, HostError> {
        (**self).allowed_addon_ids()
    }

    fn blocked_addon_ids(&self) -> Result<BTreeSet<AddonId>, HostError> {
        (**self).blocked_addon_ids()
    }
}

/// Settings backed by an immutable, fully layered snapshot.
#[derive(Clone, Debug)]
pub struct SnapshotSettings {
    snapshot: Arc<PolicySnapshot>,
}

impl SnapshotSettings {
    pub fn new(snapshot: PolicySnapshot) -> Self {
        Self {
            snapshot: Arc::new(snapshot),
        }
    }

    pub fn revision(&self) -> u64 {
        self.snapshot.rev
    }
}

impl UpgradeSettings for SnapshotSettings {
    fn maintenance_window(
        &self,
        reference: DateTime<Utc>,
    ) -> Result<MaintenanceWindow, HostError> {
        Ok(self.snapshot.window.resolve(reference)?)
    }

    fn allowed_addon_ids(&self) -> Result<BTreeSet<AddonId>, HostError> {
        Ok(self.snapshot.upgrade_policy().allowed)
    }

    fn blocked_addon_ids(&self) -> Result<BTreeSet<AddonId>, HostError> {
        Ok(self.snapshot.upgrade_policy().blocked)
    }
}

/// Applies one dotted-path value; returns whether the snapshot changed.
pub(crate) fn apply_override_to_snapshot(
    snapshot: &mut PolicySnapshot,
    path: &str,
    value: &Value,
    source: PolicySource,
) -> Result<bool, PolicyError> {
    let changed = match path {
        "window.start" => merge(&mut snapshot.window.start, to_time(value)?),
        "window.end" => merge(&mut snapshot.window.end, to_time(value)?),
        "window.utc_offset_minutes" => {
            merge(&mut snapshot.window.utc_offset_minutes, to_i32(value)?)
        }
        "addons.allowed" => merge(&mut snapshot.addons.allowed, to_id_list(value)?),
        "addons.blocked" => merge(&mut snapshot.addons.blocked, to_id_list(value)?),
        path => return Err(PolicyError::UnsupportedPath(path.to_string())),
    };
    if changed {
        record_provenance(snapshot, path, source);
    }
    Ok(changed)
}

fn merge<T: PartialEq>(target: &mut T, candidate: T) -> bool {
    if *target == candidate {
        return false;
    }
    *target = candidate;
    true
}

fn record_provenance(snapshot: &mut PolicySnapshot, path: &str, source: PolicySource) {
    snapshot.set_provenance(path, source);
}

fn to_time(value: &Value) -> Result<NaiveTime, PolicyError> {
    let raw = value
        .as_str()
        .ok_or_else(|| PolicyError::InvalidValue(format!("expected HH:MM, got {value}")))?;
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .map_err(|_| PolicyError::InvalidValue(format!("expected HH:MM, got {value}")))
}

fn to_i32(value: &Value) -> Result<i32, PolicyError> {
    value
        .as_i64()
        .ok_or_else(|| PolicyError::InvalidValue(format!("expected integer, got {value}")))
        .and_then(|v| {
            i32::try_from(v).map_err(|_| PolicyError::InvalidValue(format!("value {v} exceeds i32")))
        })
}

/// Accepts a JSON array or a comma-separated string. Ids are opaque, so numeric
/// and boolean scalars are taken by their textual form.
fn to_id_list(value: &Value) -> Result<Vec<String>, PolicyError> {
    let ids = match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                scalar_id(item).ok_or_else(|| {
                    PolicyError::InvalidValue(format!("expected add-on id, got {item}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?,
        Value::String(raw) => raw.split(',').map(str::to_string).collect(),
        Value::Number(_) | Value::Bool(_) => vec![value.to_string()],
        Value::Object(_) => {
            return Err(PolicyError::InvalidValue(format!(
                "expected list of add-on ids, got {value}"
            )))
        }
    };
    Ok(ids
        .into_iter()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect())
}

fn scalar_id(value: &Value) -> Option<String> {
    match value {
        Value::String(raw) => Some(raw.clone()),
        Value::Number(_) | Value::Bool(_) => Some(value.to_string()),
        _ => None,
    }
}
