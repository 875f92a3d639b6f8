use std::collections::BTreeMap;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use upgrades_core_types::UpgradePolicy;

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct PolicySnapshot {
    pub rev: u64,
    pub window: WindowSpec,
    pub addons: AddonPolicy,
    #[serde(default)]
    pub provenance: BTreeMap<String, PolicyProvenance>,
}

/// Daily maintenance window expressed as local time-of-day at a fixed UTC offset.
/// `end` earlier than `start` means the window runs past midnight.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct WindowSpec {
    pub start: NaiveTime,
    pub end: NaiveTime,
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AddonPolicy {
    #[serde(default)]
    pub allowed: Vec<String>,
    #[serde(default)]
    pub blocked: Vec<String>,
}

impl AddonPolicy {
    pub fn to_policy(&self) -> UpgradePolicy {
        UpgradePolicy::new(self.allowed.iter().cloned(), self.blocked.iter().cloned())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PolicyProvenance {
    pub path: String,
    pub source: PolicySource,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum PolicySource {
    Builtin,
    File,
    Env,
    Cli,
}

impl PolicySnapshot {
    pub fn set_provenance(&mut self, path: &str, source: PolicySource) {
        self.provenance.insert(
            path.to_string(),
            PolicyProvenance {
                path: path.to_string(),
                source,
            },
        );
    }

    pub fn source_of(&self, path: &str) -> Option<PolicySource> {
        self.provenance.get(path).map(|entry| entry.source)
    }

    pub fn upgrade_policy(&self) -> UpgradePolicy {
        self.addons.to_policy()
    }
}
