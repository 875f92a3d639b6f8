use std::sync::Arc;

use chrono::{DateTime, Utc};
use upgrades_core_types::{AddonId, HostError};

/// Host installer operations consumed by the runner.
pub trait UpdateInstaller {
    fn is_update_available(&self, addon: &AddonId) -> Result<bool, HostError>;

    /// `Ok(false)` means the update was attempted and did not succeed.
    fn apply_update(&self, addon: &AddonId) -> Result<bool, HostError>;
}

pub trait AddonCatalog {
    fn installed_addon_ids(&self) -> Result<Vec<AddonId>, HostError>;
}

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to one instant.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

impl<T> UpdateInstaller for Arc<T>
where
    T: UpdateInstaller + ?Sized,
{
    fn is_update_available(&self, addon: &AddonId) -> Result<bool, HostError> {
        (**self).is_update_available(addon)
    }

    fn apply_update(&self, addon: &AddonId) -> Result<bool, HostError> {
        (**self).apply_update(addon)
    }
}

impl<T> AddonCatalog for Arc<T>
where
    T: AddonCatalog + ?Sized,
{
    fn installed_addon_ids(&self) -> Result<Vec<AddonId>, HostError> {
        (**self).installed_addon_ids()
    }
}

impl<T> Clock for Arc<T>
where
    T: Clock + ?Sized,
{
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}
