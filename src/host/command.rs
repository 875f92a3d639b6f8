use std::process::Command;
use std::sync::Arc;

use tracing::{debug, warn};
use upgrades_core_types::{AddonId, HostError};
use upgrades_runner::UpdateInstaller;

use super::inventory::InventoryFile;
use crate::config::ADDON_PLACEHOLDER;

/// Applies updates by running an external command once per add-on.
///
/// Availability comes from the inventory. A zero exit status counts as success,
/// any other status as an attempted-but-failed update, and a command that cannot
/// be launched as a host error.
pub struct CommandInstaller {
    inventory: Arc<InventoryFile>,
    argv: Vec<String>,
}

impl CommandInstaller {
    pub fn new(inventory: Arc<InventoryFile>, argv: Vec<String>) -> Self {
        Self { inventory, argv }
    }

    fn command_for(&self, addon: &AddonId) -> Result<Command, HostError> {
        let mut args = self
            .argv
            .iter()
            .map(|arg| arg.replace(ADDON_PLACEHOLDER, addon.as_str()));
        let program = args
            .next()
            .filter(|program| !program.trim().is_empty())
            .ok_or_else(|| HostError::new("no update command configured"))?;
        let mut command = Command::new(program);
        command.args(args);
        Ok(command)
    }
}

impl UpdateInstaller for CommandInstaller {
    fn is_update_available(&self, addon: &AddonId) -> Result<bool, HostError> {
        Ok(self.inventory.inventory()?.has_update(addon))
    }

    fn apply_update(&self, addon: &AddonId) -> Result<bool, HostError> {
        let mut command = self.command_for(addon)?;
        let output = command.output().map_err(|err| {
            HostError::with_details(
                format!("failed to launch update command for {addon}"),
                err.to_string(),
            )
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            debug!(%addon, stdout = %stdout.trim(), "update command output");
        }
        if output.status.success() {
            return Ok(true);
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        warn!(
            %addon,
            status = %output.status,
            stderr = %stderr.trim(),
            "update command exited unsuccessfully"
        );
        Ok(false)
    }
}
