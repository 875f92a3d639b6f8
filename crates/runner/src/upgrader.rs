use std::sync::Arc;

use upgrades_core_types::UpgradePolicy;
use upgrades_policy_center::UpgradeSettings;

use crate::error::RunnerError;
use crate::evaluator::Batch;
use crate::ports::{AddonCatalog, Clock, SystemClock, UpdateInstaller};
use crate::report::UpgradeReport;

/// Wires the host collaborators together and runs unattended upgrade batches.
pub struct Upgrader {
    installer: Arc<dyn UpdateInstaller>,
    catalog: Arc<dyn AddonCatalog>,
    settings: Arc<dyn UpgradeSettings>,
    clock: Arc<dyn Clock>,
}

impl Upgrader {
    pub fn new(
        installer: Arc<dyn UpdateInstaller>,
        catalog: Arc<dyn AddonCatalog>,
        settings: Arc<dyn UpgradeSettings>,
    ) -> Self {
        Self {
            installer,
            catalog,
            settings,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Policy and the installed list are only read once the window is known to be
    /// open. Errors from those reads, or from an update check, abort the batch.
    pub fn upgrade(&self, dry_run: bool) -> Result<UpgradeReport, RunnerError> {
        let now = self.clock.now();
        let mut batch = Batch::new(dry_run, now);
        let span = batch.span();
        let _entered = span.enter();

        batch.start();
        let window = self
            .settings
            .maintenance_window(now)
            .map_err(RunnerError::Settings)?;
        if !batch.open_window(window) {
            return Ok(batch.into_report());
        }

        let policy = UpgradePolicy {
            allowed: self
                .settings
                .allowed_addon_ids()
                .map_err(RunnerError::Settings)?,
            blocked: self
                .settings
                .blocked_addon_ids()
                .map_err(RunnerError::Settings)?,
        };
        let installed = self
            .catalog
            .installed_addon_ids()
            .map_err(RunnerError::Catalog)?;

        batch.upgrade_each(&policy, &installed, self.installer.as_ref())?;
        Ok(batch.finish())
    }
}
