use chrono::{DateTime, Utc};
use tracing::{debug, error, info, info_span, Span};
use upgrades_core_types::{AddonId, MaintenanceWindow, PolicyDecision, UpgradePolicy};

use crate::error::RunnerError;
use crate::metrics;
use crate::ports::UpdateInstaller;
use crate::report::{OutcomeStatus, UpgradeReport};

/// Runs one batch over already-resolved inputs and returns how many add-ons were
/// upgraded, or would be under `dry_run`.
pub fn evaluate<I>(
    window: &MaintenanceWindow,
    policy: &UpgradePolicy,
    now: DateTime<Utc>,
    installed: &[AddonId],
    dry_run: bool,
    installer: &I,
) -> Result<usize, RunnerError>
where
    I: UpdateInstaller + ?Sized,
{
    evaluate_report(window, policy, now, installed, dry_run, installer).map(|r| r.upgraded)
}

pub fn evaluate_report<I>(
    window: &MaintenanceWindow,
    policy: &UpgradePolicy,
    now: DateTime<Utc>,
    installed: &[AddonId],
    dry_run: bool,
    installer: &I,
) -> Result<UpgradeReport, RunnerError>
where
    I: UpdateInstaller + ?Sized,
{
    let mut batch = Batch::new(dry_run, now);
    let span = batch.span();
    let _entered = span.enter();

    batch.start();
    if !batch.open_window(*window) {
        return Ok(batch.into_report());
    }
    batch.upgrade_each(policy, installed, installer)?;
    Ok(batch.finish())
}

/// One in-flight run. The window gate is evaluated once, before any add-on is
/// looked at.
pub(crate) struct Batch {
    report: UpgradeReport,
}

impl Batch {
    pub(crate) fn new(dry_run: bool, now: DateTime<Utc>) -> Self {
        Self {
            report: UpgradeReport::new(dry_run, now),
        }
    }

    pub(crate) fn span(&self) -> Span {
        info_span!(
            "unattended_upgrade",
            run_id = %self.report.run_id,
            dry_run = self.report.dry_run
        )
    }

    pub(crate) fn start(&self) {
        metrics::record_batch_started();
        if !self.report.dry_run {
            info!("Unattended upgrade started");
        }
    }

    pub(crate) fn open_window(&mut self, window: MaintenanceWindow) -> bool {
        let open = window.contains(self.report.evaluated_at);
        self.report.window = Some(window);
        self.report.window_open = open;
        if !open {
            metrics::record_outside_window();
            debug!(
                %window,
                now = %self.report.evaluated_at.to_rfc3339(),
                "Unattended upgrade aborted because the maintenance window is not open"
            );
        }
        open
    }

    pub(crate) fn upgrade_each<I>(
        &mut self,
        policy: &UpgradePolicy,
        installed: &[AddonId],
        installer: &I,
    ) -> Result<(), RunnerError>
    where
        I: UpdateInstaller + ?Sized,
    {
        for addon in installed {
            let available =
                installer
                    .is_update_available(addon)
                    .map_err(|source| RunnerError::UpdateCheck {
                        addon: addon.clone(),
                        source,
                    })?;
            if !available {
                continue;
            }

            match policy.decide(addon) {
                PolicyDecision::NotAllowed => {
                    debug!(%addon, "Ignoring unattended upgrade because the add-on is not allowed");
                    metrics::record_skipped();
                    self.report.record(addon, OutcomeStatus::NotAllowed);
                    continue;
                }
                PolicyDecision::Blocked => {
                    debug!(%addon, "Ignoring unattended upgrade because the add-on is blocked");
                    metrics::record_skipped();
                    self.report.record(addon, OutcomeStatus::Blocked);
                    continue;
                }
                PolicyDecision::Permitted => {}
            }

            if self.report.dry_run {
                metrics::record_would_upgrade();
                self.report.record(addon, OutcomeStatus::WouldUpgrade);
                continue;
            }

            let status = match installer.apply_update(addon) {
                Ok(true) => {
                    info!(%addon, "Unattended upgrade succeeded");
                    metrics::record_upgraded();
                    OutcomeStatus::Upgraded
                }
                Ok(false) => {
                    error!(%addon, "Unattended upgrade failed");
                    metrics::record_failed();
                    OutcomeStatus::Failed {
                        reason: "installer reported failure".to_string(),
                    }
                }
                Err(err) => {
                    error!(
                        %addon,
                        error = %err,
                        details = err.details().unwrap_or_default(),
                        "Unattended upgrade failed"
                    );
                    metrics::record_failed();
                    OutcomeStatus::Failed {
                        reason: err.to_string(),
                    }
                }
            };
            self.report.record(addon, status);
        }
        Ok(())
    }

    pub(crate) fn into_report(self) -> UpgradeReport {
        self.report
    }

    pub(crate) fn finish(self) -> UpgradeReport {
        if !self.report.dry_run {
            info!(
                upgraded = self.report.upgraded,
                failed = self.report.failed(),
                "Unattended upgrade finished"
            );
        }
        self.report
    }
}
