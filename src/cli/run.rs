use std::sync::Arc;

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use serde_json::json;
use tracing::debug;
use unattended_upgrades::CommandInstaller;
use upgrades_policy_center::SnapshotSettings;
use upgrades_runner::{metrics, FixedClock, OutcomeStatus, UpgradeReport, Upgrader};

use super::context::CliContext;
use super::output::{emit, OutputFormat};

#[derive(Args, Clone, Debug)]
pub struct RunArgs {
    /// Count the add-ons that would be upgraded without touching any of them
    #[arg(long)]
    pub dry_run: bool,

    /// Evaluate as if the current time were this instant (RFC 3339)
    #[arg(long, value_name = "RFC3339")]
    pub at: Option<DateTime<Utc>>,
}

pub fn cmd_run(args: RunArgs, ctx: &CliContext, output: &OutputFormat) -> Result<()> {
    if !args.dry_run && !ctx.config().installer.is_configured() {
        bail!(
            "installer.update_command is not configured ({})",
            ctx.config_path().display()
        );
    }

    let settings = SnapshotSettings::new(ctx.policy_snapshot()?);
    let policy_rev = settings.revision();
    debug!(policy_rev, "policy snapshot loaded");
    let inventory = ctx.inventory();
    let installer = CommandInstaller::new(
        Arc::clone(&inventory),
        ctx.config().installer.update_command.clone(),
    );

    let mut upgrader = Upgrader::new(Arc::new(installer), inventory, Arc::new(settings));
    if let Some(at) = args.at {
        upgrader = upgrader.with_clock(Arc::new(FixedClock(at)));
    }

    let report = upgrader.upgrade(args.dry_run)?;
    let payload = json!({
        "report": &report,
        "policy_rev": policy_rev,
        "metrics": metrics::snapshot(),
    });
    emit(output, &payload, || print_report(&report))
}

fn print_report(report: &UpgradeReport) {
    let mode = if report.dry_run { " (dry run)" } else { "" };
    println!("Unattended upgrade {}{}", report.run_id, mode);

    if let Some(window) = &report.window {
        if !report.window_open {
            println!("Maintenance window {} is not open; nothing to do", window);
            return;
        }
        println!("Maintenance window {} is open", window);
    }

    for outcome in &report.outcomes {
        println!("  {:<24} {}", outcome.addon.as_str(), describe(&outcome.status));
    }

    if report.dry_run {
        println!(
            "{} add-on(s) would be upgraded, {} skipped by policy",
            report.upgraded,
            report.skipped()
        );
    } else {
        println!(
            "Upgraded {} add-on(s), {} failed, {} skipped by policy",
            report.upgraded,
            report.failed(),
            report.skipped()
        );
    }
}

fn describe(status: &OutcomeStatus) -> String {
    match status {
        OutcomeStatus::NotAllowed => "skipped (not allowed)".to_string(),
        OutcomeStatus::Blocked => "skipped (blocked)".to_string(),
        OutcomeStatus::WouldUpgrade => "would upgrade".to_string(),
        OutcomeStatus::Upgraded => "upgraded".to_string(),
        OutcomeStatus::Failed { reason } => format!("failed: {reason}"),
    }
}
