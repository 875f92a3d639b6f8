use anyhow::Result;
use serde_json::json;

use super::context::CliContext;
use super::output::{emit, OutputFormat};

pub fn cmd_info(ctx: &CliContext, output: &OutputFormat) -> Result<()> {
    let config = ctx.config();
    let policy_paths = ctx.policy_paths();
    let payload = json!({
        "version": env!("CARGO_PKG_VERSION"),
        "build_date": env!("BUILD_DATE"),
        "git_commit": env!("GIT_HASH"),
        "git_branch": env!("GIT_BRANCH"),
        "config_path": ctx.config_path(),
        "inventory": &config.inventory,
        "policy_paths": &policy_paths,
        "installer_configured": config.installer.is_configured(),
    });

    emit(output, &payload, || {
        println!("Unattended Upgrades System Information");
        println!("======================================");
        println!("Version: {}", env!("CARGO_PKG_VERSION"));
        println!("Build Date: {}", env!("BUILD_DATE"));
        println!("Git Commit: {} ({})", env!("GIT_HASH"), env!("GIT_BRANCH"));
        println!();

        println!("Configuration:");
        println!("- Config File: {}", ctx.config_path().display());
        println!("- Inventory: {}", config.inventory.display());
        if policy_paths.is_empty() {
            println!("- Policy Paths: (built-in defaults)");
        } else {
            println!("- Policy Paths:");
            for path in &policy_paths {
                println!("  - {}", path.display());
            }
        }
        if config.installer.is_configured() {
            println!("- Update Command: {}", config.installer.update_command.join(" "));
        } else {
            println!("- Update Command: (not configured)");
        }
    })
}
