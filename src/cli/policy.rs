use anyhow::Result;
use clap::{Args, Subcommand};
use upgrades_policy_center::PolicySnapshot;

use super::context::CliContext;
use super::output::{emit, OutputFormat};

#[derive(Args, Clone, Debug)]
pub struct PolicyArgs {
    #[command(subcommand)]
    pub command: PolicyCommand,
}

#[derive(Subcommand, Clone, Debug)]
pub enum PolicyCommand {
    /// Print the effective policy and where each value came from
    Show,
}

pub fn cmd_policy(args: PolicyArgs, ctx: &CliContext, output: &OutputFormat) -> Result<()> {
    match args.command {
        PolicyCommand::Show => {
            let snapshot = ctx.policy_snapshot()?;
            emit(output, &snapshot, || print_snapshot(&snapshot))
        }
    }
}

fn print_snapshot(snapshot: &PolicySnapshot) {
    let window = &snapshot.window;
    println!("Policy Revision: {}", snapshot.rev);
    println!();
    println!(
        "Window → start={}, end={}, utc_offset_minutes={}{}",
        window.start.format("%H:%M"),
        window.end.format("%H:%M"),
        window.utc_offset_minutes,
        if window.wraps_midnight() {
            " (wraps midnight)"
        } else {
            ""
        }
    );
    println!("Allowed → {}", list_or(&snapshot.addons.allowed, "(any)"));
    println!("Blocked → {}", list_or(&snapshot.addons.blocked, "(none)"));
    println!();
    println!("Provenance:");
    for (path, entry) in &snapshot.provenance {
        println!("  {:<28} {:?}", path, entry.source);
    }
}

fn list_or(ids: &[String], empty: &str) -> String {
    if ids.is_empty() {
        empty.to_string()
    } else {
        ids.join(", ")
    }
}
