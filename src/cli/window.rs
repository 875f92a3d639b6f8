use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;
use serde_json::json;

use super::context::CliContext;
use super::output::{emit, OutputFormat};

#[derive(Args, Clone, Debug)]
pub struct WindowArgs {
    /// Resolve the window around this instant instead of now (RFC 3339)
    #[arg(long, value_name = "RFC3339")]
    pub at: Option<DateTime<Utc>>,
}

pub fn cmd_window(args: WindowArgs, ctx: &CliContext, output: &OutputFormat) -> Result<()> {
    let snapshot = ctx.policy_snapshot()?;
    let now = args.at.unwrap_or_else(Utc::now);
    let window = snapshot.window.resolve(now)?;
    let open = window.contains(now);

    let payload = json!({
        "now": now,
        "window": window,
        "open": open,
    });
    emit(output, &payload, || {
        println!("Now: {}", now.to_rfc3339());
        println!("Maintenance window: {}", window);
        println!("Status: {}", if open { "open" } else { "closed" });
    })
}
