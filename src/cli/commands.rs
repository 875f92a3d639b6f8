use clap::Subcommand;

use super::policy::PolicyArgs;
use super::run::RunArgs;
use super::window::WindowArgs;

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Upgrade every permitted add-on with a pending update
    Run(RunArgs),

    /// Inspect the effective upgrade policy
    Policy(PolicyArgs),

    /// Show the maintenance window and whether it is open
    Window(WindowArgs),

    /// Show version and build information
    Info,
}
