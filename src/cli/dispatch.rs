use super::env::CliArgs;
use super::info::cmd_info;
use super::policy::cmd_policy;
use super::run::cmd_run;
use super::window::cmd_window;
use crate::cli::commands::Commands;
use crate::cli::context::CliContext;
use anyhow::Result;

pub fn dispatch(cli: &CliArgs, ctx: &CliContext) -> Result<()> {
    match cli.command.clone() {
        Commands::Run(args) => cmd_run(args, ctx, &cli.output),
        Commands::Policy(args) => cmd_policy(args, ctx, &cli.output),
        Commands::Window(args) => cmd_window(args, ctx, &cli.output),
        Commands::Info => cmd_info(ctx, &cli.output),
    }
}
