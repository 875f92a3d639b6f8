mod cli;

fn main() -> anyhow::Result<()> {
    cli::app::run()
}
