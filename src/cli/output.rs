use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

#[derive(Clone, Debug, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    Yaml,
}

/// Structured formats go to stdout as a single document; `human` defers to `render`.
pub fn emit<T: Serialize>(format: &OutputFormat, payload: &T, render: impl FnOnce()) -> Result<()> {
    match format {
        OutputFormat::Human => render(),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(payload)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(payload)?),
    }
    Ok(())
}
