//! Application configuration
//!
//! Loaded from YAML; relative paths are resolved against the directory holding
//! the config file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub const ADDON_PLACEHOLDER: &str = "{addon}";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Inventory of installed add-ons and their available versions.
    pub inventory: PathBuf,
    #[serde(default)]
    pub policy_paths: Vec<PathBuf>,
    #[serde(default)]
    pub installer: InstallerConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct InstallerConfig {
    /// Argument vector run once per add-on; `{addon}` is replaced by its id.
    #[serde(default)]
    pub update_command: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            inventory: PathBuf::from("addons.yaml"),
            policy_paths: Vec::new(),
            installer: InstallerConfig::default(),
        }
    }
}

impl Config {
    fn resolve_relative_to(mut self, base: &Path) -> Self {
        self.inventory = rebase(base, &self.inventory);
        self.policy_paths = self
            .policy_paths
            .iter()
            .map(|path| rebase(base, path))
            .collect();
        self
    }
}

impl InstallerConfig {
    pub fn is_configured(&self) -> bool {
        self.update_command
            .first()
            .map(|program| !program.trim().is_empty())
            .unwrap_or(false)
    }
}

fn rebase(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

pub struct LoadedConfig {
    pub config: Config,
    pub path: PathBuf,
}

pub fn load_config(config_path: Option<&PathBuf>) -> Result<LoadedConfig> {
    let config_path = match config_path {
        Some(path) => path.clone(),
        None => {
            // Priority: ./config/config.yaml > ~/.config/unattended-upgrades/config.yaml
            let local_config = PathBuf::from("config/config.yaml");
            if local_config.exists() {
                local_config
            } else {
                let mut path = dirs::config_dir().context("Failed to get config directory")?;
                path.push("unattended-upgrades");
                path.push("config.yaml");
                path
            }
        }
    };

    if config_path.exists() {
        let content = fs::read_to_string(&config_path).context("Failed to read config file")?;
        let config: Config =
            serde_yaml::from_str(&content).context("Failed to parse config file")?;
        let base = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        info!("Loaded configuration from: {}", config_path.display());
        Ok(LoadedConfig {
            config: config.resolve_relative_to(&base),
            path: config_path,
        })
    } else {
        warn!(
            "Config file not found, using defaults: {}",
            config_path.display()
        );
        Ok(LoadedConfig {
            config: Config::default(),
            path: config_path,
        })
    }
}
