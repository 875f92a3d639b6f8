use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use once_cell::sync::OnceCell;
use unattended_upgrades::{Config, InventoryFile};
use upgrades_policy_center::{load_snapshot_with_options, LoadOptions, PolicySnapshot};

pub struct CliContext {
    config: Arc<Config>,
    config_path: PathBuf,
    extra_policy_paths: Vec<PathBuf>,
    overrides: Vec<String>,
    inventory: OnceCell<Arc<InventoryFile>>,
}

impl CliContext {
    pub fn new(
        config: Config,
        config_path: PathBuf,
        extra_policy_paths: Vec<PathBuf>,
        overrides: Vec<String>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            config_path,
            extra_policy_paths,
            overrides,
            inventory: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &Config {
        self.config.as_ref()
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn policy_paths(&self) -> Vec<PathBuf> {
        self.config
            .policy_paths
            .iter()
            .chain(self.extra_policy_paths.iter())
            .cloned()
            .collect()
    }

    /// Defaults, then policy files, then `UU_POLICY__*` env, then `--set` overrides.
    pub fn policy_snapshot(&self) -> Result<PolicySnapshot> {
        let options = LoadOptions {
            paths: self.policy_paths(),
            include_env: true,
            cli_overrides: self.overrides.clone(),
        };
        load_snapshot_with_options(&options).map_err(|e| anyhow!(e.to_string()))
    }

    pub fn inventory(&self) -> Arc<InventoryFile> {
        Arc::clone(
            self.inventory
                .get_or_init(|| Arc::new(InventoryFile::new(self.config.inventory.clone()))),
        )
    }
}
