//! Unattended Upgrades library
//!
//! Exposes the configuration and host adapters for integration testing

pub mod config;
pub mod host;

pub use config::{load_config, Config, InstallerConfig, LoadedConfig};
pub use host::{CommandInstaller, Inventory, InventoryFile};
