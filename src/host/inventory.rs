use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use upgrades_core_types::{AddonId, HostError};
use upgrades_runner::AddonCatalog;

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("failed to read inventory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse inventory {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("add-on {0} is listed more than once")]
    Duplicate(String),
}

impl From<InventoryError> for HostError {
    fn from(value: InventoryError) -> Self {
        let details = match &value {
            InventoryError::Io { source, .. } => source.to_string(),
            InventoryError::Parse { source, .. } => source.to_string(),
            InventoryError::Duplicate(id) => format!("duplicate id {id}"),
        };
        HostError::with_details(value.to_string(), details)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InventoryEntry {
    pub id: String,
    pub version: String,
    /// Newest version offered by the add-on store, if known.
    #[serde(default)]
    pub available: Option<String>,
}

impl InventoryEntry {
    pub fn has_update(&self) -> bool {
        self.available
            .as_deref()
            .map(|available| available != self.version)
            .unwrap_or(false)
    }
}

/// Installed add-ons in file order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(default)]
    pub addons: Vec<InventoryEntry>,
}

impl Inventory {
    pub fn parse(path: &Path, content: &str) -> Result<Self, InventoryError> {
        let inventory: Inventory =
            serde_yaml::from_str(content).map_err(|source| InventoryError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        let mut seen = HashSet::new();
        for entry in &inventory.addons {
            if !seen.insert(entry.id.as_str()) {
                return Err(InventoryError::Duplicate(entry.id.clone()));
            }
        }
        Ok(inventory)
    }

    pub fn load(path: &Path) -> Result<Self, InventoryError> {
        let content = fs::read_to_string(path).map_err(|source| InventoryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &content)
    }

    pub fn ids(&self) -> Vec<AddonId> {
        self.addons
            .iter()
            .map(|entry| AddonId::new(entry.id.clone()))
            .collect()
    }

    /// Ids missing from the inventory have no update.
    pub fn has_update(&self, addon: &AddonId) -> bool {
        self.addons
            .iter()
            .find(|entry| entry.id == addon.as_str())
            .map(InventoryEntry::has_update)
            .unwrap_or(false)
    }
}

/// Inventory read lazily from disk on first use and cached for the process.
#[derive(Debug)]
pub struct InventoryFile {
    path: PathBuf,
    cached: OnceCell<Inventory>,
}

impl InventoryFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cached: OnceCell::new(),
        }
    }

    pub fn inventory(&self) -> Result<&Inventory, InventoryError> {
        self.cached.get_or_try_init(|| Inventory::load(&self.path))
    }
}

impl AddonCatalog for InventoryFile {
    fn installed_addon_ids(&self) -> Result<Vec<AddonId>, HostError> {
        Ok(self.inventory()?.ids())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"addons:
  - id: calendar
    version: "4.6.0"
    available: "4.7.1"
  - id: contacts
    version: "5.5.0"
    available: "5.5.0"
  - id: notes
    version: "4.9.0"
"#;

    #[test]
    fn update_requires_a_newer_available_version() {
        let inventory = Inventory::parse(Path::new("addons.yaml"), SAMPLE).unwrap();
        assert!(inventory.has_update(&"calendar".into()));
        assert!(!inventory.has_update(&"contacts".into()));
        assert!(!inventory.has_update(&"notes".into()));
        assert!(!inventory.has_update(&"unknown".into()));
    }

    #[test]
    fn ids_keep_file_order() {
        let inventory = Inventory::parse(Path::new("addons.yaml"), SAMPLE).unwrap();
        let ids: Vec<String> = inventory.ids().into_iter().map(|id| id.0).collect();
        assert_eq!(ids, vec!["calendar", "contacts", "notes"]);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let content = "addons:\n  - {id: mail, version: '1'}\n  - {id: mail, version: '2'}\n";
        let err = Inventory::parse(Path::new("addons.yaml"), content).unwrap_err();
        assert!(matches!(err, InventoryError::Duplicate(id) if id == "mail"));
    }

    #[test]
    fn missing_file_surfaces_as_host_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = InventoryFile::new(dir.path().join("absent.yaml"));
        let err = file.installed_addon_ids().unwrap_err();
        assert!(err.message().contains("failed to read inventory"));
        assert!(err.details().is_some());
    }
}
