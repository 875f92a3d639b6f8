//! Host-side collaborators: the installed inventory and the installer command.

pub mod command;
pub mod inventory;

pub use command::CommandInstaller;
pub use inventory::{Inventory, InventoryEntry, InventoryError, InventoryFile};
