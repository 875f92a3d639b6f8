pub mod api;
pub mod defaults;
pub mod errors;
pub mod loader;
pub mod model;
pub mod window;

pub use api::{SnapshotSettings, UpgradeSettings};
pub use defaults::default_snapshot;
pub use errors::PolicyError;
pub use loader::{load_snapshot, load_snapshot_with_options, LoadOptions};
pub use model::{AddonPolicy, PolicyProvenance, PolicySnapshot, PolicySource, WindowSpec};

#[cfg(test)]
mod tests;
