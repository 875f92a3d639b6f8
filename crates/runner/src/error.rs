use thiserror::Error;
use upgrades_core_types::{AddonId, HostError};

/// Infrastructure failures that abort a batch. Per-add-on apply failures never
/// surface here; they are recorded in the report instead.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("failed to read upgrade settings: {0}")]
    Settings(#[source] HostError),
    #[error("failed to list installed add-ons: {0}")]
    Catalog(#[source] HostError),
    #[error("failed to check for an update of {addon}: {source}")]
    UpdateCheck {
        addon: AddonId,
        #[source]
        source: HostError,
    },
}
