use thiserror::Error;
use upgrades_core_types::HostError;

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("invalid policy: {0}")]
    Invalid(String),
    #[error("io error: {0}")]
    Io(String),
    #[error("unsupported policy path: {0}")]
    UnsupportedPath(String),
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

impl From<PolicyError> for HostError {
    fn from(value: PolicyError) -> Self {
        HostError::new(value.to_string())
    }
}
