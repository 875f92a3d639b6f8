pub mod error;
pub mod evaluator;
pub mod metrics;
pub mod ports;
pub mod report;
pub mod upgrader;

pub use error::RunnerError;
pub use evaluator::{evaluate, evaluate_report};
pub use ports::{AddonCatalog, Clock, FixedClock, SystemClock, UpdateInstaller};
pub use report::{AddonOutcome, OutcomeStatus, UpgradeReport};
pub use upgrader::Upgrader;
