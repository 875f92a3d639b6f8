use chrono::{DateTime, Utc};
use upgrades_core_types::{AddonId, MaintenanceWindow, RunId};

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "status", rename_all = "snake_case"))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutcomeStatus {
    NotAllowed,
    Blocked,
    WouldUpgrade,
    Upgraded,
    Failed { reason: String },
}

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddonOutcome {
    pub addon: AddonId,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub status: OutcomeStatus,
}

/// Result of one batch. Add-ons without a pending update are not listed.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Debug)]
pub struct UpgradeReport {
    pub run_id: RunId,
    pub dry_run: bool,
    pub evaluated_at: DateTime<Utc>,
    pub window: Option<MaintenanceWindow>,
    pub window_open: bool,
    pub outcomes: Vec<AddonOutcome>,
    pub upgraded: usize,
}

impl UpgradeReport {
    pub fn new(dry_run: bool, evaluated_at: DateTime<Utc>) -> Self {
        Self {
            run_id: RunId::new(),
            dry_run,
            evaluated_at,
            window: None,
            window_open: false,
            outcomes: Vec::new(),
            upgraded: 0,
        }
    }

    pub fn failed(&self) -> usize {
        self.count(|status| matches!(status, OutcomeStatus::Failed { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|status| matches!(status, OutcomeStatus::NotAllowed | OutcomeStatus::Blocked))
    }

    pub fn status_of(&self, addon: &AddonId) -> Option<&OutcomeStatus> {
        self.outcomes
            .iter()
            .find(|outcome| &outcome.addon == addon)
            .map(|outcome| &outcome.status)
    }

    fn count(&self, predicate: impl Fn(&OutcomeStatus) -> bool) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| predicate(&outcome.status))
            .count()
    }

    pub(crate) fn record(&mut self, addon: &AddonId, status: OutcomeStatus) {
        if matches!(status, OutcomeStatus::Upgraded | OutcomeStatus::WouldUpgrade) {
            self.upgraded += 1;
        }
        self.outcomes.push(AddonOutcome {
            addon: addon.clone(),
            status,
        });
    }
}
