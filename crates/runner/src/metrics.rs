use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
struct Counters {
    batches_started: AtomicU64,
    batches_outside_window: AtomicU64,
    upgraded: AtomicU64,
    failed: AtomicU64,
    skipped_by_policy: AtomicU64,
    would_upgrade: AtomicU64,
}

static COUNTERS: Lazy<Counters> = Lazy::new(Counters::default);

fn increment(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

pub fn record_batch_started() {
    increment(&COUNTERS.batches_started);
}

pub fn record_outside_window() {
    increment(&COUNTERS.batches_outside_window);
}

pub fn record_upgraded() {
    increment(&COUNTERS.upgraded);
}

pub fn record_failed() {
    increment(&COUNTERS.failed);
}

pub fn record_skipped() {
    increment(&COUNTERS.skipped_by_policy);
}

pub fn record_would_upgrade() {
    increment(&COUNTERS.would_upgrade);
}

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Debug, Default)]
pub struct UpgradeMetricsSnapshot {
    pub batches_started: u64,
    pub batches_outside_window: u64,
    pub upgraded: u64,
    pub failed: u64,
    pub skipped_by_policy: u64,
    pub would_upgrade: u64,
}

pub fn snapshot() -> UpgradeMetricsSnapshot {
    UpgradeMetricsSnapshot {
        batches_started: COUNTERS.batches_started.load(Ordering::Relaxed),
        batches_outside_window: COUNTERS.batches_outside_window.load(Ordering::Relaxed),
        upgraded: COUNTERS.upgraded.load(Ordering::Relaxed),
        failed: COUNTERS.failed.load(Ordering::Relaxed),
        skipped_by_policy: COUNTERS.skipped_by_policy.load(Ordering::Relaxed),
        would_upgrade: COUNTERS.would_upgrade.load(Ordering::Relaxed),
    }
}
