use chrono::NaiveTime;

use crate::model::{AddonPolicy, PolicySnapshot, WindowSpec};

pub const DEFAULT_WINDOW_START: (u32, u32) = (1, 0);
pub const DEFAULT_WINDOW_END: (u32, u32) = (5, 0);

pub fn default_snapshot() -> PolicySnapshot {
    PolicySnapshot {
        rev: 1,
        window: WindowSpec {
            start: hm(DEFAULT_WINDOW_START),
            end: hm(DEFAULT_WINDOW_END),
            utc_offset_minutes: 0,
        },
        addons: AddonPolicy {
            allowed: Vec::new(),
            blocked: Vec::new(),
        },
        provenance: Default::default(),
    }
}

fn hm((hour, minute): (u32, u32)) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default()
}
