use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use upgrades_core_types::MaintenanceWindow;

use crate::errors::PolicyError;
use crate::model::WindowSpec;

impl WindowSpec {
    pub fn offset(&self) -> Result<FixedOffset, PolicyError> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                PolicyError::InvalidValue(format!(
                    "utc offset out of range: {} minutes",
                    self.utc_offset_minutes
                ))
            })
    }

    pub fn wraps_midnight(&self) -> bool {
        self.end < self.start
    }

    /// Resolves the absolute window that applies on the local date of `reference`.
    ///
    /// For a window running past midnight, the occurrence that started the previous
    /// evening is picked while `reference` is still before today's start time.
    pub fn resolve(&self, reference: DateTime<Utc>) -> Result<MaintenanceWindow, PolicyError> {
        let offset = self.offset()?;
        let local = reference.with_timezone(&offset);
        let today = local.date_naive();

        let (start_date, end_date) = if !self.wraps_midnight() {
            (today, today)
        } else if local.time() >= self.start {
            (today, next_day(today)?)
        } else {
            (previous_day(today)?, today)
        };

        let start = at(offset, start_date, self.start)?;
        let end = at(offset, end_date, self.end)?;
        MaintenanceWindow::new(start, end).map_err(|err| PolicyError::Invalid(err.to_string()))
    }
}

fn at(offset: FixedOffset, date: NaiveDate, time: NaiveTime) -> Result<DateTime<Utc>, PolicyError> {
    offset
        .from_local_datetime(&date.and_time(time))
        .single()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| PolicyError::InvalidValue(format!("unrepresentable instant {date} {time}")))
}

fn next_day(date: NaiveDate) -> Result<NaiveDate, PolicyError> {
    date.succ_opt()
        .ok_or_else(|| PolicyError::InvalidValue(format!("no day after {date}")))
}

fn previous_day(date: NaiveDate) -> Result<NaiveDate, PolicyError> {
    date.pred_opt()
        .ok_or_else(|| PolicyError::InvalidValue(format!("no day before {date}")))
}
