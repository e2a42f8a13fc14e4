//! Weekly rollover engine.
//!
//! # Responsibility
//! - Detect when the active week has ended.
//! - Archive the finished week's totals and reset completions.
//!
//! # Invariants
//! - The current date is always injected by the caller.
//! - At most one history entry is produced per call, even when several
//!   weeks elapsed since the last reconciliation.
//! - The week marker never moves backwards.

use crate::earnings::task_earnings;
use crate::model::document::{Document, HistoryEntry};
use chrono::{Datelike, Duration, NaiveDate};
use log::{info, warn};

/// Result of reconciling a document against the current date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RolloverOutcome {
    /// `today` falls inside the active week; nothing changed.
    Current,
    /// The active week ended; its totals were archived.
    RolledOver {
        archived: HistoryEntry,
        new_week: NaiveDate,
    },
    /// `today` is before the active week. The marker is kept as-is.
    ClockBehind {
        active_week: NaiveDate,
        today_week: NaiveDate,
    },
}

impl RolloverOutcome {
    /// Whether the document was mutated.
    pub fn changed(&self) -> bool {
        matches!(self, Self::RolledOver { .. })
    }
}

/// Returns the Monday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Advances `document` to the week containing `today`.
///
/// Idempotent for a fixed `today`: a second call always returns
/// `RolloverOutcome::Current`.
pub fn reconcile_week(document: &mut Document, today: NaiveDate) -> RolloverOutcome {
    let current_week = week_start(today);

    if document.week == current_week {
        return RolloverOutcome::Current;
    }

    if current_week < document.week {
        warn!(
            "event=week_reconcile module=rollover status=clock_behind active_week={} today_week={}",
            document.week, current_week
        );
        return RolloverOutcome::ClockBehind {
            active_week: document.week,
            today_week: current_week,
        };
    }

    let archived = HistoryEntry {
        week: document.week,
        task_earnings: task_earnings(document),
        allowance: document.weekly_allowance,
    };
    document.history.push(archived.clone());
    document.completions.clear();
    document.week = current_week;

    info!(
        "event=week_reconcile module=rollover status=rolled_over archived_week={} new_week={} skipped_weeks={}",
        archived.week,
        current_week,
        (current_week - archived.week).num_weeks() - 1
    );

    RolloverOutcome::RolledOver {
        archived,
        new_week: current_week,
    }
}

#[cfg(test)]
mod tests {
    use super::week_start;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn week_start_maps_every_weekday_to_its_monday() {
        let monday = date(2024, 1, 8);
        for offset in 0..7 {
            assert_eq!(week_start(monday + chrono::Duration::days(offset)), monday);
        }
    }

    #[test]
    fn week_start_crosses_month_and_year_boundaries() {
        assert_eq!(week_start(date(2024, 3, 2)), date(2024, 2, 26));
        assert_eq!(week_start(date(2025, 1, 1)), date(2024, 12, 30));
    }
}
