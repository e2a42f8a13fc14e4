//! Plain-text rendering of session state.
//!
//! Rounding to cents happens here only; core keeps exact amounts.

use allowance_core::{Earnings, HistoryEntry, Money, Recovery, RolloverOutcome, StoreError, Task};
use rust_decimal::RoundingStrategy;
use std::fmt::Write;

/// `$1.50`-style amount with two decimals.
pub fn money(amount: Money) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("${rounded:.2}")
}

pub fn task_line(task: &Task, done: bool) -> String {
    let mark = if done { 'x' } else { ' ' };
    format!(
        "  [{mark}] #{} {} (extra {})",
        task.id,
        task.name,
        money(task.value)
    )
}

pub fn task_list<'a>(
    week: chrono::NaiveDate,
    tasks: impl IntoIterator<Item = (&'a Task, bool)>,
) -> String {
    let mut out = format!("Tasks for week of {week}\n");
    let mut empty = true;
    for (task, done) in tasks {
        empty = false;
        out.push_str(&task_line(task, done));
        out.push('\n');
    }
    if empty {
        out.push_str("  No tasks yet. Ask a grown-up to add some.\n");
    }
    out
}

pub fn totals(earnings: &Earnings) -> String {
    let rows = [
        ("Weekly allowance", earnings.weekly_allowance),
        ("Task earnings", earnings.task_earnings),
        ("Total money", earnings.total_money),
        ("Could earn up to", earnings.potential_total),
        ("Still available", earnings.remaining),
    ];
    let mut out = String::new();
    for (label, amount) in rows {
        let _ = writeln!(out, "{:<18}{}", format!("{label}:"), money(amount));
    }
    out
}

pub fn history_line(entry: &HistoryEntry) -> String {
    format!(
        "  Week {}: allowance {} + tasks {} = {}",
        entry.week,
        money(entry.allowance),
        money(entry.task_earnings),
        money(entry.total())
    )
}

/// History block, newest first. Empty when nothing is archived.
pub fn history<'a>(entries: impl IntoIterator<Item = &'a HistoryEntry>) -> String {
    let lines = entries.into_iter().map(history_line).collect::<Vec<_>>();
    if lines.is_empty() {
        return String::new();
    }
    format!("History\n{}\n", lines.join("\n"))
}

pub fn recovery_warning(recovery: &Recovery) -> String {
    let mut out = if recovery.cause.is_missing() {
        "No saved data found. Starting fresh.".to_string()
    } else {
        format!("Saved data was unreadable ({}). Starting fresh.", recovery.cause)
    };
    if let Some(backup) = &recovery.backup_path {
        let _ = write!(out, " Old file kept at {}.", backup.display());
    }
    if recovery.read_only {
        out.push_str(" The file was left untouched; changes will not be saved.");
    }
    if let Some(err) = &recovery.persist_error {
        let _ = write!(out, " {}", save_warning(err));
    }
    out
}

pub fn save_warning(err: &StoreError) -> String {
    format!("Trouble saving: {err}. Changes are kept until the program exits.")
}

pub fn rollover_notice(outcome: &RolloverOutcome) -> Option<String> {
    match outcome {
        RolloverOutcome::Current => None,
        RolloverOutcome::RolledOver { archived, new_week } => Some(format!(
            "New week started {new_week}. Archived week {} ({}).",
            archived.week,
            money(archived.total())
        )),
        RolloverOutcome::ClockBehind {
            active_week,
            today_week,
        } => Some(format!(
            "Today's week ({today_week}) is before the active week ({active_week}); keeping {active_week}."
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        history, money, recovery_warning, rollover_notice, task_line, task_list, totals,
    };
    use allowance_core::{Earnings, HistoryEntry, Recovery, RolloverOutcome, StoreError, Task};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::io::ErrorKind;
    use std::path::PathBuf;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn money_rounds_half_away_from_zero_and_pads() {
        assert_eq!(money(dec!(2.5)), "$2.50");
        assert_eq!(money(dec!(0.005)), "$0.01");
        assert_eq!(money(dec!(10)), "$10.00");
    }

    #[test]
    fn task_line_marks_completion() {
        let task = Task {
            id: 3,
            name: "Clean Room".to_string(),
            value: dec!(2.5),
        };
        assert_eq!(task_line(&task, true), "  [x] #3 Clean Room (extra $2.50)");
        assert_eq!(task_line(&task, false), "  [ ] #3 Clean Room (extra $2.50)");
    }

    #[test]
    fn empty_task_list_shows_hint() {
        let out = task_list(date(2024, 1, 8), std::iter::empty());
        assert_eq!(
            out,
            "Tasks for week of 2024-01-08\n  No tasks yet. Ask a grown-up to add some.\n"
        );
    }

    #[test]
    fn totals_align_labels() {
        let earnings = Earnings {
            weekly_allowance: dec!(5),
            task_earnings: dec!(2.5),
            potential_task_earnings: dec!(4),
            total_money: dec!(7.5),
            potential_total: dec!(9),
            remaining: dec!(1.5),
        };
        let out = totals(&earnings);
        assert!(out.starts_with("Weekly allowance: $5.00\n"));
        assert!(out.contains("Could earn up to: $9.00\n"));
        assert!(out.ends_with("Still available:  $1.50\n"));
    }

    #[test]
    fn history_lists_entries_in_given_order() {
        let entries = [
            HistoryEntry {
                week: date(2024, 1, 8),
                task_earnings: dec!(1),
                allowance: dec!(5),
            },
            HistoryEntry {
                week: date(2024, 1, 1),
                task_earnings: dec!(3),
                allowance: dec!(5),
            },
        ];
        assert_eq!(
            history(entries.iter()),
            "History\n  Week 2024-01-08: allowance $5.00 + tasks $1.00 = $6.00\n  Week 2024-01-01: allowance $5.00 + tasks $3.00 = $8.00\n"
        );
        assert_eq!(history(std::iter::empty()), "");
    }

    #[test]
    fn recovery_warning_mentions_backup_or_untouched_file() {
        let io = |kind: ErrorKind| StoreError::Io {
            path: PathBuf::from("/data/allowance.json"),
            source: std::io::Error::from(kind),
        };
        let backed_up = Recovery {
            cause: io(ErrorKind::InvalidData),
            backup_path: Some(PathBuf::from("/data/allowance.json.corrupt.1")),
            persist_error: None,
            read_only: false,
        };
        assert!(recovery_warning(&backed_up)
            .ends_with("Starting fresh. Old file kept at /data/allowance.json.corrupt.1."));

        let untouched = Recovery {
            cause: io(ErrorKind::PermissionDenied),
            backup_path: None,
            persist_error: None,
            read_only: true,
        };
        assert!(recovery_warning(&untouched)
            .ends_with("The file was left untouched; changes will not be saved."));
    }

    #[test]
    fn rollover_notice_only_for_changes() {
        assert_eq!(rollover_notice(&RolloverOutcome::Current), None);
        let notice = rollover_notice(&RolloverOutcome::RolledOver {
            archived: HistoryEntry {
                week: date(2024, 1, 1),
                task_earnings: dec!(3),
                allowance: dec!(5),
            },
            new_week: date(2024, 1, 8),
        })
        .unwrap();
        assert_eq!(
            notice,
            "New week started 2024-01-08. Archived week 2024-01-01 ($8.00)."
        );
    }
}
