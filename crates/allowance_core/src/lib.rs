//! Core engine for the household allowance tracker.
//! This crate is the single source of truth for weekly rollover, ledger
//! and earnings rules; front ends only render and forward commands.

pub mod config;
pub mod earnings;
pub mod ledger;
pub mod logging;
pub mod model;
pub mod rollover;
pub mod service;
pub mod store;

pub use config::AppConfig;
pub use earnings::{
    potential_task_earnings, potential_total, remaining, task_earnings, total_money, Earnings,
};
pub use ledger::{
    add_task, delete_task, edit_task, history_newest_first, set_completion,
    set_weekly_allowance, tasks_by_name, LedgerError, LedgerResult,
};
pub use logging::{default_log_level, flush_logging, init_logging, logging_status, LoggingError};
pub use model::document::{
    Document, DocumentValidationError, HistoryEntry, DEFAULT_WEEKLY_ALLOWANCE, FIRST_TASK_ID,
};
pub use model::task::{Task, TaskId, TaskValidationError};
pub use model::{Money, MAX_AMOUNT};
pub use rollover::{reconcile_week, week_start, RolloverOutcome};
pub use service::session::{AllowanceSession, CommandOutcome};
pub use store::{
    DocumentStore, JsonFileStore, LoadOutcome, MemoryStore, Recovery, StoreError, StoreResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
