//! Root aggregate persisted by the record store.
//!
//! # Responsibility
//! - Hold the task catalog, the active week's completions, the week marker,
//!   the weekly allowance and archived history as one unit.
//! - Reject structurally invalid documents on deserialization.
//!
//! # Invariants
//! - Fields are only mutated through ledger/rollover operations in core.
//! - A deserialized document always satisfies `Document::validate()`.

use super::task::{Task, TaskId};
use super::{Money, MAX_AMOUNT};
use crate::rollover::week_start;
use chrono::{Datelike, NaiveDate, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Allowance used for every freshly initialized document.
pub const DEFAULT_WEEKLY_ALLOWANCE: Money = Decimal::from_parts(500, 0, 0, false, 2);

/// First id handed out by an empty ledger.
pub const FIRST_TASK_ID: TaskId = 1;

/// Archived totals for one finished week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Monday that started the archived week.
    pub week: NaiveDate,
    pub task_earnings: Money,
    pub allowance: Money,
}

impl HistoryEntry {
    /// Allowance plus task earnings for the archived week.
    pub fn total(&self) -> Money {
        self.allowance.saturating_add(self.task_earnings)
    }
}

/// Single persisted state document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DocumentRecord")]
pub struct Document {
    pub(crate) tasks: Vec<Task>,
    pub(crate) next_id: TaskId,
    pub(crate) completions: BTreeSet<TaskId>,
    pub(crate) week: NaiveDate,
    pub(crate) weekly_allowance: Money,
    pub(crate) history: Vec<HistoryEntry>,
}

/// Wire shape accepted on read, before invariants are checked.
#[derive(Deserialize)]
struct DocumentRecord {
    tasks: Vec<Task>,
    next_id: TaskId,
    completions: BTreeSet<TaskId>,
    week: NaiveDate,
    weekly_allowance: Money,
    #[serde(alias = "allowance_history")]
    history: Vec<HistoryEntry>,
}

impl TryFrom<DocumentRecord> for Document {
    type Error = DocumentValidationError;

    fn try_from(record: DocumentRecord) -> Result<Self, Self::Error> {
        let document = Self {
            tasks: record.tasks,
            next_id: record.next_id,
            completions: record.completions,
            week: record.week,
            weekly_allowance: record.weekly_allowance,
            history: record.history,
        };
        document.validate()?;
        Ok(document)
    }
}

impl Document {
    /// Creates an empty document whose active week contains `today`.
    pub fn new(today: NaiveDate, weekly_allowance: Money) -> Self {
        Self {
            tasks: Vec::new(),
            next_id: FIRST_TASK_ID,
            completions: BTreeSet::new(),
            week: week_start(today),
            weekly_allowance,
            history: Vec::new(),
        }
    }

    /// Canonical first-run document.
    pub fn with_defaults(today: NaiveDate) -> Self {
        Self::new(today, DEFAULT_WEEKLY_ALLOWANCE)
    }

    /// Task catalog in insertion order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Id the next added task will receive.
    pub fn next_id(&self) -> TaskId {
        self.next_id
    }

    /// Ids completed during the active week.
    pub fn completions(&self) -> &BTreeSet<TaskId> {
        &self.completions
    }

    /// Monday of the active week.
    pub fn week(&self) -> NaiveDate {
        self.week
    }

    /// Fixed allowance paid every week on top of task earnings.
    pub fn weekly_allowance(&self) -> Money {
        self.weekly_allowance
    }

    /// Archived weeks, oldest first.
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Looks up a catalog task by id.
    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Whether `id` is marked done for the active week.
    pub fn is_completed(&self, id: TaskId) -> bool {
        self.completions.contains(&id)
    }

    /// Checks every structural invariant of the aggregate.
    ///
    /// # Errors
    /// - Returns the first violated invariant, checked in field order.
    pub fn validate(&self) -> Result<(), DocumentValidationError> {
        let mut seen = HashSet::with_capacity(self.tasks.len());
        for task in &self.tasks {
            if task.name.trim().is_empty() {
                return Err(DocumentValidationError::BlankTaskName(task.id));
            }
            if task.value < Decimal::ZERO {
                return Err(DocumentValidationError::NegativeAmount {
                    field: "tasks.value",
                    value: task.value,
                });
            }
            if task.value > MAX_AMOUNT {
                return Err(DocumentValidationError::AmountTooLarge {
                    field: "tasks.value",
                    value: task.value,
                });
            }
            if !seen.insert(task.id) {
                return Err(DocumentValidationError::DuplicateTaskId(task.id));
            }
            if task.id >= self.next_id {
                return Err(DocumentValidationError::TaskIdNotBelowNextId {
                    id: task.id,
                    next_id: self.next_id,
                });
            }
        }

        if let Some(id) = self.completions.iter().find(|id| !seen.contains(*id)) {
            return Err(DocumentValidationError::UnknownCompletion(*id));
        }

        if self.week.weekday() != Weekday::Mon {
            return Err(DocumentValidationError::WeekNotMonday(self.week));
        }

        if self.weekly_allowance < Decimal::ZERO {
            return Err(DocumentValidationError::NegativeAmount {
                field: "weekly_allowance",
                value: self.weekly_allowance,
            });
        }
        if self.weekly_allowance > MAX_AMOUNT {
            return Err(DocumentValidationError::AmountTooLarge {
                field: "weekly_allowance",
                value: self.weekly_allowance,
            });
        }

        let mut previous: Option<NaiveDate> = None;
        for entry in &self.history {
            for (field, value) in [
                ("history.task_earnings", entry.task_earnings),
                ("history.allowance", entry.allowance),
            ] {
                if value < Decimal::ZERO {
                    return Err(DocumentValidationError::NegativeAmount { field, value });
                }
            }
            if previous.is_some_and(|week| week >= entry.week) || entry.week >= self.week {
                return Err(DocumentValidationError::HistoryOutOfOrder(entry.week));
            }
            previous = Some(entry.week);
        }

        Ok(())
    }
}

/// Structural invariant violated by a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentValidationError {
    BlankTaskName(TaskId),
    NegativeAmount { field: &'static str, value: Money },
    AmountTooLarge { field: &'static str, value: Money },
    DuplicateTaskId(TaskId),
    TaskIdNotBelowNextId { id: TaskId, next_id: TaskId },
    UnknownCompletion(TaskId),
    WeekNotMonday(NaiveDate),
    HistoryOutOfOrder(NaiveDate),
}

impl Display for DocumentValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTaskName(id) => write!(f, "task {id} has a blank name"),
            Self::NegativeAmount { field, value } => {
                write!(f, "{field} must be non-negative, got {value}")
            }
            Self::AmountTooLarge { field, value } => {
                write!(f, "{field} must be at most {MAX_AMOUNT}, got {value}")
            }
            Self::DuplicateTaskId(id) => write!(f, "task id {id} appears more than once"),
            Self::TaskIdNotBelowNextId { id, next_id } => {
                write!(f, "task id {id} must be lower than next_id ({next_id})")
            }
            Self::UnknownCompletion(id) => {
                write!(f, "completion references unknown task id {id}")
            }
            Self::WeekNotMonday(week) => write!(f, "week marker {week} is not a Monday"),
            Self::HistoryOutOfOrder(week) => write!(
                f,
                "history entry for week {week} is out of order or not before the active week"
            ),
        }
    }
}

impl Error for DocumentValidationError {}
