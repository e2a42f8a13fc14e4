//! Task ledger: catalog CRUD and weekly completion tracking.
//!
//! # Responsibility
//! - Add, edit and delete tasks while keeping ids stable.
//! - Track which tasks are done for the active week.
//! - Update the weekly allowance.
//!
//! # Invariants
//! - Ids are assigned from `Document::next_id` and never reused.
//! - Deleting a task also drops its completion; no dangling ids remain.
//! - Amount arguments must be non-negative. The ledger does not clamp;
//!   callers enforce this at the input boundary.
//! - Amounts above `MAX_AMOUNT` are rejected.
//! - A rejected operation leaves the document untouched.

use crate::model::document::{Document, HistoryEntry};
use crate::model::task::{check_amount, normalize_task_name, Task, TaskId, TaskValidationError};
use crate::model::Money;
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Rejected ledger operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    Validation(TaskValidationError),
    NotFound(TaskId),
}

impl Display for LedgerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
        }
    }
}

impl Error for LedgerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(_) => None,
        }
    }
}

impl From<TaskValidationError> for LedgerError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Appends a new task and returns it.
///
/// # Errors
/// - `LedgerError::Validation` when `name` is blank or `value` is too large.
pub fn add_task(document: &mut Document, name: &str, value: Money) -> LedgerResult<Task> {
    let name = normalize_task_name(name)?;
    let value = check_amount(value)?;
    let task = Task {
        id: document.next_id,
        name,
        value,
    };
    document.tasks.push(task.clone());
    document.next_id += 1;
    debug!(
        "event=task_add module=ledger status=ok task_id={} task_count={}",
        task.id,
        document.tasks.len()
    );
    Ok(task)
}

/// Replaces name and value of an existing task.
///
/// # Errors
/// - `LedgerError::NotFound` when `id` is not in the catalog.
/// - `LedgerError::Validation` when `name` is blank or `value` is too large.
pub fn edit_task(
    document: &mut Document,
    id: TaskId,
    name: &str,
    value: Money,
) -> LedgerResult<Task> {
    let index = task_index(document, id).ok_or(LedgerError::NotFound(id))?;
    let name = normalize_task_name(name)?;
    let value = check_amount(value)?;

    let task = &mut document.tasks[index];
    task.name = name;
    task.value = value;
    debug!("event=task_edit module=ledger status=ok task_id={id}");
    Ok(task.clone())
}

/// Removes a task and its completion. Unknown ids are ignored.
///
/// Returns whether a task was removed.
pub fn delete_task(document: &mut Document, id: TaskId) -> bool {
    let Some(index) = task_index(document, id) else {
        debug!("event=task_delete module=ledger status=noop task_id={id}");
        return false;
    };
    document.tasks.remove(index);
    document.completions.remove(&id);
    debug!("event=task_delete module=ledger status=ok task_id={id}");
    true
}

/// Marks a task done or not done for the active week.
///
/// # Errors
/// - `LedgerError::NotFound` when `id` is not in the catalog.
pub fn set_completion(document: &mut Document, id: TaskId, done: bool) -> LedgerResult<()> {
    if task_index(document, id).is_none() {
        return Err(LedgerError::NotFound(id));
    }
    if done {
        document.completions.insert(id);
    } else {
        document.completions.remove(&id);
    }
    debug!("event=task_completion module=ledger status=ok task_id={id} done={done}");
    Ok(())
}

/// Sets the fixed weekly allowance. Takes effect for the active week.
///
/// # Errors
/// - `LedgerError::Validation` when `value` is above `MAX_AMOUNT`.
pub fn set_weekly_allowance(document: &mut Document, value: Money) -> LedgerResult<()> {
    document.weekly_allowance = check_amount(value)?;
    debug!("event=allowance_set module=ledger status=ok");
    Ok(())
}

/// Tasks ordered by case-insensitive name, then by id.
pub fn tasks_by_name(document: &Document) -> Vec<&Task> {
    let mut tasks = document.tasks.iter().collect::<Vec<_>>();
    tasks.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then(a.id.cmp(&b.id))
    });
    tasks
}

/// Archived weeks, most recent first.
pub fn history_newest_first(document: &Document) -> impl Iterator<Item = &HistoryEntry> {
    document.history.iter().rev()
}

fn task_index(document: &Document, id: TaskId) -> Option<usize> {
    document.tasks.iter().position(|task| task.id == id)
}
