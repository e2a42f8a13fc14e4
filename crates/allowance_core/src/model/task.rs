//! Task catalog entry.
//!
//! # Invariants
//! - `id` is assigned once by the ledger and never changes.
//! - `name` is stored trimmed and is never blank.
//! - `value` is non-negative; callers clamp at the input boundary.
//! - `value` is at most `MAX_AMOUNT`.

use super::{Money, MAX_AMOUNT};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Ledger-assigned task identifier. Ids start at 1.
pub type TaskId = u64;

/// A reward-bearing chore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    /// Extra money earned when the task is completed this week.
    pub value: Money,
}

/// Validation failure for task input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Name is empty after trimming whitespace.
    EmptyName,
    /// Amount is above `MAX_AMOUNT`.
    AmountTooLarge(Money),
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "task name cannot be empty"),
            Self::AmountTooLarge(value) => {
                write!(f, "amount {value} is above the maximum of {MAX_AMOUNT}")
            }
        }
    }
}

impl Error for TaskValidationError {}

/// Trims `name` and rejects blank input.
pub fn normalize_task_name(name: &str) -> Result<String, TaskValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(TaskValidationError::EmptyName);
    }
    Ok(trimmed.to_string())
}

/// Rejects amounts above `MAX_AMOUNT`.
pub fn check_amount(value: Money) -> Result<Money, TaskValidationError> {
    if value > MAX_AMOUNT {
        return Err(TaskValidationError::AmountTooLarge(value));
    }
    Ok(value)
}
