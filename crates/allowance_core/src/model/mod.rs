//! Canonical allowance data model.
//!
//! # Responsibility
//! - Define the single persisted aggregate (`Document`) and its parts.
//! - Validate documents read back from storage.
//!
//! # Invariants
//! - Task ids are unique and always lower than `Document::next_id`.
//! - Completions only reference tasks that exist in the catalog.
//! - The week marker is a Monday and never moves backwards.
//! - History is append-only and strictly ordered by week.
//! - Task values and the allowance never exceed `MAX_AMOUNT`.

pub mod document;
pub mod task;

use rust_decimal::Decimal;

/// Exact decimal amount used for every monetary value in core.
pub type Money = Decimal;

/// Largest accepted task value or allowance (one billion).
///
/// Keeps every sum of amounts far below `Decimal::MAX`.
pub const MAX_AMOUNT: Money = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);
