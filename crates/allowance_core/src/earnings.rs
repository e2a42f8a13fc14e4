//! Earnings calculator.
//!
//! Pure queries over a document snapshot. No rounding happens here;
//! formatting to cents is a rendering concern. Sums saturate at
//! `Decimal::MAX` instead of overflowing.

use crate::model::document::Document;
use crate::model::Money;
use rust_decimal::Decimal;

/// Sum of values of tasks completed this week.
pub fn task_earnings(document: &Document) -> Money {
    document
        .tasks
        .iter()
        .filter(|task| document.completions.contains(&task.id))
        .fold(Decimal::ZERO, |sum, task| sum.saturating_add(task.value))
}

/// Sum of values of every task in the catalog.
pub fn potential_task_earnings(document: &Document) -> Money {
    document
        .tasks
        .iter()
        .fold(Decimal::ZERO, |sum, task| sum.saturating_add(task.value))
}

/// Earned task money plus the fixed allowance.
pub fn total_money(document: &Document) -> Money {
    task_earnings(document).saturating_add(document.weekly_allowance)
}

/// Maximum obtainable this week: every task plus the allowance.
pub fn potential_total(document: &Document) -> Money {
    potential_task_earnings(document).saturating_add(document.weekly_allowance)
}

/// Task money still available this week.
pub fn remaining(document: &Document) -> Money {
    potential_task_earnings(document).saturating_sub(task_earnings(document))
}

/// Totals panel snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Earnings {
    pub weekly_allowance: Money,
    pub task_earnings: Money,
    pub potential_task_earnings: Money,
    pub total_money: Money,
    pub potential_total: Money,
    pub remaining: Money,
}

impl Earnings {
    pub fn of(document: &Document) -> Self {
        let earned = task_earnings(document);
        let potential = potential_task_earnings(document);
        let allowance = document.weekly_allowance;
        Self {
            weekly_allowance: allowance,
            task_earnings: earned,
            potential_task_earnings: potential,
            total_money: earned.saturating_add(allowance),
            potential_total: potential.saturating_add(allowance),
            remaining: potential.saturating_sub(earned),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{remaining, total_money, Earnings};
    use crate::model::document::Document;
    use crate::model::task::Task;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    #[test]
    fn sums_saturate_instead_of_overflowing() {
        let mut document =
            Document::new(NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(), Decimal::MAX);
        for id in 1..=3 {
            document.tasks.push(Task {
                id,
                name: format!("Task {id}"),
                value: Decimal::MAX,
            });
            document.completions.insert(id);
        }
        document.next_id = 4;

        assert_eq!(total_money(&document), Decimal::MAX);
        assert_eq!(remaining(&document), Decimal::ZERO);
        let earnings = Earnings::of(&document);
        assert_eq!(earnings.potential_total, Decimal::MAX);
        assert_eq!(earnings.task_earnings, Decimal::MAX);
    }
}
