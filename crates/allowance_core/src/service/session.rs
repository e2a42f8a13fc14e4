//! Allowance session: the command/query facade for front ends.
//!
//! # Responsibility
//! - Run load -> reconcile on open.
//! - Apply ledger commands to the in-memory document and persist after
//!   each successful mutation.
//! - Expose read-only queries for rendering.
//!
//! # Invariants
//! - The week is reconciled before any command or query is served.
//! - Rejected commands neither mutate nor save.
//! - Save failures are reported, never fatal; in-memory state stays valid.
//! - After a read-only recovery nothing is saved for the session's lifetime.

use crate::earnings::Earnings;
use crate::ledger::{self, LedgerResult};
use crate::model::document::{Document, HistoryEntry};
use crate::model::task::{Task, TaskId};
use crate::model::Money;
use crate::rollover::{reconcile_week, RolloverOutcome};
use crate::store::{DocumentStore, Recovery, StoreError};
use chrono::NaiveDate;
use log::info;

/// Value produced by a command plus the result of persisting it.
#[derive(Debug)]
pub struct CommandOutcome<T> {
    pub value: T,
    /// Set when the mutation succeeded in memory but could not be saved.
    pub save_error: Option<StoreError>,
}

impl<T> CommandOutcome<T> {
    fn unsaved(value: T) -> Self {
        Self {
            value,
            save_error: None,
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.save_error.is_none()
    }
}

/// One interactive session over a document store.
pub struct AllowanceSession<S: DocumentStore> {
    store: S,
    document: Document,
    recovery: Option<Recovery>,
    rollover: RolloverOutcome,
    open_save_error: Option<StoreError>,
    read_only: bool,
}

impl<S: DocumentStore> AllowanceSession<S> {
    /// Loads the document and reconciles it with `today`.
    ///
    /// # Side effects
    /// - Persists the document when the week rolled over.
    pub fn open(store: S, today: NaiveDate) -> Self {
        let loaded = store.load(today);
        let mut document = loaded.document;
        let rollover = reconcile_week(&mut document, today);
        let read_only = loaded.recovery.as_ref().is_some_and(|r| r.read_only);
        let open_save_error = if rollover.changed() {
            save_unless_read_only(&store, &document, read_only)
        } else {
            None
        };
        info!(
            "event=session_open module=service status=ok recovered={} read_only={} rolled_over={}",
            loaded.recovery.is_some(),
            read_only,
            rollover.changed()
        );

        Self {
            store,
            document,
            recovery: loaded.recovery,
            rollover,
            open_save_error,
            read_only,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Present when the stored document was missing or unreadable.
    pub fn recovery(&self) -> Option<&Recovery> {
        self.recovery.as_ref()
    }

    /// Outcome of the most recent week reconciliation.
    pub fn rollover(&self) -> &RolloverOutcome {
        &self.rollover
    }

    /// Failure saving the rolled-over document during `open`.
    pub fn open_save_error(&self) -> Option<&StoreError> {
        self.open_save_error.as_ref()
    }

    pub fn earnings(&self) -> Earnings {
        Earnings::of(&self.document)
    }

    pub fn tasks_by_name(&self) -> Vec<&Task> {
        ledger::tasks_by_name(&self.document)
    }

    pub fn history_newest_first(&self) -> impl Iterator<Item = &HistoryEntry> {
        ledger::history_newest_first(&self.document)
    }

    /// Re-runs week reconciliation, e.g. for a front end left open overnight.
    pub fn reconcile(&mut self, today: NaiveDate) -> CommandOutcome<RolloverOutcome> {
        let outcome = reconcile_week(&mut self.document, today);
        self.rollover = outcome.clone();
        if outcome.changed() {
            self.persist(outcome)
        } else {
            CommandOutcome::unsaved(outcome)
        }
    }

    pub fn set_weekly_allowance(&mut self, value: Money) -> LedgerResult<CommandOutcome<()>> {
        ledger::set_weekly_allowance(&mut self.document, value)?;
        Ok(self.persist(()))
    }

    pub fn add_task(&mut self, name: &str, value: Money) -> LedgerResult<CommandOutcome<Task>> {
        let task = ledger::add_task(&mut self.document, name, value)?;
        Ok(self.persist(task))
    }

    pub fn edit_task(
        &mut self,
        id: TaskId,
        name: &str,
        value: Money,
    ) -> LedgerResult<CommandOutcome<Task>> {
        let task = ledger::edit_task(&mut self.document, id, name, value)?;
        Ok(self.persist(task))
    }

    /// Deletes a task. Returns `false` without saving when `id` is unknown.
    pub fn delete_task(&mut self, id: TaskId) -> CommandOutcome<bool> {
        if ledger::delete_task(&mut self.document, id) {
            self.persist(true)
        } else {
            CommandOutcome::unsaved(false)
        }
    }

    pub fn set_completion(&mut self, id: TaskId, done: bool) -> LedgerResult<CommandOutcome<()>> {
        ledger::set_completion(&mut self.document, id, done)?;
        Ok(self.persist(()))
    }

    fn persist<T>(&self, value: T) -> CommandOutcome<T> {
        CommandOutcome {
            value,
            save_error: save_unless_read_only(&self.store, &self.document, self.read_only),
        }
    }
}

fn save_unless_read_only<S: DocumentStore>(
    store: &S,
    document: &Document,
    read_only: bool,
) -> Option<StoreError> {
    if read_only {
        return Some(StoreError::ReadOnly);
    }
    store.save(document).err()
}
