//! JSON file document store.
//!
//! # Invariants
//! - Writes go to a sibling `.tmp` file which is renamed over the target,
//!   so readers never observe a partially written document.
//! - A corrupt document is moved aside before the default document
//!   replaces it. Backups are named `<file>.corrupt`, then `<file>.corrupt.1`,
//!   `<file>.corrupt.2` and so on; an existing backup is never overwritten.
//! - Any other read failure, or a failed move, leaves the file untouched.
//! - No locking: concurrent writers race and the last rename wins.

use super::{
    decode_document, encode_document, fall_back_read_only, reinitialize, DocumentStore,
    LoadOutcome, StoreError, StoreResult,
};
use crate::model::document::Document;
use chrono::NaiveDate;
use log::{error, info, warn};
use std::ffi::OsString;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

const MAX_BACKUPS: usize = 1000;

/// Document store backed by one pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> StoreResult<Document> {
        let raw = fs::read_to_string(&self.path).map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                StoreError::Missing(self.path.clone())
            } else {
                StoreError::Io {
                    path: self.path.clone(),
                    source,
                }
            }
        })?;
        decode_document(&self.path, &raw)
    }

    fn move_aside(&self) -> Option<PathBuf> {
        let Some(backup) = free_backup_path(&self.path) else {
            warn!("event=store_backup module=store status=error error=no_free_backup_name");
            return None;
        };
        match fs::rename(&self.path, &backup) {
            Ok(()) => Some(backup),
            Err(err) => {
                warn!("event=store_backup module=store status=error error={err}");
                None
            }
        }
    }

    fn write_atomically(&self, bytes: &[u8]) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_error(parent))?;
            }
        }

        let tmp_path = sibling_with_suffix(&self.path, ".tmp");
        let result = write_then_rename(&tmp_path, &self.path, bytes);
        if result.is_err() {
            let _ = fs::remove_file(&tmp_path);
        }
        result
    }
}

impl DocumentStore for JsonFileStore {
    fn load(&self, today: NaiveDate) -> LoadOutcome {
        let started_at = Instant::now();
        match self.read() {
            Ok(document) => {
                info!(
                    "event=store_load module=store status=ok duration_ms={} task_count={} history_len={}",
                    started_at.elapsed().as_millis(),
                    document.tasks().len(),
                    document.history().len()
                );
                LoadOutcome::loaded(document)
            }
            Err(cause) if cause.is_missing() => reinitialize(self, today, cause, None),
            Err(cause) if cause.is_corrupt() => match self.move_aside() {
                Some(backup) => reinitialize(self, today, cause, Some(backup)),
                None => fall_back_read_only(today, cause),
            },
            Err(cause) => fall_back_read_only(today, cause),
        }
    }

    fn save(&self, document: &Document) -> StoreResult<()> {
        let started_at = Instant::now();
        let result = encode_document(document).and_then(|bytes| self.write_atomically(&bytes));
        match &result {
            Ok(()) => info!(
                "event=store_save module=store status=ok duration_ms={}",
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=store_save module=store status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }
}

fn write_then_rename(tmp_path: &Path, target: &Path, bytes: &[u8]) -> StoreResult<()> {
    let mut file = fs::File::create(tmp_path).map_err(io_error(tmp_path))?;
    file.write_all(bytes).map_err(io_error(tmp_path))?;
    file.sync_all().map_err(io_error(tmp_path))?;
    fs::rename(tmp_path, target).map_err(io_error(target))
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError {
    let path = path.to_path_buf();
    move |source| StoreError::Io { path, source }
}

fn free_backup_path(path: &Path) -> Option<PathBuf> {
    (0..MAX_BACKUPS)
        .map(|n| match n {
            0 => sibling_with_suffix(path, ".corrupt"),
            n => sibling_with_suffix(path, &format!(".corrupt.{n}")),
        })
        .find(|candidate| fs::symlink_metadata(candidate).is_err())
}

fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("allowance.json"));
    name.push(suffix);
    path.with_file_name(name)
}
