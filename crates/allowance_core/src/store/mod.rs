//! Record store: durable load/save of the single state document.
//!
//! # Responsibility
//! - Define the storage contract used by the session facade.
//! - Recover from missing or corrupt documents by reinitializing defaults.
//! - Leave documents that fail for other reasons (permissions, a directory
//!   in the way) untouched and run from an unsaved default.
//!
//! # Invariants
//! - `load` never fails; read problems are reported through `Recovery`.
//! - A failed `save` leaves the previously stored document intact.
//! - Storage never decides the current date; `load` receives it.

use crate::model::document::Document;
use chrono::NaiveDate;
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

mod json_file;
mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage read or write failure.
#[derive(Debug)]
pub enum StoreError {
    /// No document stored yet (first run).
    Missing(PathBuf),
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Stored bytes are not a valid document.
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    Serialize(serde_json::Error),
    /// The stored document could not be read and is kept as is.
    ReadOnly,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(path) => write!(f, "no document stored at `{}`", path.display()),
            Self::Io { path, source } => write!(f, "I/O error on `{}`: {source}", path.display()),
            Self::Parse { path, source } => {
                write!(f, "invalid document at `{}`: {source}", path.display())
            }
            Self::Serialize(err) => write!(f, "failed to serialize document: {err}"),
            Self::ReadOnly => write!(
                f,
                "the stored document could not be read and will not be overwritten"
            ),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Missing(_) | Self::ReadOnly => None,
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Serialize(err) => Some(err),
        }
    }
}

impl StoreError {
    /// First run rather than damaged data.
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing(_))
    }

    /// Stored bytes exist but do not decode to a valid document.
    pub fn is_corrupt(&self) -> bool {
        match self {
            Self::Parse { .. } => true,
            Self::Io { source, .. } => source.kind() == std::io::ErrorKind::InvalidData,
            _ => false,
        }
    }
}

/// Details of a load that fell back to a default document.
#[derive(Debug)]
pub struct Recovery {
    /// Why the stored document could not be used.
    pub cause: StoreError,
    /// Where the unreadable bytes were moved, if they were preserved.
    pub backup_path: Option<PathBuf>,
    /// Failure persisting the fresh default document.
    pub persist_error: Option<StoreError>,
    /// The stored document was left in place; nothing may be saved over it.
    pub read_only: bool,
}

/// Document returned by `DocumentStore::load`.
#[derive(Debug)]
pub struct LoadOutcome {
    pub document: Document,
    /// Set when the document was reinitialized instead of read.
    pub recovery: Option<Recovery>,
}

impl LoadOutcome {
    pub fn loaded(document: Document) -> Self {
        Self {
            document,
            recovery: None,
        }
    }

    pub fn is_recovered(&self) -> bool {
        self.recovery.is_some()
    }
}

/// Persistence contract for the allowance document.
pub trait DocumentStore {
    /// Loads the stored document, or creates and persists a default one.
    fn load(&self, today: NaiveDate) -> LoadOutcome;

    /// Replaces the stored document.
    fn save(&self, document: &Document) -> StoreResult<()>;
}

pub(crate) fn decode_document(path: &std::path::Path, raw: &str) -> StoreResult<Document> {
    serde_json::from_str(raw).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn encode_document(document: &Document) -> StoreResult<Vec<u8>> {
    let mut bytes = serde_json::to_vec_pretty(document).map_err(StoreError::Serialize)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Builds the default document and persists it through `store`.
pub(crate) fn reinitialize<S: DocumentStore + ?Sized>(
    store: &S,
    today: NaiveDate,
    cause: StoreError,
    backup_path: Option<PathBuf>,
) -> LoadOutcome {
    if cause.is_missing() {
        warn!("event=store_load module=store status=reinitialized reason=missing");
    } else {
        warn!(
            "event=store_load module=store status=reinitialized reason=corrupt backup={} error={}",
            backup_path.is_some(),
            cause
        );
    }

    let document = Document::with_defaults(today);
    let persist_error = store.save(&document).err();
    LoadOutcome {
        document,
        recovery: Some(Recovery {
            cause,
            backup_path,
            persist_error,
            read_only: false,
        }),
    }
}

/// Builds an unsaved default document, leaving the stored one untouched.
pub(crate) fn fall_back_read_only(today: NaiveDate, cause: StoreError) -> LoadOutcome {
    warn!("event=store_load module=store status=read_only error={cause}");
    LoadOutcome {
        document: Document::with_defaults(today),
        recovery: Some(Recovery {
            cause,
            backup_path: None,
            persist_error: None,
            read_only: true,
        }),
    }
}
