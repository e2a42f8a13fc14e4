//! In-memory document store for tests and embedding.

use super::{
    decode_document, encode_document, reinitialize, DocumentStore, LoadOutcome, StoreError,
    StoreResult,
};
use crate::model::document::Document;
use chrono::NaiveDate;
use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};

const MEMORY_PATH: &str = ":memory:";

/// Store that keeps the serialized document in memory.
///
/// Holds the same JSON bytes a file store would write, so decoding and
/// recovery behave identically.
#[derive(Debug, Default)]
pub struct MemoryStore {
    contents: RefCell<Option<String>>,
    reject_writes: Cell<bool>,
    save_count: Cell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with raw stored text, valid or not.
    pub fn with_contents(raw: impl Into<String>) -> Self {
        let store = Self::default();
        store.contents.replace(Some(raw.into()));
        store
    }

    /// Makes subsequent saves fail like a full or read-only disk.
    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.set(reject);
    }

    /// Raw stored text, if any.
    pub fn contents(&self) -> Option<String> {
        self.contents.borrow().clone()
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.save_count.get()
    }
}

impl DocumentStore for MemoryStore {
    fn load(&self, today: NaiveDate) -> LoadOutcome {
        let path = Path::new(MEMORY_PATH);
        let decoded = match self.contents.borrow().as_deref() {
            Some(raw) => decode_document(path, raw),
            None => Err(StoreError::Missing(PathBuf::from(MEMORY_PATH))),
        };
        match decoded {
            Ok(document) => LoadOutcome::loaded(document),
            Err(cause) => reinitialize(self, today, cause, None),
        }
    }

    fn save(&self, document: &Document) -> StoreResult<()> {
        if self.reject_writes.get() {
            return Err(StoreError::Io {
                path: PathBuf::from(MEMORY_PATH),
                source: std::io::Error::new(std::io::ErrorKind::Other, "writes rejected"),
            });
        }
        let bytes = encode_document(document)?;
        let raw = String::from_utf8(bytes).map_err(|err| StoreError::Io {
            path: PathBuf::from(MEMORY_PATH),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, err),
        })?;
        self.contents.replace(Some(raw));
        self.save_count.set(self.save_count.get() + 1);
        Ok(())
    }
}
