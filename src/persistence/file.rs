//! JSON file store
//!
//! The whole store is one JSON object (`{"key": "value", ...}`) on disk.
//! Every read-modify-write holds an exclusive OS lock on a sibling `.lock`
//! file, so stores in other threads or processes sharing the path cannot
//! interleave. Writes go to a fresh temp file in the same directory and are
//! renamed over the real file, so a crash mid-write leaves the previous
//! contents intact.

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use fd_lock::RwLock;
use tempfile::NamedTempFile;

use super::{Edit, KeyValueStore, PersistenceError, Result};

type Document = BTreeMap<String, String>;

#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut lock_path = path.clone().into_os_string();
        lock_path.push(".lock");
        Self {
            path,
            lock_path: PathBuf::from(lock_path),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn dir(&self) -> Option<&Path> {
        self.path.parent().filter(|p| !p.as_os_str().is_empty())
    }

    fn open_lock(&self) -> Result<RwLock<File>> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_path)?;
        Ok(RwLock::new(file))
    }

    /// Load the document. Missing file = empty; unparsable file = empty + warning.
    fn read_document(&self) -> Result<Document> {
        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Document::new()),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str(&json) {
            Ok(doc) => Ok(doc),
            Err(e) => {
                log::warn!("Ignoring corrupt store {}: {}", self.path.display(), e);
                Ok(Document::new())
            }
        }
    }

    /// Replace the file contents. Caller holds the write lock.
    fn write_document(&self, doc: &Document) -> Result<()> {
        let json = serde_json::to_string_pretty(doc)?;
        let mut tmp = match self.dir() {
            Some(dir) => NamedTempFile::new_in(dir)?,
            None => NamedTempFile::new_in(".")?,
        };
        tmp.write_all(json.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        log::debug!("Saved store to {}", self.path.display());
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let lock = match self.open_lock() {
            Ok(lock) => lock,
            // Directory not created yet: nothing has ever been written
            Err(PersistenceError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        let _guard = lock.read()?;
        Ok(self.read_document()?.remove(key))
    }

    fn update(&self, key: &str, edit: &mut Edit<'_>) -> Result<()> {
        if let Some(dir) = self.dir() {
            std::fs::create_dir_all(dir)?;
        }
        let mut lock = self.open_lock()?;
        let _guard = lock.write()?;

        let mut doc = self.read_document()?;
        let next = edit(doc.get(key).map(String::as_str))?;
        match next {
            Some(value) => doc.insert(key.to_string(), value),
            None => doc.remove(key),
        };
        self.write_document(&doc)
    }
}
