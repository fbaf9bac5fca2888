//! Default filesystem-backed port implementations.

use crate::ports::DocumentStore;
use anyhow::{Context, anyhow};
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use tracing::debug;

/// Filesystem document store.
#[derive(Debug, Clone, Default)]
pub struct FsDocumentStore;

impl DocumentStore for FsDocumentStore {
    fn exists(&self, path: &Utf8Path) -> bool {
        path.is_file()
    }

    fn read_to_string(&self, path: &Utf8Path) -> anyhow::Result<String> {
        fs::read_to_string(path).with_context(|| format!("read {}", path))
    }

    fn write(&self, path: &Utf8Path, contents: &str) -> anyhow::Result<()> {
        fs::write(path, contents).with_context(|| format!("write {}", path))
    }

    fn copy(&self, from: &Utf8Path, to: &Utf8Path) -> anyhow::Result<()> {
        fs::copy(from, to)
            .map(|_| ())
            .with_context(|| format!("copy {} to {}", from, to))
    }
}

/// In-memory document store for embedding and testing.
///
/// Counts writes and copies so callers can assert that a failed run touched
/// nothing.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    files: RefCell<BTreeMap<Utf8PathBuf, String>>,
    writes: Cell<usize>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: impl Into<Utf8PathBuf>, contents: impl Into<String>) -> Self {
        self.files.borrow_mut().insert(path.into(), contents.into());
        self
    }

    pub fn get(&self, path: &Utf8Path) -> Option<String> {
        self.files.borrow().get(path).cloned()
    }

    /// Number of successful `write` and `copy` calls.
    pub fn writes(&self) -> usize {
        self.writes.get()
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn exists(&self, path: &Utf8Path) -> bool {
        self.files.borrow().contains_key(path)
    }

    fn read_to_string(&self, path: &Utf8Path) -> anyhow::Result<String> {
        self.get(path)
            .ok_or_else(|| anyhow!("read {}: no such file", path))
    }

    fn write(&self, path: &Utf8Path, contents: &str) -> anyhow::Result<()> {
        debug!(%path, bytes = contents.len(), "in-memory write");
        self.files
            .borrow_mut()
            .insert(path.to_owned(), contents.to_string());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    fn copy(&self, from: &Utf8Path, to: &Utf8Path) -> anyhow::Result<()> {
        let contents = self
            .get(from)
            .ok_or_else(|| anyhow!("copy {} to {}: no such file", from, to))?;
        self.files.borrow_mut().insert(to.to_owned(), contents);
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}
