//! Port traits abstracting all I/O away from the pipeline.

use camino::Utf8Path;

/// Read/write/copy access to the single descriptor being migrated.
pub trait DocumentStore {
    fn exists(&self, path: &Utf8Path) -> bool;
    fn read_to_string(&self, path: &Utf8Path) -> anyhow::Result<String>;
    fn write(&self, path: &Utf8Path, contents: &str) -> anyhow::Result<()>;
    fn copy(&self, from: &Utf8Path, to: &Utf8Path) -> anyhow::Result<()>;
}
