//! Snapshot discovery and reads behind a mockable seam.

use std::path::{Path, PathBuf};

use crate::error::Result;

/// Extension of snapshot files on disk.
pub const SNAPSHOT_EXTENSION: &str = "json";

/// Filesystem access needed to find and load snapshots.
#[cfg_attr(test, mockall::automock)]
pub trait FileSystem {
    /// Snapshot files below `root` in path order, skipping hidden entries.
    fn snapshot_files(&self, root: &Path) -> Result<Vec<PathBuf>>;
    /// Read a file into a string.
    fn read_to_string(&self, path: &Path) -> Result<String>;
}

/// `std::fs` backed implementation.
#[derive(Debug, Default, Clone)]
pub struct StdFileSystem;

impl StdFileSystem {
    /// Create a new standard filesystem adapter.
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for StdFileSystem {
    fn snapshot_files(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let mut snapshots = Vec::new();
        collect_snapshots(root, &mut snapshots)?;
        snapshots.sort();
        Ok(snapshots)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        Ok(std::fs::read_to_string(path)?)
    }
}

fn collect_snapshots(dir: &Path, snapshots: &mut Vec<PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        let kind = entry.file_type()?;
        if kind.is_dir() {
            collect_snapshots(&path, snapshots)?;
        } else if kind.is_file() && is_snapshot_file(&path) {
            snapshots.push(path);
        }
    }
    Ok(())
}

/// Whether `path` names a snapshot file.
pub fn is_snapshot_file(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some(SNAPSHOT_EXTENSION)
}
