//! Snapshot providers.
//!
//! The engine never fetches data itself. A provider hands it a snapshot for a
//! repository; the directory provider reads snapshots captured elsewhere from
//! `<root>/<owner>/<name>.json`.

use std::io;
use std::path::{Path, PathBuf};

use log::debug;

use crate::domain::AnalyzeResult;
use crate::engine;
use crate::error::{MergeScopeError, ProviderError, Result};
use crate::fs::{FileSystem, SNAPSHOT_EXTENSION, is_snapshot_file};
use crate::repo_ref::RepoRef;
use crate::snapshot::RepoSnapshot;

/// Source of repository snapshots.
#[cfg_attr(test, mockall::automock)]
pub trait SnapshotProvider {
    /// Fetch the current snapshot of a repository.
    fn fetch(&self, repo: &RepoRef) -> std::result::Result<RepoSnapshot, ProviderError>;
    /// Repositories this provider can serve.
    fn available(&self) -> std::result::Result<Vec<RepoRef>, ProviderError>;
}

/// Fetch a repository's snapshot and score it.
pub fn analyze_repo<P: SnapshotProvider + ?Sized>(
    provider: &P,
    repo: &RepoRef,
) -> Result<AnalyzeResult> {
    let snapshot = provider.fetch(repo)?;
    engine::score(&snapshot)
}

/// Reads snapshots stored as `<root>/<owner>/<name>.json`.
#[derive(Debug, Clone)]
pub struct DirectorySnapshotProvider<F: FileSystem> {
    fs: F,
    root: PathBuf,
}

impl<F: FileSystem> DirectorySnapshotProvider<F> {
    /// Create a provider rooted at `root`.
    pub fn new(fs: F, root: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            root: root.into(),
        }
    }

    /// Path of a repository's snapshot file.
    pub fn snapshot_path(&self, repo: &RepoRef) -> PathBuf {
        self.root
            .join(repo.owner())
            .join(format!("{}.{SNAPSHOT_EXTENSION}", repo.name()))
    }

    fn repo_for_path(&self, path: &Path) -> Option<RepoRef> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let mut components = relative.components();
        let owner = components.next()?.as_os_str().to_str()?;
        let file = Path::new(components.next()?.as_os_str());
        if components.next().is_some() {
            return None;
        }
        if !is_snapshot_file(file) {
            return None;
        }
        let name = file.file_stem()?.to_str()?;
        RepoRef::new(owner, name).ok()
    }
}

impl<F: FileSystem> SnapshotProvider for DirectorySnapshotProvider<F> {
    fn fetch(&self, repo: &RepoRef) -> std::result::Result<RepoSnapshot, ProviderError> {
        let path = self.snapshot_path(repo);
        debug!("reading snapshot for {repo} from {}", path.display());
        let contents = self
            .fs
            .read_to_string(&path)
            .map_err(|err| read_error(repo, err))?;
        let snapshot = RepoSnapshot::from_json(&contents)
            .map_err(|err| ProviderError::Malformed(format!("{}: {err}", path.display())))?;

        match snapshot.repo_ref() {
            Ok(found) if found == *repo => Ok(snapshot),
            Ok(found) => Err(ProviderError::Malformed(format!(
                "{} holds a snapshot of {found}",
                path.display()
            ))),
            Err(err) => Err(ProviderError::Malformed(err.to_string())),
        }
    }

    fn available(&self) -> std::result::Result<Vec<RepoRef>, ProviderError> {
        let files = match self.fs.snapshot_files(&self.root) {
            Ok(files) => files,
            Err(MergeScopeError::Io(err)) if err.kind() == io::ErrorKind::NotFound => {
                return Ok(Vec::new());
            }
            Err(err) => return Err(ProviderError::Io(err.to_string())),
        };
        let mut repos: Vec<RepoRef> = files
            .iter()
            .filter_map(|path| self.repo_for_path(path))
            .collect();
        repos.sort();
        repos.dedup();
        Ok(repos)
    }
}

fn read_error(repo: &RepoRef, err: MergeScopeError) -> ProviderError {
    match err {
        MergeScopeError::Io(io_err) => match io_err.kind() {
            io::ErrorKind::NotFound => ProviderError::NotFound(repo.to_string()),
            io::ErrorKind::PermissionDenied => ProviderError::Unauthorized,
            _ => ProviderError::Io(io_err.to_string()),
        },
        other => ProviderError::Io(other.to_string()),
    }
}
